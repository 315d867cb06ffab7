//! End-to-end tests across the three representations
//!
//! Exercises the full flow: tree document on disk -> model -> wire JSON ->
//! service -> wire JSON -> model -> tree document.

use cfgmap_client::{CrudService, Guarded, InMemoryService};
use cfgmap_core::mapper::to_tree_value;
use cfgmap_core::{TreeFormat, from_tree, from_tree_with_prior, load_tree, save_tree, wire};
use cfgmap_entities::{
    AlertingProfile, EntityKind, HostAnomalyDetection, SpanAction, SpanCaptureRule,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

const RULE_TOML: &str = r#"
name = "checkout spans"
action = "CAPTURE"

[[match]]
source = "SPAN_NAME"
comparison = "STARTS_WITH"
value = "checkout"

[[match]]
source = "ATTRIBUTE"
comparison = "EQUALS"
key = "http.route"
value = "/cart"
case_sensitive = false
"#;

const PROFILE_TOML: &str = r#"
display_name = "production"
management_zone_id = 42

[[rule]]
severity_level = "ERROR"
delay_in_minutes = 5
include_mode = "INCLUDE_ANY"

[[rule.tag_filter]]
context = "CONTEXTLESS"
key = "env"
value = "prod"

[[rule.tag_filter]]
context = "KUBERNETES"
key = "team"
"#;

#[tokio::test]
async fn span_rule_survives_the_full_pipeline() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rule.toml");
    fs::write(&path, RULE_TOML).unwrap();

    let tree = load_tree(&path).unwrap();
    let rule: SpanCaptureRule = from_tree(&tree).unwrap();
    assert_eq!(rule.action, SpanAction::Capture);
    assert_eq!(rule.matchers.len(), 2);

    let service = Guarded::new(InMemoryService::<SpanCaptureRule>::new("span_capture_rule"));
    let id = service.create(&rule).await.unwrap();

    let stored = service.inner().document(&id).unwrap();
    assert_eq!(stored["ruleName"], "checkout spans");
    assert_eq!(stored["matchers"][0]["type"], "STARTS_WITH");

    let fetched = service.get(&id).await.unwrap();
    let pulled = to_tree_value(&fetched).unwrap();
    assert_eq!(pulled["id"], json!(id));

    // The pulled tree, minus the computed id, is the document we started from.
    let mut without_id = pulled.clone();
    without_id.as_object_mut().unwrap().remove("id");
    assert_eq!(without_id, tree);

    let out = temp.path().join("pulled.yaml");
    save_tree(&out, &pulled).unwrap();
    let reloaded: SpanCaptureRule = from_tree(&load_tree(&out).unwrap()).unwrap();
    assert_eq!(reloaded, fetched);
}

#[tokio::test]
async fn reapplying_a_pulled_profile_updates_in_place() {
    let tree = TreeFormat::Toml.parse(PROFILE_TOML).unwrap();
    let service = Guarded::new(InMemoryService::<AlertingProfile>::new("alerting_profile"));

    let mut profile: AlertingProfile = from_tree(&tree).unwrap();
    let id = service.apply(&mut profile).await.unwrap();
    assert_eq!(profile.id.as_deref(), Some(id.as_str()));

    // The next edit of the tree does not carry the id; the prior state does.
    let applied = to_tree_value(&profile).unwrap();
    let mut edited = tree.clone();
    edited["display_name"] = json!("production-eu");
    let mut next: AlertingProfile = from_tree_with_prior(&edited, &applied).unwrap();
    assert_eq!(service.apply(&mut next).await.unwrap(), id);

    assert_eq!(service.inner().len(), 1);
    let stored = service.get(&id).await.unwrap();
    assert_eq!(stored.display_name, "production-eu");
    assert_eq!(stored.management_zone_id, Some(42));
}

#[test]
fn tag_filters_come_back_in_canonical_order() {
    let tree = TreeFormat::Toml.parse(PROFILE_TOML).unwrap();
    let wire = EntityKind::AlertingProfile.tree_to_wire(&tree, None).unwrap();
    let back = EntityKind::AlertingProfile.wire_to_tree(wire.clone()).unwrap();

    let contexts: Vec<_> = back["rule"][0]["tag_filter"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["context"].as_str().unwrap().to_string())
        .collect();
    let mut sorted = contexts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(contexts, sorted);

    // Re-encoding the round-tripped tree yields the same wire document.
    let again = EntityKind::AlertingProfile.tree_to_wire(&back, None).unwrap();
    assert_eq!(again, wire);
}

#[test]
fn host_detection_keeps_unmodeled_detectors() {
    let document = json!({
        "diskLowSpaceDetection": {"enabled": true, "freeSpacePercentage": 5},
        "diskSlowWritesAndReadsDetection": {"enabled": false},
        "diskLowInodesDetection": {"enabled": false},
        "highGcActivityDetection": {"enabled": false},
        "connectionLostDetection": {"enabled": true, "onGracefulShutdowns": "DONT_ALERT"}
    });

    let host: HostAnomalyDetection = wire::from_value(document.clone()).unwrap();
    let tree = to_tree_value(&host).unwrap();
    assert_eq!(tree["disks"]["space"]["percentage"], 5);
    assert!(tree.get("gc").is_none());

    let mut decoded: HostAnomalyDetection = from_tree(&tree).unwrap();
    decoded.unknowns = host.unknowns.clone();
    assert_eq!(wire::to_value(&decoded).unwrap(), document);
}
