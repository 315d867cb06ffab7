//! Entity kinds addressable by name

use cfgmap_core::mapper::{self, Mapper};
use cfgmap_core::{Result, Schema, WireEntity, wire};
use serde_json::Value;
use tracing::debug;

use crate::alerting::AlertingProfile;
use crate::anomalies::HostAnomalyDetection;
use crate::metrics::MetricThreshold;
use crate::spans::SpanCaptureRule;

cfgmap_core::closed_enum! {
    /// Top-level entity kinds
    pub enum EntityKind {
        AlertingProfile => "alerting_profile",
        HostAnomalyDetection => "host_anomaly_detection",
        MetricThreshold => "metric_threshold",
        SpanCaptureRule => "span_capture_rule",
    }
}

impl EntityKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::AlertingProfile => "Severity rules deciding which problems raise alerts",
            Self::HostAnomalyDetection => "Disk and GC anomaly detection for hosts",
            Self::MetricThreshold => "Static threshold on a single metric",
            Self::SpanCaptureRule => "Capture or ignore spans by name or attribute",
        }
    }

    pub fn schema(&self) -> &'static Schema {
        match self {
            Self::AlertingProfile => AlertingProfile::schema(),
            Self::HostAnomalyDetection => HostAnomalyDetection::schema(),
            Self::MetricThreshold => MetricThreshold::schema(),
            Self::SpanCaptureRule => SpanCaptureRule::schema(),
        }
    }

    /// Whether entities of this kind carry a server-assigned identifier.
    pub fn has_identity(&self) -> bool {
        !matches!(self, Self::HostAnomalyDetection)
    }

    /// Decode a tree and encode it as wire JSON.
    pub fn tree_to_wire(&self, tree: &Value, prior: Option<&Value>) -> Result<Value> {
        debug!(kind = %self, "tree -> wire");
        match self {
            Self::AlertingProfile => convert_tree::<AlertingProfile>(tree, prior),
            Self::HostAnomalyDetection => convert_tree::<HostAnomalyDetection>(tree, prior),
            Self::MetricThreshold => convert_tree::<MetricThreshold>(tree, prior),
            Self::SpanCaptureRule => convert_tree::<SpanCaptureRule>(tree, prior),
        }
    }

    /// Decode wire JSON and encode it as a tree.
    pub fn wire_to_tree(&self, document: Value) -> Result<Value> {
        debug!(kind = %self, "wire -> tree");
        match self {
            Self::AlertingProfile => convert_wire::<AlertingProfile>(document),
            Self::HostAnomalyDetection => convert_wire::<HostAnomalyDetection>(document),
            Self::MetricThreshold => convert_wire::<MetricThreshold>(document),
            Self::SpanCaptureRule => convert_wire::<SpanCaptureRule>(document),
        }
    }
}

fn convert_tree<T: Mapper + WireEntity>(tree: &Value, prior: Option<&Value>) -> Result<Value> {
    let entity: T = match prior {
        Some(prior) => mapper::from_tree_with_prior(tree, prior)?,
        None => mapper::from_tree(tree)?,
    };
    wire::to_value(&entity)
}

fn convert_wire<T: Mapper + WireEntity>(document: Value) -> Result<Value> {
    let entity: T = wire::from_value(document)?;
    mapper::to_tree_value(&entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_kinds_parse_by_name() {
        assert_eq!(
            "metric_threshold".parse::<EntityKind>().unwrap(),
            EntityKind::MetricThreshold
        );
        assert!("dashboard".parse::<EntityKind>().is_err());
        assert_eq!(EntityKind::ALL.len(), EntityKind::VALUES.len());
    }

    #[rstest]
    #[case(EntityKind::AlertingProfile, "display_name")]
    #[case(EntityKind::HostAnomalyDetection, "disks")]
    #[case(EntityKind::MetricThreshold, "metric_id")]
    #[case(EntityKind::SpanCaptureRule, "match")]
    fn test_schema_lookup(#[case] kind: EntityKind, #[case] field: &str) {
        assert!(kind.schema().field(field).is_some());
    }

    #[test]
    fn test_tree_to_wire_with_prior() {
        let tree = json!({"display_name": "eu"});
        let prior = json!({"id": "p-1", "display_name": "us"});
        let document = EntityKind::AlertingProfile
            .tree_to_wire(&tree, Some(&prior))
            .unwrap();
        assert_eq!(document, json!({"id": "p-1", "displayName": "eu"}));
    }

    #[test]
    fn test_wire_to_tree() {
        let tree = EntityKind::HostAnomalyDetection
            .wire_to_tree(json!({
                "diskLowInodesDetection": {"enabled": true, "freeInodesPercentage": 3}
            }))
            .unwrap();
        assert_eq!(tree, json!({"disks": [{"inodes": [{"percentage": 3}]}]}));
    }
}
