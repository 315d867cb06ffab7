//! Alerting profiles
//!
//! A profile is an ordered list of severity rules. Each rule has a tag filter
//! group on the wire (`tagFilter { includeMode, tagFilters }`); the tree
//! flattens that group into the rule block itself.
//!
//! ```toml
//! display_name = "production"
//!
//! [[rule]]
//! severity_level = "ERROR"
//! delay_in_minutes = 5
//! include_mode = "INCLUDE_ANY"
//!
//! [[rule.tag_filter]]
//! context = "CONTEXTLESS"
//! key = "env"
//! value = "prod"
//! ```

use std::sync::OnceLock;

use cfgmap_core::mapper::sort_canonical;
use cfgmap_core::{
    Canonical, Decoder, FieldSpec, Identified, Mapper, Properties, PropertyDecoder, Result, Schema,
    Unknowns, WireEntity,
};
use serde::{Deserialize, Serialize};

use crate::tags::TagFilter;

cfgmap_core::closed_enum! {
    /// Problem severity a rule applies to
    pub enum SeverityLevel {
        Availability => "AVAILABILITY",
        CustomAlert => "CUSTOM_ALERT",
        Error => "ERROR",
        MonitoringUnavailable => "MONITORING_UNAVAILABLE",
        Performance => "PERFORMANCE",
        ResourceContention => "RESOURCE_CONTENTION",
    }
}

cfgmap_core::closed_enum! {
    /// How a rule's tag filters combine
    pub enum IncludeMode {
        None => "NONE",
        IncludeAny => "INCLUDE_ANY",
        IncludeAll => "INCLUDE_ALL",
    }
}

/// Tag filter group of a severity rule
///
/// The filters form a set: they are kept in canonical order when decoded
/// and compared without regard to order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFilterGroup {
    pub include_mode: IncludeMode,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "canonical_filters"
    )]
    pub tag_filters: Vec<TagFilter>,
}

fn canonical_filters<'de, D>(deserializer: D) -> std::result::Result<Vec<TagFilter>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut filters = Vec::<TagFilter>::deserialize(deserializer)?;
    sort_canonical(&mut filters);
    Ok(filters)
}

impl PartialEq for TagFilterGroup {
    fn eq(&self, other: &Self) -> bool {
        let keys = |filters: &[TagFilter]| {
            let mut keys: Vec<_> = filters.iter().map(TagFilter::canonical_key).collect();
            keys.sort();
            keys
        };
        self.include_mode == other.include_mode
            && keys(&self.tag_filters) == keys(&other.tag_filters)
    }
}

impl Eq for TagFilterGroup {}

impl Default for TagFilterGroup {
    fn default() -> Self {
        Self {
            include_mode: IncludeMode::None,
            tag_filters: Vec::new(),
        }
    }
}

impl TagFilterGroup {
    pub fn new(include_mode: IncludeMode, mut tag_filters: Vec<TagFilter>) -> Self {
        sort_canonical(&mut tag_filters);
        Self {
            include_mode,
            tag_filters,
        }
    }

    /// Whether an entity carrying `tags` is selected by this group.
    pub fn matches(&self, tags: &[TagFilter]) -> bool {
        let carries = |filter: &TagFilter| {
            tags.iter().any(|tag| {
                tag.context == filter.context
                    && tag.key == filter.key
                    && (filter.value.is_none() || tag.value == filter.value)
            })
        };
        match self.include_mode {
            IncludeMode::None => true,
            IncludeMode::IncludeAny => self.tag_filters.iter().any(carries),
            IncludeMode::IncludeAll => self.tag_filters.iter().all(carries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityRule {
    pub severity_level: SeverityLevel,
    pub delay_in_minutes: i64,
    #[serde(default)]
    pub tag_filter: TagFilterGroup,
}

impl Mapper for SeverityRule {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::string("severity_level")
                    .required()
                    .one_of(SeverityLevel::VALUES)
                    .describe("Severity of problems this rule applies to"),
                FieldSpec::int("delay_in_minutes")
                    .required()
                    .describe("Minutes a problem stays open before alerting"),
                FieldSpec::string("include_mode")
                    .required()
                    .one_of(IncludeMode::VALUES)
                    .describe("How tag filters combine"),
                FieldSpec::set_of_blocks("tag_filter", TagFilter::schema())
                    .describe("Tags entities must carry"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("severity_level", &self.severity_level)?
            .encode("delay_in_minutes", &self.delay_in_minutes)?
            .encode("include_mode", &self.tag_filter.include_mode)?
            .encode_set("tag_filter", &self.tag_filter.tag_filters)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            severity_level: decoder.decode_required("severity_level")?,
            delay_in_minutes: decoder.decode_required("delay_in_minutes")?,
            tag_filter: TagFilterGroup {
                include_mode: decoder.decode_required("include_mode")?,
                tag_filters: decoder.decode_set("tag_filter")?,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertingProfile {
    /// Assigned by the server on create
    pub id: Option<String>,
    pub display_name: String,
    pub management_zone_id: Option<i64>,
    pub rules: Vec<SeverityRule>,
    pub unknowns: Unknowns,
}

impl AlertingProfile {
    /// Rules that apply to a problem of `level` on an entity carrying `tags`.
    pub fn matching_rules<'a>(
        &'a self,
        level: SeverityLevel,
        tags: &'a [TagFilter],
    ) -> impl Iterator<Item = &'a SeverityRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.severity_level == level && rule.tag_filter.matches(tags))
    }
}

impl Mapper for AlertingProfile {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::string("id")
                    .computed()
                    .describe("Identifier assigned by the server"),
                FieldSpec::string("display_name")
                    .required()
                    .describe("Name of the alerting profile"),
                FieldSpec::int("management_zone_id")
                    .describe("Management zone the profile is restricted to"),
                FieldSpec::list_of_blocks("rule", SeverityRule::schema())
                    .describe("Severity rules, evaluated in order"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("id", &self.id)?
            .encode("display_name", &self.display_name)?
            .encode("management_zone_id", &self.management_zone_id)?
            .encode_blocks("rule", &self.rules)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            id: decoder.decode_preserved("id")?,
            display_name: decoder.decode_required("display_name")?,
            management_zone_id: decoder.decode("management_zone_id")?,
            rules: decoder.decode_blocks("rule")?,
            unknowns: Unknowns::new(),
        })
    }
}

impl WireEntity for AlertingProfile {
    fn to_wire(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("id", &self.id)?
            .encode("displayName", &self.display_name)?
            .encode("mzId", &self.management_zone_id)?
            .encode("rules", &self.rules)?;
        Ok(())
    }

    fn from_wire(fields: &mut PropertyDecoder) -> Result<Self> {
        Ok(Self {
            id: fields.take("id")?,
            display_name: fields.take_required("displayName")?,
            management_zone_id: fields.take("mzId")?,
            rules: fields.take_or_default("rules")?,
            unknowns: Unknowns::new(),
        })
    }

    fn unknowns(&self) -> &Unknowns {
        &self.unknowns
    }

    fn set_unknowns(&mut self, unknowns: Unknowns) {
        self.unknowns = unknowns;
    }
}

impl Identified for AlertingProfile {
    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_remote_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.display_name)
    }
}

cfgmap_core::impl_wire_serde!(AlertingProfile);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::Context;
    use cfgmap_core::mapper::to_tree_value;
    use cfgmap_core::{from_tree, from_tree_with_prior, wire};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn profile_tree() -> serde_json::Value {
        json!({
            "display_name": "production",
            "rule": [
                {
                    "severity_level": "ERROR",
                    "delay_in_minutes": 5,
                    "include_mode": "INCLUDE_ANY",
                    "tag_filter": [
                        {"context": "CONTEXTLESS", "key": "app"},
                        {"context": "CONTEXTLESS", "key": "env", "value": "prod"},
                    ],
                },
                {
                    "severity_level": "AVAILABILITY",
                    "delay_in_minutes": 0,
                    "include_mode": "NONE",
                },
            ],
        })
    }

    #[test]
    fn test_tree_to_wire_flattens_tag_filter_group() {
        let profile: AlertingProfile = from_tree(&profile_tree()).unwrap();

        assert_eq!(
            wire::to_value(&profile).unwrap(),
            json!({
                "displayName": "production",
                "rules": [
                    {
                        "severityLevel": "ERROR",
                        "delayInMinutes": 5,
                        "tagFilter": {
                            "includeMode": "INCLUDE_ANY",
                            "tagFilters": [
                                {"context": "CONTEXTLESS", "key": "env", "value": "prod"},
                                {"context": "CONTEXTLESS", "key": "app"},
                            ],
                        },
                    },
                    {
                        "severityLevel": "AVAILABILITY",
                        "delayInMinutes": 0,
                        "tagFilter": {"includeMode": "NONE"},
                    },
                ],
            })
        );
    }

    #[test]
    fn test_rule_order_is_kept() {
        let profile: AlertingProfile = from_tree(&profile_tree()).unwrap();
        let levels: Vec<_> = profile.rules.iter().map(|r| r.severity_level).collect();
        assert_eq!(levels, vec![SeverityLevel::Error, SeverityLevel::Availability]);
    }

    #[test]
    fn test_tree_round_trip() {
        let profile: AlertingProfile = from_tree(&profile_tree()).unwrap();
        let tree = to_tree_value(&profile).unwrap();
        let again: AlertingProfile = from_tree(&tree).unwrap();
        assert_eq!(again, profile);
        assert_eq!(to_tree_value(&again).unwrap(), tree);
    }

    #[test]
    fn test_wire_tag_filters_decode_in_canonical_order() {
        let profile: AlertingProfile = wire::from_value(json!({
            "displayName": "p",
            "rules": [{
                "severityLevel": "ERROR",
                "delayInMinutes": 1,
                "tagFilter": {
                    "includeMode": "INCLUDE_ALL",
                    "tagFilters": [
                        {"context": "CONTEXTLESS", "key": "a"},
                        {"context": "CONTEXTLESS", "key": "b"},
                    ],
                },
            }],
        }))
        .unwrap();

        let keys: Vec<_> = profile.rules[0]
            .tag_filter
            .tag_filters
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);

        let again: AlertingProfile = from_tree(&to_tree_value(&profile).unwrap()).unwrap();
        assert_eq!(again.rules[0].tag_filter.tag_filters, profile.rules[0].tag_filter.tag_filters);
        assert_eq!(again, profile);
    }

    #[test]
    fn test_tag_filter_group_is_a_set() {
        let a = TagFilter::new(Context::Contextless, "a");
        let b = TagFilter::new(Context::Kubernetes, "b").with_value("x");

        let unsorted = TagFilterGroup {
            include_mode: IncludeMode::IncludeAny,
            tag_filters: vec![a.clone(), b.clone()],
        };
        let built = TagFilterGroup::new(IncludeMode::IncludeAny, vec![a.clone(), b.clone()]);
        assert_eq!(built.tag_filters, vec![b.clone(), a.clone()]);
        assert_eq!(unsorted, built);
        assert_ne!(unsorted, TagFilterGroup::new(IncludeMode::IncludeAll, vec![a, b]));
    }

    #[test]
    fn test_prior_id_survives_update() {
        let prior = json!({"id": "b2f4", "display_name": "production"});
        let proposed = json!({"display_name": "production-eu"});

        let profile: AlertingProfile = from_tree_with_prior(&proposed, &prior).unwrap();
        assert_eq!(profile.id.as_deref(), Some("b2f4"));
        assert_eq!(profile.display_name, "production-eu");
    }

    #[test]
    fn test_missing_display_name() {
        let err = from_tree::<AlertingProfile>(&json!({})).unwrap_err();
        assert!(err.is_schema_violation());
        assert_eq!(err.to_string(), "Required attribute missing: display_name");
    }

    #[test]
    fn test_unknown_severity_in_tree_rejected() {
        let tree = json!({
            "display_name": "p",
            "rule": [{"severity_level": "LOUD", "delay_in_minutes": 1, "include_mode": "NONE"}],
        });
        let err = from_tree::<AlertingProfile>(&tree).unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[test]
    fn test_unknown_severity_on_wire_rejected() {
        let err = wire::from_value::<AlertingProfile>(json!({
            "displayName": "p",
            "rules": [{"severityLevel": "LOUD", "delayInMinutes": 1, "tagFilter": {"includeMode": "NONE"}}],
        }))
        .unwrap_err();
        assert!(err.is_malformed_wire());
    }

    #[rstest]
    #[case::none(IncludeMode::None, &[], true)]
    #[case::any_hit(IncludeMode::IncludeAny, &[("env", Some("prod"))], true)]
    #[case::any_wrong_value(IncludeMode::IncludeAny, &[("env", Some("dev"))], false)]
    #[case::all_partial(IncludeMode::IncludeAll, &[("env", Some("prod"))], false)]
    #[case::all_hit(IncludeMode::IncludeAll, &[("env", Some("prod")), ("app", None)], true)]
    fn test_tag_filter_group_matching(
        #[case] mode: IncludeMode,
        #[case] carried: &[(&str, Option<&str>)],
        #[case] expected: bool,
    ) {
        let group = TagFilterGroup {
            include_mode: mode,
            tag_filters: vec![
                TagFilter::new(Context::Contextless, "env").with_value("prod"),
                TagFilter::new(Context::Contextless, "app"),
            ],
        };
        let tags: Vec<TagFilter> = carried
            .iter()
            .map(|(key, value)| TagFilter {
                context: Context::Contextless,
                key: key.to_string(),
                value: value.map(str::to_string),
            })
            .collect();
        assert_eq!(group.matches(&tags), expected);
    }
}
