//! Span capture rules

use std::sync::OnceLock;

use cfgmap_core::{
    Decoder, FieldSpec, Identified, Mapper, Properties, PropertyDecoder, Result, Schema,
    Unknowns, WireEntity,
};
use serde::{Deserialize, Serialize};

cfgmap_core::closed_enum! {
    pub enum SpanAction {
        Capture => "CAPTURE",
        Ignore => "IGNORE",
    }
}

cfgmap_core::open_enum! {
    /// Span property a matcher inspects
    pub enum SpanSource {
        SpanName => "SPAN_NAME",
        SpanKind => "SPAN_KIND",
        Attribute => "ATTRIBUTE",
        InstrumentationScopeName => "INSTRUMENTATION_SCOPE_NAME",
        InstrumentationScopeVersion => "INSTRUMENTATION_SCOPE_VERSION",
    }
}

cfgmap_core::closed_enum! {
    pub enum Comparison {
        Equals => "EQUALS",
        Contains => "CONTAINS",
        StartsWith => "STARTS_WITH",
        EndsWith => "ENDS_WITH",
        DoesNotEqual => "DOES_NOT_EQUAL",
        DoesNotContain => "DOES_NOT_CONTAIN",
        DoesNotStartWith => "DOES_NOT_START_WITH",
        DoesNotEndWith => "DOES_NOT_END_WITH",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanMatcher {
    pub source: SpanSource,
    #[serde(rename = "type")]
    pub comparison: Comparison,
    /// Attribute key, only meaningful for `ATTRIBUTE` sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
}

impl SpanMatcher {
    /// Test a span property against this matcher. Comparisons are case
    /// sensitive unless `case_sensitive` is explicitly `false`.
    pub fn matches(&self, property: &str) -> bool {
        let (property, value) = if self.case_sensitive == Some(false) {
            (property.to_lowercase(), self.value.to_lowercase())
        } else {
            (property.to_string(), self.value.clone())
        };
        match self.comparison {
            Comparison::Equals => property == value,
            Comparison::Contains => property.contains(&value),
            Comparison::StartsWith => property.starts_with(&value),
            Comparison::EndsWith => property.ends_with(&value),
            Comparison::DoesNotEqual => property != value,
            Comparison::DoesNotContain => !property.contains(&value),
            Comparison::DoesNotStartWith => !property.starts_with(&value),
            Comparison::DoesNotEndWith => !property.ends_with(&value),
        }
    }
}

impl Mapper for SpanMatcher {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::string("source")
                    .required()
                    .describe("Span property to inspect"),
                FieldSpec::string("comparison")
                    .required()
                    .one_of(Comparison::VALUES),
                FieldSpec::string("key").describe("Attribute key for ATTRIBUTE sources"),
                FieldSpec::string("value").required(),
                FieldSpec::bool("case_sensitive"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("source", &self.source)?
            .encode("comparison", &self.comparison)?
            .encode("key", &self.key)?
            .encode("value", &self.value)?
            .encode("case_sensitive", &self.case_sensitive)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            source: decoder.decode_required("source")?,
            comparison: decoder.decode_required("comparison")?,
            key: decoder.decode("key")?,
            value: decoder.decode_required("value")?,
            case_sensitive: decoder.decode("case_sensitive")?,
        })
    }
}

/// Capture or ignore spans whose properties satisfy every matcher
#[derive(Debug, Clone, PartialEq)]
pub struct SpanCaptureRule {
    pub id: Option<String>,
    pub name: String,
    pub action: SpanAction,
    pub matchers: Vec<SpanMatcher>,
    pub unknowns: Unknowns,
}

impl Mapper for SpanCaptureRule {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::string("id").computed(),
                FieldSpec::string("name").required(),
                FieldSpec::string("action")
                    .required()
                    .one_of(SpanAction::VALUES),
                FieldSpec::list_of_blocks("match", SpanMatcher::schema())
                    .required()
                    .min_items(1)
                    .describe("Conditions a span must satisfy, all of them"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("id", &self.id)?
            .encode("name", &self.name)?
            .encode("action", &self.action)?
            .encode_blocks("match", &self.matchers)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            id: decoder.decode_preserved("id")?,
            name: decoder.decode_required("name")?,
            action: decoder.decode_required("action")?,
            matchers: decoder.decode_blocks("match")?,
            unknowns: Unknowns::new(),
        })
    }
}

impl WireEntity for SpanCaptureRule {
    fn to_wire(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("id", &self.id)?
            .encode("ruleName", &self.name)?
            .encode("ruleAction", &self.action)?
            .encode("matchers", &self.matchers)?;
        Ok(())
    }

    fn from_wire(fields: &mut PropertyDecoder) -> Result<Self> {
        Ok(Self {
            id: fields.take("id")?,
            name: fields.take_required("ruleName")?,
            action: fields.take_required("ruleAction")?,
            matchers: fields.take_required("matchers")?,
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

impl Identified for SpanCaptureRule {
    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_remote_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

cfgmap_core::impl_wire_serde!(SpanCaptureRule);

#[cfg(test)]
mod tests {
    use super::*;
    use cfgmap_core::mapper::to_tree_value;
    use cfgmap_core::{Error, from_tree, wire};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_match_list_required() {
        let err = from_tree::<SpanCaptureRule>(&json!({"name": "n", "action": "IGNORE"}))
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequired { ref path } if path == "match"));
    }

    #[test]
    fn test_empty_match_list_violates_cardinality() {
        let tree = json!({"name": "n", "action": "IGNORE", "match": []});
        let err = from_tree::<SpanCaptureRule>(&tree).unwrap_err();
        assert!(matches!(err, Error::Cardinality { count: 0, min: 1, .. }));
    }

    #[test]
    fn test_tree_to_wire() {
        let tree = json!({
            "name": "drop health checks",
            "action": "IGNORE",
            "match": [
                {"source": "SPAN_NAME", "comparison": "STARTS_WITH", "value": "GET /health"},
                {"source": "ATTRIBUTE", "comparison": "EQUALS", "key": "http.route",
                 "value": "/ready", "case_sensitive": false},
            ],
        });
        let rule: SpanCaptureRule = from_tree(&tree).unwrap();
        insta::assert_snapshot!(wire::to_string_pretty(&rule).unwrap(), @r###"
        {
          "matchers": [
            {
              "source": "SPAN_NAME",
              "type": "STARTS_WITH",
              "value": "GET /health"
            },
            {
              "caseSensitive": false,
              "key": "http.route",
              "source": "ATTRIBUTE",
              "type": "EQUALS",
              "value": "/ready"
            }
          ],
          "ruleAction": "IGNORE",
          "ruleName": "drop health checks"
        }
        "###);
        assert_eq!(to_tree_value(&rule).unwrap(), tree);
    }

    #[rstest]
    #[case(Comparison::Equals, None, "GET /health", true)]
    #[case(Comparison::Equals, None, "get /health", false)]
    #[case(Comparison::Equals, Some(false), "get /HEALTH", true)]
    #[case(Comparison::Contains, None, "GET /health/live", true)]
    #[case(Comparison::DoesNotStartWith, None, "POST /health", true)]
    #[case(Comparison::DoesNotEndWith, None, "GET /health", false)]
    fn test_matcher(
        #[case] comparison: Comparison,
        #[case] case_sensitive: Option<bool>,
        #[case] property: &str,
        #[case] expected: bool,
    ) {
        let matcher = SpanMatcher {
            source: SpanSource::SpanName,
            comparison,
            key: None,
            value: "GET /health".to_string(),
            case_sensitive,
        };
        assert_eq!(matcher.matches(property), expected);
    }
}
