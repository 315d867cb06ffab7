//! Tag filters

use std::sync::OnceLock;

use cfgmap_core::{Canonical, Decoder, FieldSpec, Mapper, Properties, Result, Schema};
use serde::{Deserialize, Serialize};

cfgmap_core::open_enum! {
    /// Origin of a tag. New cloud contexts appear server side without notice.
    pub enum Context {
        Contextless => "CONTEXTLESS",
        Aws => "AWS",
        AwsGeneric => "AWS_GENERIC",
        Azure => "AZURE",
        CloudFoundry => "CLOUD_FOUNDRY",
        Environment => "ENVIRONMENT",
        GoogleCloud => "GOOGLE_CLOUD",
        Kubernetes => "KUBERNETES",
    }
}

/// A single `context:key[:value]` tag match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub context: Context,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl TagFilter {
    pub fn new(context: Context, key: impl Into<String>) -> Self {
        Self {
            context,
            key: key.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Canonical for TagFilter {
    type Key = (String, String, Option<String>);

    fn canonical_key(&self) -> Self::Key {
        (
            self.context.as_str().to_string(),
            self.key.clone(),
            self.value.clone(),
        )
    }
}

impl Mapper for TagFilter {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::string("context")
                    .required()
                    .describe("Origin of the tag, such as CONTEXTLESS or KUBERNETES"),
                FieldSpec::string("key").required().describe("Tag key"),
                FieldSpec::string("value").describe("Tag value"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("context", &self.context)?
            .encode("key", &self.key)?
            .encode("value", &self.value)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            context: decoder.decode_required("context")?,
            key: decoder.decode_required("key")?,
            value: decoder.decode("value")?,
        })
    }
}
