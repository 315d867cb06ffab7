//! High garbage collection activity detection

use std::sync::OnceLock;

use cfgmap_core::{Decoder, FieldSpec, Mapper, Properties, Result, Schema, Toggle};
use serde::{Deserialize, Serialize};

/// Custom GC thresholds. Without them the detector runs in automatic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcThresholds {
    /// Share of time spent in garbage collection
    pub time_percentage: i64,
    /// Share of time the process is suspended by garbage collection
    pub suspension_percentage: i64,
}

impl Mapper for GcThresholds {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::int("time_percentage")
                    .required()
                    .describe("Alert if GC time exceeds this percentage"),
                FieldSpec::int("suspension_percentage")
                    .required()
                    .describe("Alert if GC suspension exceeds this percentage"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("time_percentage", &self.time_percentage)?
            .encode("suspension_percentage", &self.suspension_percentage)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            time_percentage: decoder.decode_required("time_percentage")?,
            suspension_percentage: decoder.decode_required("suspension_percentage")?,
        })
    }
}

/// GC activity detector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GcWire", try_from = "GcWire")]
pub struct GcDetection {
    pub enabled: bool,
    pub thresholds: Option<GcThresholds>,
}

impl Toggle for GcDetection {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn disabled() -> Self {
        Self::default()
    }
}

impl Mapper for GcDetection {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::block("thresholds", GcThresholds::schema())
                    .describe("Custom thresholds. Omit for automatic detection"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props.encode_optional_block("thresholds", self.thresholds.as_ref())?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            enabled: true,
            thresholds: decoder.decode_block("thresholds")?,
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GcWire {
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gc_time_percentage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gc_suspension_percentage: Option<i64>,
}

impl From<GcDetection> for GcWire {
    fn from(gc: GcDetection) -> Self {
        Self {
            enabled: gc.enabled,
            gc_time_percentage: gc.thresholds.map(|t| t.time_percentage),
            gc_suspension_percentage: gc.thresholds.map(|t| t.suspension_percentage),
        }
    }
}

impl TryFrom<GcWire> for GcDetection {
    type Error = String;

    fn try_from(wire: GcWire) -> std::result::Result<Self, Self::Error> {
        let thresholds = match (wire.gc_time_percentage, wire.gc_suspension_percentage) {
            (Some(time_percentage), Some(suspension_percentage)) => Some(GcThresholds {
                time_percentage,
                suspension_percentage,
            }),
            (None, None) => None,
            _ => {
                return Err(
                    "gcTimePercentage and gcSuspensionPercentage must be set together".to_string(),
                );
            }
        };
        Ok(Self {
            enabled: wire.enabled,
            thresholds,
        })
    }
}
