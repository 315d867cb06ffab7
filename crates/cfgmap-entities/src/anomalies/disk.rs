//! Disk anomaly detection
//!
//! Three independent detectors. In the tree each one is a block whose
//! presence means "enabled"; on the wire each one is an object with an
//! explicit `enabled` flag.
//!
//! ```toml
//! [[space]]
//! percentage = 10
//!
//! [[inodes]]
//! percentage = 5
//! ```

use std::sync::OnceLock;

use cfgmap_core::{
    Composite, Decoder, FieldSpec, Mapper, Properties, Result, Schema, Toggle,
};
use serde::{Deserialize, Serialize};

/// Alert when free disk space drops below a percentage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskLowSpace {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space_percentage: Option<i64>,
}

impl Default for DiskLowSpace {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Toggle for DiskLowSpace {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn disabled() -> Self {
        Self {
            enabled: false,
            free_space_percentage: None,
        }
    }
}

impl Mapper for DiskLowSpace {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::int("percentage")
                    .required()
                    .describe("Alert if free disk space is lower than this percentage"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props.encode("percentage", &self.free_space_percentage)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            enabled: true,
            free_space_percentage: Some(decoder.decode_required("percentage")?),
        })
    }
}

/// Alert when disk reads and writes are slower than a threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSlowWrites {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_and_read_time: Option<i64>,
}

impl Default for DiskSlowWrites {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Toggle for DiskSlowWrites {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn disabled() -> Self {
        Self {
            enabled: false,
            write_and_read_time: None,
        }
    }
}

impl Mapper for DiskSlowWrites {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::int("milliseconds")
                    .required()
                    .describe("Alert if disk read/write time exceeds this many milliseconds"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props.encode("milliseconds", &self.write_and_read_time)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            enabled: true,
            write_and_read_time: Some(decoder.decode_required("milliseconds")?),
        })
    }
}

/// Alert when free inodes drop below a percentage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskLowInodes {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_inodes_percentage: Option<i64>,
}

impl Default for DiskLowInodes {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Toggle for DiskLowInodes {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn disabled() -> Self {
        Self {
            enabled: false,
            free_inodes_percentage: None,
        }
    }
}

impl Mapper for DiskLowInodes {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::int("percentage")
                    .required()
                    .describe("Alert if the percentage of available inodes is lower than this"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props.encode("percentage", &self.free_inodes_percentage)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            enabled: true,
            free_inodes_percentage: Some(decoder.decode_required("percentage")?),
        })
    }
}

/// Disk detectors; absent blocks decode to disabled detectors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskAnomalyDetection {
    #[serde(rename = "diskLowSpaceDetection", default)]
    pub space: DiskLowSpace,
    #[serde(rename = "diskSlowWritesAndReadsDetection", default)]
    pub speed: DiskSlowWrites,
    #[serde(rename = "diskLowInodesDetection", default)]
    pub inodes: DiskLowInodes,
}

impl Composite for DiskAnomalyDetection {
    fn is_configured(&self) -> bool {
        self.space.enabled || self.speed.enabled || self.inodes.enabled
    }
}

impl Mapper for DiskAnomalyDetection {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::block("space", DiskLowSpace::schema())
                    .describe("Low disk space detection. Omit to disable"),
                FieldSpec::block("speed", DiskSlowWrites::schema())
                    .describe("Slow disk detection. Omit to disable"),
                FieldSpec::block("inodes", DiskLowInodes::schema())
                    .describe("Low inodes detection. Omit to disable"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode_toggle("space", &self.space)?
            .encode_toggle("speed", &self.speed)?
            .encode_toggle("inodes", &self.inodes)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            space: decoder.decode_toggle("space")?,
            speed: decoder.decode_toggle("speed")?,
            inodes: decoder.decode_toggle("inodes")?,
        })
    }
}
