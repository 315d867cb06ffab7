use std::collections::BTreeSet;
use std::sync::OnceLock;

use cfgmap_core::{
    Composite, Decoder, FieldSpec, Mapper, Properties, PropertyDecoder, Result, Schema, Toggle,
    Unknowns, WireEntity,
};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::disk::DiskAnomalyDetection;
use super::gc::GcDetection;

const LOW_SPACE: &str = "diskLowSpaceDetection";
const SLOW_DISK: &str = "diskSlowWritesAndReadsDetection";
const LOW_INODES: &str = "diskLowInodesDetection";
const HIGH_GC: &str = "highGcActivityDetection";

/// Host anomaly detection settings.
///
/// On the wire the disk detectors sit at the top level of the object; in the
/// tree they are grouped under a single `disks` block that is only written
/// when at least one of them is enabled.
///
/// A detector missing from a decoded wire document is recorded in `omitted`
/// and stays absent on re-encode for as long as it is still disabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostAnomalyDetection {
    pub disks: DiskAnomalyDetection,
    pub gc: GcDetection,
    pub omitted: BTreeSet<&'static str>,
    pub unknowns: Unknowns,
}

impl HostAnomalyDetection {
    fn encode_detector<T>(&self, props: &mut Properties, key: &str, detector: &T) -> Result<()>
    where
        T: Serialize + Toggle + PartialEq,
    {
        if self.omitted.contains(key) && *detector == T::disabled() {
            return Ok(());
        }
        props.encode(key, detector)?;
        Ok(())
    }
}

fn take_detector<T: DeserializeOwned + Toggle>(
    fields: &mut PropertyDecoder,
    key: &'static str,
    omitted: &mut BTreeSet<&'static str>,
) -> Result<T> {
    match fields.take(key)? {
        Some(detector) => Ok(detector),
        None => {
            omitted.insert(key);
            Ok(T::disabled())
        }
    }
}

impl Mapper for HostAnomalyDetection {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::block("disks", DiskAnomalyDetection::schema())
                    .describe("Disk related detection"),
                FieldSpec::block("gc", GcDetection::schema())
                    .describe("High GC activity detection. Omit to disable"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        if self.disks.is_configured() {
            props.encode_block("disks", &self.disks)?;
        }
        props.encode_toggle("gc", &self.gc)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            disks: decoder.decode_block("disks")?.unwrap_or_default(),
            gc: decoder.decode_toggle("gc")?,
            omitted: BTreeSet::new(),
            unknowns: Unknowns::new(),
        })
    }
}

impl WireEntity for HostAnomalyDetection {
    fn to_wire(&self, props: &mut Properties) -> Result<()> {
        self.encode_detector(props, LOW_SPACE, &self.disks.space)?;
        self.encode_detector(props, SLOW_DISK, &self.disks.speed)?;
        self.encode_detector(props, LOW_INODES, &self.disks.inodes)?;
        self.encode_detector(props, HIGH_GC, &self.gc)?;
        Ok(())
    }

    fn from_wire(fields: &mut PropertyDecoder) -> Result<Self> {
        let mut omitted = BTreeSet::new();
        let disks = DiskAnomalyDetection {
            space: take_detector(fields, LOW_SPACE, &mut omitted)?,
            speed: take_detector(fields, SLOW_DISK, &mut omitted)?,
            inodes: take_detector(fields, LOW_INODES, &mut omitted)?,
        };
        Ok(Self {
            disks,
            gc: take_detector(fields, HIGH_GC, &mut omitted)?,
            omitted,
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

cfgmap_core::impl_wire_serde!(HostAnomalyDetection);
