//! Custom metric thresholds

use std::sync::OnceLock;

use cfgmap_core::{
    Decoder, FieldSpec, Identified, Mapper, Properties, PropertyDecoder, Result, Schema,
    Unknowns, WireEntity,
};

cfgmap_core::closed_enum! {
    /// Direction in which a metric violates its threshold
    pub enum Operator {
        Above => "ABOVE",
        Below => "BELOW",
    }
}

cfgmap_core::open_enum! {
    /// Unit of the threshold value
    pub enum Unit {
        Count => "COUNT",
        Percent => "PERCENT",
        Millisecond => "MILLI_SECOND",
        Second => "SECOND",
        Byte => "BYTE",
        KiloByte => "KILO_BYTE",
        MegaByte => "MEGA_BYTE",
    }
}

/// Alert when a metric crosses a fixed threshold.
///
/// An alert is raised once `violating_samples` of the last `samples`
/// sliding window samples violate the threshold, and closed once
/// `dealerting_samples` samples in a row do not.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricThreshold {
    pub id: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub metric_id: String,
    pub operator: Operator,
    pub threshold: f64,
    pub samples: i64,
    pub violating_samples: i64,
    pub dealerting_samples: i64,
    pub alert_on_missing_data: Option<bool>,
    pub unit: Option<Unit>,
    pub unknowns: Unknowns,
}

impl MetricThreshold {
    pub fn is_violated(&self, value: f64) -> bool {
        match self.operator {
            Operator::Above => value > self.threshold,
            Operator::Below => value < self.threshold,
        }
    }
}

impl Mapper for MetricThreshold {
    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(vec![
                FieldSpec::string("id").computed(),
                FieldSpec::string("name").required(),
                FieldSpec::bool("enabled").required(),
                FieldSpec::string("metric_id")
                    .required()
                    .describe("Metric key, e.g. builtin:host.cpu.usage"),
                FieldSpec::string("operator")
                    .required()
                    .one_of(Operator::VALUES),
                FieldSpec::float("threshold").required(),
                FieldSpec::int("samples")
                    .required()
                    .describe("Size of the sliding window"),
                FieldSpec::int("violating_samples")
                    .required()
                    .describe("Violating samples in the window that raise an alert"),
                FieldSpec::int("dealerting_samples")
                    .required()
                    .describe("Non-violating samples in a row that close an alert"),
                FieldSpec::bool("alert_on_missing_data"),
                FieldSpec::string("unit"),
            ])
        })
    }

    fn to_tree(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("id", &self.id)?
            .encode("name", &self.name)?
            .encode("enabled", &self.enabled)?
            .encode("metric_id", &self.metric_id)?
            .encode("operator", &self.operator)?
            .encode("threshold", &self.threshold)?
            .encode("samples", &self.samples)?
            .encode("violating_samples", &self.violating_samples)?
            .encode("dealerting_samples", &self.dealerting_samples)?
            .encode("alert_on_missing_data", &self.alert_on_missing_data)?
            .encode("unit", &self.unit)?;
        Ok(())
    }

    fn from_tree(decoder: &Decoder<'_>) -> Result<Self> {
        Ok(Self {
            id: decoder.decode_preserved("id")?,
            name: decoder.decode_required("name")?,
            enabled: decoder.decode_required("enabled")?,
            metric_id: decoder.decode_required("metric_id")?,
            operator: decoder.decode_required("operator")?,
            threshold: decoder.decode_required("threshold")?,
            samples: decoder.decode_required("samples")?,
            violating_samples: decoder.decode_required("violating_samples")?,
            dealerting_samples: decoder.decode_required("dealerting_samples")?,
            alert_on_missing_data: decoder.decode("alert_on_missing_data")?,
            unit: decoder.decode("unit")?,
            unknowns: Unknowns::new(),
        })
    }
}

impl WireEntity for MetricThreshold {
    fn to_wire(&self, props: &mut Properties) -> Result<()> {
        props
            .encode("id", &self.id)?
            .encode("name", &self.name)?
            .encode("enabled", &self.enabled)?
            .encode("metricId", &self.metric_id)?
            .encode("alertCondition", &self.operator)?
            .encode("threshold", &self.threshold)?
            .encode("samples", &self.samples)?
            .encode("violatingSamples", &self.violating_samples)?
            .encode("dealertingSamples", &self.dealerting_samples)?
            .encode("alertOnNoData", &self.alert_on_missing_data)?
            .encode("unit", &self.unit)?;
        Ok(())
    }

    fn from_wire(fields: &mut PropertyDecoder) -> Result<Self> {
        Ok(Self {
            id: fields.take("id")?,
            name: fields.take_required("name")?,
            enabled: fields.take_required("enabled")?,
            metric_id: fields.take_required("metricId")?,
            operator: fields.take_required("alertCondition")?,
            threshold: fields.take_required("threshold")?,
            samples: fields.take_required("samples")?,
            violating_samples: fields.take_required("violatingSamples")?,
            dealerting_samples: fields.take_required("dealertingSamples")?,
            alert_on_missing_data: fields.take("alertOnNoData")?,
            unit: fields.take("unit")?,
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

impl Identified for MetricThreshold {
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

cfgmap_core::impl_wire_serde!(MetricThreshold);
