//! Configuration entities
//!
//! Each entity declares its tree [`Schema`](cfgmap_core::Schema) and maps
//! itself with [`Mapper`](cfgmap_core::Mapper) and
//! [`WireEntity`](cfgmap_core::WireEntity). [`EntityKind`] looks entities up
//! by name.

pub mod alerting;
pub mod anomalies;
pub mod metrics;
pub mod registry;
pub mod spans;
pub mod tags;

pub use alerting::{AlertingProfile, IncludeMode, SeverityLevel, SeverityRule, TagFilterGroup};
pub use anomalies::{
    DiskAnomalyDetection, DiskLowInodes, DiskLowSpace, DiskSlowWrites, GcDetection, GcThresholds,
    HostAnomalyDetection,
};
pub use metrics::{MetricThreshold, Operator, Unit};
pub use registry::EntityKind;
pub use spans::{Comparison, SpanAction, SpanCaptureRule, SpanMatcher, SpanSource};
pub use tags::{Context, TagFilter};
