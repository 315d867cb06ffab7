//! Anomaly detection settings

pub mod disk;
pub mod gc;
pub mod host;

pub use disk::{DiskAnomalyDetection, DiskLowInodes, DiskLowSpace, DiskSlowWrites};
pub use gc::{GcDetection, GcThresholds};
pub use host::HostAnomalyDetection;
