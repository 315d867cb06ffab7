//! Command implementations for cfgmap-cli

pub mod convert;
pub mod remote;

pub use convert::{run_decode, run_encode, run_kinds, run_schema};
pub use remote::{run_pull, run_push};
