//! Data sources that don't come from disk.
//!
//! - synthetic step-response trials (`sample`)

pub mod sample;

pub use sample::{SampleData, SyntheticSource, TrialKind, generate_trials};
