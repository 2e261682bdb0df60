//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - signals and the trial matrices they come from (`Signal`, `TrialMatrix`)
//! - fit outputs (`FitEndpoints`, `Point`)
//! - run configuration and saved results (`FitConfig`, `ResultsFile`)

pub mod types;

pub use types::*;
