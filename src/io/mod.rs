//! Input/output helpers.
//!
//! - trial CSV ingest + the `TrialSource` seam (`ingest`)
//! - per-row CSV export (`export`)
//! - results JSON read/write (`results`)

pub mod export;
pub mod ingest;
pub mod results;

pub use export::*;
pub use ingest::*;
pub use results::*;
