//! Middle-segment fitting.
//!
//! Responsibilities:
//!
//! - derive the threshold band and select the middle samples (`band`)
//! - regress over them and back-solve the endpoints (`middle`)

pub mod band;
pub mod middle;

pub use band::*;
pub use middle::*;
