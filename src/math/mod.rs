//! Mathematical utilities: least squares and simple linear regression.

pub mod ols;

pub use ols::*;
