//! Rendering of fitted panels.
//!
//! The pipeline never draws anything itself; front-ends hand the panels to a
//! `Renderer`.

pub mod ascii;

pub use ascii::{AsciiRenderer, render_panel};

use crate::domain::Panel;
use crate::error::AppError;

/// Consumes panels (raw signal + fitted endpoints) and presents them.
pub trait Renderer {
    fn render(&mut self, panels: &[Panel]) -> Result<(), AppError>;
}

/// Min/max of the finite values, widened to a unit span around the level when
/// every value is the same. `None` when there are no finite values.
pub fn axis_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        Some((min - 0.5, max + 0.5))
    }
}
