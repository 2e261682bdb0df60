//! Threshold band and middle-segment selection.
//!
//! A step-like signal sits on a low plateau, ramps, then sits on a high
//! plateau. The band trims `delta = eps * (y_max - y_min)` off both ends of
//! the observed value range; whatever is *strictly* inside is the ramp.

/// Value range of a signal plus the dead-zone margin derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    pub y_min: f64,
    pub y_max: f64,
    pub delta: f64,
}

impl ThresholdBand {
    /// Compute the band for a set of values. `None` for empty input.
    pub fn from_values(y: &[f64], eps: f64) -> Option<Self> {
        if y.is_empty() {
            return None;
        }
        let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);
        let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            y_min,
            y_max,
            delta: eps * (y_max - y_min),
        })
    }

    pub fn range(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Exclusive lower bound of the middle segment.
    pub fn lower(&self) -> f64 {
        self.y_min + self.delta
    }

    /// Exclusive upper bound of the middle segment.
    pub fn upper(&self) -> f64 {
        self.y_max - self.delta
    }

    /// Strict on both sides: values equal to a bound are excluded.
    pub fn contains(&self, v: f64) -> bool {
        v > self.lower() && v < self.upper()
    }

    /// Boolean mask over `y` marking the middle-segment samples.
    pub fn middle_mask(&self, y: &[f64]) -> Vec<bool> {
        y.iter().map(|&v| self.contains(v)).collect()
    }
}
