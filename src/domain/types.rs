//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Dead-zone fraction used when none is given.
pub const DEFAULT_EPS: f64 = 0.01;

/// Motor position logs are sampled at 30 Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 30.0;

/// Largest accepted `eps`. At this value the band collapses and no sample can
/// be strictly inside it.
pub const MAX_EPS: f64 = 0.5;

/// A point in `(time, value)` space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the fitted line crosses the signal's observed minimum and maximum.
///
/// `start` is the crossing at `y_min`, `end` the crossing at `y_max`. For a
/// rising signal that is "when the motor started / stopped moving". For a
/// falling signal `start.x > end.x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitEndpoints {
    pub start: Point,
    pub end: Point,
}

impl FitEndpoints {
    /// `((x_at_ymin, y_min), (x_at_ymax, y_max))`.
    pub fn as_tuples(&self) -> ((f64, f64), (f64, f64)) {
        ((self.start.x, self.start.y), (self.end.x, self.end.y))
    }

    /// Time between the two crossings.
    pub fn duration(&self) -> f64 {
        self.end.x - self.start.x
    }
}

/// One scalar measurement over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub t: Vec<f64>,
    pub y: Vec<f64>,
}

impl Signal {
    /// Attach a uniform sample clock to a row of values.
    pub fn from_clock(values: &[f64], sample_rate_hz: f64) -> Self {
        Self {
            t: time_axis(values.len(), sample_rate_hz),
            y: values.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.t.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// Uniform sample clock: `t[i] = i * (1 / sample_rate_hz)`, exactly `n` values.
pub fn time_axis(n: usize, sample_rate_hz: f64) -> Vec<f64> {
    let step = 1.0 / sample_rate_hz;
    (0..n).map(|i| i as f64 * step).collect()
}

/// Rectangular block of samples: rows are trials, columns are time samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialMatrix {
    rows: Vec<Vec<f64>>,
    n_cols: usize,
}

impl TrialMatrix {
    /// Build a matrix, rejecting empty and ragged input.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, AppError> {
        let Some(first) = rows.first() else {
            return Err(AppError::new(3, "Trial data contains no rows."));
        };
        let n_cols = first.len();
        if n_cols == 0 {
            return Err(AppError::new(3, "Trial data rows contain no samples."));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(AppError::new(
                2,
                format!(
                    "Ragged trial data: row {} has {} samples, expected {n_cols}.",
                    idx + 1,
                    row.len()
                ),
            ));
        }
        Ok(Self { rows, n_cols })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Which trial rows to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    Single(usize),
    All,
}

impl RowSelection {
    /// Resolve against a matrix height.
    pub fn indices(self, n_rows: usize) -> Result<Vec<usize>, AppError> {
        match self {
            RowSelection::All => Ok((0..n_rows).collect()),
            RowSelection::Single(idx) if idx < n_rows => Ok(vec![idx]),
            RowSelection::Single(idx) => Err(AppError::new(
                2,
                format!("Row {idx} is out of range (data has {n_rows} row(s))."),
            )),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Dead-zone fraction of the value range, trimmed from both ends.
    pub eps: f64,
    pub sample_rate_hz: f64,
    pub rows: RowSelection,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            rows: RowSelection::Single(0),
            plot: true,
            plot_width: 60,
            plot_height: 18,
            export_results: None,
            export_json: None,
        }
    }
}

impl FitConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.eps.is_finite() && (0.0..=MAX_EPS).contains(&self.eps)) {
            return Err(AppError::new(
                2,
                format!("Invalid eps {}: must be in [0, {MAX_EPS}].", self.eps),
            ));
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(AppError::new(
                2,
                format!("Invalid sample rate {}: must be > 0 Hz.", self.sample_rate_hz),
            ));
        }
        if self.plot && (self.plot_width < 10 || self.plot_height < 5) {
            return Err(AppError::new(2, "Plot must be at least 10 columns by 5 rows."));
        }
        Ok(())
    }
}

/// Everything a renderer needs to draw one trial row.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub points: Vec<(f64, f64)>,
    pub endpoints: Option<FitEndpoints>,
}

/// A saved results file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub eps: f64,
    pub sample_rate_hz: f64,
    pub fits: Vec<FitRecord>,
}

/// One fitted (or failed) trial row inside a `ResultsFile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitRecord {
    pub label: String,
    /// Position of the trial source within the run.
    #[serde(default)]
    pub trial: usize,
    pub row: usize,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<FitEndpoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Line statistics kept alongside the endpoints for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSummary {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n_selected: usize,
}
