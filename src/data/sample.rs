//! Synthetic motor position trials.
//!
//! Each row is a step response: a low plateau, one linear ramp, a high
//! plateau, with Gaussian sensor noise on top. Successful trials ramp all the
//! way to the commanded position; failed trials stall part of the way.
//!
//! Generation is seeded, so a `(kind, seed)` pair always yields the same rows.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::TrialMatrix;
use crate::error::AppError;
use crate::io::ingest::TrialSource;

/// Motor position at rest.
const REST_POSITION: f64 = 160.0;

/// Commanded final position.
const TARGET_POSITION: f64 = 900.0;

/// Samples per row (two seconds at 30 Hz).
const ROW_SAMPLES: usize = 60;

/// Sensor noise (position units, one standard deviation).
const NOISE_SD: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialKind {
    Successful,
    Failed,
}

impl TrialKind {
    pub fn display_name(self) -> &'static str {
        match self {
            TrialKind::Successful => "Successful",
            TrialKind::Failed => "Failed",
        }
    }
}

/// Where the ramp really starts and ends in a generated row (sample indices).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampTruth {
    pub start: usize,
    pub end: usize,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub matrix: TrialMatrix,
    pub truth: Vec<RampTruth>,
}

/// Generate `n_rows` trials of the given kind.
pub fn generate_trials(kind: TrialKind, n_rows: usize, seed: u64) -> Result<SampleData, AppError> {
    if n_rows == 0 {
        return Err(AppError::new(2, "Synthetic row count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(kind, seed));
    let noise = Normal::new(0.0, NOISE_SD)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(n_rows);
    let mut truth = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let start = rng.gen_range(8..20);
        let len = rng.gen_range(6..14);
        let high = match kind {
            TrialKind::Successful => TARGET_POSITION,
            TrialKind::Failed => {
                let stall = rng.gen_range(0.35..0.6);
                REST_POSITION + (TARGET_POSITION - REST_POSITION) * stall
            }
        };
        let ramp = RampTruth {
            start,
            end: start + len,
            low: REST_POSITION,
            high,
        };

        let row: Vec<f64> = (0..ROW_SAMPLES)
            .map(|i| ramp_value(&ramp, i) + noise.sample(&mut rng))
            .collect();

        rows.push(row);
        truth.push(ramp);
    }

    Ok(SampleData {
        matrix: TrialMatrix::new(rows)?,
        truth,
    })
}

fn ramp_value(ramp: &RampTruth, i: usize) -> f64 {
    if i <= ramp.start {
        return ramp.low;
    }
    if i >= ramp.end {
        return ramp.high;
    }
    let u = (i - ramp.start) as f64 / (ramp.end - ramp.start) as f64;
    ramp.low + u * (ramp.high - ramp.low)
}

fn sample_seed(kind: TrialKind, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    kind.display_name().hash(&mut hasher);
    seed.hash(&mut hasher);
    hasher.finish()
}

/// Generated trials exposed through the same seam as CSV files.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    kind: TrialKind,
    n_rows: usize,
    seed: u64,
}

impl SyntheticSource {
    pub fn new(kind: TrialKind, n_rows: usize, seed: u64) -> Self {
        Self { kind, n_rows, seed }
    }
}

impl TrialSource for SyntheticSource {
    fn label(&self) -> &str {
        self.kind.display_name()
    }

    fn describe(&self) -> String {
        format!("synthetic (rows={}, seed={})", self.n_rows, self.seed)
    }

    fn load(&self) -> Result<TrialMatrix, AppError> {
        generate_trials(self.kind, self.n_rows, self.seed).map(|s| s.matrix)
    }
}
