//! Trial data ingest.
//!
//! Motor position logs are plain numeric CSV: no header, one trial per row,
//! one sample per column. This module turns them into a validated
//! `TrialMatrix` and defines the `TrialSource` seam the pipeline loads through.
//!
//! Design goals:
//! - **Strict schema**: every field numeric and finite, every row the same width
//! - **Located errors**: parse failures name the line and column (exit code 2)
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::TrialMatrix;
use crate::error::AppError;

/// Something that can produce a labelled block of trial rows.
///
/// The pipeline only sees this trait, so files, generated data, and test
/// fixtures are interchangeable.
pub trait TrialSource: Send + Sync {
    /// Short name shown in panel titles and reports (e.g. "Successful").
    fn label(&self) -> &str;

    /// Where the data comes from, for logs and summaries.
    fn describe(&self) -> String;

    fn load(&self) -> Result<TrialMatrix, AppError>;
}

/// Trial rows read from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvTrialSource {
    label: String,
    path: PathBuf,
}

impl CsvTrialSource {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// Parse a `LABEL=PATH` command-line spec.
    pub fn parse_spec(spec: &str) -> Result<Self, AppError> {
        let Some((label, path)) = spec.split_once('=') else {
            return Err(AppError::new(
                2,
                format!("Invalid trial '{spec}': expected LABEL=PATH."),
            ));
        };
        let label = label.trim();
        let path = path.trim();
        if label.is_empty() || path.is_empty() {
            return Err(AppError::new(
                2,
                format!("Invalid trial '{spec}': label and path must both be non-empty."),
            ));
        }
        Ok(Self::new(label, path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrialSource for CsvTrialSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<TrialMatrix, AppError> {
        load_trial_matrix(&self.path)
    }
}

/// Open and parse a trial CSV file.
pub fn load_trial_matrix(path: &Path) -> Result<TrialMatrix, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open trial CSV '{}': {e}", path.display()))
    })?;

    let matrix = read_trial_matrix(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    info!(
        path = %path.display(),
        rows = matrix.n_rows(),
        samples = matrix.n_cols(),
        "loaded trial data"
    );
    Ok(matrix)
}

/// Parse headerless numeric CSV from any reader.
pub fn read_trial_matrix<R: Read>(reader: R) -> Result<TrialMatrix, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error: {e}")))?;
        // Whitespace-only lines trim down to empty fields; treat them as blank.
        if record.iter().all(str::is_empty) {
            continue;
        }
        // Blank lines are skipped by the reader, so positions can run ahead of
        // the record count.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);

        let row = record
            .iter()
            .enumerate()
            .map(|(col, field)| parse_sample(field, line, col + 1))
            .collect::<Result<Vec<f64>, AppError>>()?;

        debug!(line, samples = row.len(), "parsed trial row");
        rows.push(row);
    }

    TrialMatrix::new(rows)
}

fn parse_sample(field: &str, line: usize, col: usize) -> Result<f64, AppError> {
    let v = field.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!("line {line}, column {col}: cannot parse '{field}' as a number"),
        )
    })?;
    if !v.is_finite() {
        return Err(AppError::new(
            2,
            format!("line {line}, column {col}: value '{field}' is not finite"),
        ));
    }
    Ok(v)
}
