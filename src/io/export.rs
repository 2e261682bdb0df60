//! Export per-row fit results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.
//! Failed rows are kept, with the numeric columns left empty and the reason in
//! `error`.

use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::FitConfig;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    label: &'a str,
    row: usize,
    n_samples: usize,
    n_selected: Option<usize>,
    eps: f64,
    y_min: Option<f64>,
    y_max: Option<f64>,
    x_start: Option<f64>,
    x_end: Option<f64>,
    duration: Option<f64>,
    slope: Option<f64>,
    intercept: Option<f64>,
    r_squared: Option<f64>,
    error: Option<String>,
}

/// Write per-row results to a CSV file.
pub fn write_results_csv(path: &Path, run: &RunOutput, config: &FitConfig) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    for (trial, fit) in run.fits() {
        let ok = fit.outcome.as_ref().ok();
        let record = ExportRow {
            label: &trial.label,
            row: fit.row,
            n_samples: fit.signal.len(),
            n_selected: ok.map(|m| m.n_selected()),
            eps: config.eps,
            y_min: ok.map(|m| m.band.y_min),
            y_max: ok.map(|m| m.band.y_max),
            x_start: ok.map(|m| m.endpoints.start.x),
            x_end: ok.map(|m| m.endpoints.end.x),
            duration: ok.map(|m| m.endpoints.duration()),
            slope: ok.map(|m| m.line.slope),
            intercept: ok.map(|m| m.line.intercept),
            r_squared: ok.map(|m| m.line.r_squared),
            error: fit.outcome.as_ref().err().map(ToString::to_string),
        };
        writer
            .serialize(record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
