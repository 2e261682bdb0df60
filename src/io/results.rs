//! Read/write results JSON files.
//!
//! A results file is the portable record of a run:
//! - run settings (eps, sample rate) and a generation timestamp
//! - per-row raw values, so the signal can be redrawn without the source CSV
//! - endpoints + line statistics, or the reason the fit failed
//!
//! The schema is defined by `domain::ResultsFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::app::pipeline::RunOutput;
use crate::domain::{FitConfig, FitRecord, LineSummary, ResultsFile};
use crate::error::AppError;

/// Build the serializable form of a run.
pub fn results_from_run(run: &RunOutput, config: &FitConfig) -> ResultsFile {
    let fits = run
        .trials
        .iter()
        .enumerate()
        .flat_map(|(idx, trial)| trial.rows.iter().map(move |fit| (idx, trial, fit)))
        .map(|(idx, trial, fit)| {
            let ok = fit.outcome.as_ref().ok();
            FitRecord {
                label: trial.label.clone(),
                trial: idx,
                row: fit.row,
                values: fit.signal.y.clone(),
                endpoints: ok.map(|m| m.endpoints),
                line: ok.map(|m| LineSummary {
                    slope: m.line.slope,
                    intercept: m.line.intercept,
                    r_squared: m.line.r_squared,
                    n_selected: m.n_selected(),
                }),
                error: fit.outcome.as_ref().err().map(ToString::to_string),
            }
        })
        .collect();

    ResultsFile {
        tool: "motorfit".to_string(),
        generated_at: Utc::now(),
        eps: config.eps,
        sample_rate_hz: config.sample_rate_hz,
        fits,
    }
}

/// Write a results JSON file.
pub fn write_results_json(path: &Path, run: &RunOutput, config: &FitConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &results_from_run(run, config))
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    let results: ResultsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))?;

    if !(results.sample_rate_hz.is_finite() && results.sample_rate_hz > 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid results JSON: sample_rate_hz {} must be > 0.", results.sample_rate_hz),
        ));
    }
    Ok(results)
}
