//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! source load -> row selection -> sample clock -> middle-segment fit
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{FitConfig, Signal, TrialMatrix};
use crate::error::{AppError, FitError};
use crate::fit::{MiddleFit, fit_middle_segment_detailed};
use crate::io::ingest::TrialSource;

/// One fitted trial row. A failed fit keeps its error instead of aborting
/// the rest of the run.
#[derive(Debug, Clone)]
pub struct RowFit {
    pub row: usize,
    pub signal: Signal,
    pub outcome: Result<MiddleFit, FitError>,
}

/// All fitted rows for one source.
#[derive(Debug, Clone)]
pub struct TrialRun {
    pub label: String,
    pub source: String,
    pub n_rows: usize,
    pub rows: Vec<RowFit>,
}

/// All computed outputs of a single `motorfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trials: Vec<TrialRun>,
}

impl RunOutput {
    /// Every `(trial, row)` pair in display order.
    pub fn fits(&self) -> impl Iterator<Item = (&TrialRun, &RowFit)> {
        self.trials
            .iter()
            .flat_map(|trial| trial.rows.iter().map(move |row| (trial, row)))
    }

    /// Rows whose fit failed, in display order.
    pub fn failures(&self) -> Vec<(&str, usize, &FitError)> {
        self.fits()
            .filter_map(|(trial, row)| {
                row.outcome
                    .as_ref()
                    .err()
                    .map(|e| (trial.label.as_str(), row.row, e))
            })
            .collect()
    }
}

/// Load every source and fit the configured rows.
pub fn run_fit(sources: &[Box<dyn TrialSource>], config: &FitConfig) -> Result<RunOutput, AppError> {
    config.validate()?;
    if sources.is_empty() {
        return Err(AppError::new(2, "No trial sources given."));
    }

    let mut trials = Vec::with_capacity(sources.len());
    for source in sources {
        let matrix = source.load()?;
        info!(
            label = source.label(),
            source = %source.describe(),
            rows = matrix.n_rows(),
            "fitting trial"
        );
        trials.push(fit_trial(source.label(), &source.describe(), &matrix, config)?);
    }

    Ok(RunOutput { trials })
}

/// Fit the configured rows of an already-loaded matrix.
///
/// Rows are independent, so they are fitted in parallel; results come back in
/// row order.
pub fn fit_trial(
    label: &str,
    source: &str,
    matrix: &TrialMatrix,
    config: &FitConfig,
) -> Result<TrialRun, AppError> {
    let indices = config.rows.indices(matrix.n_rows())?;

    let rows: Vec<RowFit> = indices
        .par_iter()
        .filter_map(|&row| matrix.row(row).map(|values| (row, values)))
        .map(|(row, values)| {
            let signal = Signal::from_clock(values, config.sample_rate_hz);
            let outcome = fit_middle_segment_detailed(&signal.t, &signal.y, config.eps);
            RowFit { row, signal, outcome }
        })
        .collect();

    for fit in &rows {
        match &fit.outcome {
            Ok(m) => debug!(
                label,
                row = fit.row,
                selected = m.n_selected(),
                start = m.endpoints.start.x,
                end = m.endpoints.end.x,
                "row fitted"
            ),
            Err(e) => warn!(label, row = fit.row, error = %e, "row fit failed"),
        }
    }

    Ok(TrialRun {
        label: label.to_string(),
        source: source.to_string(),
        n_rows: matrix.n_rows(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowSelection;

    struct FixedSource {
        label: &'static str,
        rows: Vec<Vec<f64>>,
    }

    impl TrialSource for FixedSource {
        fn label(&self) -> &str {
            self.label
        }

        fn describe(&self) -> String {
            "fixture".to_string()
        }

        fn load(&self) -> Result<TrialMatrix, AppError> {
            TrialMatrix::new(self.rows.clone())
        }
    }

    fn ramp_row(scale: f64) -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 100.0, 100.0, 100.0]
            .into_iter()
            .map(|v| v * scale)
            .collect()
    }

    fn unit_clock_config(rows: RowSelection) -> FitConfig {
        FitConfig {
            sample_rate_hz: 1.0,
            rows,
            ..FitConfig::default()
        }
    }

    #[test]
    fn fits_selected_row_of_each_source() {
        let sources: Vec<Box<dyn TrialSource>> = vec![
            Box::new(FixedSource { label: "Successful", rows: vec![ramp_row(1.0), ramp_row(2.0)] }),
            Box::new(FixedSource { label: "Failed", rows: vec![ramp_row(0.5)] }),
        ];

        let run = run_fit(&sources, &unit_clock_config(RowSelection::Single(0))).unwrap();
        assert_eq!(run.trials.len(), 2);
        assert_eq!(run.trials[0].label, "Successful");
        assert_eq!(run.trials[0].n_rows, 2);
        assert_eq!(run.trials[0].rows.len(), 1);

        for (_, row) in run.fits() {
            let fit = row.outcome.as_ref().unwrap();
            assert!((fit.endpoints.start.x - 2.0).abs() < 1e-9);
            assert!((fit.endpoints.end.x - 7.0).abs() < 1e-9);
        }
        assert!(run.failures().is_empty());
    }

    #[test]
    fn all_rows_keep_row_order() {
        let rows: Vec<Vec<f64>> = (1..=6).map(|k| ramp_row(k as f64)).collect();
        let matrix = TrialMatrix::new(rows).unwrap();

        let trial = fit_trial("Successful", "fixture", &matrix, &unit_clock_config(RowSelection::All)).unwrap();
        let order: Vec<usize> = trial.rows.iter().map(|r| r.row).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);

        let last = trial.rows[5].outcome.as_ref().unwrap();
        assert_eq!(last.endpoints.end.y, 600.0);
    }

    #[test]
    fn failed_row_does_not_stop_the_run() {
        let flat = vec![5.0; 11];
        let matrix = TrialMatrix::new(vec![ramp_row(1.0), flat]).unwrap();

        let trial = fit_trial("Failed", "fixture", &matrix, &unit_clock_config(RowSelection::All)).unwrap();
        assert!(trial.rows[0].outcome.is_ok());
        assert!(matches!(
            trial.rows[1].outcome,
            Err(FitError::InsufficientData { selected: 0, .. })
        ));

        let run = RunOutput { trials: vec![trial] };
        let failures = run.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "Failed");
        assert_eq!(failures[0].1, 1);
    }

    #[test]
    fn out_of_range_row_is_input_error() {
        let matrix = TrialMatrix::new(vec![ramp_row(1.0)]).unwrap();
        let err = fit_trial("Successful", "fixture", &matrix, &unit_clock_config(RowSelection::Single(4)))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn thirty_hz_clock_scales_endpoints() {
        let matrix = TrialMatrix::new(vec![ramp_row(1.0)]).unwrap();
        let trial = fit_trial("Successful", "fixture", &matrix, &FitConfig::default()).unwrap();
        let fit = trial.rows[0].outcome.as_ref().unwrap();
        assert!((fit.endpoints.start.x - 2.0 / 30.0).abs() < 1e-9);
        assert!((fit.endpoints.end.x - 7.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_source_list_is_rejected() {
        let err = run_fit(&[], &FitConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
