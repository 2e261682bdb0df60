//! Reporting utilities: run summaries and render panels.
//!
//! Both a live run and a saved results file turn into the same `Panel` list,
//! so every renderer draws them identically.

pub mod format;

pub use format::*;

use std::collections::HashMap;

use crate::app::pipeline::RunOutput;
use crate::domain::{FitEndpoints, Panel, ResultsFile, Signal};

/// Title shown above a panel: the label plus the ending time coordinate.
///
/// The row index is included when a label covers more than one row.
pub fn panel_title(label: &str, row: usize, show_row: bool, outcome: Result<&FitEndpoints, &str>) -> String {
    let name = if show_row {
        format!("{label} [row {row}]")
    } else {
        label.to_string()
    };
    match outcome {
        Ok(e) => format!("{name} t={:.4}", e.end.x),
        Err(reason) => format!("{name} (fit failed: {reason})"),
    }
}

/// One panel per fitted row, in run order.
pub fn panels_from_run(run: &RunOutput) -> Vec<Panel> {
    run.fits()
        .map(|(trial, fit)| {
            let show_row = trial.rows.len() > 1 || fit.row != 0;
            let reason = fit.outcome.as_ref().err().map(ToString::to_string);
            let endpoints = fit.outcome.as_ref().ok().map(|m| m.endpoints);
            let outcome = match (&endpoints, &reason) {
                (Some(e), _) => Ok(e),
                (None, Some(r)) => Err(r.as_str()),
                (None, None) => Err("no result"),
            };
            Panel {
                title: panel_title(&trial.label, fit.row, show_row, outcome),
                points: fit.signal.points(),
                endpoints,
            }
        })
        .collect()
}

/// Rebuild panels from a saved results file.
///
/// Row indices are shown per trial source, as in [`panels_from_run`].
pub fn panels_from_results(results: &ResultsFile) -> Vec<Panel> {
    let mut rows_per_trial: HashMap<usize, usize> = HashMap::new();
    for record in &results.fits {
        *rows_per_trial.entry(record.trial).or_default() += 1;
    }

    results
        .fits
        .iter()
        .map(|record| {
            let show_row = rows_per_trial.get(&record.trial).copied().unwrap_or(0) > 1 || record.row != 0;
            let outcome = match (&record.endpoints, &record.error) {
                (Some(e), _) => Ok(e),
                (None, Some(r)) => Err(r.as_str()),
                (None, None) => Err("no result"),
            };
            Panel {
                title: panel_title(&record.label, record.row, show_row, outcome),
                points: Signal::from_clock(&record.values, results.sample_rate_hz).points(),
                endpoints: record.endpoints,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::fit_trial;
    use crate::domain::{FitConfig, Point, RowSelection, TrialMatrix};
    use crate::io::results::results_from_run;

    fn ramp() -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 20.0, 40.0, 60.0, 80.0, 100.0, 100.0, 100.0, 100.0]
    }

    #[test]
    fn title_carries_end_time() {
        let e = FitEndpoints {
            start: Point::new(2.0, 0.0),
            end: Point::new(7.0, 100.0),
        };
        assert_eq!(panel_title("Successful", 0, false, Ok(&e)), "Successful t=7.0000");
        assert_eq!(panel_title("Failed", 2, true, Ok(&e)), "Failed [row 2] t=7.0000");
        assert_eq!(
            panel_title("Failed", 0, false, Err("flat")),
            "Failed (fit failed: flat)"
        );
    }

    #[test]
    fn each_panel_uses_its_own_trial_data() {
        let config = FitConfig {
            sample_rate_hz: 1.0,
            ..FitConfig::default()
        };
        let success = TrialMatrix::new(vec![ramp()]).unwrap();
        let failed = TrialMatrix::new(vec![ramp().into_iter().map(|v| v * 0.4).collect()]).unwrap();
        let run = RunOutput {
            trials: vec![
                fit_trial("Successful", "a.csv", &success, &config).unwrap(),
                fit_trial("Failed", "b.csv", &failed, &config).unwrap(),
            ],
        };

        let panels = panels_from_run(&run);
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].title, "Successful t=7.0000");
        assert_eq!(panels[1].title, "Failed t=7.0000");
        assert_eq!(panels[0].points[7], (7.0, 100.0));
        assert_eq!(panels[1].points[7], (7.0, 40.0));
        assert_eq!(panels[1].endpoints.unwrap().end.y, 40.0);
    }

    #[test]
    fn saved_results_rebuild_the_same_panels() {
        let config = FitConfig {
            sample_rate_hz: 1.0,
            rows: RowSelection::All,
            ..FitConfig::default()
        };
        let matrix = TrialMatrix::new(vec![ramp(), vec![2.0; 11]]).unwrap();
        let run = RunOutput {
            trials: vec![fit_trial("Successful", "a.csv", &matrix, &config).unwrap()],
        };

        let live = panels_from_run(&run);
        let saved = panels_from_results(&results_from_run(&run, &config));
        assert_eq!(live, saved);
        assert!(saved[1].title.starts_with("Successful [row 1] (fit failed: Insufficient data"));
    }

    #[test]
    fn shared_label_across_sources_matches_live_titles() {
        let config = FitConfig {
            sample_rate_hz: 1.0,
            ..FitConfig::default()
        };
        let matrix = TrialMatrix::new(vec![ramp()]).unwrap();
        let run = RunOutput {
            trials: vec![
                fit_trial("Trial", "a.csv", &matrix, &config).unwrap(),
                fit_trial("Trial", "b.csv", &matrix, &config).unwrap(),
            ],
        };

        let live = panels_from_run(&run);
        let saved = panels_from_results(&results_from_run(&run, &config));
        assert_eq!(live, saved);
        assert_eq!(saved[0].title, "Trial t=7.0000");
        assert_eq!(saved[1].title, "Trial t=7.0000");
    }
}
