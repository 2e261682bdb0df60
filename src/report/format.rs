//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{RowFit, RunOutput};
use crate::domain::FitConfig;

/// Format the full run summary (settings + per-row endpoints or failures).
pub fn format_run_summary(run: &RunOutput, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== motorfit - Middle-Segment Line Fit ===\n");
    out.push_str(&format!(
        "eps: {} | sample rate: {:.1} Hz (step {:.5}s)\n",
        config.eps,
        config.sample_rate_hz,
        1.0 / config.sample_rate_hz,
    ));

    for trial in &run.trials {
        out.push_str(&format!(
            "\n{} ({}): {} row(s) loaded, {} fitted\n",
            trial.label,
            trial.source,
            trial.n_rows,
            trial.rows.len()
        ));
        for fit in &trial.rows {
            out.push_str(&format_row(fit));
            out.push('\n');
        }
    }

    let failures = run.failures();
    if !failures.is_empty() {
        out.push_str(&format!("\n{} fit(s) failed.\n", failures.len()));
    }

    out
}

fn format_row(fit: &RowFit) -> String {
    match &fit.outcome {
        Ok(m) => format!(
            "  row {:>3}: start t={:.4}s (y={:.2}) | end t={:.4}s (y={:.2}) | duration={:.4}s | slope={:.3} | r2={:.4} | n={}/{}",
            fit.row,
            m.endpoints.start.x,
            m.endpoints.start.y,
            m.endpoints.end.x,
            m.endpoints.end.y,
            m.endpoints.duration(),
            m.line.slope,
            m.line.r_squared,
            m.n_selected(),
            fit.signal.len(),
        ),
        Err(e) => format!("  row {:>3}: FAILED - {e}", fit.row),
    }
}
