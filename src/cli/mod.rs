//! Command-line parsing for the motor position line fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_EPS, DEFAULT_SAMPLE_RATE_HZ};

/// Trials fitted when neither `--trial` nor `--synthetic` is given.
pub const DEFAULT_TRIALS: [&str; 2] = [
    "Successful=Data/week3_Motor position f1_successful.csv",
    "Failed=Data/week3_Motor position f1_failed.csv",
];

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "motorfit", version, about = "Fit the linear middle segment of motor position trials")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit trials, print the endpoints, and optionally plot/export.
    Fit(FitArgs),
    /// Browse the fitted trials in an interactive terminal view.
    ///
    /// Uses the same pipeline as `motorfit fit`; eps can be adjusted live.
    Tui(FitArgs),
    /// Plot a previously exported results JSON.
    Plot(PlotArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Trial data as LABEL=PATH (headerless numeric CSV, one trial per row). Repeatable.
    #[arg(short = 't', long = "trial", value_name = "LABEL=PATH")]
    pub trials: Vec<String>,

    /// Use generated successful/failed trials instead of CSV files.
    #[arg(long, conflicts_with = "trials")]
    pub synthetic: bool,

    /// Rows per generated trial set.
    #[arg(long, default_value_t = 3)]
    pub synthetic_rows: usize,

    /// Seed for generated trials.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Row (trial index) to fit in each file. Ignored with `--all-rows`.
    #[arg(short = 'r', long, env = "MOTORFIT_ROW", default_value_t = 0)]
    pub row: usize,

    /// Fit every row instead of a single one. Takes precedence over `--row`.
    #[arg(long)]
    pub all_rows: bool,

    /// Dead-zone fraction of the value range trimmed from both ends, in [0, 0.5].
    #[arg(short = 'e', long, env = "MOTORFIT_EPS", default_value_t = DEFAULT_EPS)]
    pub eps: f64,

    /// Sampling rate of the position log (Hz).
    #[arg(long, env = "MOTORFIT_SAMPLE_RATE", default_value_t = DEFAULT_SAMPLE_RATE_HZ)]
    pub sample_rate: f64,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width per panel (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height per panel (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,

    /// Export per-row results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export results (raw values + endpoints) to JSON for `motorfit plot`.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting saved results.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Results JSON file produced by `motorfit fit --export-json`.
    #[arg(long, value_name = "JSON")]
    pub results: PathBuf,

    /// Plot width per panel (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height per panel (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Serializes tests that read or write `MOTORFIT_ROW`.
    static ROW_ENV: Mutex<()> = Mutex::new(());

    #[test]
    fn fit_defaults() {
        let _env = ROW_ENV.lock().unwrap_or_else(|e| e.into_inner());
        let cli = Cli::try_parse_from(["motorfit", "fit"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert!(args.trials.is_empty());
        assert_eq!(args.row, 0);
        assert!(!args.all_rows);
        assert_eq!(args.width, 60);
    }

    #[test]
    fn repeatable_trials() {
        let cli = Cli::try_parse_from([
            "motorfit", "fit", "--trial", "A=a.csv", "-t", "B=b.csv", "--eps", "0.05",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.trials, vec!["A=a.csv", "B=b.csv"]);
        assert_eq!(args.eps, 0.05);
    }

    #[test]
    fn all_rows_accepted_with_row_from_environment() {
        let _env = ROW_ENV.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: every test touching MOTORFIT_ROW holds ROW_ENV.
        unsafe { std::env::set_var("MOTORFIT_ROW", "1") };
        let parsed = Cli::try_parse_from(["motorfit", "fit", "--all-rows"]);
        unsafe { std::env::remove_var("MOTORFIT_ROW") };

        let Command::Fit(args) = parsed.unwrap().command else {
            panic!("expected fit");
        };
        assert!(args.all_rows);
        assert_eq!(args.row, 1);
    }

    #[test]
    fn explicit_row_and_all_rows_parse_together() {
        let cli = Cli::try_parse_from(["motorfit", "fit", "--row", "2", "--all-rows"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.row, 2);
        assert!(args.all_rows);
    }

    #[test]
    fn synthetic_conflicts_with_trials() {
        assert!(Cli::try_parse_from(["motorfit", "fit", "--synthetic", "--trial", "A=a.csv"]).is_err());
    }

    #[test]
    fn plot_requires_results() {
        assert!(Cli::try_parse_from(["motorfit", "plot"]).is_err());
    }
}
