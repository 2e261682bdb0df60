//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the trial sources (CSV files or generated data)
//! - runs the fit pipeline
//! - prints summaries/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DEFAULT_TRIALS, FitArgs, PlotArgs};
use crate::data::{SyntheticSource, TrialKind};
use crate::domain::{FitConfig, RowSelection};
use crate::error::AppError;
use crate::io::ingest::{CsvTrialSource, TrialSource};
use crate::plot::{AsciiRenderer, Renderer};

pub mod pipeline;

/// Entry point for the `motorfit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; only the environment matters.
    let _ = dotenvy::dotenv();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Tui(args) => handle_tui(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    config.validate()?;
    let sources = sources_from_args(&args)?;

    let run = pipeline::run_fit(&sources, &config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if config.plot {
        let mut renderer = AsciiRenderer::new(std::io::stdout().lock(), config.plot_width, config.plot_height);
        renderer.render(&crate::report::panels_from_run(&run))?;
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run, &config)?;
        info!(path = %path.display(), "wrote results CSV");
    }
    if let Some(path) = &config.export_json {
        crate::io::results::write_results_json(path, &run, &config)?;
        info!(path = %path.display(), "wrote results JSON");
    }

    // Everything has been shown and exported; now report the first failure
    // through the exit code.
    let failures = run.failures();
    if let Some((label, row, err)) = failures.first() {
        return Err(AppError::new(
            err.exit_code(),
            format!(
                "{} of {} fit(s) failed; first: {label} row {row}: {err}",
                failures.len(),
                run.fits().count()
            ),
        ));
    }

    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    config.validate()?;
    let sources = sources_from_args(&args)?;
    crate::tui::run(sources, config)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let results = crate::io::results::read_results_json(&args.results)?;
    let panels = crate::report::panels_from_results(&results);

    let mut renderer = AsciiRenderer::new(std::io::stdout().lock(), args.width, args.height);
    renderer.render(&panels)
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        eps: args.eps,
        sample_rate_hz: args.sample_rate,
        rows: if args.all_rows {
            RowSelection::All
        } else {
            RowSelection::Single(args.row)
        },
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Resolve `--trial` / `--synthetic` into sources, falling back to the
/// default successful/failed CSV pair.
pub fn sources_from_args(args: &FitArgs) -> Result<Vec<Box<dyn TrialSource>>, AppError> {
    if args.synthetic {
        return Ok(vec![
            Box::new(SyntheticSource::new(TrialKind::Successful, args.synthetic_rows, args.seed)),
            Box::new(SyntheticSource::new(TrialKind::Failed, args.synthetic_rows, args.seed)),
        ]);
    }

    let specs: Vec<&str> = if args.trials.is_empty() {
        DEFAULT_TRIALS.to_vec()
    } else {
        args.trials.iter().map(String::as_str).collect()
    };

    specs
        .into_iter()
        .map(|spec| CsvTrialSource::parse_spec(spec).map(|s| Box::new(s) as Box<dyn TrialSource>))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fit(argv: &[&str]) -> FitArgs {
        let mut full = vec!["motorfit", "fit"];
        full.extend_from_slice(argv);
        match crate::cli::Cli::try_parse_from(full).unwrap().command {
            Command::Fit(args) => args,
            other => panic!("expected fit, got {other:?}"),
        }
    }

    #[test]
    fn default_sources_are_the_successful_and_failed_files() {
        let sources = sources_from_args(&parse_fit(&[])).unwrap();
        let labels: Vec<&str> = sources.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Successful", "Failed"]);
        assert!(sources[1].describe().ends_with("f1_failed.csv"));
    }

    #[test]
    fn synthetic_sources_fit_end_to_end() {
        let args = parse_fit(&["--synthetic", "--all-rows", "--synthetic-rows", "2", "--eps", "0.01"]);
        let config = fit_config_from_args(&args);
        assert_eq!(config.rows, RowSelection::All);

        let sources = sources_from_args(&args).unwrap();
        let run = pipeline::run_fit(&sources, &config).unwrap();
        assert_eq!(run.fits().count(), 4);
        assert!(run.failures().is_empty());
    }

    #[test]
    fn all_rows_wins_over_row() {
        let config = fit_config_from_args(&parse_fit(&["--row", "2", "--all-rows"]));
        assert_eq!(config.rows, RowSelection::All);
    }

    #[test]
    fn no_plot_flag_disables_plot() {
        let config = fit_config_from_args(&parse_fit(&["--no-plot", "--row", "2"]));
        assert!(!config.plot);
        assert_eq!(config.rows, RowSelection::Single(2));
    }
}
