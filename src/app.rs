//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - resolves the dataset path
//! - runs the ingest/derive/chart pipeline
//! - prints reports or launches the terminal dashboard

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::picker::resolve_csv_path;
use crate::cli::{Command, DashArgs, DeriveArgs, RuntimeArgs};
use crate::derive::{RuntimeNormalizer, derive_all, scan_runtime};
use crate::domain::{DashboardConfig, RuntimeMode};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `imdb` binary.
pub fn run() -> Result<(), AppError> {
    // We want `imdb` and `imdb --csv x.csv` to behave like `imdb tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log lines would tear the alternate screen.
    let default_level = match cli.command {
        Command::Tui(_) => "off",
        _ => "info",
    };
    init_tracing(default_level);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Derive(args) => handle_derive(args),
        Command::Tui(args) => handle_tui(args),
        Command::Runtime(args) => handle_runtime(args),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

fn handle_report(args: DashArgs) -> Result<(), AppError> {
    let csv_path = resolve_csv_path(args.input.csv.as_deref(), false)?;
    let config = config_from_args(&args, csv_path);
    let run = pipeline::run_dashboard(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.derived, &config)
    );
    print!(
        "{}",
        crate::report::format_dashboard(&run.dashboard, config.plot_width, config.plot_height)
    );
    Ok(())
}

fn handle_derive(args: DeriveArgs) -> Result<(), AppError> {
    let csv_path = resolve_csv_path(args.input.csv.as_deref(), false)?;
    let ingest = crate::io::ingest::load_movies(&csv_path)?;
    let derived = derive_all(&ingest.records, RuntimeNormalizer::new(args.input.runtime_mode));

    print!(
        "{}",
        crate::report::format_derived_table(&ingest.records, &derived.fields, args.limit)
    );

    if let Some(path) = &args.input.export {
        crate::io::export::write_derived_csv(path, &ingest.records, &derived)?;
    }
    Ok(())
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    // Resolve (and possibly prompt) before the terminal switches to raw mode.
    let csv_path = resolve_csv_path(args.input.csv.as_deref(), true)?;
    let config = config_from_args(&args, csv_path);
    crate::tui::run(config)
}

fn handle_runtime(args: RuntimeArgs) -> Result<(), AppError> {
    let normalizer = RuntimeNormalizer::new(args.runtime_mode);
    let minutes = normalizer.total_minutes(&args.text)?;

    if args.runtime_mode == RuntimeMode::Lenient {
        for skipped in scan_runtime(&args.text).rejected {
            warn!(%skipped, "token ignored");
        }
    }

    println!("{minutes}");
    Ok(())
}

/// Translate dashboard flags into the config the pipeline reads.
pub fn config_from_args(args: &DashArgs, csv_path: PathBuf) -> DashboardConfig {
    DashboardConfig {
        csv_path,
        runtime_mode: args.input.runtime_mode,
        charts: args.charts.clone(),
        top_rated: args.top_rated,
        top_budget: args.top_budget,
        rating_bins: args.rating_bins,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        export_derived: args.input.export.clone(),
    }
}

/// Rewrite argv so `imdb` defaults to `imdb tui`.
///
/// Rules:
/// - `imdb`                      -> `imdb tui`
/// - `imdb --csv x.csv ...`      -> `imdb tui --csv x.csv ...`
/// - `imdb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "derive" | "tui" | "runtime");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
