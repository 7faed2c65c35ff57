//! Command-line parsing for the IMDb Top 250 dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the derive/chart code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    ChartKind, RuntimeMode, DEFAULT_RATING_BINS, DEFAULT_TOP_BUDGET, DEFAULT_TOP_RATED,
};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "imdb", version, about = "IMDb Top 250 dashboard (CSV-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the CSV, print the run summary, and render every selected chart as text.
    Report(DashArgs),
    /// Print the derived view (profit, runtime minutes, release year) per film.
    Derive(DeriveArgs),
    /// Launch the interactive terminal dashboard.
    ///
    /// This uses the same pipeline as `imdb report`, but shows one chart per
    /// page using Ratatui.
    Tui(DashArgs),
    /// Normalize a single runtime string and print the total minutes.
    Runtime(RuntimeArgs),
}

/// Options shared by every command that reads the dataset.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Dataset CSV (falls back to `IMDB_DASH_CSV`, then `imdb_top_250_cleaned.csv`).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// How unrecognized runtime tokens are treated.
    #[arg(long, value_enum, default_value_t = RuntimeMode::Lenient)]
    pub runtime_mode: RuntimeMode,

    /// Export the derived view to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for the dashboard (report and TUI).
#[derive(Debug, Args, Clone)]
pub struct DashArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only build these charts (repeatable or comma-separated); default is all.
    #[arg(short = 'c', long = "chart", value_enum, value_delimiter = ',')]
    pub charts: Vec<ChartKind>,

    /// Bars in the top-rated chart.
    #[arg(long, default_value_t = DEFAULT_TOP_RATED)]
    pub top_rated: usize,

    /// Bars in the budget/profit chart.
    #[arg(long, default_value_t = DEFAULT_TOP_BUDGET)]
    pub top_budget: usize,

    /// Bins in the rating histogram.
    #[arg(long, default_value_t = DEFAULT_RATING_BINS)]
    pub rating_bins: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the dashboard (all chart series) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for the derived table.
#[derive(Debug, Args, Clone)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print at most this many rows.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Options for normalizing one runtime string.
#[derive(Debug, Args, Clone)]
pub struct RuntimeArgs {
    /// Runtime text, e.g. "2 hours 22 minutes".
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Strict mode fails on the first unrecognized token.
    #[arg(long, value_enum, default_value_t = RuntimeMode::Lenient)]
    pub runtime_mode: RuntimeMode,
}
