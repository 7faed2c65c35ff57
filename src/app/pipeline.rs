//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> derived view -> chart sequence -> optional exports
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{info, warn};

use crate::charts::build_dashboard;
use crate::derive::{RuntimeNormalizer, derive_all};
use crate::domain::{Dashboard, DashboardConfig, DerivedView};
use crate::error::AppError;
use crate::io::export::{write_dashboard_json, write_derived_csv};
use crate::io::ingest::{IngestedData, load_movies};

/// All computed outputs of a single dashboard run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub derived: DerivedView,
    pub dashboard: Dashboard,
}

/// Load the CSV named in `config` and run the pipeline on it.
pub fn run_dashboard(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let ingest = load_movies(&config.csv_path)?;
    run_dashboard_with_ingest(config, ingest)
}

/// Run the pipeline on already-loaded records.
///
/// The record table is only read from here on; every chart sees the same
/// records and derived view.
pub fn run_dashboard_with_ingest(config: &DashboardConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let derived = derive_all(&ingest.records, RuntimeNormalizer::new(config.runtime_mode));

    let cov = derived.coverage();
    info!(
        rows = cov.rows,
        gross_profit = cov.gross_profit,
        runtime_minutes = cov.runtime_minutes,
        release_year = cov.release_year,
        "derived view ready"
    );
    if !derived.issues.is_empty() {
        warn!(count = derived.issues.len(), "runtime values rejected in strict mode");
    }

    let dashboard = build_dashboard(&ingest.records, &derived.fields, config);

    let run = RunOutput {
        ingest,
        derived,
        dashboard,
    };
    write_exports(&run, config)?;
    Ok(run)
}

fn write_exports(run: &RunOutput, config: &DashboardConfig) -> Result<(), AppError> {
    if let Some(path) = &config.export_derived {
        write_derived_csv(path, &run.ingest.records, &run.derived)?;
    }
    if let Some(path) = &config.export_json {
        write_dashboard_json(path, &run.dashboard)?;
    }
    Ok(())
}
