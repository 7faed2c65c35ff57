//! Exports: the derived view as CSV and the dashboard as JSON.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.
//! Undefined derived values are written as empty CSV cells and JSON `null`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::{Dashboard, DerivedView, MovieRecord};
use crate::error::AppError;

const DERIVED_HEADER: [&str; 9] = [
    "title",
    "imdb_rating",
    "budget",
    "gross_worldwide",
    "gross_profit",
    "runtime",
    "runtime_minutes",
    "opening_weekend_date",
    "release_year",
];

/// Write one row per record with its derived fields to a CSV file.
pub fn write_derived_csv(path: &Path, records: &[MovieRecord], derived: &DerivedView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_derived(file, records, derived)?;
    info!(path = %path.display(), rows = records.len(), "wrote derived view");
    Ok(())
}

/// Write the derived view as CSV to any writer.
pub fn write_derived<W: Write>(writer: W, records: &[MovieRecord], derived: &DerivedView) -> Result<(), AppError> {
    if records.len() != derived.len() {
        return Err(AppError::new(
            4,
            format!(
                "Derived view has {} rows but the table has {}.",
                derived.len(),
                records.len()
            ),
        ));
    }

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(DERIVED_HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (r, d) in records.iter().zip(&derived.fields) {
        out.write_record([
            r.title.clone(),
            r.imdb_rating.map(|v| format!("{v:.1}")).unwrap_or_default(),
            fmt_opt(r.budget),
            fmt_opt(r.gross_worldwide),
            fmt_opt(d.gross_profit),
            r.runtime.clone().unwrap_or_default(),
            d.runtime_minutes.map(|v| v.to_string()).unwrap_or_default(),
            r.opening_weekend_date.clone().unwrap_or_default(),
            d.release_year.map(|v| v.to_string()).unwrap_or_default(),
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the dashboard (all charts and their series) as pretty JSON.
pub fn write_dashboard_json(path: &Path, dashboard: &Dashboard) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dashboard JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, dashboard)
        .map_err(|e| AppError::new(4, format!("Failed to write dashboard JSON: {e}")))?;

    info!(path = %path.display(), charts = dashboard.charts.len(), "wrote dashboard JSON");
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v}")).unwrap_or_default()
}
