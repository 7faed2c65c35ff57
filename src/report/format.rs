//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the derive/chart code stays clean and testable
//! - output changes are localized (golden tests below)

use crate::domain::{Chart, Dashboard, DashboardConfig, DerivedFields, DerivedView, MovieRecord};
use crate::io::ingest::IngestedData;
use crate::plot::{render_chart, truncate};

/// Row errors listed in the summary before eliding the rest.
const MAX_LISTED_ERRORS: usize = 5;

/// Format the run summary (dataset stats + derived coverage + issues).
pub fn format_run_summary(ingest: &IngestedData, derived: &DerivedView, config: &DashboardConfig) -> String {
    let mut out = String::new();

    out.push_str("=== imdb - IMDb Top 250 Dashboard ===\n");
    out.push_str(&format!("CSV: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.row_errors.len()
    ));
    if !ingest.missing_columns.is_empty() {
        out.push_str(&format!("Missing columns: {}\n", ingest.missing_columns.join(", ")));
    }
    out.push_str(&format!("Runtime mode: {:?}\n", config.runtime_mode));

    let cov = derived.coverage();
    out.push_str("\nDerived coverage:\n");
    out.push_str(&format!("- gross_profit   : {}/{}\n", cov.gross_profit, cov.rows));
    out.push_str(&format!("- runtime_minutes: {}/{}\n", cov.runtime_minutes, cov.rows));
    out.push_str(&format!("- release_year   : {}/{}\n", cov.release_year, cov.rows));

    if !ingest.row_errors.is_empty() {
        out.push_str("\nSkipped rows:\n");
        for e in ingest.row_errors.iter().take(MAX_LISTED_ERRORS) {
            match &e.title {
                Some(title) => out.push_str(&format!("  line {} ({title}): {}\n", e.line, e.message)),
                None => out.push_str(&format!("  line {}: {}\n", e.line, e.message)),
            }
        }
        if ingest.row_errors.len() > MAX_LISTED_ERRORS {
            out.push_str(&format!("  ... and {} more\n", ingest.row_errors.len() - MAX_LISTED_ERRORS));
        }
    }

    if !derived.issues.is_empty() {
        out.push_str("\nRejected runtimes:\n");
        for issue in derived.issues.iter().take(MAX_LISTED_ERRORS) {
            out.push_str(&format!("  row {} ({}): {}\n", issue.row, issue.title, issue.error));
        }
        if derived.issues.len() > MAX_LISTED_ERRORS {
            out.push_str(&format!("  ... and {} more\n", derived.issues.len() - MAX_LISTED_ERRORS));
        }
    }

    out
}

/// Format the derived view next to the fields it was computed from.
///
/// `limit` caps the number of rows shown; `None` prints them all.
pub fn format_derived_table(records: &[MovieRecord], derived: &[DerivedFields], limit: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<32} {:>6} {:>14} {:>9} {:>6}\n",
            "title", "rating", "profit", "runtime", "year"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<32} {:-<6} {:-<14} {:-<9} {:-<6}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    let shown = limit.unwrap_or(records.len());
    for (r, d) in records.iter().zip(derived).take(shown) {
        out.push_str(
            format!(
                "{:<32} {:>6} {:>14} {:>9} {:>6}\n",
                truncate(&r.title, 32),
                fmt_opt(r.imdb_rating.map(|v| format!("{v:.1}"))),
                fmt_opt(d.gross_profit.map(|p| format!("{p:.0}"))),
                fmt_opt(d.runtime_minutes.map(|m| format!("{m}m"))),
                fmt_opt(d.release_year.map(|y| y.to_string())),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if records.len() > shown {
        out.push_str(&format!("... {} more rows\n", records.len() - shown));
    }
    out
}

/// Format one chart with its title, caption, and body.
pub fn format_chart(chart: &Chart, position: usize, total: usize, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("[{position}/{total}] {}\n", chart.title));
    out.push_str(&chart.caption);
    out.push_str("\n\n");
    out.push_str(&render_chart(chart, width, height));
    if chart.excluded > 0 {
        out.push_str(&format!(
            "({} {} without the required fields excluded)\n",
            chart.excluded,
            if chart.excluded == 1 { "row" } else { "rows" }
        ));
    }
    out
}

/// Format every chart of the dashboard in sequence.
pub fn format_dashboard(dashboard: &Dashboard, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({} films)\n", dashboard.title, dashboard.rows));

    let total = dashboard.charts.len();
    for (i, chart) in dashboard.charts.iter().enumerate() {
        out.push('\n');
        out.push_str(&format_chart(chart, i + 1, total, width, height));
    }
    out
}

fn fmt_opt(v: Option<String>) -> String {
    v.unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BarItem, ChartData, ChartKind, DerivedIssue, Orientation, RuntimeMode};
    use crate::error::RuntimeParseError;
    use crate::io::ingest::RowError;

    fn ingest(records: Vec<MovieRecord>) -> IngestedData {
        IngestedData {
            rows_read: records.len() + 1,
            rows_used: records.len(),
            records,
            row_errors: vec![RowError {
                line: 3,
                title: None,
                message: "Empty row.".to_string(),
            }],
            missing_columns: vec!["sound_mix".to_string()],
        }
    }

    #[test]
    fn summary_reports_counts_and_coverage() {
        let records = vec![MovieRecord::new("Heat", 8.3), MovieRecord::new("Ran", 8.2)];
        let derived = DerivedView {
            fields: vec![
                DerivedFields {
                    runtime_minutes: Some(170),
                    release_year: Some(1995),
                    ..DerivedFields::default()
                },
                DerivedFields::default(),
            ],
            issues: vec![DerivedIssue {
                row: 1,
                title: "Ran".to_string(),
                error: RuntimeParseError::UnexpectedToken {
                    token: "about".to_string(),
                    position: 0,
                },
            }],
        };
        let mut config = DashboardConfig::new("movies.csv".into());
        config.runtime_mode = RuntimeMode::Strict;

        let txt = format_run_summary(&ingest(records), &derived, &config);
        assert!(txt.contains("CSV: movies.csv\n"));
        assert!(txt.contains("Rows: read=3 | used=2 | skipped=1\n"));
        assert!(txt.contains("Missing columns: sound_mix\n"));
        assert!(txt.contains("Runtime mode: Strict\n"));
        assert!(txt.contains("- runtime_minutes: 1/2\n"));
        assert!(txt.contains("- gross_profit   : 0/2\n"));
        assert!(txt.contains("  line 3: Empty row.\n"));
        assert!(txt.contains("  row 1 (Ran): "));
    }

    #[test]
    fn derived_table_marks_undefined_values() {
        let mut records = vec![MovieRecord::new("Heat", 8.3), MovieRecord::new("Ran", 8.2)];
        records[1].imdb_rating = None;
        let derived = vec![
            DerivedFields {
                gross_profit: Some(127_436_818.0),
                runtime_minutes: Some(170),
                release_year: Some(1995),
            },
            DerivedFields::default(),
        ];
        let txt = format_derived_table(&records, &derived, None);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], format!("{:<32} rating         profit   runtime   year", "title"));
        assert_eq!(
            lines[2],
            format!("{:<32}    8.3      127436818      170m   1995", "Heat")
        );
        assert_eq!(lines[3], format!("{:<32}      -              -         -      -", "Ran"));

        let capped = format_derived_table(&records, &derived, Some(1));
        assert!(capped.ends_with("... 1 more rows\n"));
    }

    #[test]
    fn chart_block_has_title_caption_and_exclusions() {
        let chart = Chart {
            kind: ChartKind::TopRated,
            title: ChartKind::TopRated.title().to_string(),
            caption: "caption text".to_string(),
            excluded: 2,
            data: ChartData::Bar {
                orientation: Orientation::Horizontal,
                value_label: "IMDb Rating".to_string(),
                bars: vec![BarItem {
                    label: "Heat".to_string(),
                    value: 8.3,
                }],
            },
        };
        let txt = format_chart(&chart, 1, 10, 40, 10);
        assert!(txt.starts_with(&format!("[1/10] {}\ncaption text\n\nIMDb Rating\n", chart.title)));
        assert!(txt.ends_with("(2 rows without the required fields excluded)\n"));
    }
}
