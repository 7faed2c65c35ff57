//! CSV ingest and normalization.
//!
//! This module turns the movie CSV into `MovieRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip unreadable rows, but report what happened)
//! - **Lenient cells** for every field but the title (missing or unreadable means `None`)
//! - **Separation of concerns**: no derived fields or charts here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::MovieRecord;
use crate::error::AppError;

const COL_TITLE: &str = "title";
const COL_RATING: &str = "imdbrating";
const COL_SOUND_MIX: &str = "soundmix";
const COL_BUDGET: &str = "budget";
const COL_GROSS: &str = "grossworldwide";
const COL_COLOR: &str = "color";
const COL_CLASSIFICATIONS: &str = "classifications";
const COL_RUNTIME: &str = "runtime";
const COL_OPENING_DATE: &str = "openingweekenddate";

const OPTIONAL_COLUMNS: [&str; 7] = [
    COL_SOUND_MIX,
    COL_BUDGET,
    COL_GROSS,
    COL_COLOR,
    COL_CLASSIFICATIONS,
    COL_RUNTIME,
    COL_OPENING_DATE,
];

const MISSING_MARKERS: [&str; 6] = ["nan", "na", "n/a", "null", "none", "-"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub title: Option<String>,
    pub message: String,
}

/// Ingest output: records + row errors + bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<MovieRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
    /// Optional columns that were absent from the header (normalized names).
    pub missing_columns: Vec<String>,
}

/// Load the movie CSV at `path`.
pub fn load_movies(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let data = load_movies_from_reader(file)?;
    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        row_errors = data.row_errors.len(),
        "loaded movie table"
    );
    Ok(data)
}

/// Load movies from any reader (used directly by tests).
pub fn load_movies_from_reader<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let missing_columns: Vec<String> = OPTIONAL_COLUMNS
        .iter()
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    for col in &missing_columns {
        debug!(column = %col, "optional column absent; values will be undefined");
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "unreadable CSV row");
                row_errors.push(RowError {
                    line,
                    title: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, line) {
            Ok(movie) => records.push(movie),
            Err(message) => {
                warn!(line, %message, "row skipped");
                row_errors.push(RowError {
                    line,
                    title: get_optional(&record, &header_map, COL_TITLE).map(str::to_string),
                    message,
                });
            }
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after ingest."));
    }

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
        rows_used,
        missing_columns,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

/// Case-insensitive header key ignoring spaces, `_` and `-`.
///
/// `IMDb Rating`, `imdb_rating` and `IMDbRating` all map to `imdbrating`.
fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    if !header_map.contains_key(COL_TITLE) {
        return Err(AppError::new(2, "Missing required column: `Title`"));
    }
    if !header_map.contains_key(COL_RATING) {
        return Err(AppError::new(2, "Missing required column: `IMDb Rating`"));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, line: usize) -> Result<MovieRecord, String> {
    if record.iter().all(|cell| cell.trim().is_empty()) {
        return Err("Empty row.".to_string());
    }

    let title = get_optional(record, header_map, COL_TITLE).unwrap_or_default().to_string();
    let imdb_rating = parse_rating(get_optional(record, header_map, COL_RATING), line);

    let text = |name: &str| get_optional(record, header_map, name).map(str::to_string);
    let number = |name: &str| get_optional(record, header_map, name).and_then(parse_number);

    Ok(MovieRecord {
        title,
        imdb_rating,
        sound_mix: text(COL_SOUND_MIX),
        budget: number(COL_BUDGET),
        gross_worldwide: number(COL_GROSS),
        color: text(COL_COLOR),
        classifications: text(COL_CLASSIFICATIONS),
        runtime: text(COL_RUNTIME),
        opening_weekend_date: text(COL_OPENING_DATE),
    })
}

/// A rating cell on the 0-10 scale. Anything else is undefined for this row
/// only; the rest of the row still feeds the non-rating charts.
fn parse_rating(raw: Option<&str>, line: usize) -> Option<f64> {
    let raw = raw?;
    match parse_number(raw) {
        Some(v) if (0.0..=10.0).contains(&v) => Some(v),
        Some(v) => {
            warn!(line, rating = v, "rating outside [0, 10]; treated as undefined");
            None
        }
        None => {
            warn!(line, raw, "unreadable rating; treated as undefined");
            None
        }
    }
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| !MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)))
}

/// Parse a numeric cell, tolerating currency symbols and thousands separators.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '_') && !c.is_whitespace())
        .collect();
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Title,IMDb Rating,Sound mix,Budget,Gross Worldwide,Color,Classifications,Runtime,Opening Weekend Date
The Shawshank Redemption,9.3,Dolby Digital,25000000,28884504,Color,R,2 hours 22 minutes,1994-09-25
The Godfather,9.2,Mono,6000000,250341816,Color,R,2 hours 55 minutes,1972-03-19
,8.0,Mono,,,Color,PG,,
Bad Rating,11.5,Mono,,,Color,PG,,
Casablanca,8.5,,\"$950,000\",NaN,Black and White,PG,1 hour 42 minutes,
";

    #[test]
    fn normalize_header_name_collapses_variants() {
        assert_eq!(normalize_header_name("IMDb Rating"), "imdbrating");
        assert_eq!(normalize_header_name("imdb_rating"), "imdbrating");
        assert_eq!(normalize_header_name("\u{feff}Title"), "title");
        assert_eq!(normalize_header_name("Opening-Weekend Date"), "openingweekenddate");
    }

    #[test]
    fn parse_number_accepts_currency() {
        assert_eq!(parse_number("$1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_number("8.5"), Some(8.5));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn load_sample_keeps_rows_with_bad_ratings_or_titles() {
        let data = load_movies_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used, 5);
        assert!(data.row_errors.is_empty());
        assert!(data.missing_columns.is_empty());

        let untitled = &data.records[2];
        assert_eq!(untitled.title, "");
        assert_eq!(untitled.imdb_rating, Some(8.0));
        assert_eq!(untitled.color.as_deref(), Some("Color"));

        let out_of_range = &data.records[3];
        assert_eq!(out_of_range.title, "Bad Rating");
        assert_eq!(out_of_range.imdb_rating, None);
        assert_eq!(out_of_range.sound_mix.as_deref(), Some("Mono"));

        let casablanca = &data.records[4];
        assert_eq!(casablanca.title, "Casablanca");
        assert_eq!(casablanca.imdb_rating, Some(8.5));
        assert_eq!(casablanca.budget, Some(950_000.0));
        assert_eq!(casablanca.gross_worldwide, None);
        assert_eq!(casablanca.sound_mix, None);
        assert_eq!(casablanca.opening_weekend_date, None);
        assert_eq!(casablanca.runtime.as_deref(), Some("1 hour 42 minutes"));
    }

    #[test]
    fn unreadable_rating_is_undefined_not_fatal() {
        let data = load_movies_from_reader("Title,IMDb Rating,Color\nA,n/a,Color\nB,eight,Color\nC,-1,Color\n".as_bytes()).unwrap();
        assert_eq!(data.rows_used, 3);
        assert!(data.records.iter().all(|r| r.imdb_rating.is_none()));
        assert!(data.records.iter().all(|r| r.color.as_deref() == Some("Color")));
    }

    #[test]
    fn blank_rows_are_row_errors() {
        let data = load_movies_from_reader("Title,IMDb Rating\nA,7.0\n , \n".as_bytes()).unwrap();
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let err = load_movies_from_reader("Title,Budget\nX,1\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let data = load_movies_from_reader("title,imdb_rating\nX,7.5\n".as_bytes()).unwrap();
        assert_eq!(data.records, vec![MovieRecord::new("X", 7.5)]);
        assert_eq!(data.missing_columns.len(), OPTIONAL_COLUMNS.len());
    }

    #[test]
    fn no_usable_rows_is_exit_code_3() {
        let err = load_movies_from_reader("Title,IMDb Rating\n,\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
