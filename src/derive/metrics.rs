//! Derived-metrics builder.
//!
//! Computes gross profit, runtime minutes, and release year for every record.
//! The record slice is only borrowed; results come back as a new
//! [`DerivedView`] in the same order, so no chart can observe another chart's
//! filtering.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::derive::runtime::RuntimeNormalizer;
use crate::domain::{DerivedFields, DerivedIssue, DerivedView, MovieRecord};
use crate::error::RuntimeParseError;

const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Derive every record. Never fails; strict-mode rejections become issues.
pub fn derive_all(records: &[MovieRecord], normalizer: RuntimeNormalizer) -> DerivedView {
    let mut fields = Vec::with_capacity(records.len());
    let mut issues = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let (derived, error) = derive_record(record, normalizer);
        if let Some(error) = error {
            warn!(row, title = %record.title, %error, "runtime rejected");
            issues.push(DerivedIssue {
                row,
                title: record.title.clone(),
                error,
            });
        }
        fields.push(derived);
    }

    DerivedView { fields, issues }
}

/// Derive one record.
///
/// A strict-mode runtime rejection leaves `runtime_minutes` undefined and is
/// returned alongside the fields.
pub fn derive_record(
    record: &MovieRecord,
    normalizer: RuntimeNormalizer,
) -> (DerivedFields, Option<RuntimeParseError>) {
    let (runtime_minutes, error) = match normalizer.normalize(record.runtime.as_deref()) {
        Ok(minutes) => (minutes, None),
        Err(err) => (None, Some(err)),
    };

    let fields = DerivedFields {
        gross_profit: gross_profit(record.budget, record.gross_worldwide),
        runtime_minutes,
        release_year: release_year(record.opening_weekend_date.as_deref()),
    };
    (fields, error)
}

/// `gross - budget` when both are present and finite.
pub fn gross_profit(budget: Option<f64>, gross_worldwide: Option<f64>) -> Option<f64> {
    let budget = budget.filter(|v| v.is_finite())?;
    let gross = gross_worldwide.filter(|v| v.is_finite())?;
    Some(gross - budget)
}

pub fn release_year(opening_weekend_date: Option<&str>) -> Option<i32> {
    parse_release_date(opening_weekend_date?).map(|d| d.year())
}

/// Parse a calendar date from the handful of layouts seen in movie exports.
///
/// Day/month order is ambiguous for slash dates; month-first is tried first,
/// and the year is the same either way. Partial dates (`1994`, `1994-09`,
/// `September 1994`) resolve to the first day of the period.
pub fn parse_release_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    parse_partial_date(s)
}

fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1);
    }
    // chrono needs a day to build a date, so supply the first.
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuntimeMode;

    fn record() -> MovieRecord {
        let mut r = MovieRecord::new("Inception", 8.8);
        r.budget = Some(160_000_000.0);
        r.gross_worldwide = Some(836_800_000.0);
        r.runtime = Some("2 hours 28 minutes".to_string());
        r.opening_weekend_date = Some("2010-07-18".to_string());
        r
    }

    #[test]
    fn gross_profit_requires_both_inputs() {
        assert_eq!(gross_profit(Some(1_000_000.0), Some(5_000_000.0)), Some(4_000_000.0));
        assert_eq!(gross_profit(None, Some(5_000_000.0)), None);
        assert_eq!(gross_profit(Some(1_000_000.0), None), None);
        assert_eq!(gross_profit(Some(f64::NAN), Some(5.0)), None);
    }

    #[test]
    fn gross_profit_can_be_negative() {
        assert_eq!(gross_profit(Some(50.0), Some(20.0)), Some(-30.0));
    }

    #[test]
    fn release_year_parses_common_layouts() {
        assert_eq!(release_year(Some("2015-07-10")), Some(2015));
        assert_eq!(release_year(Some("July 10, 2015")), Some(2015));
        assert_eq!(release_year(Some("Jul 10, 2015")), Some(2015));
        assert_eq!(release_year(Some("10 July 2015")), Some(2015));
        assert_eq!(release_year(Some("07/10/2015")), Some(2015));
        assert_eq!(release_year(Some("25/12/1994")), Some(1994));
        assert_eq!(release_year(Some("1994-12-25 00:00:00")), Some(1994));
        assert_eq!(release_year(Some("1994-12-25T00:00:00+00:00")), Some(1994));
    }

    #[test]
    fn partial_dates_resolve_to_the_period_start() {
        assert_eq!(parse_release_date("1994"), NaiveDate::from_ymd_opt(1994, 1, 1));
        assert_eq!(parse_release_date(" 1994-09 "), NaiveDate::from_ymd_opt(1994, 9, 1));
        assert_eq!(parse_release_date("September 1994"), NaiveDate::from_ymd_opt(1994, 9, 1));
        assert_eq!(release_year(Some("Sep 1994")), Some(1994));
        assert_eq!(release_year(Some("199")), None);
        assert_eq!(release_year(Some("19945")), None);
        assert_eq!(release_year(Some("Smarch 1994")), None);
    }

    #[test]
    fn release_year_is_undefined_when_unparsable() {
        assert_eq!(release_year(Some("sometime in the 90s")), None);
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
    }

    #[test]
    fn derive_record_fills_all_fields() {
        let (d, err) = derive_record(&record(), RuntimeNormalizer::default());
        assert!(err.is_none());
        assert_eq!(d.gross_profit, Some(676_800_000.0));
        assert_eq!(d.runtime_minutes, Some(148));
        assert_eq!(d.release_year, Some(2010));
    }

    #[test]
    fn strict_rejection_only_clears_runtime() {
        let mut r = record();
        r.runtime = Some("2 hrs 28 mins".to_string());
        let view = derive_all(&[r], RuntimeNormalizer::new(RuntimeMode::Strict));
        assert_eq!(view.fields[0].runtime_minutes, None);
        assert_eq!(view.fields[0].release_year, Some(2010));
        assert_eq!(view.issues.len(), 1);
        assert_eq!(view.issues[0].row, 0);
        assert_eq!(view.issues[0].title, "Inception");
    }

    #[test]
    fn derive_all_is_idempotent_and_leaves_records_alone() {
        let records = vec![record(), MovieRecord::new("Untitled", 7.0)];
        let before = records.clone();
        let a = derive_all(&records, RuntimeNormalizer::default());
        let b = derive_all(&records, RuntimeNormalizer::default());
        assert_eq!(a, b);
        assert_eq!(records, before);
        assert_eq!(a.len(), 2);
        assert_eq!(a.fields[1], DerivedFields::default());
    }
}
