//! Table aggregations behind the bar, pie, and scatter charts.
//!
//! Every function borrows the record slice and returns a fresh series. Rows
//! lacking a field the aggregation needs are skipped here, at the aggregation
//! boundary, and nowhere else.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::{BarItem, DerivedFields, MovieRecord, PieSlice};

/// The `n` highest-rated records, stable on ties.
pub fn top_rated(records: &[MovieRecord], n: usize) -> Vec<BarItem> {
    let mut rated: Vec<(&str, f64)> = records
        .iter()
        .filter_map(|r| Some((r.title.as_str(), r.imdb_rating?)))
        .collect();
    rated.sort_by(|a, b| desc(a.1, b.1));
    rated
        .into_iter()
        .take(n)
        .map(|(title, rating)| BarItem {
            label: title.to_string(),
            value: rating,
        })
        .collect()
}

/// Mean rating per category, highest mean first.
///
/// Rows where `key` yields `None` or the rating is undefined are left out.
/// Ties keep first-appearance order.
pub fn mean_rating_by<F>(records: &[MovieRecord], key: F) -> Vec<BarItem>
where
    F: Fn(&MovieRecord) -> Option<&str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();

    for r in records {
        let (Some(k), Some(rating)) = (key(r), r.imdb_rating) else {
            continue;
        };
        let entry = sums.entry(k).or_insert_with(|| {
            order.push(k);
            (0.0, 0)
        });
        entry.0 += rating;
        entry.1 += 1;
    }

    let mut out: Vec<BarItem> = order
        .into_iter()
        .filter_map(|k| {
            let (sum, n) = sums.get(k)?;
            Some(BarItem {
                label: k.to_string(),
                value: sum / *n as f64,
            })
        })
        .collect();
    out.sort_by(|a, b| desc(a.value, b.value));
    out
}

/// Gross profit in millions for the `n` largest budgets among rows with a
/// defined profit. Ties keep input order.
pub fn top_budget_profit(records: &[MovieRecord], derived: &[DerivedFields], n: usize) -> Vec<BarItem> {
    let mut rows: Vec<(&MovieRecord, f64, f64)> = records
        .iter()
        .zip(derived)
        .filter_map(|(r, d)| Some((r, r.budget?, d.gross_profit?)))
        .collect();
    rows.sort_by(|a, b| desc(a.1, b.1));
    rows.into_iter()
        .take(n)
        .map(|(r, _, profit)| BarItem {
            label: r.title.clone(),
            value: profit / 1e6,
        })
        .collect()
}

/// Category counts, most frequent first. Ties keep first-appearance order.
pub fn value_counts<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.into_iter().flatten() {
        let c = counts.entry(v).or_insert_with(|| {
            order.push(v);
            0
        });
        *c += 1;
    }

    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| (k.to_string(), counts.get(k).copied().unwrap_or(0)))
        .collect();
    // `sort_by` is stable, so equal counts stay in first-appearance order.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Turn counts into pie slices with percentage shares.
pub fn pie_slices(counts: &[(String, usize)]) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|(label, count)| PieSlice {
            label: label.clone(),
            count: *count,
            percent: *count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// `(x, y)` pairs for rows where both coordinates are defined.
pub fn scatter_pairs<F>(records: &[MovieRecord], derived: &[DerivedFields], f: F) -> Vec<(f64, f64)>
where
    F: Fn(&MovieRecord, &DerivedFields) -> Option<(f64, f64)>,
{
    records
        .iter()
        .zip(derived)
        .filter_map(|(r, d)| f(r, d))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
