//! Chart builder: turns the record table and its derived view into the fixed
//! dashboard sequence.
//!
//! Each chart reads both slices immutably and applies its own exclusions, so
//! the order in which charts are built cannot change their contents.

use tracing::debug;

use crate::domain::{
    Chart, ChartData, ChartKind, Dashboard, DashboardConfig, DerivedFields, MovieRecord, Orientation,
    TileRect, TreemapTile,
};

pub mod aggregate;
pub mod histogram;
pub mod treemap;

pub use aggregate::*;
pub use histogram::{auto_bin_count, gaussian_kde, histogram, KDE_GRID_POINTS};
pub use treemap::squarify;

pub const DASHBOARD_TITLE: &str = "IMDb Top 250 Movies";

/// Treemap coordinate space; renderers scale it to their own surface.
pub const TREEMAP_BOUNDS: TileRect = TileRect {
    x: 0.0,
    y: 0.0,
    width: 100.0,
    height: 100.0,
};

/// Build the selected charts in dashboard order.
pub fn build_dashboard(records: &[MovieRecord], derived: &[DerivedFields], config: &DashboardConfig) -> Dashboard {
    let charts = config
        .selected_charts()
        .into_iter()
        .map(|kind| build_chart(kind, records, derived, config))
        .collect();

    Dashboard {
        title: DASHBOARD_TITLE.to_string(),
        rows: records.len(),
        charts,
    }
}

/// Build one chart.
pub fn build_chart(
    kind: ChartKind,
    records: &[MovieRecord],
    derived: &[DerivedFields],
    config: &DashboardConfig,
) -> Chart {
    let (data, used) = match kind {
        ChartKind::TopRated => {
            let bars = top_rated(records, config.top_rated);
            let used = records.iter().filter(|r| r.imdb_rating.is_some()).count();
            (
                ChartData::Bar {
                    orientation: Orientation::Horizontal,
                    value_label: "IMDb Rating".to_string(),
                    bars,
                },
                used,
            )
        }
        ChartKind::SoundMixRating => {
            let used = records
                .iter()
                .filter(|r| r.sound_mix.is_some() && r.imdb_rating.is_some())
                .count();
            let bars = mean_rating_by(records, |r| r.sound_mix.as_deref());
            (
                ChartData::Bar {
                    orientation: Orientation::Vertical,
                    value_label: "Average IMDb Rating".to_string(),
                    bars,
                },
                used,
            )
        }
        ChartKind::BudgetProfit => {
            let used = records
                .iter()
                .zip(derived)
                .filter(|(r, d)| r.budget.is_some() && d.gross_profit.is_some())
                .count();
            let bars = top_budget_profit(records, derived, config.top_budget);
            (
                ChartData::Bar {
                    orientation: Orientation::Vertical,
                    value_label: "Net Profit (million USD)".to_string(),
                    bars,
                },
                used,
            )
        }
        ChartKind::Color => {
            let counts = value_counts(records.iter().map(|r| r.color.as_deref()));
            let used: usize = counts.iter().map(|(_, c)| c).sum();
            (
                ChartData::Pie {
                    donut: false,
                    slices: pie_slices(&counts),
                },
                used,
            )
        }
        ChartKind::Classification => {
            let counts = value_counts(records.iter().map(|r| r.classifications.as_deref()));
            let used: usize = counts.iter().map(|(_, c)| c).sum();
            (
                ChartData::Pie {
                    donut: true,
                    slices: pie_slices(&counts),
                },
                used,
            )
        }
        ChartKind::SoundMixTreemap => {
            let counts = value_counts(records.iter().map(|r| r.sound_mix.as_deref()));
            let used: usize = counts.iter().map(|(_, c)| c).sum();
            (ChartData::Treemap { tiles: treemap_tiles(&counts) }, used)
        }
        ChartKind::Runtime => {
            let values: Vec<f64> = derived
                .iter()
                .filter_map(|d| d.runtime_minutes)
                .map(f64::from)
                .collect();
            let bins = auto_bin_count(&values);
            (histogram_data("Runtime (minutes)", &values, bins), values.len())
        }
        ChartKind::Rating => {
            let values: Vec<f64> = records.iter().filter_map(|r| r.imdb_rating).collect();
            (histogram_data("IMDb Rating", &values, config.rating_bins), values.len())
        }
        ChartKind::BudgetGross => {
            let points = scatter_pairs(records, derived, |r, _| Some((r.budget?, r.gross_worldwide?)));
            let used = points.len();
            (
                ChartData::Scatter {
                    x_label: "Budget".to_string(),
                    y_label: "Gross Worldwide".to_string(),
                    points,
                },
                used,
            )
        }
        ChartKind::YearRating => {
            let points = scatter_pairs(records, derived, |r, d| Some((f64::from(d.release_year?), r.imdb_rating?)));
            let used = points.len();
            (
                ChartData::Scatter {
                    x_label: "Release Year".to_string(),
                    y_label: "IMDb Rating".to_string(),
                    points,
                },
                used,
            )
        }
    };

    let excluded = records.len().saturating_sub(used);
    debug!(chart = ?kind, used, excluded, "built chart");

    Chart {
        kind,
        title: kind.title().to_string(),
        caption: kind.caption().to_string(),
        excluded,
        data,
    }
}

fn histogram_data(x_label: &str, values: &[f64], bins: usize) -> ChartData {
    let bins = histogram(values, bins);
    let bin_width = bins.first().map(|b| b.end - b.start).unwrap_or(0.0);
    let kde = gaussian_kde(values, bin_width, KDE_GRID_POINTS);
    ChartData::Histogram {
        x_label: x_label.to_string(),
        bins,
        kde,
    }
}

fn treemap_tiles(counts: &[(String, usize)]) -> Vec<TreemapTile> {
    let sizes: Vec<f64> = counts.iter().map(|(_, c)| *c as f64).collect();
    squarify(&sizes, TREEMAP_BOUNDS)
        .into_iter()
        .map(|(idx, rect)| TreemapTile {
            label: counts[idx].0.clone(),
            count: counts[idx].1,
            rect,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{RuntimeNormalizer, derive_all};

    fn table() -> Vec<MovieRecord> {
        let mut a = MovieRecord::new("A", 9.0);
        a.sound_mix = Some("Mono".to_string());
        a.color = Some("Black and White".to_string());
        a.classifications = Some("PG".to_string());
        a.budget = Some(3e6);
        a.gross_worldwide = Some(10e6);
        a.runtime = Some("1 hour 40 minutes".to_string());
        a.opening_weekend_date = Some("not a date".to_string());

        let mut b = MovieRecord::new("B", 8.5);
        b.sound_mix = Some("Dolby Digital".to_string());
        b.color = Some("Color".to_string());
        b.classifications = Some("R".to_string());
        b.budget = Some(100e6);
        b.runtime = Some("2 hours 10 minutes".to_string());
        b.opening_weekend_date = Some("2008-07-18".to_string());

        let mut c = MovieRecord::new("C", 8.2);
        c.sound_mix = Some("Dolby Digital".to_string());
        c.color = Some("Color".to_string());
        c.budget = Some(50e6);
        c.gross_worldwide = Some(40e6);
        c.opening_weekend_date = Some("1999-03-31".to_string());

        vec![a, b, c]
    }

    fn dashboard(records: &[MovieRecord]) -> Dashboard {
        let derived = derive_all(records, RuntimeNormalizer::default());
        build_dashboard(records, &derived.fields, &DashboardConfig::new("x.csv".into()))
    }

    #[test]
    fn dashboard_has_fixed_order() {
        let d = dashboard(&table());
        let kinds: Vec<ChartKind> = d.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());
        assert_eq!(d.rows, 3);
    }

    #[test]
    fn unrated_row_still_feeds_the_other_charts() {
        let mut records = table();
        let mut unrated = MovieRecord::new("Unrated", 0.0);
        unrated.imdb_rating = None;
        unrated.color = Some("Color".to_string());
        unrated.sound_mix = Some("Mono".to_string());
        unrated.budget = Some(20e6);
        unrated.gross_worldwide = Some(60e6);
        unrated.opening_weekend_date = Some("2010-01-01".to_string());
        records.push(unrated);
        let d = dashboard(&records);
        let chart = |kind: ChartKind| &d.charts[kind.ordinal() - 1];

        let ChartData::Pie { slices, .. } = &chart(ChartKind::Color).data else {
            panic!("expected pie");
        };
        let color = slices.iter().find(|s| s.label == "Color").map(|s| s.count);
        assert_eq!(color, Some(3));
        assert_eq!(chart(ChartKind::Color).excluded, 0);

        let ChartData::Scatter { points, .. } = &chart(ChartKind::BudgetGross).data else {
            panic!("expected scatter");
        };
        assert!(points.contains(&(20e6, 60e6)));

        let ChartData::Bar { bars, .. } = &chart(ChartKind::TopRated).data else {
            panic!("expected bars");
        };
        assert!(bars.iter().all(|b| b.label != "Unrated"));
        assert_eq!(chart(ChartKind::TopRated).excluded, 1);
        assert_eq!(chart(ChartKind::Rating).excluded, 1);
        assert_eq!(chart(ChartKind::SoundMixRating).excluded, 1);
        assert_eq!(chart(ChartKind::YearRating).excluded, 2);
    }

    #[test]
    fn year_scatter_excludes_unparsable_dates_only_there() {
        let d = dashboard(&table());
        let year = &d.charts[ChartKind::YearRating.ordinal() - 1];
        let ChartData::Scatter { points, .. } = &year.data else {
            panic!("expected scatter");
        };
        assert_eq!(points, &vec![(2008.0, 8.5), (1999.0, 8.2)]);
        assert_eq!(year.excluded, 1);

        // The rating histogram still sees all three rows.
        let rating = &d.charts[ChartKind::Rating.ordinal() - 1];
        let ChartData::Histogram { bins, .. } = &rating.data else {
            panic!("expected histogram");
        };
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert_eq!(rating.excluded, 0);
    }

    #[test]
    fn chart_order_does_not_change_results() {
        let records = table();
        let derived = derive_all(&records, RuntimeNormalizer::default());
        let config = DashboardConfig::new("x.csv".into());

        let year_first = build_chart(ChartKind::YearRating, &records, &derived.fields, &config);
        let profit = build_chart(ChartKind::BudgetProfit, &records, &derived.fields, &config);
        let year_again = build_chart(ChartKind::YearRating, &records, &derived.fields, &config);

        assert_eq!(
            serde_json::to_string(&year_first).unwrap(),
            serde_json::to_string(&year_again).unwrap()
        );
        let ChartData::Bar { bars, .. } = &profit.data else {
            panic!("expected bars");
        };
        // B has no gross figure, so only A and C qualify; C has the larger budget.
        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "A"]);
        assert!((bars[0].value + 10.0).abs() < 1e-9);
    }

    #[test]
    fn runtime_histogram_uses_defined_minutes() {
        let d = dashboard(&table());
        let runtime = &d.charts[ChartKind::Runtime.ordinal() - 1];
        assert_eq!(runtime.excluded, 1);
        let ChartData::Histogram { bins, .. } = &runtime.data else {
            panic!("expected histogram");
        };
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins.first().map(|b| b.start), Some(100.0));
        assert_eq!(bins.last().map(|b| b.end), Some(130.0));
    }

    #[test]
    fn treemap_tiles_follow_counts() {
        let d = dashboard(&table());
        let tm = &d.charts[ChartKind::SoundMixTreemap.ordinal() - 1];
        let ChartData::Treemap { tiles } = &tm.data else {
            panic!("expected treemap");
        };
        assert_eq!(tiles[0].label, "Dolby Digital");
        assert_eq!(tiles[0].count, 2);
        let total: f64 = tiles.iter().map(|t| t.rect.area()).sum();
        assert!((total - TREEMAP_BOUNDS.area()).abs() < 1e-6);
    }

    #[test]
    fn selection_keeps_dashboard_order() {
        let records = table();
        let derived = derive_all(&records, RuntimeNormalizer::default());
        let mut config = DashboardConfig::new("x.csv".into());
        config.charts = vec![ChartKind::Rating, ChartKind::Color];
        let d = build_dashboard(&records, &derived.fields, &config);
        let kinds: Vec<ChartKind> = d.charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Color, ChartKind::Rating]);
    }

    #[test]
    fn empty_chart_stays_in_sequence() {
        let records = vec![MovieRecord::new("Lonely", 8.0)];
        let d = dashboard(&records);
        assert_eq!(d.charts.len(), ChartKind::ALL.len());
        let color = &d.charts[ChartKind::Color.ordinal() - 1];
        assert!(color.is_empty());
        assert_eq!(color.excluded, 1);
    }
}
