//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while building charts
//! - exported to JSON/CSV
//! - rendered by either the text report or the terminal dashboard

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeParseError;

/// How the runtime normalizer treats tokens it cannot interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Skip unreadable tokens and keep the partial total.
    #[default]
    Lenient,
    /// Reject the whole value on the first unreadable token.
    Strict,
}

/// One row of the movie table.
///
/// Every field except `title` is `None` when the cell is empty, unreadable or
/// the column is absent. A blank title is kept as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    /// On the 0-10 scale; out-of-range values are stored as `None`.
    pub imdb_rating: Option<f64>,
    pub sound_mix: Option<String>,
    pub budget: Option<f64>,
    pub gross_worldwide: Option<f64>,
    pub color: Option<String>,
    pub classifications: Option<String>,
    /// Free-text duration, e.g. `"2 hours 15 minutes"`.
    pub runtime: Option<String>,
    pub opening_weekend_date: Option<String>,
}

impl MovieRecord {
    /// A record with only a title and a rating set.
    pub fn new(title: impl Into<String>, imdb_rating: f64) -> Self {
        Self {
            title: title.into(),
            imdb_rating: Some(imdb_rating),
            sound_mix: None,
            budget: None,
            gross_worldwide: None,
            color: None,
            classifications: None,
            runtime: None,
            opening_weekend_date: None,
        }
    }
}

/// Per-row computed fields. `None` means "undefined", never zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedFields {
    /// `gross_worldwide - budget`, negative when the film lost money.
    pub gross_profit: Option<f64>,
    pub runtime_minutes: Option<u32>,
    pub release_year: Option<i32>,
}

/// A row whose runtime was rejected in strict mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedIssue {
    /// Zero-based index into the record slice.
    pub row: usize,
    pub title: String,
    pub error: RuntimeParseError,
}

/// The derived view: one `DerivedFields` per record, in record order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedView {
    pub fields: Vec<DerivedFields>,
    pub issues: Vec<DerivedIssue>,
}

impl DerivedView {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// How many rows have each derived field defined.
    pub fn coverage(&self) -> DerivedCoverage {
        let mut out = DerivedCoverage {
            rows: self.fields.len(),
            ..DerivedCoverage::default()
        };
        for f in &self.fields {
            out.gross_profit += usize::from(f.gross_profit.is_some());
            out.runtime_minutes += usize::from(f.runtime_minutes.is_some());
            out.release_year += usize::from(f.release_year.is_some());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedCoverage {
    pub rows: usize,
    pub gross_profit: usize,
    pub runtime_minutes: usize,
    pub release_year: usize,
}

/// The fixed chart sequence, in dashboard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    TopRated,
    SoundMixRating,
    BudgetProfit,
    Color,
    Classification,
    SoundMixTreemap,
    Runtime,
    Rating,
    BudgetGross,
    YearRating,
}

impl ChartKind {
    pub const ALL: [ChartKind; 10] = [
        ChartKind::TopRated,
        ChartKind::SoundMixRating,
        ChartKind::BudgetProfit,
        ChartKind::Color,
        ChartKind::Classification,
        ChartKind::SoundMixTreemap,
        ChartKind::Runtime,
        ChartKind::Rating,
        ChartKind::BudgetGross,
        ChartKind::YearRating,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::TopRated => "Top 10 Films by IMDb Rating",
            ChartKind::SoundMixRating => "Average IMDb Rating by Sound Mix",
            ChartKind::BudgetProfit => "Net Profit of the 5 Highest-Budget Films (million USD)",
            ChartKind::Color => "Film Color Composition",
            ChartKind::Classification => "Film Classification Composition",
            ChartKind::SoundMixTreemap => "Sound Mix Composition Treemap",
            ChartKind::Runtime => "Runtime Distribution (minutes)",
            ChartKind::Rating => "IMDb Rating Distribution",
            ChartKind::BudgetGross => "Budget vs Worldwide Gross",
            ChartKind::YearRating => "Release Year vs IMDb Rating",
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            ChartKind::TopRated => {
                "The ten highest-rated titles. The spread between first and tenth place is narrow."
            }
            ChartKind::SoundMixRating => {
                "Mean rating per sound mix. Rare mixes with only a handful of films can sit at either extreme."
            }
            ChartKind::BudgetProfit => {
                "Worldwide gross minus budget for the five most expensive films with both figures known."
            }
            ChartKind::Color => "Share of color and black-and-white films in the list.",
            ChartKind::Classification => "Share of each age classification in the list.",
            ChartKind::SoundMixTreemap => {
                "Each tile is a sound mix, sized by the number of films that use it."
            }
            ChartKind::Runtime => {
                "Most films run between one and a half and two and a half hours."
            }
            ChartKind::Rating => "Ratings cluster just above 8 with a long thin tail toward 9.",
            ChartKind::BudgetGross => {
                "Each point is a film with both budget and worldwide gross known."
            }
            ChartKind::YearRating => {
                "Release year from the opening weekend date. Films without a readable date are left out."
            }
        }
    }

    /// Position in the dashboard, starting at 1.
    pub fn ordinal(self) -> usize {
        ChartKind::ALL
            .iter()
            .position(|k| *k == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

/// A full dashboard: the ordered charts plus dataset-level context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub rows: usize,
    pub charts: Vec<Chart>,
}

/// One chart: its place in the sequence, static text, and chart-ready series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub caption: String,
    /// Rows left out of this chart because a required field was undefined.
    pub excluded: usize,
    pub data: ChartData,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        match &self.data {
            ChartData::Bar { bars, .. } => bars.is_empty(),
            ChartData::Pie { slices, .. } => slices.is_empty(),
            ChartData::Treemap { tiles } => tiles.is_empty(),
            ChartData::Histogram { bins, .. } => bins.is_empty(),
            ChartData::Scatter { points, .. } => points.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        orientation: Orientation,
        value_label: String,
        bars: Vec<BarItem>,
    },
    Pie {
        /// Drawn with a hollow center (donut).
        donut: bool,
        slices: Vec<PieSlice>,
    },
    Treemap {
        tiles: Vec<TreemapTile>,
    },
    Histogram {
        x_label: String,
        bins: Vec<HistogramBin>,
        /// Kernel density estimate scaled to bin counts, as `(x, count)` pairs.
        kde: Vec<(f64, f64)>,
    },
    Scatter {
        x_label: String,
        y_label: String,
        points: Vec<(f64, f64)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarItem {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Share of the total in percent (0-100).
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapTile {
    pub label: String,
    pub count: usize,
    pub rect: TileRect,
}

/// Axis-aligned rectangle in treemap space (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl TileRect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment and defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    pub runtime_mode: RuntimeMode,
    /// Charts to build, in dashboard order. Empty means all of them.
    pub charts: Vec<ChartKind>,

    pub top_rated: usize,
    pub top_budget: usize,
    pub rating_bins: usize,

    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_derived: Option<PathBuf>,
}

pub const DEFAULT_CSV: &str = "imdb_top_250_cleaned.csv";
pub const DEFAULT_TOP_RATED: usize = 10;
pub const DEFAULT_TOP_BUDGET: usize = 5;
pub const DEFAULT_RATING_BINS: usize = 20;

impl DashboardConfig {
    /// Default chart counts and plot size for `csv_path`.
    pub fn new(csv_path: PathBuf) -> Self {
        Self {
            csv_path,
            runtime_mode: RuntimeMode::Lenient,
            charts: Vec::new(),
            top_rated: DEFAULT_TOP_RATED,
            top_budget: DEFAULT_TOP_BUDGET,
            rating_bins: DEFAULT_RATING_BINS,
            plot_width: 80,
            plot_height: 20,
            export_json: None,
            export_derived: None,
        }
    }

    /// The charts selected for this run, in dashboard order.
    pub fn selected_charts(&self) -> Vec<ChartKind> {
        if self.charts.is_empty() {
            return ChartKind::ALL.to_vec();
        }
        ChartKind::ALL
            .iter()
            .copied()
            .filter(|k| self.charts.contains(k))
            .collect()
    }
}
