//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bars: `#` (negative values `-`)
//! - histogram columns: `#`, density overlay: `*`
//! - scatter points: `o`
//! - treemap tiles: one letter per tile, with a legend

use crate::charts::TREEMAP_BOUNDS;
use crate::domain::{BarItem, Chart, ChartData, HistogramBin, PieSlice, TreemapTile};

const MAX_LABEL: usize = 28;
const TILE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Render any chart body (no title or caption) at the given size.
pub fn render_chart(chart: &Chart, width: usize, height: usize) -> String {
    if chart.is_empty() {
        return "(no data)\n".to_string();
    }
    match &chart.data {
        ChartData::Bar { value_label, bars, .. } => render_bars(bars, value_label, width),
        ChartData::Pie { donut, slices } => render_pie(slices, *donut, width),
        ChartData::Treemap { tiles } => render_treemap(tiles, width, height),
        ChartData::Histogram { x_label, bins, kde } => render_histogram(bins, kde, x_label, width, height),
        ChartData::Scatter {
            x_label,
            y_label,
            points,
        } => render_scatter(points, x_label, y_label, width, height),
    }
}

/// Labelled horizontal bars scaled to the largest magnitude.
pub fn render_bars(bars: &[BarItem], value_label: &str, width: usize) -> String {
    let label_width = label_width(bars.iter().map(|b| b.label.as_str()));
    let bar_space = width.saturating_sub(label_width + 14).max(10);
    let max_abs = bars.iter().map(|b| b.value.abs()).fold(0.0, f64::max);

    let mut out = String::new();
    out.push_str(value_label);
    out.push('\n');

    for b in bars {
        let n = scaled_len(b.value.abs(), max_abs, bar_space);
        let ch = if b.value < 0.0 { "-" } else { "#" };
        out.push_str(&format!(
            "{:<lw$} |{:<bs$} {:.2}\n",
            truncate(&b.label, label_width),
            ch.repeat(n),
            b.value,
            lw = label_width,
            bs = bar_space,
        ));
    }
    out
}

/// Share table with a proportional bar per slice.
pub fn render_pie(slices: &[PieSlice], donut: bool, width: usize) -> String {
    let label_width = label_width(slices.iter().map(|s| s.label.as_str()));
    let bar_space = width.saturating_sub(label_width + 16).max(10);

    let mut out = String::new();
    let total: usize = slices.iter().map(|s| s.count).sum();
    out.push_str(&format!(
        "{} of {total}{}\n",
        if donut { "Donut" } else { "Pie" },
        if total == 1 { " film" } else { " films" },
    ));

    for s in slices {
        let n = scaled_len(s.percent, 100.0, bar_space);
        out.push_str(
            format!(
                "{:<lw$} {:>5} {:>5.1}% {}\n",
                truncate(&s.label, label_width),
                s.count,
                s.percent,
                "#".repeat(n),
                lw = label_width,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Treemap tiles drawn as filled letter blocks, followed by a legend.
pub fn render_treemap(tiles: &[TreemapTile], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let mut grid = vec![vec![' '; width]; height];

    let sx = width as f64 / TREEMAP_BOUNDS.width;
    let sy = height as f64 / TREEMAP_BOUNDS.height;

    for (i, tile) in tiles.iter().enumerate() {
        let ch = tile_char(i);
        let r = tile.rect;
        let x0 = ((r.x - TREEMAP_BOUNDS.x) * sx).round() as usize;
        let x1 = (((r.x + r.width - TREEMAP_BOUNDS.x) * sx).round() as usize).min(width);
        let y0 = ((r.y - TREEMAP_BOUNDS.y) * sy).round() as usize;
        let y1 = (((r.y + r.height - TREEMAP_BOUNDS.y) * sy).round() as usize).min(height);
        for row in grid.iter_mut().take(y1).skip(y0) {
            for cell in row.iter_mut().take(x1).skip(x0) {
                *cell = ch;
            }
        }
    }

    let mut out = String::new();
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (i, tile) in tiles.iter().enumerate() {
        out.push_str(&format!("{} {} ({})\n", tile_char(i), tile.label, tile.count));
    }
    out
}

/// Histogram columns with the density curve overlaid.
pub fn render_histogram(
    bins: &[HistogramBin],
    kde: &[(f64, f64)],
    x_label: &str,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return "(no data)\n".to_string();
    };
    let (lo, hi) = (first.start, last.end);
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let y_max = kde
        .iter()
        .map(|&(_, y)| y)
        .fold(max_count as f64, f64::max)
        .max(1.0);

    let mut grid = vec![vec![' '; width]; height];

    for col in 0..width {
        let bin = &bins[col * bins.len() / width];
        let h = scaled_len(bin.count as f64, y_max, height);
        for row in grid.iter_mut().skip(height - h) {
            row[col] = '#';
        }
    }

    if kde.len() >= 2 && hi > lo {
        for col in 0..width {
            let x = lo + (col as f64 + 0.5) / width as f64 * (hi - lo);
            let idx = (((x - kde[0].0) / (kde[kde.len() - 1].0 - kde[0].0)) * (kde.len() - 1) as f64)
                .round()
                .clamp(0.0, (kde.len() - 1) as f64) as usize;
            let row = map_y(kde[idx].1, 0.0, y_max, height);
            grid[row][col] = '*';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Histogram: {x_label}=[{lo:.2}, {hi:.2}] | bins={} | max count={max_count}\n",
        bins.len()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Scatter plot with a small header carrying the axis ranges.
pub fn render_scatter(points: &[(f64, f64)], x_label: &str, y_label: &str, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = axis_range(points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = axis_range(points.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {x_label}=[{x_min:.2}, {x_max:.2}] | {y_label}=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn axis_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min { Some((min, max)) } else { Some((min - 0.5, max + 0.5)) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn scaled_len(value: f64, max: f64, space: usize) -> usize {
    if !(max > 0.0 && value.is_finite()) {
        return 0;
    }
    ((value / max).clamp(0.0, 1.0) * space as f64).round() as usize
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0).clamp(1, MAX_LABEL)
}

fn tile_char(i: usize) -> char {
    TILE_CHARS[i % TILE_CHARS.len()] as char
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
