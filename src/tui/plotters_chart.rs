//! Plotters-powered histogram and scatter widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// The ratatui `Color` below shadows the prelude's; keep the trait for `.filled()`.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::HistogramBin;

/// What to draw inside the plotting area.
#[derive(Debug, Clone, Copy)]
pub enum PlotSeries<'a> {
    /// Count bars with the density curve on top.
    Histogram {
        bins: &'a [HistogramBin],
        kde: &'a [(f64, f64)],
    },
    /// One dot per film.
    Scatter { points: &'a [(f64, f64)] },
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct DashPlottersChart<'a> {
    pub series: PlotSeries<'a>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for DashPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let bar_color = RGBColor(70, 130, 180); // steel blue
            let kde_color = RGBColor(255, 165, 0); // orange
            let point_color = RGBColor(0, 255, 255); // cyan

            match self.series {
                PlotSeries::Histogram { bins, kde } => {
                    chart.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
                        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], bar_color.filled())
                    }))?;
                    if !kde.is_empty() {
                        chart.draw_series(LineSeries::new(kde.iter().copied(), &kde_color))?;
                    }
                }
                PlotSeries::Scatter { points } => {
                    // `Circle` radii come out far too large through the ratatui
                    // backend; single pixels read as dots.
                    chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), point_color)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// X/Y bounds for a histogram: the bin range and zero up to the tallest of
/// the bars and the density curve, with headroom.
pub fn histogram_bounds(bins: &[HistogramBin], kde: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (x0, x1) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) if last.end > first.start => (first.start, last.end),
        _ => (0.0, 1.0),
    };
    let top = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(kde.iter().map(|&(_, y)| y))
        .fold(0.0, f64::max);
    let top = if top > 0.0 { top * 1.1 } else { 1.0 };
    ([x0, x1], [0.0, top])
}

/// X/Y bounds for a scatter, padded 5% on both axes.
pub fn scatter_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let xs = padded(points.iter().map(|p| p.0));
    let ys = padded(points.iter().map(|p| p.1));
    (xs, ys)
}

fn padded(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 0.5, hi + 0.5];
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_bounds_cover_bars_and_curve() {
        let bins = vec![
            HistogramBin {
                start: 90.0,
                end: 120.0,
                count: 4,
            },
            HistogramBin {
                start: 120.0,
                end: 150.0,
                count: 2,
            },
        ];
        let (x, y) = histogram_bounds(&bins, &[(100.0, 5.0)]);
        assert_eq!(x, [90.0, 150.0]);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 5.5).abs() < 1e-9);
    }

    #[test]
    fn scatter_bounds_pad_and_handle_single_points() {
        let (x, y) = scatter_bounds(&[(0.0, 8.0), (10.0, 9.0)]);
        assert_eq!(x, [-0.5, 10.5]);
        assert!((y[0] - 7.95).abs() < 1e-9 && (y[1] - 9.05).abs() < 1e-9);

        let (x, _) = scatter_bounds(&[(1999.0, 8.0)]);
        assert_eq!(x, [1998.5, 1999.5]);
        assert_eq!(scatter_bounds(&[]).0, [0.0, 1.0]);
    }
}
