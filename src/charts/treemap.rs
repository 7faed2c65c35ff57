//! Squarified treemap layout (Bruls, Huizing & van Wijk).
//!
//! Items are laid out in rows along the shorter side of the remaining space.
//! A row keeps accepting items while doing so does not make its worst aspect
//! ratio worse; then the row is fixed and the rest recurses into the leftover
//! rectangle.

use crate::domain::TileRect;

/// Lay out `sizes` inside `bounds`, returning one rectangle per kept size.
///
/// Sizes must already be sorted in descending order for the layout to be
/// squarified. Non-positive and non-finite sizes are dropped, so the output
/// can be shorter than the input; the returned index says which input each
/// rectangle belongs to.
pub fn squarify(sizes: &[f64], bounds: TileRect) -> Vec<(usize, TileRect)> {
    if !(bounds.width > 0.0 && bounds.height > 0.0) {
        return Vec::new();
    }

    let kept: Vec<(usize, f64)> = sizes
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| s.is_finite() && *s > 0.0)
        .collect();
    let total: f64 = kept.iter().map(|(_, s)| s).sum();
    if kept.is_empty() || total <= 0.0 {
        return Vec::new();
    }

    // Scale sizes to areas of the bounding rectangle.
    let scale = bounds.area() / total;
    let areas: Vec<f64> = kept.iter().map(|(_, s)| s * scale).collect();

    let mut out = Vec::with_capacity(kept.len());
    let mut space = bounds;
    let mut start = 0;

    while start < areas.len() {
        let remaining = &areas[start..];
        let mut take = 1;
        while take < remaining.len()
            && worst_ratio(&remaining[..take], space) >= worst_ratio(&remaining[..=take], space)
        {
            take += 1;
        }

        let row = &remaining[..take];
        for (offset, rect) in layout(row, space).into_iter().enumerate() {
            out.push((kept[start + offset].0, rect));
        }
        space = leftover(row, space);
        start += take;
    }

    out
}

fn layout(areas: &[f64], space: TileRect) -> Vec<TileRect> {
    let covered: f64 = areas.iter().sum();
    let mut out = Vec::with_capacity(areas.len());

    if space.width >= space.height {
        // Column on the left, stacked top to bottom.
        let width = covered / space.height;
        let mut y = space.y;
        for &a in areas {
            let height = a / width;
            out.push(TileRect {
                x: space.x,
                y,
                width,
                height,
            });
            y += height;
        }
    } else {
        // Row along the top, left to right.
        let height = covered / space.width;
        let mut x = space.x;
        for &a in areas {
            let width = a / height;
            out.push(TileRect {
                x,
                y: space.y,
                width,
                height,
            });
            x += width;
        }
    }

    out
}

fn leftover(areas: &[f64], space: TileRect) -> TileRect {
    let covered: f64 = areas.iter().sum();
    if space.width >= space.height {
        let width = covered / space.height;
        TileRect {
            x: space.x + width,
            y: space.y,
            width: (space.width - width).max(0.0),
            height: space.height,
        }
    } else {
        let height = covered / space.width;
        TileRect {
            x: space.x,
            y: space.y + height,
            width: space.width,
            height: (space.height - height).max(0.0),
        }
    }
}

fn worst_ratio(areas: &[f64], space: TileRect) -> f64 {
    layout(areas, space)
        .iter()
        .map(|r| (r.width / r.height).max(r.height / r.width))
        .fold(0.0, f64::max)
}
