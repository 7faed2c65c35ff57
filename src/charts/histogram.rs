//! Histogram binning and kernel density overlay.

use crate::domain::HistogramBin;

/// Number of points on the KDE evaluation grid.
pub const KDE_GRID_POINTS: usize = 200;

/// Upper bound on `auto_bin_count`.
pub const MAX_AUTO_BINS: usize = 1000;

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
///
/// A single repeated value gets a unit-wide range centered on it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let Some((lo, hi)) = finite_range(values) else {
        return Vec::new();
    };
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + i as f64 * width,
            end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Bin count chosen the way numpy's `"auto"` estimator does: the narrower of
/// the Sturges and Freedman-Diaconis widths, ignoring FD when the IQR is zero.
///
/// Never more bins than values, nor more than `MAX_AUTO_BINS`.
pub fn auto_bin_count(values: &[f64]) -> usize {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = sorted.len();
    if n < 2 {
        return 1;
    }
    sorted.sort_by(f64::total_cmp);

    let span = sorted[n - 1] - sorted[0];
    if span <= 0.0 {
        return 1;
    }

    let sturges = span / ((n as f64).log2() + 1.0);
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    let fd = 2.0 * iqr * (n as f64).powf(-1.0 / 3.0);
    let width = if fd > 0.0 { sturges.min(fd) } else { sturges };

    ((span / width).ceil() as usize).clamp(1, n.min(MAX_AUTO_BINS))
}

/// Gaussian KDE with Scott's bandwidth, scaled so it overlays a histogram
/// with bins of `bin_width`.
///
/// Returns an empty curve for fewer than two values or zero variance.
pub fn gaussian_kde(values: &[f64], bin_width: f64, grid_points: usize) -> Vec<(f64, f64)> {
    let xs: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = xs.len();
    if n < 2 || !(bin_width.is_finite() && bin_width > 0.0) {
        return Vec::new();
    }

    let mean = xs.iter().sum::<f64>() / n as f64;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    let sigma = var.sqrt();
    if !(sigma.is_finite() && sigma > 0.0) {
        return Vec::new();
    }
    let bandwidth = sigma * (n as f64).powf(-0.2);

    let Some((lo, hi)) = finite_range(&xs) else {
        return Vec::new();
    };
    let grid_points = grid_points.max(2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n as f64 * bin_width;

    (0..grid_points)
        .map(|i| {
            let u = i as f64 / (grid_points as f64 - 1.0);
            let x = lo + u * (hi - lo);
            let density: f64 = xs
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}

/// Linear-interpolated percentile of sorted data, `q` in `[0, 1]`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() { Some((lo, hi)) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 5.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[3].end, 5.0);
        // The maximum lands in the last bin, not past it.
        assert_eq!(bins[3].count, 2);
    }

    #[test]
    fn histogram_handles_degenerate_input() {
        assert!(histogram(&[], 5).is_empty());
        assert!(histogram(&[f64::NAN], 5).is_empty());
        let one = histogram(&[7.0, 7.0], 2);
        assert_eq!(one[0].start, 6.5);
        assert_eq!(one[1].end, 7.5);
        assert_eq!(one.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn auto_bin_count_matches_numpy_auto() {
        // numpy.histogram_bin_edges(np.arange(100), "auto") has 8 bins (Sturges wins).
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        assert_eq!(auto_bin_count(&values), 8);
        assert_eq!(auto_bin_count(&[3.0]), 1);
        assert_eq!(auto_bin_count(&[3.0, 3.0, 3.0]), 1);
    }

    #[test]
    fn auto_bin_count_is_bounded_by_an_outlier() {
        // A tight cluster makes the FD width tiny; one saturated runtime
        // would otherwise ask for tens of millions of bins.
        let mut values: Vec<f64> = (0..50).map(|i| 90.0 + (i * 2) as f64).collect();
        values.push(f64::from(u32::MAX));
        let bins = auto_bin_count(&values);
        assert!(bins <= values.len());
        assert!(bins <= MAX_AUTO_BINS);
        assert_eq!(histogram(&values, bins).len(), bins);

        let many: Vec<f64> = (0..5000).map(f64::from).chain([1e12]).collect();
        assert_eq!(auto_bin_count(&many), MAX_AUTO_BINS);
    }

    #[test]
    fn kde_integrates_to_sample_count() {
        let values: Vec<f64> = (0..50).map(|i| 100.0 + (i % 10) as f64 * 5.0).collect();
        let bin_width = 5.0;
        let curve = gaussian_kde(&values, bin_width, 400);
        assert_eq!(curve.len(), 400);

        // Count-scaled density integrates to n * bin_width; the grid stops at the
        // data range, so the tails past min/max are missing.
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        let expected = values.len() as f64 * bin_width;
        assert!(area > 0.7 * expected && area < expected, "area={area}");
    }

    #[test]
    fn kde_needs_spread() {
        assert!(gaussian_kde(&[1.0], 1.0, 10).is_empty());
        assert!(gaussian_kde(&[2.0, 2.0, 2.0], 1.0, 10).is_empty());
    }
}
