//! Percentiles by selection
//!
//! Linear interpolation between the two closest order statistics: for `n`
//! values the `p`-th percentile sits at rank `p/100 * (n-1)`. Selection uses
//! `select_nth_unstable_by`, so the cost is O(n) instead of a full sort.

use lakeseg_core::{Error, Result};

/// Percentile `p` in [0, 100] of `values`.
///
/// The slice is reordered in place. Returns `None` for an empty slice.
/// NaN values sort above every finite value.
pub fn percentile(values: &mut [f64], p: f64) -> Result<Option<f64>> {
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidParameter {
            name: "percentile",
            value: p.to_string(),
            reason: "percentile must be between 0 and 100".to_string(),
        });
    }
    if values.is_empty() {
        return Ok(None);
    }

    let n = values.len();
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;

    let (_, &mut lower, upper_part) = values.select_nth_unstable_by(lo, f64::total_cmp);
    if frac == 0.0 || upper_part.is_empty() {
        return Ok(Some(lower));
    }

    // Next order statistic is the smallest value of the right partition
    let upper = upper_part
        .iter()
        .copied()
        .min_by(f64::total_cmp)
        .unwrap_or(lower);

    Ok(Some(lower + (upper - lower) * frac))
}

/// Median (50th percentile) of `values`, reordering the slice in place
pub fn median(values: &mut [f64]) -> Option<f64> {
    // 50 is always in range
    percentile(values, 50.0).ok().flatten()
}
