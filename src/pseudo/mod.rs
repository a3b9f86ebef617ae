//! Data-driven choice of the pseudo-count for log-transformation.
//!
//! The transformation bias at low counts depends on the spread of the size
//! factors: samples scaled by very different factors receive different
//! shrinkage from the same pseudo-count. Following Lun (2018), the
//! pseudo-count is chosen so that the difference in shrinkage between the
//! most extreme (quantile-trimmed) size factors stays below a bias
//! threshold. Larger spreads therefore demand larger pseudo-counts.
//!
//! The size factors should be centered (see [`crate::center`]) before
//! calling [`choose_pseudo_count`], as the spread is measured on the
//! centered scale where a factor of 1 is typical.

use serde::{Deserialize, Serialize};

/// Options for [`choose_pseudo_count`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PseudoCountOptions {
    /// Quantile trimmed from each end of the size factor distribution
    /// before measuring its spread, so a handful of outliers does not
    /// inflate the pseudo-count.
    pub quantile: f64,
    /// Acceptable upper bound on the transformation bias.
    pub max_bias: f64,
    /// Floor on the returned pseudo-count. The default of 1 means the
    /// choice can only ever be more conservative than the usual log1p.
    pub min_value: f64,
}

impl Default for PseudoCountOptions {
    fn default() -> Self {
        Self {
            quantile: 0.05,
            max_bias: 0.1,
            min_value: 1.0,
        }
    }
}

/// Quantile of an unsorted buffer, with linear interpolation (R type 7).
///
/// Sorts `values` in place. `values` must be non-empty and `q` in [0, 1].
pub fn find_quantile(q: f64, values: &mut [f64]) -> f64 {
    debug_assert!(!values.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let h = q * (values.len() - 1) as f64;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    if frac == 0.0 {
        values[lo]
    } else {
        values[lo] + frac * (values[lo + 1] - values[lo])
    }
}

/// Choose a pseudo-count that bounds the log-transformation bias.
///
/// Only finite positive size factors are considered; if none remain, the
/// floor [`PseudoCountOptions::min_value`] is returned. Otherwise the
/// `quantile` and `1 - quantile` quantiles of the valid factors determine
/// the spread, and the pseudo-count is
/// `(1/lower - 1/upper) / (8 * max_bias)`, floored at `min_value`.
pub fn choose_pseudo_count(size_factors: &[f64], options: &PseudoCountOptions) -> f64 {
    let mut valid: Vec<f64> = size_factors
        .iter()
        .copied()
        .filter(|s| s.is_finite() && *s > 0.0)
        .collect();

    if valid.is_empty() {
        return options.min_value;
    }

    let lower = find_quantile(options.quantile, &mut valid);
    let upper = find_quantile(1.0 - options.quantile, &mut valid);
    let pseudo = (1.0 / lower - 1.0 / upper) / (8.0 * options.max_bias);
    pseudo.max(options.min_value)
}
