//! Scaling normalization and log-transformation of count matrices.
//!
//! Given a feature-by-sample count matrix and one size factor per sample,
//! divide each sample's counts by its size factor and (optionally)
//! log2-transform the result. Scaling removes differences in coverage
//! between samples; the log-transformation shifts the focus of downstream
//! analyses to relative differences and provides some variance
//! stabilization.
//!
//! Size factors should be centered (see [`crate::center`]) so that the
//! normalized values stay on the scale of the original counts, and
//! sanitized (see [`crate::sanitize`]) so that every factor is finite and
//! positive. Factors from any method are acceptable as long as they meet
//! that requirement.

use crate::error::{NormError, Result};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};

/// Options for [`log_normalize`] and [`log_normalize_sparse`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Pseudo-count added to each scaled value before log-transformation.
    ///
    /// The default of 1 keeps zero counts at zero in the log-count matrix.
    /// Larger values shrink differences between samples towards zero,
    /// trading variance for bias (see [`crate::pseudo`] for a data-driven
    /// choice). Ignored if `log` is false.
    pub pseudo_count: f64,
    /// Whether to preserve sparsity for non-unit pseudo-counts.
    ///
    /// If true, the size factors are multiplied by `pseudo_count` and an
    /// effective pseudo-count of 1 is used instead. Differences between
    /// entries of the output are unchanged, and adding
    /// `log2(pseudo_count)` recovers the expected log-count values.
    /// Ignored if `log` is false.
    pub preserve_sparsity: bool,
    /// Whether to log2-transform after scaling.
    pub log: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            pseudo_count: 1.0,
            preserve_sparsity: false,
            log: true,
        }
    }
}

fn validate_factors(size_factors: &[f64], n_samples: usize) -> Result<()> {
    if size_factors.len() != n_samples {
        return Err(NormError::DimensionMismatch {
            expected: n_samples,
            actual: size_factors.len(),
        });
    }
    for (j, &sf) in size_factors.iter().enumerate() {
        if !sf.is_finite() || sf <= 0.0 {
            return Err(NormError::InvalidFactor(format!(
                "size factor {} for sample {} is not finite and positive; sanitize factors before normalizing",
                sf, j
            )));
        }
    }
    Ok(())
}

/// Resolve the effective size factors and pseudo-count for a call.
fn effective_scaling(size_factors: &[f64], options: &NormalizeOptions) -> (Vec<f64>, f64) {
    let mut factors = size_factors.to_vec();
    let mut pseudo = options.pseudo_count;
    if options.log && options.preserve_sparsity && pseudo != 1.0 {
        for sf in &mut factors {
            *sf *= pseudo;
        }
        pseudo = 1.0;
    }
    (factors, pseudo)
}

/// Compute (log-)normalized expression values from a dense count matrix.
///
/// `counts` is features × samples; `size_factors` has one finite positive
/// entry per sample (column). Each column is divided by its size factor
/// and, if [`NormalizeOptions::log`] is set, log2-transformed after adding
/// the pseudo-count.
pub fn log_normalize(
    counts: &DMatrix<f64>,
    size_factors: &[f64],
    options: &NormalizeOptions,
) -> Result<DMatrix<f64>> {
    validate_factors(size_factors, counts.ncols())?;
    let (factors, pseudo) = effective_scaling(size_factors, options);

    let n_features = counts.nrows();
    let n_samples = counts.ncols();

    let normalized_cols: Vec<Vec<f64>> = (0..n_samples)
        .into_par_iter()
        .map(|j| {
            let sf = factors[j];
            let col = counts.column(j);
            if options.log {
                col.iter().map(|&v| (v / sf + pseudo).log2()).collect()
            } else {
                col.iter().map(|&v| v / sf).collect()
            }
        })
        .collect();

    let mut data = DMatrix::zeros(n_features, n_samples);
    for (j, col) in normalized_cols.iter().enumerate() {
        for (i, &val) in col.iter().enumerate() {
            data[(i, j)] = val;
        }
    }
    Ok(data)
}

/// Compute (log-)normalized expression values from a sparse count matrix.
///
/// Semantics match [`log_normalize`], but only sparsity-preserving
/// configurations are accepted: either no log-transformation, a
/// pseudo-count of 1, or [`NormalizeOptions::preserve_sparsity`]. Other
/// configurations would densify the matrix; use the dense path for those.
pub fn log_normalize_sparse(
    counts: &CsMat<f64>,
    size_factors: &[f64],
    options: &NormalizeOptions,
) -> Result<CsMat<f64>> {
    validate_factors(size_factors, counts.cols())?;

    if options.log && options.pseudo_count != 1.0 && !options.preserve_sparsity {
        return Err(NormError::InvalidParameter(
            "non-unit pseudo-count without preserve_sparsity densifies the matrix; \
             use log_normalize on a dense matrix instead"
                .to_string(),
        ));
    }
    let (factors, _) = effective_scaling(size_factors, options);

    let mut tri = TriMat::new(counts.shape());
    for (&val, (i, j)) in counts.iter() {
        let scaled = val / factors[j];
        let out = if options.log {
            // Effective pseudo-count is 1 here, so log2(x + 1) keeps
            // structural zeros at zero.
            (scaled + 1.0).log2()
        } else {
            scaled
        };
        tri.add_triplet(i, j, out);
    }
    Ok(tri.to_csr())
}
