//! Unblocked mean computation and centering.

use super::CenterOptions;
use crate::sanitize::{is_invalid, SizeFactorDiagnostics};
use num_traits::Float;

/// Compute the mean size factor.
///
/// With [`CenterOptions::ignore_invalid`], only finite positive factors
/// contribute to the mean; each invalid factor is tallied into
/// `diagnostics` (or an internal throwaway if `None` is supplied). If no
/// factor contributes, the mean is defined as 0 rather than an error, so
/// callers can detect the degenerate all-invalid case.
///
/// Accumulation happens in `F` itself; no wider accumulator is used.
pub fn factor_mean<F: Float>(
    factors: &[F],
    diagnostics: Option<&mut SizeFactorDiagnostics>,
    options: &CenterOptions,
) -> F {
    let mut sum = F::zero();
    let mut denom = 0usize;

    if options.ignore_invalid {
        let mut local = SizeFactorDiagnostics::default();
        let diag = diagnostics.unwrap_or(&mut local);
        for &val in factors {
            if !is_invalid(val, diag) {
                sum = sum + val;
                denom += 1;
            }
        }
    } else {
        for &val in factors {
            sum = sum + val;
        }
        denom = factors.len();
    }

    if denom > 0 {
        sum / F::from(denom).unwrap()
    } else {
        F::zero()
    }
}

/// Center size factors in place so that their mean is 1.
///
/// Computes the mean via [`factor_mean`] and divides every element by it.
/// If the mean is 0 (no valid factors, or genuinely zero-mean input), the
/// array is left untouched so that no NaN or infinity is propagated into
/// it. Returns the computed mean either way.
pub fn center_factors<F: Float>(
    factors: &mut [F],
    diagnostics: Option<&mut SizeFactorDiagnostics>,
    options: &CenterOptions,
) -> F {
    let mean = factor_mean(factors, diagnostics, options);
    if mean != F::zero() {
        for val in factors.iter_mut() {
            *val = *val / mean;
        }
    }
    mean
}
