//! Detection and sanitization of invalid size factors.
//!
//! Size factors are only valid if they are finite and strictly positive.
//! NaN, infinite, zero or negative factors can arise when upstream quality
//! control was insufficient (e.g., all-zero cells slipping through
//! filtering). This module provides:
//!
//! - [`SizeFactorDiagnostics`]: per-category counters of invalid factors.
//! - [`check_factors`]: scan an array and tally invalid values.
//! - [`sanitize_factors`]: replace invalid values with usable placeholders.
//!
//! Sanitization should happen *after* centering (see [`crate::center`]) or
//! any other statistic computed from the factor distribution, so that the
//! placeholder values do not perturb those statistics. As a rule of thumb,
//! call [`sanitize_factors`] just before handing the factors to
//! [`crate::normalize::log_normalize`].

use crate::error::{NormError, Result};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Counts of invalid size factors, by category.
///
/// This is a write-only accumulator from the library's point of view: the
/// centering and checking routines only ever increment the counters, never
/// read or reset them. Callers may reuse one instance across multiple calls
/// to aggregate counts, or start from `default()` each time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeFactorDiagnostics {
    /// Number of negative factors detected.
    pub num_negative: usize,
    /// Number of zero factors detected.
    pub num_zero: usize,
    /// Number of NaN factors detected.
    pub num_nan: usize,
    /// Number of infinite factors detected.
    pub num_infinite: usize,
}

impl SizeFactorDiagnostics {
    /// Whether any invalid factor was recorded.
    pub fn any_invalid(&self) -> bool {
        self.total_invalid() > 0
    }

    /// Total number of invalid factors recorded, across all categories.
    pub fn total_invalid(&self) -> usize {
        self.num_negative + self.num_zero + self.num_nan + self.num_infinite
    }
}

/// Classify a single size factor, recording invalid values.
///
/// Returns `true` if `value` is invalid (negative, zero, NaN or infinite),
/// incrementing the counter of the first matching category. Valid values
/// leave `diagnostics` untouched.
pub fn is_invalid<F: Float>(value: F, diagnostics: &mut SizeFactorDiagnostics) -> bool {
    if value < F::zero() {
        diagnostics.num_negative += 1;
        return true;
    }

    if value == F::zero() {
        diagnostics.num_zero += 1;
        return true;
    }

    if value.is_nan() {
        diagnostics.num_nan += 1;
        return true;
    }

    if value.is_infinite() {
        diagnostics.num_infinite += 1;
        return true;
    }

    false
}

/// Scan an array of size factors and count the invalid values per category.
pub fn check_factors<F: Float>(factors: &[F]) -> SizeFactorDiagnostics {
    let mut output = SizeFactorDiagnostics::default();
    for &val in factors {
        is_invalid(val, &mut output);
    }
    output
}

/// How a category of invalid size factors should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleAction {
    /// Leave the values alone.
    Ignore,
    /// Fail with [`NormError::InvalidFactor`].
    Error,
    /// Replace each invalid value with a usable placeholder.
    Sanitize,
}

/// Options for [`sanitize_factors`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SanitizeOptions {
    /// How to handle zero size factors.
    ///
    /// With `Sanitize`, zeros are replaced by the smallest valid factor
    /// (or 1 if all factors are invalid). Zero factors typically come from
    /// all-zero cells; a relatively small replacement keeps the normalized
    /// values reflective of the extremity of the scaling while keeping
    /// all-zero cells as all-zero columns downstream.
    pub handle_zero: HandleAction,
    /// How to handle negative size factors. `Sanitize` follows the same
    /// smallest-valid-factor replacement as `handle_zero`.
    pub handle_negative: HandleAction,
    /// How to handle NaN size factors. `Sanitize` replaces them with 1,
    /// making the scaling a no-op for those cells.
    pub handle_nan: HandleAction,
    /// How to handle infinite size factors. `Sanitize` replaces them with
    /// the largest valid factor (or 1 if all factors are invalid), so that
    /// the normalized values are at least finite.
    pub handle_infinite: HandleAction,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            handle_zero: HandleAction::Error,
            handle_negative: HandleAction::Error,
            handle_nan: HandleAction::Error,
            handle_infinite: HandleAction::Error,
        }
    }
}

impl SanitizeOptions {
    /// Convenience constructor with every category set to `Sanitize`.
    pub fn sanitize_all() -> Self {
        Self {
            handle_zero: HandleAction::Sanitize,
            handle_negative: HandleAction::Sanitize,
            handle_nan: HandleAction::Sanitize,
            handle_infinite: HandleAction::Sanitize,
        }
    }
}

fn smallest_valid_factor<F: Float>(factors: &[F]) -> F {
    let mut smallest = F::one();
    let mut found = false;
    for &s in factors {
        if s.is_finite() && s > F::zero() && (!found || s < smallest) {
            smallest = s;
            found = true;
        }
    }
    smallest
}

fn largest_valid_factor<F: Float>(factors: &[F]) -> F {
    let mut largest = F::one();
    let mut found = false;
    for &s in factors {
        if s.is_finite() && s > F::zero() && (!found || s > largest) {
            largest = s;
            found = true;
        }
    }
    largest
}

/// Replace invalid size factors in place, according to a pre-computed status.
///
/// `status` indicates which categories are present, e.g., from
/// [`check_factors`] or as filled in by [`crate::center::center_factors`].
/// Categories absent from `status` are not scanned for at all.
pub fn sanitize_factors<F: Float>(
    factors: &mut [F],
    status: &SizeFactorDiagnostics,
    options: &SanitizeOptions,
) -> Result<()> {
    // Computed lazily, at most once across the negative and zero branches.
    let mut smallest: Option<F> = None;

    if status.num_negative > 0 {
        match options.handle_negative {
            HandleAction::Error => {
                return Err(NormError::InvalidFactor(
                    "detected negative size factor".to_string(),
                ));
            }
            HandleAction::Sanitize => {
                let replacement = *smallest.get_or_insert_with(|| smallest_valid_factor(factors));
                for s in factors.iter_mut() {
                    if *s < F::zero() {
                        *s = replacement;
                    }
                }
            }
            HandleAction::Ignore => {}
        }
    }

    if status.num_zero > 0 {
        match options.handle_zero {
            HandleAction::Error => {
                return Err(NormError::InvalidFactor(
                    "detected size factor of zero".to_string(),
                ));
            }
            HandleAction::Sanitize => {
                let replacement = *smallest.get_or_insert_with(|| smallest_valid_factor(factors));
                for s in factors.iter_mut() {
                    if *s == F::zero() {
                        *s = replacement;
                    }
                }
            }
            HandleAction::Ignore => {}
        }
    }

    if status.num_nan > 0 {
        match options.handle_nan {
            HandleAction::Error => {
                return Err(NormError::InvalidFactor(
                    "detected NaN size factor".to_string(),
                ));
            }
            HandleAction::Sanitize => {
                for s in factors.iter_mut() {
                    if s.is_nan() {
                        *s = F::one();
                    }
                }
            }
            HandleAction::Ignore => {}
        }
    }

    if status.num_infinite > 0 {
        match options.handle_infinite {
            HandleAction::Error => {
                return Err(NormError::InvalidFactor(
                    "detected infinite size factor".to_string(),
                ));
            }
            HandleAction::Sanitize => {
                let replacement = largest_valid_factor(factors);
                for s in factors.iter_mut() {
                    if s.is_infinite() {
                        *s = replacement;
                    }
                }
            }
            HandleAction::Ignore => {}
        }
    }

    Ok(())
}

/// Check an array for invalid size factors and sanitize it in one call.
///
/// Returns the diagnostics from the check so callers can see what was
/// replaced (or ignored).
pub fn check_and_sanitize<F: Float>(
    factors: &mut [F],
    options: &SanitizeOptions,
) -> Result<SizeFactorDiagnostics> {
    let status = check_factors(factors);
    sanitize_factors(factors, &status, options)?;
    Ok(status)
}
