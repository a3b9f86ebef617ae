//! Centering of size factors prior to scaling normalization.
//!
//! Centering scales a set of size factors so that their mean is equal to 1.
//! This keeps normalized expression values on roughly the same scale as the
//! original counts, which simplifies interpretation and gives any
//! pseudo-count added before log-transformation a predictable shrinkage
//! effect. In general, size factors should be centered before calling
//! [`crate::normalize::log_normalize`].
//!
//! For datasets with multiple blocks (e.g., batches or samples),
//! [`center_factors_blocked`] computes the center separately for each block;
//! the strategy for combining the per-block centers is selected by
//! [`CenterOptions::block_mode`].
//!
//! Invalid size factors (NaN, infinite, non-positive) are never modified
//! here. With [`CenterOptions::ignore_invalid`] they are excluded from the
//! mean calculations and tallied into a caller-supplied
//! [`SizeFactorDiagnostics`](crate::sanitize::SizeFactorDiagnostics); use
//! [`crate::sanitize::sanitize_factors`] afterwards to replace them.

mod blocked;
mod mean;

pub use blocked::{blocked_factor_means, center_factors_blocked};
pub use mean::{center_factors, factor_mean};

use serde::{Deserialize, Serialize};

/// Strategy for combining per-block centers in [`center_factors_blocked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockMode {
    /// Scale the size factors separately within each block, so that each
    /// block has a mean of 1. The result is identical to running
    /// [`center_factors`] on each block's subset on its own, which keeps
    /// the centering consistent with independent analyses of each block.
    /// Any systematic difference in coverage between blocks is erased.
    PerBlock,
    /// Divide all size factors by the minimum of the per-block means,
    /// downscaling every block to match the coverage of the
    /// lowest-coverage block. This preserves relative coverage differences
    /// between blocks and avoids egregious upscaling of low-coverage
    /// blocks; downscaling only shrinks log-fold changes towards zero at
    /// low expression, which is always safe.
    Lowest,
}

/// Options for the centering functions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CenterOptions {
    /// Strategy for handling blocks in [`center_factors_blocked`].
    pub block_mode: BlockMode,
    /// Whether to ignore invalid size factors when computing means.
    ///
    /// Invalid factors can occur in datasets that were not properly
    /// filtered to remove low-quality cells. Ignoring them keeps the mean
    /// well-defined, but does not remove them from the array; check the
    /// diagnostics output and call
    /// [`crate::sanitize::sanitize_factors`] after centering if needed.
    /// Callers that know their factors are all valid can set this to
    /// `false` to skip the classification pass.
    pub ignore_invalid: bool,
}

impl Default for CenterOptions {
    fn default() -> Self {
        Self {
            block_mode: BlockMode::Lowest,
            ignore_invalid: true,
        }
    }
}
