//! Size factor centering and scaling normalization for count data.
//!
//! This library provides the size-factor plumbing used in count
//! normalization pipelines (single-cell expression, microbiome abundance):
//! rescaling per-sample size factors so that their mean is 1, handling
//! invalid factors, and applying the scaled factors to a count matrix.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **center**: Centering of size factors, unblocked or per block
//! - **sanitize**: Detection and replacement of invalid size factors
//! - **block**: Block label utilities
//! - **normalize**: Scaling and log-transformation of count matrices
//! - **pseudo**: Data-driven pseudo-count selection
//!
//! # Example
//!
//! ```
//! use factor_norm::prelude::*;
//!
//! let mut factors = vec![0.5, 1.0, 2.0, 4.5];
//! let mut diag = SizeFactorDiagnostics::default();
//!
//! // Center so the mean factor is 1, tracking invalid values.
//! let mean = center_factors(&mut factors, Some(&mut diag), &CenterOptions::default());
//! assert!(mean > 0.0);
//!
//! // Replace any invalid factors before normalizing counts.
//! sanitize_factors(&mut factors, &diag, &SanitizeOptions::sanitize_all()).unwrap();
//! ```
//!
//! For multi-batch datasets, [`center::center_factors_blocked`] centers
//! with respect to a block structure, either normalizing each block
//! independently or downscaling everything to the lowest-coverage block.

pub mod block;
pub mod center;
pub mod error;
pub mod normalize;
pub mod pseudo;
pub mod sanitize;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::block::count_blocks;
    pub use crate::center::{
        blocked_factor_means, center_factors, center_factors_blocked, factor_mean, BlockMode,
        CenterOptions,
    };
    pub use crate::error::{NormError, Result};
    pub use crate::normalize::{log_normalize, log_normalize_sparse, NormalizeOptions};
    pub use crate::pseudo::{choose_pseudo_count, find_quantile, PseudoCountOptions};
    pub use crate::sanitize::{
        check_and_sanitize, check_factors, sanitize_factors, HandleAction, SanitizeOptions,
        SizeFactorDiagnostics,
    };
}
