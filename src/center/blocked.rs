//! Blocked mean computation and centering.

use super::{BlockMode, CenterOptions};
use crate::block::count_blocks;
use crate::sanitize::{is_invalid, SizeFactorDiagnostics};
use num_traits::Float;

/// Compute the mean size factor within each block.
///
/// `blocks` assigns each factor a block index in `[0, G)` where G is the
/// number of blocks (see [`count_blocks`]); both slices must have the same
/// length. The output has one entry per block: the mean over that block's
/// contributing factors, or exactly 0 for blocks with no contributing
/// factors (empty blocks, or blocks whose factors are all invalid under
/// [`CenterOptions::ignore_invalid`]). The zero is a sentinel meaning
/// "ignore this block", not a legitimate coverage estimate; the combining
/// strategies in [`center_factors_blocked`] treat it as such.
pub fn blocked_factor_means<F: Float>(
    factors: &[F],
    blocks: &[usize],
    diagnostics: Option<&mut SizeFactorDiagnostics>,
    options: &CenterOptions,
) -> Vec<F> {
    debug_assert_eq!(factors.len(), blocks.len());

    let ngroups = count_blocks(blocks);
    let mut group_sum = vec![F::zero(); ngroups];
    let mut group_num = vec![0usize; ngroups];

    if options.ignore_invalid {
        let mut local = SizeFactorDiagnostics::default();
        let diag = diagnostics.unwrap_or(&mut local);
        for (&val, &b) in factors.iter().zip(blocks) {
            if !is_invalid(val, diag) {
                group_sum[b] = group_sum[b] + val;
                group_num[b] += 1;
            }
        }
    } else {
        for (&val, &b) in factors.iter().zip(blocks) {
            group_sum[b] = group_sum[b] + val;
            group_num[b] += 1;
        }
    }

    group_sum
        .into_iter()
        .zip(group_num)
        .map(|(sum, num)| {
            if num > 0 {
                sum / F::from(num).unwrap()
            } else {
                F::zero()
            }
        })
        .collect()
}

/// Center size factors in place across multiple blocks.
///
/// Computes the per-block means via [`blocked_factor_means`] and then
/// rescales the factors according to [`CenterOptions::block_mode`]:
///
/// - [`BlockMode::PerBlock`]: each factor is divided by its own block's
///   mean, skipping blocks whose mean is the zero sentinel.
/// - [`BlockMode::Lowest`]: every factor is divided by the minimum
///   strictly-positive block mean. Zero-sentinel blocks are excluded from
///   the scan; if no block has a positive mean, the array is left
///   untouched.
///
/// Returns the per-block mean vector regardless of mode.
pub fn center_factors_blocked<F: Float>(
    factors: &mut [F],
    blocks: &[usize],
    diagnostics: Option<&mut SizeFactorDiagnostics>,
    options: &CenterOptions,
) -> Vec<F> {
    let group_means = blocked_factor_means(factors, blocks, diagnostics, options);

    match options.block_mode {
        BlockMode::PerBlock => {
            for (val, &b) in factors.iter_mut().zip(blocks) {
                let div = group_means[b];
                if div != F::zero() {
                    *val = *val / div;
                }
            }
        }
        BlockMode::Lowest => {
            let mut min: Option<F> = None;
            for &m in &group_means {
                if m > F::zero() && min.map_or(true, |cur| m < cur) {
                    min = Some(m);
                }
            }
            if let Some(div) = min {
                for val in factors.iter_mut() {
                    *val = *val / div;
                }
            }
        }
    }

    group_means
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_blocked_lowest() {
        let sf = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let blocks = vec![0, 0, 0, 1, 1, 1];

        let opt = CenterOptions::default();
        let mut diag = SizeFactorDiagnostics::default();
        let mut sf1 = sf.clone();
        let out = center_factors_blocked(&mut sf1, &blocks, Some(&mut diag), &opt);

        assert!(!diag.any_invalid());
        assert_eq!(out, vec![2.0, 5.0]);
        // Everything is divided by the lowest block mean (2).
        assert_eq!(sf1, vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn test_blocked_per_block() {
        let sf = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let blocks = vec![0, 0, 0, 1, 1, 1];

        let opt = CenterOptions {
            block_mode: BlockMode::PerBlock,
            ..Default::default()
        };
        let mut sf2 = sf;
        let out = center_factors_blocked(&mut sf2, &blocks, None, &opt);
        assert_eq!(out, vec![2.0, 5.0]);
        assert_eq!(sf2, vec![0.5, 1.0, 1.5, 0.8, 1.0, 1.2]);

        // Each block now has a mean of exactly 1.
        for g in 0..2 {
            let members: Vec<f64> = sf2
                .iter()
                .zip(&blocks)
                .filter(|(_, &b)| b == g)
                .map(|(&v, _)| v)
                .collect();
            let mean: f64 = members.iter().sum::<f64>() / members.len() as f64;
            assert_relative_eq!(mean, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_lowest_never_upscales_other_blocks() {
        let sf = vec![1.0, 1.0, 2.0, 2.0, 10.0, 10.0];
        let blocks = vec![0, 0, 0, 1, 1, 1];

        let mut sf1 = sf;
        let out = center_factors_blocked(&mut sf1, &blocks, None, &CenterOptions::default());
        assert_relative_eq!(out[0], 4.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(out[1], 22.0 / 3.0, epsilon = 1e-10);

        // Recomputed block means after centering: lowest is 1, others >= 1.
        let mean0: f64 = sf1[..3].iter().sum::<f64>() / 3.0;
        let mean1: f64 = sf1[3..].iter().sum::<f64>() / 3.0;
        assert_relative_eq!(mean0, 1.0, epsilon = 1e-10);
        assert_relative_eq!(mean1, 5.5, epsilon = 1e-10);
        assert!(mean1 >= 1.0);
    }

    #[test]
    fn test_single_block_matches_unblocked() {
        let sf = vec![0.5, 1.5, 2.5, 3.5];
        let blocks = vec![0, 0, 0, 0];

        for mode in [BlockMode::PerBlock, BlockMode::Lowest] {
            let opt = CenterOptions {
                block_mode: mode,
                ..Default::default()
            };
            let mut blocked = sf.clone();
            let out = center_factors_blocked(&mut blocked, &blocks, None, &opt);

            let mut unblocked = sf.clone();
            let mean = crate::center::center_factors(&mut unblocked, None, &opt);
            assert_eq!(out, vec![mean]);
            assert_eq!(blocked, unblocked);
        }
    }

    #[test]
    fn test_blocked_ignores_zeros() {
        let sf = vec![0.0, 0.5, 1.5, 3.0, 4.0, 5.0];
        let blocks = vec![0, 0, 0, 1, 1, 1];

        let opt = CenterOptions::default();
        let mut sf1 = sf.clone();
        let mut diag = SizeFactorDiagnostics::default();
        let out = center_factors_blocked(&mut sf1, &blocks, Some(&mut diag), &opt);
        assert_eq!(diag.num_zero, 1);
        assert_eq!(out, vec![1.0, 4.0]);
        // Lowest mean is already 1, so the division is a no-op.
        assert_eq!(sf1, sf);

        // Same means under the per-block mode.
        let opt = CenterOptions {
            block_mode: BlockMode::PerBlock,
            ..Default::default()
        };
        let mut sf2 = sf.clone();
        let out = center_factors_blocked(&mut sf2, &blocks, None, &opt);
        assert_eq!(out, vec![1.0, 4.0]);
        assert_eq!(sf2, vec![0.0, 0.5, 1.5, 0.75, 1.0, 1.25]);

        // The zero is ignored as if it was never there.
        let mut sf3 = sf.clone();
        let out3 = center_factors_blocked(&mut sf3[1..], &blocks[1..], None, &opt);
        assert_eq!(out, out3);
        assert_eq!(sf2, sf3);

        // Unless we force it to be acknowledged.
        let opt = CenterOptions {
            ignore_invalid: false,
            ..Default::default()
        };
        let mut sf4 = sf;
        let out4 = center_factors_blocked(&mut sf4, &blocks, None, &opt);
        assert_relative_eq!(out4[0], 2.0 / 3.0, epsilon = 1e-10);
        assert_eq!(out4[1], 4.0);
    }

    #[test]
    fn test_all_zero_blocks() {
        let blocks = vec![0, 0, 0, 1, 1, 1];

        for mode in [BlockMode::Lowest, BlockMode::PerBlock] {
            let opt = CenterOptions {
                block_mode: mode,
                ..Default::default()
            };
            let mut empty = vec![0.0; 6];
            let out = center_factors_blocked(&mut empty, &blocks, None, &opt);
            assert_eq!(out, vec![0.0, 0.0]);
            assert_eq!(empty, vec![0.0; 6]);
        }
    }

    #[test]
    fn test_empty_block_not_selected_as_lowest() {
        // Block 1 has no members at all; its sentinel mean of 0 must not
        // win the minimum scan or trigger a division by zero.
        let sf = vec![4.0, 4.0, 8.0, 8.0];
        let blocks = vec![0, 0, 2, 2];

        let mut sf1 = sf;
        let out = center_factors_blocked(&mut sf1, &blocks, None, &CenterOptions::default());
        assert_eq!(out, vec![4.0, 0.0, 8.0]);
        assert_eq!(sf1, vec![1.0, 1.0, 2.0, 2.0]);

        // Per-block mode skips the empty block's division too.
        let opt = CenterOptions {
            block_mode: BlockMode::PerBlock,
            ..Default::default()
        };
        let mut sf2 = vec![4.0, 4.0, 8.0, 8.0];
        let out2 = center_factors_blocked(&mut sf2, &blocks, None, &opt);
        assert_eq!(out2, vec![4.0, 0.0, 8.0]);
        assert!(sf2.iter().all(|v| v.is_finite()));
    }
}
