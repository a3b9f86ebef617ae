//! Block label utilities.

/// Number of blocks implied by a label array.
///
/// Labels are indices into `[0, G)`, so the cardinality is one past the
/// largest label. Labels need not be dense; unused indices simply yield
/// empty blocks. An empty label array has zero blocks.
pub fn count_blocks(blocks: &[usize]) -> usize {
    blocks.iter().max().map_or(0, |&m| m + 1)
}
