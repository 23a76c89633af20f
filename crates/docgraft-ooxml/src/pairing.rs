//! Body paragraph pairing

/// Decides which source paragraph formats which target paragraph
///
/// Pairs are `(source_index, target_index)`. Pairs outside either
/// document's paragraph range are skipped by the driver.
pub trait MatchStrategy: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &str;

    /// Pair paragraphs given both documents' paragraph counts
    fn pairs(&self, source_len: usize, target_len: usize) -> Vec<(usize, usize)>;
}

/// Index `i` of the source formats index `i` of the target
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalMatch;

impl MatchStrategy for PositionalMatch {
    fn name(&self) -> &str {
        "positional"
    }

    fn pairs(&self, source_len: usize, target_len: usize) -> Vec<(usize, usize)> {
        (0..source_len.min(target_len)).map(|i| (i, i)).collect()
    }
}
