use std::collections::HashMap;

use crate::models::{BlockKeyFn, CandidatePair, Listing};

/// Default block key: first character of the normalized title.
///
/// Records with an empty title map to `None`, the unkeyed bucket; they are
/// still compared against each other rather than silently dropped.
pub fn title_initial(title: &str) -> Option<char> {
    title.chars().next()
}

/// One bucket of records sharing a block key.
#[derive(Debug, Clone)]
pub struct Block {
    pub key: Option<char>,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// Partition of both record collections under a shared block key.
///
/// Candidate pairs are the per-bucket cross product, which bounds the
/// comparison count at the price of making matches whose titles start with
/// different normalized characters unreachable. Pure partitioning; the input
/// collections are never touched.
#[derive(Debug, Clone, Default)]
pub struct BlockingIndex {
    blocks: Vec<Block>,
}

impl BlockingIndex {
    /// Partition `left` and `right` under `key_fn`.
    ///
    /// Blocks are ordered by key so that downstream iteration order, and
    /// with it the whole pipeline, is deterministic.
    pub fn build(left: &[Listing], right: &[Listing], key_fn: BlockKeyFn) -> Self {
        let mut buckets: HashMap<Option<char>, (Vec<usize>, Vec<usize>)> = HashMap::new();

        for (index, listing) in left.iter().enumerate() {
            let key = key_fn(&listing.title_normalized);
            buckets.entry(key).or_default().0.push(index);
        }
        for (index, listing) in right.iter().enumerate() {
            let key = key_fn(&listing.title_normalized);
            buckets.entry(key).or_default().1.push(index);
        }

        let mut blocks: Vec<Block> = buckets
            .into_iter()
            .map(|(key, (left, right))| Block { key, left, right })
            .collect();
        blocks.sort_by_key(|block| block.key);

        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Cross product of every bucket's two subsets.
    pub fn candidate_pairs(&self) -> Vec<CandidatePair> {
        let mut pairs = Vec::with_capacity(self.pair_count());
        for block in &self.blocks {
            for &left in &block.left {
                for &right in &block.right {
                    pairs.push(CandidatePair { left, right });
                }
            }
        }
        pairs
    }

    /// Number of candidate pairs the index will yield.
    pub fn pair_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.left.len() * block.right.len())
            .sum()
    }
}
