//! The fork: an ordered candidate branch rooted just above a point in the
//! confirmed chain.
//!
//! Assembly proceeds tip to root: the caller prepends the incoming tip
//! first, then each earlier pooled block, stopping when a prepend fails
//! (the chain reached the confirmed store). After `set_height` anchors the
//! branch the fork answers contextual queries for the validator against the
//! hypothetical post-reorganization chain.
//!
//! Not thread safe while being assembled; single-writer until anchored,
//! read-only afterwards.

use std::collections::VecDeque;
use std::sync::Arc;

use chain_types::{Block, Hash, OutPoint, Transaction, NULL_HASH, U256};

/// An ordered candidate branch of blocks.
#[derive(Debug, Default)]
pub struct Fork {
    /// Height of the fork point (the confirmed parent of the first block).
    height: u64,
    /// The branch, root first, tip last.
    blocks: VecDeque<Arc<Block>>,
}

impl Fork {
    /// An empty fork. Storage is reserved for the common single-block case.
    pub fn new() -> Self {
        Self {
            height: 0,
            blocks: VecDeque::with_capacity(1),
        }
    }

    /// Record the height of the fork point. Must be called after assembly
    /// and before any height projection.
    pub fn set_height(&mut self, height: u64) {
        self.height = height;
    }

    /// Prepend a block, true if it chains to the current root (or the fork
    /// is empty). This is the sole mutator, so every populated fork is a
    /// correctly linked chain.
    pub fn push_front(&mut self, block: Arc<Block>) -> bool {
        let linked = match self.blocks.front() {
            None => true,
            Some(front) => front.header.previous_block_hash == block.hash(),
        };

        if linked {
            self.blocks.push_front(block);
        }

        linked
    }

    /// The top (tip) block of the fork, if any.
    pub fn top(&self) -> Option<&Arc<Block>> {
        self.blocks.back()
    }

    /// The absolute height of the tip; zero when empty.
    pub fn top_height(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.height + self.len() as u64
        }
    }

    /// The branch blocks, root first.
    pub fn blocks(&self) -> impl ExactSizeIterator<Item = &Arc<Block>> {
        self.blocks.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// The height of the fork point.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// The hash of the fork point: the root block's parent hash, or the
    /// null hash when empty.
    pub fn hash(&self) -> Hash {
        match self.blocks.front() {
            Some(front) => front.header.previous_block_hash,
            None => NULL_HASH,
        }
    }

    /// The fork index of the block at the given absolute height. The caller
    /// guarantees the height is above the fork point.
    pub fn index_of(&self, height: u64) -> usize {
        debug_assert!(height > self.height);
        (height - self.height - 1) as usize
    }

    /// The absolute height of the block at the given fork index. The index
    /// is unguarded; the caller must verify.
    pub fn height_at(&self, index: usize) -> u64 {
        self.height + index as u64 + 1
    }

    /// The block at the given fork index, if it exists.
    pub fn block_at(&self, index: usize) -> Option<&Arc<Block>> {
        self.blocks.get(index)
    }

    /// The accumulated work of the branch.
    ///
    /// The work test against the confirmed segment is both a consensus
    /// check and denial-of-service protection: claimed work must exceed the
    /// competing segment before any expensive validation of the claim, and
    /// the claim itself is later proven block by block in the accept phase.
    pub fn difficulty(&self) -> U256 {
        self.blocks
            .iter()
            .fold(U256::zero(), |total, block| total + block.work())
    }

    /// The difficulty bits at the given absolute height, if the height is
    /// within the fork.
    pub fn bits_at(&self, height: u64) -> Option<u32> {
        self.contextual(height).map(|block| block.header.bits)
    }

    /// The version at the given absolute height, if within the fork.
    pub fn version_at(&self, height: u64) -> Option<u32> {
        self.contextual(height).map(|block| block.header.version)
    }

    /// The timestamp at the given absolute height, if within the fork.
    pub fn timestamp_at(&self, height: u64) -> Option<u32> {
        self.contextual(height).map(|block| block.header.timestamp)
    }

    /// The block hash at the given absolute height, if within the fork.
    pub fn block_hash_at(&self, height: u64) -> Option<Hash> {
        self.contextual(height).map(|block| block.hash())
    }

    fn contextual(&self, height: u64) -> Option<&Arc<Block>> {
        if height <= self.height {
            return None;
        }

        self.block_at(self.index_of(height))
    }

    /// Flag the transaction as a duplicate if the branch contains two or
    /// more transactions with its hash. One occurrence is the transaction
    /// itself, already inside some block of the branch; a second is a hash
    /// collision within the candidate chain.
    pub fn populate_tx(&self, tx: &Transaction) {
        let target = tx.hash();

        // Counting all is easier than excluding self and terminating early.
        let count: usize = self
            .blocks
            .iter()
            .map(|block| {
                block
                    .transactions
                    .iter()
                    .filter(|block_tx| block_tx.hash() == target)
                    .count()
            })
            .sum();

        debug_assert!(count > 0);
        tx.metadata.set_duplicate(count > 1);
    }

    /// Flag the outpoint as spent if the branch contains two or more inputs
    /// referencing it. Same self-exclusion rationale as `populate_tx`: the
    /// second reference is a double spend within the candidate chain.
    pub fn populate_spent(&self, outpoint: &OutPoint) {
        // Counting all is easier than excluding self and terminating early.
        let spends: usize = self
            .blocks
            .iter()
            .map(|block| {
                block
                    .transactions
                    .iter()
                    .flat_map(|tx| tx.inputs.iter())
                    .filter(|input| input.previous_output == *outpoint)
                    .count()
            })
            .sum();

        debug_assert!(spends > 0);
        outpoint.metadata.set_spent(spends > 1);
    }

    /// Locate the outpoint's previous output within the branch and cache it
    /// on the outpoint, with the containing block's height iff the output
    /// belongs to a coinbase.
    ///
    /// The search runs tip toward root so that the most recent redefinition
    /// of a colliding transaction hash wins. A null outpoint (coinbase
    /// input) only resets the cache.
    pub fn populate_prevout(&self, outpoint: &OutPoint) {
        // Invalid cache, unspecified height: the state when nothing is
        // found, and the complete answer for a coinbase input.
        outpoint.metadata.reset();

        if outpoint.is_null() {
            return;
        }

        // We continue even if the prevout is spent or missing elsewhere.
        for index in (0..self.len()).rev() {
            let block = &self.blocks[index];

            for (position, tx) in block.transactions.iter().enumerate() {
                if outpoint.tx_hash == tx.hash() && (outpoint.index as usize) < tx.outputs.len() {
                    outpoint
                        .metadata
                        .set_cache(tx.outputs[outpoint.index as usize].clone());

                    // Height is recorded iff the prevout is coinbase; spend
                    // maturity depends on it.
                    if position == 0 {
                        outpoint.metadata.set_coinbase_height(self.height_at(index));
                    }

                    return;
                }
            }
        }
    }
}
