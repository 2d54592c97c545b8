//! In-memory confirmed chain.
//!
//! An ordered block list indexed by hash. The reorganize swap is atomic
//! under the internal lock; flushing is simulated by a counter so tests can
//! observe the per-reorganization flush policy.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chain_types::{Block, Hash, U256};
use parking_lot::RwLock;

use crate::domain::{ChainError, Fork};
use crate::ports::ConfirmedChain;

/// In-memory `ConfirmedChain` adapter.
pub struct MemoryChain {
    inner: RwLock<ChainStore>,
}

struct ChainStore {
    /// Confirmed blocks; the vector index is the block height.
    blocks: Vec<Arc<Block>>,
    /// Hash to height index.
    heights: HashMap<Hash, u64>,
    /// Coarse writer-intent flush lock.
    write_locked: bool,
    /// Completed flush count (observable in tests).
    flushes: u64,
}

impl MemoryChain {
    /// A chain consisting of the given genesis block.
    pub fn new(genesis: Arc<Block>) -> Self {
        genesis.metadata.set_height(0);
        let mut heights = HashMap::new();
        heights.insert(genesis.hash(), 0);

        Self {
            inner: RwLock::new(ChainStore {
                blocks: vec![genesis],
                heights,
                write_locked: false,
                flushes: 0,
            }),
        }
    }

    /// Append a block that links to the current tip. Used to stage chains;
    /// returns false (and changes nothing) when the block does not link.
    pub fn extend(&self, block: Arc<Block>) -> bool {
        let mut store = self.inner.write();

        let tip_hash = match store.blocks.last() {
            Some(tip) => tip.hash(),
            None => return false,
        };

        if block.header.previous_block_hash != tip_hash {
            return false;
        }

        let height = store.blocks.len() as u64;
        block.metadata.set_height(height);
        store.heights.insert(block.hash(), height);
        store.blocks.push(block);
        true
    }

    /// The height of the confirmed tip.
    pub fn top_height(&self) -> u64 {
        let store = self.inner.read();
        (store.blocks.len() as u64).saturating_sub(1)
    }

    /// The hash of the confirmed tip.
    pub fn top_hash(&self) -> Hash {
        let store = self.inner.read();
        store.blocks.last().map(|block| block.hash()).unwrap_or_default()
    }

    /// The confirmed block at the given height, if any.
    pub fn block_at(&self, height: u64) -> Option<Arc<Block>> {
        self.inner.read().blocks.get(height as usize).cloned()
    }

    /// All confirmed block hashes, ascending height order. Test hook for
    /// byte-identical chain comparisons.
    pub fn hashes(&self) -> Vec<Hash> {
        self.inner
            .read()
            .blocks
            .iter()
            .map(|block| block.hash())
            .collect()
    }

    /// Number of completed flushes.
    pub fn flush_count(&self) -> u64 {
        self.inner.read().flushes
    }

    /// Whether the coarse flush lock is held.
    pub fn is_write_locked(&self) -> bool {
        self.inner.read().write_locked
    }
}

#[async_trait]
impl ConfirmedChain for MemoryChain {
    fn block_exists(&self, hash: &Hash) -> bool {
        self.inner.read().heights.contains_key(hash)
    }

    fn block_height(&self, hash: &Hash) -> Option<u64> {
        self.inner.read().heights.get(hash).copied()
    }

    fn fork_work(&self, maximum: U256, from_height: u64) -> Result<U256, ChainError> {
        let store = self.inner.read();
        let mut total = U256::zero();

        for block in store.blocks.iter().skip(from_height as usize) {
            total = total + block.work();

            // The caller only needs to know whether `maximum` can win.
            if total > maximum {
                break;
            }
        }

        Ok(total)
    }

    async fn reorganize(&self, fork: &Fork, flush: bool) -> Result<Vec<Arc<Block>>, ChainError> {
        let mut store = self.inner.write();

        let fork_height = fork.height();
        let anchor = store
            .blocks
            .get(fork_height as usize)
            .ok_or_else(|| ChainError::Write(format!("fork point {fork_height} beyond tip")))?;

        if anchor.hash() != fork.hash() {
            return Err(ChainError::Write(format!(
                "fork parent mismatch at height {fork_height}"
            )));
        }

        // Pop the displaced suffix, ascending order preserved.
        let outgoing: Vec<Arc<Block>> = store.blocks.split_off(fork_height as usize + 1);
        for block in &outgoing {
            store.heights.remove(&block.hash());
        }

        // Push the fork's blocks in order.
        for block in fork.blocks() {
            let height = store.blocks.len() as u64;
            block.metadata.set_height(height);
            store.heights.insert(block.hash(), height);
            store.blocks.push(block.clone());
        }

        if flush {
            store.flushes += 1;
        }

        Ok(outgoing)
    }

    fn begin_writes(&self) -> Result<(), ChainError> {
        let mut store = self.inner.write();

        if store.write_locked {
            return Err(ChainError::FlushLock("flush lock already held".into()));
        }

        store.write_locked = true;
        Ok(())
    }

    fn end_writes(&self) -> Result<(), ChainError> {
        let mut store = self.inner.write();

        if !store.write_locked {
            return Err(ChainError::FlushLock("flush lock not held".into()));
        }

        store.write_locked = false;
        store.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::BlockHeader;

    fn block(parent: Hash, bits: u32) -> Arc<Block> {
        Arc::new(Block::new(
            BlockHeader {
                version: 1,
                previous_block_hash: parent,
                merkle_root: [0; 32],
                timestamp: 1000 + bits,
                bits,
                nonce: 0,
            },
            vec![],
        ))
    }

    fn staged_chain() -> (MemoryChain, Vec<Arc<Block>>) {
        let genesis = block([0; 32], 0x207fffff);
        let chain = MemoryChain::new(genesis.clone());

        let mut blocks = vec![genesis];
        for i in 0..3 {
            let next = block(blocks.last().unwrap().hash(), 0x207ffff0 + i);
            assert!(chain.extend(next.clone()));
            blocks.push(next);
        }

        (chain, blocks)
    }

    #[test]
    fn test_extend_requires_linkage() {
        let (chain, _) = staged_chain();
        assert!(!chain.extend(block([0xFF; 32], 1)));
        assert_eq!(chain.top_height(), 3);
    }

    #[test]
    fn test_height_and_existence_queries() {
        let (chain, blocks) = staged_chain();

        assert!(chain.block_exists(&blocks[2].hash()));
        assert_eq!(chain.block_height(&blocks[2].hash()), Some(2));
        assert_eq!(chain.block_height(&[0xFF; 32]), None);
    }

    #[test]
    fn test_fork_work_stops_at_maximum() {
        let (chain, blocks) = staged_chain();

        // Unbounded: the sum of the three non-genesis blocks.
        let full = chain.fork_work(U256::MAX, 1).unwrap();
        let expected = blocks[1].work() + blocks[2].work() + blocks[3].work();
        assert_eq!(full, expected);

        // A tiny bound stops the summation early but still exceeds it.
        let capped = chain.fork_work(U256::one(), 1).unwrap();
        assert!(capped > U256::one());
        assert!(capped <= expected);
    }

    #[tokio::test]
    async fn test_reorganize_swaps_suffix() {
        let (chain, blocks) = staged_chain();

        // Fork off block 1 with two replacement blocks.
        let r2 = block(blocks[1].hash(), 0x2000ffff);
        let r3 = block(r2.hash(), 0x2000fff0);

        let mut fork = Fork::new();
        fork.push_front(r3.clone());
        fork.push_front(r2.clone());
        fork.set_height(1);

        let outgoing = chain.reorganize(&fork, true).await.unwrap();
        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[0].hash(), blocks[2].hash());
        assert_eq!(outgoing[1].hash(), blocks[3].hash());

        assert_eq!(chain.top_hash(), r3.hash());
        assert_eq!(chain.block_height(&r2.hash()), Some(2));
        assert!(!chain.block_exists(&blocks[3].hash()));
        assert_eq!(chain.flush_count(), 1);
        assert_eq!(r3.metadata.height(), Some(3));
    }

    #[tokio::test]
    async fn test_reorganize_rejects_unanchored_fork() {
        let (chain, _) = staged_chain();

        let mut fork = Fork::new();
        fork.push_front(block([0xEE; 32], 1));
        fork.set_height(1);

        assert!(chain.reorganize(&fork, false).await.is_err());
        assert_eq!(chain.top_height(), 3);
    }

    #[test]
    fn test_flush_lock_toggles_in_order() {
        let (chain, _) = staged_chain();

        assert!(chain.end_writes().is_err());
        assert!(chain.begin_writes().is_ok());
        assert!(chain.is_write_locked());
        assert!(chain.begin_writes().is_err());
        assert!(chain.end_writes().is_ok());
        assert!(!chain.is_write_locked());
    }
}
