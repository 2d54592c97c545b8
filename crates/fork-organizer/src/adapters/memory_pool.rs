//! In-memory orphan block pool.
//!
//! A hash-keyed set of valid blocks lacking only sufficient work or a
//! confirmed parent. There is no search within blocks here, just hashes;
//! the fork object carries all contextual queries for validation.

use std::collections::HashMap;
use std::sync::Arc;

use chain_types::{Block, Hash};
use parking_lot::RwLock;

use crate::domain::{BlockPoolConfig, Fork};
use crate::ports::BlockPool;

/// In-memory `BlockPool` adapter.
pub struct MemoryPool {
    config: BlockPoolConfig,
    blocks: RwLock<HashMap<Hash, Arc<Block>>>,
}

impl MemoryPool {
    pub fn new(config: BlockPoolConfig) -> Self {
        Self {
            config,
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of pooled blocks.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Whether a block with this hash is pooled.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.read().contains_key(hash)
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new(BlockPoolConfig::default())
    }
}

impl BlockPool for MemoryPool {
    fn get_path(&self, block: Arc<Block>) -> Fork {
        let blocks = self.blocks.read();
        let mut fork = Fork::new();

        // A block already pooled yields an empty path.
        if blocks.contains_key(&block.hash()) {
            return fork;
        }

        fork.push_front(block);

        // Walk parent links tip to root until the pool runs out; the next
        // parent is then expected in the confirmed chain.
        while let Some(parent) = blocks.get(&fork.hash()) {
            if !fork.push_front(parent.clone()) {
                break;
            }
        }

        fork
    }

    fn add(&self, block: Arc<Block>) {
        self.blocks.write().insert(block.hash(), block);
    }

    fn add_all(&self, blocks: &[Arc<Block>]) {
        let mut pooled = self.blocks.write();
        for block in blocks {
            pooled.insert(block.hash(), block.clone());
        }
    }

    fn remove(&self, blocks: &[Arc<Block>]) {
        let mut pooled = self.blocks.write();
        for block in blocks {
            pooled.remove(&block.hash());
        }
    }

    fn prune(&self, top_height: u64) {
        let cutoff = top_height.saturating_sub(self.config.maximum_depth);

        // Blocks with a known height anchored at or below the cutoff can
        // never again win a work comparison. Heights are only recorded for
        // blocks that were once confirmed; raw orphans are retained.
        self.blocks.write().retain(|_, block| {
            block
                .metadata
                .height()
                .map(|height| height > cutoff)
                .unwrap_or(true)
        });
    }
}
