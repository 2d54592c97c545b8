//! Driven ports (outbound dependencies).
//!
//! These are the interfaces the organizer requires the host to implement:
//! the persistent confirmed chain, the orphan pool and the validator
//! pipeline. In-memory implementations of the first two live in
//! `crate::adapters`; validator rules are entirely the host's concern.

use std::sync::Arc;

use async_trait::async_trait;
use chain_types::{Block, Hash, U256};

use crate::domain::{ChainError, Fork, ValidationError};

/// The confirmed, persistent chain store.
///
/// Mutated only through `reorganize`, and only while the organizer holds
/// its submission lock.
#[async_trait]
pub trait ConfirmedChain: Send + Sync {
    /// Whether a block with this hash is confirmed anywhere in the chain.
    fn block_exists(&self, hash: &Hash) -> bool;

    /// The confirmed height of the block, if known.
    fn block_height(&self, hash: &Hash) -> Option<u64>;

    /// Sum of per-block work of confirmed blocks at heights at or above
    /// `from_height`.
    ///
    /// The summation may stop early once it exceeds `maximum`: the caller
    /// only needs to know whether a candidate with `maximum` total work can
    /// win, so fully scoring a long chain segment is wasted effort.
    fn fork_work(&self, maximum: U256, from_height: u64) -> Result<U256, ChainError>;

    /// Atomically replace the confirmed suffix above the fork point with
    /// the fork's blocks.
    ///
    /// Pops confirmed blocks from `fork.height() + 1` upward, pushes the
    /// fork's blocks in order, then flushes iff `flush`. Returns the
    /// displaced blocks in ascending height order. On return the confirmed
    /// tip is the fork's top.
    async fn reorganize(&self, fork: &Fork, flush: bool) -> Result<Vec<Arc<Block>>, ChainError>;

    /// Take the coarse writer-intent flush lock.
    fn begin_writes(&self) -> Result<(), ChainError>;

    /// Release the coarse writer-intent flush lock.
    fn end_writes(&self) -> Result<(), ChainError>;
}

/// The orphan block pool.
///
/// Caches valid blocks that lack sufficient work or a confirmed parent.
/// Implementations must be internally synchronized; the organizer and the
/// network feed it concurrently.
pub trait BlockPool: Send + Sync {
    /// Assemble the longest pooled chain culminating in `block` whose
    /// parent is expected in the confirmed chain. Empty when the block is
    /// already pooled.
    fn get_path(&self, block: Arc<Block>) -> Fork;

    /// Add a newly validated block (insufficient work to reorganize).
    fn add(&self, block: Arc<Block>);

    /// Add a root path of displaced blocks (no branches).
    fn add_all(&self, blocks: &[Arc<Block>]);

    /// Remove a path of blocks accepted into the confirmed chain.
    fn remove(&self, blocks: &[Arc<Block>]);

    /// Evict entries that can no longer reach the chain given the new top.
    fn prune(&self, top_height: u64);
}

/// The three-phase validator pipeline.
///
/// The organizer sequences the phases; the consensus rules they enforce are
/// not its concern. Accept and connect consult the fork's contextual
/// queries and populate routines against the candidate branch.
#[async_trait]
pub trait BlockValidator: Send + Sync {
    /// Context-free structural checks. Synchronous and stateless.
    fn check(&self, block: &Block) -> Result<(), ValidationError>;

    /// Contextual checks of the branch tip against the hypothetical
    /// post-reorganization chain.
    async fn accept(&self, fork: &Fork) -> Result<(), ValidationError>;

    /// Script validation of the branch tip's inputs.
    async fn connect(&self, fork: &Fork) -> Result<(), ValidationError>;

    /// Cancel outstanding validation work.
    fn stop(&self);
}
