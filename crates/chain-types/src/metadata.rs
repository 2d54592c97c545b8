//! # Validation Side-Cells
//!
//! Entities are shared immutably between the pool, the fork, the validator
//! and the store. The pipeline still needs to attach per-entity validation
//! state as a block advances; these cells hold that state behind interior
//! mutability. The pipeline's sequential discipline guarantees a single
//! writer per stage, so plain locks suffice.
//!
//! Cells are excluded from serialization and equality, and cloning an entity
//! snapshots the cell into a fresh lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::RwLock;

use crate::entities::Output;

/// Validation state attached to a block.
#[derive(Debug, Default)]
pub struct BlockMetadata {
    inner: RwLock<BlockState>,
}

#[derive(Clone, Debug, Default)]
struct BlockState {
    height: Option<u64>,
    validated: bool,
    notify_started: Option<Instant>,
}

impl BlockMetadata {
    /// Record the block's absolute chain height once known.
    pub fn set_height(&self, height: u64) {
        self.inner.write().height = Some(height);
    }

    pub fn height(&self) -> Option<u64> {
        self.inner.read().height
    }

    /// Mark the block as fully validated.
    pub fn mark_validated(&self) {
        self.inner.write().validated = true;
    }

    pub fn is_validated(&self) -> bool {
        self.inner.read().validated
    }

    /// Timestamp the start of subscriber notification.
    pub fn mark_notify_started(&self) {
        self.inner.write().notify_started = Some(Instant::now());
    }

    pub fn notify_started(&self) -> Option<Instant> {
        self.inner.read().notify_started
    }

    pub(crate) fn snapshot_clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

/// Validation state attached to a transaction.
#[derive(Debug, Default)]
pub struct TransactionMetadata {
    duplicate: AtomicBool,
}

impl TransactionMetadata {
    /// Flag the transaction as duplicating another hash in the candidate
    /// context.
    pub fn set_duplicate(&self, duplicate: bool) {
        self.duplicate.store(duplicate, Ordering::Release);
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate.load(Ordering::Acquire)
    }

    pub(crate) fn snapshot_clone(&self) -> Self {
        Self {
            duplicate: AtomicBool::new(self.is_duplicate()),
        }
    }
}

/// Prevout validation state attached to an outpoint.
///
/// Populated by the fork (candidate-branch context) or by the store
/// (confirmed context) before script validation runs.
#[derive(Debug)]
pub struct PrevoutMetadata {
    inner: RwLock<PrevoutState>,
}

#[derive(Clone, Debug)]
struct PrevoutState {
    cache: Output,
    height: Option<u64>,
    spent: bool,
    confirmed: bool,
}

impl Default for PrevoutMetadata {
    fn default() -> Self {
        Self {
            inner: RwLock::new(PrevoutState {
                cache: Output::not_found(),
                height: None,
                spent: false,
                confirmed: false,
            }),
        }
    }
}

impl PrevoutMetadata {
    /// Reset to the unpopulated state: not-found cache, unspecified height,
    /// unspent.
    pub fn reset(&self) {
        let mut state = self.inner.write();
        state.cache = Output::not_found();
        state.height = None;
        state.spent = false;
        state.confirmed = false;
    }

    /// Cache the located previous output.
    pub fn set_cache(&self, output: Output) {
        self.inner.write().cache = output;
    }

    pub fn cache(&self) -> Output {
        self.inner.read().cache.clone()
    }

    /// Record the height of the containing block. Set iff the located
    /// prevout is a coinbase output (maturity checks need it).
    pub fn set_coinbase_height(&self, height: u64) {
        self.inner.write().height = Some(height);
    }

    pub fn coinbase_height(&self) -> Option<u64> {
        self.inner.read().height
    }

    /// Record whether the outpoint is spent by a confirmed-context
    /// conflict. The confirmed flag follows the spent flag.
    pub fn set_spent(&self, spent: bool) {
        let mut state = self.inner.write();
        state.spent = spent;
        state.confirmed = spent;
    }

    pub fn is_spent(&self) -> bool {
        self.inner.read().spent
    }

    pub fn is_confirmed_spent(&self) -> bool {
        self.inner.read().confirmed
    }

    pub(crate) fn snapshot_clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}
