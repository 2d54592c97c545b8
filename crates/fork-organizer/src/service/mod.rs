//! Organizer service - the submission state machine.
//!
//! # Architecture
//!
//! Each submission runs as one linear awaited sequence that owns the
//! submission lock for its entire lifetime. Every stage either advances or
//! completes the submission with exactly one result; there is no recovery
//! at this layer. The confirmed store is only ever written under that lock,
//! and `stop` acquires the same lock, so no write can land after `stop`
//! returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chain_types::Block;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::domain::{OrganizeError, OrganizeResult, OrganizerConfig};
use crate::events::{ReorganizeEvent, ReorganizeHandler, ReorganizeSubscriber};
use crate::metrics;
use crate::ports::{BlockPool, BlockValidator, ConfirmedChain, OrganizeApi};

/// Dependencies for the organizer.
pub struct OrganizerDependencies<C, P, V> {
    pub chain: Arc<C>,
    pub pool: Arc<P>,
    pub validator: Arc<V>,
    pub config: OrganizerConfig,
}

/// The organizer: admits blocks, compares accumulated work and swaps the
/// active chain.
pub struct Organizer<C, P, V>
where
    C: ConfirmedChain,
    P: BlockPool,
    V: BlockValidator,
{
    chain: Arc<C>,
    pool: Arc<P>,
    validator: Arc<V>,
    config: OrganizerConfig,
    subscriber: ReorganizeSubscriber,
    /// Consulted at every suspension boundary.
    stopped: AtomicBool,
    /// Guards the chain against concurrent organizations.
    mutex: Mutex<()>,
}

impl<C, P, V> Organizer<C, P, V>
where
    C: ConfirmedChain,
    P: BlockPool,
    V: BlockValidator,
{
    /// Create a stopped organizer; call `start` before submitting.
    pub fn new(deps: OrganizerDependencies<C, P, V>) -> Self {
        Self {
            chain: deps.chain,
            pool: deps.pool,
            validator: deps.validator,
            config: deps.config,
            subscriber: ReorganizeSubscriber::new(),
            stopped: AtomicBool::new(true),
            mutex: Mutex::new(()),
        }
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The submission pipeline. The caller holds the submission lock.
    async fn organize_locked(&self, block: Arc<Block>) -> OrganizeResult<()> {
        if self.stopped() {
            return Err(OrganizeError::ServiceStopped);
        }

        // Checks that are independent of chain state.
        self.validator.check(&block)?;

        // The path through the pooled forest to the new block.
        let mut fork = self.pool.get_path(block.clone());

        // An empty path means the block is already pooled. The existence
        // probe spans the whole confirmed chain by default: on a hash
        // collision that is not on the candidate's path, nodes reject or
        // admit the block depending on arrival order, which can split the
        // chain. The corrected probe below tests only beyond the fork
        // point, once it is known.
        if fork.is_empty() {
            return Err(OrganizeError::DuplicateBlock(block.hash()));
        }

        if !self.config.duplicate_check_from_fork_point && self.chain.block_exists(&block.hash()) {
            return Err(OrganizeError::DuplicateBlock(block.hash()));
        }

        // Anchor the fork at the confirmed parent of its oldest block.
        let parent_height = self
            .chain
            .block_height(&fork.hash())
            .ok_or(OrganizeError::OrphanBlock(fork.hash()))?;

        // Guard against chain height overflow.
        parent_height
            .checked_add(fork.len() as u64)
            .ok_or_else(|| OrganizeError::OperationFailed("chain height overflow".into()))?;

        fork.set_height(parent_height);
        debug!(
            parent_height,
            blocks = fork.len(),
            "candidate fork anchored"
        );

        if self.config.duplicate_check_from_fork_point {
            if let Some(height) = self.chain.block_height(&block.hash()) {
                if height > parent_height {
                    return Err(OrganizeError::DuplicateBlock(block.hash()));
                }
            }
        }

        // Checks dependent on chain state and prevouts. The fork may still
        // lack the work to reorganize, but it must be known valid to be
        // worth retaining.
        let accepted = self.validator.accept(&fork).await;
        if self.stopped() {
            return Err(OrganizeError::ServiceStopped);
        }
        accepted?;

        // Checks that include script validation.
        let connected = self.validator.connect(&fork).await;
        if self.stopped() {
            return Err(OrganizeError::ServiceStopped);
        }
        connected?;

        // Score the competing confirmed segment, bounded by the fork's own
        // work: the query stops once the candidate cannot win.
        let claimed = fork.difficulty();
        let threshold = self
            .chain
            .fork_work(claimed, parent_height + 1)
            .map_err(|source| {
                error!(%source, "confirmed segment work query failed, store may be inconsistent");
                OrganizeError::OperationFailed(source.to_string())
            })?;

        if claimed <= threshold {
            // Valid but not competitive; retain the tip for a later branch.
            if let Some(top) = fork.top() {
                self.pool.add(top.clone());
            }
            return Err(OrganizeError::InsufficientWork);
        }

        // The top block is valid and the branch wins.
        if let Some(top) = fork.top() {
            top.metadata.set_height(fork.top_height());
            top.metadata.mark_validated();
            top.metadata.mark_notify_started();
        }

        // Replace! Switch!
        let outgoing = match self
            .chain
            .reorganize(&fork, self.config.flush_per_reorg)
            .await
        {
            Ok(outgoing) => outgoing,
            Err(source) => {
                error!(%source, "failure writing block to store, store is now corrupted");
                return Err(source.into());
            }
        };

        // The pool ends up holding exactly the displaced blocks: the
        // confirmed path leaves, orphans below the new top are evicted, the
        // displaced suffix enters.
        let incoming: Vec<Arc<Block>> = fork.blocks().cloned().collect();
        self.pool.remove(&incoming);
        self.pool.prune(fork.top_height());
        self.pool.add_all(&outgoing);

        info!(
            fork_height = parent_height,
            incoming = incoming.len(),
            outgoing = outgoing.len(),
            "chain reorganized"
        );
        metrics::record_reorg_depth(outgoing.len());

        self.subscriber.invoke(&ReorganizeEvent::Applied {
            fork_height: parent_height,
            incoming,
            outgoing,
        });

        Ok(())
    }
}

#[async_trait]
impl<C, P, V> OrganizeApi for Organizer<C, P, V>
where
    C: ConfirmedChain + 'static,
    P: BlockPool + 'static,
    V: BlockValidator + 'static,
{
    fn start(&self) -> OrganizeResult<()> {
        self.stopped.store(false, Ordering::SeqCst);
        self.subscriber.start();

        // The coarse flush lock substitutes for per-reorganization flushes.
        if !self.config.flush_per_reorg {
            self.chain.begin_writes()?;
        }

        info!("organizer started");
        Ok(())
    }

    async fn stop(&self) -> OrganizeResult<()> {
        self.validator.stop();
        self.subscriber.stop();

        // Block until any in-flight submission completes, then gate off the
        // next one before it can begin writing.
        let _guard = self.mutex.lock().await;
        self.stopped.store(true, Ordering::SeqCst);

        if !self.config.flush_per_reorg {
            self.chain.end_writes()?;
        }

        info!("organizer stopped");
        Ok(())
    }

    async fn organize(&self, block: Arc<Block>) -> OrganizeResult<()> {
        // One submission owns the lock from entry to completion.
        let _guard = self.mutex.lock().await;

        let started = Instant::now();
        let result = self.organize_locked(block).await;
        metrics::record_organize_latency(started.elapsed().as_secs_f64());

        match &result {
            Ok(()) => metrics::record_block_organized(),
            Err(rejection) => metrics::record_block_rejected(rejection_label(rejection)),
        }

        result
    }

    fn subscribe_reorganize(&self, handler: ReorganizeHandler) {
        self.subscriber.subscribe(handler);
    }
}

fn rejection_label(error: &OrganizeError) -> &'static str {
    match error {
        OrganizeError::ServiceStopped => "service_stopped",
        OrganizeError::DuplicateBlock(_) => "duplicate_block",
        OrganizeError::OrphanBlock(_) => "orphan_block",
        OrganizeError::InsufficientWork => "insufficient_work",
        OrganizeError::OperationFailed(_) => "operation_failed",
        OrganizeError::Validation(_) => "validation",
        OrganizeError::Store(_) => "store",
    }
}
