//! Published events (outgoing).

use std::sync::Arc;

use chain_types::Block;

/// Delivered to every reorganization subscriber.
#[derive(Clone, Debug)]
pub enum ReorganizeEvent {
    /// The active chain was swapped.
    Applied {
        /// Height of the fork point: the confirmed block both branches
        /// extend.
        fork_height: u64,
        /// Newly confirmed blocks, ascending height order.
        incoming: Vec<Arc<Block>>,
        /// Displaced blocks returned to the pool, ascending height order.
        outgoing: Vec<Arc<Block>>,
    },
    /// Terminal event: the organizer shut down. Delivered exactly once.
    Stopped,
}

impl ReorganizeEvent {
    /// Depth of the swap: how many confirmed blocks were displaced.
    pub fn depth(&self) -> usize {
        match self {
            ReorganizeEvent::Applied { outgoing, .. } => outgoing.len(),
            ReorganizeEvent::Stopped => 0,
        }
    }
}
