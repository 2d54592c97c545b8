//! Driving port (inbound API).

use std::sync::Arc;

use async_trait::async_trait;
use chain_types::Block;

use crate::domain::OrganizeResult;
use crate::events::ReorganizeHandler;

/// The organizer's public surface.
#[async_trait]
pub trait OrganizeApi: Send + Sync {
    /// Transition from stopped to running and take the coarse flush lock
    /// when per-reorganization flushing is disabled.
    fn start(&self) -> OrganizeResult<()>;

    /// Cancel validation, deliver the terminal subscriber event, then gate
    /// off new submissions. Blocks until any in-flight submission has
    /// completed, so no store write can follow its return.
    async fn stop(&self) -> OrganizeResult<()>;

    /// Submit a block. Runs the full admission pipeline and completes with
    /// exactly one result: success after a reorganization, or the rejection
    /// that ended the submission.
    async fn organize(&self, block: Arc<Block>) -> OrganizeResult<()>;

    /// Register a handler for reorganization events. The handler also
    /// receives one terminal stopped event at shutdown.
    fn subscribe_reorganize(&self, handler: ReorganizeHandler);
}
