//! Error types for the fork organizer.

use chain_types::Hash;

/// Submission result surface.
///
/// Every call to `organize` completes with exactly one of these or success.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OrganizeError {
    /// The organizer is stopped; no state was mutated.
    #[error("service stopped")]
    ServiceStopped,

    /// The block is already pooled or already confirmed.
    #[error("duplicate block: {0:?}")]
    DuplicateBlock(Hash),

    /// The candidate branch does not attach to the confirmed chain.
    #[error("orphan block: fork parent {0:?} unknown")]
    OrphanBlock(Hash),

    /// The branch's accumulated work does not exceed the competing
    /// confirmed segment; the tip was retained in the pool.
    #[error("insufficient work")]
    InsufficientWork,

    /// A store query failed; the store may be inconsistent.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// Rejected by the validator in check, accept or connect.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The reorganization write failed; the store is potentially corrupted.
    #[error(transparent)]
    Store(#[from] ChainError),
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Codes forwarded from the validator pipeline.
///
/// The consensus rules themselves live behind the `BlockValidator` trait;
/// this enum is the wire between its verdicts and the submission surface.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid proof of work")]
    InvalidProofOfWork,

    #[error("block check failed: {0}")]
    CheckFailed(String),

    #[error("contextual accept failed at height {height}: {reason}")]
    AcceptFailed { height: u64, reason: String },

    #[error("script validation failed: {0}")]
    ConnectFailed(String),

    /// The validator was stopped mid-flight.
    #[error("validation canceled")]
    Canceled,
}

/// Failures surfaced by the confirmed chain store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The flush lock was toggled out of order.
    #[error("flush lock state error: {0}")]
    FlushLock(String),

    /// A height/work query hit an inconsistent index.
    #[error("store query failed: {0}")]
    Query(String),

    /// The reorganization write transaction failed mid-swap.
    #[error("store write failed: {0}")]
    Write(String),
}
