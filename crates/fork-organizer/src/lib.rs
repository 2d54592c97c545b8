//! # Fork Organizer - Block Admission & Chain Reorganization
//!
//! Admits newly arrived blocks, decides whether they extend the active chain
//! or represent a competing branch with greater accumulated work, and
//! atomically swaps the active chain when reorganization is warranted.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Fork linkage: each block's parent hash equals its predecessor's hash | `domain/fork.rs` - `Fork::push_front` is the sole mutator |
//! | Height mapping: fork index `i` sits at height `parent + i + 1` | `domain/fork.rs` - `height_at` / `index_of` |
//! | At most one submission mutates chain state at a time | `service/mod.rs` - submission mutex held S0 through completion |
//! | Exactly one completion per submission | `service/mod.rs` - `organize` returns one `Result` |
//! | Reorg notification happens-before the next submission | `service/mod.rs` - subscribers invoked under the submission lock |
//! | Pool holds displaced blocks and none of the confirmed ones after a swap | `service/mod.rs` - remove/prune/add sequence after `reorganize` |
//!
//! ## Submission Pipeline
//!
//! ```text
//! organize(block)
//!   ├─ check          stateless validity           (BlockValidator::check)
//!   ├─ get_path       assemble candidate fork      (BlockPool::get_path)
//!   ├─ duplicate?     empty path or already stored
//!   ├─ anchor         locate the fork point        (ConfirmedChain::block_height)
//!   ├─ accept         contextual validity          (BlockValidator::accept)
//!   ├─ connect        script validity              (BlockValidator::connect)
//!   ├─ work test      capped competing-segment sum (ConfirmedChain::fork_work)
//!   ├─ compare        fork work must strictly win, else pool retains the tip
//!   ├─ reorganize     atomic suffix swap           (ConfirmedChain::reorganize)
//!   └─ publish        pool maintenance + subscriber notification
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Confirmed store | `ConfirmedChain` | existence/height queries, capped work sums, the atomic swap |
//! | Orphan pool | `BlockPool` | path assembly to the confirmed chain, retained-block bookkeeping |
//! | Validator | `BlockValidator` | check/accept/connect phases (rules live behind the trait) |
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use fork_organizer::{Organizer, OrganizerConfig, OrganizerDependencies};
//!
//! let organizer = Organizer::new(OrganizerDependencies {
//!     chain, pool, validator,
//!     config: OrganizerConfig::default(),
//! });
//!
//! organizer.start()?;
//! organizer.subscribe_reorganize(|event| println!("{event:?}"));
//! organizer.organize(block).await?;
//! organizer.stop().await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{MemoryChain, MemoryPool};
pub use domain::{
    BlockPoolConfig, ChainError, Fork, OrganizeError, OrganizeResult, OrganizerConfig,
    ValidationError,
};
pub use events::{ReorganizeEvent, ReorganizeHandler, ReorganizeSubscriber};
pub use ports::{BlockPool, BlockValidator, ConfirmedChain, OrganizeApi};
pub use service::{Organizer, OrganizerDependencies};
