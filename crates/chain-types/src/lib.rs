//! # Chain Types Crate
//!
//! Shared domain entities for the fork-organizer workspace.
//!
//! ## Clusters
//!
//! - **Chain**: [`Block`], [`BlockHeader`], [`Transaction`], [`Input`],
//!   [`Output`], [`OutPoint`]
//! - **Validation state**: [`BlockMetadata`], [`TransactionMetadata`],
//!   [`PrevoutMetadata`], the interior-mutable side-cells attached to
//!   otherwise immutable entities
//! - **Work**: compact difficulty decoding and 256-bit accumulated work
//!
//! ## Design Principles
//!
//! - **Immutable sharing**: blocks flow through the pool, the fork, the
//!   validator and the store as `Arc<Block>`. The only post-construction
//!   mutation happens inside the metadata cells, which are excluded from
//!   serialization and equality.
//! - **Single source of truth**: every component that needs a hash, a height
//!   or a work figure derives it from these types.

pub mod entities;
pub mod metadata;
pub mod work;

pub use entities::*;
pub use metadata::{BlockMetadata, PrevoutMetadata, TransactionMetadata};
pub use work::{compact_to_target, work_from_bits};

// Re-export U256 so downstream crates share one 256-bit integer type.
pub use primitive_types::U256;
