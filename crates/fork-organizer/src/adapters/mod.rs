//! In-memory implementations of the outbound ports.
//!
//! Production hosts back `ConfirmedChain` with a persistent store; these
//! adapters keep everything volatile and serve unit tests and hosts that
//! want a throwaway chain.

mod memory_chain;
mod memory_pool;

pub use memory_chain::MemoryChain;
pub use memory_pool::MemoryPool;
