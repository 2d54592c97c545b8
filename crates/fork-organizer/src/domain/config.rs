//! Configuration for the organizer and the orphan pool.

use serde::Deserialize;

/// Organizer configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Flush the store on every reorganization. When false, a coarse flush
    /// lock is held on the store for the organizer's lifetime instead.
    pub flush_per_reorg: bool,
    /// Probe block existence only above the fork point when testing for
    /// duplicates. The default replicates the historical whole-chain probe,
    /// which rejects hash collisions that are not on the candidate's path.
    pub duplicate_check_from_fork_point: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            flush_per_reorg: true,
            duplicate_check_from_fork_point: false,
        }
    }
}

/// Orphan pool configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BlockPoolConfig {
    /// Orphans anchored more than this many blocks below the confirmed top
    /// are evicted on prune.
    pub maximum_depth: u64,
}

impl Default for BlockPoolConfig {
    fn default() -> Self {
        Self { maximum_depth: 50 }
    }
}
