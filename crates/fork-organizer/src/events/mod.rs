//! Reorganization events and the subscriber registry.

mod published;
mod subscriber;

pub use published::ReorganizeEvent;
pub use subscriber::{ReorganizeHandler, ReorganizeSubscriber};
