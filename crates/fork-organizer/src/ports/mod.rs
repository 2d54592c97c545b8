//! Ports: the organizer's inbound API and outbound collaborator traits.

pub mod inbound;
pub mod outbound;

pub use inbound::OrganizeApi;
pub use outbound::{BlockPool, BlockValidator, ConfirmedChain};
