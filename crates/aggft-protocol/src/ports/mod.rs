//! Ports layer (Hexagonal Architecture)
//!
//! - inbound: how callers drive a role
//! - outbound: what a role needs from its environment besides the network

mod inbound;
mod outbound;

pub use inbound::*;
pub use outbound::*;
