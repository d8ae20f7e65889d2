//! # AggFT Network - Transport Between Protocol Roles
//!
//! The Data Concentrator and the Smart Meters never talk to each other
//! directly; every message goes through a [`NetworkManager`].
//!
//! ```text
//! ┌──────────────┐   send(addr, bytes, deadline) -> bool   ┌──────────────┐
//! │     Role     │ ──────────────────────────────────────▶ │    Inbox     │
//! │  (DC / SM)   │                                         │ recv_until() │
//! └──────────────┘                                         └──────────────┘
//! ```
//!
//! ## Transports
//!
//! | Type | Delivery | Use Case |
//! |------|----------|----------|
//! | [`InMemoryNetwork`] | In-process channels with a link table | Tests, fault injection |
//! | [`TcpNetworkManager`] | Length-prefixed frames with an ack byte | Deployments |
//!
//! Payloads are opaque bytes. Decoding them is the receiver's problem.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod address;
pub mod manager;
pub mod memory;
pub mod tcp;

// Re-export main types
pub use address::{Address, Location};
pub use manager::{Inbox, InboxSender, NetworkError, NetworkManager};
pub use memory::{InMemoryNetwork, InMemoryNetworkManager};
pub use tcp::{TcpNetworkManager, ACK, MAX_FRAME_LEN};
