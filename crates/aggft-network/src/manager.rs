//! # NetworkManager Contract
//!
//! The only channel between protocol roles. Implementations decide framing,
//! delivery and failure semantics; the roles only rely on:
//!
//! - `send` returns `true` iff the payload was delivered, and never runs past
//!   the caller's deadline;
//! - `listen` hands out a single-consumer inbound queue;
//! - `stop` releases listening resources.

use crate::address::Address;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Errors from setting up a transport. Sending never errors; it returns
/// `false` instead.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Another listener already owns this location.
    #[error("Address already in use: {0}")]
    AddressInUse(String),

    /// Binding a socket failed.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address we tried to bind.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Transport used by the Data Concentrator and the Smart Meters.
#[async_trait]
pub trait NetworkManager: Send + Sync {
    /// Deliver `payload` to `address` before `deadline`.
    ///
    /// Returns `false` immediately for invalid addresses.
    async fn send(&self, address: &Address, payload: Vec<u8>, deadline: Instant) -> bool;

    /// Start receiving payloads addressed to `address`.
    async fn listen(&self, address: &Address) -> Result<Inbox, NetworkError>;

    /// Stop every listener started by this manager.
    async fn stop(&self);
}

/// Sending half of an [`Inbox`], held by transports.
pub type InboxSender = mpsc::UnboundedSender<Vec<u8>>;

/// Single-consumer queue of inbound payloads.
#[derive(Debug)]
pub struct Inbox {
    receiver: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl Inbox {
    /// Create a connected sender / inbox pair.
    #[must_use]
    pub fn channel() -> (InboxSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }

    /// Wait for the next payload until `deadline`.
    ///
    /// # Returns
    ///
    /// - `Some(payload)` - A payload arrived in time
    /// - `None` - The deadline passed or every sender was dropped
    pub async fn recv_until(&mut self, deadline: Instant) -> Option<Vec<u8>> {
        match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
            Ok(payload) => payload,
            Err(_) => None,
        }
    }
}
