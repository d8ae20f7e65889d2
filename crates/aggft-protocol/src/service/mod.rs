//! Role services - the round drivers
//!
//! # Architecture
//! - One task per role, one round at a time
//! - Round state moves by value through the phase functions
//! - Inbound payloads are received with a deadline, never polled
//! - Every inbound and outbound payload is counted in the round report

mod dc;
mod sm;

pub use dc::DataConcentrator;
pub use sm::SmartMeter;

use crate::domain::{Message, NetStats};
use crate::metrics;
use aggft_network::{Address, NetworkManager};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Encode, send and count one message.
async fn send_message<N: NetworkManager + ?Sized>(
    network: &N,
    role: &'static str,
    address: &Address,
    message: &Message,
    deadline: Instant,
    net: &mut NetStats,
) -> bool {
    let payload = match message.encode() {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, kind = message.kind(), "Failed to encode message");
            return false;
        }
    };
    let size = payload.len();
    let ok = network.send(address, payload, deadline).await;
    net.record_sent(size, ok);
    metrics::record_message_sent(role, ok);
    debug!(to = %address, kind = message.kind(), size, ok, "Sent message");
    ok
}
