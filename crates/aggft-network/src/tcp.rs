//! # TCP Transport
//!
//! Frames are a 4-byte big-endian length followed by the payload. The
//! receiver answers every queued frame with a single [`ACK`] byte; `send`
//! reports success only after reading it, so `true` means "delivered to the
//! peer's inbox" rather than "written to a socket".
//!
//! One connection carries one frame. Connections are cheap compared to a
//! round length and this keeps the sender stateless across rounds. A peer
//! that does not deliver its frame within the read timeout is disconnected,
//! and `stop` closes every connection still open on its listeners.

use crate::address::Address;
use crate::manager::{Inbox, InboxSender, NetworkError, NetworkManager};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info};

/// Acknowledgement byte written after a frame is queued.
pub const ACK: u8 = 0x01;

/// Largest accepted frame (16 MiB).
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Time an inbound connection gets to deliver its frame.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// [`NetworkManager`] over plain TCP.
pub struct TcpNetworkManager {
    max_frame_len: usize,
    read_timeout: Duration,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl TcpNetworkManager {
    /// Create a manager with the default frame limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_frame_len(MAX_FRAME_LEN)
    }

    /// Create a manager with a custom frame limit.
    #[must_use]
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len,
            read_timeout: READ_TIMEOUT,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Override the inbound read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    async fn send_frame(address: &Address, payload: &[u8]) -> std::io::Result<bool> {
        let len = u32::try_from(payload.len())
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "frame too large"))?;
        let mut stream = TcpStream::connect((address.host.as_str(), address.port)).await?;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(payload).await?;
        stream.flush().await?;
        let ack = stream.read_u8().await?;
        Ok(ack == ACK)
    }
}

impl Default for TcpNetworkManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkManager for TcpNetworkManager {
    async fn send(&self, address: &Address, payload: Vec<u8>, deadline: Instant) -> bool {
        if !address.valid || payload.len() > self.max_frame_len {
            return false;
        }
        match tokio::time::timeout_at(deadline, Self::send_frame(address, &payload)).await {
            Ok(Ok(acked)) => acked,
            Ok(Err(e)) => {
                debug!(to = %address, error = %e, "TCP send failed");
                false
            }
            Err(_) => {
                debug!(to = %address, "TCP send timed out");
                false
            }
        }
    }

    async fn listen(&self, address: &Address) -> Result<Inbox, NetworkError> {
        let listener = TcpListener::bind((address.host.as_str(), address.port))
            .await
            .map_err(|source| NetworkError::Bind {
                address: address.to_string(),
                source,
            })?;
        info!(address = %address, "TCP listener started");

        let (sender, inbox) = Inbox::channel();
        let handle = tokio::spawn(accept_loop(
            listener,
            sender,
            self.max_frame_len,
            self.read_timeout,
        ));
        self.listeners.lock().push(handle);
        Ok(inbox)
    }

    async fn stop(&self) {
        for handle in self.listeners.lock().drain(..) {
            handle.abort();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    sender: InboxSender,
    max_frame_len: usize,
    read_timeout: Duration,
) {
    // Connections live in the set so aborting this task drops them too
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        debug!(error = %e, "TCP accept failed");
                        continue;
                    }
                };
                let sender = sender.clone();
                connections.spawn(async move {
                    let frame = read_frame(stream, &sender, max_frame_len);
                    match tokio::time::timeout(read_timeout, frame).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => debug!(peer = %peer, error = %e, "Dropped inbound frame"),
                        Err(_) => debug!(peer = %peer, "Inbound connection stalled"),
                    }
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
}

async fn read_frame(
    mut stream: TcpStream,
    sender: &InboxSender,
    max_frame_len: usize,
) -> std::io::Result<()> {
    let len = stream.read_u32().await? as usize;
    if len > max_frame_len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit {}", len, max_frame_len),
        ));
    }
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    if sender.send(payload).is_err() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "inbox closed",
        ));
    }
    stream.write_all(&[ACK]).await?;
    stream.flush().await
}
