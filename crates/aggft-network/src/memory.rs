//! # In-Memory Transport
//!
//! Delivers payloads through in-process channels instead of sockets. All
//! managers created from one [`InMemoryNetwork`] share a registry of inboxes
//! and a link table, so tests can take individual links or whole nodes down
//! and watch the protocol route around them.
//!
//! Links and nodes are up unless explicitly set down. Links are directed:
//! `set_link(a, b, false)` does not affect `b → a`.

use crate::address::{Address, Location};
use crate::manager::{Inbox, InboxSender, NetworkError, NetworkManager};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

#[derive(Default)]
struct Registry {
    inboxes: HashMap<Location, InboxSender>,
    links: HashMap<(Location, Location), bool>,
    nodes: HashMap<Location, bool>,
}

impl Registry {
    fn node_up(&self, node: &Location) -> bool {
        self.nodes.get(node).copied().unwrap_or(true)
    }

    fn link_up(&self, from: &Location, to: &Location) -> bool {
        self.links
            .get(&(from.clone(), to.clone()))
            .copied()
            .unwrap_or(true)
    }
}

/// Shared in-process network.
///
/// Cloning yields another handle to the same network.
#[derive(Clone, Default)]
pub struct InMemoryNetwork {
    registry: Arc<RwLock<Registry>>,
    delivered: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl InMemoryNetwork {
    /// Create an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager that sends from `local`.
    #[must_use]
    pub fn manager(&self, local: &Address) -> InMemoryNetworkManager {
        InMemoryNetworkManager {
            network: self.clone(),
            local: local.location(),
            listening: Mutex::new(Vec::new()),
        }
    }

    /// Set the directed link `from → to` up or down.
    pub fn set_link(&self, from: &Address, to: &Address, up: bool) {
        self.registry
            .write()
            .links
            .insert((from.location(), to.location()), up);
    }

    /// Set both directions between `a` and `b`.
    pub fn set_link_pair(&self, a: &Address, b: &Address, up: bool) {
        self.set_link(a, b, up);
        self.set_link(b, a, up);
    }

    /// Take a node up or down. A down node can neither send nor receive.
    pub fn set_node(&self, node: &Address, up: bool) {
        self.registry.write().nodes.insert(node.location(), up);
    }

    /// Whether a payload from `from` to `to` would currently be delivered.
    #[must_use]
    pub fn is_deliverable(&self, from: &Location, to: &Location) -> bool {
        let registry = self.registry.read();
        registry.node_up(from)
            && registry.node_up(to)
            && registry.link_up(from, to)
            && registry.inboxes.contains_key(to)
    }

    /// Total payloads delivered.
    #[must_use]
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Total payloads refused (invalid address, down link/node, no listener).
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn deliver(&self, from: &Location, to: &Location, payload: Vec<u8>) -> bool {
        let registry = self.registry.read();
        let routable =
            registry.node_up(from) && registry.node_up(to) && registry.link_up(from, to);
        let delivered = routable
            && registry
                .inboxes
                .get(to)
                .is_some_and(|inbox| inbox.send(payload).is_ok());

        if delivered {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(from = %from, to = %to, "In-memory delivery refused");
        }
        delivered
    }

    fn register(&self, location: Location) -> Result<Inbox, NetworkError> {
        let mut registry = self.registry.write();
        if let Some(existing) = registry.inboxes.get(&location) {
            if !existing.is_closed() {
                return Err(NetworkError::AddressInUse(location.to_string()));
            }
        }
        let (sender, inbox) = Inbox::channel();
        registry.inboxes.insert(location, sender);
        Ok(inbox)
    }

    fn unregister(&self, location: &Location) {
        self.registry.write().inboxes.remove(location);
    }
}

/// [`NetworkManager`] bound to one sender location of an [`InMemoryNetwork`].
pub struct InMemoryNetworkManager {
    network: InMemoryNetwork,
    local: Location,
    listening: Mutex<Vec<Location>>,
}

impl InMemoryNetworkManager {
    /// Location this manager sends from.
    #[must_use]
    pub fn local(&self) -> &Location {
        &self.local
    }
}

#[async_trait]
impl NetworkManager for InMemoryNetworkManager {
    async fn send(&self, address: &Address, payload: Vec<u8>, deadline: Instant) -> bool {
        if !address.valid || Instant::now() >= deadline {
            self.network.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.network
            .deliver(&self.local, &address.location(), payload)
    }

    async fn listen(&self, address: &Address) -> Result<Inbox, NetworkError> {
        let location = address.location();
        let inbox = self.network.register(location.clone())?;
        self.listening.lock().push(location);
        Ok(inbox)
    }

    async fn stop(&self) {
        for location in self.listening.lock().drain(..) {
            self.network.unregister(&location);
        }
    }
}
