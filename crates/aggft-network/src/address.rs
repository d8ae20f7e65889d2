//! # Addresses
//!
//! A location plus a validity flag. `valid = false` models a link that is
//! known to be down from the sender's point of view without removing the
//! peer from the topology.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network location of a peer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Host name or IP address.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Whether the link to this address is usable.
    pub valid: bool,
}

impl Address {
    /// Create a valid address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            valid: true,
        }
    }

    /// Same location, marked invalid.
    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Location without the validity flag.
    #[must_use]
    pub fn location(&self) -> Location {
        Location {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Host and port, used as a registry key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// Host name or IP address.
    pub host: String,
    /// Port number.
    pub port: u16,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
