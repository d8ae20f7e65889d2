//! Wire messages
//!
//! | Message | Fields | Direction |
//! |---------|--------|-----------|
//! | `contribution` | `round, id, data` | SM → DC |
//! | `activation` | `round, s, l_rem, l_act` | DC → SM, SM → SM |
//! | `result` | `round, s, l_act` | SM → DC |
//!
//! Encoded as JSON with a `kind` tag. Integers mod k travel as decimal
//! strings, as do Paillier ciphertexts.

use super::SmId;
use aggft_crypto::Ciphertext;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::BTreeSet;

/// Running partial sum threaded through the chain.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Accumulator {
    /// Residue mod k.
    Masked(#[serde_as(as = "DisplayFromStr")] u128),
    /// Paillier ciphertext.
    Ciphertext(Ciphertext),
}

/// Phase 1 payload.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Phase1Payload {
    /// `(m + s + prf) mod k`.
    Masked(#[serde_as(as = "DisplayFromStr")] u128),
    /// Homomorphic mode sends nothing but its presence.
    Empty,
}

/// A protocol message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    Contribution {
        round: u64,
        id: SmId,
        data: Phase1Payload,
    },
    Activation {
        round: u64,
        s: Accumulator,
        l_rem: BTreeSet<SmId>,
        l_act: BTreeSet<SmId>,
    },
    Result {
        round: u64,
        s: Accumulator,
        l_act: BTreeSet<SmId>,
    },
}

impl Message {
    /// Round this message belongs to.
    pub fn round(&self) -> u64 {
        match self {
            Message::Contribution { round, .. }
            | Message::Activation { round, .. }
            | Message::Result { round, .. } => *round,
        }
    }

    /// Tag used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Contribution { .. } => "contribution",
            Message::Activation { .. } => "activation",
            Message::Result { .. } => "result",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
