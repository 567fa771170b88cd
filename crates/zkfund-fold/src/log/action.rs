//! Actions and the action-state accumulator

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zkfund_primitives::field::felts_from_bytes;
use zkfund_primitives::{Digest, Felt};

const GENESIS_TAG: &[u8] = b"ZKFUND_ACTION_STATE_GENESIS_V1";

/// An immutable, domain-typed record appended to a controller's log
pub trait Action: Clone + Debug + PartialEq + Serialize + DeserializeOwned {
    /// Canonical field encoding hashed into the accumulator
    fn to_elements(&self) -> Vec<Felt>;

    fn hash(&self) -> Digest {
        Digest::hash_elements(&self.to_elements())
    }
}

/// Cumulative digest of every action up to and including a log position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionState(Digest);

impl ActionState {
    /// The fixed, well-known state of an empty log
    pub fn genesis() -> Self {
        Self(Digest::hash_elements(&felts_from_bytes(GENESIS_TAG)))
    }

    pub fn from_digest(digest: Digest) -> Self {
        Self(digest)
    }

    pub fn digest(&self) -> Digest {
        self.0
    }

    /// `H(self, hash(action))`; order-dependent
    pub fn append<A: Action>(&self, action: &A) -> Self {
        self.append_hash(&action.hash())
    }

    pub fn append_hash(&self, action_hash: &Digest) -> Self {
        Self(Digest::merge(&self.0, action_hash))
    }
}

impl Default for ActionState {
    fn default() -> Self {
        Self::genesis()
    }
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
