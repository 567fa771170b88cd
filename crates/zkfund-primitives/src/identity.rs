//! Party and controller identities
//!
//! An identity is a domain-separated SHA-256 of a public key (or, for
//! deployed controllers, of their deployment label). Authenticated maps never
//! store the identity itself, only its Rescue digest.

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::hash::{hash_to_felts, Hash256};

const IDENTITY_DOMAIN: &[u8] = b"ZKFUND_IDENTITY_V1";

/// Stable identity of a user or of a deployed controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(Hash256);

impl Identity {
    /// Identity derived from raw public key bytes
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(Hash256::sha256_with_domain(IDENTITY_DOMAIN, public_key))
    }

    /// Identity derived from a human-readable label (test parties, deployments)
    pub fn named(label: &str) -> Self {
        Self::from_public_key(label.as_bytes())
    }

    /// Wrap an existing 32-byte identity hash
    pub fn from_hash(hash: Hash256) -> Self {
        Self(hash)
    }

    pub fn as_hash(&self) -> &Hash256 {
        &self.0
    }

    /// The leaf value committed for this identity in authenticated maps
    pub fn digest(&self) -> Digest {
        Digest::hash_elements(&hash_to_felts(&self.0))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "id:{}", &self.0.to_hex()[..12])
    }
}
