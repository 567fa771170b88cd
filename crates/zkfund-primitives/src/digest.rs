//! Rescue Prime digests
//!
//! Every authenticated value in zkfund (map nodes, leaf words and action-log
//! positions) is a word of four Goldilocks elements produced by Winterfell's
//! `Rp64_256` sponge.

use std::fmt;

use thiserror::Error;
use winter_crypto::hashers::Rp64_256;
use winter_crypto::{Digest as _, ElementHasher};

use crate::field::{felt_from_u64, felt_to_u64, is_canonical, Felt, FELT_ZERO};

/// Errors raised when decoding a digest from bytes or hex
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
    #[error("limb {0} is not a canonical field element")]
    NonCanonical(usize),
    #[error("invalid hex: {0}")]
    Hex(String),
}

/// Number of field elements in a digest
pub const DIGEST_ELEMENTS: usize = 4;

/// A 4-element Rescue Prime word (256 bits as 4x64-bit field elements)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Digest(pub [Felt; DIGEST_ELEMENTS]);

impl Digest {
    /// The all-zero word. Doubles as the canonical empty leaf.
    pub const ZERO: Self = Self([FELT_ZERO; DIGEST_ELEMENTS]);

    /// Create a digest from raw field elements
    pub const fn new(elements: [Felt; DIGEST_ELEMENTS]) -> Self {
        Self(elements)
    }

    /// Create a digest from u64 limbs (each reduced mod p)
    pub fn from_u64s(limbs: [u64; DIGEST_ELEMENTS]) -> Self {
        Self(limbs.map(felt_from_u64))
    }

    /// Canonical u64 limbs
    pub fn to_u64s(&self) -> [u64; DIGEST_ELEMENTS] {
        self.0.map(felt_to_u64)
    }

    pub fn as_elements(&self) -> &[Felt; DIGEST_ELEMENTS] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Hash a sequence of field elements with Rescue Prime
    pub fn hash_elements(elements: &[Felt]) -> Self {
        let digest = Rp64_256::hash_elements(elements);
        Self::from_le_bytes(&digest.as_bytes())
    }

    /// Two-to-one compression used for tree nodes and the action chain.
    ///
    /// Order matters: `merge(a, b) != merge(b, a)`.
    pub fn merge(left: &Self, right: &Self) -> Self {
        let mut input = [FELT_ZERO; 2 * DIGEST_ELEMENTS];
        input[..DIGEST_ELEMENTS].copy_from_slice(&left.0);
        input[DIGEST_ELEMENTS..].copy_from_slice(&right.0);
        Self::hash_elements(&input)
    }

    /// Little-endian byte encoding (8 bytes per element)
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (chunk, limb) in bytes.chunks_exact_mut(8).zip(self.to_u64s()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Parse the little-endian encoding, rejecting non-canonical limbs
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, DigestParseError> {
        if bytes.len() != 32 {
            return Err(DigestParseError::Length(bytes.len()));
        }
        let mut limbs = [0u64; DIGEST_ELEMENTS];
        for (i, (limb, chunk)) in limbs.iter_mut().zip(bytes.chunks_exact(8)).enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
            if !is_canonical(*limb) {
                return Err(DigestParseError::NonCanonical(i));
            }
        }
        Ok(Self::from_u64s(limbs))
    }

    /// Convert to hex string (lowercase, no 0x prefix)
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from hex string (optional `0x` prefix)
    pub fn from_hex(hex_str: &str) -> Result<Self, DigestParseError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str).map_err(|e| DigestParseError::Hex(e.to_string()))?;
        Self::try_from_bytes(&bytes)
    }

    // Rescue output limbs are always canonical
    fn from_le_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0u64; DIGEST_ELEMENTS];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }
        Self::from_u64s(limbs)
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::hash::Hash for Digest {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_u64s().hash(state);
    }
}

impl From<[Felt; DIGEST_ELEMENTS]> for Digest {
    fn from(elements: [Felt; DIGEST_ELEMENTS]) -> Self {
        Self(elements)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest(0x{})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...", &self.to_hex()[..16])
    }
}

impl serde::Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
