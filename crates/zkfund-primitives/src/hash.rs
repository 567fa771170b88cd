//! SHA-256 commitments
//!
//! Identities, proof hashes and attester tags are 32-byte SHA-256 outputs.
//! Domain-tagged hashes prefix the tag with its length, so no (tag, data)
//! split can collide with another.

use std::fmt;
use std::str::FromStr;

use hex::FromHex;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use sha2::{Digest as _, Sha256};

use crate::field::{felt_from_u64, Felt};

/// Number of u32 limbs a hash splits into when it enters the field
pub const HASH_LIMBS: usize = 8;

/// A 32-byte SHA-256 output
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const fn zero() -> Self {
        Self([0; 32])
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse 64 hex digits, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        <[u8; 32]>::from_hex(digits).map(Self)
    }

    /// Lowercase hex, unprefixed
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn sha256(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// SHA-256 over `len(domain) || domain || data`
    pub fn sha256_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let digest = Sha256::new()
            .chain_update((domain.len() as u64).to_le_bytes())
            .chain_update(domain)
            .chain_update(data)
            .finalize();
        Self(digest.into())
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::LowerHex for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:#x}")
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({self:#x})")
    }
}

// Hex text for human-readable formats, raw bytes otherwise.
impl serde::Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

struct Hash256Visitor;

impl<'de> Visitor<'de> for Hash256Visitor {
    type Value = Hash256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 32-byte hash as hex or bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Hash256, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Hash256, E> {
        <[u8; 32]>::try_from(v)
            .map(Hash256)
            .map_err(|_| E::invalid_length(v.len(), &self))
    }
}

impl<'de> serde::Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(Hash256Visitor)
        } else {
            deserializer.deserialize_bytes(Hash256Visitor)
        }
    }
}

/// Split a hash into little-endian u32 limbs, one field element each
///
/// Injective: every limb is below the Goldilocks modulus.
pub fn hash_to_felts(hash: &Hash256) -> [Felt; HASH_LIMBS] {
    std::array::from_fn(|i| {
        let mut limb = [0u8; 4];
        limb.copy_from_slice(&hash.0[4 * i..4 * i + 4]);
        felt_from_u64(u32::from_le_bytes(limb).into())
    })
}
