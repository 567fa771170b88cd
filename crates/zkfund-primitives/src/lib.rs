//! zkfund primitives
//!
//! Building blocks shared by every zkfund crate:
//! - Field arithmetic using Winterfell's BaseElement (64-bit Goldilocks prime field)
//! - `Digest`: 4-element Rescue Prime (`Rp64_256`) words used for map nodes,
//!   leaves and action-log positions
//! - `Hash256`: SHA-256 byte hashes for identities and proof commitments
//! - `Identity`: the stable identity of a party or a deployed controller

pub mod digest;
pub mod field;
pub mod hash;
pub mod identity;

pub use digest::{Digest, DigestParseError, DIGEST_ELEMENTS};
pub use field::{
    felt_from_bool, felt_from_u64, felt_to_u64, felts_from_bytes, is_canonical, Felt, FELT_ONE,
    FELT_ZERO, GOLDILOCKS_PRIME,
};
pub use hash::{hash_to_felts, Hash256, HASH_LIMBS};
pub use identity::Identity;
