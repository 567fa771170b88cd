//! Field arithmetic using Winterfell's BaseElement (Goldilocks 64-bit prime field)
//!
//! The Goldilocks field is defined by the prime p = 2^64 - 2^32 + 1.

use winter_math::fields::f64::BaseElement;
use winter_math::FieldElement;

/// The field element type used throughout zkfund
pub type Felt = BaseElement;

/// Zero in the field
pub const FELT_ZERO: Felt = BaseElement::ZERO;

/// One in the field
pub const FELT_ONE: Felt = BaseElement::ONE;

/// The Goldilocks prime: p = 2^64 - 2^32 + 1
pub const GOLDILOCKS_PRIME: u64 = 0xFFFFFFFF00000001;

/// Convert a u64 to a field element (reduces mod p)
#[inline]
pub fn felt_from_u64(value: u64) -> Felt {
    BaseElement::new(value)
}

/// Convert a field element to u64 (canonical representative)
#[inline]
pub fn felt_to_u64(felt: Felt) -> u64 {
    felt.as_int()
}

/// Encode a boolean as 0 or 1
#[inline]
pub fn felt_from_bool(value: bool) -> Felt {
    if value {
        FELT_ONE
    } else {
        FELT_ZERO
    }
}

/// Whether `value` is already a canonical field representative
#[inline]
pub fn is_canonical(value: u64) -> bool {
    value < GOLDILOCKS_PRIME
}

/// Pack arbitrary bytes into field elements, 4 bytes (one u32 limb) per element.
///
/// The byte length is prepended so that inputs differing only in trailing
/// zero bytes stay distinct.
pub fn felts_from_bytes(bytes: &[u8]) -> Vec<Felt> {
    let mut out = Vec::with_capacity(1 + bytes.len().div_ceil(4));
    out.push(felt_from_u64(bytes.len() as u64));
    for chunk in bytes.chunks(4) {
        let mut limb = [0u8; 4];
        limb[..chunk.len()].copy_from_slice(chunk);
        out.push(felt_from_u64(u32::from_le_bytes(limb) as u64));
    }
    out
}
