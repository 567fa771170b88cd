//! Fuzz target for attestation envelope parsing
//!
//! This target ensures:
//! 1. Envelope deserialization never panics on arbitrary input
//! 2. Envelopes that do parse carry a matching proof hash
//! 3. Replay verification never panics on whatever attestation came out

#![no_main]

use libfuzzer_sys::fuzz_target;
use zkfund_contracts::{FundingContract, FundingSummary};
use zkfund_fold::{AttestationEnvelope, OpaqueEnvelope, ProofSystem, ReplayProofSystem};

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(envelope) = OpaqueEnvelope::from_json(json) {
        assert_eq!(envelope.proof_hash, envelope.attestation.proof_hash());
    }

    if let Ok(envelope) = AttestationEnvelope::<FundingSummary>::from_json(json) {
        let attestation = envelope.into_attestation();
        let _ = ReplayProofSystem::new().verify(&FundingContract, &attestation);
    }
});
