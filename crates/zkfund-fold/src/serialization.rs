//! Attestation transport
//!
//! Attestations leave the prover as versioned JSON envelopes. The envelope
//! repeats the proof hash so a receiver can reject a corrupted proof before
//! handing it to the proof system.

use serde::{Deserialize, Serialize};
use zkfund_primitives::Hash256;

use crate::contract::Summary;
use crate::error::{FoldError, FoldResult};
use crate::public_inputs::Attestation;

/// Serializable attestation with its contract name and proof hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "S: Summary")]
pub struct AttestationEnvelope<S> {
    /// Protocol version
    pub version: u8,

    /// Contract the attestation was folded for
    pub contract: String,

    /// Hash of the proof bytes
    pub proof_hash: Hash256,

    /// The attestation
    pub attestation: Attestation<S>,
}

impl<S: Summary> AttestationEnvelope<S> {
    /// Current protocol version
    pub const VERSION: u8 = 1;

    pub fn new(contract: &str, attestation: Attestation<S>) -> Self {
        Self {
            version: Self::VERSION,
            contract: contract.to_string(),
            proof_hash: attestation.proof_hash(),
            attestation,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> FoldResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FoldError::SerializationFailed(format!("JSON error: {}", e)))
    }

    /// Deserialize from JSON, checking version and proof hash
    pub fn from_json(json: &str) -> FoldResult<Self> {
        let envelope: Self = serde_json::from_str(json)
            .map_err(|e| FoldError::DeserializationFailed(format!("JSON error: {}", e)))?;
        envelope.check()?;
        Ok(envelope)
    }

    pub fn check(&self) -> FoldResult<()> {
        if self.version != Self::VERSION {
            return Err(FoldError::DeserializationFailed(format!(
                "Unsupported version: {}",
                self.version
            )));
        }
        if self.attestation.proof_hash() != self.proof_hash {
            return Err(FoldError::DeserializationFailed(
                "Proof hash does not match proof bytes".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_attestation(self) -> Attestation<S> {
        self.attestation
    }
}

/// Loosely typed view for tools that do not know the contract's summary type
pub type OpaqueEnvelope = AttestationEnvelope<serde_json::Value>;

impl Summary for serde_json::Value {
    fn to_elements(&self) -> Vec<zkfund_primitives::Felt> {
        Vec::new()
    }
}
