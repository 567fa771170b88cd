//! Proof systems
//!
//! The folding engine treats proof verification as an oracle behind
//! `ProofSystem`. Two backends ship:
//!
//! - `ReplayProofSystem`: the proof is the full step transcript and
//!   verification re-executes every step from the seed.
//! - `AttesterProofSystem`: a keyed SHA-256 tag over the public inputs,
//!   issued only after the attester has checked the step itself.

mod attester;
mod replay;

use serde::{Deserialize, Serialize};
use zkfund_primitives::Hash256;

use crate::contract::Contract;
use crate::error::FoldResult;
use crate::fold::FoldStep;
use crate::public_inputs::{Attestation, AttestationPublicInputs};

pub use attester::AttesterProofSystem;
pub use replay::ReplayProofSystem;

/// Domain separator for proof hashes
pub const PROOF_HASH_DOMAIN: &[u8] = b"ZKFUND_ATTESTATION_PROOF_V1";

/// Opaque proof bytes tagged with the system that produced them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBlob {
    pub system: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl ProofBlob {
    pub fn new(system: &str, bytes: Vec<u8>) -> Self {
        Self {
            system: system.to_string(),
            bytes,
        }
    }

    /// Domain-separated SHA-256 of the proof bytes
    pub fn hash(&self) -> Hash256 {
        Hash256::sha256_with_domain(PROOF_HASH_DOMAIN, &self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Proves and verifies attestations for contract `C`
pub trait ProofSystem<C: Contract> {
    /// Name recorded in every `ProofBlob` this system emits
    fn name(&self) -> &'static str;

    /// Proof for an identity attestation
    fn prove_seed(
        &self,
        contract: &C,
        public: &AttestationPublicInputs<C::Summary>,
    ) -> FoldResult<ProofBlob>;

    /// Proof for `next`, obtained by folding `step` onto the already verified `prior`
    fn prove_step(
        &self,
        contract: &C,
        prior: &Attestation<C::Summary>,
        step: &FoldStep<C::Action>,
        next: &AttestationPublicInputs<C::Summary>,
    ) -> FoldResult<ProofBlob>;

    /// Fails with `FoldError::InvalidAttestation` unless the attestation holds
    fn verify(&self, contract: &C, attestation: &Attestation<C::Summary>) -> FoldResult<()>;
}
