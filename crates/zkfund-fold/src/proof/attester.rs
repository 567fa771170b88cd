//! Keyed attester proofs

use std::fmt;

use zkfund_primitives::Hash256;

use super::{ProofBlob, ProofSystem};
use crate::contract::Contract;
use crate::error::{FoldError, FoldResult};
use crate::fold::FoldStep;
use crate::public_inputs::{Attestation, AttestationPublicInputs};

const SYSTEM_NAME: &str = "attester";

/// Domain separator for attester tags
pub const ATTESTER_DOMAIN: &[u8] = b"ZKFUND_ATTESTER_TAG_V1";

/// Trusted oracle: a proof is `SHA-256(domain || key || contract || public inputs)`
///
/// The attester only tags inputs it produced by folding a verified prior,
/// so whoever holds the key is trusted to have checked every step.
#[derive(Clone)]
pub struct AttesterProofSystem {
    key: [u8; 32],
}

impl AttesterProofSystem {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Derive the key from a passphrase
    pub fn from_secret(secret: &str) -> Self {
        Self::new(*Hash256::sha256(secret.as_bytes()).as_bytes())
    }

    fn tag<C: Contract>(&self, contract: &C, public: &AttestationPublicInputs<C::Summary>) -> Hash256 {
        let name = contract.name().as_bytes();
        let mut data = Vec::with_capacity(32 + 8 + name.len());
        data.extend_from_slice(&self.key);
        data.extend_from_slice(&(name.len() as u64).to_le_bytes());
        data.extend_from_slice(name);
        data.extend_from_slice(&public.to_bytes());
        Hash256::sha256_with_domain(ATTESTER_DOMAIN, &data)
    }

    fn issue<C: Contract>(&self, contract: &C, public: &AttestationPublicInputs<C::Summary>) -> ProofBlob {
        ProofBlob::new(SYSTEM_NAME, self.tag(contract, public).as_bytes().to_vec())
    }
}

impl fmt::Debug for AttesterProofSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttesterProofSystem").finish_non_exhaustive()
    }
}

impl<C: Contract> ProofSystem<C> for AttesterProofSystem {
    fn name(&self) -> &'static str {
        SYSTEM_NAME
    }

    fn prove_seed(
        &self,
        contract: &C,
        public: &AttestationPublicInputs<C::Summary>,
    ) -> FoldResult<ProofBlob> {
        if !public.is_identity() {
            return Err(FoldError::ProofGenerationFailed(
                "seed inputs must be an identity transition".to_string(),
            ));
        }
        Ok(self.issue(contract, public))
    }

    fn prove_step(
        &self,
        contract: &C,
        prior: &Attestation<C::Summary>,
        _step: &FoldStep<C::Action>,
        next: &AttestationPublicInputs<C::Summary>,
    ) -> FoldResult<ProofBlob> {
        if next.initial != prior.public.initial || next.num_actions != prior.num_actions() + 1 {
            return Err(FoldError::ProofGenerationFailed(
                "step does not extend the prior attestation".to_string(),
            ));
        }
        Ok(self.issue(contract, next))
    }

    fn verify(&self, contract: &C, attestation: &Attestation<C::Summary>) -> FoldResult<()> {
        if attestation.proof.system != SYSTEM_NAME {
            return Err(FoldError::InvalidAttestation(format!(
                "expected an {} proof, got {}",
                SYSTEM_NAME, attestation.proof.system
            )));
        }
        let expected = self.tag(contract, &attestation.public);
        if attestation.proof.bytes.as_slice() != expected.as_bytes().as_slice() {
            return Err(FoldError::InvalidAttestation("attester tag mismatch".to_string()));
        }
        Ok(())
    }
}
