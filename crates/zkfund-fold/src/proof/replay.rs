//! Transparent replay proofs

use serde::{Deserialize, Serialize};

use super::{ProofBlob, ProofSystem};
use crate::contract::Contract;
use crate::error::{FoldError, FoldResult};
use crate::fold::{apply_step, FoldStep};
use crate::log::Action;
use crate::public_inputs::{Attestation, AttestationPublicInputs};

const SYSTEM_NAME: &str = "replay";

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "A: Action")]
struct Transcript<A> {
    steps: Vec<FoldStep<A>>,
}

/// Proof = every step since the seed; verification re-executes them all
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayProofSystem;

impl ReplayProofSystem {
    pub fn new() -> Self {
        Self
    }

    fn decode<A: Action>(&self, proof: &ProofBlob) -> FoldResult<Transcript<A>> {
        if proof.system != SYSTEM_NAME {
            return Err(FoldError::InvalidAttestation(format!(
                "expected a {} proof, got {}",
                SYSTEM_NAME, proof.system
            )));
        }
        serde_json::from_slice(&proof.bytes)
            .map_err(|e| FoldError::InvalidAttestation(format!("malformed transcript: {}", e)))
    }

    fn encode<A: Action>(&self, transcript: &Transcript<A>) -> FoldResult<ProofBlob> {
        let bytes = serde_json::to_vec(transcript)
            .map_err(|e| FoldError::ProofGenerationFailed(format!("JSON error: {}", e)))?;
        Ok(ProofBlob::new(SYSTEM_NAME, bytes))
    }
}

impl<C: Contract> ProofSystem<C> for ReplayProofSystem {
    fn name(&self) -> &'static str {
        SYSTEM_NAME
    }

    fn prove_seed(
        &self,
        _contract: &C,
        _public: &AttestationPublicInputs<C::Summary>,
    ) -> FoldResult<ProofBlob> {
        self.encode(&Transcript::<C::Action> { steps: Vec::new() })
    }

    fn prove_step(
        &self,
        _contract: &C,
        prior: &Attestation<C::Summary>,
        step: &FoldStep<C::Action>,
        _next: &AttestationPublicInputs<C::Summary>,
    ) -> FoldResult<ProofBlob> {
        let mut transcript: Transcript<C::Action> = self.decode(&prior.proof)?;
        transcript.steps.push(step.clone());
        self.encode(&transcript)
    }

    fn verify(&self, contract: &C, attestation: &Attestation<C::Summary>) -> FoldResult<()> {
        let transcript: Transcript<C::Action> = self.decode(&attestation.proof)?;
        if transcript.steps.len() as u64 != attestation.num_actions() {
            return Err(FoldError::InvalidAttestation(format!(
                "transcript has {} steps for {} actions",
                transcript.steps.len(),
                attestation.num_actions()
            )));
        }

        let mut replayed = AttestationPublicInputs::seed(attestation.initial().clone());
        for step in &transcript.steps {
            replayed = apply_step(contract, &replayed, step)
                .map_err(|e| FoldError::InvalidAttestation(format!("replay failed: {}", e)))?;
        }

        if replayed != attestation.public {
            return Err(FoldError::InvalidAttestation(
                "replayed public inputs differ from the attested ones".to_string(),
            ));
        }
        Ok(())
    }
}
