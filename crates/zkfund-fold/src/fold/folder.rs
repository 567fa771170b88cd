//! Seed and fold entry points

use tracing::debug;

use super::transition::apply_step;
use super::witness::FoldStep;
use crate::contract::Contract;
use crate::error::FoldResult;
use crate::proof::ProofSystem;
use crate::public_inputs::{Attestation, AttestationPublicInputs};
use crate::state::CommittedState;

/// Chains attestations for one contract under one proof system
pub struct BatchFolder<'a, C, P> {
    contract: &'a C,
    proofs: &'a P,
}

impl<'a, C, P> BatchFolder<'a, C, P>
where
    C: Contract,
    P: ProofSystem<C>,
{
    pub fn new(contract: &'a C, proofs: &'a P) -> Self {
        Self { contract, proofs }
    }

    /// Identity attestation at `state`
    pub fn seed(&self, state: CommittedState) -> FoldResult<Attestation<C::Summary>> {
        let public = AttestationPublicInputs::seed(state);
        let proof = self.proofs.prove_seed(self.contract, &public)?;
        Ok(Attestation::new(public, proof))
    }

    /// Verify `prior`, apply `step` against its final state and attest the result
    pub fn fold(
        &self,
        prior: &Attestation<C::Summary>,
        step: FoldStep<C::Action>,
    ) -> FoldResult<Attestation<C::Summary>> {
        self.proofs.verify(self.contract, prior)?;
        let next = apply_step(self.contract, &prior.public, &step)?;
        let proof = self.proofs.prove_step(self.contract, prior, &step, &next)?;

        debug!(
            contract = self.contract.name(),
            proof_system = self.proofs.name(),
            num_actions = next.num_actions,
            final_actions = %next.final_state.actions,
            "folded action"
        );
        Ok(Attestation::new(next, proof))
    }
}
