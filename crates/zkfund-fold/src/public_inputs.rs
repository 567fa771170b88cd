//! Attestation public inputs
//!
//! The public payload of a batch attestation: the state the batch starts
//! from, the state it ends in, the contract's running summary and the number
//! of folded actions.

use serde::{Deserialize, Serialize};
use zkfund_primitives::{felt_from_u64, felt_to_u64, Felt, Hash256};

use crate::contract::Summary;
use crate::proof::ProofBlob;
use crate::state::CommittedState;

/// Public inputs of a batch attestation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "S: Summary")]
pub struct AttestationPublicInputs<S> {
    /// State the batch was built on
    pub initial: CommittedState,

    /// State after the last folded action
    pub final_state: CommittedState,

    /// Running aggregates over the folded actions
    pub summary: S,

    /// Number of folded actions
    pub num_actions: u64,
}

impl<S: Summary> AttestationPublicInputs<S> {
    /// Identity transition at `state`
    pub fn seed(state: CommittedState) -> Self {
        Self {
            initial: state.clone(),
            final_state: state,
            summary: S::default(),
            num_actions: 0,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.num_actions == 0 && self.initial == self.final_state
    }

    pub fn to_elements(&self) -> Vec<Felt> {
        let mut elements = self.initial.to_elements();
        elements.extend(self.final_state.to_elements());
        elements.push(felt_from_u64(self.num_actions));
        elements.extend(self.summary.to_elements());
        elements
    }

    /// Little-endian bytes of `to_elements`
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_elements()
            .into_iter()
            .flat_map(|felt| felt_to_u64(felt).to_le_bytes())
            .collect()
    }
}

/// A batch attestation: public inputs plus the proof that they were reached
/// by a legal chain of fold steps from a seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "S: Summary")]
pub struct Attestation<S> {
    pub public: AttestationPublicInputs<S>,
    pub proof: ProofBlob,
}

impl<S: Summary> Attestation<S> {
    pub fn new(public: AttestationPublicInputs<S>, proof: ProofBlob) -> Self {
        Self { public, proof }
    }

    pub fn initial(&self) -> &CommittedState {
        &self.public.initial
    }

    pub fn final_state(&self) -> &CommittedState {
        &self.public.final_state
    }

    pub fn summary(&self) -> &S {
        &self.public.summary
    }

    pub fn num_actions(&self) -> u64 {
        self.public.num_actions
    }

    pub fn proof_hash(&self) -> Hash256 {
        self.proof.hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::ActionState;
    use crate::state::{MapRoots, MapSpec};

    const LAYOUT: &[MapSpec] = &[MapSpec::new("a", 4)];

    #[test]
    fn test_seed_is_identity() {
        let inputs: AttestationPublicInputs<()> =
            AttestationPublicInputs::seed(CommittedState::genesis(LAYOUT));
        assert!(inputs.is_identity());
        assert_eq!(inputs.initial, inputs.final_state);
    }

    #[test]
    fn test_to_elements_layout() {
        let inputs: AttestationPublicInputs<()> =
            AttestationPublicInputs::seed(CommittedState::genesis(LAYOUT));
        // 2 x (1 root + action state) x 4 elements + num_actions
        assert_eq!(inputs.to_elements().len(), 17);
        assert_eq!(inputs.to_bytes().len(), 17 * 8);
    }

    #[test]
    fn test_elements_bind_final_state() {
        let seed: AttestationPublicInputs<()> =
            AttestationPublicInputs::seed(CommittedState::genesis(LAYOUT));
        let mut moved = seed.clone();
        moved.final_state = CommittedState::new(
            MapRoots::empty(LAYOUT),
            ActionState::genesis().append_hash(&zkfund_primitives::Digest::ZERO),
        );
        assert_ne!(seed.to_elements(), moved.to_elements());
    }
}
