//! The pure step function

use tracing::trace;

use super::slots::WitnessedSlots;
use super::witness::FoldStep;
use crate::contract::Contract;
use crate::error::{FoldError, FoldResult};
use crate::public_inputs::AttestationPublicInputs;

/// Public inputs after folding `step` onto `prior`
///
/// Initial fields are carried over unchanged; the final roots move only by
/// witnessed updates, and the final action state absorbs the step's action.
pub fn apply_step<C: Contract>(
    contract: &C,
    prior: &AttestationPublicInputs<C::Summary>,
    step: &FoldStep<C::Action>,
) -> FoldResult<AttestationPublicInputs<C::Summary>> {
    let layout = contract.layout();
    if prior.final_state.roots.len() != layout.len() {
        return Err(FoldError::LayoutMismatch {
            expected: layout.len(),
            actual: prior.final_state.roots.len(),
        });
    }

    let mut roots = prior.final_state.roots.clone();
    let mut summary = prior.summary.clone();
    let mut slots = WitnessedSlots::new(layout, &mut roots, &step.witnesses);
    contract.apply(&step.action, &mut summary, &mut slots)?;
    slots.finish()?;

    let mut next = prior.clone();
    next.final_state.roots = roots;
    next.final_state.actions = prior.final_state.actions.append(&step.action);
    next.summary = summary;
    next.num_actions += 1;

    trace!(
        contract = contract.name(),
        witnesses = step.witnesses.len(),
        num_actions = next.num_actions,
        "applied fold step"
    );
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::witness::StepWitness;
    use crate::state::{CommittedState, MapId, MapStore};
    use crate::testing::{Entry, Ledger, Tally, LEDGER_LAYOUT};
    use zkfund_primitives::Digest;

    fn put_step(store: &MapStore, key: u64, value: u64) -> FoldStep<Entry> {
        let tree = store.tree(MapId(0)).unwrap();
        FoldStep::new(
            Entry::Put { key, value },
            vec![StepWitness::new(MapId(0), tree.get(key).unwrap(), tree.witness(key).unwrap())],
        )
    }

    #[test]
    fn test_step_keeps_initial_and_advances_final() {
        let store = MapStore::new(LEDGER_LAYOUT).unwrap();
        let seed: AttestationPublicInputs<Tally> =
            AttestationPublicInputs::seed(CommittedState::genesis(LEDGER_LAYOUT));

        let next = apply_step(&Ledger, &seed, &put_step(&store, 2, 9)).unwrap();

        assert_eq!(next.initial, seed.initial);
        assert_eq!(next.num_actions, 1);
        assert_eq!(next.summary.writes, 1);
        assert_eq!(
            next.final_state.actions,
            seed.final_state.actions.append(&Entry::Put { key: 2, value: 9 })
        );
        assert_ne!(next.final_state.roots, seed.final_state.roots);
    }

    #[test]
    fn test_step_with_tampered_leaf_aborts() {
        let store = MapStore::new(LEDGER_LAYOUT).unwrap();
        let seed: AttestationPublicInputs<Tally> =
            AttestationPublicInputs::seed(CommittedState::genesis(LEDGER_LAYOUT));
        let mut step = put_step(&store, 2, 9);
        step.witnesses[0].leaf = Digest::from_u64s([1, 0, 0, 0]);

        assert!(matches!(
            apply_step(&Ledger, &seed, &step),
            Err(FoldError::WitnessMismatch { .. })
        ));
    }
}
