//! Fuzz target for batch folding
//!
//! This target ensures:
//! 1. Folding arbitrary funding actions never panics
//! 2. Every batch that folds also verifies
//! 3. The prover's store ends in sync with the attested roots
//! 4. A single step with a made-up witness is rejected, never panics

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zkfund_contracts::funding::TOTALS;
use zkfund_contracts::{FundingAction, FundingContract};
use zkfund_fold::{
    apply_step, BatchFolder, BatchProver, CommittedState, Contract, FoldStep, LeafValue, MapStore,
    ProofSystem, ReplayProofSystem, StepWitness,
};
use zkfund_primitives::{Digest, Identity};

#[derive(Debug, Arbitrary)]
enum Op {
    Fund { campaign: u16, amount: u64 },
    Claim { campaign: u16, claimant: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    ops: Vec<Op>,
    step_index: u16,
    step_pre_value: u64,
}

fn to_action(op: Op) -> FundingAction {
    match op {
        Op::Fund { campaign, amount } => FundingAction::Fund {
            campaign_id: u64::from(campaign),
            amount,
        },
        Op::Claim { campaign, claimant } => FundingAction::Claim {
            campaign_id: u64::from(campaign),
            claimant: Identity::named(&claimant.to_string()),
        },
    }
}

fuzz_target!(|input: Input| {
    let actions: Vec<FundingAction> = input.ops.into_iter().take(64).map(to_action).collect();

    let layout = FundingContract.layout();
    let Ok(store) = MapStore::new(layout) else {
        return;
    };
    let genesis = CommittedState::genesis(layout);
    let proofs = ReplayProofSystem::new();

    if let Some(FundingAction::Fund { campaign_id, amount }) = actions.first() {
        let Ok(seed) = BatchFolder::new(&FundingContract, &proofs).seed(genesis.clone()) else {
            return;
        };
        let Ok(tree) = store.tree(TOTALS) else {
            return;
        };
        let index = u64::from(input.step_index);
        if let Ok(path) = tree.witness(index) {
            let pre_value = input.step_pre_value.to_leaf();
            let step = FoldStep::new(
                FundingAction::Fund {
                    campaign_id: *campaign_id,
                    amount: *amount,
                },
                vec![StepWitness::new(TOTALS, pre_value, path)],
            );
            let result = apply_step(&FundingContract, &seed.public, &step);
            // the totals map starts empty, so only the empty leaf on the right slot is honest
            if index != *campaign_id || pre_value != Digest::ZERO {
                assert!(result.is_err());
            }
        }
    }

    let prover = BatchProver::new(FundingContract, ReplayProofSystem::new());
    if let Ok(batch) = prover.prove(&store, &genesis, &actions) {
        assert!(proofs.verify(&FundingContract, &batch.attestation).is_ok());
        assert!(batch
            .store
            .ensure_matches(&batch.attestation.final_state().roots)
            .is_ok());
    }
});
