//! Concurrency and resumability tests
//!
//! Settlement through a shared handle is serialised, so of several batches
//! proved against the same base exactly one commits. Folds can be paused,
//! moved across threads as JSON and resumed.

use std::sync::Barrier;
use std::thread;

use zkfund::contracts::{FundingAction, FundingContract, FundingSummary};
use zkfund::fold::{BatchProver, Contract, FoldSnapshot, MapStore, ReplayProofSystem};
use zkfund::primitives::Identity;
use zkfund::settlement::{Controller, ControllerConfig, SettlementError, SharedController};

// =============================================================================
// Test Helpers
// =============================================================================

fn shared() -> SharedController<FundingContract, ReplayProofSystem> {
    SharedController::new(
        Controller::deploy(
            Identity::named("funding"),
            FundingContract,
            ReplayProofSystem::new(),
            ControllerConfig::default(),
        )
        .unwrap(),
    )
}

fn fund(campaign_id: u64, amount: u64) -> FundingAction {
    FundingAction::Fund {
        campaign_id,
        amount,
    }
}

fn prover() -> BatchProver<FundingContract, ReplayProofSystem> {
    BatchProver::new(FundingContract, ReplayProofSystem::new())
}

// =============================================================================
// Racing Settlements
// =============================================================================

#[test]
fn test_exactly_one_racing_settlement_commits() {
    const RACERS: usize = 6;
    let controller = shared();
    for campaign_id in 0..4 {
        controller.dispatch(fund(campaign_id, 10)).unwrap();
    }

    let barrier = Barrier::new(RACERS);
    let outcomes: Vec<Result<u64, SettlementError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                scope.spawn(|| {
                    let (base, pending) = controller.snapshot_pending().unwrap();
                    let store = MapStore::new(FundingContract.layout()).unwrap();
                    let batch = prover().prove(&store, &base, &pending).unwrap();
                    barrier.wait();
                    controller
                        .settle(&batch.attestation)
                        .map(|receipt| receipt.num_actions)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let committed: Vec<_> = outcomes.iter().filter(|o| o.is_ok()).collect();
    assert_eq!(committed.len(), 1);
    assert!(matches!(committed[0], Ok(4)));
    assert!(outcomes
        .iter()
        .filter_map(|o| o.as_ref().err())
        .all(|e| matches!(e, SettlementError::StaleBase { .. })));
    assert!(controller.pending_actions().unwrap().is_empty());
}

#[test]
fn test_concurrent_dispatch_keeps_every_action() {
    const WRITERS: u64 = 4;
    const PER_WRITER: u64 = 8;
    let controller = shared();

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let controller = controller.clone();
            scope.spawn(move || {
                for i in 0..PER_WRITER {
                    controller.dispatch(fund(writer, i + 1)).unwrap();
                }
            });
        }
    });

    let (base, pending) = controller.snapshot_pending().unwrap();
    assert_eq!(pending.len() as u64, WRITERS * PER_WRITER);

    let store = MapStore::new(FundingContract.layout()).unwrap();
    let batch = prover().prove(&store, &base, &pending).unwrap();
    let receipt = controller.settle(&batch.attestation).unwrap();

    // 1 + 2 + ... + 8 per writer
    assert_eq!(receipt.summary.total_funded, WRITERS * 36);
    assert_eq!(
        controller.current_action_state(),
        batch.attestation.final_state().actions
    );
}

#[test]
fn test_dispatch_after_proving_forces_rebuild() {
    let controller = shared();
    controller.dispatch(fund(1, 10)).unwrap();
    let (base, pending) = controller.snapshot_pending().unwrap();
    let store = MapStore::new(FundingContract.layout()).unwrap();
    let batch = prover().prove(&store, &base, &pending).unwrap();

    controller.dispatch(fund(2, 20)).unwrap();
    let err = controller.settle(&batch.attestation).unwrap_err();
    assert!(err.is_stale());

    let (base, pending) = controller.snapshot_pending().unwrap();
    let rebuilt = prover().prove(&store, &base, &pending).unwrap();
    controller.settle(&rebuilt.attestation).unwrap();
    assert_eq!(controller.with(|c| c.log().len()), 2);
}

// =============================================================================
// Resumable Folding
// =============================================================================

#[test]
fn test_snapshot_resumes_on_another_thread() {
    let controller = shared();
    let actions: Vec<_> = (0..6).map(|i| fund(i % 3, 100 + i)).collect();
    for action in &actions {
        controller.dispatch(action.clone()).unwrap();
    }
    let (base, pending) = controller.snapshot_pending().unwrap();
    let store = MapStore::new(FundingContract.layout()).unwrap();

    let prover = prover();
    let mut session = prover.begin(store.clone(), base.clone()).unwrap();
    session.extend(&pending[..3]).unwrap();
    let json = serde_json::to_string(&session.snapshot()).unwrap();
    let batch_id = session.batch_id();
    drop(session);

    let resumed = thread::spawn(move || {
        let snapshot: FoldSnapshot<FundingSummary> = serde_json::from_str(&json).unwrap();
        let prover = BatchProver::new(FundingContract, ReplayProofSystem::new());
        let mut session = prover.resume(snapshot).unwrap();
        session.extend(&pending[3..]).unwrap();
        session.finish().unwrap()
    })
    .join()
    .unwrap();

    let one_shot = prover.prove(&store, &base, &actions).unwrap();
    assert_eq!(resumed.metadata.batch_id, batch_id);
    assert_eq!(resumed.attestation.public, one_shot.attestation.public);
    controller.settle(&resumed.attestation).unwrap();
}

#[test]
fn test_snapshot_with_desynced_store_refused() {
    let prover = prover();
    let base = zkfund::fold::CommittedState::genesis(FundingContract.layout());
    let store = MapStore::new(FundingContract.layout()).unwrap();

    let mut session = prover.begin(store, base).unwrap();
    session.push(&fund(1, 10)).unwrap();
    let mut snapshot = session.snapshot();
    snapshot.store = MapStore::new(FundingContract.layout()).unwrap();

    assert!(prover.resume(snapshot).is_err());
}
