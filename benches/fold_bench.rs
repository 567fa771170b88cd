//! zkfund benchmarks using Criterion
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use zkfund::contracts::{FundingAction, FundingContract};
use zkfund::fold::{
    AttesterProofSystem, BatchProver, CommittedState, Contract, MapStore, ProofSystem,
    ReplayProofSystem, SparseMerkleTree,
};
use zkfund::primitives::{Digest, Identity};
use zkfund::settlement::{Controller, ControllerConfig};

fn contributions(n: u64) -> Vec<FundingAction> {
    (0..n)
        .map(|i| FundingAction::Fund {
            campaign_id: i % 64,
            amount: 1 + i,
        })
        .collect()
}

fn genesis() -> (MapStore, CommittedState) {
    let layout = FundingContract.layout();
    (
        MapStore::new(layout).expect("layout is valid"),
        CommittedState::genesis(layout),
    )
}

fn bench_tree_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_tree");

    for height in [8u8, 16, 32].iter() {
        group.bench_with_input(BenchmarkId::new("insert", height), height, |b, &height| {
            let mut tree = SparseMerkleTree::new(height).expect("height is valid");
            let mut index = 0u64;
            b.iter(|| {
                index = (index + 1) % 256;
                tree.insert(black_box(index), Digest::from_u64s([index, 0, 0, 0]))
                    .expect("index in range")
            })
        });

        let tree = SparseMerkleTree::from_leaves(
            *height,
            (0..256u64).map(|i| (i, Digest::from_u64s([i, 1, 0, 0]))),
        )
        .expect("leaves in range");
        let witness = tree.witness(17).expect("index in range");
        let leaf = tree.get(17).expect("index in range");
        let root = tree.root();
        group.bench_with_input(BenchmarkId::new("verify_old", height), height, |b, _| {
            b.iter(|| witness.verify_old(black_box(&root), black_box(&leaf)))
        });
    }

    group.finish();
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");

    for size in [1u64, 16, 64].iter() {
        let actions = contributions(*size);
        let (store, base) = genesis();
        group.throughput(Throughput::Elements(*size));

        let replay = BatchProver::new(FundingContract, ReplayProofSystem::new());
        group.bench_with_input(BenchmarkId::new("replay", size), &actions, |b, actions| {
            b.iter(|| replay.prove(&store, &base, black_box(actions)).expect("fold failed"))
        });

        let attester = BatchProver::new(FundingContract, AttesterProofSystem::from_secret("bench"));
        group.bench_with_input(BenchmarkId::new("attester", size), &actions, |b, actions| {
            b.iter(|| attester.prove(&store, &base, black_box(actions)).expect("fold failed"))
        });
    }

    group.finish();
}

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification");

    for size in [16u64, 64].iter() {
        let (store, base) = genesis();
        let proofs = ReplayProofSystem::new();
        let batch = BatchProver::new(FundingContract, proofs)
            .prove(&store, &base, &contributions(*size))
            .expect("fold failed");

        group.throughput(Throughput::Bytes(batch.attestation.proof.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("replay", size),
            &batch.attestation,
            |b, attestation| {
                b.iter(|| {
                    proofs
                        .verify(&FundingContract, black_box(attestation))
                        .expect("verification failed")
                })
            },
        );
    }

    group.finish();
}

fn bench_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle");

    let actions = contributions(32);
    group.throughput(Throughput::Elements(actions.len() as u64));
    group.bench_function("dispatch_prove_settle", |b| {
        b.iter(|| {
            let mut controller = Controller::deploy(
                Identity::named("bench"),
                FundingContract,
                ReplayProofSystem::new(),
                ControllerConfig::default(),
            )
            .expect("config is valid");
            for action in &actions {
                controller.dispatch(action.clone()).expect("dispatch failed");
            }
            let (store, base) = genesis();
            let pending = controller.pending_actions().expect("log is consistent");
            let batch = BatchProver::new(FundingContract, ReplayProofSystem::new())
                .prove(&store, &base, &pending)
                .expect("fold failed");
            controller.settle(&batch.attestation).expect("settlement failed")
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tree_updates,
    bench_fold,
    bench_verification,
    bench_settle,
);

criterion_main!(benches);
