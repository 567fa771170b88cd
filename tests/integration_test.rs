//! End-to-end tests for zkfund
//!
//! Dispatch -> fold -> settle across the campaign and funding controllers,
//! including cross-contract claims.

use zkfund::contracts::campaign::{OWNERS, STATUS};
use zkfund::contracts::{
    dispatch_claim, CampaignAction, CampaignContract, CampaignStatus, CampaignView, FundingAction,
    FundingContract, FundingSummary, CAMPAIGN_ROLE, UNASSIGNED_ID,
};
use zkfund::fold::{
    ActionState, BatchProver, Contract, LeafValue, MapStore, ProofSystem, ReplayProofSystem,
    SparseMerkleTree,
};
use zkfund::primitives::{Digest, Identity};
use zkfund::settlement::{
    Controller, ControllerConfig, ControllerEvent, RoleTag, SettlementReceipt,
};

// =============================================================================
// Test Helpers
// =============================================================================

struct Deployment<C: Contract> {
    controller: Controller<C, ReplayProofSystem>,
    prover: BatchProver<C, ReplayProofSystem>,
    store: MapStore,
}

impl<C: Contract + Clone> Deployment<C> {
    fn new(label: &str, contract: C) -> Self {
        Self::with_peers(label, contract, &[])
    }

    fn with_peers(label: &str, contract: C, peers: &[(RoleTag, Identity)]) -> Self {
        Self {
            controller: Controller::deploy_with_peers(
                Identity::named(label),
                contract.clone(),
                ReplayProofSystem::new(),
                ControllerConfig::default(),
                peers,
            )
            .unwrap(),
            prover: BatchProver::new(contract.clone(), ReplayProofSystem::new()),
            store: MapStore::new(contract.layout()).unwrap(),
        }
    }

    fn settle_pending(&mut self) -> SettlementReceipt<C::Summary> {
        let pending = self.controller.pending_actions().unwrap();
        let batch = self
            .prover
            .prove(&self.store, self.controller.committed_state(), &pending)
            .unwrap();
        let receipt = self.controller.settle(&batch.attestation).unwrap();
        self.store = batch.store;
        receipt
    }
}

/// Funding controller with "campaigns" bound under the campaign role
fn funding_deployment() -> Deployment<FundingContract> {
    Deployment::with_peers(
        "funding",
        FundingContract,
        &[(CAMPAIGN_ROLE, Identity::named("campaigns"))],
    )
}

fn create(owner: &Identity) -> CampaignAction {
    CampaignAction::Create {
        id: UNASSIGNED_ID,
        metadata: Digest::from_u64s([1, 2, 3, 4]),
        owner: *owner,
        committee: Digest::from_u64s([5, 6, 7, 8]),
    }
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_alice_then_bob_get_ids_in_fold_order() {
    let alice = Identity::named("alice");
    let bob = Identity::named("bob");
    let mut campaigns = Deployment::new("campaigns", CampaignContract::default());

    let alice_create = create(&alice);
    let bob_create = create(&bob);
    campaigns.controller.dispatch(alice_create.clone()).unwrap();
    campaigns.controller.dispatch(bob_create.clone()).unwrap();
    let receipt = campaigns.settle_pending();

    let expected_owners =
        SparseMerkleTree::from_leaves(16, vec![(0, alice.digest()), (1, bob.digest())]).unwrap();
    assert_eq!(
        campaigns.controller.current_map_roots().get(OWNERS).unwrap(),
        expected_owners.root()
    );
    assert_eq!(
        campaigns.controller.current_action_state(),
        ActionState::genesis().append(&alice_create).append(&bob_create)
    );
    assert_eq!(receipt.summary.created, 2);

    let witness = campaigns.store.tree(OWNERS).unwrap().witness(1).unwrap();
    assert!(campaigns.controller.is_owner(1, &bob, &witness).unwrap());
    assert!(!campaigns.controller.is_owner(1, &alice, &witness).unwrap());
}

#[test]
fn test_campaign_lifecycle_over_several_batches() {
    let owner = Identity::named("carol");
    let mut campaigns = Deployment::new("campaigns", CampaignContract::default());

    campaigns.controller.dispatch(create(&owner)).unwrap();
    campaigns.settle_pending();

    for (from, to) in [
        (CampaignStatus::Created, CampaignStatus::Active),
        (CampaignStatus::Active, CampaignStatus::Ended),
    ] {
        campaigns
            .controller
            .dispatch(CampaignAction::SetStatus { campaign_id: 0, from, to })
            .unwrap();
        campaigns.settle_pending();
    }

    let witness = campaigns.store.tree(STATUS).unwrap().witness(0).unwrap();
    assert!(campaigns
        .controller
        .has_status(0, CampaignStatus::Ended, &witness)
        .unwrap());
    assert_eq!(
        campaigns.store.tree(STATUS).unwrap().get(0).unwrap(),
        CampaignStatus::Ended.to_leaf()
    );
}

#[test]
fn test_fund_and_claim_through_campaign_reference() {
    let owner = Identity::named("dana");
    let mut campaigns = Deployment::new("campaigns", CampaignContract::default());
    let mut funding = funding_deployment();

    campaigns.controller.dispatch(create(&owner)).unwrap();
    campaigns.settle_pending();

    for amount in [25, 75] {
        funding
            .controller
            .dispatch(FundingAction::Fund { campaign_id: 0, amount })
            .unwrap();
    }
    funding.settle_pending();

    let registry_witness = funding.controller.registry_witness(CAMPAIGN_ROLE).unwrap();
    let capability = funding
        .controller
        .resolve_peer(CAMPAIGN_ROLE, &campaigns.controller, &registry_witness)
        .unwrap();
    let owner_witness = campaigns.store.tree(OWNERS).unwrap().witness(0).unwrap();
    dispatch_claim(&mut funding.controller, &capability, &owner_witness, 0, owner).unwrap();

    funding.controller.drain_events();
    let receipt = funding.settle_pending();
    assert_eq!(
        receipt.summary,
        FundingSummary {
            contributions: 0,
            total_funded: 0,
            claims: 1,
            total_claimed: 100,
        }
    );

    let events = funding.controller.drain_events();
    assert!(matches!(
        events.last(),
        Some(ControllerEvent::Settled { num_actions: 1, summary, .. }) if summary.total_claimed == 100
    ));
}

#[test]
fn test_claim_by_non_owner_is_refused_before_dispatch() {
    let owner = Identity::named("erin");
    let mallory = Identity::named("mallory");
    let mut campaigns = Deployment::new("campaigns", CampaignContract::default());
    let mut funding = funding_deployment();

    campaigns.controller.dispatch(create(&owner)).unwrap();
    campaigns.settle_pending();

    let registry_witness = funding.controller.registry_witness(CAMPAIGN_ROLE).unwrap();
    let capability = funding
        .controller
        .resolve_peer(CAMPAIGN_ROLE, &campaigns.controller, &registry_witness)
        .unwrap();
    let owner_witness = campaigns.store.tree(OWNERS).unwrap().witness(0).unwrap();

    assert!(dispatch_claim(&mut funding.controller, &capability, &owner_witness, 0, mallory).is_err());
    assert!(funding.controller.pending_actions().unwrap().is_empty());
}

#[test]
fn test_unsettled_campaign_cannot_be_claimed() {
    let owner = Identity::named("frank");
    let mut campaigns = Deployment::new("campaigns", CampaignContract::default());
    let mut funding = funding_deployment();

    // dispatched but not settled: the committed owners map is still empty
    campaigns.controller.dispatch(create(&owner)).unwrap();
    let mut shadow = campaigns.store.clone();
    shadow
        .tree_mut(OWNERS)
        .unwrap()
        .insert(0, owner.digest())
        .unwrap();

    let registry_witness = funding.controller.registry_witness(CAMPAIGN_ROLE).unwrap();
    let capability = funding
        .controller
        .resolve_peer(CAMPAIGN_ROLE, &campaigns.controller, &registry_witness)
        .unwrap();
    let owner_witness = shadow.tree(OWNERS).unwrap().witness(0).unwrap();

    assert!(dispatch_claim(&mut funding.controller, &capability, &owner_witness, 0, owner).is_err());
}

#[test]
fn test_settled_attestation_verifies_independently() {
    let mut campaigns = Deployment::new("campaigns", CampaignContract::default());
    campaigns.controller.dispatch(create(&Identity::named("gina"))).unwrap();
    let pending = campaigns.controller.pending_actions().unwrap();
    let batch = campaigns
        .prover
        .prove(&campaigns.store, campaigns.controller.committed_state(), &pending)
        .unwrap();

    assert!(ReplayProofSystem::new()
        .verify(&CampaignContract::default(), &batch.attestation)
        .is_ok());
    assert_eq!(batch.metadata.proof_system, "replay");
    assert_eq!(batch.metadata.proof_hash, batch.attestation.proof_hash().to_hex());
}
