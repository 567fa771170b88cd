//! Funding contract
//!
//! Backers add to a per-campaign total; the campaign owner claims it once.
//! Claims only enter the log through a capability on the campaign controller:
//! the funding controller refuses a bare `Claim` and checks ownership against
//! the campaign's committed owners map before logging one.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkfund_fold::{
    Action, ActionState, Contract, DispatchViolation, FoldError, FoldResult, MapId, MapSpec,
    MapWitness, PendingActions, ProofSystem, Slot, SlotAccess, Summary,
};
use zkfund_primitives::{felt_from_u64, hash_to_felts, is_canonical, Felt, Identity};
use zkfund_settlement::{
    Controller, PeerCapability, ReferenceCheck, RoleTag, SettlementError, SettlementResult,
};

use crate::campaign::{CampaignContract, CampaignView, CAMPAIGN_ROLE};

pub const TOTALS: MapId = MapId(0);
pub const CLAIMS: MapId = MapId(1);

const LAYOUT: &[MapSpec] = &[MapSpec::new("totals", 16), MapSpec::new("claims", 16)];

const TOTAL_SLOT: Slot<u64, u64> = Slot::new(TOTALS);
const CLAIM_SLOT: Slot<u64, Identity> = Slot::new(CLAIMS);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FundingAction {
    Fund { campaign_id: u64, amount: u64 },
    Claim { campaign_id: u64, claimant: Identity },
}

impl Action for FundingAction {
    fn to_elements(&self) -> Vec<Felt> {
        match self {
            Self::Fund {
                campaign_id,
                amount,
            } => vec![felt_from_u64(0), felt_from_u64(*campaign_id), felt_from_u64(*amount)],
            Self::Claim {
                campaign_id,
                claimant,
            } => {
                let mut elements = vec![felt_from_u64(1), felt_from_u64(*campaign_id)];
                elements.extend_from_slice(&hash_to_felts(claimant.as_hash()));
                elements
            }
        }
    }
}

/// Aggregates reported with every settlement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSummary {
    pub contributions: u64,
    pub total_funded: u64,
    pub claims: u64,
    pub total_claimed: u64,
}

impl Summary for FundingSummary {
    fn to_elements(&self) -> Vec<Felt> {
        vec![
            felt_from_u64(self.contributions),
            felt_from_u64(self.total_funded),
            felt_from_u64(self.claims),
            felt_from_u64(self.total_claimed),
        ]
    }
}

fn add_amount(total: u64, amount: u64) -> FoldResult<u64> {
    total
        .checked_add(amount)
        .filter(|sum| is_canonical(*sum))
        .ok_or_else(|| FoldError::InvalidTransition(format!("amount {amount} overflows total {total}")))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundingContract;

impl Contract for FundingContract {
    type Action = FundingAction;
    type Summary = FundingSummary;

    fn name(&self) -> &'static str {
        "funding"
    }

    fn layout(&self) -> &'static [MapSpec] {
        LAYOUT
    }

    fn check_dispatch(
        &self,
        action: &FundingAction,
        pending: &PendingActions<'_, FundingAction>,
    ) -> Result<(), DispatchViolation> {
        match action {
            FundingAction::Fund { amount: 0, .. } => Err(DispatchViolation::Rejected(
                "contribution must be positive".to_string(),
            )),
            FundingAction::Fund { .. } => Ok(()),
            FundingAction::Claim { campaign_id, .. } => {
                let clash = pending.iter().any(|other| {
                    matches!(other, FundingAction::Claim { campaign_id: c, .. } if c == campaign_id)
                });
                if clash {
                    return Err(DispatchViolation::DuplicatePendingKey(format!(
                        "claim on campaign {campaign_id}"
                    )));
                }
                Ok(())
            }
        }
    }

    fn requires_reference(&self, action: &FundingAction) -> bool {
        matches!(action, FundingAction::Claim { .. })
    }

    fn apply<S: SlotAccess>(
        &self,
        action: &FundingAction,
        summary: &mut FundingSummary,
        slots: &mut S,
    ) -> FoldResult<()> {
        match action {
            FundingAction::Fund {
                campaign_id,
                amount,
            } => {
                if *amount == 0 {
                    return Err(FoldError::InvalidTransition(
                        "contribution must be positive".to_string(),
                    ));
                }
                TOTAL_SLOT.update(slots, campaign_id, |total| add_amount(total.unwrap_or(0), *amount))?;
                summary.contributions += 1;
                summary.total_funded = add_amount(summary.total_funded, *amount)?;
            }
            FundingAction::Claim {
                campaign_id,
                claimant,
            } => {
                let total = TOTAL_SLOT.read(slots, campaign_id)?.unwrap_or(0);
                if total == 0 {
                    return Err(FoldError::InvalidTransition(format!(
                        "campaign {campaign_id} has nothing to claim"
                    )));
                }
                CLAIM_SLOT.assign(slots, campaign_id, claimant)?;
                summary.claims += 1;
                summary.total_claimed = add_amount(summary.total_claimed, total)?;
            }
        }
        Ok(())
    }
}

impl<PC> ReferenceCheck<Controller<CampaignContract, PC>> for FundingContract
where
    PC: ProofSystem<CampaignContract>,
{
    /// Path for the claimed campaign in the campaign owners map
    type Evidence = MapWitness;

    fn peer_role(&self) -> RoleTag {
        CAMPAIGN_ROLE
    }

    fn authorize(
        &self,
        campaigns: &Controller<CampaignContract, PC>,
        action: &FundingAction,
        owner_witness: &MapWitness,
    ) -> SettlementResult<()> {
        let FundingAction::Claim {
            campaign_id,
            claimant,
        } = action
        else {
            return Ok(());
        };
        if !campaigns.is_owner(*campaign_id, claimant, owner_witness)? {
            return Err(SettlementError::cross_reference(format!(
                "{claimant} does not own campaign {campaign_id}"
            )));
        }
        debug!(campaign_id, %claimant, "claim authorised by campaign controller");
        Ok(())
    }
}

/// Dispatch a claim for `claimant` on `campaign_id`
///
/// `campaigns` must have been validated against the funding controller's
/// registry under `CAMPAIGN_ROLE`; `owner_witness` is the path for
/// `campaign_id` in the campaign owners map.
pub fn dispatch_claim<PF, PC>(
    funding: &mut Controller<FundingContract, PF>,
    campaigns: &PeerCapability<'_, Controller<CampaignContract, PC>>,
    owner_witness: &MapWitness,
    campaign_id: u64,
    claimant: Identity,
) -> SettlementResult<ActionState>
where
    PF: ProofSystem<FundingContract>,
    PC: ProofSystem<CampaignContract>,
{
    funding.dispatch_referenced(
        campaigns,
        FundingAction::Claim {
            campaign_id,
            claimant,
        },
        owner_witness,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkfund_fold::{BatchProver, CommittedState, LeafValue, MapStore, ReplayProofSystem};
    use zkfund_primitives::GOLDILOCKS_PRIME;
    use zkfund_settlement::ControllerConfig;

    fn prove(actions: &[FundingAction]) -> FoldResult<zkfund_fold::PreparedBatch<FundingSummary>> {
        BatchProver::new(FundingContract, ReplayProofSystem::new()).prove(
            &MapStore::new(LAYOUT).unwrap(),
            &CommittedState::genesis(LAYOUT),
            actions,
        )
    }

    #[test]
    fn test_totals_accumulate() {
        let batch = prove(&[
            FundingAction::Fund { campaign_id: 3, amount: 40 },
            FundingAction::Fund { campaign_id: 3, amount: 2 },
            FundingAction::Fund { campaign_id: 1, amount: 5 },
        ])
        .unwrap();

        let totals = batch.store.tree(TOTALS).unwrap();
        assert_eq!(totals.get(3).unwrap(), 42u64.to_leaf());
        assert_eq!(
            batch.attestation.summary(),
            &FundingSummary {
                contributions: 3,
                total_funded: 47,
                claims: 0,
                total_claimed: 0,
            }
        );
    }

    #[test]
    fn test_claim_requires_funds() {
        let err = prove(&[FundingAction::Claim {
            campaign_id: 0,
            claimant: Identity::named("alice"),
        }])
        .unwrap_err();
        assert!(matches!(err, FoldError::InvalidTransition(_)));
    }

    #[test]
    fn test_claim_is_single_assignment() {
        let claim = FundingAction::Claim {
            campaign_id: 0,
            claimant: Identity::named("alice"),
        };
        let err = prove(&[
            FundingAction::Fund { campaign_id: 0, amount: 1 },
            claim.clone(),
            claim,
        ])
        .unwrap_err();
        assert_eq!(err, FoldError::SlotOccupied { map: CLAIMS, index: 0 });
    }

    #[test]
    fn test_total_stays_below_field_modulus() {
        assert!(add_amount(GOLDILOCKS_PRIME - 2, 1).is_ok());
        assert!(add_amount(GOLDILOCKS_PRIME - 1, 1).is_err());
        assert!(add_amount(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_bare_claim_refused_by_controller() {
        let mut funding = Controller::deploy(
            Identity::named("funding"),
            FundingContract,
            ReplayProofSystem::new(),
            ControllerConfig::local(),
        )
        .unwrap();
        funding.dispatch(FundingAction::Fund { campaign_id: 0, amount: 5 }).unwrap();

        let err = funding
            .dispatch(FundingAction::Claim {
                campaign_id: 0,
                claimant: Identity::named("mallory"),
            })
            .unwrap_err();
        assert!(matches!(err, SettlementError::ReferenceRequired { contract: "funding" }));
        assert_eq!(funding.log().len(), 1);
    }

    #[test]
    fn test_capability_from_foreign_registry_refused() {
        let campaigns = Controller::deploy(
            Identity::named("campaigns"),
            CampaignContract::default(),
            ReplayProofSystem::new(),
            ControllerConfig::local(),
        )
        .unwrap();
        let mut funding = Controller::deploy_with_peers(
            Identity::named("funding"),
            FundingContract,
            ReplayProofSystem::new(),
            ControllerConfig::local(),
            &[(CAMPAIGN_ROLE, Identity::named("campaigns"))],
        )
        .unwrap();
        // a controller that vouches for the campaigns under its own registry
        let rogue = Controller::deploy_with_peers(
            Identity::named("rogue"),
            FundingContract,
            ReplayProofSystem::new(),
            ControllerConfig::local(),
            &[(CAMPAIGN_ROLE, Identity::named("campaigns")), (RoleTag(9), Identity::named("x"))],
        )
        .unwrap();
        let witness = rogue.registry_witness(CAMPAIGN_ROLE).unwrap();
        let capability = rogue.resolve_peer(CAMPAIGN_ROLE, &campaigns, &witness).unwrap();
        let owner_witness = MapStore::new(CampaignContract::default().layout())
            .unwrap()
            .tree(crate::campaign::OWNERS)
            .unwrap()
            .witness(0)
            .unwrap();

        let err = dispatch_claim(&mut funding, &capability, &owner_witness, 0, Identity::named("alice"))
            .unwrap_err();
        assert!(matches!(err, SettlementError::CrossReference(_)));
        assert!(funding.log().is_empty());
    }

    #[test]
    fn test_zero_contribution_rejected_at_dispatch() {
        let pending = PendingActions::new(&[]);
        assert!(FundingContract
            .check_dispatch(&FundingAction::Fund { campaign_id: 0, amount: 0 }, &pending)
            .is_err());
    }
}
