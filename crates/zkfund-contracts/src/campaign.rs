//! Campaign contract
//!
//! Campaigns get sequential ids from a counter slot. Creating one
//! single-assigns its owner, metadata and committee digests and sets its
//! status to `Created`; afterwards only the status moves, forward only.

use std::fmt;

use serde::{Deserialize, Serialize};
use zkfund_fold::{
    Action, Contract, DispatchViolation, FoldError, FoldResult, LeafValue, MapId, MapSpec,
    MapWitness, PendingActions, ProofSystem, Slot, SlotAccess, Summary,
};
use zkfund_primitives::{felt_from_bool, felt_from_u64, hash_to_felts, Digest, Felt, Identity};
use zkfund_settlement::{Controller, RoleTag, SettlementResult};

/// Registry role under which peers reference the campaign controller
pub const CAMPAIGN_ROLE: RoleTag = RoleTag(1);

/// Id placeholder for creates numbered at fold time
pub const UNASSIGNED_ID: i64 = -1;

pub const OWNERS: MapId = MapId(0);
pub const METADATA: MapId = MapId(1);
pub const COMMITTEES: MapId = MapId(2);
pub const STATUS: MapId = MapId(3);
pub const COUNTERS: MapId = MapId(4);

/// Counter slot holding the next campaign id
const NEXT_ID: u64 = 0;

const LAYOUT: &[MapSpec] = &[
    MapSpec::new("owners", 16),
    MapSpec::new("metadata", 16),
    MapSpec::new("committees", 16),
    MapSpec::new("status", 16),
    MapSpec::new("counters", 4),
];

const OWNER_SLOT: Slot<u64, Identity> = Slot::new(OWNERS);
const METADATA_SLOT: Slot<u64, Digest> = Slot::new(METADATA);
const COMMITTEE_SLOT: Slot<u64, Digest> = Slot::new(COMMITTEES);
const STATUS_SLOT: Slot<u64, CampaignStatus> = Slot::new(STATUS);
const COUNTER_SLOT: Slot<u64, u64> = Slot::new(COUNTERS);

/// Lifecycle of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Created,
    Active,
    Ended,
    Cancelled,
}

impl CampaignStatus {
    fn code(self) -> u64 {
        match self {
            Self::Created => 1,
            Self::Active => 2,
            Self::Ended => 3,
            Self::Cancelled => 4,
        }
    }

    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Created),
            2 => Some(Self::Active),
            3 => Some(Self::Ended),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }

    /// `Created -> Active -> Ended`, or any non-terminal status to `Cancelled`
    pub fn can_move_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Created, Self::Active) | (Self::Active, Self::Ended) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl LeafValue for CampaignStatus {
    fn to_leaf(&self) -> Digest {
        self.code().to_leaf()
    }

    fn from_leaf(leaf: &Digest) -> Option<Self> {
        u64::from_leaf(leaf).and_then(Self::from_code)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CampaignAction {
    /// `id` is `UNASSIGNED_ID` or the id the counter will hand out next
    Create {
        id: i64,
        metadata: Digest,
        owner: Identity,
        committee: Digest,
    },
    SetStatus {
        campaign_id: u64,
        from: CampaignStatus,
        to: CampaignStatus,
    },
}

impl Action for CampaignAction {
    fn to_elements(&self) -> Vec<Felt> {
        let mut elements = Vec::new();
        match self {
            Self::Create {
                id,
                metadata,
                owner,
                committee,
            } => {
                elements.push(felt_from_u64(0));
                elements.push(felt_from_bool(*id >= 0));
                elements.push(felt_from_u64((*id).max(0) as u64));
                elements.extend_from_slice(metadata.as_elements());
                elements.extend_from_slice(&hash_to_felts(owner.as_hash()));
                elements.extend_from_slice(committee.as_elements());
            }
            Self::SetStatus {
                campaign_id,
                from,
                to,
            } => {
                elements.push(felt_from_u64(1));
                elements.push(felt_from_u64(*campaign_id));
                elements.push(felt_from_u64(from.code()));
                elements.push(felt_from_u64(to.code()));
            }
        }
        elements
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub created: u64,
    pub status_changes: u64,
}

impl Summary for CampaignSummary {
    fn to_elements(&self) -> Vec<Felt> {
        vec![felt_from_u64(self.created), felt_from_u64(self.status_changes)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignContract {
    /// Unsettled creates allowed per owner
    pub max_pending_per_owner: usize,
}

impl Default for CampaignContract {
    fn default() -> Self {
        Self {
            max_pending_per_owner: 4,
        }
    }
}

impl Contract for CampaignContract {
    type Action = CampaignAction;
    type Summary = CampaignSummary;

    fn name(&self) -> &'static str {
        "campaign"
    }

    fn layout(&self) -> &'static [MapSpec] {
        LAYOUT
    }

    fn check_dispatch(
        &self,
        action: &CampaignAction,
        pending: &PendingActions<'_, CampaignAction>,
    ) -> Result<(), DispatchViolation> {
        match action {
            CampaignAction::Create { id, owner, .. } => {
                if *id < UNASSIGNED_ID {
                    return Err(DispatchViolation::Rejected(format!("invalid campaign id {id}")));
                }
                let queued = pending
                    .iter()
                    .filter(|other| matches!(other, CampaignAction::Create { owner: o, .. } if o == owner))
                    .count();
                if queued >= self.max_pending_per_owner {
                    return Err(DispatchViolation::QuotaExceeded {
                        key: owner.to_string(),
                        limit: self.max_pending_per_owner,
                    });
                }
            }
            CampaignAction::SetStatus {
                campaign_id,
                from,
                to,
            } => {
                if !from.can_move_to(*to) {
                    return Err(DispatchViolation::Rejected(format!(
                        "campaign status cannot move from {from} to {to}"
                    )));
                }
                let clash = pending.iter().any(|other| {
                    matches!(other, CampaignAction::SetStatus { campaign_id: c, .. } if c == campaign_id)
                });
                if clash {
                    return Err(DispatchViolation::DuplicatePendingKey(format!(
                        "status of campaign {campaign_id}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn apply<S: SlotAccess>(
        &self,
        action: &CampaignAction,
        summary: &mut CampaignSummary,
        slots: &mut S,
    ) -> FoldResult<()> {
        match action {
            CampaignAction::Create {
                id,
                metadata,
                owner,
                committee,
            } => {
                let requested = *id;
                let next = COUNTER_SLOT.update(slots, &NEXT_ID, |current| {
                    let assigned = current.unwrap_or(0);
                    if requested != UNASSIGNED_ID && requested as u64 != assigned {
                        return Err(FoldError::InvalidTransition(format!(
                            "campaign id {requested} requested, next id is {assigned}"
                        )));
                    }
                    Ok(assigned + 1)
                })?;
                let campaign_id = next - 1;

                OWNER_SLOT.assign(slots, &campaign_id, owner)?;
                METADATA_SLOT.assign(slots, &campaign_id, metadata)?;
                COMMITTEE_SLOT.assign(slots, &campaign_id, committee)?;
                STATUS_SLOT.assign(slots, &campaign_id, &CampaignStatus::Created)?;
                summary.created += 1;
            }
            CampaignAction::SetStatus {
                campaign_id,
                from,
                to,
            } => {
                STATUS_SLOT.update(slots, campaign_id, |current| match current {
                    Some(status) if status == *from && from.can_move_to(*to) => Ok(*to),
                    Some(status) => Err(FoldError::InvalidTransition(format!(
                        "campaign {campaign_id} is {status}, cannot move {from} -> {to}"
                    ))),
                    None => Err(FoldError::InvalidTransition(format!(
                        "campaign {campaign_id} does not exist"
                    ))),
                })?;
                summary.status_changes += 1;
            }
        }
        Ok(())
    }
}

/// Witness-taking views over a campaign controller's committed maps
pub trait CampaignView {
    /// Whether `owner` owns `campaign_id`; `witness` is the owners-map path
    fn is_owner(&self, campaign_id: u64, owner: &Identity, witness: &MapWitness) -> SettlementResult<bool>;

    /// Whether `campaign_id` currently has `status`
    fn has_status(
        &self,
        campaign_id: u64,
        status: CampaignStatus,
        witness: &MapWitness,
    ) -> SettlementResult<bool>;
}

impl<P: ProofSystem<CampaignContract>> CampaignView for Controller<CampaignContract, P> {
    fn is_owner(&self, campaign_id: u64, owner: &Identity, witness: &MapWitness) -> SettlementResult<bool> {
        Ok(witness.index() == campaign_id && self.leaf_equals(OWNERS, witness, &owner.digest())?)
    }

    fn has_status(
        &self,
        campaign_id: u64,
        status: CampaignStatus,
        witness: &MapWitness,
    ) -> SettlementResult<bool> {
        Ok(witness.index() == campaign_id && self.leaf_equals(STATUS, witness, &status.to_leaf())?)
    }
}
