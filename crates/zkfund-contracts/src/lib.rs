//! Reference contracts for zkfund
//!
//! Two contracts exercise the settlement core end to end:
//!
//! - [`campaign`]: sequentially numbered campaigns with single-assigned
//!   owner, metadata and committee slots and a forward-only status
//! - [`funding`]: additive per-campaign totals and single-assignment claims,
//!   authorised through a cross-contract reference to the campaign controller

pub mod campaign;
pub mod funding;

pub use campaign::{
    CampaignAction, CampaignContract, CampaignStatus, CampaignSummary, CampaignView, CAMPAIGN_ROLE,
    UNASSIGNED_ID,
};
pub use funding::{dispatch_claim, FundingAction, FundingContract, FundingSummary};
