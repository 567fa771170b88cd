//! Error types for settlement and cross-contract references

use thiserror::Error;
use zkfund_fold::{ActionState, DispatchViolation, FoldError};

use crate::config::ConfigError;
use crate::registry::RoleTag;

/// Errors raised by a controller; all of them leave committed state untouched
#[derive(Debug, Error)]
pub enum SettlementError {
    /// The proof system did not accept the attestation
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// The attestation was built on a state that is no longer committed
    #[error("Stale base: attestation starts at {attested}, controller is at {committed}")]
    StaleBase {
        committed: ActionState,
        attested: ActionState,
    },

    /// The attestation does not end at this controller's log tip
    #[error("Log divergence: attestation ends at {attested}, log tip is {tip}")]
    LogDivergence { tip: ActionState, attested: ActionState },

    /// An identity attestation settles nothing
    #[error("Attestation folds no actions")]
    EmptyAttestation,

    /// The attestation folds more actions than the controller accepts at once
    #[error("Batch size {size} exceeds maximum {max}")]
    BatchTooLarge { size: u64, max: usize },

    /// Too many actions are waiting for settlement
    #[error("Pending action limit of {limit} reached")]
    PendingLimit { limit: usize },

    /// A dispatch-time scan rejected the action
    #[error("Dispatch rejected: {0}")]
    Dispatch(#[from] DispatchViolation),

    /// The registry witness speaks for a different role
    #[error("Role mismatch: expected {expected}, witness is for slot {actual}")]
    RoleMismatch { expected: RoleTag, actual: u64 },

    /// The peer's identity is not registered under the role
    #[error("Peer is not registered as {role}")]
    UnregisteredPeer { role: RoleTag },

    /// The action needs a peer capability and came in without one
    #[error("{contract} action must be dispatched through a peer reference")]
    ReferenceRequired { contract: &'static str },

    /// A view over a peer's state did not hold
    #[error("Cross-reference check failed: {0}")]
    CrossReference(String),

    /// Map, log or fold error
    #[error(transparent)]
    Fold(#[from] FoldError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for controller operations
pub type SettlementResult<T> = Result<T, SettlementError>;

impl SettlementError {
    /// Stale-base or log-divergence: the batch must be rebuilt on the new base
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleBase { .. } | Self::LogDivergence { .. })
    }

    /// A peer failed registry validation or a peer view refused the call
    pub fn is_cross_reference(&self) -> bool {
        matches!(
            self,
            Self::RoleMismatch { .. }
                | Self::UnregisteredPeer { .. }
                | Self::ReferenceRequired { .. }
                | Self::CrossReference(_)
        )
    }

    pub fn cross_reference<S: Into<String>>(msg: S) -> Self {
        Self::CrossReference(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SettlementError::UnregisteredPeer { role: RoleTag(2) };
        assert!(err.to_string().contains("role:2"));

        let err: SettlementError = DispatchViolation::Rejected("nope".to_string()).into();
        assert!(err.to_string().contains("nope"));
        assert!(!err.is_stale());
    }

    #[test]
    fn test_stale_classification() {
        let state = ActionState::genesis();
        assert!(SettlementError::StaleBase { committed: state, attested: state }.is_stale());
        assert!(SettlementError::LogDivergence { tip: state, attested: state }.is_stale());
        assert!(!SettlementError::EmptyAttestation.is_cross_reference());
        assert!(SettlementError::cross_reference("not the owner").is_cross_reference());
        assert!(SettlementError::ReferenceRequired { contract: "funding" }.is_cross_reference());
    }
}
