//! Controller events

use serde::{Deserialize, Serialize};
use zkfund_fold::{Action, ActionState, Summary};
use zkfund_primitives::{Hash256, Identity};

use crate::registry::RoleTag;

/// Observable effects of a controller, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "A: Action, S: Summary")]
pub enum ControllerEvent<A, S> {
    /// An action was appended to the log
    Dispatched {
        action: A,
        state: ActionState,
        position: usize,
    },

    /// A batch was settled
    Settled {
        state: ActionState,
        num_actions: u64,
        summary: S,
        proof_hash: Hash256,
    },

    /// A registry role was bound to a peer identity
    PeerRegistered { role: RoleTag, identity: Identity },
}

impl<A, S> ControllerEvent<A, S> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dispatched { .. } => "dispatched",
            Self::Settled { .. } => "settled",
            Self::PeerRegistered { .. } => "peer_registered",
        }
    }
}
