//! Thread-safe controller handle

use std::sync::Arc;

use parking_lot::RwLock;
use zkfund_fold::{ActionState, Attestation, CommittedState, Contract, ProofSystem};

use crate::controller::{Controller, SettlementReceipt};
use crate::error::SettlementResult;
use crate::events::ControllerEvent;
use crate::registry::{Peer, PeerCapability, ReferenceCheck};

/// Cloneable handle serialising every mutation behind one lock
///
/// Settlements racing on the same base resolve to exactly one winner; the
/// others see the winner's state and fail the stale-base check.
pub struct SharedController<C: Contract, P> {
    inner: Arc<RwLock<Controller<C, P>>>,
}

impl<C: Contract, P> Clone for SharedController<C, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, P> SharedController<C, P>
where
    C: Contract,
    P: ProofSystem<C>,
{
    pub fn new(controller: Controller<C, P>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(controller)),
        }
    }

    pub fn dispatch(&self, action: C::Action) -> SettlementResult<ActionState> {
        self.inner.write().dispatch(action)
    }

    pub fn dispatch_referenced<T: Peer>(
        &self,
        capability: &PeerCapability<'_, T>,
        action: C::Action,
        evidence: &<C as ReferenceCheck<T>>::Evidence,
    ) -> SettlementResult<ActionState>
    where
        C: ReferenceCheck<T>,
    {
        self.inner.write().dispatch_referenced(capability, action, evidence)
    }

    pub fn settle(
        &self,
        attestation: &Attestation<C::Summary>,
    ) -> SettlementResult<SettlementReceipt<C::Summary>> {
        self.inner.write().settle(attestation)
    }

    pub fn committed_state(&self) -> CommittedState {
        self.inner.read().committed_state().clone()
    }

    pub fn current_action_state(&self) -> ActionState {
        self.inner.read().current_action_state()
    }

    pub fn pending_actions(&self) -> SettlementResult<Vec<C::Action>> {
        self.inner.read().pending_actions()
    }

    pub fn drain_events(&self) -> Vec<ControllerEvent<C::Action, C::Summary>> {
        self.inner.write().drain_events()
    }

    /// Run `f` under the read lock
    pub fn with<R>(&self, f: impl FnOnce(&Controller<C, P>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Base state plus pending actions, read atomically
    pub fn snapshot_pending(&self) -> SettlementResult<(CommittedState, Vec<C::Action>)> {
        let guard = self.inner.read();
        Ok((guard.committed_state().clone(), guard.pending_actions()?))
    }
}
