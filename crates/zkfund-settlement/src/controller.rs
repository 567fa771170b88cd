//! Settlement controller
//!
//! The controller is the single owner of a contract's committed state: one
//! root per map, the action-log position those roots reflect, and the
//! registry root. Dispatch appends to the log without touching the maps;
//! settlement is the only way the roots move.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zkfund_fold::{
    ActionLog, ActionState, Attestation, CommittedState, Contract, MapId, MapRoots, MapWitness,
    ProofSystem,
};
use zkfund_primitives::{Digest, Hash256, Identity};

use crate::config::ControllerConfig;
use crate::error::{SettlementError, SettlementResult};
use crate::events::ControllerEvent;
use crate::registry::{validate_peer, Peer, PeerCapability, PeerRegistry, ReferenceCheck, RoleTag};

/// What a successful settlement committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "S: zkfund_fold::Summary")]
pub struct SettlementReceipt<S> {
    pub previous: CommittedState,
    pub committed: CommittedState,
    pub num_actions: u64,
    pub summary: S,
    pub proof_hash: Hash256,
}

/// Single canonical controller for one contract
pub struct Controller<C: Contract, P> {
    identity: Identity,
    contract: C,
    proofs: P,
    config: ControllerConfig,
    committed: CommittedState,
    log: ActionLog<C::Action>,
    registry: PeerRegistry,
    events: Vec<ControllerEvent<C::Action, C::Summary>>,
}

impl<C, P> Controller<C, P>
where
    C: Contract,
    P: ProofSystem<C>,
{
    /// Deploy with empty maps, the genesis action state and an empty registry
    pub fn deploy(
        identity: Identity,
        contract: C,
        proofs: P,
        config: ControllerConfig,
    ) -> SettlementResult<Self> {
        Self::deploy_with_peers(identity, contract, proofs, config, &[])
    }

    /// Deploy with the registry bound to `peers`
    ///
    /// The registry root is fixed from here on: a role cannot be rebound
    /// without deploying a new controller.
    pub fn deploy_with_peers(
        identity: Identity,
        contract: C,
        proofs: P,
        config: ControllerConfig,
        peers: &[(RoleTag, Identity)],
    ) -> SettlementResult<Self> {
        config.validate()?;
        for spec in contract.layout() {
            spec.validate()?;
        }

        let mut registry = PeerRegistry::new()?;
        let mut events = Vec::with_capacity(peers.len());
        for (role, peer) in peers {
            if registry.binding(*role)? != Digest::ZERO {
                return Err(SettlementError::cross_reference(format!("{role} bound twice")));
            }
            registry.register(*role, peer)?;
            events.push(ControllerEvent::PeerRegistered {
                role: *role,
                identity: *peer,
            });
        }

        let committed = CommittedState::genesis(contract.layout());
        info!(
            contract = contract.name(),
            identity = %identity,
            maps = contract.layout().len(),
            peers = peers.len(),
            registry = %registry.root(),
            "controller deployed"
        );
        Ok(Self {
            identity,
            contract,
            proofs,
            config,
            committed,
            log: ActionLog::new(),
            registry,
            events,
        })
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn proofs(&self) -> &P {
        &self.proofs
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Append an action after the dispatch-time scans over pending actions
    pub fn dispatch(&mut self, action: C::Action) -> SettlementResult<ActionState> {
        if self.contract.requires_reference(&action) {
            warn!(contract = self.contract.name(), "dispatch refused: peer reference required");
            return Err(SettlementError::ReferenceRequired {
                contract: self.contract.name(),
            });
        }
        self.append(action)
    }

    /// Append an action a registered peer vouched for
    ///
    /// `capability` must come from this controller's registry under the
    /// contract's peer role; the contract then checks `action` against the
    /// peer's committed state.
    pub fn dispatch_referenced<T: Peer>(
        &mut self,
        capability: &PeerCapability<'_, T>,
        action: C::Action,
        evidence: &<C as ReferenceCheck<T>>::Evidence,
    ) -> SettlementResult<ActionState>
    where
        C: ReferenceCheck<T>,
    {
        if capability.registry_root() != self.registry.root() {
            return Err(SettlementError::cross_reference(format!(
                "capability was validated against registry {}, not {}",
                capability.registry_root(),
                self.registry.root()
            )));
        }
        let expected = self.contract.peer_role();
        if capability.role() != expected {
            return Err(SettlementError::RoleMismatch {
                expected,
                actual: capability.role().0,
            });
        }
        if let Err(err) = self.contract.authorize(capability.peer(), &action, evidence) {
            warn!(contract = self.contract.name(), error = %err, "peer refused dispatch");
            return Err(err);
        }
        debug!(
            contract = self.contract.name(),
            peer = %capability.peer().identity(),
            role = %expected,
            "dispatch authorised by peer"
        );
        self.append(action)
    }

    fn append(&mut self, action: C::Action) -> SettlementResult<ActionState> {
        let pending = self.log.pending_since(&self.committed.actions)?;
        if pending.len() >= self.config.max_pending_actions {
            warn!(
                contract = self.contract.name(),
                limit = self.config.max_pending_actions,
                "dispatch refused: pending limit"
            );
            return Err(SettlementError::PendingLimit {
                limit: self.config.max_pending_actions,
            });
        }
        if let Err(violation) = self.contract.check_dispatch(&action, &pending) {
            warn!(contract = self.contract.name(), %violation, "dispatch rejected");
            return Err(violation.into());
        }

        let state = self.log.dispatch(action.clone());
        let position = self.log.len();
        debug!(contract = self.contract.name(), position, state = %state, "dispatched");
        self.events.push(ControllerEvent::Dispatched {
            action,
            state,
            position,
        });
        Ok(state)
    }

    /// Verify and commit a batch attestation; all-or-nothing
    pub fn settle(
        &mut self,
        attestation: &Attestation<C::Summary>,
    ) -> SettlementResult<SettlementReceipt<C::Summary>> {
        if let Err(err) = self.check_settlement(attestation) {
            warn!(contract = self.contract.name(), error = %err, "settlement rejected");
            return Err(err);
        }

        let previous = std::mem::replace(&mut self.committed, attestation.final_state().clone());
        let receipt = SettlementReceipt {
            previous,
            committed: self.committed.clone(),
            num_actions: attestation.num_actions(),
            summary: attestation.summary().clone(),
            proof_hash: attestation.proof_hash(),
        };

        info!(
            contract = self.contract.name(),
            num_actions = receipt.num_actions,
            state = %self.committed.actions,
            proof_hash = %receipt.proof_hash,
            "batch settled"
        );
        self.events.push(ControllerEvent::Settled {
            state: self.committed.actions,
            num_actions: receipt.num_actions,
            summary: receipt.summary.clone(),
            proof_hash: receipt.proof_hash,
        });
        Ok(receipt)
    }

    fn check_settlement(&self, attestation: &Attestation<C::Summary>) -> SettlementResult<()> {
        let num_actions = attestation.num_actions();
        if num_actions == 0 {
            return Err(SettlementError::EmptyAttestation);
        }
        if num_actions > self.config.max_batch_size as u64 {
            return Err(SettlementError::BatchTooLarge {
                size: num_actions,
                max: self.config.max_batch_size,
            });
        }

        self.proofs
            .verify(&self.contract, attestation)
            .map_err(|e| SettlementError::InvalidProof(e.to_string()))?;

        if attestation.initial() != &self.committed {
            return Err(SettlementError::StaleBase {
                committed: self.committed.actions,
                attested: attestation.initial().actions,
            });
        }

        let tip = self.log.tip();
        if attestation.final_state().actions != tip {
            return Err(SettlementError::LogDivergence {
                tip,
                attested: attestation.final_state().actions,
            });
        }
        Ok(())
    }

    pub fn registry_witness(&self, role: RoleTag) -> SettlementResult<MapWitness> {
        Ok(self.registry.witness(role)?)
    }

    /// Validate `peer` against this controller's registry under `role`
    pub fn resolve_peer<'p, T: Peer>(
        &self,
        role: RoleTag,
        peer: &'p T,
        witness: &MapWitness,
    ) -> SettlementResult<PeerCapability<'p, T>> {
        validate_peer(&self.registry.root(), role, peer, witness)
    }

    /// Whether `value` is the committed leaf behind `witness` in `map`
    pub fn leaf_equals(
        &self,
        map: MapId,
        witness: &MapWitness,
        value: &Digest,
    ) -> SettlementResult<bool> {
        let spec = self
            .contract
            .layout()
            .get(map.as_usize())
            .ok_or(zkfund_fold::FoldError::UnknownMap(map))?;
        let root = self.committed.roots.get(map)?;
        Ok(witness.height() == spec.height as usize && witness.verify_old(&root, value))
    }

    pub fn current_map_roots(&self) -> &MapRoots {
        &self.committed.roots
    }

    pub fn current_action_state(&self) -> ActionState {
        self.committed.actions
    }

    pub fn committed_state(&self) -> &CommittedState {
        &self.committed
    }

    pub fn registry_root(&self) -> Digest {
        self.registry.root()
    }

    /// Actions dispatched since the last settlement, oldest first
    pub fn pending_actions(&self) -> SettlementResult<Vec<C::Action>> {
        Ok(self.log.actions_since(&self.committed.actions)?)
    }

    pub fn log(&self) -> &ActionLog<C::Action> {
        &self.log
    }

    pub fn events(&self) -> &[ControllerEvent<C::Action, C::Summary>] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent<C::Action, C::Summary>> {
        std::mem::take(&mut self.events)
    }
}

impl<C: Contract, P> Peer for Controller<C, P> {
    fn identity(&self) -> Identity {
        self.identity
    }
}
