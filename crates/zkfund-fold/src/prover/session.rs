//! Incremental folding sessions

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::batch_prover::{BatchMetadata, BatchProver, PreparedBatch};
use super::live::LiveSlots;
use crate::contract::{Contract, Summary};
use crate::error::{FoldError, FoldResult};
use crate::fold::FoldStep;
use crate::proof::ProofSystem;
use crate::public_inputs::Attestation;
use crate::state::MapStore;

/// Persistable in-progress fold: the current attestation and the prover's store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "S: Summary")]
pub struct FoldSnapshot<S> {
    pub batch_id: Uuid,
    pub attestation: Attestation<S>,
    pub store: MapStore,
}

/// One batch being folded an action at a time
///
/// The store always matches the attestation's final roots; a rejected action
/// leaves both untouched.
pub struct FoldSession<'a, C: Contract, P> {
    prover: &'a BatchProver<C, P>,
    batch_id: Uuid,
    store: MapStore,
    attestation: Attestation<C::Summary>,
    started: Instant,
}

impl<'a, C, P> FoldSession<'a, C, P>
where
    C: Contract,
    P: ProofSystem<C>,
{
    pub(crate) fn new(
        prover: &'a BatchProver<C, P>,
        batch_id: Uuid,
        store: MapStore,
        attestation: Attestation<C::Summary>,
    ) -> Self {
        Self {
            prover,
            batch_id,
            store,
            attestation,
            started: Instant::now(),
        }
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn attestation(&self) -> &Attestation<C::Summary> {
        &self.attestation
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn num_actions(&self) -> u64 {
        self.attestation.num_actions()
    }

    /// Fold one more action
    pub fn push(&mut self, action: &C::Action) -> FoldResult<&Attestation<C::Summary>> {
        let max = self.prover.config().max_batch_size;
        if self.num_actions() as usize >= max {
            return Err(FoldError::BatchTooLarge {
                size: self.num_actions() as usize + 1,
                max,
            });
        }

        let prover = self.prover;
        let contract = prover.contract();
        let folder = prover.folder();
        let mut scratch = self.attestation.public.summary.clone();
        let mut slots = LiveSlots::new(&mut self.store);

        let folded = contract.apply(action, &mut scratch, &mut slots).and_then(|()| {
            let step = FoldStep::new(action.clone(), slots.witnesses().to_vec());
            folder.fold(&self.attestation, step)
        });

        match folded {
            Ok(next) => {
                self.attestation = next;
                debug!(
                    batch_id = %self.batch_id,
                    num_actions = self.attestation.num_actions(),
                    "pushed action"
                );
                Ok(&self.attestation)
            }
            Err(err) => {
                slots.rollback()?;
                warn!(batch_id = %self.batch_id, error = %err, "action rejected by fold");
                Err(err)
            }
        }
    }

    /// Push every action, stopping at the first failure
    pub fn extend<'b, I>(&mut self, actions: I) -> FoldResult<()>
    where
        I: IntoIterator<Item = &'b C::Action>,
        C::Action: 'b,
    {
        for action in actions {
            self.push(action)?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> FoldSnapshot<C::Summary> {
        FoldSnapshot {
            batch_id: self.batch_id,
            attestation: self.attestation.clone(),
            store: self.store.clone(),
        }
    }

    /// Close the session into a batch ready for settlement
    pub fn finish(self) -> FoldResult<PreparedBatch<C::Summary>> {
        if self.attestation.num_actions() == 0 {
            return Err(FoldError::EmptyBatch);
        }
        let metadata = BatchMetadata {
            batch_id: self.batch_id,
            num_actions: self.attestation.num_actions(),
            proving_time_ms: self.started.elapsed().as_millis() as u64,
            proof_system: self.prover.proofs().name().to_string(),
            proof_hash: self.attestation.proof_hash().to_hex(),
            proof_size: self.attestation.proof.len(),
            prover_version: env!("CARGO_PKG_VERSION").to_string(),
        };
        Ok(PreparedBatch {
            attestation: self.attestation,
            store: self.store,
            metadata,
        })
    }
}
