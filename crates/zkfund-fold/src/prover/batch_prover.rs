//! Batch prover
//!
//! High-level interface for folding a run of actions into a single
//! attestation ready for settlement.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::session::{FoldSession, FoldSnapshot};
use crate::contract::{Contract, Summary};
use crate::error::{FoldError, FoldResult};
use crate::fold::BatchFolder;
use crate::proof::ProofSystem;
use crate::public_inputs::Attestation;
use crate::state::{CommittedState, MapStore};

/// Configuration for the batch prover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProverConfig {
    /// Maximum number of actions folded into one attestation
    pub max_batch_size: usize,
}

impl Default for BatchProverConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 128,
        }
    }
}

impl BatchProverConfig {
    /// Create config for small batches
    pub fn small_batch() -> Self {
        Self { max_batch_size: 16 }
    }

    /// Create config for large batches
    pub fn large_batch() -> Self {
        Self {
            max_batch_size: 1024,
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn validate(&self) -> FoldResult<()> {
        if self.max_batch_size == 0 {
            return Err(FoldError::InvalidConfig(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metadata about a folded batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Batch ID
    pub batch_id: Uuid,

    /// Number of folded actions
    pub num_actions: u64,

    /// Time spent folding (milliseconds)
    pub proving_time_ms: u64,

    /// Proof system that produced the attestation
    pub proof_system: String,

    /// Hash of the final proof (hex)
    pub proof_hash: String,

    /// Proof size in bytes
    pub proof_size: usize,

    /// Prover version
    pub prover_version: String,
}

/// A finished batch: the attestation to settle plus the post-batch store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "S: Summary")]
pub struct PreparedBatch<S> {
    pub attestation: Attestation<S>,
    pub store: MapStore,
    pub metadata: BatchMetadata,
}

/// Folds actions for one contract under one proof system
pub struct BatchProver<C, P> {
    contract: C,
    proofs: P,
    config: BatchProverConfig,
}

impl<C, P> BatchProver<C, P>
where
    C: Contract,
    P: ProofSystem<C>,
{
    /// Create a new batch prover with default configuration
    pub fn new(contract: C, proofs: P) -> Self {
        Self::with_config(contract, proofs, BatchProverConfig::default())
    }

    /// Create a new batch prover with the given configuration
    pub fn with_config(contract: C, proofs: P, config: BatchProverConfig) -> Self {
        Self {
            contract,
            proofs,
            config,
        }
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn proofs(&self) -> &P {
        &self.proofs
    }

    /// Get the configuration
    pub fn config(&self) -> &BatchProverConfig {
        &self.config
    }

    pub fn folder(&self) -> BatchFolder<'_, C, P> {
        BatchFolder::new(&self.contract, &self.proofs)
    }

    /// Start a session on `base`; `store` must hold exactly the base maps
    pub fn begin(&self, store: MapStore, base: CommittedState) -> FoldResult<FoldSession<'_, C, P>> {
        self.config.validate()?;
        store.ensure_matches(&base.roots)?;
        let seed = self.folder().seed(base)?;
        Ok(FoldSession::new(self, Uuid::new_v4(), store, seed))
    }

    /// Continue a session from a snapshot after checking both halves of it
    pub fn resume(&self, snapshot: FoldSnapshot<C::Summary>) -> FoldResult<FoldSession<'_, C, P>> {
        self.proofs.verify(&self.contract, &snapshot.attestation)?;
        snapshot
            .store
            .ensure_matches(&snapshot.attestation.final_state().roots)?;
        Ok(FoldSession::new(
            self,
            snapshot.batch_id,
            snapshot.store,
            snapshot.attestation,
        ))
    }

    /// Fold `actions` on top of `base` in one go
    pub fn prove(
        &self,
        store: &MapStore,
        base: &CommittedState,
        actions: &[C::Action],
    ) -> FoldResult<PreparedBatch<C::Summary>> {
        if actions.is_empty() {
            return Err(FoldError::EmptyBatch);
        }
        if actions.len() > self.config.max_batch_size {
            return Err(FoldError::BatchTooLarge {
                size: actions.len(),
                max: self.config.max_batch_size,
            });
        }

        let mut session = self.begin(store.clone(), base.clone())?;
        session.extend(actions)?;
        let batch = session.finish()?;

        info!(
            contract = self.contract.name(),
            batch_id = %batch.metadata.batch_id,
            num_actions = batch.metadata.num_actions,
            proving_time_ms = batch.metadata.proving_time_ms,
            "batch folded"
        );
        Ok(batch)
    }
}
