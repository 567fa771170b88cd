//! zkfund folding core
//!
//! State in zkfund lives in fixed-height sparse authenticated maps and only
//! moves through batched, attested transitions:
//!
//! - **State**: Rescue-hashed sparse Merkle trees, typed maps and the
//!   prover's map store
//! - **Log**: the append-only action log and its hash-chain accumulator
//! - **Contract**: the seam a settlement domain implements
//! - **Fold**: seed and step functions chaining one attestation per action
//! - **Proof**: the proof-system boundary and its replay/attester backends
//! - **Prover**: incremental fold sessions and the one-shot batch prover
//!
//! # Usage
//!
//! ```ignore
//! use zkfund_fold::{BatchProver, CommittedState, MapStore, ReplayProofSystem};
//!
//! let prover = BatchProver::new(contract, ReplayProofSystem::new());
//! let batch = prover.prove(&store, &committed, &pending)?;
//! controller.settle(&batch.attestation)?;
//! ```

pub mod contract;
pub mod error;
pub mod fold;
pub mod log;
pub mod proof;
pub mod prover;
pub mod public_inputs;
pub mod serialization;
pub mod state;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use contract::{Contract, Slot, SlotAccess, Summary};
pub use error::{DispatchViolation, FoldError, FoldResult};
pub use public_inputs::{Attestation, AttestationPublicInputs};

pub use fold::{apply_step, BatchFolder, FoldStep, StepWitness, WitnessedSlots};
pub use log::{Action, ActionLog, ActionState, LoggedAction, PendingActions};
pub use proof::{AttesterProofSystem, ProofBlob, ProofSystem, ReplayProofSystem};

// Prover types
pub use prover::{
    BatchMetadata, BatchProver, BatchProverConfig, FoldSession, FoldSnapshot, LiveSlots,
    PreparedBatch,
};

// Serialization
pub use serialization::{AttestationEnvelope, OpaqueEnvelope};

// State types
pub use state::{
    empty_root, AuthMap, CommittedState, LeafValue, MapId, MapKey, MapRoots, MapSpec, MapStore,
    MapWitness, SparseMerkleTree, MAX_HEIGHT,
};
