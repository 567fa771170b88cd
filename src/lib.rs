//! zkfund - batched, proof-carrying settlement of crowdfunding state
//!
//! Campaign, participation and funding state lives in sparse authenticated
//! maps. Actions are appended to an order-sensitive log; a prover folds a run
//! of the log into new map roots through a chain of attestations; a single
//! controller verifies the result and commits it atomically, rejecting it if
//! the base state has moved.
//!
//! # Crates
//!
//! - `zkfund-primitives`: field elements, Rescue digests, SHA-256 hashes, identities
//! - `zkfund-fold`: authenticated maps, the action log, folding and proof systems
//! - `zkfund-settlement`: controllers, the shared handle and cross-contract references
//! - `zkfund-contracts`: the reference campaign and funding contracts
//!
//! # Example
//!
//! ```no_run
//! use zkfund::contracts::{CampaignAction, CampaignContract, UNASSIGNED_ID};
//! use zkfund::fold::{BatchProver, MapStore, ReplayProofSystem};
//! use zkfund::primitives::{Digest, Identity};
//! use zkfund::settlement::{Controller, ControllerConfig};
//!
//! let contract = CampaignContract::default();
//! let mut controller = Controller::deploy(
//!     Identity::named("campaigns"),
//!     contract,
//!     ReplayProofSystem::new(),
//!     ControllerConfig::default(),
//! )
//! .unwrap();
//! controller
//!     .dispatch(CampaignAction::Create {
//!         id: UNASSIGNED_ID,
//!         metadata: Digest::ZERO,
//!         owner: Identity::named("alice"),
//!         committee: Digest::ZERO,
//!     })
//!     .unwrap();
//!
//! let prover = BatchProver::new(contract, ReplayProofSystem::new());
//! let store = MapStore::new(zkfund::fold::Contract::layout(&contract)).unwrap();
//! let pending = controller.pending_actions().unwrap();
//! let batch = prover.prove(&store, controller.committed_state(), &pending).unwrap();
//! controller.settle(&batch.attestation).unwrap();
//! ```

// Re-export sub-crates
pub use zkfund_contracts as contracts;
pub use zkfund_fold as fold;
pub use zkfund_primitives as primitives;
pub use zkfund_settlement as settlement;
