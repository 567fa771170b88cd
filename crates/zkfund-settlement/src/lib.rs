//! zkfund settlement
//!
//! One canonical controller per contract. It owns the committed map roots,
//! the action log and the registry of peer contracts:
//!
//! - `dispatch` runs the contract's pending-action scans and appends to the log
//! - `settle` verifies a batch attestation, rejects it if its base is stale or
//!   it does not end at the log tip, and otherwise commits it atomically
//! - `resolve_peer` turns a registry witness into a typed `PeerCapability`;
//!   actions that need a peer's word go through `dispatch_referenced`
//!
//! The registry is bound once, at deploy.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod registry;
pub mod shared;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{Controller, SettlementReceipt};
pub use error::{SettlementError, SettlementResult};
pub use events::ControllerEvent;
pub use registry::{
    validate_peer, Peer, PeerCapability, PeerRegistry, ReferenceCheck, RoleTag, REGISTRY_HEIGHT,
};
pub use shared::SharedController;
