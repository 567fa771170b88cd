//! Error types for map, log and folding operations

use thiserror::Error;
use zkfund_primitives::Digest;

use crate::state::MapId;

/// Errors that can occur while building or folding a batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    /// Map height outside the supported range
    #[error("Invalid map height {0}: must be between 1 and 64")]
    InvalidHeight(u8),

    /// Index does not fit the map's key space
    #[error("Index {index} out of range for map of height {height}")]
    IndexOutOfRange { index: u64, height: u8 },

    /// The contract layout has no map with this id
    #[error("Unknown map {0}")]
    UnknownMap(MapId),

    /// A root set or leaf set does not have one entry per map
    #[error("Layout mismatch: expected {expected} maps, got {actual}")]
    LayoutMismatch { expected: usize, actual: usize },

    /// A step needed a witness the caller did not supply
    #[error("Missing witness for map {map} index {index}")]
    MissingWitness { map: MapId, index: u64 },

    /// The next witness belongs to a different map
    #[error("Witness for map {actual} supplied where map {expected} was expected")]
    WitnessMapMismatch { expected: MapId, actual: MapId },

    /// The witness index is not the index derived from the action
    #[error("Witness index mismatch on map {map}: expected {expected}, got {actual}")]
    WitnessIndexMismatch { map: MapId, expected: u64, actual: u64 },

    /// The witness path has the wrong length for the map
    #[error("Witness for map {map} has {actual} siblings, expected {expected}")]
    WitnessHeightMismatch { map: MapId, expected: u8, actual: usize },

    /// The claimed old leaf does not hash to the current root
    #[error("Witness does not match the current root of map {map} at index {index}")]
    WitnessMismatch { map: MapId, index: u64 },

    /// More witnesses were supplied than the action consumed
    #[error("{0} witnesses left unused by the step")]
    UnusedWitnesses(usize),

    /// Single-assignment slot already holds a value
    #[error("Slot {index} of map {map} is already assigned")]
    SlotOccupied { map: MapId, index: u64 },

    /// A stored leaf cannot be decoded into the slot's value type
    #[error("Malformed leaf in map {map} at index {index}")]
    MalformedLeaf { map: MapId, index: u64 },

    /// Contract-level rule rejected the action
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The prior attestation did not verify
    #[error("Invalid attestation: {0}")]
    InvalidAttestation(String),

    /// The action-log position is not part of this log
    #[error("Unknown action state {0}")]
    UnknownActionState(Digest),

    /// The requested span runs backwards
    #[error("Action state {to} precedes {from}")]
    InvertedSpan { from: Digest, to: Digest },

    /// The prover's map store does not match the base state
    #[error("Map store out of sync with base state on map {0}")]
    StoreOutOfSync(MapId),

    /// Batch is empty
    #[error("Batch cannot be empty")]
    EmptyBatch,

    /// Batch exceeds maximum size
    #[error("Batch size {size} exceeds maximum {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Prover configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Proof generation failed
    #[error("Proof generation failed: {0}")]
    ProofGenerationFailed(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization error
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

/// Result type for fold operations
pub type FoldResult<T> = Result<T, FoldError>;

/// Dispatch-time invariant violations, raised before an action is appended
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchViolation {
    /// Another pending action already targets the same logical key
    #[error("Pending action already targets {0}")]
    DuplicatePendingKey(String),

    /// Too many pending actions share the same grouping key
    #[error("Pending quota of {limit} exceeded for {key}")]
    QuotaExceeded { key: String, limit: usize },

    /// The action is malformed on its own
    #[error("Rejected action: {0}")]
    Rejected(String),
}
