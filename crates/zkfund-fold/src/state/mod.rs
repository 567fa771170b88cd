//! Authenticated state
//!
//! - `SparseMerkleTree`: fixed-height sparse Rescue tree over `[0, 2^H)`
//! - `MapWitness`: authentication path proving a leaf against a root and
//!   computing the root after replacing it
//! - `AuthMap`: typed view parametrised by key derivation and leaf encoding
//! - `MapRoots` / `CommittedState`: the per-controller root set plus the
//!   action-log position
//! - `MapStore`: the prover's off-proof copy of every map a contract owns

mod layout;
mod store;
mod tree;
mod typed;
mod witness;

pub use layout::{CommittedState, MapId, MapRoots, MapSpec, MAX_HEIGHT};
pub use store::MapStore;
pub use tree::{empty_root, SparseMerkleTree};
pub use typed::{AuthMap, LeafValue, MapKey};
pub use witness::MapWitness;
