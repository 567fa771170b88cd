//! Recursive batch folding
//!
//! A batch attestation is built by chaining steps from a seed. Each step
//! checks the prior attestation, replays one action against the witnesses
//! supplied for it, and emits an attestation whose initial state is carried
//! over unchanged.

mod folder;
mod slots;
mod transition;
mod witness;

pub use folder::BatchFolder;
pub use slots::WitnessedSlots;
pub use transition::apply_step;
pub use witness::{FoldStep, StepWitness};
