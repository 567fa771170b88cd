//! Per-step witnesses

use serde::{Deserialize, Serialize};
use zkfund_primitives::Digest;

use crate::log::Action;
use crate::state::{MapId, MapWitness};

/// Claimed old leaf and its path for one touched slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepWitness {
    pub map: MapId,
    pub leaf: Digest,
    pub path: MapWitness,
}

impl StepWitness {
    pub fn new(map: MapId, leaf: Digest, path: MapWitness) -> Self {
        Self { map, leaf, path }
    }

    pub fn index(&self) -> u64 {
        self.path.index()
    }
}

/// One action plus the witnesses for every slot it touches, in access order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "A: Action")]
pub struct FoldStep<A> {
    pub action: A,
    pub witnesses: Vec<StepWitness>,
}

impl<A: Action> FoldStep<A> {
    pub fn new(action: A, witnesses: Vec<StepWitness>) -> Self {
        Self { action, witnesses }
    }
}
