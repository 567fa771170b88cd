//! Map layouts, root sets and committed state

use std::fmt;

use serde::{Deserialize, Serialize};
use zkfund_primitives::{Digest, Felt};

use super::tree::{check_height, empty_root};
use crate::error::{FoldError, FoldResult};
use crate::log::ActionState;

/// Largest supported map height (index space `[0, 2^64)`)
pub const MAX_HEIGHT: u8 = 64;

/// Position of a map within a contract's layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(pub u8);

impl MapId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static description of one authenticated map owned by a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSpec {
    pub name: &'static str,
    pub height: u8,
}

impl MapSpec {
    pub const fn new(name: &'static str, height: u8) -> Self {
        Self { name, height }
    }

    pub fn validate(&self) -> FoldResult<()> {
        check_height(self.height)
    }
}

/// One root per map, in layout order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapRoots(Vec<Digest>);

impl MapRoots {
    pub fn new(roots: Vec<Digest>) -> Self {
        Self(roots)
    }

    /// Roots of a freshly deployed contract: every map empty
    pub fn empty(layout: &[MapSpec]) -> Self {
        Self(layout.iter().map(|spec| empty_root(spec.height)).collect())
    }

    pub fn get(&self, map: MapId) -> FoldResult<Digest> {
        self.0
            .get(map.as_usize())
            .copied()
            .ok_or(FoldError::UnknownMap(map))
    }

    pub fn set(&mut self, map: MapId, root: Digest) -> FoldResult<()> {
        let slot = self
            .0
            .get_mut(map.as_usize())
            .ok_or(FoldError::UnknownMap(map))?;
        *slot = root;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Digest] {
        &self.0
    }

    pub fn to_elements(&self) -> Vec<Felt> {
        self.0.iter().flat_map(|root| root.0).collect()
    }
}

/// Everything a controller persists: map roots plus the action-log position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommittedState {
    pub roots: MapRoots,
    pub actions: ActionState,
}

impl CommittedState {
    pub fn new(roots: MapRoots, actions: ActionState) -> Self {
        Self { roots, actions }
    }

    /// Deployment state: empty maps and the genesis action state
    pub fn genesis(layout: &[MapSpec]) -> Self {
        Self {
            roots: MapRoots::empty(layout),
            actions: ActionState::genesis(),
        }
    }

    pub fn to_elements(&self) -> Vec<Felt> {
        let mut elements = self.roots.to_elements();
        elements.extend_from_slice(self.actions.digest().as_elements());
        elements
    }
}
