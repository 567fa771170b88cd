//! Prover-side map store
//!
//! Fold steps only see witnesses and roots; the full leaf sets live here, in
//! the prover's off-proof index, and must be updated alongside every step so
//! that further witnesses match the new roots.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::layout::{MapId, MapRoots, MapSpec};
use super::tree::SparseMerkleTree;
use crate::error::{FoldError, FoldResult};
use zkfund_primitives::Digest;

/// Full copies of every map in a contract layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStore {
    trees: Vec<SparseMerkleTree>,
}

impl MapStore {
    /// Empty maps for `layout`
    pub fn new(layout: &[MapSpec]) -> FoldResult<Self> {
        let trees = layout
            .iter()
            .map(|spec| SparseMerkleTree::new(spec.height))
            .collect::<FoldResult<Vec<_>>>()?;
        Ok(Self { trees })
    }

    /// Rebuild every map from its leaves; maps are built in parallel
    pub fn from_leaves(layout: &[MapSpec], leaves: Vec<Vec<(u64, Digest)>>) -> FoldResult<Self> {
        if leaves.len() != layout.len() {
            return Err(FoldError::LayoutMismatch {
                expected: layout.len(),
                actual: leaves.len(),
            });
        }
        let trees = layout
            .par_iter()
            .zip(leaves.into_par_iter())
            .map(|(spec, map_leaves)| SparseMerkleTree::from_leaves(spec.height, map_leaves))
            .collect::<FoldResult<Vec<_>>>()?;
        Ok(Self { trees })
    }

    pub fn roots(&self) -> MapRoots {
        MapRoots::new(self.trees.iter().map(SparseMerkleTree::root).collect())
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn tree(&self, map: MapId) -> FoldResult<&SparseMerkleTree> {
        self.trees.get(map.as_usize()).ok_or(FoldError::UnknownMap(map))
    }

    pub fn tree_mut(&mut self, map: MapId) -> FoldResult<&mut SparseMerkleTree> {
        self.trees
            .get_mut(map.as_usize())
            .ok_or(FoldError::UnknownMap(map))
    }

    /// Fails unless every tree's root equals the corresponding committed root
    pub fn ensure_matches(&self, roots: &MapRoots) -> FoldResult<()> {
        if roots.len() != self.trees.len() {
            return Err(FoldError::LayoutMismatch {
                expected: self.trees.len(),
                actual: roots.len(),
            });
        }
        for (i, tree) in self.trees.iter().enumerate() {
            let map = MapId(i as u8);
            if tree.root() != roots.get(map)? {
                return Err(FoldError::StoreOutOfSync(map));
            }
        }
        Ok(())
    }
}
