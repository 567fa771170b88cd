//! Fixed-height sparse Merkle tree
//!
//! Level 0 holds leaf words, level `height` holds the root. Only non-empty
//! nodes are stored; everything else resolves to the precomputed empty
//! subtree hash for its level, so an unset leaf is the zero word.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use zkfund_primitives::Digest;

use super::layout::MAX_HEIGHT;
use super::witness::MapWitness;
use crate::error::{FoldError, FoldResult};

/// Empty subtree hashes for levels 0..=MAX_HEIGHT
fn empty_hashes() -> &'static [Digest] {
    static EMPTY: OnceLock<Vec<Digest>> = OnceLock::new();
    EMPTY.get_or_init(|| {
        let mut levels = Vec::with_capacity(MAX_HEIGHT as usize + 1);
        levels.push(Digest::ZERO);
        for level in 0..MAX_HEIGHT as usize {
            let below = levels[level];
            levels.push(Digest::merge(&below, &below));
        }
        levels
    })
}

/// Root of a map of the given height with every leaf unset
pub fn empty_root(height: u8) -> Digest {
    empty_hashes()[height.min(MAX_HEIGHT) as usize]
}

pub(crate) fn check_height(height: u8) -> FoldResult<()> {
    if height == 0 || height > MAX_HEIGHT {
        return Err(FoldError::InvalidHeight(height));
    }
    Ok(())
}

pub(crate) fn index_in_range(index: u64, height: u8) -> bool {
    height >= 64 || index >> height == 0
}

/// Sparse Merkle tree keyed by `u64` indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TreeSnapshot", try_from = "TreeSnapshot")]
pub struct SparseMerkleTree {
    height: u8,
    leaves: BTreeMap<u64, Digest>,
    /// Internal nodes keyed by (level, index within level), level >= 1
    nodes: BTreeMap<(u8, u64), Digest>,
}

impl SparseMerkleTree {
    /// Create an empty tree
    pub fn new(height: u8) -> FoldResult<Self> {
        check_height(height)?;
        Ok(Self {
            height,
            leaves: BTreeMap::new(),
            nodes: BTreeMap::new(),
        })
    }

    /// Build a tree from `(index, leaf)` pairs; later pairs overwrite earlier ones
    pub fn from_leaves<I>(height: u8, leaves: I) -> FoldResult<Self>
    where
        I: IntoIterator<Item = (u64, Digest)>,
    {
        let mut tree = Self::new(height)?;
        for (index, leaf) in leaves {
            tree.insert(index, leaf)?;
        }
        Ok(tree)
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Current root, a pure function of the stored leaves
    pub fn root(&self) -> Digest {
        self.node(self.height, 0)
    }

    /// Number of non-empty leaves
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Iterate non-empty leaves in index order
    pub fn leaves(&self) -> impl Iterator<Item = (u64, Digest)> + '_ {
        self.leaves.iter().map(|(index, leaf)| (*index, *leaf))
    }

    /// Leaf at `index` (the zero word when unset)
    pub fn get(&self, index: u64) -> FoldResult<Digest> {
        self.check_index(index)?;
        Ok(self.node(0, index))
    }

    /// Authentication path for `index`, valid against the current root
    pub fn witness(&self, index: u64) -> FoldResult<MapWitness> {
        self.check_index(index)?;
        let siblings = (0..self.height)
            .map(|level| self.node(level, (index >> level) ^ 1))
            .collect();
        Ok(MapWitness::new(index, siblings))
    }

    /// Replace the leaf at `index`, returning the previous leaf
    pub fn insert(&mut self, index: u64, leaf: Digest) -> FoldResult<Digest> {
        self.check_index(index)?;

        let old = if leaf.is_zero() {
            self.leaves.remove(&index)
        } else {
            self.leaves.insert(index, leaf)
        }
        .unwrap_or(Digest::ZERO);

        let empty = empty_hashes();
        let mut current = leaf;
        let mut position = index;
        for level in 0..self.height {
            let sibling = self.node(level, position ^ 1);
            current = if position & 1 == 0 {
                Digest::merge(&current, &sibling)
            } else {
                Digest::merge(&sibling, &current)
            };
            position >>= 1;

            let key = (level + 1, position);
            if current == empty[level as usize + 1] {
                self.nodes.remove(&key);
            } else {
                self.nodes.insert(key, current);
            }
        }

        Ok(old)
    }

    fn node(&self, level: u8, index: u64) -> Digest {
        if level == 0 {
            return self.leaves.get(&index).copied().unwrap_or(Digest::ZERO);
        }
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or_else(|| empty_hashes()[level as usize])
    }

    fn check_index(&self, index: u64) -> FoldResult<()> {
        if !index_in_range(index, self.height) {
            return Err(FoldError::IndexOutOfRange {
                index,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Wire form of a tree: only the leaves travel, internal nodes are rebuilt
#[derive(Serialize, Deserialize)]
struct TreeSnapshot {
    height: u8,
    leaves: Vec<(u64, Digest)>,
}

impl From<SparseMerkleTree> for TreeSnapshot {
    fn from(tree: SparseMerkleTree) -> Self {
        Self {
            height: tree.height,
            leaves: tree.leaves.into_iter().collect(),
        }
    }
}

impl TryFrom<TreeSnapshot> for SparseMerkleTree {
    type Error = FoldError;

    fn try_from(snapshot: TreeSnapshot) -> FoldResult<Self> {
        SparseMerkleTree::from_leaves(snapshot.height, snapshot.leaves)
    }
}
