//! Typed authenticated maps
//!
//! `AuthMap<K, V>` is the one generic map every domain uses: `K` derives the
//! tree index, `V` encodes to and from the leaf word.

use std::marker::PhantomData;

use zkfund_primitives::{felt_from_u64, felt_to_u64, Digest, Identity, FELT_ZERO};

use super::layout::MapId;
use super::tree::SparseMerkleTree;
use super::witness::MapWitness;
use crate::error::{FoldError, FoldResult};

/// Derives a tree index from a domain key
pub trait MapKey {
    fn to_index(&self) -> u64;
}

impl MapKey for u64 {
    fn to_index(&self) -> u64 {
        *self
    }
}

impl MapKey for u32 {
    fn to_index(&self) -> u64 {
        *self as u64
    }
}

impl MapKey for u8 {
    fn to_index(&self) -> u64 {
        *self as u64
    }
}

/// Encodes a value as a leaf word
///
/// The zero word is the unset leaf, so `to_leaf` of a type's "absent" value
/// must be `Digest::ZERO`.
pub trait LeafValue: Sized {
    fn to_leaf(&self) -> Digest;
    fn from_leaf(leaf: &Digest) -> Option<Self>;
}

impl LeafValue for Digest {
    fn to_leaf(&self) -> Digest {
        *self
    }

    fn from_leaf(leaf: &Digest) -> Option<Self> {
        Some(*leaf)
    }
}

/// Counters and totals occupy the first element; values must stay below p
impl LeafValue for u64 {
    fn to_leaf(&self) -> Digest {
        Digest::new([felt_from_u64(*self), FELT_ZERO, FELT_ZERO, FELT_ZERO])
    }

    fn from_leaf(leaf: &Digest) -> Option<Self> {
        let [value, rest @ ..] = leaf.0;
        if rest.iter().any(|felt| *felt != FELT_ZERO) {
            return None;
        }
        Some(felt_to_u64(value))
    }
}

impl LeafValue for bool {
    fn to_leaf(&self) -> Digest {
        u64::from(*self).to_leaf()
    }

    fn from_leaf(leaf: &Digest) -> Option<Self> {
        match u64::from_leaf(leaf)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

/// Identities are committed by digest; decoding is not possible
impl LeafValue for Identity {
    fn to_leaf(&self) -> Digest {
        self.digest()
    }

    fn from_leaf(_leaf: &Digest) -> Option<Self> {
        None
    }
}

/// Typed wrapper over a `SparseMerkleTree`
#[derive(Debug, Clone)]
pub struct AuthMap<K, V> {
    id: MapId,
    tree: SparseMerkleTree,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K: MapKey, V: LeafValue> AuthMap<K, V> {
    pub fn new(id: MapId, height: u8) -> FoldResult<Self> {
        Ok(Self::from_tree(id, SparseMerkleTree::new(height)?))
    }

    pub fn from_tree(id: MapId, tree: SparseMerkleTree) -> Self {
        Self {
            id,
            tree,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn root(&self) -> Digest {
        self.tree.root()
    }

    pub fn tree(&self) -> &SparseMerkleTree {
        &self.tree
    }

    pub fn into_tree(self) -> SparseMerkleTree {
        self.tree
    }

    /// Raw leaf word for `key`
    pub fn leaf(&self, key: &K) -> FoldResult<Digest> {
        self.tree.get(key.to_index())
    }

    /// Decoded value, `None` when the slot is unset
    pub fn get(&self, key: &K) -> FoldResult<Option<V>> {
        let index = key.to_index();
        let leaf = self.tree.get(index)?;
        if leaf.is_zero() {
            return Ok(None);
        }
        V::from_leaf(&leaf)
            .map(Some)
            .ok_or(FoldError::MalformedLeaf { map: self.id, index })
    }

    pub fn insert(&mut self, key: &K, value: &V) -> FoldResult<()> {
        self.tree.insert(key.to_index(), value.to_leaf())?;
        Ok(())
    }

    pub fn remove(&mut self, key: &K) -> FoldResult<()> {
        self.tree.insert(key.to_index(), Digest::ZERO)?;
        Ok(())
    }

    pub fn witness(&self, key: &K) -> FoldResult<MapWitness> {
        self.tree.witness(key.to_index())
    }
}
