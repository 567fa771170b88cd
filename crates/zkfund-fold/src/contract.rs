//! Contract seam
//!
//! A contract describes its maps, the dispatch-time checks over pending
//! actions, and one transition function. The transition is written once
//! against `SlotAccess` and runs in two places: against the prover's live
//! maps (producing witnesses) and against supplied witnesses inside a fold
//! step (checking them).

use std::fmt::Debug;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zkfund_primitives::{Digest, Felt};

use crate::error::{DispatchViolation, FoldError, FoldResult};
use crate::log::{Action, PendingActions};
use crate::state::{LeafValue, MapId, MapKey, MapSpec};

/// Running aggregates carried in the attestation alongside the roots
pub trait Summary: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned {
    fn to_elements(&self) -> Vec<Felt>;
}

impl Summary for () {
    fn to_elements(&self) -> Vec<Felt> {
        Vec::new()
    }
}

/// Witnessed access to leaves during a transition
pub trait SlotAccess {
    /// Replace the leaf at `(map, index)` with what `f` returns for the current leaf.
    ///
    /// Returns the new leaf.
    fn update<F>(&mut self, map: MapId, index: u64, f: F) -> FoldResult<Digest>
    where
        F: FnOnce(&Digest) -> FoldResult<Digest>;

    /// Read a leaf; consumes a witness and leaves the root unchanged
    fn read(&mut self, map: MapId, index: u64) -> FoldResult<Digest> {
        self.update(map, index, |old| Ok(*old))
    }

    /// Write into a slot that must still be empty
    fn assign(&mut self, map: MapId, index: u64, leaf: Digest) -> FoldResult<()> {
        self.update(map, index, |old| {
            if old.is_zero() {
                Ok(leaf)
            } else {
                Err(FoldError::SlotOccupied { map, index })
            }
        })?;
        Ok(())
    }
}

/// A typed handle on one of a contract's maps
pub struct Slot<K, V> {
    map: MapId,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K: MapKey, V: LeafValue> Slot<K, V> {
    pub const fn new(map: MapId) -> Self {
        Self {
            map,
            _marker: PhantomData,
        }
    }

    pub fn map(&self) -> MapId {
        self.map
    }

    /// Decoded value, `None` when unset
    pub fn read<S: SlotAccess>(&self, slots: &mut S, key: &K) -> FoldResult<Option<V>> {
        let index = key.to_index();
        let leaf = slots.read(self.map, index)?;
        self.decode(index, &leaf)
    }

    /// Single-assignment write
    pub fn assign<S: SlotAccess>(&self, slots: &mut S, key: &K, value: &V) -> FoldResult<()> {
        slots.assign(self.map, key.to_index(), value.to_leaf())
    }

    /// Read-modify-write; `f` sees `None` for an unset slot
    pub fn update<S, F>(&self, slots: &mut S, key: &K, f: F) -> FoldResult<V>
    where
        S: SlotAccess,
        F: FnOnce(Option<V>) -> FoldResult<V>,
    {
        let index = key.to_index();
        let mut written = None;
        slots.update(self.map, index, |old| {
            let current = self.decode(index, old)?;
            let next = f(current)?;
            let leaf = next.to_leaf();
            written = Some(next);
            Ok(leaf)
        })?;
        written.ok_or(FoldError::MalformedLeaf {
            map: self.map,
            index,
        })
    }

    fn decode(&self, index: u64, leaf: &Digest) -> FoldResult<Option<V>> {
        if leaf.is_zero() {
            return Ok(None);
        }
        V::from_leaf(leaf).map(Some).ok_or(FoldError::MalformedLeaf {
            map: self.map,
            index,
        })
    }
}

/// A settlement domain: its maps, dispatch rules and transition function
pub trait Contract {
    type Action: Action;
    type Summary: Summary;

    /// Stable name, bound into proofs
    fn name(&self) -> &'static str;

    /// Maps owned by the contract, indexed by `MapId`
    fn layout(&self) -> &'static [MapSpec];

    /// Read-only scan over the unsettled suffix of the log before appending
    fn check_dispatch(
        &self,
        _action: &Self::Action,
        _pending: &PendingActions<'_, Self::Action>,
    ) -> Result<(), DispatchViolation> {
        Ok(())
    }

    /// Whether `action` may only enter the log on a registered peer's word
    ///
    /// Controllers refuse such actions on the plain dispatch path.
    fn requires_reference(&self, _action: &Self::Action) -> bool {
        false
    }

    /// Apply one action: every leaf it touches goes through `slots`
    fn apply<S: SlotAccess>(
        &self,
        action: &Self::Action,
        summary: &mut Self::Summary,
        slots: &mut S,
    ) -> FoldResult<()>;
}
