//! Slot access against the prover's live map store

use zkfund_primitives::Digest;

use crate::contract::SlotAccess;
use crate::error::FoldResult;
use crate::fold::StepWitness;
use crate::state::{MapId, MapStore};

/// Applies updates to the store and records a witness for each access
///
/// Updates land immediately; `rollback` restores the touched leaves when the
/// step is rejected later on.
pub struct LiveSlots<'a> {
    store: &'a mut MapStore,
    witnesses: Vec<StepWitness>,
    undo: Vec<(MapId, u64, Digest)>,
}

impl<'a> LiveSlots<'a> {
    pub fn new(store: &'a mut MapStore) -> Self {
        Self {
            store,
            witnesses: Vec::new(),
            undo: Vec::new(),
        }
    }

    /// Witnesses recorded so far, in access order
    pub fn witnesses(&self) -> &[StepWitness] {
        &self.witnesses
    }

    pub fn into_witnesses(self) -> Vec<StepWitness> {
        self.witnesses
    }

    /// Restore every leaf touched through this handle
    pub fn rollback(self) -> FoldResult<()> {
        for (map, index, leaf) in self.undo.into_iter().rev() {
            self.store.tree_mut(map)?.insert(index, leaf)?;
        }
        Ok(())
    }
}

impl SlotAccess for LiveSlots<'_> {
    fn update<F>(&mut self, map: MapId, index: u64, f: F) -> FoldResult<Digest>
    where
        F: FnOnce(&Digest) -> FoldResult<Digest>,
    {
        let tree = self.store.tree_mut(map)?;
        let path = tree.witness(index)?;
        let old = tree.get(index)?;
        let leaf = f(&old)?;
        tree.insert(index, leaf)?;

        self.undo.push((map, index, old));
        self.witnesses.push(StepWitness::new(map, old, path));
        Ok(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MapSpec;

    const LAYOUT: &[MapSpec] = &[MapSpec::new("a", 3)];

    #[test]
    fn test_records_pre_update_witness() {
        let mut store = MapStore::new(LAYOUT).unwrap();
        let before = store.roots();
        let mut slots = LiveSlots::new(&mut store);
        slots.assign(MapId(0), 5, Digest::from_u64s([1, 2, 3, 4])).unwrap();

        let witnesses = slots.into_witnesses();
        assert_eq!(witnesses.len(), 1);
        assert!(witnesses[0].path.verify_old(&before.get(MapId(0)).unwrap(), &Digest::ZERO));
        assert_eq!(
            witnesses[0].path.compute_new_root(&Digest::from_u64s([1, 2, 3, 4])),
            store.roots().get(MapId(0)).unwrap()
        );
    }

    #[test]
    fn test_rollback_restores_store() {
        let mut store = MapStore::new(LAYOUT).unwrap();
        let before = store.clone();
        let mut slots = LiveSlots::new(&mut store);
        slots.assign(MapId(0), 1, Digest::from_u64s([9, 0, 0, 0])).unwrap();
        slots.update(MapId(0), 1, |_| Ok(Digest::from_u64s([10, 0, 0, 0]))).unwrap();
        slots.rollback().unwrap();
        assert_eq!(store, before);
    }
}
