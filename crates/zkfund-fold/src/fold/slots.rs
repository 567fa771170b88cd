//! Slot access backed by supplied witnesses

use std::slice;

use zkfund_primitives::Digest;

use super::witness::StepWitness;
use crate::contract::SlotAccess;
use crate::error::{FoldError, FoldResult};
use crate::state::{MapId, MapRoots, MapSpec};

/// Consumes witnesses in order and advances the claimed roots
///
/// Every access must be answered by the next witness: same map, same index,
/// a path of the map's height, and an old leaf that hashes to the current
/// root.
pub struct WitnessedSlots<'a> {
    layout: &'a [MapSpec],
    roots: &'a mut MapRoots,
    witnesses: slice::Iter<'a, StepWitness>,
}

impl<'a> WitnessedSlots<'a> {
    pub fn new(layout: &'a [MapSpec], roots: &'a mut MapRoots, witnesses: &'a [StepWitness]) -> Self {
        Self {
            layout,
            roots,
            witnesses: witnesses.iter(),
        }
    }

    /// Fails if the action left witnesses unconsumed
    pub fn finish(self) -> FoldResult<()> {
        match self.witnesses.len() {
            0 => Ok(()),
            left => Err(FoldError::UnusedWitnesses(left)),
        }
    }
}

impl SlotAccess for WitnessedSlots<'_> {
    fn update<F>(&mut self, map: MapId, index: u64, f: F) -> FoldResult<Digest>
    where
        F: FnOnce(&Digest) -> FoldResult<Digest>,
    {
        let spec = self
            .layout
            .get(map.as_usize())
            .ok_or(FoldError::UnknownMap(map))?;
        let witness = self
            .witnesses
            .next()
            .ok_or(FoldError::MissingWitness { map, index })?;

        if witness.map != map {
            return Err(FoldError::WitnessMapMismatch {
                expected: map,
                actual: witness.map,
            });
        }
        if witness.index() != index {
            return Err(FoldError::WitnessIndexMismatch {
                map,
                expected: index,
                actual: witness.index(),
            });
        }
        if witness.path.height() != spec.height as usize {
            return Err(FoldError::WitnessHeightMismatch {
                map,
                expected: spec.height,
                actual: witness.path.height(),
            });
        }

        let root = self.roots.get(map)?;
        if !witness.path.verify_old(&root, &witness.leaf) {
            return Err(FoldError::WitnessMismatch { map, index });
        }

        let leaf = f(&witness.leaf)?;
        self.roots.set(map, witness.path.compute_new_root(&leaf))?;
        Ok(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MapStore, SparseMerkleTree};

    const LAYOUT: &[MapSpec] = &[MapSpec::new("a", 4)];

    fn leaf(n: u64) -> Digest {
        Digest::from_u64s([n, 0, 0, 0])
    }

    #[test]
    fn test_update_advances_root_like_the_tree() {
        let store = MapStore::new(LAYOUT).unwrap();
        let tree = store.tree(MapId(0)).unwrap();
        let witness = StepWitness::new(MapId(0), Digest::ZERO, tree.witness(3).unwrap());

        let mut roots = store.roots();
        let witnesses = vec![witness];
        let mut slots = WitnessedSlots::new(LAYOUT, &mut roots, &witnesses);
        slots.assign(MapId(0), 3, leaf(7)).unwrap();
        slots.finish().unwrap();

        let expected = SparseMerkleTree::from_leaves(4, vec![(3, leaf(7))]).unwrap().root();
        assert_eq!(roots.get(MapId(0)).unwrap(), expected);
    }

    #[test]
    fn test_wrong_index_rejected() {
        let store = MapStore::new(LAYOUT).unwrap();
        let tree = store.tree(MapId(0)).unwrap();
        let witnesses = vec![StepWitness::new(MapId(0), Digest::ZERO, tree.witness(2).unwrap())];

        let mut roots = store.roots();
        let mut slots = WitnessedSlots::new(LAYOUT, &mut roots, &witnesses);
        let err = slots.assign(MapId(0), 3, leaf(1)).unwrap_err();
        assert_eq!(
            err,
            FoldError::WitnessIndexMismatch { map: MapId(0), expected: 3, actual: 2 }
        );
    }

    #[test]
    fn test_lying_old_leaf_rejected() {
        let tree = SparseMerkleTree::from_leaves(4, vec![(3, leaf(7))]).unwrap();
        let mut roots = MapRoots::new(vec![tree.root()]);
        // claims the slot is empty to sneak past the single-assignment check
        let witnesses = vec![StepWitness::new(MapId(0), Digest::ZERO, tree.witness(3).unwrap())];

        let mut slots = WitnessedSlots::new(LAYOUT, &mut roots, &witnesses);
        let err = slots.assign(MapId(0), 3, leaf(8)).unwrap_err();
        assert_eq!(err, FoldError::WitnessMismatch { map: MapId(0), index: 3 });
    }

    #[test]
    fn test_occupied_slot_rejected() {
        let tree = SparseMerkleTree::from_leaves(4, vec![(3, leaf(7))]).unwrap();
        let mut roots = MapRoots::new(vec![tree.root()]);
        let witnesses = vec![StepWitness::new(MapId(0), leaf(7), tree.witness(3).unwrap())];

        let mut slots = WitnessedSlots::new(LAYOUT, &mut roots, &witnesses);
        let err = slots.assign(MapId(0), 3, leaf(8)).unwrap_err();
        assert_eq!(err, FoldError::SlotOccupied { map: MapId(0), index: 3 });
    }

    #[test]
    fn test_missing_and_unused_witnesses() {
        let store = MapStore::new(LAYOUT).unwrap();
        let mut roots = store.roots();
        let mut slots = WitnessedSlots::new(LAYOUT, &mut roots, &[]);
        assert_eq!(
            slots.read(MapId(0), 1),
            Err(FoldError::MissingWitness { map: MapId(0), index: 1 })
        );

        let tree = store.tree(MapId(0)).unwrap();
        let witnesses = vec![StepWitness::new(MapId(0), Digest::ZERO, tree.witness(1).unwrap())];
        let slots = WitnessedSlots::new(LAYOUT, &mut roots, &witnesses);
        assert_eq!(slots.finish(), Err(FoldError::UnusedWitnesses(1)));
    }
}
