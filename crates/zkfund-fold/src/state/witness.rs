//! Map witnesses
//!
//! A witness is the sibling path for one index. Replaying a leaf along the
//! path yields a root; that is the only way a leaf is ever read or replaced
//! inside a fold step.

use serde::{Deserialize, Serialize};
use zkfund_primitives::Digest;

use super::tree::index_in_range;

/// Authentication path for a single index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapWitness {
    index: u64,
    /// Sibling hashes from the leaf level up to just below the root
    siblings: Vec<Digest>,
}

impl MapWitness {
    pub fn new(index: u64, siblings: Vec<Digest>) -> Self {
        Self { index, siblings }
    }

    /// Index this witness speaks for
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Height of the tree the witness was taken from
    pub fn height(&self) -> usize {
        self.siblings.len()
    }

    pub fn siblings(&self) -> &[Digest] {
        &self.siblings
    }

    /// Root obtained by placing `leaf` at this witness's index
    pub fn compute_root(&self, leaf: &Digest) -> Digest {
        let mut current = *leaf;
        for (level, sibling) in self.siblings.iter().enumerate() {
            let is_left = self.index.checked_shr(level as u32).unwrap_or(0) & 1 == 0;
            current = if is_left {
                Digest::merge(&current, sibling)
            } else {
                Digest::merge(sibling, &current)
            };
        }
        current
    }

    /// True iff `leaf` at this index is consistent with `root`
    pub fn verify_old(&self, root: &Digest, leaf: &Digest) -> bool {
        let height = self.siblings.len();
        if height == 0 || height > 64 || !index_in_range(self.index, height as u8) {
            return false;
        }
        self.compute_root(leaf) == *root
    }

    /// Root after hypothetically setting the leaf; stored state is untouched
    pub fn compute_new_root(&self, leaf: &Digest) -> Digest {
        self.compute_root(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SparseMerkleTree;

    fn leaf(value: u64) -> Digest {
        Digest::from_u64s([value, 1, 2, 3])
    }

    #[test]
    fn test_verify_old_membership() {
        let tree = SparseMerkleTree::from_leaves(8, [(4, leaf(4)), (200, leaf(200))]).unwrap();
        let witness = tree.witness(200).unwrap();
        assert_eq!(witness.index(), 200);
        assert_eq!(witness.height(), 8);
        assert!(witness.verify_old(&tree.root(), &leaf(200)));
        assert!(!witness.verify_old(&tree.root(), &leaf(201)));
    }

    #[test]
    fn test_verify_old_non_membership() {
        let tree = SparseMerkleTree::from_leaves(8, [(4, leaf(4))]).unwrap();
        let witness = tree.witness(5).unwrap();
        assert!(witness.verify_old(&tree.root(), &Digest::ZERO));
        assert!(!witness.verify_old(&tree.root(), &leaf(4)));
    }

    #[test]
    fn test_witness_is_bound_to_its_index() {
        let tree = SparseMerkleTree::from_leaves(8, [(4, leaf(4)), (5, leaf(5))]).unwrap();
        let witness = tree.witness(4).unwrap();
        let moved = MapWitness::new(5, witness.siblings().to_vec());
        assert!(!moved.verify_old(&tree.root(), &leaf(4)));
    }

    #[test]
    fn test_stale_witness_rejected_after_update() {
        let mut tree = SparseMerkleTree::new(6).unwrap();
        let witness = tree.witness(1).unwrap();
        tree.insert(2, leaf(2)).unwrap();
        assert!(!witness.verify_old(&tree.root(), &Digest::ZERO));
    }

    #[test]
    fn test_out_of_range_index_never_verifies() {
        let tree = SparseMerkleTree::new(4).unwrap();
        let witness = tree.witness(3).unwrap();
        let forged = MapWitness::new(3 + 16, witness.siblings().to_vec());
        assert!(!forged.verify_old(&tree.root(), &Digest::ZERO));
    }
}
