//! Fuzz target for sparse map witnesses
//!
//! This target ensures:
//! 1. Witness checks never panic on arbitrary paths
//! 2. An honest witness verifies the stored leaf and nothing else
//! 3. `compute_new_root` agrees with inserting into the tree

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zkfund_fold::{MapWitness, SparseMerkleTree};
use zkfund_primitives::Digest;

#[derive(Debug, Arbitrary)]
struct WitnessInput {
    height: u8,
    leaves: Vec<(u64, [u64; 4])>,
    probe: u64,
    replacement: [u64; 4],
    /// Raw path for the garbage-in case
    index: u64,
    siblings: Vec<[u64; 4]>,
}

fn digest(limbs: [u64; 4]) -> Digest {
    // keep limbs canonical so `from_u64s` does not reduce them
    Digest::from_u64s(limbs.map(|limb| limb >> 1))
}

fuzz_target!(|input: WitnessInput| {
    let height = 1 + input.height % 24;
    let mask = (1u64 << height) - 1;

    let garbage = MapWitness::new(
        input.index,
        input.siblings.iter().take(80).map(|s| digest(*s)).collect(),
    );
    let _ = garbage.verify_old(&Digest::default(), &digest(input.replacement));
    let _ = garbage.compute_new_root(&digest(input.replacement));

    let leaves = input
        .leaves
        .iter()
        .take(64)
        .map(|(index, limbs)| (index & mask, digest(*limbs)));
    let Ok(mut tree) = SparseMerkleTree::from_leaves(height, leaves) else {
        return;
    };

    let probe = input.probe & mask;
    let Ok(witness) = tree.witness(probe) else {
        return;
    };
    let Ok(current) = tree.get(probe) else {
        return;
    };
    let root = tree.root();
    assert!(witness.verify_old(&root, &current));

    let replacement = digest(input.replacement);
    if replacement != current {
        assert!(!witness.verify_old(&root, &replacement));
    }

    let predicted = witness.compute_new_root(&replacement);
    if tree.insert(probe, replacement).is_ok() {
        assert_eq!(tree.root(), predicted);
    }
});
