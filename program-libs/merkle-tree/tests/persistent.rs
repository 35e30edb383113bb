use ledger_hasher::{zero_bytes::zero_bytes, Hash, Hasher, Poseidon, Sha256BE};
use ledger_merkle_tree::{compute_root_from_merkle_proof, MerkleTreeError, PersistentMerkleTree};
use rand::{thread_rng, Rng};

fn random_leaf<R: Rng>(rng: &mut R) -> Hash {
    let mut leaf: Hash = rng.gen();
    leaf[0] = 0;
    leaf
}

#[test]
fn test_update_and_proof_round_trip() {
    let mut rng = thread_rng();
    let height = 8;
    let mut tree = PersistentMerkleTree::<Poseidon>::new(height).unwrap();
    for _ in 0..20 {
        let index = rng.gen_range(0..tree.capacity());
        let leaf = random_leaf(&mut rng);

        let old_leaf = tree.leaf(index).unwrap();
        let old_proof = tree.get_proof_of_leaf(index).unwrap();
        assert!(tree.verify(index, &old_leaf, &old_proof).unwrap());

        let (new_tree, proof) = tree.update(index, leaf).unwrap();
        assert_eq!(proof, old_proof);
        assert_eq!(new_tree.get_proof_of_leaf(index).unwrap(), proof);
        assert!(new_tree.verify(index, &leaf, &proof).unwrap());
        assert_eq!(
            compute_root_from_merkle_proof::<Poseidon>(leaf, &proof, index).unwrap(),
            new_tree.root()
        );
        // The previous version stays valid.
        assert!(tree.verify(index, &old_leaf, &old_proof).unwrap());
        tree = new_tree;
    }
}

#[test]
fn test_branching_from_snapshot() {
    let tree = PersistentMerkleTree::<Sha256BE>::new(4).unwrap();
    let (base, _) = tree.update(3, [1u8; 32]).unwrap();
    let snapshot = base.snapshot();

    let (branch_a, _) = base.update(5, [2u8; 32]).unwrap();
    let (branch_b, _) = base.update(5, [3u8; 32]).unwrap();

    assert_ne!(branch_a.root(), branch_b.root());
    assert_eq!(base.root(), snapshot.root());
    assert_eq!(base.leaf(5).unwrap(), [0u8; 32]);
    assert_eq!(branch_a.leaf(5).unwrap(), [2u8; 32]);
    assert_eq!(branch_b.leaf(3).unwrap(), [1u8; 32]);
}

#[test]
fn test_apply_matches_manual_root() {
    let height = 2;
    let mut tree = PersistentMerkleTree::<Poseidon>::new(height).unwrap();
    let leaves: Vec<Hash> = (1..=4u8)
        .map(|i| {
            let mut leaf = [0u8; 32];
            leaf[31] = i;
            leaf
        })
        .collect();
    for (i, leaf) in leaves.iter().enumerate() {
        tree.apply(i, *leaf).unwrap();
    }
    let left = Poseidon::hashv(&[&leaves[0], &leaves[1]]).unwrap();
    let right = Poseidon::hashv(&[&leaves[2], &leaves[3]]).unwrap();
    assert_eq!(tree.root(), Poseidon::hashv(&[&left, &right]).unwrap());
    assert_eq!(tree.node(1, 0).unwrap(), left);
    assert_eq!(tree.node(1, 1).unwrap(), right);
    assert_eq!(tree.node(2, 0).unwrap(), tree.root());
}

#[test]
fn test_node_of_empty_subtree() {
    let tree = PersistentMerkleTree::<Poseidon>::new(6).unwrap();
    let (tree, _) = tree.update(0, [1u8; 32]).unwrap();
    let zeros = zero_bytes::<Poseidon>(6).unwrap();
    assert_eq!(tree.node(3, 7).unwrap(), zeros[3]);
    assert_eq!(tree.node(0, 63).unwrap(), zeros[0]);
}

#[test]
fn test_index_out_of_bounds() {
    let tree = PersistentMerkleTree::<Sha256BE>::new(3).unwrap();
    let expected = MerkleTreeError::IndexOutOfBounds {
        index: 8,
        capacity: 8,
    };
    assert_eq!(tree.update(8, [1u8; 32]).unwrap_err(), expected);
    assert_eq!(tree.get_proof_of_leaf(8).unwrap_err(), expected);
    assert_eq!(tree.leaf(8).unwrap_err(), expected);
    assert_eq!(
        tree.node(1, 4).unwrap_err(),
        MerkleTreeError::IndexOutOfBounds {
            index: 4,
            capacity: 4
        }
    );
}

#[test]
fn test_verify_rejects_wrong_leaf_and_proof_length() {
    let tree = PersistentMerkleTree::<Sha256BE>::new(3).unwrap();
    let (tree, proof) = tree.update(2, [5u8; 32]).unwrap();
    assert!(!tree.verify(2, &[6u8; 32], &proof).unwrap());
    assert!(!tree.verify(3, &[5u8; 32], &proof).unwrap());
    assert_eq!(
        tree.verify(2, &[5u8; 32], &proof[..2]).unwrap_err(),
        MerkleTreeError::InvalidProofLength(2, 3)
    );
}
