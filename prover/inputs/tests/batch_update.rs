use ledger_hasher::{hash_chain::create_hash_chain_from_slice, Hash, Poseidon};
use ledger_merkle_tree::{MerkleTreeError, PersistentMerkleTree};
use ledger_prover_inputs::{
    helpers::hash_to_big_uint,
    proof_types::batch_update::{get_batch_update_inputs, BatchUpdateParameters},
    validator::validate_batch_update,
    ProverInputsError, ValidationError,
};
use num_bigint::BigUint;

const HEIGHT: usize = 4;

fn leaf(i: u8) -> Hash {
    let mut leaf = [0u8; 32];
    leaf[31] = i;
    leaf
}

fn tree_with_prefix(len: u8) -> PersistentMerkleTree<Poseidon> {
    let mut tree = PersistentMerkleTree::<Poseidon>::new(HEIGHT).unwrap();
    for i in 0..len {
        tree.apply(i as usize, leaf(i + 1)).unwrap();
    }
    tree
}

fn params(leaves: Vec<Hash>, path_indices: Vec<usize>) -> BatchUpdateParameters {
    BatchUpdateParameters {
        batch_size: leaves.len(),
        leaves,
        path_indices,
        old_root: None,
        leaves_hashchain: None,
        zkp_batch_size: None,
    }
}

#[test]
fn test_batch_update_skips_occupied_slots() {
    let tree = tree_with_prefix(4);
    let old_root = tree.root();
    let leaves = vec![leaf(100), leaf(101), leaf(102)];
    let (new_tree, inputs) =
        get_batch_update_inputs(&tree, params(leaves.clone(), vec![5, 2, 7])).unwrap();

    assert_eq!(tree.root(), old_root);
    assert_eq!(new_tree.leaf(5).unwrap(), leaf(100));
    assert_eq!(new_tree.leaf(2).unwrap(), leaf(3));
    assert_eq!(new_tree.leaf(7).unwrap(), leaf(102));
    assert_eq!(
        inputs.old_leaves,
        vec![BigUint::default(), BigUint::from(3u8), BigUint::default()]
    );

    let mut expected = tree_with_prefix(4);
    expected.apply(5, leaf(100)).unwrap();
    expected.apply(7, leaf(102)).unwrap();
    assert_eq!(new_tree.root(), expected.root());
    assert_eq!(inputs.new_root, hash_to_big_uint(&expected.root()));
    assert_eq!(
        inputs.leaves_hashchain_hash,
        hash_to_big_uint(&create_hash_chain_from_slice(&leaves).unwrap())
    );
    validate_batch_update(&inputs).unwrap();
}

#[test]
fn test_batch_update_is_idempotent() {
    let tree = tree_with_prefix(2);
    let batch = params(vec![leaf(50), leaf(51)], vec![8, 9]);
    let (once, first) = get_batch_update_inputs(&tree, batch.clone()).unwrap();
    let (twice, second) = get_batch_update_inputs(&once, batch).unwrap();

    assert_eq!(once.root(), twice.root());
    assert_eq!(second.old_root, first.new_root);
    assert_eq!(second.new_root, second.old_root);
    validate_batch_update(&second).unwrap();
}

#[test]
fn test_duplicate_index_in_one_batch() {
    let tree = tree_with_prefix(1);
    let (new_tree, inputs) =
        get_batch_update_inputs(&tree, params(vec![leaf(7), leaf(8)], vec![3, 3])).unwrap();
    assert_eq!(new_tree.leaf(3).unwrap(), leaf(7));
    assert_eq!(inputs.old_leaves[1], BigUint::from(7u8));
    validate_batch_update(&inputs).unwrap();
}

#[test]
fn test_batch_update_rejects_bad_parameters() {
    let tree = tree_with_prefix(2);

    assert!(matches!(
        get_batch_update_inputs(&tree, params(vec![leaf(1), leaf(2)], vec![4])),
        Err(ProverInputsError::ShapeMismatch {
            name: "path_indices",
            expected: 2,
            actual: 1
        })
    ));

    assert!(matches!(
        get_batch_update_inputs(&tree, params(vec![leaf(1)], vec![16])),
        Err(ProverInputsError::MerkleTree(
            MerkleTreeError::IndexOutOfBounds {
                index: 16,
                capacity: 16
            }
        ))
    ));

    let mut wrong_root = params(vec![leaf(1)], vec![4]);
    wrong_root.old_root = Some([9u8; 32]);
    assert!(matches!(
        get_batch_update_inputs(&tree, wrong_root),
        Err(ProverInputsError::InconsistentChainedState(_))
    ));

    let mut wrong_chain = params(vec![leaf(1)], vec![4]);
    wrong_chain.leaves_hashchain = Some(leaf(2));
    assert!(matches!(
        get_batch_update_inputs(&tree, wrong_chain),
        Err(ProverInputsError::HashchainMismatch { batch_size: 1, .. })
    ));
}

#[test]
fn test_validator_detects_tampering() {
    let tree = tree_with_prefix(4);
    let (_, inputs) =
        get_batch_update_inputs(&tree, params(vec![leaf(20), leaf(21)], vec![6, 1])).unwrap();

    let mut tampered = inputs.clone();
    tampered.old_leaves[1] = BigUint::default();
    assert_eq!(
        validate_batch_update(&tampered),
        Err(ValidationError::MerkleProofMismatch { position: 1 })
    );

    let mut tampered = inputs.clone();
    tampered.merkle_proofs[0].pop();
    assert_eq!(
        validate_batch_update(&tampered),
        Err(ValidationError::ShapeMismatch {
            name: "merkle_proofs",
            expected: HEIGHT,
            actual: HEIGHT - 1
        })
    );

    let mut tampered = inputs.clone();
    tampered.new_root += 1u32;
    assert_eq!(validate_batch_update(&tampered), Err(ValidationError::NewRootMismatch));

    let mut tampered = inputs;
    tampered.public_input_hash = BigUint::default();
    assert_eq!(
        validate_batch_update(&tampered),
        Err(ValidationError::PublicInputHashMismatch)
    );
}

#[test]
fn test_validator_rejects_aliased_index() {
    let tree = tree_with_prefix(4);
    let (_, inputs) = get_batch_update_inputs(&tree, params(vec![leaf(30)], vec![5])).unwrap();
    validate_batch_update(&inputs).unwrap();

    // Same low bits as slot 5, so the proof alone would still verify.
    let mut aliased = inputs.clone();
    aliased.path_indices = vec![5 + 16 * 1000];
    assert_eq!(
        validate_batch_update(&aliased),
        Err(ValidationError::MerkleTree(MerkleTreeError::IndexOutOfBounds {
            index: 16005,
            capacity: 16
        }))
    );

    let mut aliased = inputs;
    aliased.path_indices = vec![usize::MAX];
    assert!(matches!(
        validate_batch_update(&aliased),
        Err(ValidationError::MerkleTree(MerkleTreeError::IndexOutOfBounds { .. }))
    ));
}
