use std::str::FromStr;

use ledger_hasher::{bigint::bigint_to_be_bytes_array, Hasher, Poseidon};
use ledger_indexed_merkle_tree::{
    highest_address_plus_one, IndexedMerkleTree, IndexedMerkleTreeError, LeafEncoding,
    RawIndexedElement, HIGHEST_ADDRESS_PLUS_ONE,
};
use ledger_merkle_tree::compute_root_from_merkle_proof;
use num_bigint::{BigUint, RandBigInt, ToBigUint};
use rand::thread_rng;

fn init_tree(height: usize) -> IndexedMerkleTree<Poseidon> {
    let mut tree = IndexedMerkleTree::<Poseidon>::new(height, LeafEncoding::Legacy).unwrap();
    tree.init().unwrap();
    tree
}

#[test]
fn test_highest_address_constant() {
    assert_eq!(
        BigUint::from_str(HIGHEST_ADDRESS_PLUS_ONE).unwrap(),
        highest_address_plus_one()
    );
}

/// Element `{ value: 0, next_index: 1 }` pointing to the max sentinel.
#[test]
fn test_reference_indexed_element_hash() {
    let tree = init_tree(26);
    let expected = [
        40, 8, 192, 134, 75, 198, 77, 187, 129, 249, 133, 121, 54, 189, 242, 28, 117, 71, 255,
        32, 155, 52, 136, 196, 99, 146, 204, 174, 160, 238, 0, 110,
    ];
    assert_eq!(tree.indexed_array.hash_element(0).unwrap(), expected);
    assert_eq!(tree.merkle_tree.leaf(0).unwrap(), expected);
    assert_eq!(tree.next_index(), 2);
    tree.check_linked_list().unwrap();

    // V2 leaves drop the next index: H(value, next_value).
    let mut tree = IndexedMerkleTree::<Poseidon>::new(26, LeafEncoding::V2).unwrap();
    tree.init().unwrap();
    let expected = [
        20, 60, 11, 236, 225, 135, 154, 131, 147, 160, 45, 8, 88, 53, 104, 12, 211, 241, 51, 6,
        246, 74, 149, 120, 67, 52, 190, 125, 51, 177, 204, 231,
    ];
    assert_eq!(tree.indexed_array.hash_element(0).unwrap(), expected);
    assert_eq!(tree.merkle_tree.leaf(0).unwrap(), expected);
}

#[test]
fn test_append_witnesses() {
    let mut tree = init_tree(8);
    let update = tree.append(&30_u32.to_biguint().unwrap()).unwrap();

    assert_eq!(update.old_low_element.index, 0);
    assert_eq!(update.old_low_element.next_index, 1);
    assert_eq!(update.old_low_element_next_value, highest_address_plus_one());
    assert_eq!(update.new_low_element.next_index, 2);
    assert_eq!(update.new_element.index, 2);
    assert_eq!(update.new_element.next_index, 1);
    assert_eq!(update.new_element_next_value, highest_address_plus_one());

    let old_low_root = compute_root_from_merkle_proof::<Poseidon>(
        update.old_low_leaf_hash,
        &update.low_element_proof,
        0,
    )
    .unwrap();
    assert_eq!(old_low_root, update.old_root);
    let intermediate_root = compute_root_from_merkle_proof::<Poseidon>(
        update.new_low_leaf_hash,
        &update.low_element_proof,
        0,
    )
    .unwrap();
    assert_eq!(intermediate_root, update.intermediate_root);
    // The new slot is still empty under the intermediate root.
    assert_eq!(
        compute_root_from_merkle_proof::<Poseidon>([0u8; 32], &update.new_element_proof, 2)
            .unwrap(),
        update.intermediate_root
    );
    assert_eq!(
        compute_root_from_merkle_proof::<Poseidon>(
            update.new_element_hash,
            &update.new_element_proof,
            2
        )
        .unwrap(),
        tree.root()
    );
    assert_eq!(update.new_root, tree.root());
}

#[test]
fn test_linked_list_invariant() {
    let mut rng = thread_rng();
    let mut tree = init_tree(10);
    for _ in 0..100 {
        let value = rng.gen_biguint(248) % highest_address_plus_one();
        match tree.append(&value) {
            Ok(_) => {}
            Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue) => continue,
            Err(e) => panic!("unexpected error {e:?}"),
        }
    }
    tree.check_linked_list().unwrap();
    let values: Vec<&BigUint> = tree.indexed_array.iter_sorted().map(|e| &e.value).collect();
    assert_eq!(values.first().unwrap().to_string(), "0");
    assert_eq!(**values.last().unwrap(), highest_address_plus_one());
    assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_duplicate_value_rejected_and_tree_unchanged() {
    let mut tree = init_tree(8);
    let value = 42_u32.to_biguint().unwrap();
    tree.append(&value).unwrap();
    let root = tree.root();
    let elements = tree.indexed_array.elements.clone();

    for duplicate in [value.clone(), BigUint::from(0u8), highest_address_plus_one()] {
        assert_eq!(
            tree.append(&duplicate).unwrap_err(),
            IndexedMerkleTreeError::DuplicateOrUnsortedValue
        );
    }
    assert_eq!(tree.root(), root);
    assert_eq!(tree.indexed_array.elements, elements);
    assert_eq!(tree.next_index(), 3);
}

#[test]
fn test_value_above_sentinel_rejected() {
    let mut tree = init_tree(8);
    let root = tree.root();
    assert_eq!(
        tree.append(&(highest_address_plus_one() + 1u32)).unwrap_err(),
        IndexedMerkleTreeError::ValueNotLessThanNext
    );
    assert_eq!(tree.root(), root);
}

#[test]
fn test_wrong_low_element_rejected() {
    let mut tree = init_tree(8);
    tree.append(&100_u32.to_biguint().unwrap()).unwrap();
    let root = tree.root();
    assert_eq!(
        tree.append_with_low_element_index(0, &200_u32.to_biguint().unwrap())
            .unwrap_err(),
        IndexedMerkleTreeError::ValueNotLessThanNext
    );
    assert_eq!(tree.root(), root);
}

#[test]
fn test_tree_full() {
    let mut tree = init_tree(2);
    tree.append(&1_u32.to_biguint().unwrap()).unwrap();
    tree.append(&2_u32.to_biguint().unwrap()).unwrap();
    assert_eq!(tree.next_index(), 4);
    assert_eq!(
        tree.append(&3_u32.to_biguint().unwrap()).unwrap_err(),
        IndexedMerkleTreeError::TreeFull
    );
}

#[test]
fn test_non_inclusion_proof() {
    let mut tree = init_tree(8);
    for value in [10_u32, 20, 30] {
        tree.append(&value.to_biguint().unwrap()).unwrap();
    }
    let proof = tree
        .get_non_inclusion_proof(&25_u32.to_biguint().unwrap())
        .unwrap();
    assert_eq!(proof.leaf_index, 3);
    assert_eq!(proof.next_index, 4);
    assert_eq!(
        BigUint::from_bytes_be(&proof.leaf_lower_range_value),
        20_u32.to_biguint().unwrap()
    );
    assert_eq!(
        BigUint::from_bytes_be(&proof.leaf_higher_range_value),
        30_u32.to_biguint().unwrap()
    );
    tree.verify_non_inclusion_proof(&proof).unwrap();

    let mut tampered = proof.clone();
    tampered.value = bigint_to_be_bytes_array::<32>(&35_u32.to_biguint().unwrap()).unwrap();
    assert_eq!(
        tree.verify_non_inclusion_proof(&tampered),
        Err(IndexedMerkleTreeError::InvalidNonInclusionProof)
    );

    // A proof against an older root no longer verifies.
    tree.append(&26_u32.to_biguint().unwrap()).unwrap();
    assert_eq!(
        tree.verify_non_inclusion_proof(&proof),
        Err(IndexedMerkleTreeError::InvalidNonInclusionProof)
    );
    assert_eq!(
        tree.get_non_inclusion_proof(&20_u32.to_biguint().unwrap()),
        Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue)
    );
}

#[test]
fn test_verify_raw_element() {
    let mut tree = init_tree(6);
    tree.append(&7_u32.to_biguint().unwrap()).unwrap();
    let raw = tree.indexed_array.elements[2]
        .to_raw(&highest_address_plus_one())
        .unwrap();
    let proof = tree.get_proof_of_leaf(2).unwrap();
    assert!(tree.verify(&raw, &proof).unwrap());

    let wrong = RawIndexedElement {
        next_index: 0,
        ..raw
    };
    assert!(!tree.verify(&wrong, &proof).unwrap());
}

#[test]
fn test_v2_leaf_encoding() {
    let mut tree = IndexedMerkleTree::<Poseidon>::new(6, LeafEncoding::V2).unwrap();
    tree.init().unwrap();
    let zero = [0u8; 32];
    let max = bigint_to_be_bytes_array::<32>(&highest_address_plus_one()).unwrap();
    assert_eq!(
        tree.merkle_tree.leaf(0).unwrap(),
        Poseidon::hashv(&[&zero, &max]).unwrap()
    );
    let mut legacy = init_tree(6);
    assert_ne!(tree.root(), legacy.root());

    tree.append(&5_u32.to_biguint().unwrap()).unwrap();
    legacy.append(&5_u32.to_biguint().unwrap()).unwrap();
    tree.check_linked_list().unwrap();
    assert_eq!(tree.indexed_array.elements, legacy.indexed_array.elements);
}

#[test]
fn test_snapshot_branches_independently() {
    let mut tree = init_tree(8);
    tree.append(&50_u32.to_biguint().unwrap()).unwrap();
    let snapshot = tree.clone();

    tree.append(&60_u32.to_biguint().unwrap()).unwrap();
    let mut other = snapshot.clone();
    other.append(&40_u32.to_biguint().unwrap()).unwrap();

    assert_ne!(tree.root(), other.root());
    assert_eq!(snapshot.next_index(), 3);
    assert_eq!(snapshot.indexed_array.len(), 2);
    snapshot.check_linked_list().unwrap();
    tree.check_linked_list().unwrap();
    other.check_linked_list().unwrap();
}
