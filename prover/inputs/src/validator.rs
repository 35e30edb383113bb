//! Re-derives every relation a batch circuit constrains from the witness
//! alone. The stateless `validate_*` functions check one transition, the
//! [`TransitionValidator`] additionally checks that successive batches chain.

use ledger_hasher::{
    bigint::bigint_to_be_bytes_array,
    hash_chain::{
        create_hash_chain_from_array, create_hash_chain_from_slice, create_two_inputs_hash_chain,
    },
    Hash, Poseidon,
};
use ledger_indexed_merkle_tree::{IndexedMerkleTree, LeafEncoding, ADDRESS_MAX_BITS};
use ledger_merkle_tree::{
    capacity_of, compute_root_from_merkle_proof, MerkleTreeError, PersistentMerkleTree,
    SparseMerkleTree,
};
use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::{
    errors::ValidationError,
    helpers::{big_uint_to_hash, big_uints_to_hashes, index_to_hash},
    proof_types::{
        batch_address_append::BatchAddressAppendInputs, batch_append::BatchAppendCircuitInputs,
        batch_update::BatchUpdateCircuitInputs, inclusion::InclusionProofInputs,
    },
};

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected != actual {
        return Err(ValidationError::ShapeMismatch {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_proofs(
    name: &'static str,
    proofs: &[Vec<BigUint>],
    batch_size: usize,
    height: usize,
) -> Result<Vec<Vec<Hash>>, ValidationError> {
    check_len(name, batch_size, proofs.len())?;
    proofs
        .iter()
        .map(|proof| -> Result<Vec<Hash>, ValidationError> {
            check_len(name, height, proof.len())?;
            Ok(big_uints_to_hashes(proof)?)
        })
        .collect()
}

fn index_to_hash_checked(index: usize) -> Result<Hash, ValidationError> {
    Ok(index_to_hash(index)?)
}

/// The circuit decomposes a leaf index into exactly `height` bits, so an
/// index at or past `2^height` must not alias onto a lower slot.
fn check_index(index: usize, height: usize) -> Result<(), ValidationError> {
    let capacity = capacity_of(height)?;
    if index >= capacity {
        return Err(MerkleTreeError::IndexOutOfBounds { index, capacity }.into());
    }
    Ok(())
}

pub fn validate_batch_append(inputs: &BatchAppendCircuitInputs) -> Result<(), ValidationError> {
    check_len("subtrees", inputs.tree_height, inputs.subtrees.len())?;
    let subtrees = big_uints_to_hashes(&inputs.subtrees)?;
    let leaves = big_uints_to_hashes(&inputs.leaves)?;

    let old_sub_tree_hash_chain = create_hash_chain_from_slice(&subtrees)?;
    if old_sub_tree_hash_chain != big_uint_to_hash(&inputs.old_sub_tree_hash_chain)? {
        return Err(ValidationError::OldSubTreeHashChainMismatch);
    }
    let mut tree =
        SparseMerkleTree::<Poseidon>::new(inputs.tree_height, subtrees, inputs.start_index)?;
    if tree.root() != big_uint_to_hash(&inputs.old_root)? {
        return Err(ValidationError::OldRootMismatch);
    }
    let leaves_hashchain = create_hash_chain_from_slice(&leaves)?;
    if leaves_hashchain != big_uint_to_hash(&inputs.hashchain_hash)? {
        return Err(ValidationError::LeavesHashChainMismatch);
    }
    for leaf in leaves {
        tree.append(leaf)?;
    }
    let new_sub_tree_hash_chain = create_hash_chain_from_slice(tree.subtrees())?;
    if new_sub_tree_hash_chain != big_uint_to_hash(&inputs.new_sub_tree_hash_chain)? {
        return Err(ValidationError::NewSubTreeHashChainMismatch);
    }
    let new_root = tree.root();
    if new_root != big_uint_to_hash(&inputs.new_root)? {
        return Err(ValidationError::NewRootMismatch);
    }
    let public_input_hash = create_hash_chain_from_array([
        old_sub_tree_hash_chain,
        new_sub_tree_hash_chain,
        new_root,
        leaves_hashchain,
        index_to_hash_checked(inputs.start_index)?,
    ])?;
    if public_input_hash != big_uint_to_hash(&inputs.public_input_hash)? {
        return Err(ValidationError::PublicInputHashMismatch);
    }
    Ok(())
}

pub fn validate_batch_update(inputs: &BatchUpdateCircuitInputs) -> Result<(), ValidationError> {
    let batch_size = inputs.batch_size;
    check_len("leaves", batch_size, inputs.leaves.len())?;
    check_len("old_leaves", batch_size, inputs.old_leaves.len())?;
    check_len("path_indices", batch_size, inputs.path_indices.len())?;
    let merkle_proofs =
        check_proofs("merkle_proofs", &inputs.merkle_proofs, batch_size, inputs.height)?;
    let leaves = big_uints_to_hashes(&inputs.leaves)?;
    let old_leaves = big_uints_to_hashes(&inputs.old_leaves)?;

    let leaves_hashchain = create_hash_chain_from_slice(&leaves)?;
    if leaves_hashchain != big_uint_to_hash(&inputs.leaves_hashchain_hash)? {
        return Err(ValidationError::LeavesHashChainMismatch);
    }

    let old_root = big_uint_to_hash(&inputs.old_root)?;
    let mut running_root = old_root;
    for (position, (((leaf, old_leaf), proof), index)) in leaves
        .iter()
        .zip(old_leaves.iter())
        .zip(merkle_proofs.iter())
        .zip(inputs.path_indices.iter())
        .enumerate()
    {
        check_index(*index, inputs.height)?;
        if compute_root_from_merkle_proof::<Poseidon>(*old_leaf, proof, *index)? != running_root {
            return Err(ValidationError::MerkleProofMismatch { position });
        }
        let new_leaf = if *old_leaf == [0u8; 32] { *leaf } else { *old_leaf };
        running_root = compute_root_from_merkle_proof::<Poseidon>(new_leaf, proof, *index)?;
    }
    if running_root != big_uint_to_hash(&inputs.new_root)? {
        return Err(ValidationError::NewRootMismatch);
    }
    let public_input_hash =
        create_hash_chain_from_array([old_root, running_root, leaves_hashchain])?;
    if public_input_hash != big_uint_to_hash(&inputs.public_input_hash)? {
        return Err(ValidationError::PublicInputHashMismatch);
    }
    Ok(())
}

/// `encoding` must be the leaf encoding of the tree the batch was built on.
pub fn validate_batch_address_append(
    inputs: &BatchAddressAppendInputs,
    encoding: LeafEncoding,
) -> Result<(), ValidationError> {
    let batch_size = inputs.batch_size;
    let height = inputs.tree_height;
    check_len("low_element_values", batch_size, inputs.low_element_values.len())?;
    check_len("low_element_indices", batch_size, inputs.low_element_indices.len())?;
    check_len(
        "low_element_next_indices",
        batch_size,
        inputs.low_element_next_indices.len(),
    )?;
    check_len(
        "low_element_next_values",
        batch_size,
        inputs.low_element_next_values.len(),
    )?;
    check_len("new_element_values", batch_size, inputs.new_element_values.len())?;
    let low_element_proofs =
        check_proofs("low_element_proofs", &inputs.low_element_proofs, batch_size, height)?;
    let new_element_proofs =
        check_proofs("new_element_proofs", &inputs.new_element_proofs, batch_size, height)?;

    let values = big_uints_to_hashes(&inputs.new_element_values)?;
    let hashchain_hash = create_hash_chain_from_slice(&values)?;
    if hashchain_hash != big_uint_to_hash(&inputs.hashchain_hash)? {
        return Err(ValidationError::LeavesHashChainMismatch);
    }

    let old_root = big_uint_to_hash(&inputs.old_root)?;
    let mut running_root = old_root;
    let mut new_low_leaf_hashes = Vec::with_capacity(batch_size);
    let mut new_element_hashes = Vec::with_capacity(batch_size);
    for position in 0..batch_size {
        let low_value = &inputs.low_element_values[position];
        let next_value = &inputs.low_element_next_values[position];
        let value = &inputs.new_element_values[position];
        let in_range = [low_value, value, next_value]
            .iter()
            .all(|v| v.bits() <= ADDRESS_MAX_BITS as u64);
        if !in_range || !(low_value < value && value < next_value) {
            return Err(ValidationError::OrderingViolation { position });
        }
        let low_value = bigint_to_be_bytes_array::<32>(low_value)?;
        let next_value = bigint_to_be_bytes_array::<32>(next_value)?;
        let value = values[position];
        let low_index = inputs.low_element_indices[position];
        let low_next_index = inputs.low_element_next_indices[position];
        // Saturates to an index no tree can hold.
        let new_index = inputs.start_index.saturating_add(position);
        check_index(low_index, height)?;
        check_index(new_index, height)?;

        let old_low_leaf_hash =
            encoding.hash_leaf::<Poseidon>(&low_value, low_next_index, &next_value)?;
        let low_proof = &low_element_proofs[position];
        if compute_root_from_merkle_proof::<Poseidon>(old_low_leaf_hash, low_proof, low_index)?
            != running_root
        {
            return Err(ValidationError::LowElementProofMismatch { position });
        }
        let new_low_leaf_hash = encoding.hash_leaf::<Poseidon>(&low_value, new_index, &value)?;
        running_root =
            compute_root_from_merkle_proof::<Poseidon>(new_low_leaf_hash, low_proof, low_index)?;

        let new_proof = &new_element_proofs[position];
        if compute_root_from_merkle_proof::<Poseidon>([0u8; 32], new_proof, new_index)?
            != running_root
        {
            return Err(ValidationError::NewElementProofMismatch { position });
        }
        let new_element_hash =
            encoding.hash_leaf::<Poseidon>(&value, low_next_index, &next_value)?;
        running_root =
            compute_root_from_merkle_proof::<Poseidon>(new_element_hash, new_proof, new_index)?;

        new_low_leaf_hashes.push(new_low_leaf_hash);
        new_element_hashes.push(new_element_hash);
    }

    if running_root != big_uint_to_hash(&inputs.new_root)? {
        return Err(ValidationError::NewRootMismatch);
    }
    let leaf_hash_chain =
        create_two_inputs_hash_chain(&new_low_leaf_hashes, &new_element_hashes)?;
    if leaf_hash_chain != big_uint_to_hash(&inputs.leaf_hash_chain)? {
        return Err(ValidationError::LeafHashChainMismatch);
    }
    let public_input_hash = create_hash_chain_from_array([
        old_root,
        running_root,
        hashchain_hash,
        index_to_hash_checked(inputs.start_index)?,
    ])?;
    if public_input_hash != big_uint_to_hash(&inputs.public_input_hash)? {
        return Err(ValidationError::PublicInputHashMismatch);
    }
    Ok(())
}

/// Checks each witness against its own root, then the batch public input
/// hash over all roots and leaves.
pub fn validate_inclusion(
    inputs: &InclusionProofInputs,
    height: usize,
) -> Result<(), ValidationError> {
    let mut roots = Vec::with_capacity(inputs.inputs.len());
    let mut leaves = Vec::with_capacity(inputs.inputs.len());
    for (position, input) in inputs.inputs.iter().enumerate() {
        check_len("path_elements", height, input.path_elements.len())?;
        check_index(input.path_index, height)?;
        let proof = big_uints_to_hashes(&input.path_elements)?;
        let root = big_uint_to_hash(&input.root)?;
        let leaf = big_uint_to_hash(&input.leaf)?;
        if compute_root_from_merkle_proof::<Poseidon>(leaf, &proof, input.path_index)? != root {
            return Err(ValidationError::MerkleProofMismatch { position });
        }
        roots.push(root);
        leaves.push(leaf);
    }
    let public_input_hash = create_hash_chain_from_array([
        create_hash_chain_from_slice(&roots)?,
        create_hash_chain_from_slice(&leaves)?,
    ])?;
    if public_input_hash != big_uint_to_hash(&inputs.public_input_hash)? {
        return Err(ValidationError::PublicInputHashMismatch);
    }
    Ok(())
}

/// Accepted state of one tree across a sequence of batches. A batch is
/// accepted only if it starts where the previous one ended and its witness
/// validates; a rejected batch leaves the state unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionValidator {
    root: Hash,
    next_index: usize,
    /// Known only while the tree has grown by appends alone.
    sub_tree_hash_chain: Option<Hash>,
    leaf_encoding: LeafEncoding,
}

impl TransitionValidator {
    pub fn new(root: Hash, next_index: usize, leaf_encoding: LeafEncoding) -> Self {
        Self {
            root,
            next_index,
            sub_tree_hash_chain: None,
            leaf_encoding,
        }
    }

    /// Tracks a state tree whose leaves `0..next_index` are appended.
    pub fn from_tree(
        tree: &PersistentMerkleTree<Poseidon>,
        next_index: usize,
    ) -> Result<Self, ValidationError> {
        let subtrees = tree.rightmost_subtrees(next_index)?;
        Ok(Self {
            root: tree.root(),
            next_index,
            sub_tree_hash_chain: Some(create_hash_chain_from_slice(&subtrees)?),
            leaf_encoding: LeafEncoding::default(),
        })
    }

    pub fn from_indexed_tree(tree: &IndexedMerkleTree<Poseidon>) -> Self {
        Self::new(tree.root(), tree.next_index(), tree.encoding())
    }

    pub fn root(&self) -> Hash {
        self.root
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn sub_tree_hash_chain(&self) -> Option<Hash> {
        self.sub_tree_hash_chain
    }

    fn check_old_root(&self, old_root: &BigUint) -> Result<(), ValidationError> {
        let old_root = big_uint_to_hash(old_root)?;
        if old_root != self.root {
            warn!("batch does not start at the accepted root");
            return Err(ValidationError::InconsistentChainedState(format!(
                "batch old root {:?} != accepted root {:?}",
                old_root, self.root
            )));
        }
        Ok(())
    }

    fn check_start_index(&self, start_index: usize) -> Result<(), ValidationError> {
        if start_index != self.next_index {
            warn!(
                start_index,
                next_index = self.next_index,
                "batch does not start at the accepted index"
            );
            return Err(ValidationError::InconsistentChainedState(format!(
                "batch start index {} != accepted next index {}",
                start_index, self.next_index
            )));
        }
        Ok(())
    }

    /// Advances the accepted next index by `batch_size` without mutating it.
    fn advance(&self, batch_size: usize, height: usize) -> Result<usize, ValidationError> {
        let capacity = capacity_of(height)?;
        match self.next_index.checked_add(batch_size) {
            Some(next_index) if next_index <= capacity => Ok(next_index),
            _ => Err(MerkleTreeError::TreeCapacityExceeded {
                start_index: self.next_index,
                batch_size,
                capacity,
            }
            .into()),
        }
    }

    pub fn accept_append(
        &mut self,
        inputs: &BatchAppendCircuitInputs,
    ) -> Result<(), ValidationError> {
        self.check_old_root(&inputs.old_root)?;
        self.check_start_index(inputs.start_index)?;
        if let Some(expected) = self.sub_tree_hash_chain {
            if big_uint_to_hash(&inputs.old_sub_tree_hash_chain)? != expected {
                return Err(ValidationError::InconsistentChainedState(
                    "batch old subtree hash chain != accepted subtree hash chain".to_string(),
                ));
            }
        }
        validate_batch_append(inputs)?;
        let next_index = self.advance(inputs.leaves.len(), inputs.tree_height)?;
        let root = big_uint_to_hash(&inputs.new_root)?;
        let sub_tree_hash_chain = big_uint_to_hash(&inputs.new_sub_tree_hash_chain)?;

        self.root = root;
        self.next_index = next_index;
        self.sub_tree_hash_chain = Some(sub_tree_hash_chain);
        debug!(next_index = self.next_index, "accepted batch append");
        Ok(())
    }

    pub fn accept_update(
        &mut self,
        inputs: &BatchUpdateCircuitInputs,
    ) -> Result<(), ValidationError> {
        self.check_old_root(&inputs.old_root)?;
        validate_batch_update(inputs)?;

        self.root = big_uint_to_hash(&inputs.new_root)?;
        // Updated slots may sit inside the frontier subtrees.
        self.sub_tree_hash_chain = None;
        debug!(batch_size = inputs.batch_size, "accepted batch update");
        Ok(())
    }

    pub fn accept_address_append(
        &mut self,
        inputs: &BatchAddressAppendInputs,
    ) -> Result<(), ValidationError> {
        self.check_old_root(&inputs.old_root)?;
        self.check_start_index(inputs.start_index)?;
        validate_batch_address_append(inputs, self.leaf_encoding)?;
        let next_index = self.advance(inputs.batch_size, inputs.tree_height)?;

        self.root = big_uint_to_hash(&inputs.new_root)?;
        self.next_index = next_index;
        debug!(next_index = self.next_index, "accepted batch address append");
        Ok(())
    }
}
