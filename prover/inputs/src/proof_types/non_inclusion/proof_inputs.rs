use ledger_hasher::{Hash, Poseidon};
use ledger_indexed_merkle_tree::{IndexedMerkleTree, NonInclusionProof};
use num_bigint::BigUint;
use tracing::debug;

use crate::{
    errors::ProverInputsError,
    helpers::{big_uint_to_hash, hash_to_big_uint, hashes_to_big_uints},
};

/// Witness that `value` falls strictly inside the range of one leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonInclusionMerkleProofInputs {
    pub root: BigUint,
    pub value: BigUint,
    pub leaf_lower_range_value: BigUint,
    pub leaf_higher_range_value: BigUint,
    pub next_index: usize,
    pub merkle_proof_hashed_indexed_element_leaf: Vec<BigUint>,
    pub index_hashed_indexed_element_leaf: usize,
}

impl NonInclusionMerkleProofInputs {
    pub fn public_inputs(&self) -> Result<[Hash; 2], ProverInputsError> {
        Ok([big_uint_to_hash(&self.root)?, big_uint_to_hash(&self.value)?])
    }
}

impl From<&NonInclusionProof> for NonInclusionMerkleProofInputs {
    fn from(proof: &NonInclusionProof) -> Self {
        Self {
            root: hash_to_big_uint(&proof.root),
            value: hash_to_big_uint(&proof.value),
            leaf_lower_range_value: hash_to_big_uint(&proof.leaf_lower_range_value),
            leaf_higher_range_value: hash_to_big_uint(&proof.leaf_higher_range_value),
            next_index: proof.next_index,
            merkle_proof_hashed_indexed_element_leaf: hashes_to_big_uints(&proof.merkle_proof),
            index_hashed_indexed_element_leaf: proof.leaf_index,
        }
    }
}

impl TryFrom<&NonInclusionMerkleProofInputs> for NonInclusionProof {
    type Error = ProverInputsError;

    fn try_from(inputs: &NonInclusionMerkleProofInputs) -> Result<Self, Self::Error> {
        Ok(Self {
            root: big_uint_to_hash(&inputs.root)?,
            value: big_uint_to_hash(&inputs.value)?,
            leaf_lower_range_value: big_uint_to_hash(&inputs.leaf_lower_range_value)?,
            leaf_higher_range_value: big_uint_to_hash(&inputs.leaf_higher_range_value)?,
            leaf_index: inputs.index_hashed_indexed_element_leaf,
            next_index: inputs.next_index,
            merkle_proof: inputs
                .merkle_proof_hashed_indexed_element_leaf
                .iter()
                .map(big_uint_to_hash)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Non-inclusion witnesses for `values` against the current state of `tree`.
pub fn get_non_inclusion_inputs(
    tree: &IndexedMerkleTree<Poseidon>,
    values: &[BigUint],
) -> Result<Vec<NonInclusionMerkleProofInputs>, ProverInputsError> {
    let mut inputs = Vec::with_capacity(values.len());
    for value in values {
        let proof = tree.get_non_inclusion_proof(value)?;
        debug!(leaf_index = proof.leaf_index, "non-inclusion witness");
        inputs.push(NonInclusionMerkleProofInputs::from(&proof));
    }
    Ok(inputs)
}
