use ledger_hasher::{
    hash_chain::{create_hash_chain_from_array, create_hash_chain_from_slice},
    Hash, Poseidon,
};
use ledger_merkle_tree::PersistentMerkleTree;
use num_bigint::BigUint;
use tracing::debug;

use crate::{
    errors::ProverInputsError,
    helpers::{big_uint_to_hash, hash_to_big_uint, hashes_to_big_uints},
};

/// Witness that `leaf` sits at `path_index` under `root`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionMerkleProofInputs {
    pub root: BigUint,
    pub leaf: BigUint,
    pub path_index: usize,
    pub path_elements: Vec<BigUint>,
}

impl InclusionMerkleProofInputs {
    pub fn public_inputs(&self) -> Result<[Hash; 2], ProverInputsError> {
        Ok([big_uint_to_hash(&self.root)?, big_uint_to_hash(&self.leaf)?])
    }
}

/// Inclusion witnesses proven together in one circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionProofInputs {
    /// `H(hash_chain(roots), hash_chain(leaves))`.
    pub public_input_hash: BigUint,
    pub inputs: Vec<InclusionMerkleProofInputs>,
}

impl InclusionProofInputs {
    pub fn new(inputs: Vec<InclusionMerkleProofInputs>) -> Result<Self, ProverInputsError> {
        let public_input_hash = hash_to_big_uint(&Self::public_input(&inputs)?);
        Ok(Self {
            public_input_hash,
            inputs,
        })
    }

    pub fn public_input(inputs: &[InclusionMerkleProofInputs]) -> Result<Hash, ProverInputsError> {
        let mut roots = Vec::with_capacity(inputs.len());
        let mut leaves = Vec::with_capacity(inputs.len());
        for input in inputs {
            let [root, leaf] = input.public_inputs()?;
            roots.push(root);
            leaves.push(leaf);
        }
        Ok(create_hash_chain_from_array([
            create_hash_chain_from_slice(&roots)?,
            create_hash_chain_from_slice(&leaves)?,
        ])?)
    }
}

/// Inclusion witnesses for the leaves at `indices` of `tree`.
pub fn get_inclusion_inputs(
    tree: &PersistentMerkleTree<Poseidon>,
    indices: &[usize],
) -> Result<InclusionProofInputs, ProverInputsError> {
    let root = hash_to_big_uint(&tree.root());
    let mut inputs = Vec::with_capacity(indices.len());
    for index in indices {
        let proof = tree.get_proof_of_leaf(*index)?;
        debug!(leaf_index = *index, "inclusion witness");
        inputs.push(InclusionMerkleProofInputs {
            root: root.clone(),
            leaf: hash_to_big_uint(&tree.leaf(*index)?),
            path_index: *index,
            path_elements: hashes_to_big_uints(&proof),
        });
    }
    InclusionProofInputs::new(inputs)
}
