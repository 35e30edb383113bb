use ledger_hasher::{
    hash_chain::{create_hash_chain_from_array, create_hash_chain_from_slice},
    Hash, Poseidon,
};
use ledger_merkle_tree::PersistentMerkleTree;
use num_bigint::BigUint;
use tracing::{debug, error, info};

use crate::{
    config::{check_batch_size, ProverInputsConfig},
    errors::ProverInputsError,
    helpers::{big_uint_to_hash, hash_to_big_uint, hashes_to_big_uints},
};

/// Leaves proposed for scattered slots. A slot is written only while it
/// still holds the empty leaf.
#[derive(Clone, Debug)]
pub struct BatchUpdateParameters {
    pub leaves: Vec<Hash>,
    pub path_indices: Vec<usize>,
    pub batch_size: usize,
    pub old_root: Option<Hash>,
    pub leaves_hashchain: Option<Hash>,
    /// Largest batch the circuit accepts.
    pub zkp_batch_size: Option<usize>,
}

impl BatchUpdateParameters {
    pub fn from_config(
        config: &ProverInputsConfig,
        leaves: Vec<Hash>,
        path_indices: Vec<usize>,
    ) -> Self {
        Self {
            batch_size: leaves.len(),
            leaves,
            path_indices,
            old_root: None,
            leaves_hashchain: None,
            zkp_batch_size: Some(config.zkp_batch_size),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchUpdateCircuitInputs {
    pub public_input_hash: BigUint,
    pub old_root: BigUint,
    pub new_root: BigUint,
    /// Hash chain of the proposed leaves, skipped slots included.
    pub leaves_hashchain_hash: BigUint,
    pub leaves: Vec<BigUint>,
    pub old_leaves: Vec<BigUint>,
    pub merkle_proofs: Vec<Vec<BigUint>>,
    pub path_indices: Vec<usize>,
    pub height: usize,
    pub batch_size: usize,
}

impl BatchUpdateCircuitInputs {
    pub fn public_inputs_arr(&self) -> Result<Hash, ProverInputsError> {
        Ok(big_uint_to_hash(&self.public_input_hash)?)
    }
}

/// Applies the batch to a snapshot of `tree` and returns the advanced tree
/// with the circuit inputs. `tree` itself is not modified, so a rejected
/// batch leaves nothing to roll back.
pub fn get_batch_update_inputs(
    tree: &PersistentMerkleTree<Poseidon>,
    params: BatchUpdateParameters,
) -> Result<(PersistentMerkleTree<Poseidon>, BatchUpdateCircuitInputs), ProverInputsError> {
    for (name, len) in [
        ("leaves", params.leaves.len()),
        ("path_indices", params.path_indices.len()),
    ] {
        if len != params.batch_size {
            return Err(ProverInputsError::ShapeMismatch {
                name,
                expected: params.batch_size,
                actual: len,
            });
        }
    }
    check_batch_size(params.batch_size, params.zkp_batch_size)?;
    let old_root = tree.root();
    if let Some(declared) = params.old_root {
        if declared != old_root {
            error!("declared old root does not match the tree");
            return Err(ProverInputsError::InconsistentChainedState(format!(
                "declared old root {:?} != tree root {:?}",
                declared, old_root
            )));
        }
    }
    let leaves_hashchain = create_hash_chain_from_slice(&params.leaves)?;
    if let Some(expected) = params.leaves_hashchain {
        if expected != leaves_hashchain {
            return Err(ProverInputsError::HashchainMismatch {
                computed: leaves_hashchain,
                expected,
                batch_size: params.batch_size,
                next_index: 0,
            });
        }
    }

    let mut tree = tree.snapshot();
    let mut old_leaves = Vec::with_capacity(params.batch_size);
    let mut merkle_proofs = Vec::with_capacity(params.batch_size);
    for (leaf, index) in params.leaves.iter().zip(params.path_indices.iter()) {
        let old_leaf = tree.leaf(*index)?;
        let merkle_proof = tree.get_proof_of_leaf(*index)?;
        // Occupied slots keep their leaf, which makes replaying a batch a no-op.
        if old_leaf == [0u8; 32] {
            tree.apply(*index, *leaf)?;
        } else {
            debug!(index, "slot already occupied, skipping");
        }
        old_leaves.push(old_leaf);
        merkle_proofs.push(hashes_to_big_uints(&merkle_proof));
    }

    let new_root = tree.root();
    let public_input_hash = create_hash_chain_from_array([old_root, new_root, leaves_hashchain])?;
    info!(batch_size = params.batch_size, "finalized batch update");

    let inputs = BatchUpdateCircuitInputs {
        public_input_hash: hash_to_big_uint(&public_input_hash),
        old_root: hash_to_big_uint(&old_root),
        new_root: hash_to_big_uint(&new_root),
        leaves_hashchain_hash: hash_to_big_uint(&leaves_hashchain),
        leaves: hashes_to_big_uints(&params.leaves),
        old_leaves: hashes_to_big_uints(&old_leaves),
        merkle_proofs,
        path_indices: params.path_indices,
        height: tree.height(),
        batch_size: params.batch_size,
    };
    Ok((tree, inputs))
}
