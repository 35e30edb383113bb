use ledger_hasher::{hash_chain::create_hash_chain_from_slice, Hash, Poseidon};
use ledger_merkle_tree::{capacity_of, MerkleTreeError, PersistentMerkleTree, SparseMerkleTree};
use num_bigint::BigUint;
use tracing::{debug, error, info};

use crate::{
    config::{check_batch_size, ProverInputsConfig},
    errors::ProverInputsError,
    helpers::{big_uint_to_hash, hash_to_big_uint, hashes_to_big_uints, index_to_hash},
};

/// A batch of fresh leaves appended at `start_index`.
#[derive(Clone, Debug)]
pub struct BatchAppendParameters {
    pub tree_height: usize,
    pub start_index: usize,
    /// Rightmost subtrees of the tree before the batch.
    pub subtrees: Vec<Hash>,
    pub leaves: Vec<Hash>,
    pub batch_size: usize,
    /// Root the caller believes the tree has, checked against the subtrees.
    pub old_root: Option<Hash>,
    /// Hash chain of the leaves as committed by the queue.
    pub leaves_hashchain: Option<Hash>,
    /// Largest batch the circuit accepts.
    pub zkp_batch_size: Option<usize>,
}

impl BatchAppendParameters {
    /// Batch for the configured state tree, bounded by the circuit batch size.
    pub fn from_config(
        config: &ProverInputsConfig,
        start_index: usize,
        subtrees: Vec<Hash>,
        leaves: Vec<Hash>,
    ) -> Self {
        Self {
            tree_height: config.state_tree_height,
            start_index,
            subtrees,
            batch_size: leaves.len(),
            leaves,
            old_root: None,
            leaves_hashchain: None,
            zkp_batch_size: Some(config.zkp_batch_size),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchAppendCircuitInputs {
    pub public_input_hash: BigUint,
    pub old_root: BigUint,
    pub new_root: BigUint,
    pub old_sub_tree_hash_chain: BigUint,
    pub new_sub_tree_hash_chain: BigUint,
    pub hashchain_hash: BigUint,
    pub start_index: usize,
    pub tree_height: usize,
    pub leaves: Vec<BigUint>,
    pub subtrees: Vec<BigUint>,
}

impl BatchAppendCircuitInputs {
    pub fn public_inputs_arr(&self) -> Result<Hash, ProverInputsError> {
        Ok(big_uint_to_hash(&self.public_input_hash)?)
    }
}

/// `Init -> insert* -> finalize` over the rightmost-subtree frontier. No
/// sibling proofs are carried, only the `O(height)` subtree vector.
#[derive(Debug)]
pub struct BatchAppendEngine {
    tree: SparseMerkleTree<Poseidon>,
    start_index: usize,
    old_root: Hash,
    old_subtrees: Vec<Hash>,
    old_sub_tree_hash_chain: Hash,
    leaves: Vec<Hash>,
}

impl BatchAppendEngine {
    pub fn new(
        tree_height: usize,
        start_index: usize,
        subtrees: Vec<Hash>,
    ) -> Result<Self, ProverInputsError> {
        if subtrees.len() != tree_height {
            return Err(ProverInputsError::ShapeMismatch {
                name: "subtrees",
                expected: tree_height,
                actual: subtrees.len(),
            });
        }
        let tree = match SparseMerkleTree::<Poseidon>::new(
            tree_height,
            subtrees.clone(),
            start_index,
        ) {
            Ok(tree) => tree,
            Err(MerkleTreeError::IndexOutOfBounds { index, capacity }) => {
                return Err(ProverInputsError::TreeCapacityExceeded {
                    start_index: index,
                    batch_size: 0,
                    capacity,
                })
            }
            Err(e) => return Err(e.into()),
        };
        let old_sub_tree_hash_chain = create_hash_chain_from_slice(&subtrees)?;
        Ok(Self {
            old_root: tree.root(),
            tree,
            start_index,
            old_subtrees: subtrees,
            old_sub_tree_hash_chain,
            leaves: Vec::new(),
        })
    }

    /// Starts a batch behind the leaves `0..start_index` of `tree`.
    pub fn from_tree(
        tree: &PersistentMerkleTree<Poseidon>,
        start_index: usize,
    ) -> Result<Self, ProverInputsError> {
        Self::new(tree.height(), start_index, tree.rightmost_subtrees(start_index)?)
    }

    pub fn old_root(&self) -> Hash {
        self.old_root
    }

    pub fn old_sub_tree_hash_chain(&self) -> Hash {
        self.old_sub_tree_hash_chain
    }

    pub fn next_index(&self) -> usize {
        self.tree.next_index()
    }

    pub fn insert(&mut self, leaf: Hash) -> Result<(), ProverInputsError> {
        match self.tree.append(leaf) {
            Ok(_) => {}
            Err(MerkleTreeError::TreeCapacityExceeded { capacity, .. }) => {
                return Err(ProverInputsError::TreeCapacityExceeded {
                    start_index: self.start_index,
                    batch_size: self.leaves.len() + 1,
                    capacity,
                })
            }
            Err(e) => return Err(e.into()),
        }
        self.leaves.push(leaf);
        Ok(())
    }

    /// Returns the advanced frontier and the circuit inputs of the batch.
    pub fn finalize(
        self,
    ) -> Result<(SparseMerkleTree<Poseidon>, BatchAppendCircuitInputs), ProverInputsError> {
        let new_root = self.tree.root();
        let new_sub_tree_hash_chain = create_hash_chain_from_slice(self.tree.subtrees())?;
        let leaves_hashchain = create_hash_chain_from_slice(&self.leaves)?;
        let public_input_hash = create_hash_chain_from_slice(&[
            self.old_sub_tree_hash_chain,
            new_sub_tree_hash_chain,
            new_root,
            leaves_hashchain,
            index_to_hash(self.start_index)?,
        ])?;
        info!(
            start_index = self.start_index,
            batch_size = self.leaves.len(),
            "finalized batch append"
        );

        let inputs = BatchAppendCircuitInputs {
            public_input_hash: hash_to_big_uint(&public_input_hash),
            old_root: hash_to_big_uint(&self.old_root),
            new_root: hash_to_big_uint(&new_root),
            old_sub_tree_hash_chain: hash_to_big_uint(&self.old_sub_tree_hash_chain),
            new_sub_tree_hash_chain: hash_to_big_uint(&new_sub_tree_hash_chain),
            hashchain_hash: hash_to_big_uint(&leaves_hashchain),
            start_index: self.start_index,
            tree_height: self.tree.height(),
            leaves: hashes_to_big_uints(&self.leaves),
            subtrees: hashes_to_big_uints(&self.old_subtrees),
        };
        Ok((self.tree, inputs))
    }
}

pub fn get_batch_append_inputs(
    params: BatchAppendParameters,
) -> Result<(SparseMerkleTree<Poseidon>, BatchAppendCircuitInputs), ProverInputsError> {
    if params.leaves.len() != params.batch_size {
        return Err(ProverInputsError::ShapeMismatch {
            name: "leaves",
            expected: params.batch_size,
            actual: params.leaves.len(),
        });
    }
    check_batch_size(params.batch_size, params.zkp_batch_size)?;
    let capacity = capacity_of(params.tree_height)?;
    let fits = params
        .start_index
        .checked_add(params.batch_size)
        .is_some_and(|end| end <= capacity);
    if !fits {
        return Err(ProverInputsError::TreeCapacityExceeded {
            start_index: params.start_index,
            batch_size: params.batch_size,
            capacity,
        });
    }
    let mut engine =
        BatchAppendEngine::new(params.tree_height, params.start_index, params.subtrees)?;
    if let Some(old_root) = params.old_root {
        if old_root != engine.old_root() {
            error!(
                start_index = params.start_index,
                "declared old root does not match the subtrees"
            );
            return Err(ProverInputsError::InconsistentChainedState(format!(
                "declared old root {:?} != root {:?} derived from subtrees at index {}",
                old_root,
                engine.old_root(),
                params.start_index
            )));
        }
    }
    if let Some(expected) = params.leaves_hashchain {
        let computed = create_hash_chain_from_slice(&params.leaves)?;
        if computed != expected {
            error!(
                batch_size = params.batch_size,
                next_index = params.start_index,
                "leaves hashchain mismatch"
            );
            return Err(ProverInputsError::HashchainMismatch {
                computed,
                expected,
                batch_size: params.batch_size,
                next_index: params.start_index,
            });
        }
    }
    debug!(
        start_index = params.start_index,
        batch_size = params.batch_size,
        "building batch append inputs"
    );
    for leaf in params.leaves {
        engine.insert(leaf)?;
    }
    engine.finalize()
}
