use ledger_hasher::{
    bigint::bigint_to_be_bytes_array,
    hash_chain::{
        create_hash_chain_from_array, create_hash_chain_from_slice, create_two_inputs_hash_chain,
    },
    Hash, Poseidon,
};
use ledger_indexed_merkle_tree::{IndexedMerkleTree, IndexedMerkleTreeError};
use num_bigint::BigUint;
use tracing::{debug, error, info, warn};

use crate::{
    config::{check_batch_size, ProverInputsConfig},
    constants::{ADDRESS_MAX_BITS, DEFAULT_MIN_VALUE_GAP},
    errors::ProverInputsError,
    helpers::{big_uint_to_hash, hash_to_big_uint, hashes_to_big_uints, index_to_hash},
};

#[derive(Clone, Debug)]
pub struct BatchAddressAppendParameters {
    pub new_element_values: Vec<BigUint>,
    pub batch_size: usize,
    /// Low element of the first value, carried over from the previous batch.
    pub first_low_element_index: Option<usize>,
    pub min_value_gap: BigUint,
    pub old_root: Option<Hash>,
    pub start_index: Option<usize>,
    pub leaves_hashchain: Option<Hash>,
    /// Largest batch the circuit accepts.
    pub zkp_batch_size: Option<usize>,
}

impl BatchAddressAppendParameters {
    pub fn new(new_element_values: Vec<BigUint>) -> Self {
        Self {
            batch_size: new_element_values.len(),
            new_element_values,
            first_low_element_index: None,
            min_value_gap: BigUint::from(DEFAULT_MIN_VALUE_GAP),
            old_root: None,
            start_index: None,
            leaves_hashchain: None,
            zkp_batch_size: None,
        }
    }

    /// Takes the value gap and circuit batch size from `config`.
    pub fn from_config(config: &ProverInputsConfig, new_element_values: Vec<BigUint>) -> Self {
        Self {
            min_value_gap: config.min_value_gap(),
            zkp_batch_size: Some(config.zkp_batch_size),
            ..Self::new(new_element_values)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchAddressAppendInputs {
    pub batch_size: usize,
    /// Hash chain of the new values.
    pub hashchain_hash: BigUint,
    /// Two-input hash chain of `(new_low_leaf_hash, new_element_hash)` pairs.
    pub leaf_hash_chain: BigUint,
    pub low_element_values: Vec<BigUint>,
    pub low_element_indices: Vec<usize>,
    pub low_element_next_indices: Vec<usize>,
    pub low_element_next_values: Vec<BigUint>,
    pub low_element_proofs: Vec<Vec<BigUint>>,
    pub new_element_values: Vec<BigUint>,
    pub new_element_proofs: Vec<Vec<BigUint>>,
    pub new_root: BigUint,
    pub old_root: BigUint,
    pub public_input_hash: BigUint,
    pub start_index: usize,
    pub tree_height: usize,
}

impl BatchAddressAppendInputs {
    pub fn public_inputs_arr(&self) -> Result<Hash, ProverInputsError> {
        Ok(big_uint_to_hash(&self.public_input_hash)?)
    }
}

/// Inserts values one at a time into a working copy of an indexed tree.
/// Each insertion sees the effect of the previous one, so two values of
/// the same batch that share a low element are chained correctly.
#[derive(Debug)]
pub struct BatchAddressAppendEngine {
    tree: IndexedMerkleTree<Poseidon>,
    min_value_gap: BigUint,
    old_root: Hash,
    start_index: usize,
    inputs: BatchAddressAppendInputs,
    new_element_value_hashes: Vec<Hash>,
    new_low_leaf_hashes: Vec<Hash>,
    new_element_hashes: Vec<Hash>,
}

impl BatchAddressAppendEngine {
    pub fn new(tree: IndexedMerkleTree<Poseidon>, min_value_gap: BigUint) -> Self {
        let old_root = tree.root();
        let start_index = tree.next_index();
        Self {
            inputs: BatchAddressAppendInputs {
                tree_height: tree.height(),
                start_index,
                ..Default::default()
            },
            tree,
            min_value_gap,
            old_root,
            start_index,
            new_element_value_hashes: Vec::new(),
            new_low_leaf_hashes: Vec::new(),
            new_element_hashes: Vec::new(),
        }
    }

    pub fn old_root(&self) -> Hash {
        self.old_root
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn tree(&self) -> &IndexedMerkleTree<Poseidon> {
        &self.tree
    }

    /// Inserts `value` behind `low_element_hint` if given, otherwise behind
    /// the low element found by search. On error the engine is unchanged.
    pub fn insert(
        &mut self,
        value: &BigUint,
        low_element_hint: Option<usize>,
    ) -> Result<(), ProverInputsError> {
        let position = self.inputs.new_element_values.len();
        let next_index = self.tree.next_index();
        let capacity = 1usize << self.tree.height();
        if next_index >= capacity {
            return Err(ProverInputsError::TreeFull {
                next_index,
                capacity,
            });
        }

        let low_element_index = match low_element_hint {
            Some(index) => index,
            None => match self.tree.find_low_element_index(value) {
                Ok(index) => index,
                Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue) => {
                    return Err(ProverInputsError::ValueCollision {
                        position,
                        value: value.clone(),
                    })
                }
                Err(IndexedMerkleTreeError::ValueNotLessThanNext) => {
                    return Err(ProverInputsError::OrderingViolation {
                        position,
                        low: self.tree.indexed_array.elements
                            [self.tree.indexed_array.highest_element_index()]
                        .value
                        .clone(),
                        value: value.clone(),
                        high: BigUint::default(),
                    })
                }
                Err(e) => return Err(e.into()),
            },
        };
        let low_element = self
            .tree
            .indexed_array
            .get(low_element_index)
            .ok_or(IndexedMerkleTreeError::IndexHigherThanMax)?;
        let low_value = low_element.value.clone();
        let high_value = self.tree.indexed_array.elements[low_element.next_index]
            .value
            .clone();

        if *value == low_value || *value == high_value {
            return Err(ProverInputsError::ValueCollision {
                position,
                value: value.clone(),
            });
        }
        // Range check over bounded bit widths, the way the circuit compares.
        let in_range = [&low_value, value, &high_value]
            .iter()
            .all(|v| v.bits() <= ADDRESS_MAX_BITS as u64);
        if !in_range || !(low_value < *value && *value < high_value) {
            warn!(position, "rejected address outside its low element range");
            return Err(ProverInputsError::OrderingViolation {
                position,
                low: low_value,
                value: value.clone(),
                high: high_value,
            });
        }
        let gap = &high_value - &low_value;
        if gap <= self.min_value_gap {
            return Err(ProverInputsError::InsufficientGap {
                position,
                gap,
                min_gap: self.min_value_gap.clone(),
            });
        }

        let value_hash = bigint_to_be_bytes_array::<32>(value)?;
        let update = self
            .tree
            .append_with_low_element_index(low_element_index, value)?;
        debug!(
            position,
            low_element_index,
            new_element_index = update.new_element.index,
            "inserted address"
        );

        self.inputs.low_element_values.push(update.old_low_element.value);
        self.inputs.low_element_indices.push(update.old_low_element.index);
        self.inputs
            .low_element_next_indices
            .push(update.old_low_element.next_index);
        self.inputs
            .low_element_next_values
            .push(update.old_low_element_next_value);
        self.inputs
            .low_element_proofs
            .push(hashes_to_big_uints(&update.low_element_proof));
        self.inputs.new_element_values.push(value.clone());
        self.inputs
            .new_element_proofs
            .push(hashes_to_big_uints(&update.new_element_proof));
        self.new_element_value_hashes.push(value_hash);
        self.new_low_leaf_hashes.push(update.new_low_leaf_hash);
        self.new_element_hashes.push(update.new_element_hash);
        Ok(())
    }

    pub fn finalize(
        mut self,
    ) -> Result<(IndexedMerkleTree<Poseidon>, BatchAddressAppendInputs), ProverInputsError> {
        let new_root = self.tree.root();
        let hashchain_hash = create_hash_chain_from_slice(&self.new_element_value_hashes)?;
        let leaf_hash_chain =
            create_two_inputs_hash_chain(&self.new_low_leaf_hashes, &self.new_element_hashes)?;
        let public_input_hash = create_hash_chain_from_array([
            self.old_root,
            new_root,
            hashchain_hash,
            index_to_hash(self.start_index)?,
        ])?;
        info!(
            start_index = self.start_index,
            batch_size = self.new_element_hashes.len(),
            "finalized batch address append"
        );

        self.inputs.batch_size = self.new_element_hashes.len();
        self.inputs.hashchain_hash = hash_to_big_uint(&hashchain_hash);
        self.inputs.leaf_hash_chain = hash_to_big_uint(&leaf_hash_chain);
        self.inputs.old_root = hash_to_big_uint(&self.old_root);
        self.inputs.new_root = hash_to_big_uint(&new_root);
        self.inputs.public_input_hash = hash_to_big_uint(&public_input_hash);
        Ok((self.tree, self.inputs))
    }
}

/// Runs a whole batch against a working copy of `tree`. `tree` is left
/// untouched, the advanced copy is returned with the inputs.
pub fn get_batch_address_append_inputs(
    tree: &IndexedMerkleTree<Poseidon>,
    params: BatchAddressAppendParameters,
) -> Result<(IndexedMerkleTree<Poseidon>, BatchAddressAppendInputs), ProverInputsError> {
    if params.new_element_values.len() != params.batch_size {
        return Err(ProverInputsError::ShapeMismatch {
            name: "new_element_values",
            expected: params.batch_size,
            actual: params.new_element_values.len(),
        });
    }
    check_batch_size(params.batch_size, params.zkp_batch_size)?;
    if let Some(declared) = params.old_root {
        if declared != tree.root() {
            error!("declared old root does not match the address tree");
            return Err(ProverInputsError::InconsistentChainedState(format!(
                "declared old root {:?} != tree root {:?}",
                declared,
                tree.root()
            )));
        }
    }
    if let Some(start_index) = params.start_index {
        if start_index != tree.next_index() {
            return Err(ProverInputsError::InconsistentChainedState(format!(
                "declared start index {} != tree next index {}",
                start_index,
                tree.next_index()
            )));
        }
    }
    if let Some(expected) = params.leaves_hashchain {
        let values = params
            .new_element_values
            .iter()
            .map(bigint_to_be_bytes_array::<32>)
            .collect::<Result<Vec<_>, _>>()?;
        let computed = create_hash_chain_from_slice(&values)?;
        if computed != expected {
            error!(
                batch_size = params.batch_size,
                next_index = tree.next_index(),
                "address hashchain mismatch"
            );
            return Err(ProverInputsError::HashchainMismatch {
                computed,
                expected,
                batch_size: params.batch_size,
                next_index: tree.next_index(),
            });
        }
    }

    let mut engine = BatchAddressAppendEngine::new(tree.clone(), params.min_value_gap);
    for (i, value) in params.new_element_values.iter().enumerate() {
        let hint = if i == 0 {
            params.first_low_element_index
        } else {
            None
        };
        engine.insert(value, hint)?;
    }
    engine.finalize()
}

/// Longest prefix of `values` that can be inserted into `tree` in order.
/// Used when generating test batches that must not be rejected.
pub fn shrink_to_insertable_prefix(
    tree: &IndexedMerkleTree<Poseidon>,
    values: &[BigUint],
    min_value_gap: &BigUint,
) -> Vec<BigUint> {
    let mut engine = BatchAddressAppendEngine::new(tree.clone(), min_value_gap.clone());
    let mut prefix = Vec::with_capacity(values.len());
    for value in values {
        if let Err(e) = engine.insert(value, None) {
            debug!(position = prefix.len(), "shrinking batch: {}", e);
            break;
        }
        prefix.push(value.clone());
    }
    prefix
}
