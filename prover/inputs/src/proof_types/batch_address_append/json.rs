use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::BatchAddressAppendInputs;
use crate::{
    errors::ProverInputsError,
    helpers::{
        big_uint_to_string, create_json_from_struct, string_to_big_uint, strings_to_big_uints,
        u64_to_usize, usize_to_u64,
    },
    proof_types::circuit_type::CircuitType,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchAddressAppendInputsJson {
    pub circuit_type: String,
    pub batch_size: u64,
    pub hashchain_hash: String,
    pub leaf_hash_chain: String,
    pub low_element_values: Vec<String>,
    pub low_element_indices: Vec<u64>,
    pub low_element_next_indices: Vec<u64>,
    pub low_element_next_values: Vec<String>,
    pub low_element_proofs: Vec<Vec<String>>,
    pub new_element_values: Vec<String>,
    pub new_element_proofs: Vec<Vec<String>>,
    pub new_root: String,
    pub old_root: String,
    pub public_input_hash: String,
    pub start_index: u64,
    pub tree_height: u64,
}

fn indices_to_u64(indices: &[usize]) -> Result<Vec<u64>, ProverInputsError> {
    indices.iter().map(|index| usize_to_u64(*index)).collect()
}

fn indices_to_usize(indices: &[u64]) -> Result<Vec<usize>, ProverInputsError> {
    indices.iter().map(|index| u64_to_usize(*index)).collect()
}

fn proofs_to_strings(proofs: &[Vec<BigUint>]) -> Vec<Vec<String>> {
    proofs
        .iter()
        .map(|proof| proof.iter().map(big_uint_to_string).collect())
        .collect()
}

impl BatchAddressAppendInputsJson {
    pub fn from_inputs(inputs: &BatchAddressAppendInputs) -> Result<Self, ProverInputsError> {
        Ok(Self {
            circuit_type: CircuitType::AddressAppend.to_string(),
            batch_size: usize_to_u64(inputs.batch_size)?,
            hashchain_hash: big_uint_to_string(&inputs.hashchain_hash),
            leaf_hash_chain: big_uint_to_string(&inputs.leaf_hash_chain),
            low_element_values: inputs.low_element_values.iter().map(big_uint_to_string).collect(),
            low_element_indices: indices_to_u64(&inputs.low_element_indices)?,
            low_element_next_indices: indices_to_u64(&inputs.low_element_next_indices)?,
            low_element_next_values: inputs
                .low_element_next_values
                .iter()
                .map(big_uint_to_string)
                .collect(),
            low_element_proofs: proofs_to_strings(&inputs.low_element_proofs),
            new_element_values: inputs.new_element_values.iter().map(big_uint_to_string).collect(),
            new_element_proofs: proofs_to_strings(&inputs.new_element_proofs),
            new_root: big_uint_to_string(&inputs.new_root),
            old_root: big_uint_to_string(&inputs.old_root),
            public_input_hash: big_uint_to_string(&inputs.public_input_hash),
            start_index: usize_to_u64(inputs.start_index)?,
            tree_height: usize_to_u64(inputs.tree_height)?,
        })
    }

    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String, ProverInputsError> {
        create_json_from_struct(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProverInputsError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<&BatchAddressAppendInputsJson> for BatchAddressAppendInputs {
    type Error = ProverInputsError;

    fn try_from(json: &BatchAddressAppendInputsJson) -> Result<Self, Self::Error> {
        CircuitType::AddressAppend.expect(&json.circuit_type)?;
        let proofs = |proofs: &[Vec<String>]| -> Result<Vec<_>, ProverInputsError> {
            proofs.iter().map(|proof| strings_to_big_uints(proof)).collect()
        };
        Ok(Self {
            batch_size: u64_to_usize(json.batch_size)?,
            hashchain_hash: string_to_big_uint(&json.hashchain_hash)?,
            leaf_hash_chain: string_to_big_uint(&json.leaf_hash_chain)?,
            low_element_values: strings_to_big_uints(&json.low_element_values)?,
            low_element_indices: indices_to_usize(&json.low_element_indices)?,
            low_element_next_indices: indices_to_usize(&json.low_element_next_indices)?,
            low_element_next_values: strings_to_big_uints(&json.low_element_next_values)?,
            low_element_proofs: proofs(&json.low_element_proofs)?,
            new_element_values: strings_to_big_uints(&json.new_element_values)?,
            new_element_proofs: proofs(&json.new_element_proofs)?,
            new_root: string_to_big_uint(&json.new_root)?,
            old_root: string_to_big_uint(&json.old_root)?,
            public_input_hash: string_to_big_uint(&json.public_input_hash)?,
            start_index: u64_to_usize(json.start_index)?,
            tree_height: u64_to_usize(json.tree_height)?,
        })
    }
}
