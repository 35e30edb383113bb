use serde::{Deserialize, Serialize};

use super::BatchAppendCircuitInputs;
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
pub struct BatchAppendInputsJson {
    pub circuit_type: String,
    pub public_input_hash: String,
    pub old_root: String,
    pub old_sub_tree_hash_chain: String,
    pub new_sub_tree_hash_chain: String,
    pub new_root: String,
    pub hashchain_hash: String,
    pub start_index: u64,
    pub tree_height: u64,
    pub leaves: Vec<String>,
    pub subtrees: Vec<String>,
}

impl BatchAppendInputsJson {
    pub fn from_inputs(inputs: &BatchAppendCircuitInputs) -> Result<Self, ProverInputsError> {
        Ok(Self {
            circuit_type: CircuitType::Append.to_string(),
            public_input_hash: big_uint_to_string(&inputs.public_input_hash),
            old_root: big_uint_to_string(&inputs.old_root),
            old_sub_tree_hash_chain: big_uint_to_string(&inputs.old_sub_tree_hash_chain),
            new_sub_tree_hash_chain: big_uint_to_string(&inputs.new_sub_tree_hash_chain),
            new_root: big_uint_to_string(&inputs.new_root),
            hashchain_hash: big_uint_to_string(&inputs.hashchain_hash),
            start_index: usize_to_u64(inputs.start_index)?,
            tree_height: usize_to_u64(inputs.tree_height)?,
            leaves: inputs.leaves.iter().map(big_uint_to_string).collect(),
            subtrees: inputs.subtrees.iter().map(big_uint_to_string).collect(),
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

impl TryFrom<&BatchAppendInputsJson> for BatchAppendCircuitInputs {
    type Error = ProverInputsError;

    fn try_from(json: &BatchAppendInputsJson) -> Result<Self, Self::Error> {
        CircuitType::Append.expect(&json.circuit_type)?;
        Ok(Self {
            public_input_hash: string_to_big_uint(&json.public_input_hash)?,
            old_root: string_to_big_uint(&json.old_root)?,
            new_root: string_to_big_uint(&json.new_root)?,
            old_sub_tree_hash_chain: string_to_big_uint(&json.old_sub_tree_hash_chain)?,
            new_sub_tree_hash_chain: string_to_big_uint(&json.new_sub_tree_hash_chain)?,
            hashchain_hash: string_to_big_uint(&json.hashchain_hash)?,
            start_index: u64_to_usize(json.start_index)?,
            tree_height: u64_to_usize(json.tree_height)?,
            leaves: strings_to_big_uints(&json.leaves)?,
            subtrees: strings_to_big_uints(&json.subtrees)?,
        })
    }
}
