use serde::{Deserialize, Serialize};

use super::BatchUpdateCircuitInputs;
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
pub struct BatchUpdateInputsJson {
    pub circuit_type: String,
    pub public_input_hash: String,
    pub old_root: String,
    pub new_root: String,
    pub leaves_hashchain_hash: String,
    pub leaves: Vec<String>,
    pub old_leaves: Vec<String>,
    pub merkle_proofs: Vec<Vec<String>>,
    pub path_indices: Vec<u64>,
    pub height: u64,
    pub batch_size: u64,
}

impl BatchUpdateInputsJson {
    pub fn from_inputs(inputs: &BatchUpdateCircuitInputs) -> Result<Self, ProverInputsError> {
        Ok(Self {
            circuit_type: CircuitType::Update.to_string(),
            public_input_hash: big_uint_to_string(&inputs.public_input_hash),
            old_root: big_uint_to_string(&inputs.old_root),
            new_root: big_uint_to_string(&inputs.new_root),
            leaves_hashchain_hash: big_uint_to_string(&inputs.leaves_hashchain_hash),
            leaves: inputs.leaves.iter().map(big_uint_to_string).collect(),
            old_leaves: inputs.old_leaves.iter().map(big_uint_to_string).collect(),
            merkle_proofs: inputs
                .merkle_proofs
                .iter()
                .map(|proof| proof.iter().map(big_uint_to_string).collect())
                .collect(),
            path_indices: inputs
                .path_indices
                .iter()
                .map(|index| usize_to_u64(*index))
                .collect::<Result<_, _>>()?,
            height: usize_to_u64(inputs.height)?,
            batch_size: usize_to_u64(inputs.batch_size)?,
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

impl TryFrom<&BatchUpdateInputsJson> for BatchUpdateCircuitInputs {
    type Error = ProverInputsError;

    fn try_from(json: &BatchUpdateInputsJson) -> Result<Self, Self::Error> {
        CircuitType::Update.expect(&json.circuit_type)?;
        Ok(Self {
            public_input_hash: string_to_big_uint(&json.public_input_hash)?,
            old_root: string_to_big_uint(&json.old_root)?,
            new_root: string_to_big_uint(&json.new_root)?,
            leaves_hashchain_hash: string_to_big_uint(&json.leaves_hashchain_hash)?,
            leaves: strings_to_big_uints(&json.leaves)?,
            old_leaves: strings_to_big_uints(&json.old_leaves)?,
            merkle_proofs: json
                .merkle_proofs
                .iter()
                .map(|proof| strings_to_big_uints(proof))
                .collect::<Result<_, _>>()?,
            path_indices: json
                .path_indices
                .iter()
                .map(|index| u64_to_usize(*index))
                .collect::<Result<_, _>>()?,
            height: u64_to_usize(json.height)?,
            batch_size: u64_to_usize(json.batch_size)?,
        })
    }
}
