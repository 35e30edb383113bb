use serde::{Deserialize, Serialize};

use super::{InclusionMerkleProofInputs, InclusionProofInputs};
use crate::{
    errors::{ProverInputsError, ValidationError},
    helpers::{
        big_uint_to_string, create_json_from_struct, string_to_big_uint, strings_to_big_uints,
        u64_to_usize, usize_to_u64,
    },
    proof_types::circuit_type::CircuitType,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchInclusionJsonStruct {
    pub circuit_type: String,
    pub state_tree_height: u64,
    pub public_input_hash: String,
    #[serde(rename = "input-compressed-accounts")]
    pub inputs: Vec<InclusionJsonStruct>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InclusionJsonStruct {
    pub root: String,
    pub leaf: String,
    pub path_index: u64,
    pub path_elements: Vec<String>,
}

impl BatchInclusionJsonStruct {
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String, ProverInputsError> {
        create_json_from_struct(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProverInputsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_inclusion_proof_inputs(
        state_tree_height: usize,
        inputs: &InclusionProofInputs,
    ) -> Result<Self, ProverInputsError> {
        let mut proof_inputs = Vec::with_capacity(inputs.inputs.len());
        for input in &inputs.inputs {
            proof_inputs.push(InclusionJsonStruct {
                root: big_uint_to_string(&input.root),
                leaf: big_uint_to_string(&input.leaf),
                path_index: usize_to_u64(input.path_index)?,
                path_elements: input.path_elements.iter().map(big_uint_to_string).collect(),
            });
        }
        Ok(Self {
            circuit_type: CircuitType::Inclusion.to_string(),
            state_tree_height: usize_to_u64(state_tree_height)?,
            public_input_hash: big_uint_to_string(&inputs.public_input_hash),
            inputs: proof_inputs,
        })
    }

    /// Rebuilds the witnesses and checks the declared public input hash
    /// against them.
    pub fn to_inclusion_proof_inputs(&self) -> Result<InclusionProofInputs, ProverInputsError> {
        CircuitType::Inclusion.expect(&self.circuit_type)?;
        let inputs = self
            .inputs
            .iter()
            .map(InclusionMerkleProofInputs::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let inputs = InclusionProofInputs::new(inputs)?;
        if inputs.public_input_hash != string_to_big_uint(&self.public_input_hash)? {
            return Err(ValidationError::PublicInputHashMismatch.into());
        }
        Ok(inputs)
    }
}

impl TryFrom<&InclusionJsonStruct> for InclusionMerkleProofInputs {
    type Error = ProverInputsError;

    fn try_from(json: &InclusionJsonStruct) -> Result<Self, Self::Error> {
        Ok(Self {
            root: string_to_big_uint(&json.root)?,
            leaf: string_to_big_uint(&json.leaf)?,
            path_index: u64_to_usize(json.path_index)?,
            path_elements: strings_to_big_uints(&json.path_elements)?,
        })
    }
}
