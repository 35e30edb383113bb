use serde::{Deserialize, Serialize};

use super::NonInclusionMerkleProofInputs;
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
pub struct BatchNonInclusionJsonStruct {
    pub circuit_type: String,
    pub address_tree_height: u64,
    #[serde(rename = "newAddresses")]
    pub inputs: Vec<NonInclusionJsonStruct>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NonInclusionJsonStruct {
    pub root: String,
    pub value: String,
    pub path_index: u64,
    pub path_elements: Vec<String>,
    pub leaf_lower_range_value: String,
    pub leaf_higher_range_value: String,
    pub next_index: u64,
}

impl BatchNonInclusionJsonStruct {
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String, ProverInputsError> {
        create_json_from_struct(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProverInputsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_non_inclusion_proof_inputs(
        address_tree_height: usize,
        inputs: &[NonInclusionMerkleProofInputs],
    ) -> Result<Self, ProverInputsError> {
        let mut proof_inputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            proof_inputs.push(NonInclusionJsonStruct {
                root: big_uint_to_string(&input.root),
                value: big_uint_to_string(&input.value),
                path_index: usize_to_u64(input.index_hashed_indexed_element_leaf)?,
                path_elements: input
                    .merkle_proof_hashed_indexed_element_leaf
                    .iter()
                    .map(big_uint_to_string)
                    .collect(),
                next_index: usize_to_u64(input.next_index)?,
                leaf_lower_range_value: big_uint_to_string(&input.leaf_lower_range_value),
                leaf_higher_range_value: big_uint_to_string(&input.leaf_higher_range_value),
            });
        }

        Ok(Self {
            circuit_type: CircuitType::NonInclusion.to_string(),
            address_tree_height: usize_to_u64(address_tree_height)?,
            inputs: proof_inputs,
        })
    }

    pub fn to_non_inclusion_proof_inputs(
        &self,
    ) -> Result<Vec<NonInclusionMerkleProofInputs>, ProverInputsError> {
        CircuitType::NonInclusion.expect(&self.circuit_type)?;
        self.inputs
            .iter()
            .map(NonInclusionMerkleProofInputs::try_from)
            .collect()
    }
}

impl TryFrom<&NonInclusionJsonStruct> for NonInclusionMerkleProofInputs {
    type Error = ProverInputsError;

    fn try_from(json: &NonInclusionJsonStruct) -> Result<Self, Self::Error> {
        Ok(Self {
            root: string_to_big_uint(&json.root)?,
            value: string_to_big_uint(&json.value)?,
            leaf_lower_range_value: string_to_big_uint(&json.leaf_lower_range_value)?,
            leaf_higher_range_value: string_to_big_uint(&json.leaf_higher_range_value)?,
            next_index: u64_to_usize(json.next_index)?,
            merkle_proof_hashed_indexed_element_leaf: strings_to_big_uints(&json.path_elements)?,
            index_hashed_indexed_element_leaf: u64_to_usize(json.path_index)?,
        })
    }
}
