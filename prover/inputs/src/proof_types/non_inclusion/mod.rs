mod json;
mod proof_inputs;

pub use json::{BatchNonInclusionJsonStruct, NonInclusionJsonStruct};
pub use proof_inputs::{get_non_inclusion_inputs, NonInclusionMerkleProofInputs};
