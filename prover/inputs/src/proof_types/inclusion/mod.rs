mod json;
mod proof_inputs;

pub use json::{BatchInclusionJsonStruct, InclusionJsonStruct};
pub use proof_inputs::{get_inclusion_inputs, InclusionMerkleProofInputs, InclusionProofInputs};
