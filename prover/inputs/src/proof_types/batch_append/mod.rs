mod json;
mod proof_inputs;

pub use json::BatchAppendInputsJson;
pub use proof_inputs::{
    get_batch_append_inputs, BatchAppendCircuitInputs, BatchAppendEngine, BatchAppendParameters,
};
