mod json;
mod proof_inputs;

pub use json::BatchUpdateInputsJson;
pub use proof_inputs::{get_batch_update_inputs, BatchUpdateCircuitInputs, BatchUpdateParameters};
