mod json;
mod proof_inputs;

pub use json::BatchAddressAppendInputsJson;
pub use proof_inputs::{
    get_batch_address_append_inputs, shrink_to_insertable_prefix, BatchAddressAppendEngine,
    BatchAddressAppendInputs, BatchAddressAppendParameters,
};
