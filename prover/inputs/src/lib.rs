//! # ledger-prover-inputs
//!
//! Builds the witnesses a batch circuit constrains and re-checks them.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`proof_types::batch_append`] | Append leaves at the tree frontier |
//! | [`proof_types::batch_update`] | Write leaves into empty slots, skip occupied ones |
//! | [`proof_types::batch_address_append`] | Insert values into an indexed tree |
//! | [`proof_types::inclusion`] | Membership witnesses against a state tree |
//! | [`proof_types::non_inclusion`] | Non-membership witnesses |
//! | [`validator`] | Recomputes every relation of a transition |
//! | [`config`] | Tree heights, batch size, leaf encoding, tree constructors |
//! | [`telemetry`] | Logger setup |

pub mod config;
pub mod constants;
pub mod errors;
pub mod helpers;
pub mod proof_types;
pub mod telemetry;
pub mod validator;

pub use errors::{ConfigError, ProverInputsError, ValidationError};
