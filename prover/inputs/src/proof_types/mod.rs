pub mod batch_address_append;
pub mod batch_append;
pub mod batch_update;
pub mod circuit_type;
pub mod inclusion;
pub mod non_inclusion;
