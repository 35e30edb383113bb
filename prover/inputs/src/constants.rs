pub use ledger_indexed_merkle_tree::ADDRESS_MAX_BITS;

pub const DEFAULT_BATCH_ADDRESS_TREE_HEIGHT: usize = 40;
pub const DEFAULT_BATCH_STATE_TREE_HEIGHT: usize = 32;

pub const DEFAULT_ZKP_BATCH_SIZE: usize = 500;
pub const TEST_DEFAULT_ZKP_BATCH_SIZE: usize = 10;

/// Smallest accepted `next_value - value` of a low element, exclusive.
pub const DEFAULT_MIN_VALUE_GAP: u64 = 1;
