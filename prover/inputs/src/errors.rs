use ledger_hasher::{Hash, HasherError};
use ledger_indexed_merkle_tree::IndexedMerkleTreeError;
use ledger_merkle_tree::MerkleTreeError;
use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProverInputsError {
    #[error("{name} has length {actual}, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Appending {batch_size} leaves at {start_index} exceeds capacity {capacity}")]
    TreeCapacityExceeded {
        start_index: usize,
        batch_size: usize,
        capacity: usize,
    },
    #[error("Batch of {batch_size} exceeds the circuit batch size {max}")]
    BatchTooLarge { batch_size: usize, max: usize },
    #[error("Tree is full: next index {next_index}, capacity {capacity}")]
    TreeFull { next_index: usize, capacity: usize },
    #[error(
        "Hashchain mismatch: computed {computed:?} != expected {expected:?} \
         (batch_size={batch_size}, next_index={next_index})"
    )]
    HashchainMismatch {
        computed: Hash,
        expected: Hash,
        batch_size: usize,
        next_index: usize,
    },
    #[error("Inconsistent chained state: {0}")]
    InconsistentChainedState(String),
    #[error("Value {value:#x} at batch position {position} is already present")]
    ValueCollision { position: usize, value: BigUint },
    #[error(
        "Invalid ordering at batch position {position} \
         (low = {low:#x}, new = {value:#x}, high = {high:#x})"
    )]
    OrderingViolation {
        position: usize,
        low: BigUint,
        value: BigUint,
        high: BigUint,
    },
    #[error("Gap {gap} of low element at batch position {position} is not above {min_gap}")]
    InsufficientGap {
        position: usize,
        gap: BigUint,
        min_gap: BigUint,
    },
    #[error("Invalid hex string: {0}")]
    InvalidHexString(String),
    #[error("Expected circuit type {expected}, got {actual}")]
    InvalidCircuitType { expected: String, actual: String },
    #[error("Integer conversion failed: {0}")]
    IntegerConversion(String),
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
    #[error("Merkle tree error: {0}")]
    MerkleTree(#[from] MerkleTreeError),
    #[error("Indexed Merkle tree error: {0}")]
    IndexedMerkleTree(#[from] IndexedMerkleTreeError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// First relation of a transition that does not hold.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{name} has length {actual}, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Old root does not match the witness")]
    OldRootMismatch,
    #[error("New root does not match the witness")]
    NewRootMismatch,
    #[error("Old subtree hash chain does not match the subtrees")]
    OldSubTreeHashChainMismatch,
    #[error("New subtree hash chain does not match the appended leaves")]
    NewSubTreeHashChainMismatch,
    #[error("Leaves hash chain does not match the leaves")]
    LeavesHashChainMismatch,
    #[error("Leaf hash chain does not match the low and new element hashes")]
    LeafHashChainMismatch,
    #[error("Public input hash does not match")]
    PublicInputHashMismatch,
    #[error("Merkle proof at batch position {position} does not match the running root")]
    MerkleProofMismatch { position: usize },
    #[error("Low element proof at batch position {position} does not match the running root")]
    LowElementProofMismatch { position: usize },
    #[error("New element proof at batch position {position} does not open an empty slot")]
    NewElementProofMismatch { position: usize },
    #[error("Invalid ordering at batch position {position}")]
    OrderingViolation { position: usize },
    #[error("Inconsistent chained state: {0}")]
    InconsistentChainedState(String),
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
    #[error("Merkle tree error: {0}")]
    MerkleTree(#[from] MerkleTreeError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Tree height {0} is outside 1..={max}", max = ledger_merkle_tree::MAX_HEIGHT)]
    InvalidHeight(usize),
    #[error("Batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("Batch size {batch_size} does not fit a tree of height {height}")]
    BatchExceedsTree { batch_size: usize, height: usize },
    #[error("Minimum value gap must be greater than zero")]
    ZeroValueGap,
    #[error("Invalid configuration: {0}")]
    Parse(String),
}
