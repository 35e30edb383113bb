use ledger_hasher::HasherError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MerkleTreeError {
    #[error("Leaf index {index} is out of bounds for a tree with {capacity} leaves")]
    IndexOutOfBounds { index: usize, capacity: usize },
    #[error("Tree height {0} is not supported")]
    InvalidHeight(usize),
    #[error("Invalid proof length provided: {0} required {1}")]
    InvalidProofLength(usize, usize),
    #[error("Appending {batch_size} leaves at {start_index} exceeds capacity {capacity}")]
    TreeCapacityExceeded {
        start_index: usize,
        batch_size: usize,
        capacity: usize,
    },
    #[error("Expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
}

impl From<MerkleTreeError> for u32 {
    fn from(e: MerkleTreeError) -> u32 {
        match e {
            MerkleTreeError::IndexOutOfBounds { .. } => 10001,
            MerkleTreeError::InvalidHeight(_) => 10002,
            MerkleTreeError::InvalidProofLength(_, _) => 10003,
            MerkleTreeError::TreeCapacityExceeded { .. } => 10004,
            MerkleTreeError::ShapeMismatch { .. } => 10005,
            MerkleTreeError::Hasher(e) => e.into(),
        }
    }
}
