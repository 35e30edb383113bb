use ledger_hasher::HasherError;
use ledger_merkle_tree::MerkleTreeError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IndexedMerkleTreeError {
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("Invalid index, it exceeds the number of elements.")]
    IndexHigherThanMax,
    #[error("The value already exists or no low element brackets it.")]
    DuplicateOrUnsortedValue,
    #[error("Low element is greater or equal to the provided new element.")]
    LowElementGreaterOrEqualToNewElement,
    #[error("The provided new element is greater or equal to the next element.")]
    ValueNotLessThanNext,
    #[error("The element does not exist, but was expected to be present.")]
    ElementDoesNotExist,
    #[error("Indexed Merkle tree is full, cannot append more elements")]
    TreeFull,
    #[error("Non-inclusion proof does not match the tree")]
    InvalidNonInclusionProof,
    #[error("Leaf {0} does not match the hash of its element")]
    LeafHashMismatch(usize),
    #[error("Merkle tree error: {0}")]
    MerkleTree(#[from] MerkleTreeError),
    #[error("Hasher error: {0}")]
    Hasher(#[from] HasherError),
}

impl From<IndexedMerkleTreeError> for u32 {
    fn from(e: IndexedMerkleTreeError) -> u32 {
        match e {
            IndexedMerkleTreeError::IntegerOverflow => 11001,
            IndexedMerkleTreeError::IndexHigherThanMax => 11002,
            IndexedMerkleTreeError::DuplicateOrUnsortedValue => 11003,
            IndexedMerkleTreeError::LowElementGreaterOrEqualToNewElement => 11004,
            IndexedMerkleTreeError::ValueNotLessThanNext => 11005,
            IndexedMerkleTreeError::ElementDoesNotExist => 11006,
            IndexedMerkleTreeError::TreeFull => 11007,
            IndexedMerkleTreeError::InvalidNonInclusionProof => 11008,
            IndexedMerkleTreeError::LeafHashMismatch(_) => 11009,
            IndexedMerkleTreeError::MerkleTree(e) => e.into(),
            IndexedMerkleTreeError::Hasher(e) => e.into(),
        }
    }
}
