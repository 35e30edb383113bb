//! # ledger-merkle-tree
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PersistentMerkleTree`] | Fixed-height sparse tree with immutable, shared nodes |
//! | [`SparseMerkleTree`] | Append-only tree that only keeps the rightmost subtree per level |
//! | [`IndexBits`] | Fixed-width leaf index with circuit-style carry increment |

pub mod bits;
pub mod errors;
pub mod persistent;
pub mod proof;
pub mod sparse;

pub use bits::IndexBits;
pub use errors::MerkleTreeError;
pub use persistent::{Node, PersistentMerkleTree};
pub use proof::compute_root_from_merkle_proof;
pub use sparse::SparseMerkleTree;

/// Largest supported tree height, leaf indices must fit a `u64`.
pub const MAX_HEIGHT: usize = 63;

/// Number of leaves of a tree of `height`.
pub fn capacity_of(height: usize) -> Result<usize, MerkleTreeError> {
    if height > MAX_HEIGHT {
        return Err(MerkleTreeError::InvalidHeight(height));
    }
    1usize
        .checked_shl(height as u32)
        .ok_or(MerkleTreeError::InvalidHeight(height))
}
