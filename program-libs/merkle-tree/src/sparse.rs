use std::marker::PhantomData;

use ledger_hasher::{zero_bytes::zero_bytes, Hash, Hasher};
use tracing::debug;

use crate::{capacity_of, IndexBits, MerkleTreeError};

/// Append-only Merkle tree that stores only the rightmost subtree of every
/// level. Appending costs `height` hashes and needs no sibling proofs, so the
/// state that crosses batch boundaries stays `O(height)`.
#[derive(Debug, Clone)]
pub struct SparseMerkleTree<H: Hasher> {
    height: usize,
    subtrees: Vec<Hash>,
    zero_bytes: Vec<Hash>,
    index_bits: IndexBits,
    /// Set once the index counter carried out of its most significant bit.
    full: bool,
    root: Hash,
    _hasher: PhantomData<H>,
}

impl<H: Hasher> SparseMerkleTree<H> {
    /// Resumes a tree from its frontier. The root is derived by folding the
    /// empty leaf at `next_index` up with `subtrees[level]` where the path
    /// goes right and the empty subtree where it goes left.
    pub fn new(
        height: usize,
        subtrees: Vec<Hash>,
        next_index: usize,
    ) -> Result<Self, MerkleTreeError> {
        capacity_of(height)?;
        if subtrees.len() != height {
            return Err(MerkleTreeError::ShapeMismatch {
                expected: height,
                actual: subtrees.len(),
            });
        }
        let index_bits = IndexBits::from_index(next_index, height)?;
        let zero_bytes = zero_bytes::<H>(height)?;
        let mut current = zero_bytes[0];
        for (level, subtree) in subtrees.iter().enumerate() {
            current = if index_bits.is_right(level) {
                H::hashv(&[subtree, &current])?
            } else {
                H::hashv(&[&current, &zero_bytes[level]])?
            };
        }
        debug!(height, next_index, "resumed sparse merkle tree from subtrees");
        Ok(Self {
            height,
            subtrees,
            zero_bytes,
            index_bits,
            full: false,
            root: current,
            _hasher: PhantomData,
        })
    }

    pub fn new_empty(height: usize) -> Result<Self, MerkleTreeError> {
        let zero_bytes = zero_bytes::<H>(height)?;
        Self::new(height, zero_bytes[..height].to_vec(), 0)
    }

    /// Appends `leaf` at [`next_index`](Self::next_index) and returns its
    /// sibling path, leaf level first.
    pub fn append(&mut self, leaf: Hash) -> Result<Vec<Hash>, MerkleTreeError> {
        if self.full {
            let capacity = self.capacity();
            return Err(MerkleTreeError::TreeCapacityExceeded {
                start_index: capacity,
                batch_size: 1,
                capacity,
            });
        }
        let mut proof = Vec::with_capacity(self.height);
        let mut current = leaf;
        for level in 0..self.height {
            current = if self.index_bits.is_right(level) {
                proof.push(self.subtrees[level]);
                H::hashv(&[&self.subtrees[level], &current])?
            } else {
                // A new subtree starts here and becomes the rightmost one.
                self.subtrees[level] = current;
                proof.push(self.zero_bytes[level]);
                H::hashv(&[&current, &self.zero_bytes[level]])?
            };
        }
        self.root = current;
        self.full = self.index_bits.increment();
        Ok(proof)
    }

    pub fn root(&self) -> Hash {
        self.root
    }

    pub fn subtrees(&self) -> &[Hash] {
        &self.subtrees
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn capacity(&self) -> usize {
        1usize << self.height
    }

    pub fn index_bits(&self) -> &IndexBits {
        &self.index_bits
    }

    pub fn next_index(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            self.index_bits.to_index()
        }
    }
}
