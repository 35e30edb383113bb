use crate::{capacity_of, MerkleTreeError};

/// A leaf index as a fixed-width bit vector, least significant bit first.
///
/// Bit `level` tells whether the path to the leaf enters the right child at
/// that level, counting from the leaves. Incrementing works on the bits
/// directly, the way an index is advanced inside a circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexBits(Vec<bool>);

impl IndexBits {
    pub fn from_index(index: usize, width: usize) -> Result<Self, MerkleTreeError> {
        let capacity = capacity_of(width)?;
        if index >= capacity {
            return Err(MerkleTreeError::IndexOutOfBounds { index, capacity });
        }
        Ok(Self((0..width).map(|i| (index >> i) & 1 == 1).collect()))
    }

    pub fn to_index(&self) -> usize {
        self.0
            .iter()
            .enumerate()
            .fold(0, |acc, (i, bit)| acc | ((*bit as usize) << i))
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn is_right(&self, level: usize) -> bool {
        self.0[level]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Adds one with carry propagation. Returns the carry out of the most
    /// significant bit, which is set once the index wraps past capacity.
    pub fn increment(&mut self) -> bool {
        let mut carry = true;
        for bit in self.0.iter_mut() {
            let new_bit = *bit ^ carry;
            carry = *bit && carry;
            *bit = new_bit;
        }
        carry
    }
}
