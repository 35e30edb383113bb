use ledger_hasher::{bigint::usize_to_be_bytes_array, Hash, Hasher, HasherError};
use serde::{Deserialize, Serialize};

/// Preimage layout of an indexed leaf. A tree uses exactly one encoding for
/// its whole lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeafEncoding {
    /// `H(value, next_index, next_value)`
    #[default]
    Legacy,
    /// `H(value, next_value)`
    V2,
}

impl LeafEncoding {
    pub fn hash_leaf<H: Hasher>(
        &self,
        value: &Hash,
        next_index: usize,
        next_value: &Hash,
    ) -> Result<Hash, HasherError> {
        match self {
            LeafEncoding::Legacy => {
                H::hashv(&[value, &usize_to_be_bytes_array(next_index), next_value])
            }
            LeafEncoding::V2 => H::hashv(&[value, next_value]),
        }
    }
}

/// Self-contained leaf preimage, including the value of the next element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawIndexedElement {
    pub value: Hash,
    pub next_index: usize,
    pub next_value: Hash,
    pub index: usize,
}

impl RawIndexedElement {
    pub fn hash<H: Hasher>(&self, encoding: LeafEncoding) -> Result<Hash, HasherError> {
        encoding.hash_leaf::<H>(&self.value, self.next_index, &self.next_value)
    }
}
