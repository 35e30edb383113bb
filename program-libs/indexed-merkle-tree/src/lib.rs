use num_bigint::BigUint;
use num_traits::One;

pub mod array;
pub mod errors;
pub mod leaf;
pub mod reference;

pub use array::{IndexedArray, IndexedElement, IndexedElementBundle};
pub use errors::IndexedMerkleTreeError;
pub use leaf::{LeafEncoding, RawIndexedElement};
pub use reference::{IndexedAppendUpdate, IndexedMerkleTree, NonInclusionProof};

/// Bit width of every value stored in an indexed tree.
pub const ADDRESS_MAX_BITS: usize = 248;

/// Value of the max sentinel, `2^248 - 1`. Every live value is below it.
pub const HIGHEST_ADDRESS_PLUS_ONE: &str =
    "452312848583266388373324160190187140051835877600158453279131187530910662655";

pub fn highest_address_plus_one() -> BigUint {
    (BigUint::one() << ADDRESS_MAX_BITS) - BigUint::one()
}
