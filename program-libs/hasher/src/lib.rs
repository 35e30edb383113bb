//! # ledger-hasher
//!
//! One-way compression functions over the BN254 scalar field and the
//! primitives every tree in the workspace is built from.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`poseidon`] | Circom-compatible Poseidon, the hash of every deployed circuit |
//! | [`sha256`] | SHA-256 truncated to the field size |
//! | [`zero_bytes`] | Hashes of empty subtrees per level |
//! | [`hash_chain`] | Order-sensitive folding of many field elements into one |
//! | [`bigint`] | `BigUint` <-> fixed-size byte array conversion |
//! | [`field`] | BN254 modulus range checks |

pub mod bigint;
pub mod errors;
pub mod field;
pub mod hash_chain;
pub mod poseidon;
pub mod sha256;
pub mod zero_bytes;

pub use poseidon::Poseidon;
pub use sha256::Sha256BE;

pub use crate::errors::HasherError;

pub const HASH_BYTES: usize = 32;

/// A field element in its big-endian byte encoding.
pub type Hash = [u8; HASH_BYTES];

pub trait Hasher {
    fn hash(val: &[u8]) -> Result<Hash, HasherError>;
    fn hashv(vals: &[&[u8]]) -> Result<Hash, HasherError>;
}
