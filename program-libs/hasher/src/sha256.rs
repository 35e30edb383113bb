use sha2::{Digest, Sha256};

use crate::{errors::HasherError, Hash, Hasher};

/// SHA-256 with the most significant byte cleared, so every output is a
/// valid BN254 field element.
#[derive(Clone, Copy, Debug)]
pub struct Sha256BE;

impl Hasher for Sha256BE {
    fn hash(val: &[u8]) -> Result<Hash, HasherError> {
        Self::hashv(&[val])
    }

    fn hashv(vals: &[&[u8]]) -> Result<Hash, HasherError> {
        let mut hasher = Sha256::default();
        for val in vals {
            hasher.update(val);
        }
        let mut result: Hash = hasher.finalize().into();
        result[0] = 0;
        Ok(result)
    }
}
