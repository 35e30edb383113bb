use ark_bn254::Fr;
use light_poseidon::{Poseidon as PoseidonHasher, PoseidonBytesHasher};

use crate::{errors::HasherError, Hash, Hasher};

/// Poseidon over BN254 with the circom parameter set, the same instance the
/// batch circuits constrain. Arity equals the number of inputs.
#[derive(Clone, Copy, Debug)]
pub struct Poseidon;

impl Hasher for Poseidon {
    fn hash(val: &[u8]) -> Result<Hash, HasherError> {
        Self::hashv(&[val])
    }

    fn hashv(vals: &[&[u8]]) -> Result<Hash, HasherError> {
        if vals.is_empty() {
            return Err(HasherError::EmptyInput);
        }
        let mut hasher = PoseidonHasher::<Fr>::new_circom(vals.len())?;
        let res = hasher.hash_bytes_be(vals)?;
        Ok(res)
    }
}
