use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

use crate::{bigint::bigint_to_be_bytes_array, Hash, HasherError};

/// The BN254 scalar field modulus.
pub fn bn254_modulus() -> BigUint {
    BigUint::from_bytes_be(&Fr::MODULUS.to_bytes_be())
}

pub fn is_smaller_than_bn254_field_size_be(bytes: &[u8; 32]) -> bool {
    BigUint::from_bytes_be(bytes) < bn254_modulus()
}

/// Big-endian encoding of `value`, rejecting anything outside the field.
pub fn biguint_to_field_element(value: &BigUint) -> Result<Hash, HasherError> {
    if *value >= bn254_modulus() {
        return Err(HasherError::NotInField);
    }
    bigint_to_be_bytes_array::<32>(value)
}
