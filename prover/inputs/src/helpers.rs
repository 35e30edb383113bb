use ledger_hasher::{
    bigint::bigint_to_be_bytes_array, field::biguint_to_field_element, Hash, HasherError,
};
use num_bigint::BigUint;
use num_traits::Num;
use serde::Serialize;

use crate::errors::ProverInputsError;

pub fn big_uint_to_string(big_uint: &BigUint) -> String {
    format!("0x{}", big_uint.to_str_radix(16))
}

pub fn string_to_big_uint(hex_str: &str) -> Result<BigUint, ProverInputsError> {
    let digits = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .ok_or_else(|| ProverInputsError::InvalidHexString(hex_str.to_string()))?;
    BigUint::from_str_radix(digits, 16)
        .map_err(|_| ProverInputsError::InvalidHexString(hex_str.to_string()))
}

pub fn strings_to_big_uints(hex_strs: &[String]) -> Result<Vec<BigUint>, ProverInputsError> {
    hex_strs.iter().map(|s| string_to_big_uint(s)).collect()
}

pub fn hash_to_big_uint(hash: &Hash) -> BigUint {
    BigUint::from_bytes_be(hash)
}

pub fn hashes_to_big_uints(hashes: &[Hash]) -> Vec<BigUint> {
    hashes.iter().map(hash_to_big_uint).collect()
}

/// Fails for values that are not field elements.
pub fn big_uint_to_hash(big_uint: &BigUint) -> Result<Hash, HasherError> {
    biguint_to_field_element(big_uint)
}

pub fn big_uints_to_hashes(big_uints: &[BigUint]) -> Result<Vec<Hash>, HasherError> {
    big_uints.iter().map(big_uint_to_hash).collect()
}

/// Field encoding of a leaf index, as absorbed into public input hashes.
pub fn index_to_hash(index: usize) -> Result<Hash, HasherError> {
    bigint_to_be_bytes_array::<32>(&BigUint::from(index))
}

pub fn usize_to_u64(value: usize) -> Result<u64, ProverInputsError> {
    u64::try_from(value).map_err(|e| ProverInputsError::IntegerConversion(e.to_string()))
}

pub fn u64_to_usize(value: u64) -> Result<usize, ProverInputsError> {
    usize::try_from(value).map_err(|e| ProverInputsError::IntegerConversion(e.to_string()))
}

pub fn create_json_from_struct<T>(json_struct: &T) -> Result<String, ProverInputsError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(json_struct)?)
}
