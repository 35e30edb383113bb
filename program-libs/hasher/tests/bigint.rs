use ledger_hasher::{
    bigint::{bigint_to_be_bytes_array, bigint_to_le_bytes_array, usize_to_be_bytes_array},
    HasherError,
};
use num_bigint::{BigUint, RandBigInt, ToBigUint};
use rand::thread_rng;

const ITERATIONS: usize = 64;

#[test]
fn test_bigint_conversion_rand() {
    let mut rng = thread_rng();

    for _ in 0..ITERATIONS {
        let b64 = rng.gen_biguint(64);
        let b64_converted: [u8; 8] = bigint_to_be_bytes_array(&b64).unwrap();
        assert_eq!(b64, BigUint::from_bytes_be(&b64_converted));
        let b64_converted: [u8; 8] = bigint_to_le_bytes_array(&b64).unwrap();
        assert_eq!(b64, BigUint::from_bytes_le(&b64_converted));

        let b256 = rng.gen_biguint(256);
        let b256_converted: [u8; 32] = bigint_to_be_bytes_array(&b256).unwrap();
        assert_eq!(b256, BigUint::from_bytes_be(&b256_converted));
        let b256_converted: [u8; 32] = bigint_to_le_bytes_array(&b256).unwrap();
        assert_eq!(b256, BigUint::from_bytes_le(&b256_converted));
    }
}

#[test]
fn test_bigint_conversion_too_large() {
    let value = BigUint::from(1u8) << 64;
    assert_eq!(
        bigint_to_be_bytes_array::<8>(&value),
        Err(HasherError::InvalidInputLength(8, 9))
    );
    assert_eq!(
        bigint_to_le_bytes_array::<8>(&value),
        Err(HasherError::InvalidInputLength(8, 9))
    );
}

#[test]
fn test_usize_to_be_bytes_array() {
    let bytes = usize_to_be_bytes_array(258);
    assert_eq!(
        BigUint::from_bytes_be(&bytes),
        258.to_biguint().unwrap()
    );
    assert_eq!(
        bytes,
        bigint_to_be_bytes_array::<32>(&258.to_biguint().unwrap()).unwrap()
    );
}
