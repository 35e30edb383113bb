use crate::{Hash, Hasher, HasherError, Poseidon};

/// Folds `inputs` left to right: the first element seeds the chain and every
/// following element is absorbed as `acc = H(acc, input)`.
///
/// An empty slice yields zero and a single element is returned unchanged.
pub fn create_hash_chain<H: Hasher>(inputs: &[Hash]) -> Result<Hash, HasherError> {
    let Some((first, rest)) = inputs.split_first() else {
        return Ok([0u8; 32]);
    };
    let mut hash_chain = *first;
    for input in rest {
        hash_chain = H::hashv(&[&hash_chain, input])?;
    }
    Ok(hash_chain)
}

/// Creates a Poseidon hash chain from an array of [u8;32] arrays.
pub fn create_hash_chain_from_array<const T: usize>(
    inputs: [Hash; T],
) -> Result<Hash, HasherError> {
    create_hash_chain_from_slice(&inputs)
}

/// Creates a Poseidon hash chain from a slice of [u8;32] arrays.
pub fn create_hash_chain_from_slice(inputs: &[Hash]) -> Result<Hash, HasherError> {
    create_hash_chain::<Poseidon>(inputs)
}

/// Creates a two inputs hash chain from two slices of [u8;32] arrays.
/// The two slices must have the same length.
/// H(0) = H(hashes_first[0], hashes_second[0])
/// H(i) = H(H(i-1), hashes_first[i], hashes_second[i])
pub fn create_two_inputs_hash_chain(
    hashes_first: &[Hash],
    hashes_second: &[Hash],
) -> Result<Hash, HasherError> {
    let first_len = hashes_first.len();
    if first_len != hashes_second.len() {
        return Err(HasherError::InvalidInputLength(
            first_len,
            hashes_second.len(),
        ));
    }
    if hashes_first.is_empty() {
        return Ok([0u8; 32]);
    }
    let mut hash_chain = Poseidon::hashv(&[&hashes_first[0], &hashes_second[0]])?;
    for i in 1..first_len {
        hash_chain = Poseidon::hashv(&[&hash_chain, &hashes_first[i], &hashes_second[i]])?;
    }
    Ok(hash_chain)
}
