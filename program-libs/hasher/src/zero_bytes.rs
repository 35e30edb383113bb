use crate::{Hash, HasherError, Hasher};

/// Hashes of empty subtrees for levels `0..=height`.
///
/// `Z[0]` is the empty leaf (zero) and `Z[i] = H(Z[i - 1], Z[i - 1])`, so
/// `Z[height]` is the root of an empty tree of that height.
pub fn zero_bytes<H: Hasher>(height: usize) -> Result<Vec<Hash>, HasherError> {
    let mut zero_bytes = Vec::with_capacity(height + 1);
    let mut current = [0u8; 32];
    zero_bytes.push(current);
    for _ in 0..height {
        current = H::hashv(&[&current, &current])?;
        zero_bytes.push(current);
    }
    Ok(zero_bytes)
}
