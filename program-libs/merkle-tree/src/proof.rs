use ledger_hasher::{Hash, Hasher, HasherError};

/// Walks `proof` from the leaf upwards. At level `i` bit `i` of `index`
/// decides whether the running hash is the left (0) or right (1) child.
pub fn compute_root_from_merkle_proof<H: Hasher>(
    leaf: Hash,
    proof: &[Hash],
    index: usize,
) -> Result<Hash, HasherError> {
    let mut current_hash = leaf;
    let mut current_index = index;
    for sibling in proof.iter() {
        current_hash = if current_index % 2 == 0 {
            H::hashv(&[&current_hash, sibling])?
        } else {
            H::hashv(&[sibling, &current_hash])?
        };
        current_index /= 2;
    }
    Ok(current_hash)
}
