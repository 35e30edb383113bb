use ledger_hasher::{bigint::bigint_to_be_bytes_array, Hash, Hasher};
use ledger_merkle_tree::{compute_root_from_merkle_proof, PersistentMerkleTree};
use num_bigint::BigUint;
use tracing::debug;

use crate::{
    array::{IndexedArray, IndexedElement},
    errors::IndexedMerkleTreeError,
    LeafEncoding, RawIndexedElement,
};

/// Proof that `value` is absent: the low element brackets it and is a leaf
/// of the tree with root `root`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonInclusionProof {
    pub root: Hash,
    pub value: Hash,
    pub leaf_lower_range_value: Hash,
    pub leaf_higher_range_value: Hash,
    pub leaf_index: usize,
    pub next_index: usize,
    pub merkle_proof: Vec<Hash>,
}

/// Every witness of a single insertion: the low element before and after,
/// the new element, both sibling paths and the three roots.
#[derive(Clone, Debug)]
pub struct IndexedAppendUpdate {
    pub old_low_element: IndexedElement,
    pub old_low_element_next_value: BigUint,
    pub new_low_element: IndexedElement,
    pub new_element: IndexedElement,
    pub new_element_next_value: BigUint,
    pub old_low_leaf_hash: Hash,
    pub new_low_leaf_hash: Hash,
    pub new_element_hash: Hash,
    pub low_element_proof: Vec<Hash>,
    pub new_element_proof: Vec<Hash>,
    pub old_root: Hash,
    pub intermediate_root: Hash,
    pub new_root: Hash,
}

/// Persistent Merkle tree whose leaves are the hashes of an
/// [`IndexedArray`]. Cloning is cheap for the tree and copies the element
/// vector.
#[derive(Debug)]
pub struct IndexedMerkleTree<H: Hasher> {
    pub merkle_tree: PersistentMerkleTree<H>,
    pub indexed_array: IndexedArray<H>,
}

impl<H: Hasher> Clone for IndexedMerkleTree<H> {
    fn clone(&self) -> Self {
        Self {
            merkle_tree: self.merkle_tree.clone(),
            indexed_array: self.indexed_array.clone(),
        }
    }
}

impl<H: Hasher> IndexedMerkleTree<H> {
    pub fn new(height: usize, encoding: LeafEncoding) -> Result<Self, IndexedMerkleTreeError> {
        Ok(Self {
            merkle_tree: PersistentMerkleTree::new(height)?,
            indexed_array: IndexedArray::new(encoding),
        })
    }

    /// Writes the zero element and the max sentinel into leaves 0 and 1.
    pub fn init(&mut self) -> Result<(), IndexedMerkleTreeError> {
        if !self.indexed_array.is_empty() {
            return Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue);
        }
        if self.merkle_tree.capacity() < 2 {
            return Err(IndexedMerkleTreeError::TreeFull);
        }
        let encoding = self.encoding();
        let mut indexed_array = self.indexed_array.clone();
        let bundle = indexed_array.init()?;
        let new_low_leaf = bundle
            .new_low_element
            .hash::<H>(&bundle.new_element.value, encoding)?;
        let new_leaf = bundle
            .new_element
            .hash::<H>(&bundle.new_element_next_value, encoding)?;
        let (merkle_tree, _) = self.merkle_tree.update(0, new_low_leaf)?;
        let (merkle_tree, _) = merkle_tree.update(1, new_leaf)?;
        self.merkle_tree = merkle_tree;
        self.indexed_array = indexed_array;
        Ok(())
    }

    pub fn encoding(&self) -> LeafEncoding {
        self.indexed_array.encoding()
    }

    pub fn root(&self) -> Hash {
        self.merkle_tree.root()
    }

    pub fn height(&self) -> usize {
        self.merkle_tree.height()
    }

    /// Leaf index the next appended element is written to.
    pub fn next_index(&self) -> usize {
        if self.indexed_array.is_empty() {
            0
        } else {
            self.indexed_array.len() + 1
        }
    }

    pub fn get_proof_of_leaf(&self, index: usize) -> Result<Vec<Hash>, IndexedMerkleTreeError> {
        Ok(self.merkle_tree.get_proof_of_leaf(index)?)
    }

    pub fn find_low_element_index(&self, value: &BigUint) -> Result<usize, IndexedMerkleTreeError> {
        self.indexed_array.find_low_element_index_for_nonexistent(value)
    }

    pub fn append(
        &mut self,
        value: &BigUint,
    ) -> Result<IndexedAppendUpdate, IndexedMerkleTreeError> {
        let low_element_index = self.find_low_element_index(value)?;
        self.append_with_low_element_index(low_element_index, value)
    }

    /// Inserts `value` behind the element at `low_element_index`. Both leaf
    /// writes are computed before anything is stored, a failed insertion
    /// leaves the tree untouched.
    pub fn append_with_low_element_index(
        &mut self,
        low_element_index: usize,
        value: &BigUint,
    ) -> Result<IndexedAppendUpdate, IndexedMerkleTreeError> {
        let new_element_index = self.next_index();
        if new_element_index >= self.merkle_tree.capacity() {
            return Err(IndexedMerkleTreeError::TreeFull);
        }
        self.indexed_array.validate_insertion(low_element_index, value)?;
        let encoding = self.encoding();

        let old_low_element = self.indexed_array.elements[low_element_index].clone();
        let old_low_element_next_value =
            self.indexed_array.elements[old_low_element.next_index].value.clone();
        let old_low_leaf_hash = old_low_element.hash::<H>(&old_low_element_next_value, encoding)?;

        let bundle = self
            .indexed_array
            .new_element_with_low_element_index(low_element_index, value)?;
        let new_low_leaf_hash = bundle
            .new_low_element
            .hash::<H>(&bundle.new_element.value, encoding)?;
        let new_element_hash = bundle
            .new_element
            .hash::<H>(&bundle.new_element_next_value, encoding)?;

        let old_root = self.merkle_tree.root();
        let (intermediate_tree, low_element_proof) = self
            .merkle_tree
            .update(low_element_index, new_low_leaf_hash)?;
        let (new_tree, new_element_proof) =
            intermediate_tree.update(bundle.new_element.index, new_element_hash)?;

        self.indexed_array.insert_bundle(&bundle);
        self.merkle_tree = new_tree;
        debug!(
            low_element_index,
            new_element_index = bundle.new_element.index,
            "appended element to indexed merkle tree"
        );

        Ok(IndexedAppendUpdate {
            old_low_element,
            old_low_element_next_value,
            new_low_element: bundle.new_low_element,
            new_element: bundle.new_element,
            new_element_next_value: bundle.new_element_next_value,
            old_low_leaf_hash,
            new_low_leaf_hash,
            new_element_hash,
            low_element_proof,
            new_element_proof,
            old_root,
            intermediate_root: intermediate_tree.root(),
            new_root: self.merkle_tree.root(),
        })
    }

    pub fn get_non_inclusion_proof(
        &self,
        value: &BigUint,
    ) -> Result<NonInclusionProof, IndexedMerkleTreeError> {
        let (low_element, next_value) = self
            .indexed_array
            .find_low_element_for_nonexistent(value)?;
        let merkle_proof = self.merkle_tree.get_proof_of_leaf(low_element.index)?;
        Ok(NonInclusionProof {
            root: self.root(),
            value: bigint_to_be_bytes_array::<32>(value)?,
            leaf_lower_range_value: bigint_to_be_bytes_array::<32>(&low_element.value)?,
            leaf_higher_range_value: bigint_to_be_bytes_array::<32>(&next_value)?,
            leaf_index: low_element.index,
            next_index: low_element.next_index,
            merkle_proof,
        })
    }

    pub fn verify_non_inclusion_proof(
        &self,
        proof: &NonInclusionProof,
    ) -> Result<(), IndexedMerkleTreeError> {
        let value = BigUint::from_bytes_be(&proof.value);
        let lower = BigUint::from_bytes_be(&proof.leaf_lower_range_value);
        let higher = BigUint::from_bytes_be(&proof.leaf_higher_range_value);
        if !(lower < value && value < higher) {
            return Err(IndexedMerkleTreeError::InvalidNonInclusionProof);
        }
        let leaf_hash = self.encoding().hash_leaf::<H>(
            &proof.leaf_lower_range_value,
            proof.next_index,
            &proof.leaf_higher_range_value,
        )?;
        let root =
            compute_root_from_merkle_proof::<H>(leaf_hash, &proof.merkle_proof, proof.leaf_index)?;
        if proof.merkle_proof.len() != self.height() || root != proof.root || root != self.root() {
            return Err(IndexedMerkleTreeError::InvalidNonInclusionProof);
        }
        Ok(())
    }

    /// Checks a self-contained leaf preimage against the current root.
    pub fn verify(
        &self,
        raw_element: &RawIndexedElement,
        proof: &[Hash],
    ) -> Result<bool, IndexedMerkleTreeError> {
        let leaf = raw_element.hash::<H>(self.encoding())?;
        Ok(self.merkle_tree.verify(raw_element.index, &leaf, proof)?)
    }

    /// Walks the linked list from the zero element and checks ordering,
    /// reachability of every element and that each leaf stores the hash of
    /// its element.
    pub fn check_linked_list(&self) -> Result<(), IndexedMerkleTreeError> {
        let mut visited = 0;
        let mut previous: Option<&BigUint> = None;
        for element in self.indexed_array.iter_sorted() {
            if previous.is_some_and(|previous| previous >= &element.value) {
                return Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue);
            }
            previous = Some(&element.value);
            visited += 1;
        }
        if visited != self.indexed_array.elements.len() {
            return Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue);
        }
        if self.indexed_array.is_empty() {
            return Ok(());
        }
        for index in 0..self.indexed_array.elements.len() {
            if self.merkle_tree.leaf(index)? != self.indexed_array.hash_element(index)? {
                return Err(IndexedMerkleTreeError::LeafHashMismatch(index));
            }
        }
        Ok(())
    }
}
