use std::{cmp::Ordering, marker::PhantomData};

use ledger_hasher::{bigint::bigint_to_be_bytes_array, Hash, Hasher};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::{
    errors::IndexedMerkleTreeError, highest_address_plus_one, LeafEncoding, RawIndexedElement,
};

#[derive(Clone, Debug, Default)]
pub struct IndexedElement {
    pub index: usize,
    pub value: BigUint,
    pub next_index: usize,
}

impl PartialEq for IndexedElement {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.index == other.index
            && self.next_index == other.next_index
    }
}

impl Eq for IndexedElement {}

impl PartialOrd for IndexedElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexedElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl IndexedElement {
    pub fn hash<H: Hasher>(
        &self,
        next_value: &BigUint,
        encoding: LeafEncoding,
    ) -> Result<Hash, IndexedMerkleTreeError> {
        Ok(self.to_raw(next_value)?.hash::<H>(encoding)?)
    }

    pub fn to_raw(
        &self,
        next_value: &BigUint,
    ) -> Result<RawIndexedElement, IndexedMerkleTreeError> {
        Ok(RawIndexedElement {
            value: bigint_to_be_bytes_array::<32>(&self.value)?,
            next_index: self.next_index,
            next_value: bigint_to_be_bytes_array::<32>(next_value)?,
            index: self.index,
        })
    }
}

impl From<RawIndexedElement> for IndexedElement {
    fn from(value: RawIndexedElement) -> Self {
        IndexedElement {
            index: value.index,
            value: BigUint::from_bytes_be(&value.value),
            next_index: value.next_index,
        }
    }
}

/// Result of inserting one value: the rewritten low element and the new
/// element, which inherits the low element's former successor.
#[derive(Clone, Debug)]
pub struct IndexedElementBundle {
    pub new_low_element: IndexedElement,
    pub new_element: IndexedElement,
    pub new_element_next_value: BigUint,
}

/// Elements in insertion order. Slot `i` of the vector is leaf `i` of the
/// tree, element 0 always holds value 0 and `next_index == 0` marks the tail.
#[derive(Debug)]
pub struct IndexedArray<H: Hasher> {
    pub elements: Vec<IndexedElement>,
    pub current_node_index: usize,
    pub highest_element_index: usize,
    encoding: LeafEncoding,

    _hasher: PhantomData<H>,
}

impl<H: Hasher> Clone for IndexedArray<H> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            current_node_index: self.current_node_index,
            highest_element_index: self.highest_element_index,
            encoding: self.encoding,
            _hasher: PhantomData,
        }
    }
}

impl<H: Hasher> Default for IndexedArray<H> {
    fn default() -> Self {
        Self::new(LeafEncoding::default())
    }
}

impl<H: Hasher> IndexedArray<H> {
    pub fn new(encoding: LeafEncoding) -> Self {
        Self {
            elements: vec![IndexedElement {
                index: 0,
                value: BigUint::zero(),
                next_index: 0,
            }],
            current_node_index: 0,
            highest_element_index: 0,
            encoding,
            _hasher: PhantomData,
        }
    }

    pub fn encoding(&self) -> LeafEncoding {
        self.encoding
    }

    pub fn get(&self, index: usize) -> Option<&IndexedElement> {
        self.elements.get(index)
    }

    /// Number of elements appended after the zero element.
    pub fn len(&self) -> usize {
        self.current_node_index
    }

    pub fn is_empty(&self) -> bool {
        self.current_node_index == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexedElement> {
        self.elements.iter()
    }

    /// Walks the linked list from the zero element to the tail. Stops after
    /// `len() + 1` steps even if the links form a cycle.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &IndexedElement> + '_ {
        let mut next = Some(0usize);
        let mut remaining = self.elements.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let element = self.elements.get(next?)?;
            remaining -= 1;
            next = (element.next_index != 0).then_some(element.next_index);
            Some(element)
        })
    }

    pub fn find_element(&self, value: &BigUint) -> Option<&IndexedElement> {
        self.elements.iter().find(|node| node.value == *value)
    }

    /// Smallest stored value above the zero element, the max sentinel
    /// while nothing else is stored.
    pub fn lowest(&self) -> Option<&IndexedElement> {
        match self.elements.first()?.next_index {
            0 => None,
            next_index => self.elements.get(next_index),
        }
    }

    pub fn highest_element_index(&self) -> usize {
        self.highest_element_index
    }

    /// Sentinel-terminated arrays bound the tail by the max sentinel itself.
    fn tail_is_sentinel(&self) -> bool {
        self.elements[self.highest_element_index].value == highest_address_plus_one()
    }

    /// Value of the successor of `element`, or `None` for the tail.
    pub fn next_value_of(
        &self,
        element: &IndexedElement,
    ) -> Result<Option<&BigUint>, IndexedMerkleTreeError> {
        if element.next_index == 0 {
            return Ok(None);
        }
        self.elements
            .get(element.next_index)
            .map(|next| Some(&next.value))
            .ok_or(IndexedMerkleTreeError::IndexHigherThanMax)
    }

    /// Seeds the max sentinel so that every later value has a low element
    /// strictly below and a next value strictly above it.
    pub fn init(&mut self) -> Result<IndexedElementBundle, IndexedMerkleTreeError> {
        self.append_with_low_element_index(0, &highest_address_plus_one())
    }

    /// Returns the index of the low element for the given `value`, which is
    /// not yet the part of the array.
    ///
    /// Low element is the element with `low.value < value < next.value`.
    /// Both bounds are strict, a value equal to any stored value is rejected.
    pub fn find_low_element_index_for_nonexistent(
        &self,
        value: &BigUint,
    ) -> Result<usize, IndexedMerkleTreeError> {
        for (i, node) in self.elements.iter().enumerate() {
            if node.value == *value {
                return Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue);
            }
            if node.value < *value && self.elements[node.next_index].value > *value {
                return Ok(i);
            }
        }
        // The value is above every stored value. Only an array without the
        // max sentinel may grow past its tail.
        if self.tail_is_sentinel() {
            return Err(IndexedMerkleTreeError::ValueNotLessThanNext);
        }
        Ok(self.highest_element_index)
    }

    /// Returns the low element for `value` together with the value of the
    /// low element's successor.
    pub fn find_low_element_for_nonexistent(
        &self,
        value: &BigUint,
    ) -> Result<(IndexedElement, BigUint), IndexedMerkleTreeError> {
        let low_element_index = self.find_low_element_index_for_nonexistent(value)?;
        let low_element = self.elements[low_element_index].clone();
        let next_value = self.elements[low_element.next_index].value.clone();
        Ok((low_element, next_value))
    }

    /// Returns the index of the element pointing to `value`, which is
    /// already the part of the array.
    pub fn find_low_element_index_for_existent(
        &self,
        value: &BigUint,
    ) -> Result<usize, IndexedMerkleTreeError> {
        self.elements
            .iter()
            .position(|node| node.next_index != 0 && self.elements[node.next_index].value == *value)
            .ok_or(IndexedMerkleTreeError::ElementDoesNotExist)
    }

    /// Returns the leaf hash of the element at `index`.
    pub fn hash_element(&self, index: usize) -> Result<Hash, IndexedMerkleTreeError> {
        let element = self
            .elements
            .get(index)
            .ok_or(IndexedMerkleTreeError::IndexHigherThanMax)?;
        let next_element = self
            .elements
            .get(element.next_index)
            .ok_or(IndexedMerkleTreeError::IndexHigherThanMax)?;
        element.hash::<H>(&next_element.value, self.encoding)
    }

    /// Checks that `value` fits strictly between the element at
    /// `low_element_index` and its successor.
    pub fn validate_insertion(
        &self,
        low_element_index: usize,
        value: &BigUint,
    ) -> Result<(), IndexedMerkleTreeError> {
        let low_element = self
            .elements
            .get(low_element_index)
            .ok_or(IndexedMerkleTreeError::IndexHigherThanMax)?;
        if value <= &low_element.value {
            return Err(IndexedMerkleTreeError::LowElementGreaterOrEqualToNewElement);
        }
        match self.next_value_of(low_element)? {
            Some(next_value) if value >= next_value => {
                Err(IndexedMerkleTreeError::ValueNotLessThanNext)
            }
            None if self.tail_is_sentinel() => Err(IndexedMerkleTreeError::ValueNotLessThanNext),
            _ => Ok(()),
        }
    }

    /// Returns an updated low element and a new element, created based on the
    /// provided `low_element_index` and `value`. Does not modify the array.
    pub fn new_element_with_low_element_index(
        &self,
        low_element_index: usize,
        value: &BigUint,
    ) -> Result<IndexedElementBundle, IndexedMerkleTreeError> {
        let mut new_low_element = self
            .elements
            .get(low_element_index)
            .ok_or(IndexedMerkleTreeError::IndexHigherThanMax)?
            .clone();

        let new_element_index = self
            .current_node_index
            .checked_add(1)
            .ok_or(IndexedMerkleTreeError::IntegerOverflow)?;
        let new_element = IndexedElement {
            index: new_element_index,
            value: value.clone(),
            next_index: new_low_element.next_index,
        };

        new_low_element.next_index = new_element_index;

        let new_element_next_value = self.elements[new_element.next_index].value.clone();

        Ok(IndexedElementBundle {
            new_low_element,
            new_element,
            new_element_next_value,
        })
    }

    pub fn new_element(
        &self,
        value: &BigUint,
    ) -> Result<IndexedElementBundle, IndexedMerkleTreeError> {
        let low_element_index = self.find_low_element_index_for_nonexistent(value)?;
        self.new_element_with_low_element_index(low_element_index, value)
    }

    /// Stores a bundle produced by
    /// [`new_element_with_low_element_index`](Self::new_element_with_low_element_index)
    /// against the current state.
    pub fn insert_bundle(&mut self, bundle: &IndexedElementBundle) {
        let low_element_index = bundle.new_low_element.index;
        if self.elements[low_element_index].next_index == 0 {
            self.highest_element_index = bundle.new_element.index;
        }
        self.current_node_index = bundle.new_element.index;
        self.elements.push(bundle.new_element.clone());
        self.elements[low_element_index] = bundle.new_low_element.clone();
    }

    /// Appends the given `value` to the indexing array. On error the array
    /// is left unchanged.
    pub fn append_with_low_element_index(
        &mut self,
        low_element_index: usize,
        value: &BigUint,
    ) -> Result<IndexedElementBundle, IndexedMerkleTreeError> {
        self.validate_insertion(low_element_index, value)?;
        let bundle = self.new_element_with_low_element_index(low_element_index, value)?;
        self.insert_bundle(&bundle);
        Ok(bundle)
    }

    pub fn append(
        &mut self,
        value: &BigUint,
    ) -> Result<IndexedElementBundle, IndexedMerkleTreeError> {
        let low_element_index = self.find_low_element_index_for_nonexistent(value)?;
        self.append_with_low_element_index(low_element_index, value)
    }
}

#[cfg(test)]
mod test {
    use ledger_hasher::Poseidon;
    use num_bigint::{RandBigInt, ToBigUint};
    use rand::thread_rng;

    use super::*;

    #[test]
    fn test_indexed_element_cmp() {
        let mut rng = thread_rng();

        for _ in 0..100 {
            let value_higher = rng.gen_biguint(128);
            if value_higher.is_zero() {
                continue;
            }
            let value_lower = rng.gen_biguint_below(&value_higher);
            let element_lower = IndexedElement {
                index: 0,
                value: value_lower,
                next_index: 1,
            };
            let element_higher = IndexedElement {
                index: 1,
                value: value_higher,
                next_index: 2,
            };
            assert_ne!(element_lower, element_higher);
            assert!(matches!(element_lower.cmp(&element_higher), Ordering::Less));
            assert!(matches!(
                element_higher.partial_cmp(&element_lower),
                Some(Ordering::Greater)
            ));
        }
    }

    /// Without the sentinel the tail is unbounded and grows with each
    /// larger value.
    #[test]
    fn test_append_without_sentinel() {
        let mut indexed_array = IndexedArray::<Poseidon>::default();

        let value = 30_u32.to_biguint().unwrap();
        let bundle = indexed_array.new_element(&value).unwrap();
        assert!(indexed_array.find_element(&value).is_none());
        indexed_array.append(&value).unwrap();

        // value      = [ 0] [30]
        // next_index = [ 1] [ 0]
        assert_eq!(indexed_array.find_element(&value), Some(&bundle.new_element));
        assert_eq!(
            indexed_array.elements[0],
            IndexedElement {
                index: 0,
                value: BigUint::zero(),
                next_index: 1,
            }
        );
        assert_eq!(indexed_array.highest_element_index(), 1);

        let expected_hash = Poseidon::hashv(&[
            bigint_to_be_bytes_array::<32>(&value).unwrap().as_ref(),
            0_usize.to_be_bytes().as_ref(),
            [0u8; 32].as_ref(),
        ])
        .unwrap();
        assert_eq!(indexed_array.hash_element(1).unwrap(), expected_hash);

        let value = 42_u32.to_biguint().unwrap();
        indexed_array.append(&value).unwrap();
        assert_eq!(indexed_array.highest_element_index(), 2);
        assert_eq!(indexed_array.elements[1].next_index, 2);
        assert_eq!(indexed_array.len(), 2);
    }

    #[test]
    fn test_find_low_element_strict_bounds() {
        let mut indexed_array = IndexedArray::<Poseidon>::default();
        indexed_array.init().unwrap();
        for value in [10_u32, 20, 30] {
            indexed_array.append(&value.to_biguint().unwrap()).unwrap();
        }
        // value = [0, max, 10, 20, 30]
        let low = |v: u32| {
            indexed_array.find_low_element_index_for_nonexistent(&v.to_biguint().unwrap())
        };
        assert_eq!(low(5), Ok(0));
        assert_eq!(low(11), Ok(2));
        assert_eq!(low(25), Ok(3));
        assert_eq!(low(31), Ok(4));
        for existing in [0, 10, 20, 30] {
            assert_eq!(low(existing), Err(IndexedMerkleTreeError::DuplicateOrUnsortedValue));
        }
        assert_eq!(
            indexed_array
                .find_low_element_index_for_existent(&20_u32.to_biguint().unwrap())
                .unwrap(),
            2
        );
        assert_eq!(
            indexed_array.find_low_element_index_for_existent(&21_u32.to_biguint().unwrap()),
            Err(IndexedMerkleTreeError::ElementDoesNotExist)
        );
    }

    #[test]
    fn test_append_with_wrong_low_element() {
        let mut indexed_array = IndexedArray::<Poseidon>::default();
        indexed_array.init().unwrap();
        indexed_array.append(&100_u32.to_biguint().unwrap()).unwrap();
        let before = indexed_array.clone();

        assert_eq!(
            indexed_array
                .append_with_low_element_index(2, &50_u32.to_biguint().unwrap())
                .unwrap_err(),
            IndexedMerkleTreeError::LowElementGreaterOrEqualToNewElement
        );
        assert_eq!(
            indexed_array
                .append_with_low_element_index(0, &150_u32.to_biguint().unwrap())
                .unwrap_err(),
            IndexedMerkleTreeError::ValueNotLessThanNext
        );
        assert_eq!(
            indexed_array
                .append_with_low_element_index(1, &(highest_address_plus_one() + 1u32))
                .unwrap_err(),
            IndexedMerkleTreeError::ValueNotLessThanNext
        );
        assert_eq!(
            indexed_array
                .append_with_low_element_index(7, &50_u32.to_biguint().unwrap())
                .unwrap_err(),
            IndexedMerkleTreeError::IndexHigherThanMax
        );
        assert_eq!(indexed_array.elements, before.elements);
    }

    #[test]
    fn test_lowest() {
        let mut indexed_array = IndexedArray::<Poseidon>::default();
        assert_eq!(indexed_array.lowest(), None);
        indexed_array.init().unwrap();
        assert_eq!(indexed_array.lowest().unwrap().value, highest_address_plus_one());

        indexed_array.append(&50_u32.to_biguint().unwrap()).unwrap();
        indexed_array.append(&20_u32.to_biguint().unwrap()).unwrap();
        let lowest = indexed_array.lowest().unwrap();
        assert_eq!(lowest.value, 20_u32.to_biguint().unwrap());
        assert_eq!(lowest.index, 3);
    }

    #[test]
    fn test_iter_sorted() {
        let mut rng = thread_rng();
        let mut indexed_array = IndexedArray::<Poseidon>::default();
        indexed_array.init().unwrap();
        for _ in 0..50 {
            let value = rng.gen_biguint(200);
            if indexed_array.find_element(&value).is_some() {
                continue;
            }
            indexed_array.append(&value).unwrap();
        }
        let sorted: Vec<&IndexedElement> = indexed_array.iter_sorted().collect();
        assert_eq!(sorted.len(), indexed_array.len() + 1);
        assert!(sorted.windows(2).all(|pair| pair[0].value < pair[1].value));
        assert_eq!(sorted.last().unwrap().value, highest_address_plus_one());
        assert_eq!(indexed_array.lowest(), Some(sorted[1]));
    }
}
