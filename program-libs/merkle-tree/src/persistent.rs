use std::{fmt, marker::PhantomData, rc::Rc};

use ledger_hasher::{zero_bytes::zero_bytes, Hash, Hasher};

use crate::{capacity_of, compute_root_from_merkle_proof, MerkleTreeError};

/// Tree node. Nodes are never mutated once built, updates allocate a new
/// path and share every untouched subtree with the previous version.
#[derive(Debug, PartialEq)]
pub enum Node {
    /// Subtree without any written leaf. Its hash is `zero_bytes[depth]`.
    Empty {
        depth: usize,
        zero_bytes: Rc<[Hash]>,
    },
    /// Subtree with at least one written leaf. Leaves (`depth == 0`) carry
    /// no children, every interior node carries both.
    Full {
        depth: usize,
        value: Hash,
        children: Option<(Rc<Node>, Rc<Node>)>,
    },
}

impl Node {
    pub fn depth(&self) -> usize {
        match self {
            Node::Empty { depth, .. } | Node::Full { depth, .. } => *depth,
        }
    }

    pub fn value(&self) -> Hash {
        match self {
            Node::Empty { depth, zero_bytes } => zero_bytes[*depth],
            Node::Full { value, .. } => *value,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty { .. })
    }
}

/// Fixed-height sparse Merkle tree with structural sharing.
///
/// [`update`](Self::update) returns a new tree and leaves `self` intact, so a
/// tree can branch into several candidate successors. Cloning only copies the
/// root pointer.
pub struct PersistentMerkleTree<H: Hasher> {
    height: usize,
    capacity: usize,
    root: Rc<Node>,
    zero_bytes: Rc<[Hash]>,
    /// One shared empty node per depth, `empty_nodes[d]` has depth `d`.
    empty_nodes: Rc<[Rc<Node>]>,
    _hasher: PhantomData<H>,
}

impl<H: Hasher> Clone for PersistentMerkleTree<H> {
    fn clone(&self) -> Self {
        Self {
            height: self.height,
            capacity: self.capacity,
            root: self.root.clone(),
            zero_bytes: self.zero_bytes.clone(),
            empty_nodes: self.empty_nodes.clone(),
            _hasher: PhantomData,
        }
    }
}

impl<H: Hasher> fmt::Debug for PersistentMerkleTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentMerkleTree")
            .field("height", &self.height)
            .field("root", &self.root())
            .finish()
    }
}

impl<H: Hasher> PersistentMerkleTree<H> {
    pub fn new(height: usize) -> Result<Self, MerkleTreeError> {
        let capacity = capacity_of(height)?;
        let zero_bytes: Rc<[Hash]> = zero_bytes::<H>(height)?.into();
        let empty_nodes: Rc<[Rc<Node>]> = (0..=height)
            .map(|depth| {
                Rc::new(Node::Empty {
                    depth,
                    zero_bytes: zero_bytes.clone(),
                })
            })
            .collect::<Vec<_>>()
            .into();
        Ok(Self {
            height,
            capacity,
            root: empty_nodes[height].clone(),
            zero_bytes,
            empty_nodes,
            _hasher: PhantomData,
        })
    }

    pub fn root(&self) -> Hash {
        self.root.value()
    }

    pub fn root_node(&self) -> &Rc<Node> {
        &self.root
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn zero_bytes(&self) -> &[Hash] {
        &self.zero_bytes
    }

    /// O(1) copy sharing every node with `self`.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    fn check_index(&self, index: usize) -> Result<(), MerkleTreeError> {
        if index >= self.capacity {
            return Err(MerkleTreeError::IndexOutOfBounds {
                index,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn children<'a>(&'a self, node: &'a Node) -> (&'a Rc<Node>, &'a Rc<Node>) {
        match node {
            Node::Empty { depth, .. } => {
                let child = &self.empty_nodes[depth - 1];
                (child, child)
            }
            Node::Full {
                children: Some((left, right)),
                ..
            } => (left, right),
            Node::Full { children: None, .. } => {
                unreachable!("interior node without children")
            }
        }
    }

    /// Writes `leaf` at `index`. Returns the updated tree together with the
    /// sibling path of `index`, ordered from the leaf level upwards. The
    /// siblings are identical before and after the write.
    pub fn update(&self, index: usize, leaf: Hash) -> Result<(Self, Vec<Hash>), MerkleTreeError> {
        self.check_index(index)?;
        let mut proof = Vec::with_capacity(self.height);
        let root = self.with_value(&self.root, index, leaf, &mut proof)?;
        let mut tree = self.clone();
        tree.root = root;
        Ok((tree, proof))
    }

    /// In-place variant of [`update`](Self::update).
    pub fn apply(&mut self, index: usize, leaf: Hash) -> Result<Vec<Hash>, MerkleTreeError> {
        let (tree, proof) = self.update(index, leaf)?;
        *self = tree;
        Ok(proof)
    }

    fn with_value(
        &self,
        node: &Rc<Node>,
        index: usize,
        leaf: Hash,
        proof: &mut Vec<Hash>,
    ) -> Result<Rc<Node>, MerkleTreeError> {
        let depth = node.depth();
        if depth == 0 {
            return Ok(Rc::new(Node::Full {
                depth,
                value: leaf,
                children: None,
            }));
        }
        let (left, right) = self.children(node);
        // Siblings are pushed after the recursive call so the proof ends up
        // ordered leaf first.
        let (left, right) = if (index >> (depth - 1)) & 1 == 1 {
            let right = self.with_value(right, index, leaf, proof)?;
            proof.push(left.value());
            (left.clone(), right)
        } else {
            let left = self.with_value(left, index, leaf, proof)?;
            proof.push(right.value());
            (left, right.clone())
        };
        let value = H::hashv(&[&left.value(), &right.value()])?;
        Ok(Rc::new(Node::Full {
            depth,
            value,
            children: Some((left, right)),
        }))
    }

    pub fn get_proof_of_leaf(&self, index: usize) -> Result<Vec<Hash>, MerkleTreeError> {
        self.check_index(index)?;
        let mut proof = vec![[0u8; 32]; self.height];
        let mut node = &self.root;
        while node.depth() > 0 {
            let depth = node.depth();
            let (left, right) = self.children(node);
            if (index >> (depth - 1)) & 1 == 1 {
                proof[depth - 1] = left.value();
                node = right;
            } else {
                proof[depth - 1] = right.value();
                node = left;
            }
        }
        Ok(proof)
    }

    /// Hash of the node at `level` (0 = leaves) and position `node_index`
    /// within that level.
    pub fn node(&self, level: usize, node_index: usize) -> Result<Hash, MerkleTreeError> {
        if level > self.height {
            return Err(MerkleTreeError::InvalidHeight(level));
        }
        let level_capacity = 1usize << (self.height - level);
        if node_index >= level_capacity {
            return Err(MerkleTreeError::IndexOutOfBounds {
                index: node_index,
                capacity: level_capacity,
            });
        }
        let mut node = &self.root;
        while node.depth() > level {
            if node.is_empty() {
                return Ok(self.zero_bytes[level]);
            }
            let (left, right) = self.children(node);
            node = if (node_index >> (node.depth() - 1 - level)) & 1 == 1 {
                right
            } else {
                left
            };
        }
        Ok(node.value())
    }

    pub fn leaf(&self, index: usize) -> Result<Hash, MerkleTreeError> {
        self.node(0, index)
    }

    /// Rightmost subtree of every level for a tree whose leaves
    /// `0..next_index` have been appended, recomputed from the stored nodes.
    pub fn rightmost_subtrees(&self, next_index: usize) -> Result<Vec<Hash>, MerkleTreeError> {
        if next_index > self.capacity {
            return Err(MerkleTreeError::IndexOutOfBounds {
                index: next_index,
                capacity: self.capacity,
            });
        }
        (0..self.height)
            .map(|level| {
                let layer_len = next_index.div_ceil(1 << level);
                if layer_len == 0 {
                    Ok(self.zero_bytes[level])
                } else if layer_len % 2 == 0 {
                    self.node(level, layer_len - 2)
                } else {
                    self.node(level, layer_len - 1)
                }
            })
            .collect()
    }

    pub fn verify(
        &self,
        index: usize,
        leaf: &Hash,
        proof: &[Hash],
    ) -> Result<bool, MerkleTreeError> {
        if proof.len() != self.height {
            return Err(MerkleTreeError::InvalidProofLength(proof.len(), self.height));
        }
        self.check_index(index)?;
        let root = compute_root_from_merkle_proof::<H>(*leaf, proof, index)?;
        Ok(root == self.root())
    }
}
