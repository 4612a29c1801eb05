//! Incremental Merkle tree native implementation.
//!
//! The tree is conceptually full: `2^depth` leaves, every unfilled one equal
//! to [`EMPTY_LEAF`]. Only the filled prefix of each level is stored. Any
//! node to the right of that prefix roots an all-empty subtree, whose hash
//! is looked up in a per-level table (`zeros`) computed once at
//! construction. Building from `n` leaves therefore costs `O(n + depth)`
//! hashes and memory regardless of depth.

use ark_bn254::Fr;
use ark_ff::MontFp;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::proof::MerkleProof;
use super::TreeError;
use crate::field::to_decimal_string;
use crate::hasher::FieldHasher;

/// Default tree depth (20 levels = 1,048,576 deposits)
pub const DEFAULT_DEPTH: usize = 20;

/// Deepest supported tree; leaf indices must fit in a `u64` with room for
/// the capacity itself.
pub const MAX_DEPTH: usize = 32;

/// Value of every leaf position that has not been filled by a deposit.
pub const EMPTY_LEAF: Fr = MontFp!("0");

/// Hashes of all-empty subtrees: `zeros[0] = EMPTY_LEAF`,
/// `zeros[i] = H(zeros[i-1], zeros[i-1])`, for `i` in `0..=depth`.
pub fn zero_hashes<H: FieldHasher>(depth: usize, hasher: &H) -> Vec<Fr> {
    let mut zeros = Vec::with_capacity(depth + 1);
    let mut current = EMPTY_LEAF;
    zeros.push(current);

    for _ in 0..depth {
        current = hasher.hash_two(current, current);
        zeros.push(current);
    }

    zeros
}

/// Append-only Merkle tree of fixed depth.
#[derive(Clone, Debug)]
pub struct IncrementalMerkleTree {
    /// Number of levels between the leaves and the root
    depth: usize,

    /// Filled prefix of every level.
    /// Level 0 = leaves, level `depth` = root (empty until a leaf exists)
    levels: Vec<Vec<Fr>>,

    /// Empty-subtree hash per level
    zeros: Vec<Fr>,
}

impl IncrementalMerkleTree {
    /// Create an empty tree.
    pub fn new<H: FieldHasher>(depth: usize, hasher: &H) -> Result<Self, TreeError> {
        Self::build(&[], depth, hasher)
    }

    /// Build a tree over `leaves` in index order.
    pub fn build<H: FieldHasher>(
        leaves: &[Fr],
        depth: usize,
        hasher: &H,
    ) -> Result<Self, TreeError> {
        if depth > MAX_DEPTH {
            return Err(TreeError::DepthTooLarge(depth));
        }
        let leaf_count = leaves.len() as u64;
        if leaf_count > capacity_of(depth) {
            return Err(TreeError::Capacity {
                leaves: leaf_count,
                depth,
            });
        }

        let zeros = zero_hashes(depth, hasher);

        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(leaves.to_vec());
        for level in 0..depth {
            let parents = hash_level(&levels[level], zeros[level], hasher);
            levels.push(parents);
        }

        Ok(Self {
            depth,
            levels,
            zeros,
        })
    }

    /// Append a leaf and recompute its path. Returns the leaf index.
    pub fn insert<H: FieldHasher>(&mut self, leaf: Fr, hasher: &H) -> Result<u64, TreeError> {
        let index = self.len();
        if index >= self.capacity() {
            return Err(TreeError::Capacity {
                leaves: index + 1,
                depth: self.depth,
            });
        }

        self.levels[0].push(leaf);

        let mut current_index = index as usize;
        for level in 0..self.depth {
            let parent_index = current_index / 2;
            let left = self.node(level, 2 * parent_index as u64);
            let right = self.node(level, 2 * parent_index as u64 + 1);
            let parent_hash = hasher.hash_two(left, right);

            // The parent is either already stored or is the next one.
            let parents = &mut self.levels[level + 1];
            if parent_index < parents.len() {
                parents[parent_index] = parent_hash;
            } else {
                parents.push(parent_hash);
            }

            current_index = parent_index;
        }

        Ok(index)
    }

    /// Node value at `(level, index)`, falling back to the empty-subtree hash.
    fn node(&self, level: usize, index: u64) -> Fr {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.levels[level].get(i))
            .copied()
            .unwrap_or(self.zeros[level])
    }

    /// Get the current root hash.
    pub fn root(&self) -> Fr {
        self.node(self.depth, 0)
    }

    /// Index of the first leaf equal to `leaf`.
    pub fn get_index(&self, leaf: Fr) -> Result<u64, TreeError> {
        self.levels[0]
            .iter()
            .position(|l| *l == leaf)
            .map(|i| i as u64)
            .ok_or_else(|| TreeError::NotFound(to_decimal_string(&leaf)))
    }

    /// Inclusion proof for the leaf position `index`.
    ///
    /// Any position below the capacity is valid; positions past the filled
    /// prefix prove the empty leaf.
    pub fn proof(&self, index: u64) -> Result<MerkleProof, TreeError> {
        if index >= self.capacity() {
            return Err(TreeError::IndexOutOfRange {
                index,
                depth: self.depth,
            });
        }

        let mut path_elements = Vec::with_capacity(self.depth);
        let mut path_indices = Vec::with_capacity(self.depth);

        let mut current_index = index;
        for level in 0..self.depth {
            path_elements.push(self.node(level, current_index ^ 1));
            path_indices.push((current_index & 1) as u8);
            current_index >>= 1;
        }

        Ok(MerkleProof {
            root: self.root(),
            leaf_index: index,
            path_elements,
            path_indices,
        })
    }

    /// Proofs for several positions of the same snapshot.
    pub fn proofs(&self, indices: &[u64]) -> Result<Vec<MerkleProof>, TreeError> {
        #[cfg(feature = "parallel")]
        let iter = indices.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = indices.iter();

        iter.map(|&index| self.proof(index)).collect()
    }

    /// Get the tree depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Maximum number of leaves.
    pub fn capacity(&self) -> u64 {
        capacity_of(self.depth)
    }

    /// Number of inserted leaves.
    pub fn len(&self) -> u64 {
        self.levels[0].len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// Inserted leaves in index order.
    pub fn leaves(&self) -> &[Fr] {
        &self.levels[0]
    }

    /// Hash of an all-empty subtree rooted at `level`.
    pub fn zero_hash(&self, level: usize) -> Fr {
        self.zeros[level]
    }
}

fn capacity_of(depth: usize) -> u64 {
    1u64 << depth
}

fn hash_pair<H: FieldHasher>(pair: &[Fr], zero: Fr, hasher: &H) -> Fr {
    let right = pair.get(1).copied().unwrap_or(zero);
    hasher.hash_two(pair[0], right)
}

/// Hash one level's filled prefix into its parents.
fn hash_level<H: FieldHasher>(nodes: &[Fr], zero: Fr, hasher: &H) -> Vec<Fr> {
    #[cfg(feature = "parallel")]
    {
        nodes
            .par_chunks(2)
            .map(|pair| hash_pair(pair, zero, hasher))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        nodes
            .chunks(2)
            .map(|pair| hash_pair(pair, zero, hasher))
            .collect()
    }
}

#[cfg(test)]
mod tree_tests {
    use super::*;
    use crate::poseidon::PoseidonHasher;

    fn leaves(n: u64) -> Vec<Fr> {
        (1..=n).map(|i| Fr::from(i * 1000 + 7)).collect()
    }

    #[test]
    fn test_empty_tree() {
        let hasher = PoseidonHasher::new();
        let tree = IncrementalMerkleTree::new(DEFAULT_DEPTH, &hasher).unwrap();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.capacity(), 1 << DEFAULT_DEPTH);
        assert_eq!(tree.root(), tree.zero_hash(DEFAULT_DEPTH));
    }

    #[test]
    fn test_zero_hash_chain() {
        let hasher = PoseidonHasher::new();
        let zeros = zero_hashes(4, &hasher);

        assert_eq!(zeros.len(), 5);
        assert_eq!(zeros[0], EMPTY_LEAF);
        for level in 1..zeros.len() {
            assert_eq!(zeros[level], hasher.hash_two(zeros[level - 1], zeros[level - 1]));
        }
    }

    #[test]
    fn test_depth_zero_tree_is_its_leaf() {
        let hasher = PoseidonHasher::new();
        let tree = IncrementalMerkleTree::build(&[Fr::from(5u64)], 0, &hasher).unwrap();

        assert_eq!(tree.root(), Fr::from(5u64));
        assert_eq!(tree.proof(0).unwrap().depth(), 0);
        assert!(tree.proof(1).is_err());
    }

    #[test]
    fn test_single_insert_changes_root() {
        let hasher = PoseidonHasher::new();
        let mut tree = IncrementalMerkleTree::new(8, &hasher).unwrap();

        let root1 = tree.root();
        let index = tree.insert(Fr::from(100u64), &hasher).unwrap();
        let root2 = tree.root();

        assert_eq!(index, 0);
        assert_ne!(root1, root2, "Root should change after insert");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_insert_matches_build() {
        let hasher = PoseidonHasher::new();
        let values = leaves(13);

        let mut incremental = IncrementalMerkleTree::new(5, &hasher).unwrap();
        for (i, leaf) in values.iter().enumerate() {
            assert_eq!(incremental.insert(*leaf, &hasher).unwrap(), i as u64);
            let built = IncrementalMerkleTree::build(&values[..=i], 5, &hasher).unwrap();
            assert_eq!(incremental.root(), built.root(), "diverged after {} leaves", i + 1);
        }
    }

    #[test]
    fn test_insert_until_full() {
        let hasher = PoseidonHasher::new();
        let mut tree = IncrementalMerkleTree::new(2, &hasher).unwrap();

        for leaf in leaves(4) {
            tree.insert(leaf, &hasher).unwrap();
        }
        assert_eq!(
            tree.insert(Fr::from(1u64), &hasher),
            Err(TreeError::Capacity { leaves: 5, depth: 2 })
        );
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_depth_limit() {
        let hasher = PoseidonHasher::new();
        assert_eq!(
            IncrementalMerkleTree::build(&[], MAX_DEPTH + 1, &hasher).unwrap_err(),
            TreeError::DepthTooLarge(MAX_DEPTH + 1)
        );
        assert!(IncrementalMerkleTree::build(&leaves(3), MAX_DEPTH, &hasher).is_ok());
    }

    #[test]
    fn test_proof_for_unfilled_position() {
        let hasher = PoseidonHasher::new();
        let tree = IncrementalMerkleTree::build(&leaves(3), 4, &hasher).unwrap();

        let proof = tree.proof(9).unwrap();
        assert!(proof.verify(EMPTY_LEAF, &hasher));
        assert!(!proof.verify(Fr::from(1u64), &hasher));
    }

    #[test]
    fn test_batch_proofs() {
        let hasher = PoseidonHasher::new();
        let values = leaves(6);
        let tree = IncrementalMerkleTree::build(&values, 4, &hasher).unwrap();

        let proofs = tree.proofs(&[0, 3, 5]).unwrap();
        assert_eq!(proofs.len(), 3);
        assert!(proofs[0].verify(values[0], &hasher));
        assert!(proofs[1].verify(values[3], &hasher));
        assert!(proofs[2].verify(values[5], &hasher));

        assert!(tree.proofs(&[0, 16]).is_err());
    }
}
