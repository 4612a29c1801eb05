//! Inclusion proof produced by [`IncrementalMerkleTree::proof`](super::IncrementalMerkleTree::proof).

use ark_bn254::Fr;

use crate::hasher::FieldHasher;

/// Sibling path from a leaf to the root.
///
/// `path_indices[i]` is the position bit of the node on the path at level
/// `i`: `0` when that node is the left (even) child, `1` when it is the
/// right child. Both vectors are ordered leaf to root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub root: Fr,
    pub leaf_index: u64,
    pub path_elements: Vec<Fr>,
    pub path_indices: Vec<u8>,
}

impl MerkleProof {
    pub fn depth(&self) -> usize {
        self.path_elements.len()
    }

    /// The circuit's view of the path: `true` where the node on the path
    /// is the left child.
    pub fn is_even(&self) -> Vec<bool> {
        self.path_indices.iter().map(|bit| bit % 2 == 0).collect()
    }

    /// Replay the hash chain from `leaf`.
    pub fn compute_root<H: FieldHasher>(&self, leaf: Fr, hasher: &H) -> Fr {
        let mut current = leaf;

        for (sibling, bit) in self.path_elements.iter().zip(self.path_indices.iter()) {
            current = if bit % 2 == 0 {
                // Current is left child: H(current, sibling)
                hasher.hash_two(current, *sibling)
            } else {
                // Current is right child: H(sibling, current)
                hasher.hash_two(*sibling, current)
            };
        }

        current
    }

    /// Whether `leaf` hashes up to the recorded root.
    pub fn verify<H: FieldHasher>(&self, leaf: Fr, hasher: &H) -> bool {
        self.path_elements.len() == self.path_indices.len()
            && self.compute_root(leaf, hasher) == self.root
    }
}
