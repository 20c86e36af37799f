//! Smacker Huffman trees
//!
//! Trees are transmitted as a pre-order walk: a set bit opens a branch
//! (left subtree first, then right), a clear bit is followed by a leaf
//! payload. Both tree flavours keep their nodes in a flat arena in that
//! same pre-order, so a branch's left child always sits right after it and
//! only the right child index needs storing.

mod big;
mod small;

pub use big::{BigLeaf, BigTree};
pub use small::SmallTree;

use crate::bitstream::BitReader;
use crate::{Result, SmackerError};

/// Arena node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node<T> {
    /// Terminal symbol
    Leaf(T),
    /// Inner node; the left child is at `self + 1`
    Branch {
        /// Arena index of the right child
        right: usize,
    },
}

/// Read a pre-order tree body into `nodes`
///
/// Branches whose left subtree is still open are kept on an explicit stack,
/// so arbitrarily deep trees never recurse.
pub(crate) fn build_preorder<T, F>(
    br: &mut BitReader<'_>,
    nodes: &mut Vec<Node<T>>,
    max_leaves: usize,
    mut read_leaf: F,
) -> Result<()>
where
    F: FnMut(&mut BitReader<'_>) -> Result<T>,
{
    let mut open_branches: Vec<usize> = Vec::new();
    let mut leaves = 0;

    loop {
        if br.read_bit()? {
            open_branches.push(nodes.len());
            nodes.push(Node::Branch { right: 0 });
            continue;
        }

        leaves += 1;
        if leaves > max_leaves {
            return Err(SmackerError::MalformedTree);
        }
        let leaf = read_leaf(br)?;
        nodes.push(Node::Leaf(leaf));

        // a finished leaf closes the left side of the innermost open branch
        match open_branches.pop() {
            Some(branch) => nodes[branch] = Node::Branch { right: nodes.len() },
            None => return Ok(()),
        }
    }
}

/// Walk from the root to a leaf, one bit per branch (1 = right)
pub(crate) fn walk<'t, T>(nodes: &'t [Node<T>], br: &mut BitReader<'_>) -> Result<&'t T> {
    let mut index = 0;
    loop {
        match nodes.get(index) {
            Some(Node::Leaf(value)) => return Ok(value),
            Some(Node::Branch { right }) => {
                index = if br.read_bit()? { *right } else { index + 1 };
            }
            None => return Err(SmackerError::AbsentTree),
        }
    }
}

/// Read the closing bit that follows every tree; a set bit is malformed
pub(crate) fn read_terminator(br: &mut BitReader<'_>) -> Result<()> {
    if br.read_bit()? {
        return Err(SmackerError::MalformedTree);
    }
    Ok(())
}
