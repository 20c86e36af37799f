//! 16-bit Huffman tree with a most-recently-used escape cache
//!
//! A big tree is built from two [`SmallTree`]s (low and high byte) and three
//! seed values. Leaves whose value matches a seed are stored as escapes into
//! a three-slot cache; every lookup moves its result to the front of that
//! cache, so recently used symbols stay reachable through the escape codes.
//! The cache is decode state: video decoding resets it at the start of each
//! frame.

use super::{build_preorder, read_terminator, walk, Node, SmallTree};
use crate::bitstream::BitReader;
use crate::Result;

/// Leaf payload of a [`BigTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigLeaf {
    /// Literal 16-bit symbol
    Literal(u16),
    /// Current contents of cache slot 0, 1 or 2
    Escape(u8),
}

/// 16-bit Huffman tree
#[derive(Debug, Clone, Default)]
pub struct BigTree {
    nodes: Vec<Node<BigLeaf>>,
    cache: [u16; 3],
}

impl BigTree {
    /// An absent tree, as used when the file carries no tree data
    pub fn absent() -> Self {
        Self::default()
    }

    /// Build a tree from the bitstream
    pub fn build(br: &mut BitReader<'_>) -> Result<Self> {
        let mut tree = Self::absent();

        if br.read_bit()? {
            let low = SmallTree::build(br)?;
            let high = SmallTree::build(br)?;

            for slot in tree.cache.iter_mut() {
                *slot = br.read_u16()?;
            }

            let seeds = tree.cache;
            build_preorder(br, &mut tree.nodes, usize::MAX, |br| {
                let lo = low.lookup(br)? as u16;
                let hi = high.lookup(br)? as u16;
                let value = (hi << 8) | lo;
                Ok(match seeds.iter().position(|&seed| seed == value) {
                    Some(slot) => BigLeaf::Escape(slot as u8),
                    None => BigLeaf::Literal(value),
                })
            })?;
        }

        read_terminator(br)?;
        Ok(tree)
    }

    /// True when the file declared no tree
    pub fn is_absent(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clear the escape cache
    pub fn reset(&mut self) {
        self.cache = [0; 3];
    }

    /// Current escape cache contents, most recent first
    pub fn cache(&self) -> [u16; 3] {
        self.cache
    }

    /// Decode one symbol and move it to the front of the cache
    pub fn lookup(&mut self, br: &mut BitReader<'_>) -> Result<u16> {
        let value = match *walk(&self.nodes, br)? {
            BigLeaf::Literal(value) => value,
            BigLeaf::Escape(slot) => self.cache[slot as usize],
        };

        if value != self.cache[0] {
            self.cache[2] = self.cache[1];
            self.cache[1] = self.cache[0];
            self.cache[0] = value;
        }

        Ok(value)
    }
}
