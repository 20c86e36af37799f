//! 8-bit Huffman tree
//!
//! Used directly by the audio decoder and as the low/high byte source when
//! building a [`BigTree`](super::BigTree).

use super::{build_preorder, read_terminator, walk, Node};
use crate::bitstream::BitReader;
use crate::Result;

/// A tree with more leaves than byte values is malformed
const MAX_LEAVES: usize = 256;

/// Immutable 8-bit Huffman tree
#[derive(Debug, Clone, Default)]
pub struct SmallTree {
    nodes: Vec<Node<u8>>,
}

impl SmallTree {
    /// Build a tree from the bitstream
    ///
    /// A clear leading bit yields an absent tree; lookups into it fail with
    /// [`SmackerError::AbsentTree`](crate::SmackerError::AbsentTree).
    pub fn build(br: &mut BitReader<'_>) -> Result<Self> {
        let mut nodes = Vec::new();
        if br.read_bit()? {
            build_preorder(br, &mut nodes, MAX_LEAVES, |br| br.read_byte())?;
        }
        read_terminator(br)?;
        Ok(Self { nodes })
    }

    /// True when the file declared no tree
    pub fn is_absent(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Decode one symbol
    pub fn lookup(&self, br: &mut BitReader<'_>) -> Result<u8> {
        walk(&self.nodes, br).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode_small_tree, BitWriter};
    use crate::SmackerError;

    #[test]
    fn test_absent_tree() {
        // presence bit 0, terminator 0
        let data = [0x00u8];
        let mut br = BitReader::new(&data);
        let tree = SmallTree::build(&mut br).unwrap();
        assert!(tree.is_absent());
        assert_eq!(br.bits_left(), 6);
        assert!(matches!(tree.lookup(&mut br), Err(SmackerError::AbsentTree)));
    }

    #[test]
    fn test_single_leaf_consumes_no_bits() {
        let mut bw = BitWriter::new();
        encode_small_tree(&mut bw, &[0x5A]);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        let tree = SmallTree::build(&mut br).unwrap();
        let left = br.bits_left();
        assert_eq!(tree.lookup(&mut br).unwrap(), 0x5A);
        assert_eq!(br.bits_left(), left);
    }

    #[test]
    fn test_round_trip_symbols() {
        let symbols = [0x00u8, 0x7F, 0x80, 0xFF, 0x10];
        let mut bw = BitWriter::new();
        let codes = encode_small_tree(&mut bw, &symbols);
        for &sym in symbols.iter().rev() {
            bw.put_code(&codes[&sym]);
        }
        let data = bw.finish();

        let mut br = BitReader::new(&data);
        let tree = SmallTree::build(&mut br).unwrap();
        for &sym in symbols.iter().rev() {
            assert_eq!(tree.lookup(&mut br).unwrap(), sym);
        }
    }

    #[test]
    fn test_bad_terminator() {
        let mut bw = BitWriter::new();
        bw.put_bit(true);
        bw.put_bit(false);
        bw.put_byte(0x11);
        bw.put_bit(true);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        assert!(matches!(
            SmallTree::build(&mut br),
            Err(SmackerError::MalformedTree)
        ));
    }

    #[test]
    fn test_truncated_tree() {
        // branch with only a left leaf before the data runs out
        let mut bw = BitWriter::new();
        bw.put_bit(true);
        bw.put_bit(true);
        bw.put_bit(false);
        bw.put_byte(0x22);
        let data = bw.finish();
        let mut br = BitReader::new(&data[..1]);
        assert!(matches!(
            SmallTree::build(&mut br),
            Err(SmackerError::BitstreamExhausted)
        ));
    }

    #[test]
    fn test_lookup_exhausted_mid_walk() {
        let mut bw = BitWriter::new();
        encode_small_tree(&mut bw, &[1, 2, 3, 4]);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        let tree = SmallTree::build(&mut br).unwrap();
        let mut empty = BitReader::new(&[]);
        assert!(matches!(
            tree.lookup(&mut empty),
            Err(SmackerError::BitstreamExhausted)
        ));
    }
}
