//! Video block decompression
//!
//! The frame is covered by 4x4 blocks in row-major order. Each TYPE code
//! gives a block type and a run length; the blocks of the run are then
//! decoded from the MMAP, MCLR and FULL trees (or not at all for VOID and
//! SOLID blocks). Blocks on the right and bottom edges are clipped to the
//! frame.

use crate::bitstream::BitReader;
use crate::common::{FormatVersion, BLOCK_RUNS};
use crate::container::VideoTrees;
use crate::Result;

/// Block side length in pixels
const BLOCK_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockType {
    /// Two colors selected by a 16-bit mask
    Mono,
    /// Sixteen individually coded pixels
    Full,
    /// Unchanged from the previous frame
    Void,
    /// One color
    Solid,
    /// Four 2x2 quadrants (SMK4)
    Double,
    /// Two rows per code pair (SMK4)
    Half,
}

impl BlockType {
    fn from_code(code: u16) -> Self {
        match code & 0x03 {
            0 => BlockType::Mono,
            1 => BlockType::Full,
            2 => BlockType::Void,
            _ => BlockType::Solid,
        }
    }
}

/// One 4x4 block of the output frame
struct Block<'f> {
    frame: &'f mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
}

impl Block<'_> {
    fn set(&mut self, col: usize, row: usize, value: u8) {
        let (x, y) = (self.x + col, self.y + row);
        if x < self.width && y < self.height {
            self.frame[y * self.width + x] = value;
        }
    }

    fn fill(&mut self, value: u8) {
        for row in 0..BLOCK_SIZE {
            for col in 0..BLOCK_SIZE {
                self.set(col, row, value);
            }
        }
    }

    /// Write the high byte at `col + 1` and the low byte at `col`
    fn set_pair(&mut self, col: usize, row: usize, pair: u16) {
        self.set(col + 1, row, (pair >> 8) as u8);
        self.set(col, row, pair as u8);
    }
}

/// Decode a video bitstream over `frame`, which holds the previous frame
///
/// `frame` must be `width * height` bytes. VOID blocks leave their pixels
/// untouched, so on error the blocks not yet decoded keep the previous
/// frame's contents.
pub fn decode(
    data: &[u8],
    version: FormatVersion,
    width: usize,
    height: usize,
    trees: &mut VideoTrees,
    frame: &mut [u8],
) -> Result<()> {
    trees.reset_all();

    let mut br = BitReader::new(data);
    let blocks_wide = width.div_ceil(BLOCK_SIZE);
    let total = blocks_wide * height.div_ceil(BLOCK_SIZE);
    let mut index = 0;

    while index < total {
        let code = trees.typ.lookup(&mut br)?;
        let mut kind = BlockType::from_code(code);
        let run = BLOCK_RUNS[((code >> 2) & 0x3F) as usize];
        let color = (code >> 8) as u8;

        if kind == BlockType::Full && version == FormatVersion::V4 {
            if br.read_bit()? {
                kind = BlockType::Double;
            } else if br.read_bit()? {
                kind = BlockType::Half;
            }
        }

        for _ in 0..run {
            if index >= total {
                break;
            }

            let mut block = Block {
                frame: &mut *frame,
                width,
                height,
                x: (index % blocks_wide) * BLOCK_SIZE,
                y: (index / blocks_wide) * BLOCK_SIZE,
            };

            match kind {
                BlockType::Mono => {
                    let colors = trees.mclr.lookup(&mut br)?;
                    let (set, clear) = ((colors >> 8) as u8, colors as u8);
                    let mask = trees.mmap.lookup(&mut br)?;
                    for k in 0..16 {
                        let value = if mask & (1 << k) != 0 { set } else { clear };
                        block.set(k % 4, k / 4, value);
                    }
                }
                BlockType::Full => {
                    for row in 0..4 {
                        let right = trees.full.lookup(&mut br)?;
                        block.set_pair(2, row, right);
                        let left = trees.full.lookup(&mut br)?;
                        block.set_pair(0, row, left);
                    }
                }
                BlockType::Void => {}
                BlockType::Solid => block.fill(color),
                BlockType::Double => {
                    for half in 0..2 {
                        let pair = trees.full.lookup(&mut br)?;
                        let (hi, lo) = ((pair >> 8) as u8, pair as u8);
                        for row in [half * 2, half * 2 + 1] {
                            block.set(0, row, lo);
                            block.set(1, row, lo);
                            block.set(2, row, hi);
                            block.set(3, row, hi);
                        }
                    }
                }
                BlockType::Half => {
                    for half in 0..2 {
                        let right = trees.full.lookup(&mut br)?;
                        let left = trees.full.lookup(&mut br)?;
                        for row in [half * 2, half * 2 + 1] {
                            block.set_pair(2, row, right);
                            block.set_pair(0, row, left);
                        }
                    }
                }
            }

            index += 1;
        }
    }

    Ok(())
}
