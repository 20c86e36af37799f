//! Smacker container parsing
//!
//! Opening a file reads the header and frame tables, builds the four video
//! trees from the shared tree chunk and sets up a [`ChunkSource`] for the
//! frame chunks that follow.

mod header;
mod source;

pub use header::{FrameTable, Layout};
pub use source::{ChunkSource, DiskSource, MemorySource};

use crate::bitstream::BitReader;
use crate::common::{OpenMode, SmackerInfo};
use crate::huffman::BigTree;
use crate::Result;
use log::debug;
use std::io::{Cursor, Read, Seek};

/// The four video trees, in the order they are stored in the file
#[derive(Debug, Clone, Default)]
pub struct VideoTrees {
    /// Monochrome block bitmaps
    pub mmap: BigTree,
    /// Monochrome block color pairs
    pub mclr: BigTree,
    /// Full block pixel pairs
    pub full: BigTree,
    /// Block type, run length and solid color
    pub typ: BigTree,
}

impl VideoTrees {
    /// Build the trees from the tree chunk
    ///
    /// An empty chunk yields four absent trees.
    pub fn build(chunk: &[u8]) -> Result<Self> {
        if chunk.is_empty() {
            debug!("empty tree chunk, video trees absent");
            return Ok(Self::default());
        }

        let mut br = BitReader::new(chunk);
        let mmap = BigTree::build(&mut br)?;
        let mclr = BigTree::build(&mut br)?;
        let full = BigTree::build(&mut br)?;
        let typ = BigTree::build(&mut br)?;

        debug!(
            "video trees built from {} of {} tree bytes",
            br.bytes_consumed(),
            chunk.len()
        );
        Ok(Self {
            mmap,
            mclr,
            full,
            typ,
        })
    }

    /// Clear the escape cache of every tree
    pub fn reset_all(&mut self) {
        self.mmap.reset();
        self.mclr.reset();
        self.full.reset();
        self.typ.reset();
    }
}

/// Immutable per-file state plus the chunk source
#[derive(Debug)]
pub struct Container {
    /// File metadata
    pub info: SmackerInfo,
    /// Frame tables
    pub frames: FrameTable,
    /// Video trees
    pub trees: VideoTrees,
    /// Raw frame chunk storage
    pub source: Box<dyn ChunkSource>,
}

impl Container {
    /// Parse a container from a seekable reader
    pub fn from_reader<R: Read + Seek + 'static>(mut reader: R, mode: OpenMode) -> Result<Self> {
        let layout = Layout::read(&mut reader)?;
        let trees = VideoTrees::build(&layout.tree_chunk)?;

        let source: Box<dyn ChunkSource> = match mode {
            OpenMode::Memory => Box::new(MemorySource::load(&mut reader, &layout.frames)?),
            OpenMode::Disk => Box::new(DiskSource::index(reader, &layout.frames)?),
        };

        Ok(Self {
            info: layout.info,
            frames: layout.frames,
            trees,
            source,
        })
    }

    /// Parse a container held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(data);
        let layout = Layout::read(&mut reader)?;
        let trees = VideoTrees::build(&layout.tree_chunk)?;
        let source = MemorySource::load(&mut reader, &layout.frames)?;

        Ok(Self {
            info: layout.info,
            frames: layout.frames,
            trees,
            source: Box::new(source),
        })
    }
}
