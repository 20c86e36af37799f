//! Smacker - Rust decoder for the Smacker (.smk) video format
//!
//! This crate decodes Smacker files, the interleaved palette, audio and
//! video container used by many 1990s games. Frames are 8-bit palette
//! indexed and compressed as 4x4 blocks with escape-cached Huffman codes;
//! audio tracks are raw PCM or Huffman-coded DPCM.
//!
//! # Features
//!
//! - SMK2 and SMK4 files, including SMK4 DOUBLE and HALF blocks
//! - Up to seven audio tracks, raw or DPCM, 8/16-bit, mono/stereo
//! - In-memory or disk-streaming frame storage
//! - Keyframe and exact seeking, ring-frame looping
//! - Recoverable decode faults reported per frame instead of aborting
//!
//! The Bink perceptual audio codec is detected and rejected.
//!
//! # Example
//!
//! ```no_run
//! use smacker::{FrameStatus, OpenMode, Smacker};
//!
//! let mut smk = Smacker::open("intro.smk", OpenMode::Memory)?;
//! let info = smk.info().clone();
//! println!("{}x{} at {:.2} fps", info.width, info.height, info.fps);
//!
//! let mut status = smk.first()?;
//! loop {
//!     let palette = smk.palette().unwrap_or_default();
//!     let pixels = smk.video().unwrap_or_default();
//!     println!("frame {}: {} pixels, {} palette bytes", smk.current_frame(), pixels.len(), palette.len());
//!     if status != FrameStatus::More {
//!         break;
//!     }
//!     status = smk.next()?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod bitstream;
pub mod common;
pub mod container;
pub mod decoder;
pub mod error;
pub mod huffman;
pub mod render;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use common::{
    AudioTrackInfo, FormatVersion, FrameStatus, OpenMode, Result, SmackerError, SmackerInfo,
    YScaleMode, NUM_AUDIO_TRACKS, PALETTE_SIZE,
};
pub use container::ChunkSource;
pub use decoder::Smacker;
pub use render::{RenderFault, Stream};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Convenience functions

/// Read only the header and tables of a file
///
/// Frame chunks are neither read nor checked, so this is cheaper than
/// [`Smacker::open`] when only metadata is needed.
pub fn read_info<P: AsRef<Path>>(path: P) -> Result<SmackerInfo> {
    let mut reader = BufReader::new(File::open(path)?);
    Ok(container::Layout::read(&mut reader)?.info)
}

/// Open a file held in memory
pub fn open_bytes(data: &[u8]) -> Result<Smacker> {
    Smacker::from_bytes(data)
}
