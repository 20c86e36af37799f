//! Fixed header and frame tables
//!
//! Everything up to and including the Huffman tree chunk is read here; the
//! frame chunks that follow are handled by a [`ChunkSource`](super::ChunkSource).

use crate::common::*;
use log::{debug, warn};
use std::io::Read;

/// Upper bound on speculative preallocation driven by header counts
const MAX_PREALLOC: usize = 4096;

/// Per-frame size, keyframe and type tables
#[derive(Debug, Clone, Default)]
pub struct FrameTable {
    sizes: Vec<u32>,
    keyframes: Vec<bool>,
    types: Vec<u8>,
}

impl FrameTable {
    /// Number of rows, ring frame included
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Byte length of a frame chunk
    pub fn chunk_size(&self, frame: usize) -> u32 {
        self.sizes[frame]
    }

    /// All chunk sizes in file order
    pub fn chunk_sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Frame can be decoded without the previous video buffer
    pub fn is_keyframe(&self, frame: usize) -> bool {
        self.keyframes[frame]
    }

    /// Raw type mask (bit 0 palette, bit 1+i audio track i)
    pub fn type_mask(&self, frame: usize) -> u8 {
        self.types[frame]
    }

    /// Frame starts with a palette record
    pub fn has_palette(&self, frame: usize) -> bool {
        self.types[frame] & FRAME_TYPE_PALETTE != 0
    }

    /// Frame carries a record for audio track `track`
    pub fn has_audio(&self, frame: usize, track: usize) -> bool {
        self.types[frame] & (0x02 << track) != 0
    }
}

/// Parsed header, tables and raw tree chunk
#[derive(Debug)]
pub struct Layout {
    /// File metadata
    pub info: SmackerInfo,
    /// Frame tables
    pub frames: FrameTable,
    /// Raw Huffman tree chunk
    pub tree_chunk: Vec<u8>,
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read exactly `len` bytes without trusting `len` for preallocation
pub(crate) fn read_chunk<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC * 16));
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("short read: wanted {} bytes, got {}", len, buf.len()),
        )
        .into());
    }
    Ok(buf)
}

impl Layout {
    /// Read the header, frame tables and tree chunk
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut signature = [0u8; 3];
        reader.read_exact(&mut signature)?;
        if &signature != SMK_SIGNATURE {
            return Err(SmackerError::InvalidSignature);
        }
        let version = FormatVersion::from_u8(read_u8(reader)?)?;

        let width = read_u32(reader)?;
        let height = read_u32(reader)?;
        let pixels = (width as usize).checked_mul(height as usize);
        if !matches!(pixels, Some(pixels) if pixels <= MAX_FRAME_PIXELS) {
            return Err(SmackerError::InvalidHeader(format!(
                "frame size {}x{} exceeds {} pixels",
                width, height, MAX_FRAME_PIXELS
            )));
        }
        let frame_count = read_u32(reader)?;
        if frame_count == 0 {
            return Err(SmackerError::InvalidHeader("frame count is zero".to_string()));
        }

        let (fps, frame_duration_us) = frame_rate(read_u32(reader)? as i32);

        let flags = read_u32(reader)?;
        if flags & FLAG_Y_DOUBLE != 0 && flags & FLAG_Y_INTERLACE != 0 {
            warn!("both Y-double and Y-interlace flags set, using Y-interlace");
        }
        let has_ring_frame = flags & FLAG_RING_FRAME != 0;

        let mut audio_max_buffer = [0u32; NUM_AUDIO_TRACKS];
        for size in audio_max_buffer.iter_mut() {
            *size = read_u32(reader)?;
        }

        let tree_size = read_u32(reader)?;
        let mut tree_unpacked_sizes = [0u32; 4];
        for size in tree_unpacked_sizes.iter_mut() {
            *size = read_u32(reader)?;
        }

        let mut audio = [AudioTrackInfo::default(); NUM_AUDIO_TRACKS];
        for (track, info) in audio.iter_mut().enumerate() {
            *info = AudioTrackInfo::from_descriptor(track, read_u32(reader)?)?;
        }

        // reserved
        read_u32(reader)?;

        let info = SmackerInfo {
            version,
            width,
            height,
            frame_count,
            has_ring_frame,
            fps,
            frame_duration_us,
            flags,
            y_scale: YScaleMode::from_flags(flags),
            tree_size,
            audio_max_buffer,
            tree_unpacked_sizes,
            audio,
        };

        let total = info.total_frames();
        let mut frames = FrameTable {
            sizes: Vec::with_capacity(total.min(MAX_PREALLOC)),
            keyframes: Vec::with_capacity(total.min(MAX_PREALLOC)),
            types: Vec::with_capacity(total.min(MAX_PREALLOC)),
        };
        for _ in 0..total {
            let raw = read_u32(reader)?;
            frames.keyframes.push(raw & FRAME_SIZE_KEYFRAME != 0);
            frames.sizes.push(raw & !FRAME_SIZE_FLAG_MASK);
        }
        for _ in 0..total {
            frames.types.push(read_u8(reader)?);
        }

        let tree_chunk = read_chunk(reader, tree_size as usize)?;

        debug!(
            "SMK{} {}x{}, {} frames{}, {:.2} fps, tree chunk {} bytes",
            version.as_byte() as char,
            width,
            height,
            frame_count,
            if has_ring_frame { " + ring" } else { "" },
            fps,
            tree_size
        );

        Ok(Self {
            info,
            frames,
            tree_chunk,
        })
    }
}
