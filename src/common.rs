//! Common types and constants for the Smacker container format
//!
//! This module defines the error type, the immutable per-file metadata
//! structures and the fixed tables that are constants of the format.

use thiserror::Error;

/// File signature preceding the version byte
pub const SMK_SIGNATURE: &[u8; 3] = b"SMK";

/// Number of audio tracks a Smacker file can describe
pub const NUM_AUDIO_TRACKS: usize = 7;

/// Size of a decoded palette (256 RGB entries)
pub const PALETTE_SIZE: usize = 768;

/// Largest frame area accepted at open, in pixels
pub const MAX_FRAME_PIXELS: usize = 1 << 24;

/// Largest decoded length accepted for one compressed audio record
pub const MAX_AUDIO_RECORD: usize = 1 << 22;

/// Number of entries in a palette
pub const PALETTE_ENTRIES: usize = 256;

/// Header flag: file carries a trailing ring frame
pub const FLAG_RING_FRAME: u32 = 0x01;

/// Header flag: rows are doubled on display
pub const FLAG_Y_DOUBLE: u32 = 0x02;

/// Header flag: rows are interlaced on display
pub const FLAG_Y_INTERLACE: u32 = 0x04;

/// Frame-size table: keyframe bit
pub const FRAME_SIZE_KEYFRAME: u32 = 0x01;

/// Frame-size table: bits that are flags, not length
pub const FRAME_SIZE_FLAG_MASK: u32 = 0x03;

/// Frame type: palette record present
pub const FRAME_TYPE_PALETTE: u8 = 0x01;

/// Audio descriptor: track data is DPCM compressed
pub const AUDIO_FLAG_COMPRESSED: u32 = 1 << 31;

/// Audio descriptor: track exists
pub const AUDIO_FLAG_EXISTS: u32 = 1 << 30;

/// Audio descriptor: samples are 16 bits wide
pub const AUDIO_FLAG_16BIT: u32 = 1 << 29;

/// Audio descriptor: track is stereo
pub const AUDIO_FLAG_STEREO: u32 = 1 << 28;

/// Audio descriptor: Bink perceptual codec variant
pub const AUDIO_FLAG_BINK: u32 = 0x03 << 26;

/// Audio descriptor: sample rate field
pub const AUDIO_RATE_MASK: u32 = 0x00FF_FFFF;

/// 6-bit to 8-bit intensity ramp used by literal palette entries
pub const PALETTE_RAMP: [u8; 64] = [
    0x00, 0x04, 0x08, 0x0C, 0x10, 0x14, 0x18, 0x1C, //
    0x20, 0x24, 0x28, 0x2C, 0x30, 0x34, 0x38, 0x3C, //
    0x41, 0x45, 0x49, 0x4D, 0x51, 0x55, 0x59, 0x5D, //
    0x61, 0x65, 0x69, 0x6D, 0x71, 0x75, 0x79, 0x7D, //
    0x82, 0x86, 0x8A, 0x8E, 0x92, 0x96, 0x9A, 0x9E, //
    0xA2, 0xA6, 0xAA, 0xAE, 0xB2, 0xB6, 0xBA, 0xBE, //
    0xC3, 0xC7, 0xCB, 0xCF, 0xD3, 0xD7, 0xDB, 0xDF, //
    0xE3, 0xE7, 0xEB, 0xEF, 0xF3, 0xF7, 0xFB, 0xFF,
];

/// Number of consecutive blocks a TYPE code applies to
pub const BLOCK_RUNS: [usize; 64] = [
    1, 2, 3, 4, 5, 6, 7, 8, //
    9, 10, 11, 12, 13, 14, 15, 16, //
    17, 18, 19, 20, 21, 22, 23, 24, //
    25, 26, 27, 28, 29, 30, 31, 32, //
    33, 34, 35, 36, 37, 38, 39, 40, //
    41, 42, 43, 44, 45, 46, 47, 48, //
    49, 50, 51, 52, 53, 54, 55, 56, //
    57, 58, 59, 128, 256, 512, 1024, 2048,
];

/// Error type for Smacker operations
#[derive(Debug, Error)]
pub enum SmackerError {
    /// I/O error (short read, failed seek, missing file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bit or byte was requested past the end of a bitstream
    #[error("Bitstream exhausted")]
    BitstreamExhausted,

    /// File does not start with "SMK"
    #[error("Invalid signature (expected \"SMK\")")]
    InvalidSignature,

    /// Version byte is not '2' or '4'
    #[error("Unsupported Smacker version: {0:#04x} (expected '2' or '4')")]
    UnsupportedVersion(u8),

    /// Huffman tree terminator bit was set
    #[error("Malformed Huffman tree terminator")]
    MalformedTree,

    /// Lookup into a tree the file declared absent
    #[error("Lookup into an absent Huffman tree")]
    AbsentTree,

    /// Bytes remain after the last frame chunk
    #[error("Trailing data after last frame: {0} bytes")]
    TrailingData(u64),

    /// Structurally invalid header field
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid data inside a frame chunk
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Audio track uses the Bink perceptual codec
    #[error("Audio track {track} uses the Bink audio codec, which is unsupported")]
    UnsupportedAudioCodec {
        /// Offending track index
        track: usize,
    },

    /// DPCM chunk header disagrees with the track descriptor
    #[error("Audio layout mismatch: {0}")]
    AudioMismatch(String),

    /// Track index outside 0..7
    #[error("Invalid audio track: {0} (expected 0-6)")]
    InvalidTrack(usize),

    /// Frame index outside the frame table
    #[error("Frame {frame} out of range ({count} frames)")]
    FrameOutOfRange {
        /// Requested frame
        frame: usize,
        /// Number of rows in the frame table
        count: usize,
    },
}

impl SmackerError {
    /// True for I/O failures
    pub fn is_io_error(&self) -> bool {
        matches!(self, SmackerError::Io(_))
    }

    /// True for errors caused by malformed file contents
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            SmackerError::BitstreamExhausted
                | SmackerError::InvalidSignature
                | SmackerError::UnsupportedVersion(_)
                | SmackerError::MalformedTree
                | SmackerError::AbsentTree
                | SmackerError::TrailingData(_)
                | SmackerError::InvalidHeader(_)
                | SmackerError::InvalidData(_)
                | SmackerError::AudioMismatch(_)
        )
    }
}

/// Result type alias for Smacker operations
pub type Result<T> = std::result::Result<T, SmackerError>;

/// Format revision from the fourth signature byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// "SMK2"
    V2,
    /// "SMK4", adds DOUBLE and HALF full-block variants
    V4,
}

impl FormatVersion {
    /// Create a FormatVersion from the raw version byte
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            b'2' => Ok(FormatVersion::V2),
            b'4' => Ok(FormatVersion::V4),
            _ => Err(SmackerError::UnsupportedVersion(value)),
        }
    }

    /// The raw version byte
    pub fn as_byte(&self) -> u8 {
        match self {
            FormatVersion::V2 => b'2',
            FormatVersion::V4 => b'4',
        }
    }
}

/// Vertical display scaling requested by the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YScaleMode {
    /// Rows are shown as decoded
    #[default]
    None,
    /// Each row is shown twice
    Double,
    /// Each row is followed by a blank row
    Interlace,
}

impl YScaleMode {
    /// Derive the scale mode from header flags; interlace wins over double
    pub fn from_flags(flags: u32) -> Self {
        if flags & FLAG_Y_INTERLACE != 0 {
            YScaleMode::Interlace
        } else if flags & FLAG_Y_DOUBLE != 0 {
            YScaleMode::Double
        } else {
            YScaleMode::None
        }
    }
}

/// How frame chunks are held after open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Every chunk is read into memory at open time
    #[default]
    Memory,
    /// Chunks are read from the backing file when a frame is rendered
    Disk,
}

/// Result of a cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// No frame was rendered; the cursor is at the end
    Done,
    /// A frame was rendered and more follow
    More,
    /// The final frame was rendered
    Last,
}

/// Descriptor for one audio track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioTrackInfo {
    /// Track is present in the file
    pub exists: bool,
    /// Track data is Huffman-coded DPCM
    pub compressed: bool,
    /// 1 or 2
    pub channels: u8,
    /// 8 or 16
    pub bit_depth: u8,
    /// Samples per second
    pub sample_rate: u32,
}

impl AudioTrackInfo {
    /// Parse a track descriptor word
    pub fn from_descriptor(track: usize, value: u32) -> Result<Self> {
        if value & AUDIO_FLAG_BINK != 0 {
            return Err(SmackerError::UnsupportedAudioCodec { track });
        }

        Ok(Self {
            exists: value & AUDIO_FLAG_EXISTS != 0,
            compressed: value & AUDIO_FLAG_COMPRESSED != 0,
            channels: if value & AUDIO_FLAG_STEREO != 0 { 2 } else { 1 },
            bit_depth: if value & AUDIO_FLAG_16BIT != 0 { 16 } else { 8 },
            sample_rate: value & AUDIO_RATE_MASK,
        })
    }

    /// Bytes per interleaved sample frame
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * (self.bit_depth as usize / 8)
    }
}

/// Immutable per-file metadata
#[derive(Debug, Clone)]
pub struct SmackerInfo {
    /// Format revision
    pub version: FormatVersion,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame count from the header, ring frame excluded
    pub frame_count: u32,
    /// A ring frame follows the last frame
    pub has_ring_frame: bool,
    /// Frames per second
    pub fps: f32,
    /// Display time of one frame in microseconds
    pub frame_duration_us: u64,
    /// Raw header flags
    pub flags: u32,
    /// Display scaling
    pub y_scale: YScaleMode,
    /// Size of the Huffman tree chunk
    pub tree_size: u32,
    /// Largest decoded audio chunk per track, informational
    pub audio_max_buffer: [u32; NUM_AUDIO_TRACKS],
    /// Allocation hints for the MMAP, MCLR, FULL and TYPE trees
    pub tree_unpacked_sizes: [u32; 4],
    /// Audio track descriptors
    pub audio: [AudioTrackInfo; NUM_AUDIO_TRACKS],
}

impl SmackerInfo {
    /// Number of rows in the frame table, ring frame included
    pub fn total_frames(&self) -> usize {
        self.frame_count as usize + usize::from(self.has_ring_frame)
    }

    /// Number of pixels in one frame
    pub fn frame_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bit i set when audio track i exists
    pub fn audio_tracks_mask(&self) -> u8 {
        self.audio
            .iter()
            .enumerate()
            .filter(|(_, track)| track.exists)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }
}

/// Frame rate and frame duration from the signed header field
///
/// Positive values are milliseconds per frame, negative values are
/// tens of microseconds per frame, zero means 10 fps.
pub fn frame_rate(raw: i32) -> (f32, u64) {
    if raw > 0 {
        (1000.0 / raw as f32, raw as u64 * 1000)
    } else if raw < 0 {
        let units = (raw as i64).unsigned_abs();
        (100_000.0 / units as f32, units * 10)
    } else {
        (10.0, 100_000)
    }
}
