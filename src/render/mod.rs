//! Per-frame rendering
//!
//! A frame chunk holds an optional palette record, one length-prefixed
//! record per audio track flagged in the frame type, then the video
//! bitstream. [`render_frame`] walks those records in order and updates the
//! [`DecodeState`] buffers.
//!
//! Problems inside one sub-stream do not stop the others: they are logged,
//! collected as [`RenderFault`]s and the affected buffer keeps whatever was
//! decoded before the fault.

pub mod audio;
pub mod palette;
pub mod video;

use crate::common::{SmackerInfo, FRAME_TYPE_PALETTE, NUM_AUDIO_TRACKS};
use crate::container::VideoTrees;
use crate::SmackerError;
use log::{trace, warn};
use std::fmt;

/// Sub-stream of a frame chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Palette record
    Palette,
    /// Audio record of a track
    Audio(usize),
    /// Video bitstream
    Video,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Palette => write!(f, "palette"),
            Stream::Audio(track) => write!(f, "audio track {}", track),
            Stream::Video => write!(f, "video"),
        }
    }
}

/// A recoverable problem met while rendering one frame
#[derive(Debug)]
pub struct RenderFault {
    /// Frame being rendered
    pub frame: usize,
    /// Affected sub-stream
    pub stream: Stream,
    /// What went wrong
    pub error: SmackerError,
}

impl fmt::Display for RenderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {}, {}: {}", self.frame, self.stream, self.error)
    }
}

/// Which sub-streams are decoded; everything is on by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Decode palette records
    pub palette: bool,
    /// Decode video bitstreams
    pub video: bool,
    /// Decode audio records, per track
    pub audio: [bool; NUM_AUDIO_TRACKS],
}

impl Default for Features {
    fn default() -> Self {
        Self {
            palette: true,
            video: true,
            audio: [true; NUM_AUDIO_TRACKS],
        }
    }
}

/// Buffers produced by rendering
///
/// Buffers are created by the first render that touches them.
#[derive(Debug, Default)]
pub struct DecodeState {
    /// 256 RGB entries
    pub palette: Option<Vec<u8>>,
    /// `width * height` palette indices
    pub video: Option<Vec<u8>>,
    /// Decoded PCM bytes per track
    pub audio: [Option<Vec<u8>>; NUM_AUDIO_TRACKS],
    /// Faults from the most recent render
    pub faults: Vec<RenderFault>,
}

/// Everything [`render_frame`] needs besides the chunk itself
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// File metadata
    pub info: &'a SmackerInfo,
    /// Video trees, caches reset by the video decoder
    pub trees: &'a mut VideoTrees,
    /// Enabled sub-streams
    pub features: &'a Features,
}

fn record_faults(
    faults: &mut Vec<RenderFault>,
    frame: usize,
    stream: Stream,
    errors: Vec<SmackerError>,
) {
    faults.extend(errors.into_iter().map(|error| RenderFault {
        frame,
        stream,
        error,
    }));
}

fn fault(faults: &mut Vec<RenderFault>, frame: usize, stream: Stream, error: SmackerError) {
    warn!("frame {}, {}: {}", frame, stream, error);
    faults.push(RenderFault {
        frame,
        stream,
        error,
    });
}

/// Render one frame chunk into `state`
///
/// `frame_type` is the frame's type mask. Faults replace the contents of
/// `state.faults`.
pub fn render_frame(
    frame: usize,
    chunk: &[u8],
    frame_type: u8,
    ctx: FrameContext<'_>,
    state: &mut DecodeState,
) {
    trace!(
        "rendering frame {} ({} bytes, type {:#04x})",
        frame,
        chunk.len(),
        frame_type
    );

    let info = ctx.info;
    let features = ctx.features;
    state.faults.clear();

    for (track, buffer) in state.audio.iter_mut().enumerate() {
        if info.audio[track].exists && features.audio[track] {
            buffer.get_or_insert_with(Vec::new).clear();
        }
    }

    let mut pos = 0;

    if frame_type & FRAME_TYPE_PALETTE != 0 {
        let len = chunk.first().map_or(0, |&b| b as usize * 4);
        if len == 0 || len > chunk.len() {
            fault(
                &mut state.faults,
                frame,
                Stream::Palette,
                SmackerError::InvalidData(format!(
                    "palette record of {} bytes in a {} byte chunk",
                    len,
                    chunk.len()
                )),
            );
            return;
        }

        if features.palette {
            let mut errors = Vec::new();
            let palette = palette::decode(&chunk[1..len], state.palette.as_deref(), &mut errors);
            record_faults(&mut state.faults, frame, Stream::Palette, errors);
            state.palette = Some(palette);
        }
        pos = len;
    }

    for track in 0..NUM_AUDIO_TRACKS {
        if frame_type & (0x02 << track) == 0 {
            continue;
        }

        let len = chunk
            .get(pos..pos + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize);
        let len = match len {
            Some(len) if len >= 4 && len <= chunk.len() - pos => len,
            _ => {
                fault(
                    &mut state.faults,
                    frame,
                    Stream::Audio(track),
                    SmackerError::InvalidData(format!(
                        "audio record length {:?} at offset {} overruns the chunk",
                        len, pos
                    )),
                );
                return;
            }
        };

        let descriptor = &info.audio[track];
        if descriptor.exists && features.audio[track] {
            let buffer = state.audio[track].get_or_insert_with(Vec::new);
            let mut errors = Vec::new();
            let result = audio::decode(&chunk[pos + 4..pos + len], descriptor, buffer, &mut errors);
            record_faults(&mut state.faults, frame, Stream::Audio(track), errors);
            if let Err(error) = result {
                fault(&mut state.faults, frame, Stream::Audio(track), error);
            }
        }
        pos += len;
    }

    if features.video {
        let pixels = info.frame_pixels();
        let mut buffer = state
            .video
            .take()
            .filter(|buffer| buffer.len() == pixels)
            .unwrap_or_else(|| vec![0u8; pixels]);

        let result = video::decode(
            &chunk[pos..],
            info.version,
            info.width as usize,
            info.height as usize,
            ctx.trees,
            &mut buffer,
        );
        state.video = Some(buffer);
        if let Err(error) = result {
            fault(&mut state.faults, frame, Stream::Video, error);
        }
    }
}
