//! Decoder handle and frame cursor
//!
//! [`Smacker`] owns the parsed container and the decode buffers. Moving the
//! cursor with [`first`](Smacker::first), [`next`](Smacker::next) or one of
//! the seek calls renders the frame it lands on; the palette, video and
//! audio accessors then expose that frame until the cursor moves again.

use crate::common::{AudioTrackInfo, FrameStatus, OpenMode, SmackerInfo, NUM_AUDIO_TRACKS};
use crate::container::Container;
use crate::render::{render_frame, DecodeState, Features, FrameContext, RenderFault};
use crate::{Result, SmackerError};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// An open Smacker file
#[derive(Debug)]
pub struct Smacker {
    container: Container,
    features: Features,
    state: DecodeState,
    cur_frame: usize,
}

impl Smacker {
    /// Open a file from disk
    ///
    /// In [`OpenMode::Disk`] the file stays open and frame chunks are read
    /// as they are rendered.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening {} ({:?} mode)", path.display(), mode);
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), mode)
    }

    /// Open a file held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::with_container(Container::from_bytes(data)?))
    }

    /// Open from any seekable reader
    pub fn from_reader<R: Read + Seek + 'static>(reader: R, mode: OpenMode) -> Result<Self> {
        Ok(Self::with_container(Container::from_reader(reader, mode)?))
    }

    fn with_container(container: Container) -> Self {
        Self {
            container,
            features: Features::default(),
            state: DecodeState::default(),
            cur_frame: 0,
        }
    }

    /// Close the file, releasing every buffer and the backing reader
    pub fn close(self) {}

    /// File metadata
    pub fn info(&self) -> &SmackerInfo {
        &self.container.info
    }

    /// Descriptor of audio track `track`
    pub fn audio_track(&self, track: usize) -> Result<&AudioTrackInfo> {
        self.container
            .info
            .audio
            .get(track)
            .ok_or(SmackerError::InvalidTrack(track))
    }

    /// Bit i set when audio track i exists
    pub fn audio_tracks_mask(&self) -> u8 {
        self.container.info.audio_tracks_mask()
    }

    /// Number of frames, ring frame included
    pub fn total_frames(&self) -> usize {
        self.container.frames.len()
    }

    fn check_frame(&self, frame: usize) -> Result<()> {
        let count = self.total_frames();
        if frame >= count {
            return Err(SmackerError::FrameOutOfRange { frame, count });
        }
        Ok(())
    }

    /// Whether `frame` decodes without the previous video buffer
    pub fn is_keyframe(&self, frame: usize) -> Result<bool> {
        self.check_frame(frame)?;
        Ok(self.container.frames.is_keyframe(frame))
    }

    /// Type mask of `frame` (bit 0 palette, bit 1+i audio track i)
    pub fn frame_type(&self, frame: usize) -> Result<u8> {
        self.check_frame(frame)?;
        Ok(self.container.frames.type_mask(frame))
    }

    /// Turn palette decoding on or off
    pub fn enable_palette(&mut self, enable: bool) {
        self.features.palette = enable;
    }

    /// Turn video decoding on or off
    pub fn enable_video(&mut self, enable: bool) {
        self.features.video = enable;
    }

    /// Turn decoding of one audio track on or off
    pub fn enable_audio(&mut self, track: usize, enable: bool) -> Result<()> {
        let slot = self
            .features
            .audio
            .get_mut(track)
            .ok_or(SmackerError::InvalidTrack(track))?;
        *slot = enable;
        Ok(())
    }

    /// Enable or disable every sub-stream at once
    pub fn enable_all(&mut self, enable: bool) {
        self.features = Features {
            palette: enable,
            video: enable,
            audio: [enable; NUM_AUDIO_TRACKS],
        };
    }

    /// Current palette, 256 RGB triples
    pub fn palette(&self) -> Option<&[u8]> {
        self.state.palette.as_deref()
    }

    /// Current video frame, `width * height` palette indices
    pub fn video(&self) -> Option<&[u8]> {
        self.state.video.as_deref()
    }

    /// PCM bytes decoded for `track` in the current frame
    pub fn audio(&self, track: usize) -> Option<&[u8]> {
        self.state.audio.get(track)?.as_deref()
    }

    /// Length of [`audio`](Self::audio) for `track`, zero when there is none
    pub fn audio_size(&self, track: usize) -> usize {
        self.audio(track).map_or(0, <[u8]>::len)
    }

    /// Index of the frame last rendered (or about to be)
    pub fn current_frame(&self) -> usize {
        self.cur_frame
    }

    /// Faults met while rendering the current frame
    ///
    /// A non-empty list means one or more buffers hold a partial result.
    pub fn render_faults(&self) -> &[RenderFault] {
        &self.state.faults
    }

    fn render(&mut self) -> Result<()> {
        let frame = self.cur_frame;
        let frame_type = self.container.frames.type_mask(frame);
        let chunk = self.container.source.chunk(frame)?;
        let ctx = FrameContext {
            info: &self.container.info,
            trees: &mut self.container.trees,
            features: &self.features,
        };
        render_frame(frame, chunk, frame_type, ctx, &mut self.state);
        Ok(())
    }

    fn status(&self) -> FrameStatus {
        if self.cur_frame + 1 == self.total_frames() {
            FrameStatus::Last
        } else {
            FrameStatus::More
        }
    }

    /// Render frame 0
    pub fn first(&mut self) -> Result<FrameStatus> {
        self.cur_frame = 0;
        self.render()?;
        Ok(self.status())
    }

    /// Advance one frame and render it
    ///
    /// At the last frame, files with a ring frame continue at frame 1;
    /// others return [`FrameStatus::Done`] without moving.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<FrameStatus> {
        let total = self.total_frames();
        if self.cur_frame + 1 < total {
            self.cur_frame += 1;
        } else if self.container.info.has_ring_frame && total > 1 {
            self.cur_frame = 1;
        } else {
            return Ok(FrameStatus::Done);
        }

        self.render()?;
        Ok(self.status())
    }

    /// Render the nearest keyframe at or before `frame`
    ///
    /// Returns the index actually rendered.
    pub fn seek_keyframe(&mut self, frame: usize) -> Result<usize> {
        self.check_frame(frame)?;

        let mut target = frame;
        while target > 0 && !self.container.frames.is_keyframe(target) {
            target -= 1;
        }
        debug!("seek to frame {} lands on keyframe {}", frame, target);

        self.cur_frame = target;
        self.render()?;
        Ok(target)
    }

    /// Render exactly `frame`, decoding forward from the preceding keyframe
    pub fn seek_exact(&mut self, frame: usize) -> Result<FrameStatus> {
        self.seek_keyframe(frame)?;
        let mut status = self.status();
        while self.cur_frame < frame {
            status = self.next()?;
        }
        Ok(status)
    }
}
