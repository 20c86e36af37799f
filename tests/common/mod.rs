//! Shared helpers for crafting Smacker files in integration tests

#![allow(dead_code)]

use std::collections::HashMap;

// the bit writer and tree encoders are shared with the unit tests
#[path = "../../src/test_support.rs"]
mod bits;

pub(crate) use bits::{encode_absent_tree, encode_big_tree, encode_small_tree, BitWriter};

/// TYPE code for a run of blocks
pub fn type_code(kind: u16, run_index: u16, color: u8) -> u16 {
    kind | (run_index << 2) | ((color as u16) << 8)
}

/// Block type numbers as stored in TYPE codes
pub const MONO: u16 = 0;
pub const FULL: u16 = 1;
pub const VOID: u16 = 2;
pub const SOLID: u16 = 3;

/// Video trees for tests that only use SOLID and VOID blocks
///
/// Returns the tree chunk and the codes of the TYPE tree.
pub fn solid_void_trees(type_values: &[u16]) -> (Vec<u8>, HashMap<u16, Vec<bool>>) {
    let mut bw = BitWriter::new();
    encode_absent_tree(&mut bw);
    encode_absent_tree(&mut bw);
    encode_absent_tree(&mut bw);
    let codes = encode_big_tree(&mut bw, type_values, [0xFFF0, 0xFFF1, 0xFFF2]);
    (bw.finish(), codes)
}

/// Palette record (length byte, body, padding to a multiple of four)
///
/// The body must define all 256 entries so the padding is never decoded.
pub fn palette_record(body: &[u8]) -> Vec<u8> {
    let len = (body.len() + 1).div_ceil(4) * 4;
    let mut record = vec![(len / 4) as u8];
    record.extend_from_slice(body);
    record.resize(len, 0);
    record
}

/// Audio record (u32 total length, payload)
pub fn audio_record(payload: &[u8]) -> Vec<u8> {
    let mut record = ((payload.len() + 4) as u32).to_le_bytes().to_vec();
    record.extend_from_slice(payload);
    record
}

#[derive(Debug, Clone)]
struct Frame {
    keyframe: bool,
    type_mask: u8,
    chunk: Vec<u8>,
}

/// Builds a complete Smacker file image
#[derive(Debug, Clone)]
pub struct SmkBuilder {
    version: u8,
    width: u32,
    height: u32,
    rate: i32,
    flags: u32,
    audio: [u32; 7],
    trees: Vec<u8>,
    frames: Vec<Frame>,
}

impl SmkBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            version: b'2',
            width,
            height,
            rate: 100,
            flags: 0,
            audio: [0; 7],
            trees: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn rate(mut self, rate: i32) -> Self {
        self.rate = rate;
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// The last frame added becomes the ring frame
    pub fn ring(mut self) -> Self {
        self.flags |= 0x01;
        self
    }

    pub fn audio_track(mut self, track: usize, descriptor: u32) -> Self {
        self.audio[track] = descriptor;
        self
    }

    pub fn trees(mut self, chunk: Vec<u8>) -> Self {
        self.trees = chunk;
        self
    }

    /// Add a frame; the chunk is zero padded to a multiple of four
    pub fn frame(mut self, keyframe: bool, type_mask: u8, chunk: Vec<u8>) -> Self {
        let mut chunk = chunk;
        chunk.resize(chunk.len().div_ceil(4) * 4, 0);
        self.frames.push(Frame {
            keyframe,
            type_mask,
            chunk,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let ring = self.flags & 0x01;
        let frame_count = self.frames.len() as u32 - ring;

        let mut out = Vec::new();
        out.extend_from_slice(b"SMK");
        out.push(self.version);
        for v in [self.width, self.height, frame_count, self.rate as u32, self.flags] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for _ in 0..7 {
            out.extend_from_slice(&0u32.to_le_bytes());
        }
        out.extend_from_slice(&(self.trees.len() as u32).to_le_bytes());
        for _ in 0..4 {
            out.extend_from_slice(&0u32.to_le_bytes());
        }
        for descriptor in self.audio {
            out.extend_from_slice(&descriptor.to_le_bytes());
        }
        out.extend_from_slice(&0u32.to_le_bytes());

        for frame in &self.frames {
            let size = frame.chunk.len() as u32 | u32::from(frame.keyframe);
            out.extend_from_slice(&size.to_le_bytes());
        }
        for frame in &self.frames {
            out.push(frame.type_mask);
        }
        out.extend_from_slice(&self.trees);
        for frame in &self.frames {
            out.extend_from_slice(&frame.chunk);
        }
        out
    }
}
