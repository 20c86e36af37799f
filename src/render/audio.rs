//! Audio record decompression
//!
//! Raw tracks carry PCM bytes verbatim. Compressed tracks are DPCM: a
//! 32-bit decoded length, then a bitstream holding one [`SmallTree`] per
//! channel and sample byte, the initial sample of each channel and a
//! Huffman-coded delta per sample.

use crate::bitstream::BitReader;
use crate::common::{AudioTrackInfo, MAX_AUDIO_RECORD};
use crate::huffman::SmallTree;
use crate::{Result, SmackerError};
use log::warn;

/// Upper bound on speculative preallocation driven by the decoded length
const MAX_PREALLOC: usize = 1 << 16;

/// Decode one audio record body (the bytes after its length prefix)
///
/// Samples are appended to `out`, so a failure part way through leaves the
/// samples decoded so far in place. Layout disagreements between the record
/// and the track descriptor are reported through `faults` and decoding
/// continues with the layout the record declares.
pub fn decode(
    body: &[u8],
    track: &AudioTrackInfo,
    out: &mut Vec<u8>,
    faults: &mut Vec<SmackerError>,
) -> Result<()> {
    if !track.compressed {
        out.extend_from_slice(body);
        return Ok(());
    }

    let header = body.get(..4).ok_or_else(|| {
        SmackerError::InvalidData("compressed audio record shorter than its header".to_string())
    })?;
    let target = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if target > MAX_AUDIO_RECORD {
        return Err(SmackerError::InvalidData(format!(
            "compressed audio record decodes to {} bytes, limit is {}",
            target, MAX_AUDIO_RECORD
        )));
    }

    let mut br = BitReader::new(&body[4..]);
    if !br.read_bit()? {
        return Err(SmackerError::InvalidData(
            "compressed audio record without data".to_string(),
        ));
    }

    let channels: usize = if br.read_bit()? { 2 } else { 1 };
    let wide = br.read_bit()?;
    let bit_depth = if wide { 16 } else { 8 };
    if channels != track.channels as usize || bit_depth != track.bit_depth {
        let msg = format!(
            "record is {} channel(s) {}-bit, track declares {} channel(s) {}-bit",
            channels, bit_depth, track.channels, track.bit_depth
        );
        warn!("audio layout mismatch: {}", msg);
        faults.push(SmackerError::AudioMismatch(msg));
    }

    let bytes_per_sample = if wide { 2 } else { 1 };
    let trees = (0..channels * bytes_per_sample)
        .map(|_| SmallTree::build(&mut br))
        .collect::<Result<Vec<_>>>()?;

    out.reserve(target.min(MAX_PREALLOC));

    // initial samples are stored last channel first, high byte first
    let mut samples = [0u16; 2];
    for ch in (0..channels).rev() {
        samples[ch] = if wide {
            let hi = br.read_byte()? as u16;
            let lo = br.read_byte()? as u16;
            (hi << 8) | lo
        } else {
            br.read_byte()? as u16
        };
    }
    for &sample in &samples[..channels] {
        push_sample(out, sample, wide);
    }

    while out.len() < target {
        for ch in 0..channels {
            let sample = if wide {
                let lo = trees[ch * 2].lookup(&mut br)? as u16;
                let hi = trees[ch * 2 + 1].lookup(&mut br)? as u16;
                samples[ch].wrapping_add((hi << 8) | lo)
            } else {
                let delta = trees[ch].lookup(&mut br)?;
                (samples[ch] as u8).wrapping_add(delta) as u16
            };
            samples[ch] = sample;
            push_sample(out, sample, wide);
        }
    }

    out.truncate(target);
    Ok(())
}

fn push_sample(out: &mut Vec<u8>, sample: u16, wide: bool) {
    if wide {
        out.extend_from_slice(&sample.to_le_bytes());
    } else {
        out.push(sample as u8);
    }
}
