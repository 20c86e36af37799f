//! Palette record decompression
//!
//! A palette record rebuilds all 256 entries from three commands: copy a
//! run from the previous palette at the running source index (`0x80`),
//! copy a run from an explicit source index (`0x40`), or a literal RGB
//! triple of 6-bit components.

use crate::common::{PALETTE_ENTRIES, PALETTE_RAMP, PALETTE_SIZE};
use crate::SmackerError;
use log::warn;

/// Record command: copy from the running source index
const CMD_COPY_RUN: u8 = 0x80;

/// Record command: copy from an explicit source index
const CMD_COPY_FROM: u8 = 0x40;

/// Copy `count` entries from `previous[src..]` into `palette[dst..]`
///
/// Out-of-range runs zero-fill what fits and report a fault; without a
/// previous palette the run is zero-filled.
fn copy_run(
    palette: &mut [u8],
    previous: Option<&[u8]>,
    dst: usize,
    src: usize,
    count: usize,
    faults: &mut Vec<SmackerError>,
) {
    let fits = dst + count <= PALETTE_ENTRIES && src + count <= PALETTE_ENTRIES;
    let end = (dst + count).min(PALETTE_ENTRIES);
    let target = &mut palette[dst * 3..end * 3];

    match previous {
        Some(prev) if fits => target.copy_from_slice(&prev[src * 3..(src + count) * 3]),
        _ => target.fill(0),
    }

    if !fits {
        warn!(
            "palette copy overflow: {} entries from {} to {}",
            count, src, dst
        );
        faults.push(SmackerError::InvalidData(format!(
            "palette copy of {} entries from {} to {} overflows",
            count, src, dst
        )));
    }
}

/// Decode a palette record body (the bytes after the length byte)
///
/// Returns the new 768-byte palette. Recoverable problems are appended to
/// `faults`; entries that could not be decoded are zero.
pub fn decode(body: &[u8], previous: Option<&[u8]>, faults: &mut Vec<SmackerError>) -> Vec<u8> {
    let previous = previous.filter(|prev| prev.len() >= PALETTE_SIZE);
    let mut palette = vec![0u8; PALETTE_SIZE];
    let mut pos = 0;
    let mut dst = 0;
    let mut src = 0;

    while dst < PALETTE_ENTRIES && pos < body.len() {
        let cmd = body[pos];

        if cmd & CMD_COPY_RUN != 0 {
            let count = (cmd & 0x7F) as usize + 1;
            copy_run(&mut palette, previous, dst, src, count, faults);
            dst += count;
            src += count;
            pos += 1;
        } else if cmd & CMD_COPY_FROM != 0 {
            let count = (cmd & 0x3F) as usize + 1;
            let Some(&from) = body.get(pos + 1) else {
                faults.push(SmackerError::InvalidData(
                    "palette copy command missing its source index".to_string(),
                ));
                break;
            };
            src = from as usize;
            copy_run(&mut palette, previous, dst, src, count, faults);
            dst += count;
            pos += 2;
        } else {
            let Some(rgb) = body.get(pos..pos + 3) else {
                faults.push(SmackerError::InvalidData(
                    "palette literal entry truncated".to_string(),
                ));
                break;
            };
            for (out, &component) in palette[dst * 3..dst * 3 + 3].iter_mut().zip(rgb) {
                *out = PALETTE_RAMP[(component & 0x3F) as usize];
            }
            dst += 1;
            pos += 3;
        }
    }

    palette
}
