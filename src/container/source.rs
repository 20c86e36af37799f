//! Frame chunk storage strategies
//!
//! [`MemorySource`] reads every chunk at open time; [`DiskSource`] records
//! file offsets and performs a blocking seek + read whenever a frame is
//! rendered.

use super::header::{read_chunk, FrameTable};
use crate::{Result, SmackerError};
use log::debug;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// Fetches the raw chunk bytes of a frame
pub trait ChunkSource: fmt::Debug {
    /// Raw chunk of `frame`; valid until the next call
    fn chunk(&mut self, frame: usize) -> Result<&[u8]>;
}

/// Count bytes left in `reader`; any at all is a structural error
fn ensure_consumed<R: Read>(reader: &mut R) -> Result<()> {
    let residual = io::copy(reader, &mut io::sink())?;
    if residual != 0 {
        return Err(SmackerError::TrailingData(residual));
    }
    Ok(())
}

/// All chunks held in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: Vec<Vec<u8>>,
}

impl MemorySource {
    /// Read every frame chunk, then verify the input is exhausted
    pub fn load<R: Read>(reader: &mut R, frames: &FrameTable) -> Result<Self> {
        let chunks = frames
            .chunk_sizes()
            .iter()
            .map(|&size| read_chunk(reader, size as usize))
            .collect::<Result<Vec<_>>>()?;
        ensure_consumed(reader)?;

        debug!("loaded {} frame chunks into memory", chunks.len());
        Ok(Self { chunks })
    }
}

impl ChunkSource for MemorySource {
    fn chunk(&mut self, frame: usize) -> Result<&[u8]> {
        let count = self.chunks.len();
        self.chunks
            .get(frame)
            .map(Vec::as_slice)
            .ok_or(SmackerError::FrameOutOfRange { frame, count })
    }
}

/// Chunks read lazily from a seekable backing store
pub struct DiskSource<R> {
    reader: R,
    offsets: Vec<u64>,
    sizes: Vec<u32>,
    scratch: Vec<u8>,
}

impl<R: Read + Seek> DiskSource<R> {
    /// Record the offset of every chunk and verify the file holds them all
    pub fn index(mut reader: R, frames: &FrameTable) -> Result<Self> {
        let mut offset = reader.stream_position()?;
        let mut offsets = Vec::with_capacity(frames.len());
        for &size in frames.chunk_sizes() {
            offsets.push(offset);
            offset += size as u64;
        }

        let end = reader.seek(SeekFrom::End(0))?;
        if end < offset {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file ends at {} but frame chunks end at {}", end, offset),
            )
            .into());
        }
        if end > offset {
            return Err(SmackerError::TrailingData(end - offset));
        }

        debug!("indexed {} frame chunks on disk", offsets.len());
        Ok(Self {
            reader,
            offsets,
            sizes: frames.chunk_sizes().to_vec(),
            scratch: Vec::new(),
        })
    }
}

impl<R: Read + Seek> ChunkSource for DiskSource<R> {
    fn chunk(&mut self, frame: usize) -> Result<&[u8]> {
        let count = self.offsets.len();
        let (offset, size) = match (self.offsets.get(frame), self.sizes.get(frame)) {
            (Some(&offset), Some(&size)) => (offset, size as usize),
            _ => return Err(SmackerError::FrameOutOfRange { frame, count }),
        };

        self.reader.seek(SeekFrom::Start(offset))?;
        self.scratch.resize(size, 0);
        self.reader.read_exact(&mut self.scratch)?;
        Ok(&self.scratch)
    }
}

impl<R> fmt::Debug for DiskSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskSource")
            .field("frames", &self.offsets.len())
            .field("scratch_len", &self.scratch.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::header::Layout;
    use super::*;
    use std::io::Cursor;

    fn table(sizes: &[u32]) -> FrameTable {
        // minimal SMK2 header carrying the given frame sizes
        let mut out = Vec::new();
        out.extend_from_slice(b"SMK2");
        for v in [4u32, 4, sizes.len() as u32, 100, 0] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; 4 * (7 + 5 + 7 + 1)]);
        for s in sizes {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out.extend(std::iter::repeat(0u8).take(sizes.len()));
        Layout::read(&mut Cursor::new(out)).unwrap().frames
    }

    #[test]
    fn test_memory_source() {
        let frames = table(&[4, 8]);
        let data: Vec<u8> = (0..12).collect();
        let mut src = MemorySource::load(&mut Cursor::new(&data[..]), &frames).unwrap();
        assert_eq!(src.chunk(0).unwrap(), &[0, 1, 2, 3]);
        assert_eq!(src.chunk(1).unwrap(), &[4, 5, 6, 7, 8, 9, 10, 11]);
        assert!(matches!(
            src.chunk(2),
            Err(SmackerError::FrameOutOfRange { frame: 2, count: 2 })
        ));
    }

    #[test]
    fn test_memory_source_trailing() {
        let frames = table(&[4]);
        let data = [0u8; 7];
        assert!(matches!(
            MemorySource::load(&mut Cursor::new(&data[..]), &frames),
            Err(SmackerError::TrailingData(3))
        ));
    }

    #[test]
    fn test_disk_source() {
        let frames = table(&[4, 4]);
        let mut data = vec![0xEEu8; 2];
        data.extend(0..8u8);
        let mut cursor = Cursor::new(data);
        cursor.set_position(2);
        let mut src = DiskSource::index(cursor, &frames).unwrap();
        assert_eq!(src.chunk(1).unwrap(), &[4, 5, 6, 7]);
        assert_eq!(src.chunk(0).unwrap(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_disk_source_truncated() {
        let frames = table(&[4, 4]);
        let cursor = Cursor::new(vec![0u8; 6]);
        let err = DiskSource::index(cursor, &frames).unwrap_err();
        assert!(err.is_io_error());
    }
}
