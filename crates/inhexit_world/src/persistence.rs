//! # World Persistence
//!
//! Whole-world save files. Uncompressed, fixed-width fields, **big-endian
//! throughout**.
//!
//! ## Format
//!
//! ```text
//! Header (16 bytes):
//! [4 bytes: width in chunks,  i32]
//! [4 bytes: height in chunks, i32]
//! [4 bytes: seed,             f32]
//! [4 bytes: chunk count,      u32]
//!
//! Chunk record, repeated chunk-count times:
//! [4 bytes: record length N,  u32]
//! [N bytes: encoded chunk, see `chunk` module]
//! ```
//!
//! ## Recovery
//!
//! Loading is best-effort. Only a missing file or a short header fails the
//! load. A record that does not decode is skipped; a stream that ends
//! inside a record keeps everything decoded before it.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::chunk::Chunk;
use crate::error::{WorldError, WorldResult};
use crate::noise::WorldSeed;

/// Length of the file header.
pub const WORLD_HEADER_LEN: usize = 16;

/// World file header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldHeader {
    /// Nominal world width in chunks.
    pub width_chunks: i32,
    /// Nominal world height in chunks.
    pub height_chunks: i32,
    /// Generation seed.
    pub seed: WorldSeed,
    /// Number of chunk records that follow.
    pub chunk_count: u32,
}

impl WorldHeader {
    /// Appends the encoded header to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.width_chunks.to_be_bytes());
        buf.extend_from_slice(&self.height_chunks.to_be_bytes());
        buf.extend_from_slice(&self.seed.value().to_be_bytes());
        buf.extend_from_slice(&self.chunk_count.to_be_bytes());
    }

    /// Reads a header from the front of `reader`.
    fn decode(reader: &mut ByteReader<'_>) -> Option<Self> {
        Some(Self {
            width_chunks: reader.read_i32()?,
            height_chunks: reader.read_i32()?,
            seed: WorldSeed::new(reader.read_f32()?),
            chunk_count: reader.read_u32()?,
        })
    }
}

/// Outcome of a successful load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Chunks restored into the registry.
    pub restored: usize,
    /// Records that were present but failed to decode.
    pub skipped: usize,
    /// The file ended before the announced number of records.
    pub truncated: bool,
}

/// Decoded world file.
#[derive(Debug)]
pub struct WorldSnapshot {
    /// File header.
    pub header: WorldHeader,
    /// Every record that decoded, in file order.
    pub chunks: Vec<Chunk>,
    /// Records that failed to decode.
    pub skipped: usize,
    /// The file ended before `header.chunk_count` records.
    pub truncated: bool,
}

/// Big-endian reader over a byte buffer.
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new reader from a buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Reads `len` bytes, or nothing if fewer remain.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let bytes = &self.buffer[self.position..self.position + len];
        self.position += len;
        Some(bytes)
    }

    #[inline]
    fn read_array(&mut self) -> Option<[u8; 4]> {
        self.read_bytes(4)?.try_into().ok()
    }

    /// Reads a u32 in big-endian format.
    #[inline]
    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Reads an i32 in big-endian format.
    #[inline]
    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// Reads an f32 in big-endian format.
    #[inline]
    pub fn read_f32(&mut self) -> Option<f32> {
        self.read_u32().map(f32::from_bits)
    }
}

/// Encodes a header and chunk records into a complete world file.
///
/// `header.chunk_count` is overwritten with the number of chunks given.
#[must_use]
pub fn encode_world<'a, I>(header: WorldHeader, chunks: I) -> Vec<u8>
where
    I: ExactSizeIterator<Item = &'a Chunk>,
{
    let header = WorldHeader {
        chunk_count: u32::try_from(chunks.len()).unwrap_or(u32::MAX),
        ..header
    };

    let mut buf = Vec::with_capacity(
        WORLD_HEADER_LEN + chunks.len() * (4 + crate::chunk::ENCODED_CHUNK_LEN),
    );
    header.encode_into(&mut buf);
    for chunk in chunks.take(header.chunk_count as usize) {
        let record = chunk.serialize();
        let len = u32::try_from(record.len()).unwrap_or(u32::MAX);
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&record);
    }
    buf
}

/// Decodes a complete world file.
///
/// # Errors
///
/// Fails only when the header is incomplete or its seed is not finite;
/// everything after the header is recovered record by record.
pub fn decode_world(data: &[u8]) -> WorldResult<WorldSnapshot> {
    let mut reader = ByteReader::new(data);
    let header = WorldHeader::decode(&mut reader).ok_or(WorldError::TruncatedHeader {
        len: data.len(),
        need: WORLD_HEADER_LEN,
    })?;
    if !header.seed.value().is_finite() {
        return Err(WorldError::CorruptHeader(format!(
            "seed is not finite: {}",
            header.seed.value()
        )));
    }

    let mut chunks = Vec::new();
    let mut skipped = 0;
    let mut truncated = false;

    for index in 0..header.chunk_count {
        let Some(record) = reader
            .read_u32()
            .and_then(|len| reader.read_bytes(len as usize))
        else {
            tracing::warn!(
                index,
                announced = header.chunk_count,
                "world file ends inside chunk records"
            );
            truncated = true;
            break;
        };

        match Chunk::from_bytes(record) {
            Ok(chunk) => chunks.push(chunk),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable chunk record");
                skipped += 1;
            }
        }
    }

    Ok(WorldSnapshot {
        header,
        chunks,
        skipped,
        truncated,
    })
}

/// Writes an encoded world file to disk.
///
/// # Errors
///
/// Returns [`WorldError::Io`] if the file cannot be created or written.
pub fn write_world_file(path: &Path, bytes: &[u8]) -> WorldResult<()> {
    let mut file = File::create(path).map_err(|e| WorldError::io(path, e))?;
    file.write_all(bytes).map_err(|e| WorldError::io(path, e))?;
    file.sync_all().map_err(|e| WorldError::io(path, e))?;
    Ok(())
}

/// Reads and decodes a world file from disk.
///
/// # Errors
///
/// Returns [`WorldError::Io`] if the file cannot be read, otherwise see
/// [`decode_world`].
pub fn read_world_file(path: &Path) -> WorldResult<WorldSnapshot> {
    let data = std::fs::read(path).map_err(|e| WorldError::io(path, e))?;
    decode_world(&data)
}
