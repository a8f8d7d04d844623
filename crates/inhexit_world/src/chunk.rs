//! # Chunk System
//!
//! The world is cut into fixed-size chunks of hex cells:
//! - Only chunks that were touched exist in memory
//! - Each chunk is generated once, then mutated in place
//! - Each chunk encodes to a flat byte record for world files
//!
//! ## Chunk Format
//!
//! Chunks are 32x64 cells (width x height), stored row-major with rows of
//! `CHUNK_WIDTH` cells. One byte per cell, the [`CellValue`] ordinal.
//!
//! ```text
//! [4 bytes: chunk X, i32 big-endian]
//! [4 bytes: chunk Y, i32 big-endian]
//! [CHUNK_WIDTH * CHUNK_HEIGHT bytes: cells]
//! ```

use std::fmt;

use bytemuck::{CheckedBitPattern, NoUninit};
use thiserror::Error;

use crate::config::LodThresholds;
use crate::coords::{ChunkPosition, LocalOffset};

/// Chunk width in cells.
pub const CHUNK_WIDTH: usize = 32;

/// Chunk height in cells.
pub const CHUNK_HEIGHT: usize = 64;

/// Total cells per chunk.
pub const CELLS_PER_CHUNK: usize = CHUNK_WIDTH * CHUNK_HEIGHT;

/// Length of the position header in an encoded chunk.
pub const CHUNK_HEADER_LEN: usize = 8;

/// Length of a fully encoded chunk.
pub const ENCODED_CHUNK_LEN: usize = CHUNK_HEADER_LEN + CELLS_PER_CHUNK;

/// Contents of a single hex cell.
///
/// The discriminant is the on-disk byte, so variants must never be
/// renumbered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum CellValue {
    /// Air.
    #[default]
    Empty = 0,
    /// Dirt, the layer under the grass line.
    Dirt = 1,
    /// Stone, the deep layer.
    Stone = 2,
    /// Grass, the surface marker.
    Grass = 3,
    /// Wood (placed by players).
    Wood = 4,
    /// Leaves (placed by players).
    Leaves = 5,
    /// Water (placed by players).
    Water = 6,
    /// Sand (placed by players).
    Sand = 7,
    /// Coal ore, embedded in stone.
    Coal = 8,
    /// Iron ore, embedded in stone where the ore noise peaks.
    Iron = 9,
}

impl CellValue {
    /// Number of distinct cell values.
    pub const COUNT: usize = 10;

    /// Every cell value, in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Empty,
        Self::Dirt,
        Self::Stone,
        Self::Grass,
        Self::Wood,
        Self::Leaves,
        Self::Water,
        Self::Sand,
        Self::Coal,
        Self::Iron,
    ];

    /// Converts from the on-disk byte.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        if (v as usize) < Self::COUNT {
            Some(Self::ALL[v as usize])
        } else {
            None
        }
    }

    /// The on-disk byte.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for air.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Level of detail a consumer should use when presenting a chunk.
///
/// Only [`Chunk::update_lod`] moves a chunk between tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LodLevel {
    /// Full detail, close to the observer.
    #[default]
    High,
    /// Reduced detail, medium distance.
    Medium,
    /// Minimal detail, far away.
    Low,
}

impl LodLevel {
    /// Picks the tier for a distance in pixels.
    #[must_use]
    pub fn for_distance(distance: f32, thresholds: LodThresholds) -> Self {
        if distance < thresholds.near {
            Self::High
        } else if distance < thresholds.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Why an encoded chunk was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkDecodeError {
    /// Fewer bytes than the position header.
    #[error("chunk record truncated: {len} bytes, header needs 8")]
    TruncatedHeader {
        /// Bytes present.
        len: usize,
    },

    /// Cell payload is not exactly one chunk's worth of cells.
    #[error("chunk payload has {actual} cells, expected {}", CELLS_PER_CHUNK)]
    PayloadSize {
        /// Cells present.
        actual: usize,
    },

    /// A cell byte does not name any [`CellValue`].
    #[error("unknown cell value {value} at index {index}")]
    UnknownCell {
        /// Cell index within the payload.
        index: usize,
        /// Offending byte.
        value: u8,
    },
}

/// A chunk of world data.
#[derive(Clone)]
pub struct Chunk {
    /// Chunk position in the world.
    position: ChunkPosition,
    /// Cell data (indexed as `[y * CHUNK_WIDTH + x]`).
    cells: Box<[CellValue; CELLS_PER_CHUNK]>,
    /// Cells changed since generation or load.
    modified: Box<[bool; CELLS_PER_CHUNK]>,
    /// Current presentation tier.
    lod: LodLevel,
    /// Inside the observer's active window.
    active: bool,
    /// Content or LOD changed since the consumer last synced.
    needs_update: bool,
}

impl Chunk {
    /// Creates a new empty chunk at the given position.
    #[must_use]
    pub fn new(position: ChunkPosition) -> Self {
        Self {
            position,
            cells: Box::new([CellValue::Empty; CELLS_PER_CHUNK]),
            modified: Box::new([false; CELLS_PER_CHUNK]),
            lod: LodLevel::High,
            active: false,
            needs_update: true,
        }
    }

    /// Decodes a chunk from its byte record.
    ///
    /// # Errors
    ///
    /// See [`Chunk::deserialize`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, ChunkDecodeError> {
        let mut chunk = Self::new(ChunkPosition::default());
        chunk.deserialize(data)?;
        Ok(chunk)
    }

    #[inline]
    fn index(lx: usize, ly: usize) -> Option<usize> {
        (lx < CHUNK_WIDTH && ly < CHUNK_HEIGHT).then(|| ly * CHUNK_WIDTH + lx)
    }

    /// Gets a cell at local coordinates. Out of range reads are `Empty`.
    #[inline]
    #[must_use]
    pub fn get_cell(&self, lx: usize, ly: usize) -> CellValue {
        Self::index(lx, ly).map_or(CellValue::Empty, |i| self.cells[i])
    }

    /// Sets a cell at local coordinates. Out of range writes are ignored.
    ///
    /// Writing the value already stored changes nothing, so it neither marks
    /// the cell modified nor requests a redraw.
    #[inline]
    pub fn set_cell(&mut self, lx: usize, ly: usize, value: CellValue) {
        let Some(i) = Self::index(lx, ly) else {
            return;
        };
        if self.cells[i] != value {
            self.cells[i] = value;
            self.modified[i] = true;
            self.needs_update = true;
        }
    }

    /// Overwrites every cell with generated content.
    ///
    /// Generated cells are the baseline, not modifications.
    pub(crate) fn fill_generated(&mut self, mut cell_at: impl FnMut(LocalOffset) -> CellValue) {
        for ly in 0..CHUNK_HEIGHT {
            for lx in 0..CHUNK_WIDTH {
                self.cells[ly * CHUNK_WIDTH + lx] = cell_at(LocalOffset::new(lx, ly));
            }
        }
        self.modified.fill(false);
        self.needs_update = true;
    }

    /// Recomputes the LOD tier with the default thresholds.
    pub fn update_lod(&mut self, distance: f32) {
        self.update_lod_with(distance, LodThresholds::default());
    }

    /// Recomputes the LOD tier from the observer distance in pixels.
    pub fn update_lod_with(&mut self, distance: f32, thresholds: LodThresholds) {
        let lod = LodLevel::for_distance(distance, thresholds);
        if lod != self.lod {
            self.lod = lod;
            self.needs_update = true;
        }
    }

    /// Chunk position in the world.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Current LOD tier.
    #[inline]
    #[must_use]
    pub const fn lod(&self) -> LodLevel {
        self.lod
    }

    /// Whether the chunk is inside the active window.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether content or LOD changed since [`Chunk::mark_synced`].
    #[inline]
    #[must_use]
    pub const fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Acknowledges that a consumer has picked up the current state.
    pub fn mark_synced(&mut self) {
        self.needs_update = false;
    }

    /// Whether a specific cell was changed since generation or load.
    #[must_use]
    pub fn is_cell_modified(&self, lx: usize, ly: usize) -> bool {
        Self::index(lx, ly).is_some_and(|i| self.modified[i])
    }

    /// Whether any cell was changed since generation or load.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified.iter().any(|&m| m)
    }

    /// Number of cells changed since generation or load.
    #[must_use]
    pub fn modified_count(&self) -> usize {
        self.modified.iter().filter(|&&m| m).count()
    }

    /// Raw cell storage, row-major.
    #[must_use]
    pub fn cells(&self) -> &[CellValue] {
        self.cells.as_slice()
    }

    /// Most common non-empty cell, or `None` for an all-air chunk.
    ///
    /// Ties go to the lower ordinal. Low-LOD consumers draw the whole chunk
    /// in this material.
    #[must_use]
    pub fn dominant_cell(&self) -> Option<CellValue> {
        let mut counts = [0usize; CellValue::COUNT];
        for cell in self.cells.iter() {
            counts[cell.as_u8() as usize] += 1;
        }

        let mut best: Option<(CellValue, usize)> = None;
        for value in CellValue::ALL.into_iter().skip(1) {
            let count = counts[value.as_u8() as usize];
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }

    /// Encodes the chunk. See the module docs for the layout.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ENCODED_CHUNK_LEN);
        buf.extend_from_slice(&self.position.cx.to_be_bytes());
        buf.extend_from_slice(&self.position.cy.to_be_bytes());
        buf.extend_from_slice(bytemuck::cast_slice::<CellValue, u8>(self.cells.as_slice()));
        buf
    }

    /// Replaces this chunk's position and cells from an encoded record.
    ///
    /// On success modified flags are cleared and the LOD, active and
    /// needs-update flags return to their defaults.
    ///
    /// # Errors
    ///
    /// Rejects records shorter than the header, with a payload that is not
    /// exactly one chunk, or containing unknown cell bytes. A rejected record
    /// leaves the chunk untouched.
    pub fn deserialize(&mut self, data: &[u8]) -> Result<(), ChunkDecodeError> {
        let [x0, x1, x2, x3, y0, y1, y2, y3, payload @ ..] = data else {
            return Err(ChunkDecodeError::TruncatedHeader { len: data.len() });
        };
        if payload.len() != CELLS_PER_CHUNK {
            return Err(ChunkDecodeError::PayloadSize {
                actual: payload.len(),
            });
        }
        let cells = bytemuck::checked::try_cast_slice::<u8, CellValue>(payload).map_err(|_| {
            // Locate the offender for the error report.
            let (index, &value) = payload
                .iter()
                .enumerate()
                .find(|&(_, &b)| CellValue::from_u8(b).is_none())
                .unwrap_or((0, &0));
            ChunkDecodeError::UnknownCell { index, value }
        })?;

        self.position = ChunkPosition::new(
            i32::from_be_bytes([*x0, *x1, *x2, *x3]),
            i32::from_be_bytes([*y0, *y1, *y2, *y3]),
        );
        self.cells.copy_from_slice(cells);
        self.modified.fill(false);
        self.lod = LodLevel::High;
        self.active = false;
        self.needs_update = true;
        Ok(())
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("position", &self.position)
            .field("lod", &self.lod)
            .field("active", &self.active)
            .field("needs_update", &self.needs_update)
            .field("modified_cells", &self.modified_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(position: ChunkPosition) -> Chunk {
        let mut chunk = Chunk::new(position);
        chunk.fill_generated(|local| CellValue::ALL[(local.lx + local.ly) % CellValue::COUNT]);
        chunk
    }

    #[test]
    fn test_new_chunk_is_empty() {
        let chunk = Chunk::new(ChunkPosition::new(3, -4));
        assert_eq!(chunk.position(), ChunkPosition::new(3, -4));
        assert!(chunk.cells().iter().all(|c| c.is_empty()));
        assert_eq!(chunk.cells().len(), CELLS_PER_CHUNK);
        assert_eq!(chunk.lod(), LodLevel::High);
        assert!(!chunk.is_modified());
        assert_eq!(chunk.dominant_cell(), None);
    }

    #[test]
    fn test_out_of_range_access_is_harmless() {
        let mut chunk = striped(ChunkPosition::new(0, 0));
        let before = chunk.serialize();
        chunk.mark_synced();

        assert_eq!(chunk.get_cell(CHUNK_WIDTH, 0), CellValue::Empty);
        assert_eq!(chunk.get_cell(0, CHUNK_HEIGHT), CellValue::Empty);
        chunk.set_cell(CHUNK_WIDTH, 0, CellValue::Stone);
        chunk.set_cell(usize::MAX, usize::MAX, CellValue::Stone);

        assert_eq!(chunk.serialize(), before);
        assert!(!chunk.needs_update());
        assert!(!chunk.is_modified());
    }

    #[test]
    fn test_set_cell_tracks_changes() {
        let mut chunk = Chunk::new(ChunkPosition::new(0, 0));
        chunk.mark_synced();

        chunk.set_cell(5, 7, CellValue::Empty);
        assert!(!chunk.needs_update(), "same value should not request a redraw");
        assert!(!chunk.is_cell_modified(5, 7));

        chunk.set_cell(5, 7, CellValue::Iron);
        assert_eq!(chunk.get_cell(5, 7), CellValue::Iron);
        assert!(chunk.needs_update());
        assert!(chunk.is_cell_modified(5, 7));
        assert!(!chunk.is_cell_modified(7, 5));
        assert_eq!(chunk.modified_count(), 1);
    }

    #[test]
    fn test_generation_is_not_a_modification() {
        let chunk = striped(ChunkPosition::new(1, 1));
        assert!(!chunk.is_modified());
        assert!(chunk.needs_update());
        assert_eq!(chunk.get_cell(1, 0), CellValue::Dirt);
        assert_eq!(chunk.get_cell(31, 63), CellValue::ALL[94 % CellValue::COUNT]);
    }

    #[test]
    fn test_lod_transitions() {
        let mut chunk = Chunk::new(ChunkPosition::new(0, 0));
        chunk.mark_synced();

        chunk.update_lod(100.0);
        assert_eq!(chunk.lod(), LodLevel::High);
        assert!(!chunk.needs_update(), "unchanged tier should not request a redraw");

        chunk.update_lod(500.0);
        assert_eq!(chunk.lod(), LodLevel::Medium);
        assert!(chunk.needs_update());

        chunk.mark_synced();
        chunk.update_lod(5000.0);
        assert_eq!(chunk.lod(), LodLevel::Low);
        assert!(chunk.needs_update());

        chunk.update_lod(1199.0);
        assert_eq!(chunk.lod(), LodLevel::Medium);
        chunk.update_lod(0.0);
        assert_eq!(chunk.lod(), LodLevel::High);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = LodThresholds { near: 10.0, medium: 20.0 };
        let mut chunk = Chunk::new(ChunkPosition::new(0, 0));
        chunk.update_lod_with(15.0, thresholds);
        assert_eq!(chunk.lod(), LodLevel::Medium);
        chunk.update_lod_with(25.0, thresholds);
        assert_eq!(chunk.lod(), LodLevel::Low);
    }

    #[test]
    fn test_serialize_layout() {
        let mut chunk = Chunk::new(ChunkPosition::new(-1, 258));
        chunk.set_cell(0, 0, CellValue::Grass);
        chunk.set_cell(1, 1, CellValue::Coal);

        let bytes = chunk.serialize();
        assert_eq!(bytes.len(), ENCODED_CHUNK_LEN);
        assert_eq!(&bytes[..8], &[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x01, 0x02]);
        assert_eq!(bytes[8], 3);
        assert_eq!(bytes[8 + CHUNK_WIDTH + 1], 8);
        assert_eq!(bytes[9], 0);
    }

    #[test]
    fn test_round_trip() {
        let mut original = striped(ChunkPosition::new(-7, 12));
        original.set_cell(4, 4, CellValue::Water);

        let decoded = Chunk::from_bytes(&original.serialize()).unwrap();
        assert_eq!(decoded.position(), original.position());
        assert_eq!(decoded.cells(), original.cells());
        assert!(!decoded.is_modified(), "flags are not persisted");
    }

    #[test]
    fn test_short_input_is_ignored() {
        let mut chunk = striped(ChunkPosition::new(2, 2));
        let before = chunk.serialize();

        for len in 0..CHUNK_HEADER_LEN {
            let result = chunk.deserialize(&vec![0xAB; len]);
            assert_eq!(result, Err(ChunkDecodeError::TruncatedHeader { len }));
        }
        assert_eq!(chunk.serialize(), before);
    }

    #[test]
    fn test_bad_payload_is_rejected_without_mutation() {
        let mut chunk = striped(ChunkPosition::new(2, 2));
        let before = chunk.serialize();

        let mut short = Chunk::new(ChunkPosition::new(9, 9)).serialize();
        short.truncate(ENCODED_CHUNK_LEN - 1);
        assert_eq!(
            chunk.deserialize(&short),
            Err(ChunkDecodeError::PayloadSize { actual: CELLS_PER_CHUNK - 1 })
        );

        let mut garbled = Chunk::new(ChunkPosition::new(9, 9)).serialize();
        garbled[CHUNK_HEADER_LEN + 40] = 200;
        assert_eq!(
            chunk.deserialize(&garbled),
            Err(ChunkDecodeError::UnknownCell { index: 40, value: 200 })
        );

        assert_eq!(chunk.serialize(), before);
    }

    #[test]
    fn test_deserialize_resets_flags() {
        let source = striped(ChunkPosition::new(5, 6));
        let mut target = Chunk::new(ChunkPosition::new(0, 0));
        target.set_cell(0, 0, CellValue::Sand);
        target.update_lod(9999.0);
        target.set_active(true);
        target.mark_synced();

        target.deserialize(&source.serialize()).unwrap();
        assert_eq!(target.position(), ChunkPosition::new(5, 6));
        assert_eq!(target.lod(), LodLevel::High);
        assert!(!target.is_active());
        assert!(!target.is_modified());
        assert!(target.needs_update());
    }

    #[test]
    fn test_dominant_cell() {
        let mut chunk = Chunk::new(ChunkPosition::new(0, 0));
        chunk.set_cell(0, 0, CellValue::Dirt);
        chunk.set_cell(1, 0, CellValue::Stone);
        chunk.set_cell(2, 0, CellValue::Stone);
        assert_eq!(chunk.dominant_cell(), Some(CellValue::Stone));

        chunk.set_cell(3, 0, CellValue::Dirt);
        assert_eq!(chunk.dominant_cell(), Some(CellValue::Dirt), "ties go to the lower ordinal");
    }

    #[test]
    fn test_cell_value_bytes() {
        for (i, value) in CellValue::ALL.iter().enumerate() {
            assert_eq!(value.as_u8() as usize, i);
            assert_eq!(CellValue::from_u8(value.as_u8()), Some(*value));
        }
        assert_eq!(CellValue::from_u8(10), None);
        assert_eq!(CellValue::from_u8(255), None);
    }
}
