//! # World Registry
//!
//! Owns every materialised chunk and the observer's active window.
//!
//! ## Lifecycle
//!
//! 1. **Unexplored**: no entry in the registry
//! 2. **Materialised**: generated on first touch, then mutated in place
//! 3. **Active**: inside the square window around the observer
//!
//! Chunks are never dropped automatically. [`World::unload_chunk`] discards
//! one (modifications included); touching it again regenerates the
//! pristine terrain.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::chunk::{CellValue, Chunk, LodLevel, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::config::WorldConfig;
use crate::coords::{axial_to_pixel, pixel_to_axial, world_to_chunk, AxialCoord, ChunkPosition};
use crate::error::WorldResult;
use crate::noise::WorldSeed;
use crate::persistence::{self, LoadReport, WorldHeader, WorldSnapshot};
use crate::terrain::TerrainGenerator;

#[allow(clippy::cast_possible_wrap)]
const CHUNK_WIDTH_I32: i32 = CHUNK_WIDTH as i32;
#[allow(clippy::cast_possible_wrap)]
const CHUNK_HEIGHT_I32: i32 = CHUNK_HEIGHT as i32;

/// Chunk index range whose cells all fit the `i32` cell space.
const MIN_CX: i32 = i32::MIN / CHUNK_WIDTH_I32;
const MAX_CX: i32 = i32::MAX / CHUNK_WIDTH_I32;
const MIN_CY: i32 = i32::MIN / CHUNK_HEIGHT_I32;
const MAX_CY: i32 = i32::MAX / CHUNK_HEIGHT_I32;

/// Session counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks generated from the seed.
    pub generated: u64,
    /// Chunks removed by [`World::unload_chunk`].
    pub unloaded: u64,
    /// Chunks restored from world files.
    pub restored: u64,
    /// World file records that failed to decode.
    pub skipped_records: u64,
}

/// The hex world: chunk registry, generator and active window.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    generator: TerrainGenerator,
    chunks: BTreeMap<ChunkPosition, Chunk>,
    active: BTreeSet<ChunkPosition>,
    /// Chunk the active window was last centred on.
    window_center: Option<ChunkPosition>,
    width_chunks: i32,
    height_chunks: i32,
    stats: WorldStats,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Config`](crate::WorldError::Config) if the
    /// configuration does not validate.
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Creates an empty world with the default configuration.
    ///
    /// A non-finite seed is replaced by `0.0`.
    #[must_use]
    pub fn with_seed(seed: f32) -> Self {
        let seed = if seed.is_finite() {
            seed
        } else {
            tracing::warn!(seed, "non-finite seed replaced by 0");
            0.0
        };
        Self::from_valid_config(WorldConfig::with_seed(seed))
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    fn from_valid_config(config: WorldConfig) -> Self {
        // u32::MAX / 32 fits in i32.
        let width_chunks = config.width_blocks.div_ceil(CHUNK_WIDTH as u32) as i32;
        let height_chunks = config.height_blocks.div_ceil(CHUNK_HEIGHT as u32) as i32;
        Self {
            generator: TerrainGenerator::new(WorldSeed::new(config.seed)),
            config,
            chunks: BTreeMap::new(),
            active: BTreeSet::new(),
            window_center: None,
            width_chunks,
            height_chunks,
            stats: WorldStats::default(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Generation seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.generator.seed()
    }

    /// Terrain generator for this world's seed.
    #[must_use]
    pub const fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Nominal width in chunks.
    #[must_use]
    pub const fn width_chunks(&self) -> i32 {
        self.width_chunks
    }

    /// Nominal height in chunks.
    #[must_use]
    pub const fn height_chunks(&self) -> i32 {
        self.height_chunks
    }

    /// Nominal width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width_chunks.saturating_mul(CHUNK_WIDTH_I32)
    }

    /// Nominal height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height_chunks.saturating_mul(CHUNK_HEIGHT_I32)
    }

    /// Returns the chunk at `pos`, generating it on first access.
    pub fn get_or_create_chunk(&mut self, pos: ChunkPosition) -> &mut Chunk {
        let generator = &self.generator;
        let stats = &mut self.stats;
        self.chunks.entry(pos).or_insert_with(|| {
            stats.generated += 1;
            generator.generate_chunk(pos)
        })
    }

    /// Returns an already materialised chunk. Never generates.
    ///
    /// Chunks have no backing store of their own, so there is nothing to
    /// load; whole worlds come back through [`World::load_world`].
    pub fn load_chunk(&mut self, pos: ChunkPosition) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Looks up a chunk without generating it.
    #[must_use]
    pub fn chunk(&self, pos: ChunkPosition) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Whether the chunk at `pos` is materialised.
    #[must_use]
    pub fn contains_chunk(&self, pos: ChunkPosition) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Discards a chunk and its modifications.
    ///
    /// Returns `false` if nothing was loaded at `pos`.
    pub fn unload_chunk(&mut self, pos: ChunkPosition) -> bool {
        self.active.remove(&pos);
        if self.chunks.remove(&pos).is_none() {
            return false;
        }
        self.stats.unloaded += 1;
        tracing::debug!(cx = pos.cx, cy = pos.cy, "unloaded chunk");
        true
    }

    /// Reads a cell, generating its chunk if needed.
    pub fn get_cell(&mut self, coord: AxialCoord) -> CellValue {
        let (pos, local) = world_to_chunk(coord, CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32);
        self.get_or_create_chunk(pos).get_cell(local.lx, local.ly)
    }

    /// Reads a cell only if its chunk is already materialised.
    #[must_use]
    pub fn peek_cell(&self, coord: AxialCoord) -> Option<CellValue> {
        let (pos, local) = world_to_chunk(coord, CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32);
        self.chunks.get(&pos).map(|chunk| chunk.get_cell(local.lx, local.ly))
    }

    /// Writes a cell, generating its chunk first if needed.
    pub fn set_cell(&mut self, coord: AxialCoord, value: CellValue) {
        let (pos, local) = world_to_chunk(coord, CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32);
        self.get_or_create_chunk(pos).set_cell(local.lx, local.ly, value);
    }

    /// Regenerates a chunk's content from this world's seed.
    pub fn generate(&self, chunk: &mut Chunk) {
        self.generator.generate(chunk);
    }

    /// Chunk containing an observer at pixel position `(x, y)`.
    #[must_use]
    pub fn observer_chunk(&self, observer: (f32, f32)) -> ChunkPosition {
        let coord = pixel_to_axial(observer.0, observer.1, self.config.cell_size);
        world_to_chunk(coord, CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32).0
    }

    /// Pixel position of a chunk's centre cell.
    #[must_use]
    pub fn chunk_center_pixel(&self, pos: ChunkPosition) -> (f32, f32) {
        let origin = pos.origin(CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32);
        let center = AxialCoord::new(
            origin.q.saturating_add(CHUNK_WIDTH_I32 / 2),
            origin.r.saturating_add(CHUNK_HEIGHT_I32 / 2),
        );
        axial_to_pixel(center, self.config.cell_size)
    }

    /// Recentres the active window on an observer at pixel position `(x, y)`.
    ///
    /// Every chunk in the `(2 * active_radius + 1)`² square around the
    /// observer's chunk is materialised, marked active and given a LOD tier
    /// from its distance to the observer. Chunks that leave the window stay
    /// loaded but inactive. At the edge of the cell space the window is cut
    /// short instead of reaching past it.
    pub fn update_active_window(&mut self, observer: (f32, f32)) {
        let center = self.observer_chunk(observer);
        let radius = self.config.active_radius;

        let mut window = BTreeSet::new();
        let rows = center.cy.saturating_sub(radius).max(MIN_CY)
            ..=center.cy.saturating_add(radius).min(MAX_CY);
        let columns = center.cx.saturating_sub(radius).max(MIN_CX)
            ..=center.cx.saturating_add(radius).min(MAX_CX);
        for cy in rows {
            for cx in columns.clone() {
                window.insert(ChunkPosition::new(cx, cy));
            }
        }

        for pos in self.active.difference(&window) {
            if let Some(chunk) = self.chunks.get_mut(pos) {
                chunk.set_active(false);
            }
        }

        let thresholds = self.config.lod;
        for &pos in &window {
            let (px, py) = self.chunk_center_pixel(pos);
            let distance = (px - observer.0).hypot(py - observer.1);
            let chunk = self.get_or_create_chunk(pos);
            chunk.set_active(true);
            chunk.update_lod_with(distance, thresholds);
        }

        if self.window_center != Some(center) {
            tracing::debug!(
                cx = center.cx,
                cy = center.cy,
                loaded = self.chunks.len(),
                "active window moved"
            );
            self.window_center = Some(center);
        }
        self.active = window;
    }

    /// Positions inside the active window, in ascending order.
    #[must_use]
    pub const fn active_chunks(&self) -> &BTreeSet<ChunkPosition> {
        &self.active
    }

    /// LOD tier of a loaded chunk.
    #[must_use]
    pub fn lod_of(&self, pos: ChunkPosition) -> Option<LodLevel> {
        self.chunks.get(&pos).map(Chunk::lod)
    }

    /// Pixel `y` of the first solid cell in the column under `pixel_x`.
    ///
    /// Scans rows `0..surface_scan_depth` downward and returns `0.0` if the
    /// whole range is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn find_surface_height(&mut self, pixel_x: f32) -> f32 {
        let cell_size = self.config.cell_size;
        let q = (pixel_x / (1.5 * cell_size)).round() as i32;
        for r in 0..self.config.surface_scan_depth {
            let coord = AxialCoord::new(q, r);
            if !self.get_cell(coord).is_empty() {
                return axial_to_pixel(coord, cell_size).1;
            }
        }
        0.0
    }

    /// Materialises the square of chunks around chunk `(0, 0)`.
    pub fn generate_spawn_area(&mut self) {
        let radius = self.config.spawn_radius;
        for cy in -radius..=radius {
            for cx in -radius..=radius {
                self.get_or_create_chunk(ChunkPosition::new(cx, cy));
            }
        }
        tracing::debug!(radius, loaded = self.chunks.len(), "spawn area generated");
    }

    /// Positions of chunks holding player modifications.
    pub fn dirty_chunks(&self) -> impl Iterator<Item = ChunkPosition> + '_ {
        self.chunks
            .values()
            .filter(|chunk| chunk.is_modified())
            .map(Chunk::position)
    }

    /// Every materialised chunk, in ascending position order.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    /// Number of materialised chunks.
    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Session counters.
    #[must_use]
    pub const fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Encodes the whole world as a world file image.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = WorldHeader {
            width_chunks: self.width_chunks,
            height_chunks: self.height_chunks,
            seed: self.seed(),
            chunk_count: 0,
        };
        persistence::encode_world(header, self.chunks.values())
    }

    /// Writes every materialised chunk to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`](crate::WorldError::Io) if the file cannot
    /// be written.
    pub fn save_world(&self, path: impl AsRef<Path>) -> WorldResult<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes();
        persistence::write_world_file(path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            chunks = self.chunks.len(),
            bytes = bytes.len(),
            "world saved"
        );
        Ok(())
    }

    /// Replaces the registry with the contents of a world file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its header is unusable. The world
    /// is left unchanged in that case.
    pub fn load_world(&mut self, path: impl AsRef<Path>) -> WorldResult<LoadReport> {
        let path = path.as_ref();
        let snapshot = persistence::read_world_file(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "world load failed");
            e
        })?;
        let report = self.apply_snapshot(snapshot);
        tracing::info!(
            path = %path.display(),
            restored = report.restored,
            skipped = report.skipped,
            truncated = report.truncated,
            "world loaded"
        );
        Ok(report)
    }

    /// Replaces the registry with a decoded world file image.
    ///
    /// The seed and nominal dimensions are taken from the image. Restored
    /// chunks start inactive at full detail with no modified cells.
    ///
    /// # Errors
    ///
    /// Fails if the header is unusable, leaving the world unchanged.
    pub fn restore_from_bytes(&mut self, data: &[u8]) -> WorldResult<LoadReport> {
        let snapshot = persistence::decode_world(data).map_err(|e| {
            tracing::warn!(error = %e, "world image rejected");
            e
        })?;
        Ok(self.apply_snapshot(snapshot))
    }

    fn apply_snapshot(&mut self, snapshot: WorldSnapshot) -> LoadReport {
        let header = snapshot.header;

        self.config.seed = header.seed.value();
        self.generator = TerrainGenerator::new(header.seed);
        self.width_chunks = header.width_chunks;
        self.height_chunks = header.height_chunks;
        self.active.clear();
        self.window_center = None;
        self.chunks = snapshot
            .chunks
            .into_iter()
            .map(|chunk| (chunk.position(), chunk))
            .collect();

        let report = LoadReport {
            restored: self.chunks.len(),
            skipped: snapshot.skipped,
            truncated: snapshot.truncated,
        };
        self.stats.restored += report.restored as u64;
        self.stats.skipped_records += report.skipped as u64;
        report
    }
}
