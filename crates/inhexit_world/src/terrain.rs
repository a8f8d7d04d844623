//! # Terrain Generation
//!
//! Fills chunks from the world seed.
//!
//! The ground curve is a two-octave 1D value noise keyed only by the global
//! column `q`, never by chunk position, so neighbouring chunks agree on the
//! height of their shared edge without knowing about each other.
//!
//! Rows grow downward. For a column with surface row `base`:
//!
//! | row                    | cell                         |
//! |------------------------|------------------------------|
//! | `r < base`             | `Empty`                      |
//! | `r == base`            | `Grass`                      |
//! | `base < r <= base + 5` | `Dirt`                       |
//! | `r > base + 5`         | `Stone`, `Coal` or `Iron`    |

use crate::chunk::{CellValue, Chunk, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::coords::{chunk_to_world, AxialCoord, ChunkPosition};
use crate::noise::{ValueNoise, WorldSeed};

/// Surface row of a perfectly flat ground curve.
pub const SURFACE_DATUM: i32 = 30;

/// Rows of dirt between the grass line and the stone layer.
pub const DIRT_DEPTH: i32 = 5;

/// Ore noise above this turns stone into coal.
pub const COAL_THRESHOLD: f64 = 0.88;

/// Ore noise above this turns stone into iron.
pub const IRON_THRESHOLD: f64 = 0.92;

#[allow(clippy::cast_possible_wrap)]
const CHUNK_WIDTH_I32: i32 = CHUNK_WIDTH as i32;
#[allow(clippy::cast_possible_wrap)]
const CHUNK_HEIGHT_I32: i32 = CHUNK_HEIGHT as i32;

/// Chunk generator using procedural noise.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    /// Lattice noise shared by the ground curve and ore veins.
    noise: ValueNoise,
    /// Seed as a coordinate offset.
    offset: f64,
}

impl TerrainGenerator {
    /// Creates a new terrain generator.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            noise: ValueNoise::new(seed),
            offset: f64::from(seed.value()),
        }
    }

    /// The seed this generator was built from.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.noise.seed()
    }

    /// Raw ground curve at a global column, roughly `[-20, 20]`.
    #[must_use]
    pub fn ground_level(&self, q: i32) -> f64 {
        let q = f64::from(q);
        let s = self.offset;
        let ground =
            self.noise.sample(q * 0.05 + s, 0.0) * 15.0 + self.noise.sample(q * 0.1 + s, s) * 5.0;
        debug_assert!(ground.is_finite(), "ground curve is not finite at q={q}");
        ground
    }

    /// Surface (grass) row of a global column.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn base_level(&self, q: i32) -> i32 {
        SURFACE_DATUM + self.ground_level(q).floor() as i32
    }

    /// Generated content of a single global cell.
    #[must_use]
    pub fn cell_at(&self, coord: AxialCoord) -> CellValue {
        self.classify(coord, self.base_level(coord.q))
    }

    fn classify(&self, coord: AxialCoord, base: i32) -> CellValue {
        let r = coord.r;
        if r > base + DIRT_DEPTH {
            self.stone_or_ore(coord)
        } else if r > base {
            CellValue::Dirt
        } else if r == base {
            CellValue::Grass
        } else {
            CellValue::Empty
        }
    }

    fn stone_or_ore(&self, coord: AxialCoord) -> CellValue {
        let s = self.offset;
        let ore = self
            .noise
            .sample(f64::from(coord.q) * 0.2 + s, f64::from(coord.r) * 0.2 + s);
        // Higher threshold first, otherwise iron could never win.
        if ore > IRON_THRESHOLD {
            CellValue::Iron
        } else if ore > COAL_THRESHOLD {
            CellValue::Coal
        } else {
            CellValue::Stone
        }
    }

    /// Fills a chunk with generated terrain for its position.
    ///
    /// Replaces every cell and clears the chunk's modified flags. A chunk
    /// with cells beyond the `i32` cell space is all `Empty`.
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn generate(&self, chunk: &mut Chunk) {
        let pos = chunk.position();
        let Some(origin) = pos.checked_origin(CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32) else {
            chunk.fill_generated(|_| CellValue::Empty);
            tracing::debug!(cx = pos.cx, cy = pos.cy, "chunk outside cell space left empty");
            return;
        };
        let bases: [i32; CHUNK_WIDTH] =
            std::array::from_fn(|lx| self.base_level(origin.q + lx as i32));

        chunk.fill_generated(|local| {
            let coord = chunk_to_world(pos, local, CHUNK_WIDTH_I32, CHUNK_HEIGHT_I32);
            self.classify(coord, bases[local.lx])
        });

        tracing::debug!(cx = pos.cx, cy = pos.cy, "generated chunk");
    }

    /// Builds and generates a fresh chunk.
    #[must_use]
    pub fn generate_chunk(&self, pos: ChunkPosition) -> Chunk {
        let mut chunk = Chunk::new(pos);
        self.generate(&mut chunk);
        chunk
    }
}
