//! # Inhexit World Store
//!
//! Unbounded 2D hexagonal cell world, generated lazily from a seed.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same terrain
//! 2. **Chunked**: The world is generated in fixed 32x64 chunks
//! 3. **Lazy**: A chunk exists only once something reads or writes it
//! 4. **Persistent**: The whole registry saves to a single world file
//!
//! ## Core Components
//!
//! - `coords`: Axial hex coordinates, pixel transforms, chunk addressing
//! - `Chunk`: Cell storage with modification tracking and a byte codec
//! - `TerrainGenerator`: Seeded value-noise terrain with ore veins
//! - `World`: Chunk registry and the observer's active window
//! - `persistence`: World file format
//!
//! ## Example
//!
//! ```rust
//! use inhexit_world::{AxialCoord, CellValue, World};
//!
//! let mut world = World::with_seed(42.0);
//!
//! // Observer at the origin
//! world.update_active_window((0.0, 0.0));
//! assert_eq!(world.active_chunks().len(), 25);
//!
//! // Dig into the ground
//! let surface = world.generator().base_level(0);
//! world.set_cell(AxialCoord::new(0, surface), CellValue::Empty);
//! assert!(world.get_cell(AxialCoord::new(0, surface)).is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod config;
pub mod coords;
pub mod error;
pub mod noise;
pub mod persistence;
pub mod terrain;
pub mod world;

pub use chunk::{
    CellValue, Chunk, ChunkDecodeError, LodLevel, CELLS_PER_CHUNK, CHUNK_HEIGHT, CHUNK_WIDTH,
};
pub use config::{LodThresholds, WorldConfig};
pub use coords::{
    axial_round, axial_to_pixel, chunk_to_world, pixel_to_axial, world_to_chunk, AxialCoord,
    ChunkPosition, LocalOffset,
};
pub use error::{WorldError, WorldResult};
pub use noise::{ValueNoise, WorldSeed};
pub use persistence::LoadReport;
pub use terrain::TerrainGenerator;
pub use world::{World, WorldStats};
