//! # World Configuration
//!
//! Tunables for a [`World`](crate::World). Loaded once at startup, either
//! built in code or parsed from TOML:
//!
//! ```toml
//! seed = 42.0
//! cell_size = 24.0
//! active_radius = 2
//!
//! [lod]
//! near = 500.0
//! medium = 1200.0
//! ```
//!
//! Any field left out takes its default.

use serde::Deserialize;

use crate::error::{WorldError, WorldResult};

/// Default hex radius in pixels.
pub const DEFAULT_CELL_SIZE: f32 = 24.0;

/// Default active window radius, in chunks, around the observer.
pub const DEFAULT_ACTIVE_RADIUS: i32 = 2;

/// Default maximum number of rows scanned when probing for the surface.
pub const DEFAULT_SURFACE_SCAN_DEPTH: i32 = 200;

/// Distance thresholds (pixels) between level-of-detail tiers.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LodThresholds {
    /// Below this distance a chunk is drawn at full detail.
    pub near: f32,
    /// Below this distance (and at least `near`) a chunk is medium detail.
    pub medium: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            near: 500.0,
            medium: 1200.0,
        }
    }
}

/// World configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Generation seed. Fixed for the lifetime of the world.
    pub seed: f32,
    /// Nominal world width in cells (recorded in save files).
    pub width_blocks: u32,
    /// Nominal world height in cells (recorded in save files).
    pub height_blocks: u32,
    /// Hex radius in pixels.
    pub cell_size: f32,
    /// Half-width of the active window, in chunks.
    pub active_radius: i32,
    /// Half-width of the spawn area generated by
    /// [`World::generate_spawn_area`](crate::World::generate_spawn_area).
    pub spawn_radius: i32,
    /// Rows scanned by [`World::find_surface_height`](crate::World::find_surface_height).
    pub surface_scan_depth: i32,
    /// LOD tier thresholds.
    pub lod: LodThresholds,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0.0,
            width_blocks: 200,
            height_blocks: 100,
            cell_size: DEFAULT_CELL_SIZE,
            active_radius: DEFAULT_ACTIVE_RADIUS,
            spawn_radius: 2,
            surface_scan_depth: DEFAULT_SURFACE_SCAN_DEPTH,
            lod: LodThresholds::default(),
        }
    }
}

impl WorldConfig {
    /// Default configuration with the given seed.
    #[must_use]
    pub fn with_seed(seed: f32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses a TOML document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Config`] if the document does not parse or the
    /// values are out of range.
    pub fn from_toml_str(source: &str) -> WorldResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| WorldError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Config`] naming the first offending field.
    pub fn validate(&self) -> WorldResult<()> {
        if !self.seed.is_finite() {
            return Err(WorldError::Config(format!("seed must be finite, got {}", self.seed)));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(WorldError::Config(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.active_radius < 0 || self.spawn_radius < 0 {
            return Err(WorldError::Config(format!(
                "radii must be non-negative, got active={} spawn={}",
                self.active_radius, self.spawn_radius
            )));
        }
        if self.surface_scan_depth < 0 {
            return Err(WorldError::Config(format!(
                "surface_scan_depth must be non-negative, got {}",
                self.surface_scan_depth
            )));
        }
        let LodThresholds { near, medium } = self.lod;
        if !(near.is_finite() && medium.is_finite() && 0.0 <= near && near <= medium) {
            return Err(WorldError::Config(format!(
                "lod thresholds must satisfy 0 <= near <= medium, got near={near} medium={medium}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.active_radius, 2);
        assert_eq!(config.surface_scan_depth, 200);
        assert_eq!(config.lod, LodThresholds { near: 500.0, medium: 1200.0 });
    }

    #[test]
    fn test_toml_partial_document() {
        let config = WorldConfig::from_toml_str(
            r"
            seed = 42.0
            active_radius = 3

            [lod]
            near = 300.0
            ",
        )
        .unwrap();

        assert_eq!(config.seed, 42.0);
        assert_eq!(config.active_radius, 3);
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(config.lod.near, 300.0);
        assert_eq!(config.lod.medium, 1200.0);
    }

    #[test]
    fn test_toml_rejects_bad_values() {
        assert!(WorldConfig::from_toml_str("cell_size = 0.0").is_err());
        assert!(WorldConfig::from_toml_str("active_radius = -1").is_err());
        assert!(WorldConfig::from_toml_str("[lod]\nnear = 900.0\nmedium = 100.0").is_err());
        assert!(WorldConfig::from_toml_str("seed = \"forty-two\"").is_err());
    }
}
