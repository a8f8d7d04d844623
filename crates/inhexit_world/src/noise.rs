//! # Value Noise Implementation
//!
//! Smooth, deterministic noise for terrain generation.
//!
//! A lattice of pseudo-random values sits on the integer grid; a sample is
//! the bilinear blend of the four lattice values around it. The lattice hash
//! is plain wrapping `i32` arithmetic, so it never depends on a platform or
//! standard-library hasher.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, this implementation will produce
//! **exactly** the same values on any platform, any time.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed. It is stored as `f32`
/// because it is also added to noise coordinates and written to world files
/// as a 32-bit float.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSeed(f32);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: f32) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Integer form mixed into every lattice hash.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn lattice_offset(self) -> i32 {
        // Saturating float-to-int cast; NaN maps to 0.
        self.0 as i32
    }
}

/// 2D value noise generator.
///
/// # Performance
///
/// - O(1) per sample, four lattice hashes
/// - No allocations
///
/// # Example
///
/// ```rust
/// use inhexit_world::noise::{ValueNoise, WorldSeed};
///
/// let noise = ValueNoise::new(WorldSeed::new(42.0));
/// let value = noise.sample(100.5, 200.3);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Clone, Debug)]
pub struct ValueNoise {
    seed: WorldSeed,
    offset: i32,
}

impl ValueNoise {
    /// Creates a new value noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            seed,
            offset: seed.lattice_offset(),
        }
    }

    /// The seed this generator hashes with.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Hashed lattice value at an integer grid point, in `[-1, 1]`.
    #[inline]
    #[must_use]
    pub fn lattice(&self, x: i32, y: i32) -> f64 {
        let n = x.wrapping_add(y.wrapping_mul(57)).wrapping_add(self.offset);
        let n = n.wrapping_shl(13) ^ n;
        let mixed = n
            .wrapping_mul(n.wrapping_mul(n).wrapping_mul(15_731).wrapping_add(789_221))
            .wrapping_add(1_376_312_589)
            & 0x7fff_ffff;
        1.0 - f64::from(mixed) / 1_073_741_824.0
    }

    /// Samples noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();
        let xi = x_floor as i32;
        let yi = y_floor as i32;
        let xf = x - x_floor;
        let yf = y - y_floor;

        let v00 = self.lattice(xi, yi);
        let v10 = self.lattice(xi.wrapping_add(1), yi);
        let v01 = self.lattice(xi, yi.wrapping_add(1));
        let v11 = self.lattice(xi.wrapping_add(1), yi.wrapping_add(1));

        let top = v00 * (1.0 - xf) + v10 * xf;
        let bottom = v01 * (1.0 - xf) + v11 * xf;
        top * (1.0 - yf) + bottom * yf
    }
}
