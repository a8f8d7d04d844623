//! # Coordinate System
//!
//! Three addressing spaces, all pure functions of their inputs:
//!
//! - **Axial** `(q, r)`: global, unbounded hex address of a single cell.
//! - **Pixel** `(x, y)`: flat-top hex centres for presentation and observers.
//! - **Chunk-space** `(cx, cy)` plus a **local offset** `(lx, ly)` inside
//!   that chunk.
//!
//! Chunk-space uses floor division and the local offset uses the Euclidean
//! remainder, so negative coordinates land in the chunk "to the left" with a
//! non-negative offset: `q = -1` with width 32 is chunk `-1`, local `31`.

/// `sqrt(3)`, used by the flat-top hex layout.
const SQRT_3: f32 = 1.732_050_8;

/// Global axial hex coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AxialCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis. Grows downward in world space.
    pub r: i32,
}

impl AxialCoord {
    /// Creates a new axial coordinate.
    #[inline]
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implied third cube coordinate, `s = -q - r`.
    #[inline]
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Pixel centre of this hex. See [`axial_to_pixel`].
    #[inline]
    #[must_use]
    pub fn to_pixel(self, cell_size: f32) -> (f32, f32) {
        axial_to_pixel(self, cell_size)
    }

    /// Hex containing the given pixel. See [`pixel_to_axial`].
    #[inline]
    #[must_use]
    pub fn from_pixel(x: f32, y: f32, cell_size: f32) -> Self {
        pixel_to_axial(x, y, cell_size)
    }

    /// Hex-step distance between two cells.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let steps = (dq.abs() + dr.abs() + (dq + dr).abs()) / 2;
        u32::try_from(steps).unwrap_or(u32::MAX)
    }
}

/// Chunk coordinate (identifies a chunk in chunk-space).
///
/// Ordered lexicographically by `(cx, cy)`, which is also the order chunks
/// are written to a world file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkPosition {
    /// Horizontal chunk index.
    pub cx: i32,
    /// Vertical chunk index.
    pub cy: i32,
}

impl ChunkPosition {
    /// Creates a new chunk position.
    #[inline]
    #[must_use]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Axial coordinate of local offset `(0, 0)` in this chunk.
    ///
    /// Saturates at the edge of the `i32` cell space; use
    /// [`ChunkPosition::checked_origin`] to tell such chunks apart.
    #[inline]
    #[must_use]
    pub const fn origin(self, chunk_width: i32, chunk_height: i32) -> AxialCoord {
        AxialCoord::new(
            self.cx.saturating_mul(chunk_width),
            self.cy.saturating_mul(chunk_height),
        )
    }

    /// Origin of this chunk, or `None` if any of its cells falls outside
    /// the `i32` cell space.
    #[must_use]
    pub fn checked_origin(self, chunk_width: i32, chunk_height: i32) -> Option<AxialCoord> {
        let q = self.cx.checked_mul(chunk_width)?;
        let r = self.cy.checked_mul(chunk_height)?;
        q.checked_add(chunk_width - 1)?;
        r.checked_add(chunk_height - 1)?;
        Some(AxialCoord::new(q, r))
    }
}

/// Position of a cell inside its chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalOffset {
    /// Column within the chunk, `0..width`.
    pub lx: usize,
    /// Row within the chunk, `0..height`.
    pub ly: usize,
}

impl LocalOffset {
    /// Creates a new local offset.
    #[inline]
    #[must_use]
    pub const fn new(lx: usize, ly: usize) -> Self {
        Self { lx, ly }
    }
}

/// Flat-top axial to pixel transform.
///
/// `x = size * 1.5 * q`, `y = size * (sqrt(3)/2 * q + sqrt(3) * r)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn axial_to_pixel(coord: AxialCoord, cell_size: f32) -> (f32, f32) {
    let q = coord.q as f32;
    let r = coord.r as f32;
    let x = cell_size * 1.5 * q;
    let y = cell_size * (SQRT_3 / 2.0 * q + SQRT_3 * r);
    (x, y)
}

/// Pixel to axial transform with cube rounding.
#[must_use]
pub fn pixel_to_axial(x: f32, y: f32, cell_size: f32) -> AxialCoord {
    let q = (2.0 / 3.0 * x) / cell_size;
    let r = (-1.0 / 3.0 * x + SQRT_3 / 3.0 * y) / cell_size;
    axial_round(q, r)
}

/// Rounds fractional axial coordinates to the nearest hex.
///
/// Rounding q, r and s independently can break `q + r + s == 0`; the
/// component with the largest rounding error is rebuilt from the other two.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn axial_round(q: f32, r: f32) -> AxialCoord {
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    AxialCoord::new(rq as i32, rr as i32)
}

/// Splits a global coordinate into its chunk and the offset within it.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn world_to_chunk(
    coord: AxialCoord,
    chunk_width: i32,
    chunk_height: i32,
) -> (ChunkPosition, LocalOffset) {
    debug_assert!(chunk_width > 0 && chunk_height > 0);
    let pos = ChunkPosition::new(
        coord.q.div_euclid(chunk_width),
        coord.r.div_euclid(chunk_height),
    );
    let local = LocalOffset::new(
        coord.q.rem_euclid(chunk_width) as usize,
        coord.r.rem_euclid(chunk_height) as usize,
    );
    (pos, local)
}

/// Inverse of [`world_to_chunk`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn chunk_to_world(
    pos: ChunkPosition,
    local: LocalOffset,
    chunk_width: i32,
    chunk_height: i32,
) -> AxialCoord {
    let origin = pos.origin(chunk_width, chunk_height);
    AxialCoord::new(
        origin.q.saturating_add(local.lx as i32),
        origin.r.saturating_add(local.ly as i32),
    )
}
