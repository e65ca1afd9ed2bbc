//! Tile coordinates and zoom ranges for the XYZ tile grid.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{TileError, TileResult};

/// Deepest zoom level supported; keeps tile indices within `u32`.
pub const MAX_ZOOM: u32 = 30;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y), counted from the north edge
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along each axis at `zoom`.
    pub fn tiles_per_side(zoom: u32) -> u64 {
        1u64 << zoom
    }

    /// Whether x and y fall inside the `2^z × 2^z` grid.
    pub fn is_valid(&self) -> bool {
        self.z <= MAX_ZOOM && {
            let side = Self::tiles_per_side(self.z);
            (self.x as u64) < side && (self.y as u64) < side
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// An inclusive range of zoom levels, `min ..= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoomRange {
    min: u32,
    max: u32,
}

impl ZoomRange {
    /// Create a zoom range, rejecting `max < min` and zooms past [`MAX_ZOOM`].
    pub fn new(min: u32, max: u32) -> TileResult<Self> {
        if max < min {
            return Err(TileError::InvalidZoomRange { min, max });
        }
        if max > MAX_ZOOM {
            return Err(TileError::ZoomOutOfRange {
                zoom: max,
                levels: MAX_ZOOM + 1,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Iterate over every zoom in the range, ascending.
    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.min..=self.max
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0, max: 18 }
    }
}
