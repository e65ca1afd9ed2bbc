//! Enumeration of the tiles covering a bounding box.

use std::ops::RangeInclusive;

use projection::{SphericalMercator, DEFAULT_TILE_SIZE};
use tile_common::{BoundingBox, TileCoord, ZoomRange};

/// Inclusive rectangle of tile indices at one zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u32,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    pub fn columns(&self) -> u64 {
        (self.max_x - self.min_x) as u64 + 1
    }

    pub fn rows(&self) -> u64 {
        (self.max_y - self.min_y) as u64 + 1
    }

    /// Never zero; a zoom with no tiles has no range at all.
    pub fn tile_count(&self) -> u64 {
        self.columns() * self.rows()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.z == self.zoom
            && (self.min_x..=self.max_x).contains(&coord.x)
            && (self.min_y..=self.max_y).contains(&coord.y)
    }
}

/// Lists every tile intersecting a bounding box, zoom by zoom.
///
/// Order is zoom ascending, then x ascending, then y ascending. Tiles are
/// produced lazily, so a large pyramid never sits in memory at once.
#[derive(Debug, Clone)]
pub struct TileEnumerator {
    bbox: BoundingBox,
    zoom: ZoomRange,
    projection: SphericalMercator,
}

impl TileEnumerator {
    pub fn new(bbox: BoundingBox, zoom: ZoomRange) -> Self {
        Self::with_tile_size(bbox, zoom, DEFAULT_TILE_SIZE)
    }

    pub fn with_tile_size(bbox: BoundingBox, zoom: ZoomRange, tile_size: u32) -> Self {
        Self {
            bbox,
            zoom,
            projection: SphericalMercator::new(zoom.max() + 1, tile_size),
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn zoom(&self) -> ZoomRange {
        self.zoom
    }

    /// Tile indices covering the box at `zoom`, clipped to the tile grid.
    ///
    /// `None` when the box misses the grid entirely or `zoom` is outside the
    /// enumerated range.
    pub fn range_at(&self, zoom: u32) -> Option<TileRange> {
        if zoom < self.zoom.min() || zoom > self.zoom.max() {
            return None;
        }

        let (left, top) = self
            .projection
            .pixel_for_lonlat(self.bbox.north_west(), zoom)
            .ok()?;
        let (right, bottom) = self
            .projection
            .pixel_for_lonlat(self.bbox.south_east(), zoom)
            .ok()?;

        let tile_size = self.projection.tile_size() as f64;
        let last = TileCoord::tiles_per_side(zoom) as i64 - 1;
        let clip = |low: f64, high: f64| -> Option<(u32, u32)> {
            let low = ((low / tile_size).floor() as i64).max(0);
            let high = ((high / tile_size).floor() as i64).min(last);
            (low <= high).then_some((low as u32, high as u32))
        };

        let (min_x, max_x) = clip(left, right)?;
        let (min_y, max_y) = clip(top, bottom)?;
        Some(TileRange {
            zoom,
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Number of tiles at `zoom`.
    pub fn tiles_at(&self, zoom: u32) -> u64 {
        self.range_at(zoom).map_or(0, |range| range.tile_count())
    }

    /// Number of tiles over the whole zoom range.
    pub fn total(&self) -> u64 {
        self.zoom.iter().map(|z| self.tiles_at(z)).sum()
    }

    pub fn iter(&self) -> Tiles<'_> {
        Tiles {
            enumerator: self,
            zooms: self.zoom.iter(),
            cursor: None,
        }
    }
}

impl<'a> IntoIterator for &'a TileEnumerator {
    type Item = TileCoord;
    type IntoIter = Tiles<'a>;

    fn into_iter(self) -> Tiles<'a> {
        self.iter()
    }
}

/// Lazy iterator over a [`TileEnumerator`].
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    enumerator: &'a TileEnumerator,
    zooms: RangeInclusive<u32>,
    /// Current range and the next (x, y) to yield in it
    cursor: Option<(TileRange, u32, u32)>,
}

impl Iterator for Tiles<'_> {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        loop {
            if let Some((range, x, y)) = &mut self.cursor {
                if *x <= range.max_x {
                    let coord = TileCoord::new(range.zoom, *x, *y);
                    if *y < range.max_y {
                        *y += 1;
                    } else {
                        *y = range.min_y;
                        *x += 1;
                    }
                    return Some(coord);
                }
            }

            let zoom = self.zooms.next()?;
            self.cursor = self
                .enumerator
                .range_at(zoom)
                .map(|range| (range, range.min_x, range.min_y));
        }
    }
}
