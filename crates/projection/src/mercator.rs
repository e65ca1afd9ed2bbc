//! Spherical (Web) Mercator projection.
//!
//! Converts between geographic coordinates (degrees) and global pixel
//! coordinates at a given zoom level. Pixel space has its origin at the
//! north-west corner of the world: x grows eastward, y grows southward, and
//! the world is `tile_size * 2^zoom` pixels wide and tall.
//!
//! Per-zoom constants are computed once in [`SphericalMercator::new`] and
//! reused for every transform at that zoom.

use std::f64::consts::PI;

use tile_common::{BoundingBox, GeoPoint, TileCoord, TileError, TileResult};

/// Tile edge length in pixels used by XYZ tile pyramids.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Bound applied to `sin(latitude)` so the Mercator y never diverges at the poles.
pub const MAX_SINE_LATITUDE: f64 = 0.9999;

/// Mercator northing of a latitude on the unit sphere.
///
/// `sin(lat)` is clamped to ±[`MAX_SINE_LATITUDE`], so the poles map to a
/// finite value instead of infinity.
pub fn mercator_y(lat_deg: f64) -> f64 {
    let sine = lat_deg
        .to_radians()
        .sin()
        .clamp(-MAX_SINE_LATITUDE, MAX_SINE_LATITUDE);
    0.5 * ((1.0 + sine) / (1.0 - sine)).ln()
}

/// Precomputed constants for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevelSpec {
    pub zoom: u32,
    /// Width (and height) of the whole world in pixels
    pub globe_pixels: f64,
    /// Pixel offset of the prime meridian and the equator
    pub half_globe_pixels: f64,
    pub pixels_per_degree: f64,
    pub pixels_per_radian: f64,
}

impl ZoomLevelSpec {
    fn new(zoom: u32, globe_pixels: f64) -> Self {
        Self {
            zoom,
            globe_pixels,
            half_globe_pixels: globe_pixels / 2.0,
            pixels_per_degree: globe_pixels / 360.0,
            pixels_per_radian: globe_pixels / (2.0 * PI),
        }
    }
}

/// Spherical Mercator projection over a fixed number of zoom levels.
#[derive(Debug, Clone)]
pub struct SphericalMercator {
    tile_size: u32,
    specs: Vec<ZoomLevelSpec>,
}

impl SphericalMercator {
    /// Build specs for zooms `0..levels` with `tile_size` pixel tiles.
    pub fn new(levels: u32, tile_size: u32) -> Self {
        let base = tile_size as f64;
        let specs = (0..levels)
            .map(|zoom| ZoomLevelSpec::new(zoom, base * 2f64.powi(zoom as i32)))
            .collect();

        Self { tile_size, specs }
    }

    /// Build specs for zooms `0..levels` with 256 pixel tiles.
    pub fn with_levels(levels: u32) -> Self {
        Self::new(levels, DEFAULT_TILE_SIZE)
    }

    /// Number of zoom levels this projection was built for.
    pub fn levels(&self) -> u32 {
        self.specs.len() as u32
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Constants for `zoom`, or `ZoomOutOfRange` if it was not precomputed.
    pub fn spec(&self, zoom: u32) -> TileResult<&ZoomLevelSpec> {
        self.specs
            .get(zoom as usize)
            .ok_or(TileError::ZoomOutOfRange {
                zoom,
                levels: self.levels(),
            })
    }

    /// Project a geographic point to global pixel coordinates, rounded to
    /// the nearest pixel.
    pub fn pixel_for_lonlat(&self, point: GeoPoint, zoom: u32) -> TileResult<(f64, f64)> {
        let spec = self.spec(zoom)?;

        let px = (spec.half_globe_pixels + point.lon * spec.pixels_per_degree).round();
        let py = (spec.half_globe_pixels - mercator_y(point.lat) * spec.pixels_per_radian).round();

        Ok((px, py))
    }

    /// Inverse of [`pixel_for_lonlat`](Self::pixel_for_lonlat).
    pub fn lonlat_for_pixel(&self, pixel: (f64, f64), zoom: u32) -> TileResult<GeoPoint> {
        let spec = self.spec(zoom)?;

        let lon = (pixel.0 - spec.half_globe_pixels) / spec.pixels_per_degree;
        let g = (pixel.1 - spec.half_globe_pixels) / -spec.pixels_per_radian;
        let lat = (2.0 * g.exp().atan() - 0.5 * PI).to_degrees();

        Ok(GeoPoint::new(lon, lat))
    }

    /// Geographic extent of a tile.
    ///
    /// The bottom-left pixel corner `(x, y + 1)` and top-right corner
    /// `(x + 1, y)` are projected back to degrees.
    pub fn tile_bounds(&self, coord: TileCoord) -> TileResult<BoundingBox> {
        let size = self.tile_size as f64;
        let bottom_left = (coord.x as f64 * size, (coord.y as f64 + 1.0) * size);
        let top_right = ((coord.x as f64 + 1.0) * size, coord.y as f64 * size);

        let sw = self.lonlat_for_pixel(bottom_left, coord.z)?;
        let ne = self.lonlat_for_pixel(top_right, coord.z)?;

        Ok(BoundingBox::new(sw.lon, sw.lat, ne.lon, ne.lat))
    }
}

impl Default for SphericalMercator {
    fn default() -> Self {
        Self::with_levels(18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_zoom_level_specs() {
        let proj = SphericalMercator::with_levels(3);
        assert_eq!(proj.levels(), 3);

        let z0 = proj.spec(0).unwrap();
        assert_eq!(z0.globe_pixels, 256.0);
        assert_eq!(z0.half_globe_pixels, 128.0);
        assert_approx_eq!(z0.pixels_per_degree, 256.0 / 360.0, 1e-12);
        assert_approx_eq!(z0.pixels_per_radian, 256.0 / (2.0 * PI), 1e-12);

        let z2 = proj.spec(2).unwrap();
        assert_eq!(z2.globe_pixels, 1024.0);
        assert_eq!(z2.zoom, 2);
    }

    #[test]
    fn test_custom_tile_size() {
        let proj = SphericalMercator::new(2, 512);
        assert_eq!(proj.tile_size(), 512);
        assert_eq!(proj.spec(1).unwrap().globe_pixels, 1024.0);
    }

    #[test]
    fn test_origin_maps_to_globe_center() {
        let proj = SphericalMercator::with_levels(4);
        for zoom in 0..4 {
            let (px, py) = proj.pixel_for_lonlat(GeoPoint::new(0.0, 0.0), zoom).unwrap();
            let half = proj.spec(zoom).unwrap().half_globe_pixels;
            assert_eq!(px, half);
            assert_eq!(py, half);
        }
    }

    #[test]
    fn test_antimeridian_maps_to_edges() {
        let proj = SphericalMercator::with_levels(2);
        let (west, _) = proj.pixel_for_lonlat(GeoPoint::new(-180.0, 0.0), 1).unwrap();
        let (east, _) = proj.pixel_for_lonlat(GeoPoint::new(180.0, 0.0), 1).unwrap();
        assert_eq!(west, 0.0);
        assert_eq!(east, 512.0);
    }

    #[test]
    fn test_poles_are_clamped() {
        let proj = SphericalMercator::with_levels(1);
        let (_, north) = proj.pixel_for_lonlat(GeoPoint::new(0.0, 90.0), 0).unwrap();
        let (_, south) = proj.pixel_for_lonlat(GeoPoint::new(0.0, -90.0), 0).unwrap();
        assert!(north.is_finite());
        assert!(south.is_finite());
        assert!(north < 0.0);
        assert!(south > 256.0);
        assert_approx_eq!(north + south, 256.0, 1.0);
    }

    #[test]
    fn test_mercator_y_is_odd_and_monotonic() {
        assert_eq!(mercator_y(0.0), 0.0);
        assert_approx_eq!(mercator_y(30.0), -mercator_y(-30.0), 1e-12);
        assert!(mercator_y(60.0) > mercator_y(30.0));
        assert_eq!(mercator_y(90.0), mercator_y(89.9999));
    }

    #[test]
    fn test_north_is_up() {
        let proj = SphericalMercator::with_levels(1);
        let (_, y_north) = proj.pixel_for_lonlat(GeoPoint::new(0.0, 45.0), 0).unwrap();
        let (_, y_south) = proj.pixel_for_lonlat(GeoPoint::new(0.0, -45.0), 0).unwrap();
        assert!(y_north < 128.0);
        assert!(y_south > 128.0);
    }

    #[test]
    fn test_zoom_out_of_range() {
        let proj = SphericalMercator::with_levels(3);
        let err = proj.pixel_for_lonlat(GeoPoint::new(0.0, 0.0), 3).unwrap_err();
        assert!(matches!(err, TileError::ZoomOutOfRange { zoom: 3, levels: 3 }));
        assert!(proj.lonlat_for_pixel((0.0, 0.0), 7).is_err());
    }

    #[test]
    fn test_lonlat_for_pixel_corners() {
        let proj = SphericalMercator::with_levels(1);
        let nw = proj.lonlat_for_pixel((0.0, 0.0), 0).unwrap();
        assert_approx_eq!(nw.lon, -180.0, 1e-9);
        assert_approx_eq!(nw.lat, 85.0511287798, 1e-6);

        let se = proj.lonlat_for_pixel((256.0, 256.0), 0).unwrap();
        assert_approx_eq!(se.lon, 180.0, 1e-9);
        assert_approx_eq!(se.lat, -85.0511287798, 1e-6);
    }

    #[test]
    fn test_tile_bounds() {
        let proj = SphericalMercator::with_levels(3);

        let world = proj.tile_bounds(TileCoord::new(0, 0, 0)).unwrap();
        assert_approx_eq!(world.west, -180.0, 1e-9);
        assert_approx_eq!(world.east, 180.0, 1e-9);
        assert_approx_eq!(world.north, 85.0511287798, 1e-6);
        assert_approx_eq!(world.south, -85.0511287798, 1e-6);

        // North-east quadrant at zoom 1
        let ne = proj.tile_bounds(TileCoord::new(1, 1, 0)).unwrap();
        assert_approx_eq!(ne.west, 0.0, 1e-9);
        assert_approx_eq!(ne.south, 0.0, 1e-9);
        assert_approx_eq!(ne.east, 180.0, 1e-9);
        assert!(ne.north > 85.0);
    }
}
