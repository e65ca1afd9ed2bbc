//! Round-trip and consistency tests for the spherical Mercator projection.

use projection::SphericalMercator;
use test_utils::{assert_approx_eq, assert_lonlat_approx_eq};
use tile_common::{GeoPoint, TileCoord};

const LEVELS: u32 = 19;

/// Longitudes sampled across the whole world.
fn sample_longitudes() -> Vec<f64> {
    (0..=72).map(|i| -180.0 + i as f64 * 5.0).collect()
}

/// Latitudes sampled strictly inside (-85, 85), including points near the edges.
fn sample_latitudes() -> Vec<f64> {
    let mut lats: Vec<f64> = (-16..=16).map(|i| i as f64 * 5.25).collect();
    lats.extend([-84.99, -84.5, -60.123, -0.001, 0.001, 33.333, 84.5, 84.99]);
    lats
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_within_one_pixel() {
    let proj = SphericalMercator::with_levels(LEVELS);

    for zoom in 0..LEVELS {
        let spec = *proj.spec(zoom).unwrap();
        // One pixel expressed in degrees of longitude
        let lon_tolerance = 1.0 / spec.pixels_per_degree;

        for &lon in &sample_longitudes() {
            for &lat in &sample_latitudes() {
                let point = GeoPoint::new(lon, lat);
                let pixel = proj.pixel_for_lonlat(point, zoom).unwrap();
                let back = proj.lonlat_for_pixel(pixel, zoom).unwrap();

                // One pixel of Mercator y expressed in degrees of latitude here
                let lat_tolerance = (lat.to_radians().cos() / spec.pixels_per_radian).to_degrees();

                assert!(
                    (back.lon - lon).abs() <= lon_tolerance,
                    "lon round trip failed at z{}: {} -> {:?} -> {}",
                    zoom,
                    lon,
                    pixel,
                    back.lon
                );
                assert!(
                    (back.lat - lat).abs() <= lat_tolerance,
                    "lat round trip failed at z{}: {} -> {:?} -> {} (tolerance {})",
                    zoom,
                    lat,
                    pixel,
                    back.lat,
                    lat_tolerance
                );
            }
        }
    }
}

#[test]
fn test_integer_pixels_reproject_exactly() {
    let proj = SphericalMercator::with_levels(6);

    for zoom in 0..6 {
        let globe = proj.spec(zoom).unwrap().globe_pixels;
        let step = globe / 8.0;
        for i in 0..=8 {
            for j in 1..8 {
                let pixel = (i as f64 * step, j as f64 * step);
                let point = proj.lonlat_for_pixel(pixel, zoom).unwrap();
                let again = proj.pixel_for_lonlat(point, zoom).unwrap();
                assert_eq!(again, pixel, "zoom {} pixel {:?}", zoom, pixel);
            }
        }
    }
}

// ============================================================================
// Tile bounds
// ============================================================================

#[test]
fn test_child_tiles_share_parent_edges() {
    let proj = SphericalMercator::with_levels(8);
    let parent = proj.tile_bounds(TileCoord::new(5, 17, 11)).unwrap();

    let nw_child = proj.tile_bounds(TileCoord::new(6, 34, 22)).unwrap();
    let se_child = proj.tile_bounds(TileCoord::new(6, 35, 23)).unwrap();

    assert_lonlat_approx_eq!((nw_child.west, nw_child.north), (parent.west, parent.north), 1e-9);
    assert_lonlat_approx_eq!((se_child.east, se_child.south), (parent.east, parent.south), 1e-9);
    assert_approx_eq!(nw_child.east, se_child.west, 1e-9);
}

#[test]
fn test_tile_bounds_are_ordered() {
    let proj = SphericalMercator::with_levels(4);
    for y in 0..8 {
        for x in 0..8 {
            let bounds = proj.tile_bounds(TileCoord::new(3, x, y)).unwrap();
            assert!(bounds.west < bounds.east);
            assert!(bounds.south < bounds.north);
        }
    }
}
