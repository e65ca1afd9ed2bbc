//! Coordinate transformations between geographic and tile pixel space.
//!
//! Implements the spherical Web-Mercator projection from scratch without
//! external dependencies.

pub mod mercator;

pub use mercator::{
    mercator_y, SphericalMercator, ZoomLevelSpec, DEFAULT_TILE_SIZE, MAX_SINE_LATITUDE,
};
