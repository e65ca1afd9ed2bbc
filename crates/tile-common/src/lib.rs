//! Common types shared by the tile pyramid crates and the seeder service.

pub mod bbox;
pub mod error;
pub mod tile;

pub use bbox::{BboxParseError, BoundingBox, GeoPoint};
pub use error::{TileError, TileResult};
pub use tile::{TileCoord, ZoomRange, MAX_ZOOM};
