//! Common test fixtures for tile pyramid tests.

/// Common bounding box definitions for testing.
pub mod bbox {
    use tile_common::BoundingBox;

    /// Web-Mercator world, clipped at ±85 degrees
    pub const WORLD: BoundingBox = BoundingBox {
        west: -180.0,
        south: -85.0,
        east: 180.0,
        north: 85.0,
    };

    /// Box straddling the origin, touching four quadrants
    pub const ORIGIN_20DEG: BoundingBox = BoundingBox {
        west: -10.0,
        south: -10.0,
        east: 10.0,
        north: 10.0,
    };

    /// Small box entirely inside the north-east quadrant
    pub const ALPS: BoundingBox = BoundingBox {
        west: 5.9,
        south: 45.8,
        east: 10.5,
        north: 47.8,
    };

    /// Single point (degenerate bbox)
    pub const POINT: BoundingBox = BoundingBox {
        west: 12.5,
        south: 41.9,
        east: 12.5,
        north: 41.9,
    };
}

/// Zoom ranges paired with their expected tile counts for [`bbox::ORIGIN_20DEG`].
pub mod zoom {
    /// (zoom, tiles at that zoom) for the origin box
    pub const ORIGIN_20DEG_COUNTS: [(u32, usize); 3] = [(0, 1), (1, 4), (2, 4)];

    /// Byte size of a blank tile written by the reference renderer
    pub const BLANK_TILE_BYTES: u64 = 103;
}
