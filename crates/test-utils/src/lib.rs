//! Test helpers shared across the tile seeder workspace.
//!
//! - [`assert_approx_eq!`] and [`assert_lonlat_approx_eq!`] for projection math
//! - [`fixtures`]: reference bounding boxes and their expected tile counts
//! - [`paths`]: scratch output directories, sized tile files, tile listings

pub mod fixtures;
pub mod paths;

pub use fixtures::*;
pub use paths::*;

/// Assert `|left - right| <= epsilon`, comparing as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        assert!(
            diff <= epsilon,
            "assertion failed: {} ≈ {} (diff {} > epsilon {})",
            left,
            right,
            diff,
            epsilon
        );
    }};
}

/// Assert two `(lon, lat)` pairs agree component-wise within `epsilon` degrees.
#[macro_export]
macro_rules! assert_lonlat_approx_eq {
    (($lon1:expr, $lat1:expr), ($lon2:expr, $lat2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($lon1, $lon2, $epsilon);
        $crate::assert_approx_eq!($lat1, $lat2, $epsilon);
    }};
}
