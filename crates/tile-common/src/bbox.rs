//! Geographic bounding box and point types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A geographic bounding box in degrees (EPSG:4326).
///
/// Zero-area boxes are legal; they simply cover few or no tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole Web-Mercator world, clipped at ±85 degrees latitude.
    pub fn world() -> Self {
        Self::new(-180.0, -85.0, 180.0, 85.0)
    }

    /// Parse a bbox string: "west,south,east,north".
    ///
    /// The string must hold exactly four numbers, taken in that order;
    /// anything between them is ignored, so `"-10 -10 10 10"`,
    /// `"-10, -10; 10, 10"` and `"[-10 -10] [10 10]"` parse the same way.
    /// Numbers are plain decimals with an optional leading minus.
    pub fn parse(s: &str) -> Result<Self, BboxParseError> {
        let numbers = decimal_numbers(s);
        if numbers.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, number) in values.iter_mut().zip(&numbers) {
            *slot = number
                .parse()
                .map_err(|_| BboxParseError::InvalidFormat(s.to_string()))?;
        }

        let bbox = Self::new(values[0], values[1], values[2], values[3]);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check the edges are finite, ordered and inside geographic range.
    pub fn validate(&self) -> Result<(), BboxParseError> {
        let edges = [self.west, self.south, self.east, self.north];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(BboxParseError::NotFinite(*self));
        }
        if self.west < -180.0 || self.east > 180.0 {
            return Err(BboxParseError::OutOfRange(format!(
                "longitude must lie within [-180, 180], got {} .. {}",
                self.west, self.east
            )));
        }
        if self.south < -90.0 || self.north > 90.0 {
            return Err(BboxParseError::OutOfRange(format!(
                "latitude must lie within [-90, 90], got {} .. {}",
                self.south, self.north
            )));
        }
        if self.west > self.east || self.south > self.north {
            return Err(BboxParseError::Inverted(*self));
        }
        Ok(())
    }

    /// North-west corner; the top-left of the box in pixel space.
    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.west, self.north)
    }

    /// South-east corner; the bottom-right of the box in pixel space.
    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.east, self.south)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.west
            && point.lon <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

impl FromStr for BoundingBox {
    type Err = BboxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Every `-?digits(.digits)?` run in `s`, left to right.
fn decimal_numbers(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut numbers = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let int_start = if bytes[i] == b'-' { i + 1 } else { i };
        let int_end = digits_from(int_start);
        if int_end == int_start {
            i += 1;
            continue;
        }

        let mut end = int_end;
        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits_from(end + 1);
            if frac_end > end + 1 {
                end = frac_end;
            }
        }
        numbers.push(&s[start..end]);
        i = end;
    }
    numbers
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Bbox has non-finite edges: {0}")]
    NotFinite(BoundingBox),

    #[error("Bbox out of range: {0}")]
    OutOfRange(String),

    #[error("Bbox edges are inverted: {0}")]
    Inverted(BoundingBox),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = BoundingBox::parse("-125.0,24.0,-66.0,50.0").unwrap();
        assert_eq!(bbox.west, -125.0);
        assert_eq!(bbox.south, 24.0);
        assert_eq!(bbox.east, -66.0);
        assert_eq!(bbox.north, 50.0);
    }

    #[test]
    fn test_corners() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(bbox.north_west(), GeoPoint::new(-10.0, 5.0));
        assert_eq!(bbox.south_east(), GeoPoint::new(10.0, -5.0));
        assert!(bbox.contains(GeoPoint::new(0.0, 0.0)));
        assert!(!bbox.contains(GeoPoint::new(11.0, 0.0)));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let bbox = BoundingBox::new(-12.5, 3.25, 7.0, 40.0);
        let parsed: BoundingBox = bbox.to_string().parse().unwrap();
        assert_eq!(parsed, bbox);
    }

    #[test]
    fn test_decimal_numbers() {
        assert_eq!(decimal_numbers("[-10 -10] [10.5 10]"), vec!["-10", "-10", "10.5", "10"]);
        assert_eq!(decimal_numbers("a-b 3. -.5 7-8"), vec!["3", "5", "7", "-8"]);
        assert!(decimal_numbers("west,south").is_empty());
    }
}
