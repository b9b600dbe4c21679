use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{parser, GeometryError, MIN_RING_POINTS, SRID};

/// One (longitude, latitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single-ring polygon in SRID 4326. The ring is always closed and holds
/// at least four points; there is no way to build one that is not.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<Coordinate>,
}

impl Polygon {
    /// Parse ring text (`"x y, x y, ..."`) or one of the accepted WKT forms.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let ring = parser::parse_ring(text)?;
        Self::from_ring(ring)
    }

    /// Validate an already tokenized ring.
    pub fn from_ring(ring: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if ring.len() < MIN_RING_POINTS {
            return Err(GeometryError::TooFewPoints {
                count: ring.len(),
                min: MIN_RING_POINTS,
            });
        }
        if ring.first() != ring.last() {
            return Err(GeometryError::UnclosedRing);
        }
        Ok(Self { ring })
    }

    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    /// Planar area in the geometry's native units (square degrees).
    /// Orientation does not matter.
    pub fn area(&self) -> f64 {
        let twice: f64 = self
            .ring
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum();
        (twice / 2.0).abs()
    }

    /// Ring vertices as `[lon, lat]` pairs, closing point included.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.ring.iter().map(|c| [c.x, c.y]).collect()
    }

    /// `POLYGON ((x y, ...))`
    pub fn to_wkt(&self) -> String {
        let pairs: Vec<String> = self
            .ring
            .iter()
            .map(|c| format!("{} {}", c.x, c.y))
            .collect();
        format!("POLYGON (({}))", pairs.join(", "))
    }

    /// `SRID=4326;POLYGON ((x y, ...))`
    pub fn to_ewkt(&self) -> String {
        format!("SRID={};{}", SRID, self.to_wkt())
    }
}

impl FromStr for Polygon {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ewkt())
    }
}
