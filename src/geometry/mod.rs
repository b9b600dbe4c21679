//! Polygon geometry: parsing ring text into a validated, closed ring and
//! projecting it back out as WKT, coordinate lists and planar area.

pub mod error;
pub mod parser;
pub mod polygon;

pub use error::GeometryError;
pub use polygon::{Coordinate, Polygon};

/// Spatial reference every stored plot uses (WGS 84 longitude/latitude).
pub const SRID: i32 = 4326;

/// Smallest valid ring: three distinct vertices plus the closing point.
pub const MIN_RING_POINTS: usize = 4;
