use thiserror::Error;

/// Reasons a geometry string is rejected. Every variant is a client input
/// problem; none of them indicate a server fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("geometry is empty")]
    Empty,

    #[error("unsupported geometry type '{0}', expected POLYGON")]
    UnsupportedType(String),

    #[error("unsupported SRID {0}, expected 4326")]
    UnsupportedSrid(String),

    #[error("mismatched parentheses in geometry")]
    UnbalancedParentheses,

    #[error("only a single outer ring is supported")]
    MultipleRings,

    #[error("coordinate pair {index} ('{text}') must be two numbers separated by whitespace")]
    InvalidPair { index: usize, text: String },

    #[error("'{0}' is not a finite number")]
    InvalidNumber(String),

    #[error("ring needs at least {min} coordinate pairs, got {count}")]
    TooFewPoints { count: usize, min: usize },

    #[error("ring is not closed: first and last coordinate pairs differ")]
    UnclosedRing,
}
