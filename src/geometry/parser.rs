// Accepted inputs, all describing exactly one ring:
//
//   x y, x y, x y, x y
//   (x y, x y, x y, x y)
//   POLYGON ((x y, x y, x y, x y))
//   SRID=4326;POLYGON((x y, x y, x y, x y))

use super::{Coordinate, GeometryError, SRID};

/// Split geometry text into ring coordinates. Closure and point count are
/// checked by `Polygon::from_ring`.
pub fn parse_ring(text: &str) -> Result<Vec<Coordinate>, GeometryError> {
    let text = strip_srid(text.trim())?;
    if text.is_empty() {
        return Err(GeometryError::Empty);
    }

    let ring = if text.starts_with(|c: char| c.is_ascii_alphabetic()) {
        let keyword_end = text
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (keyword, rest) = text.split_at(keyword_end);
        if !keyword.eq_ignore_ascii_case("POLYGON") {
            return Err(GeometryError::UnsupportedType(keyword.to_string()));
        }
        let rings = strip_parens(rest)?;
        if !rings.starts_with('(') {
            return Err(GeometryError::UnbalancedParentheses);
        }
        single_ring(rings)?
    } else if text.starts_with('(') {
        let inner = strip_parens(text)?;
        if inner.starts_with('(') {
            single_ring(inner)?
        } else {
            inner
        }
    } else {
        text
    };

    if ring.contains(['(', ')']) {
        return Err(GeometryError::UnbalancedParentheses);
    }
    if ring.is_empty() {
        return Err(GeometryError::Empty);
    }

    ring.split(',')
        .enumerate()
        .map(|(index, pair)| parse_pair(index, pair))
        .collect()
}

fn strip_srid(text: &str) -> Result<&str, GeometryError> {
    let Some(prefix) = text.get(..5) else {
        return Ok(text);
    };
    if !prefix.eq_ignore_ascii_case("SRID=") {
        return Ok(text);
    }
    let rest = &text[5..];
    let (srid, geometry) = rest
        .split_once(';')
        .ok_or_else(|| GeometryError::UnsupportedSrid(rest.to_string()))?;
    match srid.trim().parse::<i32>() {
        Ok(value) if value == SRID => Ok(geometry.trim()),
        _ => Err(GeometryError::UnsupportedSrid(srid.trim().to_string())),
    }
}

fn strip_parens(text: &str) -> Result<&str, GeometryError> {
    text.trim()
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .map(str::trim)
        .ok_or(GeometryError::UnbalancedParentheses)
}

/// `(ring)` -> `ring`, rejecting `(outer), (hole)`.
fn single_ring(rings: &str) -> Result<&str, GeometryError> {
    let ring = strip_parens(rings)?;
    if let Some(close) = ring.find(')') {
        if ring[close + 1..].trim_start().starts_with(',') {
            return Err(GeometryError::MultipleRings);
        }
        return Err(GeometryError::UnbalancedParentheses);
    }
    Ok(ring)
}

fn parse_pair(index: usize, pair: &str) -> Result<Coordinate, GeometryError> {
    let tokens: Vec<&str> = pair.split_whitespace().collect();
    let [x, y] = tokens.as_slice() else {
        return Err(GeometryError::InvalidPair {
            index,
            text: pair.trim().to_string(),
        });
    };
    Ok(Coordinate::new(parse_number(x)?, parse_number(y)?))
}

fn parse_number(token: &str) -> Result<f64, GeometryError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeometryError::InvalidNumber(token.to_string()))
}
