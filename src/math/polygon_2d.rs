use super::{Point2, TOLERANCE};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. The ring is
/// treated as implicitly closed; a duplicated closing point adds nothing.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive when the vertices are in counter-clockwise order.
#[must_use]
pub fn orient_2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Rotates a closed ring so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[cfg(test)]
#[must_use]
pub(crate) fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}
