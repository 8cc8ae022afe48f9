use crate::math::Point2;

use super::{ClosedRings, PathCode, RawVertex};

/// Closes every ring of a raw vertex stream.
///
/// Ring boundaries are the vertices flagged `ring_start`, plus the end of the
/// stream. If the first vertex is not flagged, it still opens a ring. Each
/// ring's points are copied verbatim and followed by a duplicate of its first
/// point, so the output has one extra vertex per ring and no two rings share
/// a seam.
#[must_use]
pub fn close_rings(stream: &[RawVertex]) -> ClosedRings {
    let mut starts: Vec<usize> = stream
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.ring_start.then_some(i))
        .collect();
    if !stream.is_empty() && starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    let mut out = ClosedRings {
        vertices: Vec::with_capacity(stream.len() + starts.len()),
        codes: Vec::with_capacity(stream.len() + starts.len()),
    };

    let ends = starts.iter().skip(1).copied().chain(std::iter::once(stream.len()));
    for (lo, hi) in starts.iter().copied().zip(ends) {
        let ring = &stream[lo..hi];
        out.vertices.extend(ring.iter().map(|v| v.point));
        out.vertices.push(ring[0].point);

        out.codes.push(PathCode::MoveTo);
        out.codes
            .extend(std::iter::repeat_n(PathCode::LineTo, ring.len() - 1));
        out.codes.push(PathCode::ClosePoly);
    }

    out
}

/// Recovers the rings of closed output, dropping each repeated closer.
///
/// A ring runs from a `MoveTo` up to its `ClosePoly`; a ring cut short by a
/// new `MoveTo` or the end of the input is returned as far as it goes.
#[must_use]
pub fn split_rings(closed: &ClosedRings) -> Vec<Vec<Point2>> {
    let mut rings = Vec::new();
    let mut current: Vec<Point2> = Vec::new();

    for (&p, code) in closed.vertices.iter().zip(&closed.codes) {
        match code {
            PathCode::MoveTo => {
                if !current.is_empty() {
                    rings.push(std::mem::take(&mut current));
                }
                current.push(p);
            }
            PathCode::LineTo => current.push(p),
            PathCode::ClosePoly => {
                if !current.is_empty() {
                    rings.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        rings.push(current);
    }

    rings
}
