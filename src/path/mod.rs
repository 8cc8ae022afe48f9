//! Ring streams and closed path encodings.

mod close;

pub use close::{close_rings, split_rings};

use serde::{Deserialize, Serialize};

use crate::math::Point2;

/// One vertex of a raw ring stream.
///
/// Rings are concatenated; `ring_start` marks the first vertex of each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawVertex {
    pub point: Point2,
    pub ring_start: bool,
}

impl RawVertex {
    /// Creates a vertex that opens a new ring.
    #[must_use]
    pub fn start(point: Point2) -> Self {
        Self {
            point,
            ring_start: true,
        }
    }

    /// Creates a vertex that continues the current ring.
    #[must_use]
    pub fn next(point: Point2) -> Self {
        Self {
            point,
            ring_start: false,
        }
    }
}

/// Per-vertex role in a closed path, with the conventional numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PathCode {
    MoveTo = 1,
    LineTo = 2,
    ClosePoly = 79,
}

/// A drawing instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(Point2),
    LineTo(Point2),
    ClosePath,
}

/// Closed rings as parallel vertex and code arrays.
///
/// Each ring is `MoveTo`, zero or more `LineTo`, then `ClosePoly` on a copy
/// of the ring's first vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClosedRings {
    pub vertices: Vec<Point2>,
    pub codes: Vec<PathCode>,
}

impl ClosedRings {
    /// Returns the number of vertices, including repeated closers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if there are no rings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the number of rings.
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.codes.iter().filter(|&&c| c == PathCode::MoveTo).count()
    }

    /// Lowers the vertex/code arrays to drawing instructions.
    #[must_use]
    pub fn ops(&self) -> Vec<PathOp> {
        self.vertices
            .iter()
            .zip(&self.codes)
            .map(|(&p, code)| match code {
                PathCode::MoveTo => PathOp::MoveTo(p),
                PathCode::LineTo => PathOp::LineTo(p),
                PathCode::ClosePoly => PathOp::ClosePath,
            })
            .collect()
    }
}
