//! Triangle meshes over scattered points.

mod triangulate;

pub use triangulate::Triangulate;

use crate::math::Point2;

/// A set of points plus counter-clockwise triangles indexing into them.
///
/// Every triangle has three distinct, in-range indices and nonzero area.
/// Built once per contour request and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    points: Vec<Point2>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    pub(crate) fn from_parts(points: Vec<Point2>, triangles: Vec<[usize; 3]>) -> Self {
        Self { points, triangles }
    }

    /// Returns the mesh vertices.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Returns the triangles as counter-clockwise index triples.
    #[must_use]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the three corner positions of triangle `index`, or `None` if
    /// there is no such triangle.
    #[must_use]
    pub fn corners(&self, index: usize) -> Option<[Point2; 3]> {
        let &[a, b, c] = self.triangles.get(index)?;
        Some([self.points[a], self.points[b], self.points[c]])
    }
}
