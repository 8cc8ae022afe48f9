use spade::{DelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation as _};

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::orient_2d;
use crate::math::{Point2, TOLERANCE};

use super::Triangulation;

/// Builds a [`Triangulation`] over a point set.
///
/// Uses the caller's connectivity when given, otherwise computes a Delaunay
/// triangulation. An optional mask removes triangles after construction.
#[derive(Debug)]
pub struct Triangulate<'a> {
    points: &'a [Point2],
    triangles: Option<&'a [[usize; 3]]>,
    mask: Option<&'a [bool]>,
}

impl<'a> Triangulate<'a> {
    /// Creates a new `Triangulate` operation over `points`.
    #[must_use]
    pub fn new(points: &'a [Point2]) -> Self {
        Self {
            points,
            triangles: None,
            mask: None,
        }
    }

    /// Uses explicit triangle connectivity instead of Delaunay.
    #[must_use]
    pub fn with_triangles(mut self, triangles: &'a [[usize; 3]]) -> Self {
        self.triangles = Some(triangles);
        self
    }

    /// Masks out triangles; `true` entries are removed from the mesh.
    #[must_use]
    pub fn with_mask(mut self, mask: &'a [bool]) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::DegenerateGeometry` if fewer than 3 points are
    /// given, a coordinate is not finite, the points are all collinear, an
    /// explicit triangle is out of range or has zero area, or the mask length
    /// does not match the triangle count.
    pub fn execute(&self) -> Result<Triangulation> {
        if self.points.len() < 3 {
            return Err(GeometryError::DegenerateGeometry(format!(
                "at least 3 points are required, got {}",
                self.points.len()
            ))
            .into());
        }
        if let Some(index) = self
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(GeometryError::DegenerateGeometry(format!(
                "point {index} has a non-finite coordinate"
            ))
            .into());
        }

        let triangles = match self.triangles {
            Some(explicit) => self.validate_explicit(explicit)?,
            None => self.delaunay()?,
        };
        let triangles = self.apply_mask(triangles)?;

        tracing::trace!(
            points = self.points.len(),
            triangles = triangles.len(),
            "triangulated"
        );

        Ok(Triangulation::from_parts(self.points.to_vec(), triangles))
    }

    fn validate_explicit(&self, explicit: &[[usize; 3]]) -> Result<Vec<[usize; 3]>> {
        let n = self.points.len();
        let mut triangles = Vec::with_capacity(explicit.len());
        for (t, &[a, b, c]) in explicit.iter().enumerate() {
            if a >= n || b >= n || c >= n {
                return Err(GeometryError::DegenerateGeometry(format!(
                    "triangle {t} references a vertex outside 0..{n}"
                ))
                .into());
            }
            if a == b || b == c || a == c {
                return Err(GeometryError::DegenerateGeometry(format!(
                    "triangle {t} repeats a vertex"
                ))
                .into());
            }
            let area = orient_2d(&self.points[a], &self.points[b], &self.points[c]);
            if area.abs() <= TOLERANCE {
                return Err(GeometryError::DegenerateGeometry(format!(
                    "triangle {t} has zero area"
                ))
                .into());
            }
            // Keep every triangle counter-clockwise.
            triangles.push(if area > 0.0 { [a, b, c] } else { [a, c, b] });
        }
        Ok(triangles)
    }

    fn delaunay(&self) -> Result<Vec<[usize; 3]>> {
        let mut dt = DelaunayTriangulation::<SpadePoint2<f64>>::new();
        // Spade vertex index -> first input index at that position.
        let mut input_index: Vec<usize> = Vec::with_capacity(self.points.len());

        for (i, p) in self.points.iter().enumerate() {
            let handle = dt
                .insert(SpadePoint2::new(p.x, p.y))
                .map_err(|e: InsertionError| {
                    GeometryError::DegenerateGeometry(format!("point {i}: {e}"))
                })?;
            if handle.index() == input_index.len() {
                input_index.push(i);
            }
        }

        let triangles: Vec<[usize; 3]> = dt
            .inner_faces()
            .map(|face| {
                let [a, b, c] = face.vertices();
                [
                    input_index[a.fix().index()],
                    input_index[b.fix().index()],
                    input_index[c.fix().index()],
                ]
            })
            .collect();

        if triangles.is_empty() {
            return Err(GeometryError::DegenerateGeometry(
                "points are collinear, no triangle can be formed".to_owned(),
            )
            .into());
        }
        Ok(triangles)
    }

    fn apply_mask(&self, triangles: Vec<[usize; 3]>) -> Result<Vec<[usize; 3]>> {
        let Some(mask) = self.mask else {
            return Ok(triangles);
        };
        if mask.len() != triangles.len() {
            return Err(GeometryError::DegenerateGeometry(format!(
                "mask has {} entries for {} triangles",
                mask.len(),
                triangles.len()
            ))
            .into());
        }
        Ok(triangles
            .into_iter()
            .zip(mask)
            .filter_map(|(tri, &hidden)| (!hidden).then_some(tri))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TrifillError;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_square_with_center() -> Vec<Point2> {
        vec![
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, 1.0),
            p(0.0, 1.0),
            p(0.5, 0.5),
        ]
    }

    fn is_degenerate(result: Result<Triangulation>) -> bool {
        matches!(
            result,
            Err(TrifillError::Geometry(GeometryError::DegenerateGeometry(_)))
        )
    }

    fn total_area(mesh: &Triangulation) -> f64 {
        (0..mesh.triangle_count())
            .map(|t| {
                let [a, b, c] = mesh.corners(t).unwrap();
                orient_2d(&a, &b, &c) * 0.5
            })
            .sum()
    }

    #[test]
    fn delaunay_square_with_center() {
        let points = unit_square_with_center();
        let mesh = Triangulate::new(&points).execute().unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        assert!((total_area(&mesh) - 1.0).abs() < TOLERANCE);
        for tri in mesh.triangles() {
            assert!(tri.contains(&4), "every triangle touches the center");
        }
    }

    #[test]
    fn corners_out_of_range_is_none() {
        let points = unit_square_with_center();
        let mesh = Triangulate::new(&points).execute().unwrap();
        assert!(mesh.corners(mesh.triangle_count() - 1).is_some());
        assert!(mesh.corners(mesh.triangle_count()).is_none());
    }

    #[test]
    fn delaunay_triangles_are_ccw() {
        let points = vec![p(0.0, 0.0), p(3.0, 0.5), p(1.0, 2.0), p(2.5, 3.0), p(-1.0, 1.5)];
        let mesh = Triangulate::new(&points).execute().unwrap();
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.corners(t).unwrap();
            assert!(orient_2d(&a, &b, &c) > 0.0);
        }
    }

    #[test]
    fn duplicate_points_map_to_first_occurrence() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 0.0)];
        let mesh = Triangulate::new(&points).execute().unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.triangles()[0].contains(&3));
    }

    #[test]
    fn too_few_points() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0)];
        assert!(is_degenerate(Triangulate::new(&points).execute()));
    }

    #[test]
    fn collinear_points() {
        let points = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0), p(3.0, 3.0)];
        assert!(is_degenerate(Triangulate::new(&points).execute()));
    }

    #[test]
    fn non_finite_point() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(f64::NAN, 1.0)];
        assert!(is_degenerate(Triangulate::new(&points).execute()));
    }

    #[test]
    fn explicit_triangles_are_reoriented() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let tris = [[0, 2, 1], [0, 2, 3]];
        let mesh = Triangulate::new(&points)
            .with_triangles(&tris)
            .execute()
            .unwrap();
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn explicit_out_of_range() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        let tris = [[0, 1, 3]];
        assert!(is_degenerate(
            Triangulate::new(&points).with_triangles(&tris).execute()
        ));
    }

    #[test]
    fn explicit_repeated_vertex() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        let tris = [[0, 1, 1]];
        assert!(is_degenerate(
            Triangulate::new(&points).with_triangles(&tris).execute()
        ));
    }

    #[test]
    fn explicit_zero_area() {
        let points = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)];
        let tris = [[0, 1, 2]];
        assert!(is_degenerate(
            Triangulate::new(&points).with_triangles(&tris).execute()
        ));
    }

    #[test]
    fn mask_removes_triangles() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let tris = [[0, 1, 2], [0, 2, 3]];
        let mask = [false, true];
        let mesh = Triangulate::new(&points)
            .with_triangles(&tris)
            .with_mask(&mask)
            .execute()
            .unwrap();
        assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn mask_length_mismatch() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)];
        let tris = [[0, 1, 2]];
        let mask = [false, false];
        assert!(is_degenerate(
            Triangulate::new(&points)
                .with_triangles(&tris)
                .with_mask(&mask)
                .execute()
        ));
    }
}
