use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::levels::{LevelSelector, Levels};
use crate::math::Point2;
use crate::mesh::{Triangulate, Triangulation};

use super::band::check_field;
use super::{Band, BandAssembler, BandContour, BandTable};

/// Options recognized by a filled contour request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Level count or explicit levels.
    pub levels: Levels,
    /// Explicit triangle connectivity; Delaunay when absent.
    pub explicit_triangles: Option<Vec<[usize; 3]>>,
    /// Per-triangle mask; `true` removes the triangle.
    pub mask: Option<Vec<bool>>,
}

/// Computes filled contour bands for a scalar field sampled at points.
///
/// Triangulates the points, resolves the levels against the field's range,
/// extracts one band per consecutive level pair, and tags the result with
/// per-band group keys.
#[derive(Debug)]
pub struct ContourFilled<'a> {
    points: &'a [Point2],
    field: &'a [f64],
    params: ContourParams,
    selector: LevelSelector,
}

impl<'a> ContourFilled<'a> {
    /// Creates a new `ContourFilled` request with default parameters.
    #[must_use]
    pub fn new(points: &'a [Point2], field: &'a [f64]) -> Self {
        Self {
            points,
            field,
            params: ContourParams::default(),
            selector: LevelSelector::default(),
        }
    }

    /// Sets the request parameters.
    #[must_use]
    pub fn with_params(mut self, params: ContourParams) -> Self {
        self.params = params;
        self
    }

    /// Sets how levels are chosen.
    #[must_use]
    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.params.levels = levels;
        self
    }

    /// Replaces the level selector (and with it the break policy).
    #[must_use]
    pub fn with_selector(mut self, selector: LevelSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Computes every band, bottom band first.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError` for a degenerate point set or a field that does
    /// not match it, and `LevelError::InvalidLevels` for unusable levels.
    pub fn execute_bands(&self) -> Result<Vec<Band>> {
        if self.field.len() != self.points.len() {
            return Err(GeometryError::FieldMismatch {
                points: self.points.len(),
                values: self.field.len(),
            }
            .into());
        }
        let mesh = self.triangulate()?;
        check_field(&mesh, self.field)?;

        let (zmin, zmax) = self
            .field
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| {
                (lo.min(z), hi.max(z))
            });
        let levels = self.selector.select(&self.params.levels, (zmin, zmax))?;

        tracing::debug!(
            points = self.points.len(),
            triangles = mesh.triangle_count(),
            levels = levels.len(),
            zmin,
            zmax,
            "contour request"
        );

        let bands = levels
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                BandContour::new(&mesh, self.field, pair[0], pair[1])
                    .include_lower(i == 0)
                    .execute()
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            bands = bands.len(),
            rings = bands.iter().map(Band::ring_count).sum::<usize>(),
            "contour bands computed"
        );

        Ok(bands)
    }

    /// Computes every band and flattens them under layer group `group`.
    ///
    /// # Errors
    ///
    /// Same as [`ContourFilled::execute_bands`].
    pub fn execute(&self, group: &str) -> Result<BandTable> {
        let bands = self.execute_bands()?;
        Ok(BandAssembler::new(group).assemble(&bands))
    }

    fn triangulate(&self) -> Result<Triangulation> {
        let mut op = Triangulate::new(self.points);
        if let Some(triangles) = &self.params.explicit_triangles {
            op = op.with_triangles(triangles);
        }
        if let Some(mask) = &self.params.mask {
            op = op.with_mask(mask);
        }
        op.execute()
    }
}
