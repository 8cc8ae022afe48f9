//! Filled contour bands over a triangulated field.

mod assemble;
mod band;
mod filled;

pub use assemble::{band_group_key, BandAssembler, BandRow, BandTable};
pub use band::BandContour;
pub use filled::{ContourFilled, ContourParams};

use crate::math::Point2;
use crate::path::{close_rings, ClosedRings, RawVertex};

/// The region of a field between two consecutive levels.
///
/// `vertices` is a raw ring stream; each ring's first vertex is flagged and
/// rings are not yet closed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
    pub vertices: Vec<RawVertex>,
}

impl Band {
    /// Returns the fill label of this band (its lower level).
    #[must_use]
    pub fn fill_label(&self) -> f64 {
        self.lo
    }

    /// Returns `true` if the band covers no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the number of rings.
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.ring_start).count()
    }

    /// Returns each ring's points, without a repeated closer.
    #[must_use]
    pub fn rings(&self) -> Vec<Vec<Point2>> {
        let mut rings: Vec<Vec<Point2>> = Vec::new();
        for v in &self.vertices {
            match rings.last_mut() {
                Some(ring) if !v.ring_start => ring.push(v.point),
                _ => rings.push(vec![v.point]),
            }
        }
        rings
    }

    /// Returns the band's rings closed for drawing.
    #[must_use]
    pub fn closed(&self) -> ClosedRings {
        close_rings(&self.vertices)
    }
}
