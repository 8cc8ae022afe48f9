//! Grouped polygon rendering into renderer-neutral paths.

mod color;
mod group;

pub use color::Color;
pub use group::PolygonGroupRenderer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StyleError, TrifillError};
use crate::math::Point2;
use crate::path::{ClosedRings, PathOp};

/// Multiplier from the `size` attribute to stroke width.
pub const SIZE_FACTOR: f64 = 1.772_453_850_905_516; // sqrt(pi)

/// Stroke dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::DashDot => "dashdot",
        })
    }
}

impl FromStr for LineType {
    type Err = TrifillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solid" | "-" => Ok(Self::Solid),
            "dashed" | "--" => Ok(Self::Dashed),
            "dotted" | ":" => Ok(Self::Dotted),
            "dashdot" | "-." => Ok(Self::DashDot),
            _ => Err(StyleError::InvalidLineType(s.to_owned()).into()),
        }
    }
}

/// Style attributes carried by every polygon row.
///
/// All rows of one group must agree on every attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleAttrs {
    /// Fill opacity in `[0, 1]`.
    pub alpha: f64,
    /// Edge color; `None` draws no stroke.
    pub color: Option<Color>,
    /// Fill color; `None` leaves the interior unfilled.
    pub fill: Option<Color>,
    pub linetype: LineType,
    /// Edge thickness before scaling by [`SIZE_FACTOR`].
    pub size: f64,
}

impl Default for StyleAttrs {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            color: None,
            fill: Some(Color::DARK_GRAY),
            linetype: LineType::Solid,
            size: 0.5,
        }
    }
}

impl StyleAttrs {
    /// Returns the name of the first attribute that differs from `other`.
    #[must_use]
    pub fn first_difference(&self, other: &Self) -> Option<&'static str> {
        if self.alpha.to_bits() != other.alpha.to_bits() {
            Some("alpha")
        } else if self.color != other.color {
            Some("color")
        } else if self.fill != other.fill {
            Some("fill")
        } else if self.linetype != other.linetype {
            Some("linetype")
        } else if self.size.to_bits() != other.size.to_bits() {
            Some("size")
        } else {
            None
        }
    }
}

/// One vertex of a polygon table.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRow {
    pub point: Point2,
    pub group: String,
    /// Explicit ring marker; `None` on every row of a group makes the whole
    /// group a single ring.
    pub ring_start: Option<bool>,
    pub style: StyleAttrs,
}

impl PolygonRow {
    /// Creates a row without an explicit ring marker.
    #[must_use]
    pub fn new(point: Point2, group: impl Into<String>, style: StyleAttrs) -> Self {
        Self {
            point,
            group: group.into(),
            ring_start: None,
            style,
        }
    }

    /// Sets the explicit ring marker.
    #[must_use]
    pub fn with_ring_start(mut self, ring_start: bool) -> Self {
        self.ring_start = Some(ring_start);
        self
    }
}

/// A resolved fill or stroke paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    None,
    Solid(Color),
}

/// One group's closed path plus resolved style, ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawablePath {
    pub group: String,
    pub path: ClosedRings,
    pub fill: Paint,
    pub edge: Paint,
    pub line_width: f64,
    pub line_style: LineType,
    pub z_order: i32,
}

impl DrawablePath {
    /// Lowers the path to drawing instructions.
    #[must_use]
    pub fn ops(&self) -> Vec<PathOp> {
        self.path.ops()
    }
}

/// Consumer of drawable paths that performs the actual compositing.
pub trait Renderer {
    /// Draws one path.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer cannot draw the path.
    fn draw_path(&mut self, path: &DrawablePath) -> Result<()>;
}
