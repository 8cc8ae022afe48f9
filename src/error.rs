use thiserror::Error;

/// Top-level error type for contouring and polygon rendering.
#[derive(Debug, Error)]
pub enum TrifillError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors related to contour level selection.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid levels: {0}")]
    InvalidLevels(String),
}

/// Errors related to the input point set, field, or mesh.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("field has {values} values for {points} points")]
    FieldMismatch { points: usize, values: usize },

    #[error("field value at index {index} is not finite")]
    NonFiniteValue { index: usize },
}

/// Errors related to per-group style attributes.
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("attribute `{attribute}` is not constant within group `{group}`")]
    InconsistentGroupStyle {
        group: String,
        attribute: &'static str,
    },

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid line type: {0}")]
    InvalidLineType(String),
}

/// Errors reported by an external renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`TrifillError`].
pub type Result<T> = std::result::Result<T, TrifillError>;
