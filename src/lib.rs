pub mod contour;
pub mod error;
pub mod levels;
pub mod math;
pub mod mesh;
pub mod path;
pub mod render;

pub use error::{Result, TrifillError};
