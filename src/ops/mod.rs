//! Pixel operations. Each takes the current image and returns a new one.

pub mod adjustments;
pub mod canvas_ops;
pub mod filters;
pub mod transform;
