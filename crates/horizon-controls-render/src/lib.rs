//! Geometry, color and paint style records for Horizon Controls.
//!
//! The widget crate describes how nodes should look using the types in this
//! crate; turning them into pixels is left to a rendering back-end.
//!
//! - [`Point`], [`Size`], [`Rect`]: basic geometry
//! - [`Color`]: straight-alpha RGBA with brighten/darken helpers
//! - [`Transform2D`]: affine transforms between node coordinate frames
//! - [`Paint`], [`LinearGradient`], [`RadialGradient`], [`Stroke`]: style records

mod paint;
mod transform;
mod types;

pub use paint::{GradientStop, LinearGradient, Paint, RadialGradient, Stroke};
pub use transform::Transform2D;
pub use types::{Color, Point, Rect, Size};
