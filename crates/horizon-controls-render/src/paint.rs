//! Paint and stroke style records.
//!
//! Widgets never draw. They assign these declarative records to scene nodes
//! and the rendering back-end turns them into pixels.

use crate::types::{Color, Point, Rect};

/// How the interior of a shape is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Solid color fill.
    Solid(Color),
    /// Linear gradient fill.
    Linear(LinearGradient),
    /// Radial gradient fill.
    Radial(RadialGradient),
}

impl Paint {
    #[inline]
    pub const fn solid(color: Color) -> Self {
        Self::Solid(color)
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Self::Solid(_))
    }

    /// The solid color, if this is a solid paint.
    #[inline]
    pub fn as_solid(&self) -> Option<Color> {
        match self {
            Self::Solid(c) => Some(*c),
            _ => None,
        }
    }

    /// The color stops of a gradient paint (empty for solid paints).
    pub fn stops(&self) -> &[GradientStop] {
        match self {
            Self::Solid(_) => &[],
            Self::Linear(gradient) => &gradient.stops,
            Self::Radial(gradient) => &gradient.stops,
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

impl From<LinearGradient> for Paint {
    fn from(gradient: LinearGradient) -> Self {
        Self::Linear(gradient)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Self::Radial(gradient)
    }
}

/// A gradient color stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0).
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    #[inline]
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// A linear gradient between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Top-to-bottom gradient across `rect`.
    pub fn vertical(rect: &Rect) -> Self {
        Self::new(
            Point::new(rect.left(), rect.top()),
            Point::new(rect.left(), rect.bottom()),
        )
    }

    /// Left-to-right gradient across `rect`.
    pub fn horizontal(rect: &Rect) -> Self {
        Self::new(
            Point::new(rect.left(), rect.top()),
            Point::new(rect.right(), rect.top()),
        )
    }

    /// Append a color stop. Offsets are clamped to 0.0-1.0.
    pub fn add_stop(mut self, offset: f32, color: Color) -> Self {
        self.stops
            .push(GradientStop::new(offset.clamp(0.0, 1.0), color));
        self
    }
}

/// A radial gradient between two concentric circles.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    /// Radius at which offset 0.0 is reached.
    pub inner_radius: f32,
    /// Radius at which offset 1.0 is reached.
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(center: Point, inner_radius: f32, radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            radius,
            stops: Vec::new(),
        }
    }

    /// Append a color stop. Offsets are clamped to 0.0-1.0.
    pub fn add_stop(mut self, offset: f32, color: Color) -> Self {
        self.stops
            .push(GradientStop::new(offset.clamp(0.0, 1.0), color));
        self
    }
}

/// Outline style.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    /// Line width in pixels.
    pub width: f32,
}

impl Stroke {
    #[inline]
    pub fn new(paint: impl Into<Paint>, width: f32) -> Self {
        Self {
            paint: paint.into(),
            width,
        }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_paint() {
        let paint = Paint::from(Color::WHITE);
        assert!(paint.is_solid());
        assert_eq!(paint.as_solid(), Some(Color::WHITE));
        assert!(paint.stops().is_empty());
    }

    #[test]
    fn test_vertical_gradient_spans_rect() {
        let rect = Rect::new(0.0, 10.0, 40.0, 20.0);
        let gradient = LinearGradient::vertical(&rect)
            .add_stop(0.0, Color::WHITE)
            .add_stop(1.5, Color::BLACK);
        assert_eq!(gradient.start, Point::new(0.0, 10.0));
        assert_eq!(gradient.end, Point::new(0.0, 30.0));
        assert_eq!(gradient.stops[1].offset, 1.0);

        let paint = Paint::from(gradient);
        assert!(!paint.is_solid());
        assert_eq!(paint.stops().len(), 2);
    }

    #[test]
    fn test_stroke_defaults() {
        let stroke = Stroke::default();
        assert_eq!(stroke.width, 1.0);
        assert_eq!(stroke.paint, Paint::Solid(Color::BLACK));
    }
}
