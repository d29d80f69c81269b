//! 2D affine transforms.
//!
//! [`Transform2D`] maps a node's local coordinates into its parent's
//! coordinates. It is a thin wrapper over `glam::Affine2`.
//!
//! # Examples
//!
//! ```
//! use horizon_controls_render::{Point, Transform2D};
//!
//! let t = Transform2D::translation(100.0, 50.0).then(&Transform2D::scale(2.0));
//! assert_eq!(t.transform_point(Point::new(10.0, 0.0)), Point::new(120.0, 50.0));
//!
//! let back = t.inverse().unwrap().transform_point(Point::new(120.0, 50.0));
//! assert!((back.x - 10.0).abs() < 1e-4);
//! ```

use glam::{Affine2, Vec2};

use crate::types::{Point, Rect};

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    affine: Affine2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        affine: Affine2::IDENTITY,
    };

    /// A pure translation.
    #[inline]
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            affine: Affine2::from_translation(Vec2::new(tx, ty)),
        }
    }

    /// A uniform scale about the origin.
    #[inline]
    pub fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    /// A non-uniform scale about the origin.
    #[inline]
    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            affine: Affine2::from_scale(Vec2::new(sx, sy)),
        }
    }

    /// A rotation about the origin (angle in radians).
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        Self {
            affine: Affine2::from_angle(angle),
        }
    }

    /// Compose two transforms. The result applies `other` first, then `self`.
    #[inline]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            affine: self.affine * other.affine,
        }
    }

    /// This transform followed by a translation in the outer space.
    #[inline]
    pub fn pre_translated(&self, tx: f32, ty: f32) -> Self {
        Self::translation(tx, ty).then(self)
    }

    /// The translation component.
    #[inline]
    pub fn translation_part(&self) -> Point {
        Point::from_vec2(self.affine.translation)
    }

    /// The same linear part with a different translation.
    #[inline]
    pub fn with_translation(&self, tx: f32, ty: f32) -> Self {
        let mut affine = self.affine;
        affine.translation = Vec2::new(tx, ty);
        Self { affine }
    }

    #[inline]
    pub fn transform_point(&self, p: Point) -> Point {
        Point::from_vec2(self.affine.transform_point2(p.to_vec2()))
    }

    /// The axis-aligned bounding box of a transformed rectangle.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for corner in rect.corners() {
            let p = self.affine.transform_point2(corner.to_vec2());
            min = min.min(p);
            max = max.max(p);
        }
        Rect::from_corners(Point::from_vec2(min), Point::from_vec2(max))
    }

    /// The inverse transform, or `None` if the transform is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.affine.matrix2.determinant();
        if det.abs() < 1e-10 || !det.is_finite() {
            return None;
        }
        Some(Self {
            affine: self.affine.inverse(),
        })
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// The underlying glam affine.
    #[inline]
    pub fn as_affine(&self) -> &Affine2 {
        &self.affine
    }
}

impl From<Affine2> for Transform2D {
    fn from(affine: Affine2) -> Self {
        Self { affine }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_identity() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(Transform2D::IDENTITY.transform_point(p), p);
        assert!(Transform2D::default().is_identity());
    }

    #[test]
    fn test_then_applies_right_first() {
        let t = Transform2D::translation(10.0, 0.0).then(&Transform2D::scale(2.0));
        assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));

        let u = Transform2D::scale(2.0).then(&Transform2D::translation(10.0, 0.0));
        assert_eq!(u.transform_point(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform2D::translation(5.0, -3.0)
            .then(&Transform2D::rotation(0.5))
            .then(&Transform2D::scale_xy(2.0, 0.5));
        let inv = t.inverse().unwrap();
        let p = Point::new(7.0, 11.0);
        assert!(approx(inv.transform_point(t.transform_point(p)), p));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Transform2D::scale(0.0).inverse().is_none());
    }

    #[test]
    fn test_transform_rect() {
        let t = Transform2D::translation(10.0, 20.0).then(&Transform2D::scale(2.0));
        let r = t.transform_rect(&Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(r, Rect::new(10.0, 20.0, 10.0, 10.0));
    }

    #[test]
    fn test_with_translation() {
        let t = Transform2D::scale(2.0).with_translation(4.0, 6.0);
        assert_eq!(t.translation_part(), Point::new(4.0, 6.0));
        assert_eq!(t.transform_point(Point::new(1.0, 1.0)), Point::new(6.0, 8.0));
    }
}
