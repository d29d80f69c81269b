//! Button configuration.

use std::sync::Arc;

use horizon_controls_render::{Color, Size};
use serde::{Deserialize, Serialize};

use super::appearance::{AppearanceStrategy, FlatAppearance, ThreeDAppearance};
use crate::error::{ControlError, ControlResult, ensure_non_negative, ensure_positive, ensure_unit_open};

/// Outline of a button's background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ButtonShape {
    Rectangular { corner_radius: f32 },
    Round,
}

impl Default for ButtonShape {
    fn default() -> Self {
        Self::Rectangular { corner_radius: 4.0 }
    }
}

/// Which built-in appearance strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppearanceKind {
    #[default]
    #[serde(rename = "3d")]
    ThreeD,
    Flat,
}

impl AppearanceKind {
    pub fn strategy(self) -> Arc<dyn AppearanceStrategy> {
        match self {
            Self::ThreeD => Arc::new(ThreeDAppearance),
            Self::Flat => Arc::new(FlatAppearance),
        }
    }
}

/// Options for [`Button`](super::Button).
///
/// | option | default | legal range |
/// |---|---|---|
/// | `shape` | rectangular, corner radius 4 | radius >= 0 |
/// | `appearance` | 3D | |
/// | `base_color` | light blue | |
/// | `disabled_base_color` | light gray | |
/// | `stroke` | none (3D derives one from the base color) | |
/// | `line_width` | 0.5 | >= 0 |
/// | `x_margin`, `y_margin` | 8, 5 | >= 0 |
/// | `size` | none (sized from content) | non-empty |
/// | `radius` | none (sized from content) | > 0 |
/// | `min_width`, `min_height` | 0 | >= 0 |
/// | `touch_expansion` | 0 | >= 0 |
/// | `fire_on_down` | false | |
/// | `disabled_content_opacity` | 0.45 | (0, 1) |
/// | `focusable` | true | |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonOptions {
    pub shape: ButtonShape,
    pub appearance: AppearanceKind,
    pub base_color: Color,
    pub disabled_base_color: Color,
    pub stroke: Option<Color>,
    pub line_width: f32,
    pub x_margin: f32,
    pub y_margin: f32,
    /// Explicit size of a rectangular button.
    pub size: Option<Size>,
    /// Explicit radius of a round button.
    pub radius: Option<f32>,
    pub min_width: f32,
    pub min_height: f32,
    /// Extends the touch area beyond the visible bounds on every side.
    pub touch_expansion: f32,
    pub fire_on_down: bool,
    pub disabled_content_opacity: f32,
    pub focusable: bool,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            shape: ButtonShape::default(),
            appearance: AppearanceKind::default(),
            base_color: Color::from_rgb8(153, 206, 255),
            disabled_base_color: Color::from_rgb8(220, 220, 220),
            stroke: None,
            line_width: 0.5,
            x_margin: 8.0,
            y_margin: 5.0,
            size: None,
            radius: None,
            min_width: 0.0,
            min_height: 0.0,
            touch_expansion: 0.0,
            fire_on_down: false,
            disabled_content_opacity: 0.45,
            focusable: true,
        }
    }
}

impl ButtonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for a round button.
    pub fn round() -> Self {
        Self {
            shape: ButtonShape::Round,
            x_margin: 5.0,
            ..Self::default()
        }
    }

    pub fn with_shape(mut self, shape: ButtonShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_appearance(mut self, appearance: AppearanceKind) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn with_base_color(mut self, color: Color) -> Self {
        self.base_color = color;
        self
    }

    pub fn with_disabled_base_color(mut self, color: Color) -> Self {
        self.disabled_base_color = color;
        self
    }

    pub fn with_stroke(mut self, stroke: Option<Color>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_margins(mut self, x_margin: f32, y_margin: f32) -> Self {
        self.x_margin = x_margin;
        self.y_margin = y_margin;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_min_size(mut self, min_width: f32, min_height: f32) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn with_touch_expansion(mut self, expansion: f32) -> Self {
        self.touch_expansion = expansion;
        self
    }

    pub fn with_fire_on_down(mut self, fire_on_down: bool) -> Self {
        self.fire_on_down = fire_on_down;
        self
    }

    pub fn with_disabled_content_opacity(mut self, opacity: f32) -> Self {
        self.disabled_content_opacity = opacity;
        self
    }

    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Check every field against its legal range.
    pub fn validate(&self) -> ControlResult<()> {
        if let ButtonShape::Rectangular { corner_radius } = self.shape {
            ensure_non_negative("corner_radius", corner_radius)?;
        }
        ensure_non_negative("line_width", self.line_width)?;
        ensure_non_negative("x_margin", self.x_margin)?;
        ensure_non_negative("y_margin", self.y_margin)?;
        ensure_non_negative("min_width", self.min_width)?;
        ensure_non_negative("min_height", self.min_height)?;
        ensure_non_negative("touch_expansion", self.touch_expansion)?;
        ensure_unit_open("disabled_content_opacity", self.disabled_content_opacity)?;
        if let Some(size) = self.size {
            ensure_positive("size.width", size.width)?;
            ensure_positive("size.height", size.height)?;
        }
        if let Some(radius) = self.radius {
            ensure_positive("radius", radius)?;
        }
        if self.shape == ButtonShape::Round && self.size.is_some() {
            return Err(ControlError::invalid_option(
                "size",
                "round buttons are sized with `radius`",
            ));
        }
        Ok(())
    }
}
