//! Appearance strategies and the binder that applies them.
//!
//! A strategy turns a button's shape, bounds and colors into a
//! [`StyleTable`]: one precomputed [`StyleRecord`] per [`InteractionState`].
//! The [`AppearanceBinder`] then only has to look up the record for the
//! current state, so switching between [`FlatAppearance`] and
//! [`ThreeDAppearance`] never touches the model or the state derivation.

use std::fmt;

use horizon_controls_core::{SharedProperty, Subscription};
use horizon_controls_render::{Color, LinearGradient, Paint, RadialGradient, Rect, Stroke};
use parking_lot::Mutex;
use std::sync::Arc;

use super::options::{ButtonOptions, ButtonShape};
use super::state::{InteractionState, InteractionStateProperty};
use crate::scene::Node;

/// Fill and stroke for one interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleRecord {
    pub fill: Option<Paint>,
    pub stroke: Option<Stroke>,
    /// Fill of the overlay layer drawn above the background, if any.
    pub overlay: Option<Paint>,
}

/// One [`StyleRecord`] per [`InteractionState`].
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    records: [StyleRecord; 5],
}

impl StyleTable {
    /// Build a table by evaluating `style` for every state.
    pub fn from_fn(mut style: impl FnMut(InteractionState) -> StyleRecord) -> Self {
        Self {
            records: InteractionState::ALL.map(&mut style),
        }
    }

    pub fn get(&self, state: InteractionState) -> &StyleRecord {
        &self.records[state.index()]
    }
}

/// Colors a strategy works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppearanceColors {
    pub base: Color,
    pub disabled_base: Color,
    pub stroke: Option<Color>,
    pub line_width: f32,
}

impl AppearanceColors {
    pub fn from_options(options: &ButtonOptions) -> Self {
        Self {
            base: options.base_color,
            disabled_base: options.disabled_base_color,
            stroke: options.stroke,
            line_width: options.line_width,
        }
    }

    fn state_base(&self, state: InteractionState) -> Color {
        match state {
            InteractionState::Idle | InteractionState::Pressed => self.base,
            InteractionState::Over => self.base.brighter(0.1),
            InteractionState::Disabled | InteractionState::DisabledPressed => self.disabled_base,
        }
    }

    fn state_stroke(&self, state: InteractionState, fallback: Option<Color>) -> Option<Stroke> {
        let color = self.stroke.or(fallback)?;
        let color = if state.is_disabled() {
            color.lerp(self.disabled_base, 0.5)
        } else {
            color
        };
        Some(Stroke::new(color, self.line_width))
    }
}

/// Produces the per-state styles of a button.
pub trait AppearanceStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn style_table(&self, shape: ButtonShape, bounds: Rect, colors: &AppearanceColors) -> StyleTable;
}

// =============================================================================
// Flat
// =============================================================================

/// Solid fills: lighter when hovered, darker when pressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatAppearance;

impl FlatAppearance {
    const PRESSED_DARKEN: f32 = 0.2;
}

impl AppearanceStrategy for FlatAppearance {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn style_table(&self, _shape: ButtonShape, _bounds: Rect, colors: &AppearanceColors) -> StyleTable {
        StyleTable::from_fn(|state| {
            let mut fill = colors.state_base(state);
            if state.is_pressed() {
                fill = fill.darker(Self::PRESSED_DARKEN);
            }
            StyleRecord {
                fill: Some(Paint::solid(fill)),
                stroke: colors.state_stroke(state, None),
                overlay: None,
            }
        })
    }
}

// =============================================================================
// 3D
// =============================================================================

/// Layered gradients that make the button look raised, and sunken while
/// pressed.
///
/// Rectangular buttons get a vertical gradient on the background and a
/// horizontal edge shading on the overlay. Round buttons get a single radial
/// gradient. When no stroke color is configured the outline is a darker
/// shade of the base color.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeDAppearance;

impl ThreeDAppearance {
    fn rectangular(bounds: &Rect, color: Color, pressed: bool) -> (Paint, Paint) {
        let vertical = if pressed {
            LinearGradient::vertical(bounds)
                .add_stop(0.0, color.darker(0.3))
                .add_stop(0.6, color)
                .add_stop(1.0, color.brighter(0.3))
        } else {
            LinearGradient::vertical(bounds)
                .add_stop(0.0, color.brighter(0.6))
                .add_stop(0.4, color)
                .add_stop(1.0, color.darker(0.3))
        };
        let edge = color.darker(0.3).with_alpha(0.5);
        let clear = color.with_alpha(0.0);
        let horizontal = LinearGradient::horizontal(bounds)
            .add_stop(0.0, edge)
            .add_stop(0.15, clear)
            .add_stop(0.85, clear)
            .add_stop(1.0, edge);
        (vertical.into(), horizontal.into())
    }

    fn round(bounds: &Rect, color: Color, pressed: bool) -> Paint {
        let radius = bounds.width().min(bounds.height()) / 2.0;
        let gradient = RadialGradient::new(bounds.center(), 0.0, radius);
        if pressed {
            gradient
                .add_stop(0.0, color.darker(0.2))
                .add_stop(0.6, color)
                .add_stop(1.0, color.brighter(0.2))
                .into()
        } else {
            gradient
                .add_stop(0.0, color.brighter(0.5))
                .add_stop(0.5, color)
                .add_stop(1.0, color.darker(0.3))
                .into()
        }
    }
}

impl AppearanceStrategy for ThreeDAppearance {
    fn name(&self) -> &'static str {
        "3d"
    }

    fn style_table(&self, shape: ButtonShape, bounds: Rect, colors: &AppearanceColors) -> StyleTable {
        StyleTable::from_fn(|state| {
            let color = colors.state_base(state);
            let pressed = state.is_pressed();
            let stroke = colors.state_stroke(state, Some(colors.base.darker(0.4)));
            match shape {
                ButtonShape::Rectangular { .. } => {
                    let (fill, overlay) = Self::rectangular(&bounds, color, pressed);
                    StyleRecord {
                        fill: Some(fill),
                        stroke,
                        overlay: Some(overlay),
                    }
                }
                ButtonShape::Round => StyleRecord {
                    fill: Some(Self::round(&bounds, color, pressed)),
                    stroke,
                    overlay: None,
                },
            }
        })
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Keeps a button's background (and optional overlay) styled for its current
/// interaction state.
pub struct AppearanceBinder {
    state: SharedProperty<InteractionState>,
    table: Arc<Mutex<StyleTable>>,
    background: Node,
    overlay: Option<Node>,
    link: Mutex<Option<Subscription>>,
}

impl AppearanceBinder {
    pub fn new(
        state: &InteractionStateProperty,
        table: StyleTable,
        background: Node,
        overlay: Option<Node>,
    ) -> Self {
        let table = Arc::new(Mutex::new(table));
        let link = {
            let (table, background, overlay) = (table.clone(), background.clone(), overlay.clone());
            state.link(move |&current| {
                let record = table.lock().get(current).clone();
                apply(&record, &background, overlay.as_ref());
            })
        };
        Self {
            state: state.property().clone(),
            table,
            background,
            overlay,
            link: Mutex::new(Some(link)),
        }
    }

    /// Replace the style table and restyle for the current state.
    pub fn set_table(&self, table: StyleTable) {
        let record = table.get(self.state.get()).clone();
        *self.table.lock() = table;
        apply(&record, &self.background, self.overlay.as_ref());
    }

    pub fn table(&self) -> StyleTable {
        self.table.lock().clone()
    }

    /// Stop following the state. The nodes keep their last style.
    pub fn unbind(&self) {
        self.link.lock().take();
    }

    pub fn is_bound(&self) -> bool {
        self.link.lock().is_some()
    }
}

impl fmt::Debug for AppearanceBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppearanceBinder")
            .field("state", &self.state.get())
            .field("background", &self.background.id())
            .field("bound", &self.is_bound())
            .finish()
    }
}

fn apply(record: &StyleRecord, background: &Node, overlay: Option<&Node>) {
    background.set_fill(record.fill.clone());
    background.set_stroke(record.stroke.clone());
    if let Some(overlay) = overlay {
        overlay.set_fill(record.overlay.clone());
    }
}

/// Fades a content node while the button is disabled.
pub struct ContentFade {
    link: Mutex<Option<Subscription>>,
}

impl ContentFade {
    pub fn new(state: &InteractionStateProperty, content: Node, disabled_opacity: f32) -> Self {
        let link = state.link(move |current| {
            content.set_opacity(if current.is_disabled() { disabled_opacity } else { 1.0 });
        });
        Self {
            link: Mutex::new(Some(link)),
        }
    }

    pub fn unbind(&self) {
        self.link.lock().take();
    }
}

impl fmt::Debug for ContentFade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentFade")
            .field("bound", &self.link.lock().is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(AppearanceBinder: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::ButtonModel;
    use horizon_controls_render::Point;

    fn colors() -> AppearanceColors {
        AppearanceColors {
            base: Color::from_rgb8(153, 206, 255),
            disabled_base: Color::LIGHT_GRAY,
            stroke: None,
            line_width: 0.5,
        }
    }

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 60.0, 30.0)
    }

    #[test]
    fn test_flat_table() {
        let table = FlatAppearance.style_table(ButtonShape::default(), bounds(), &colors());
        let base = colors().base;

        assert_eq!(table.get(InteractionState::Idle).fill, Some(Paint::solid(base)));
        assert_eq!(
            table.get(InteractionState::Over).fill,
            Some(Paint::solid(base.brighter(0.1)))
        );
        assert_eq!(
            table.get(InteractionState::Pressed).fill,
            Some(Paint::solid(base.darker(0.2)))
        );
        assert_eq!(
            table.get(InteractionState::Disabled).fill,
            Some(Paint::solid(Color::LIGHT_GRAY))
        );
        assert!(table.get(InteractionState::Idle).stroke.is_none());
    }

    #[test]
    fn test_three_d_rectangular_layers() {
        let table = ThreeDAppearance.style_table(ButtonShape::default(), bounds(), &colors());
        for state in InteractionState::ALL {
            let record = table.get(state);
            assert!(matches!(record.fill, Some(Paint::Linear(_))));
            assert!(matches!(record.overlay, Some(Paint::Linear(_))));
            assert!(record.stroke.is_some());
        }
        assert_ne!(
            table.get(InteractionState::Idle).fill,
            table.get(InteractionState::Pressed).fill
        );
    }

    #[test]
    fn test_three_d_round_is_radial() {
        let table = ThreeDAppearance.style_table(ButtonShape::Round, bounds(), &colors());
        let Some(Paint::Radial(gradient)) = &table.get(InteractionState::Idle).fill else {
            panic!("expected a radial gradient");
        };
        assert_eq!(gradient.center, Point::new(30.0, 15.0));
        assert_eq!(gradient.radius, 15.0);
        assert!(table.get(InteractionState::Idle).overlay.is_none());
    }

    #[test]
    fn test_binder_follows_state() {
        let model = ButtonModel::new(false);
        let state = InteractionStateProperty::new(&model);
        let background = Node::rectangle("background", bounds());
        let table = FlatAppearance.style_table(ButtonShape::default(), bounds(), &colors());
        let binder = AppearanceBinder::new(&state, table.clone(), background.clone(), None);

        assert_eq!(background.fill(), table.get(InteractionState::Idle).fill);
        model.pointer_enter().unwrap();
        assert_eq!(background.fill(), table.get(InteractionState::Over).fill);

        binder.set_table(ThreeDAppearance.style_table(ButtonShape::default(), bounds(), &colors()));
        assert!(matches!(background.fill(), Some(Paint::Linear(_))));

        binder.unbind();
        model.pointer_exit().unwrap();
        assert!(matches!(background.fill(), Some(Paint::Linear(_))));
    }

    #[test]
    fn test_content_fade() {
        let model = ButtonModel::new(false);
        let state = InteractionStateProperty::new(&model);
        let content = Node::named("label");
        let _fade = ContentFade::new(&state, content.clone(), 0.3);

        model.set_enabled(false).unwrap();
        assert_eq!(content.opacity(), 0.3);
        model.set_enabled(true).unwrap();
        assert_eq!(content.opacity(), 1.0);
    }
}
