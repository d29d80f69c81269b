//! A column of check boxes.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_controls_core::SharedProperty;
use serde::{Deserialize, Serialize};

use super::checkbox::{CheckBox, CheckBoxOptions};
use crate::error::{ControlError, ControlResult, ensure_non_negative};
use crate::scene::Node;

/// Options for [`VerticalCheckBoxGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckBoxGroupOptions {
    /// Vertical gap between check boxes.
    pub spacing: f32,
    /// Applied to every check box in the group.
    pub check_box: CheckBoxOptions,
}

impl Default for CheckBoxGroupOptions {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            check_box: CheckBoxOptions::default(),
        }
    }
}

impl CheckBoxGroupOptions {
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_check_box(mut self, options: CheckBoxOptions) -> Self {
        self.check_box = options;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_non_negative("spacing", self.spacing)?;
        self.check_box.validate()
    }
}

/// Check boxes stacked top to bottom, left aligned, with equal-width touch
/// areas.
pub struct VerticalCheckBoxGroup {
    node: Node,
    check_boxes: Vec<CheckBox>,
    disposed: AtomicBool,
}

impl VerticalCheckBoxGroup {
    pub fn new(items: Vec<(Node, SharedProperty<bool>)>, options: CheckBoxGroupOptions) -> ControlResult<Self> {
        if items.is_empty() {
            return Err(ControlError::NoItems {
                widget: "VerticalCheckBoxGroup",
            });
        }
        options.validate()?;

        let check_boxes = items
            .into_iter()
            .map(|(content, cell)| CheckBox::new(content, cell, options.check_box.clone()))
            .collect::<ControlResult<Vec<_>>>()?;

        let widest = check_boxes
            .iter()
            .map(CheckBox::content_width)
            .fold(0.0_f32, f32::max);

        let node = Node::named("check-box-group");
        let mut y = 0.0;
        for check_box in &check_boxes {
            check_box.set_min_content_width(widest);
            check_box.node().set_translation(0.0, y);
            node.add_child(check_box.node());
            y += check_box.node().height() + options.spacing;
        }

        tracing::debug!(
            target: "horizon_controls::widget",
            group = %node.id(),
            count = check_boxes.len(),
            "check box group created"
        );

        Ok(Self {
            node,
            check_boxes,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn check_boxes(&self) -> &[CheckBox] {
        &self.check_boxes
    }

    pub fn set_enabled(&self, enabled: bool) -> ControlResult<()> {
        self.check_boxes
            .iter()
            .try_for_each(|check_box| check_box.set_enabled(enabled))
    }

    pub fn dispose(&self) -> ControlResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(ControlError::Disposed {
                widget: "VerticalCheckBoxGroup",
            });
        }
        for check_box in &self.check_boxes {
            check_box.dispose()?;
        }
        self.node.detach();
        Ok(())
    }
}

impl fmt::Debug for VerticalCheckBoxGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerticalCheckBoxGroup")
            .field("node", &self.node.id())
            .field("check_boxes", &self.check_boxes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Display;
    use horizon_controls_core::Property;
    use horizon_controls_render::{Point, Rect, Size};

    fn label(width: f32) -> Node {
        Node::rectangle("label", Rect::new(0.0, 0.0, width, 12.0))
    }

    fn setup() -> (Display, VerticalCheckBoxGroup, Vec<SharedProperty<bool>>) {
        let display = Display::new(Size::new(300.0, 300.0));
        let cells: Vec<_> = (0..3).map(|_| Property::shared(false)).collect();
        let items = vec![
            (label(30.0), cells[0].clone()),
            (label(80.0), cells[1].clone()),
            (label(50.0), cells[2].clone()),
        ];
        let group = VerticalCheckBoxGroup::new(items, CheckBoxGroupOptions::default()).unwrap();
        display.root().add_child(group.node());
        (display, group, cells)
    }

    #[test]
    fn test_empty_group_rejected() {
        let err = VerticalCheckBoxGroup::new(Vec::new(), CheckBoxGroupOptions::default()).unwrap_err();
        assert!(matches!(err, ControlError::NoItems { .. }));
    }

    #[test]
    fn test_stacking_and_equal_widths() {
        let (_display, group, _cells) = setup();
        let ys: Vec<f32> = group
            .check_boxes()
            .iter()
            .map(|c| c.node().translation().y)
            .collect();
        assert_eq!(ys, vec![0.0, 31.0, 62.0]);
        for check_box in group.check_boxes() {
            assert_eq!(check_box.node().touch_area().map(|r| r.width()), Some(107.0));
        }
    }

    #[test]
    fn test_click_right_of_short_label() {
        let (display, _group, cells) = setup();
        display.click(Point::new(100.0, 10.0));
        assert!(cells[0].get());
        assert!(!cells[1].get());
    }

    #[test]
    fn test_set_enabled_applies_to_all() {
        let (_display, group, _cells) = setup();
        group.set_enabled(false).unwrap();
        assert!(group.check_boxes().iter().all(|c| !c.is_enabled()));
    }

    #[test]
    fn test_dispose_disposes_boxes() {
        let (display, group, cells) = setup();
        group.dispose().unwrap();
        assert_eq!(display.root().child_count(), 0);
        assert!(cells.iter().all(|c| c.subscriber_count() == 0));
        assert!(group.dispose().is_err());
    }
}
