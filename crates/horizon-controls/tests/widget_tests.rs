//! Switch, check boxes, accordion box and slider working together in one
//! scene.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_controls::prelude::*;

use common::{display, label};

const MOUSE: PointerId = PointerId::MOUSE;

#[test]
fn test_switch_controls_accordion() {
    let display = display();
    let expanded = Property::shared(false);

    let switch = OnOffSwitch::new(expanded.clone(), OnOffSwitchOptions::default()).unwrap();
    display.root().add_child(switch.node());

    let accordion = AccordionBox::new(
        label("title", 60.0, 14.0),
        label("content", 100.0, 50.0),
        expanded.clone(),
        AccordionBoxOptions::default(),
    )
    .unwrap();
    accordion.node().set_translation(0.0, 100.0);
    display.root().add_child(accordion.node());
    assert!(!accordion.content().is_visible());

    display.click(Point::new(10.0, 10.0));
    assert!(expanded.get());
    assert!(accordion.content().is_visible());

    // Collapsing through the accordion snaps the switch back.
    display.click(accordion.expand_button().node().global_bounds().center());
    assert!(!expanded.get());
    assert_eq!(switch.thumb().translation().x, 0.0);
}

#[test]
fn test_switch_drag_that_returns_keeps_value() {
    let display = display();
    let on = Property::shared(true);
    let switch = OnOffSwitch::new(on.clone(), OnOffSwitchOptions::default()).unwrap();
    display.root().add_child(switch.node());

    display.pointer_down(MOUSE, Point::new(45.0, 15.0));
    display.pointer_move(MOUSE, Point::new(5.0, 15.0));
    assert_eq!(switch.thumb().translation().x, 0.0);
    display.pointer_move(MOUSE, Point::new(50.0, 15.0));
    display.pointer_up(MOUSE, Point::new(50.0, 15.0));

    assert!(on.get());
    assert!(switch.crossed_midpoint());
}

#[test]
fn test_check_box_group_with_keyboard() {
    let display = display();
    let cells: Vec<_> = (0..3).map(|_| Property::shared(false)).collect();
    let group = VerticalCheckBoxGroup::new(
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (label(&format!("item-{i}"), 40.0 + 10.0 * i as f32, 12.0), cell.clone()))
            .collect(),
        CheckBoxGroupOptions::default(),
    )
    .unwrap();
    display.root().add_child(group.node());

    display.focus(group.check_boxes()[0].node());
    display.key_down(Key::Tab, false);
    display.key_down(Key::Space, false);

    assert!(!cells[0].get());
    assert!(cells[1].get());
    assert!(!cells[2].get());
}

#[test]
fn test_slider_drives_value_listeners() {
    let display = display();
    let value = Property::shared(0.0);
    let slider = HSlider::new(value.clone(), 0.0..=10.0, SliderOptions::default().with_step(1.0)).unwrap();
    display.root().add_child(slider.node());

    let changes = Arc::new(AtomicUsize::new(0));
    let c = changes.clone();
    let _sub = value.subscribe(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    display.pointer_down(MOUSE, Point::new(0.0, 15.0));
    for x in [5.0, 12.0, 19.0, 33.0, 41.0] {
        display.pointer_move(MOUSE, Point::new(x, 15.0));
    }
    display.pointer_up(MOUSE, Point::new(41.0, 15.0));

    // 20 px per unit: 5 -> 0, 12 -> 1, 19 -> 1, 33 -> 2, 41 -> 2.
    assert_eq!(value.get(), 2.0);
    assert_eq!(changes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_disposing_everything_leaves_cells_unobserved() {
    let display = display();
    let on = Property::shared(false);
    let level = Property::shared(5.0);

    let switch = OnOffSwitch::new(on.clone(), OnOffSwitchOptions::default()).unwrap();
    let slider = HSlider::new(level.clone(), 0.0..=10.0, SliderOptions::default()).unwrap();
    let check_box = CheckBox::new(label("l", 20.0, 10.0), on.clone(), CheckBoxOptions::default()).unwrap();
    for node in [switch.node(), slider.node(), check_box.node()] {
        display.root().add_child(node);
    }

    switch.dispose().unwrap();
    slider.dispose().unwrap();
    check_box.dispose().unwrap();

    assert_eq!(display.root().child_count(), 0);
    assert_eq!(on.subscriber_count(), 0);
    assert_eq!(level.subscriber_count(), 0);
}
