//! Loading widget options from a TOML theme.

mod common;

use horizon_controls::prelude::*;
use horizon_controls::widgets::ButtonAlign;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Theme {
    button: ButtonOptions,
    combo_box: ComboBoxOptions,
    switch: OnOffSwitchOptions,
    check_boxes: CheckBoxGroupOptions,
    accordion: AccordionBoxOptions,
    slider: SliderOptions,
}

const THEME: &str = r#"
[button]
appearance = "flat"
x_margin = 10.0
shape = { kind = "round" }

[combo_box]
list_position = "above"
highlight_fill = { r = 1.0, g = 1.0, b = 0.0, a = 1.0 }

[switch]
toggle_while_dragging = true
size = { width = 80.0, height = 40.0 }

[check_boxes]
spacing = 4.0
check_box = { box_width = 16.0 }

[accordion]
button_align = "right"
title_bar_expand_collapse = false

[slider]
step = 0.5
track_size = { width = 300.0, height = 4.0 }
"#;

#[test]
fn test_theme_loads_and_validates() {
    common::init_tracing();
    let theme: Theme = toml::from_str(THEME).unwrap();

    assert_eq!(theme.button.appearance, AppearanceKind::Flat);
    assert_eq!(theme.button.shape, ButtonShape::Round);
    assert_eq!(theme.button.x_margin, 10.0);
    assert_eq!(theme.button.y_margin, ButtonOptions::default().y_margin);

    assert_eq!(theme.combo_box.list_position, ListPosition::Above);
    assert_eq!(theme.combo_box.highlight_fill, Color::from_rgb(1.0, 1.0, 0.0));

    assert!(theme.switch.toggle_while_dragging);
    assert_eq!(theme.switch.size, Size::new(80.0, 40.0));

    assert_eq!(theme.check_boxes.spacing, 4.0);
    assert_eq!(theme.check_boxes.check_box.box_width, 16.0);
    assert_eq!(theme.check_boxes.check_box.spacing, CheckBoxOptions::default().spacing);

    assert_eq!(theme.accordion.button_align, ButtonAlign::Right);
    assert!(!theme.accordion.title_bar_expand_collapse);

    assert_eq!(theme.slider.step, Some(0.5));
    assert_eq!(theme.slider.track_size.width, 300.0);

    assert!(theme.button.validate().is_ok());
    assert!(theme.combo_box.validate().is_ok());
    assert!(theme.switch.validate().is_ok());
    assert!(theme.check_boxes.validate().is_ok());
    assert!(theme.accordion.validate().is_ok());
    assert!(theme.slider.validate().is_ok());
}

#[test]
fn test_empty_theme_is_all_defaults() {
    let theme: Theme = toml::from_str("").unwrap();
    assert_eq!(theme.button, ButtonOptions::default());
    assert_eq!(theme.slider, SliderOptions::default());
}

#[test]
fn test_out_of_range_values_are_reported() {
    let theme: Theme = toml::from_str(
        r#"
        [switch]
        disabled_opacity = 1.5

        [slider]
        step = -1.0
        "#,
    )
    .unwrap();

    let err = theme.switch.validate().unwrap_err();
    assert!(matches!(
        err,
        ControlError::InvalidOption {
            option: "disabled_opacity",
            ..
        }
    ));
    assert!(matches!(
        theme.slider.validate(),
        Err(ControlError::InvalidOption { option: "step", .. })
    ));
}

#[test]
fn test_unknown_shape_kind_is_rejected() {
    let result = toml::from_str::<Theme>(
        r#"
        [button]
        shape = { kind = "hexagon" }
        "#,
    );
    assert!(result.is_err());
}
