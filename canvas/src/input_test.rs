#![allow(clippy::clone_on_copy)]

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_select() {
    assert_eq!(Tool::default(), Tool::Select);
}

#[test]
fn tool_categories_partition() {
    for tool in [Tool::Select, Tool::Delete, Tool::Line, Tool::Rect, Tool::Polygon, Tool::Text] {
        assert_ne!(tool.is_selecting(), tool.is_drawing(), "{tool:?}");
    }
    assert!(Tool::Delete.is_selecting());
    assert!(Tool::Text.is_drawing());
}

#[test]
fn tool_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Tool::Polygon).unwrap(), "\"polygon\"");
    assert_eq!(serde_json::from_str::<Tool>("\"rect\"").unwrap(), Tool::Rect);
}

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
    assert!(!m.toggles());
}

#[test]
fn ctrl_or_meta_toggles() {
    assert!(Modifiers { ctrl: true, ..Modifiers::default() }.toggles());
    assert!(Modifiers { meta: true, ..Modifiers::default() }.toggles());
    assert!(!Modifiers { shift: true, alt: true, ..Modifiers::default() }.toggles());
}

#[test]
fn modifiers_deserialize_partial() {
    let m: Modifiers = serde_json::from_str(r#"{"shift": true}"#).unwrap();
    assert!(m.shift);
    assert!(!m.ctrl);
}

// =============================================================
// Button / Key / Cursor
// =============================================================

#[test]
fn button_from_index() {
    assert_eq!(Button::from_index(0), Button::Primary);
    assert_eq!(Button::from_index(1), Button::Middle);
    assert_eq!(Button::from_index(2), Button::Secondary);
    assert_eq!(Button::from_index(4), Button::Primary);
}

#[test]
fn delete_keys() {
    assert!(Key("Delete".into()).is_delete());
    assert!(Key("Backspace".into()).is_delete());
    assert!(!Key("d".into()).is_delete());
}

#[test]
fn escape_keys() {
    assert!(Key("Escape".into()).is_escape());
    assert!(!Key("Enter".into()).is_escape());
}

#[test]
fn focus_default_is_canvas() {
    assert_eq!(Focus::default(), Focus::Canvas);
    assert_eq!(serde_json::to_string(&Focus::TextInput).unwrap(), "\"text_input\"");
}

#[test]
fn cursor_serializes_as_css_name() {
    assert_eq!(serde_json::to_string(&Cursor::Grabbing).unwrap(), "\"grabbing\"");
    assert_eq!(serde_json::to_string(&Cursor::Crosshair).unwrap(), "\"crosshair\"");
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
}

#[test]
fn input_state_variants_compare() {
    let down = Point::new(1.0, 2.0);
    let a = InputState::Selecting { down_screen: down, dragging: false };
    let b = a.clone();
    assert_eq!(a, b);
    assert_ne!(a, InputState::Selecting { down_screen: down, dragging: true });
    assert_ne!(a, InputState::Panning { last_screen: down });
}
