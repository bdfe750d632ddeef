use canvas::doc::{Bounds, Entity};
use canvas::input::Cursor;
use canvas::shape::Shape;

use super::*;
use crate::load::parse_lines;

fn core() -> EngineCore {
    let mut core = EngineCore::default();
    let shape = Shape::Circle { center: Point::new(5.0, 5.0), radius: 5.0 };
    core.load_entities(vec![Entity::new(1, Bounds::new(0.0, 0.0, 10.0, 10.0), shape)]);
    core
}

fn script(text: &str) -> Vec<HostEvent> {
    parse_lines(text).unwrap()
}

#[test]
fn parses_events_with_defaults() {
    let events = script(
        r#"{"event": "pointer_down", "x": 1, "y": 2}
{"event": "key_down", "key": "Delete", "focus": "text_input"}
{"event": "set_tool", "tool": "polygon"}"#,
    );
    assert_eq!(
        events[0],
        HostEvent::PointerDown { x: 1.0, y: 2.0, button: Button::Primary, modifiers: Modifiers::default() }
    );
    assert!(matches!(&events[1], HostEvent::KeyDown { focus: Focus::TextInput, .. }));
    assert_eq!(events[2], HostEvent::SetTool { tool: Tool::Polygon });
}

#[test]
fn click_script_selects_entity() {
    // Viewport 800x600 puts world (5, 5) at screen (405, 295).
    let events = script(
        r#"{"event": "viewport", "width": 800, "height": 600}
{"event": "pointer_move", "x": 405, "y": 295}
{"event": "pointer_down", "x": 405, "y": 295}
{"event": "pointer_up", "x": 405, "y": 295}
{"event": "key_down", "key": "Delete"}"#,
    );
    let mut core = core();
    let steps = replay(&mut core, &events);
    assert_eq!(steps.len(), 5);
    assert!(steps[1].actions.contains(&Action::SetCursor { cursor: Cursor::Pointer }));
    assert!(steps[3].actions.contains(&Action::SelectionChanged { ids: vec![1] }));
    assert!(steps[4].actions.contains(&Action::EntitiesDeleted { ids: vec![1] }));
    assert!(core.entity(1).is_none());
}

#[test]
fn text_errors_are_recorded_and_replay_continues() {
    let events = script(
        r#"{"event": "set_tool", "tool": "text"}
{"event": "pointer_down", "x": 0, "y": 0}
{"event": "text_confirm"}
{"event": "text_input", "value": "Lobby"}
{"event": "text_confirm"}"#,
    );
    let mut core = core();
    let steps = replay(&mut core, &events);
    assert_eq!(steps[2].error.as_deref(), Some("text is required"));
    assert!(steps[2].actions.is_empty());
    assert_eq!(steps[3].actions, vec![Action::RenderNeeded]);
    assert_eq!(steps[4].actions[0], Action::EntityCreated { id: -1 });
    assert_eq!(steps[4].step, 5);
}

#[test]
fn step_serializes_without_error_field() {
    let step = Step { step: 1, actions: vec![Action::RenderNeeded], error: None };
    let json = serde_json::to_value(&step).unwrap();
    assert!(json.get("error").is_none());
    assert_eq!(json["actions"][0]["action"], "render_needed");
}

#[test]
fn buttons_accept_dom_indices() {
    let events = script(
        r#"{"event": "pointer_down", "x": 0, "y": 0, "button": 1}
{"event": "pointer_up", "x": 0, "y": 0, "button": "secondary"}"#,
    );
    assert!(matches!(events[0], HostEvent::PointerDown { button: Button::Middle, .. }));
    assert!(matches!(events[1], HostEvent::PointerUp { button: Button::Secondary, .. }));
}

#[test]
fn layer_events_filter_visible_entities() {
    let mut core = EngineCore::default();
    core.set_viewport(800.0, 600.0);
    let circle = |x| Shape::Circle { center: Point::new(x, 0.0), radius: 1.0 };
    core.load_entities(vec![
        Entity::new(1, Bounds::new(-1.0, -1.0, 1.0, 1.0), circle(0.0)).with_layer(10),
        Entity::new(2, Bounds::new(9.0, -1.0, 11.0, 1.0), circle(10.0)).with_layer(20),
    ]);
    let events = script(
        r#"{"event": "set_visible_layers", "layers": [20]}
{"event": "toggle_layer", "layer": 10}
{"event": "set_visible_layers", "layers": null}"#,
    );

    apply(&mut core, &events[0]).unwrap();
    assert_eq!(core.visible_entities().iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
    // Showing 10 again makes every layer visible, which drops the filter.
    apply(&mut core, &events[1]).unwrap();
    assert_eq!(core.visible_layers(), vec![10, 20]);
    assert!(apply(&mut core, &events[2]).unwrap().is_empty());
}
