//! Scripted host events driven through an [`EngineCore`].
//!
//! A script is JSON lines of [`HostEvent`]s, e.g.
//! `{"event": "pointer_down", "x": 400, "y": 300}`. Coordinates are screen
//! pixels. Each event yields one [`Step`] recording the actions it produced.

use canvas::camera::Point;
use canvas::engine::{Action, EngineCore};
use canvas::input::{Button, Focus, Key, Modifiers, Tool, WheelDelta};
use serde::{Deserialize, Deserializer, Serialize};

/// One event as a browser host would deliver it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Viewport {
        width: f64,
        height: f64,
    },
    SetTool {
        tool: Tool,
    },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default, deserialize_with = "button")]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default, deserialize_with = "button")]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerCancel,
    PointerLeave,
    DoubleClick,
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        focus: Focus,
    },
    /// Toolbar delete button.
    Delete,
    TextInput {
        value: String,
    },
    TextConfirm,
    TextCancel,
    /// Show only these layers; `null` or `[]` shows every layer.
    SetVisibleLayers {
        #[serde(default)]
        layers: Option<Vec<i64>>,
    },
    ToggleLayer {
        layer: i64,
    },
    ShowAllLayers,
}

/// Buttons arrive as names (`"middle"`) or DOM indices (`1`).
fn button<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Button, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Index(i16),
        Name(Button),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Index(index) => Button::from_index(index),
        Raw::Name(button) => button,
    })
}

/// What one event did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// 1-based position in the script.
    pub step: usize,
    pub actions: Vec<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Apply one event to the engine.
pub fn apply(core: &mut EngineCore, event: &HostEvent) -> Result<Vec<Action>, String> {
    let actions = match event {
        HostEvent::Viewport { width, height } => core.set_viewport(*width, *height),
        HostEvent::SetTool { tool } => core.set_tool(*tool),
        HostEvent::PointerDown { x, y, button, modifiers } => {
            core.on_pointer_down(Point::new(*x, *y), *button, *modifiers)
        }
        HostEvent::PointerMove { x, y, modifiers } => core.on_pointer_move(Point::new(*x, *y), *modifiers),
        HostEvent::PointerUp { x, y, button, modifiers } => {
            core.on_pointer_up(Point::new(*x, *y), *button, *modifiers)
        }
        HostEvent::PointerCancel => core.on_pointer_cancel(),
        HostEvent::PointerLeave => core.on_pointer_leave(),
        HostEvent::DoubleClick => core.on_double_click(),
        HostEvent::Wheel { x, y, dx, dy, modifiers } => {
            core.on_wheel(Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, *modifiers)
        }
        HostEvent::KeyDown { key, modifiers, focus } => core.on_key_down(&Key(key.clone()), *modifiers, *focus),
        HostEvent::Delete => core.activate_delete(),
        HostEvent::TextInput { value } => {
            if core.update_text(value) {
                vec![Action::RenderNeeded]
            } else {
                Vec::new()
            }
        }
        HostEvent::TextConfirm => {
            let id = core.confirm_text().map_err(|e| e.to_string())?;
            vec![Action::EntityCreated { id }, Action::RenderNeeded]
        }
        HostEvent::SetVisibleLayers { layers } => core.set_visible_layers(layers.clone()),
        HostEvent::ToggleLayer { layer } => core.toggle_layer(*layer),
        HostEvent::ShowAllLayers => core.show_all_layers(),
        HostEvent::TextCancel => {
            if core.cancel_text() {
                vec![Action::RenderNeeded]
            } else {
                Vec::new()
            }
        }
    };
    Ok(actions)
}

/// Run every event in order. Failed events are recorded and replay continues.
pub fn replay(core: &mut EngineCore, events: &[HostEvent]) -> Vec<Step> {
    events
        .iter()
        .enumerate()
        .map(|(idx, event)| {
            let step = idx + 1;
            match apply(core, event) {
                Ok(actions) => Step { step, actions, error: None },
                Err(error) => {
                    tracing::warn!(step, %error, "replay event rejected");
                    Step { step, actions: Vec::new(), error: Some(error) }
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "replay_test.rs"]
mod tests;
