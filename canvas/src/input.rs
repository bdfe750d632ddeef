//! Input model: tools, modifier keys, mouse buttons, and the pointer gesture state.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `InputState` is the gesture tracked between pointer-down and
//! pointer-up by [`crate::engine::EngineCore`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Selection tool whose toolbar action deletes the current selection.
    Delete,
    /// Draw a straight segment with two clicks.
    Line,
    /// Draw an axis-aligned rectangle with two clicks.
    Rect,
    /// Draw a polygon point by point; double-click commits.
    Polygon,
    /// Place a text label at a clicked anchor.
    Text,
}

impl Tool {
    /// Whether pointer input selects and hit-tests rather than authors.
    #[must_use]
    pub fn is_selecting(self) -> bool {
        matches!(self, Self::Select | Self::Delete)
    }

    /// Whether this tool authors new entities.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Line | Self::Rect | Self::Polygon | Self::Text)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn toggles(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM-style button index (0 primary, 1 middle, 2 secondary).
    #[must_use]
    pub fn from_index(index: i16) -> Self {
        match index {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        matches!(self.0.as_str(), "Escape" | "Esc")
    }
}

/// What held keyboard focus when a key event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    /// The drawing surface or nothing in particular.
    #[default]
    Canvas,
    /// A text input, textarea, select or content-editable element.
    TextInput,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Cursor the host should show over the surface; serializes as the CSS cursor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Default,
    Pointer,
    Grabbing,
    Crosshair,
}

/// Pointer gesture in progress for the selecting tools.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the view with the middle or secondary button.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The primary button is down; this becomes a drag-selection once the
    /// pointer travels past the drag threshold, otherwise it is a click.
    Selecting {
        /// Screen-space position of the pointer-down.
        down_screen: Point,
        /// Whether the drag threshold has been exceeded.
        dragging: bool,
    },
}
