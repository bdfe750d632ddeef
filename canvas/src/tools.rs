//! Drawing tools: per-tool draft lifecycle and commit into the selection engine.
//!
//! Exactly one tool is active. A draft exists only between its start and
//! commit/cancel; switching tools always discards it. Committed entities are
//! tagged [`Origin::Local`] and receive negative, monotonically decreasing ids.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use serde::Serialize;

use crate::camera::Point;
use crate::consts::{DEFAULT_TEXT_HEIGHT, MAX_TEXT_CHARS};
use crate::doc::{Bounds, Entity, EntityId, Origin};
use crate::input::Tool;
use crate::selection::SelectionEngine;
use crate::shape::Shape;

/// Why a text draft could not be confirmed. Reported as data for inline feedback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// There is no open text draft.
    #[error("no text position; click on the canvas to place text")]
    NoAnchor,
    /// The trimmed text is empty.
    #[error("text is required")]
    Empty,
    /// The trimmed text exceeds the length limit.
    #[error("text must be at most {max} characters (got {len})")]
    TooLong { len: usize, max: usize },
}

/// Uncommitted geometry being authored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Draft {
    Line { start: Point, end: Option<Point> },
    Rect { start: Point, end: Option<Point> },
    Polygon { points: Vec<Point> },
    Text { anchor: Point, text: String },
}

/// Active tool, current draft, and the local id counter.
#[derive(Debug, Clone)]
pub struct ToolState {
    tool: Tool,
    draft: Option<Draft>,
    next_local_id: EntityId,
}

impl Default for ToolState {
    fn default() -> Self {
        Self { tool: Tool::default(), draft: None, next_local_id: -1 }
    }
}

impl ToolState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Whether a text draft is open for editing.
    #[must_use]
    pub fn is_editing_text(&self) -> bool {
        matches!(self.draft, Some(Draft::Text { .. }))
    }

    /// Switch tools, discarding any draft.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.draft = None;
    }

    /// Open a draft for the active line, rect or polygon tool. Returns false
    /// for other tools or a non-finite point.
    pub fn start(&mut self, at: Point) -> bool {
        if !at.is_finite() {
            return false;
        }
        self.draft = match self.tool {
            Tool::Line => Some(Draft::Line { start: at, end: None }),
            Tool::Rect => Some(Draft::Rect { start: at, end: None }),
            Tool::Polygon => Some(Draft::Polygon { points: vec![at] }),
            Tool::Select | Tool::Delete | Tool::Text => return false,
        };
        true
    }

    /// Set or overwrite the second point of a line or rect draft (live preview).
    pub fn update(&mut self, to: Point) -> bool {
        if !to.is_finite() {
            return false;
        }
        match &mut self.draft {
            Some(Draft::Line { end, .. } | Draft::Rect { end, .. }) => {
                *end = Some(to);
                true
            }
            _ => false,
        }
    }

    /// Append a vertex to a polygon draft.
    pub fn add_polygon_point(&mut self, point: Point) -> bool {
        if !point.is_finite() {
            return false;
        }
        match &mut self.draft {
            Some(Draft::Polygon { points }) => {
                points.push(point);
                true
            }
            _ => false,
        }
    }

    /// Commit a complete line, rect or polygon draft as a new local entity.
    ///
    /// Lines and rects need both points, polygons at least two. An incomplete
    /// draft stays open and `None` is returned.
    pub fn commit(&mut self, engine: &mut SelectionEngine<Shape>) -> Option<EntityId> {
        let shape = match self.draft.as_ref()? {
            Draft::Line { start, end: Some(end) } => Shape::Line { start: *start, end: *end },
            Draft::Rect { start, end: Some(end) } => Shape::Rect { a: *start, b: *end },
            Draft::Polygon { points } if points.len() >= 2 => Shape::Polygon { points: points.clone() },
            _ => return None,
        };
        let bounds = shape.bounding_box()?;
        self.draft = None;
        Some(self.create(engine, bounds, shape))
    }

    /// Discard the current draft, whatever its kind.
    pub fn cancel(&mut self) -> bool {
        self.draft.take().is_some()
    }

    // --- Text ---

    /// Open a text draft anchored at `at`. Only valid with the text tool.
    pub fn open_text_at(&mut self, at: Point) -> bool {
        if self.tool != Tool::Text || !at.is_finite() {
            return false;
        }
        self.draft = Some(Draft::Text { anchor: at, text: String::new() });
        true
    }

    /// Replace the text of the open text draft.
    pub fn update_text(&mut self, value: &str) -> bool {
        match &mut self.draft {
            Some(Draft::Text { text, .. }) => {
                value.clone_into(text);
                true
            }
            _ => false,
        }
    }

    /// Validate and commit the open text draft as a zero-area entity at its anchor.
    ///
    /// # Errors
    ///
    /// [`TextError::NoAnchor`] without an open text draft, [`TextError::Empty`]
    /// for blank text, [`TextError::TooLong`] past the length limit. The draft
    /// stays open on error so the user can correct it.
    pub fn confirm_text(&mut self, engine: &mut SelectionEngine<Shape>) -> Result<EntityId, TextError> {
        let Some(Draft::Text { anchor, text }) = &self.draft else {
            return Err(TextError::NoAnchor);
        };
        let content = text.trim();
        if content.is_empty() {
            return Err(TextError::Empty);
        }
        let len = content.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(TextError::TooLong { len, max: MAX_TEXT_CHARS });
        }

        let anchor = *anchor;
        let shape = Shape::Text { position: anchor, content: content.to_owned(), height: DEFAULT_TEXT_HEIGHT };
        self.draft = None;
        Ok(self.create(engine, Bounds::from_corners(anchor, anchor), shape))
    }

    /// Close the text draft without creating anything.
    pub fn cancel_text(&mut self) -> bool {
        if !self.is_editing_text() {
            return false;
        }
        self.draft = None;
        true
    }

    fn allocate_id(&mut self, engine: &SelectionEngine<Shape>) -> EntityId {
        while engine.contains(self.next_local_id) {
            self.next_local_id -= 1;
        }
        let id = self.next_local_id;
        self.next_local_id -= 1;
        id
    }

    fn create(&mut self, engine: &mut SelectionEngine<Shape>, bounds: Bounds, shape: Shape) -> EntityId {
        let id = self.allocate_id(engine);
        let kind = shape.kind();
        engine.add_or_update_entity(Entity::new(id, bounds, shape).with_origin(Origin::Local));
        tracing::debug!(id, %kind, ?bounds, "draft committed");
        id
    }
}
