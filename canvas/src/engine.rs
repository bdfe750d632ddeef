//! Interaction engine: raw pointer, wheel and keyboard events in, actions out.
//!
//! `EngineCore` is an owned instance the host holds and drives by `&mut`; it
//! never blocks or performs I/O. Each handler runs to completion and returns
//! the [`Action`]s the host should apply (redraw, cursor changes, persisting
//! created or deleted entities upstream).

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::Serialize;

use crate::camera::{Camera, CameraState, Point};
use crate::config::{CanvasConfig, ConfigError};
use crate::doc::{Bounds, Entity, EntityId};
use crate::input::{Button, Cursor, Focus, InputState, Key, Modifiers, Tool, WheelDelta};
use crate::selection::{FinalizeOptions, SelectOptions, SelectionEngine};
use crate::shape::Shape;
use crate::tools::{Draft, TextError, ToolState};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// The selection set changed; `ids` is the full new selection, ascending.
    SelectionChanged { ids: Vec<EntityId> },
    /// The hovered entity changed.
    HoverChanged { id: Option<EntityId> },
    /// A drawing tool committed a new local entity.
    EntityCreated { id: EntityId },
    /// Entities were deleted by the user.
    EntitiesDeleted { ids: Vec<EntityId> },
    /// The host should open its text editor for a draft anchored here.
    TextEditRequested { anchor: Point },
    /// The host should change the pointer cursor.
    SetCursor { cursor: Cursor },
    /// Something visible changed.
    RenderNeeded,
}

/// All interaction state for one drawing surface.
pub struct EngineCore {
    pub config: CanvasConfig,
    pub camera: Camera,
    pub selection: SelectionEngine<Shape>,
    pub tools: ToolState,
    pub input: InputState,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl EngineCore {
    /// Build an engine from an already-validated config.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            camera: Camera::new(config.min_scale, config.max_scale),
            selection: SelectionEngine::new(config.cell_size),
            tools: ToolState::new(),
            input: InputState::Idle,
            config,
        }
    }

    /// Validate `config`, then build an engine from it.
    ///
    /// # Errors
    ///
    /// Returns the validation error for an out-of-range config.
    pub fn try_new(config: CanvasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // --- Data inputs ---

    /// Replace every entity. Clears selection, hover and any drag in progress.
    pub fn load_entities(&mut self, entities: Vec<Entity<Shape>>) -> Vec<Action> {
        let had_selection = !self.selection.selection().is_empty();
        let had_hover = self.selection.hovered().is_some();
        self.selection.register_entities(entities);
        if matches!(self.input, InputState::Selecting { .. }) {
            self.input = InputState::Idle;
        }

        let mut actions = Vec::new();
        if had_selection {
            actions.push(Action::SelectionChanged { ids: Vec::new() });
        }
        if had_hover {
            actions.push(Action::HoverChanged { id: None });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Insert or replace one entity.
    pub fn upsert_entity(&mut self, entity: Entity<Shape>) -> Vec<Action> {
        self.selection.add_or_update_entity(entity);
        vec![Action::RenderNeeded]
    }

    /// Remove one entity. Nothing happens for an unknown id.
    pub fn remove_entity(&mut self, id: EntityId) -> Vec<Action> {
        let before = self.selection.selection();
        let hovered = self.selection.hovered();
        if !self.selection.remove_entity(id) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        self.push_selection_change(&before, &mut actions);
        if hovered != self.selection.hovered() {
            actions.push(Action::HoverChanged { id: None });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Update viewport dimensions in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        let before = self.camera.state();
        self.camera.set_viewport(width, height);
        if self.camera.state() == before { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    // --- Layers ---

    /// Show only `layers`; `None` or an empty list shows every layer.
    pub fn set_visible_layers(&mut self, layers: Option<Vec<i64>>) -> Vec<Action> {
        let hovered = self.selection.hovered();
        let changed = self.selection.set_visible_layers(layers.as_deref());
        self.layers_changed(changed, hovered)
    }

    /// Flip one layer's visibility.
    pub fn toggle_layer(&mut self, layer: i64) -> Vec<Action> {
        let hovered = self.selection.hovered();
        let changed = self.selection.toggle_layer(layer);
        self.layers_changed(changed, hovered)
    }

    pub fn show_all_layers(&mut self) -> Vec<Action> {
        self.set_visible_layers(None)
    }

    // --- Tools ---

    /// Switch tools. Any draft and any pointer gesture in progress are discarded.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.tools.set_tool(tool);
        self.selection.cancel_selection();
        self.input = InputState::Idle;

        let mut actions = Vec::new();
        if tool.is_drawing() && self.selection.set_hovered(None) {
            actions.push(Action::HoverChanged { id: None });
        }
        let cursor = if tool.is_drawing() { Cursor::Crosshair } else { Cursor::Default };
        actions.push(Action::SetCursor { cursor });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The toolbar's delete button: delete the selection without changing tools.
    pub fn activate_delete(&mut self) -> Vec<Action> {
        self.delete_selected()
    }

    /// Replace the text of the open text draft.
    pub fn update_text(&mut self, value: &str) -> bool {
        self.tools.update_text(value)
    }

    /// Commit the open text draft.
    ///
    /// # Errors
    ///
    /// Returns a [`TextError`] for a missing draft or invalid text; the draft stays open.
    pub fn confirm_text(&mut self) -> Result<EntityId, TextError> {
        self.tools.confirm_text(&mut self.selection)
    }

    /// Close the text draft without creating anything.
    pub fn cancel_text(&mut self) -> bool {
        self.tools.cancel_text()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        tracing::trace!(?screen, ?button, ?modifiers, "pointer down");
        let mut actions = Vec::new();
        if !screen.is_finite() {
            return actions;
        }

        if matches!(button, Button::Middle | Button::Secondary) {
            self.input = InputState::Panning { last_screen: screen };
            if self.selection.set_hovered(None) {
                actions.push(Action::HoverChanged { id: None });
            }
            actions.push(Action::SetCursor { cursor: Cursor::Grabbing });
            return actions;
        }

        let world = self.camera.screen_to_world(screen);
        let tool = self.tools.tool();
        if tool.is_selecting() {
            self.input = InputState::Selecting { down_screen: screen, dragging: false };
            self.selection.begin_selection(world);
            return actions;
        }
        match tool {
            Tool::Select | Tool::Delete => {}
            Tool::Line | Tool::Rect => {
                if self.tools.draft().is_none() {
                    self.tools.start(world);
                } else {
                    self.tools.update(world);
                    if let Some(id) = self.tools.commit(&mut self.selection) {
                        actions.push(Action::EntityCreated { id });
                    }
                }
                actions.push(Action::RenderNeeded);
            }
            Tool::Polygon => {
                if self.tools.draft().is_none() {
                    self.tools.start(world);
                } else {
                    self.tools.add_polygon_point(world);
                }
                actions.push(Action::RenderNeeded);
            }
            Tool::Text => {
                if self.tools.open_text_at(world) {
                    actions.push(Action::TextEditRequested { anchor: world });
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if !screen.is_finite() {
            return actions;
        }
        let world = self.camera.screen_to_world(screen);

        match self.input {
            InputState::Panning { last_screen } => {
                self.camera.pan(Point::new(screen.x - last_screen.x, screen.y - last_screen.y));
                self.input = InputState::Panning { last_screen: screen };
                actions.push(Action::RenderNeeded);
            }
            InputState::Selecting { down_screen, dragging } => {
                let dragging = dragging || screen.distance(down_screen) > self.config.drag_threshold_px;
                self.input = InputState::Selecting { down_screen, dragging };
                if self.selection.update_selection(world).is_some() {
                    actions.push(Action::RenderNeeded);
                }
            }
            InputState::Idle if self.tools.tool().is_selecting() => {
                let hit = self.selection.hit_test(world, self.world_hit_radius()).map(|h| h.id);
                if self.selection.set_hovered(hit) {
                    actions.push(Action::HoverChanged { id: hit });
                    actions.push(Action::SetCursor { cursor: self.hover_cursor() });
                }
            }
            InputState::Idle => {
                if matches!(self.tools.tool(), Tool::Line | Tool::Rect) && self.tools.update(world) {
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    pub fn on_pointer_up(&mut self, screen: Point, _button: Button, modifiers: Modifiers) -> Vec<Action> {
        tracing::trace!(?screen, ?modifiers, "pointer up");
        let mut actions = Vec::new();

        match std::mem::take(&mut self.input) {
            InputState::Idle => {}
            InputState::Panning { .. } => {
                actions.push(Action::SetCursor { cursor: self.restored_cursor() });
            }
            InputState::Selecting { dragging, .. } => {
                let before = self.selection.selection();
                if dragging {
                    self.selection.finalize_selection(FinalizeOptions {
                        additive: modifiers.shift,
                        min_area: self.config.min_selection_area,
                    });
                } else {
                    self.selection.cancel_selection();
                    if screen.is_finite() {
                        let world = self.camera.screen_to_world(screen);
                        let toggle = modifiers.toggles();
                        let options = SelectOptions {
                            additive: modifiers.shift && !toggle,
                            toggle,
                            keep_existing_on_miss: modifiers.shift || toggle,
                        };
                        self.selection.select_at(world, self.world_hit_radius(), options);
                    }
                }
                self.push_selection_change(&before, &mut actions);
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    /// Pointer capture was lost: discard pan and drag-selection state.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Idle => {}
            InputState::Panning { .. } => {
                actions.push(Action::SetCursor { cursor: self.restored_cursor() });
            }
            InputState::Selecting { .. } => {
                self.selection.cancel_selection();
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    /// The pointer left the surface: clear hover unless panning.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if matches!(self.input, InputState::Panning { .. }) {
            return actions;
        }
        if self.selection.set_hovered(None) {
            actions.push(Action::HoverChanged { id: None });
            actions.push(Action::SetCursor { cursor: self.restored_cursor() });
        }
        actions
    }

    /// Double-click commits a polygon draft.
    pub fn on_double_click(&mut self) -> Vec<Action> {
        if self.tools.tool() != Tool::Polygon {
            return Vec::new();
        }
        match self.tools.commit(&mut self.selection) {
            Some(id) => vec![Action::EntityCreated { id }, Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Wheel zooms around the pointer: scrolling up zooms in one step,
    /// scrolling down zooms out. Purely horizontal scrolls are ignored.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 || !delta.dy.is_finite() {
            return Vec::new();
        }
        let step = 1.0 + self.config.zoom_step;
        let factor = if delta.dy < 0.0 { step } else { 1.0 / step };
        let before = self.camera.state();
        self.camera.zoom(factor, Some(screen));
        if self.camera.state() == before { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    /// Delete/Backspace deletes the selection; Escape abandons drafts and drags.
    /// Ignored entirely while a text input holds focus.
    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers, focus: Focus) -> Vec<Action> {
        if focus == Focus::TextInput {
            return Vec::new();
        }
        if key.is_delete() {
            return self.delete_selected();
        }
        if key.is_escape() {
            let mut changed = self.tools.cancel();
            if matches!(self.input, InputState::Selecting { .. }) {
                self.selection.cancel_selection();
                self.input = InputState::Idle;
                changed = true;
            }
            if changed {
                return vec![Action::RenderNeeded];
            }
        }
        Vec::new()
    }

    // --- Queries ---

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tools.tool()
    }

    /// The current selection, ascending.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.selection.selection()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<EntityId> {
        self.selection.hovered()
    }

    /// The drag-selection box in progress, in world coordinates.
    #[must_use]
    pub fn selection_box(&self) -> Option<Bounds> {
        self.selection.selection_box()
    }

    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        self.tools.draft()
    }

    #[must_use]
    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    /// World-space rectangle covered by the viewport.
    #[must_use]
    pub fn view_bounds(&self) -> Bounds {
        self.camera.view_bounds()
    }

    /// Entities on shown layers intersecting the viewport, ordered by id.
    #[must_use]
    pub fn visible_entities(&self) -> Vec<&Entity<Shape>> {
        self.selection.entities_in(&self.camera.view_bounds())
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity<Shape>> {
        self.selection.entity(id)
    }

    /// Known layers currently shown, ascending.
    #[must_use]
    pub fn visible_layers(&self) -> Vec<i64> {
        self.selection.visible_layers()
    }

    // --- Internals ---

    fn world_hit_radius(&self) -> f64 {
        self.camera.screen_dist_to_world(self.config.hit_radius_px)
    }

    fn hover_cursor(&self) -> Cursor {
        if self.selection.hovered().is_some() { Cursor::Pointer } else { Cursor::Default }
    }

    fn restored_cursor(&self) -> Cursor {
        if self.tools.tool().is_drawing() { Cursor::Crosshair } else { self.hover_cursor() }
    }

    fn delete_selected(&mut self) -> Vec<Action> {
        let hovered = self.selection.hovered();
        let removed = self.selection.delete_selected();
        if removed.is_empty() {
            return Vec::new();
        }
        let mut actions = vec![
            Action::EntitiesDeleted { ids: removed },
            Action::SelectionChanged { ids: Vec::new() },
        ];
        if hovered != self.selection.hovered() {
            actions.push(Action::HoverChanged { id: None });
            actions.push(Action::SetCursor { cursor: self.restored_cursor() });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn layers_changed(&self, changed: bool, hovered_before: Option<EntityId>) -> Vec<Action> {
        if !changed {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if hovered_before != self.selection.hovered() {
            actions.push(Action::HoverChanged { id: None });
            actions.push(Action::SetCursor { cursor: self.restored_cursor() });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn push_selection_change(&self, before: &[EntityId], actions: &mut Vec<Action>) {
        let after = self.selection.selection();
        if after != before {
            actions.push(Action::SelectionChanged { ids: after });
        }
    }
}
