//! Selection engine: the authoritative entity registry plus selection state.
//!
//! Owns the id → entity map, the [`GridIndex`] that accelerates every spatial
//! query, the current selection set, the hovered id, and the drag-selection
//! box. The drag lifecycle is a two-state machine:
//!
//! ```text
//! Idle ──begin_selection──▶ Dragging ──finalize/cancel──▶ Idle
//!                            │    ▲
//!                            └────┘ update_selection
//! ```
//!
//! `update_selection` and `finalize_selection` are no-ops while idle.
//!
//! A layer filter hides entities on layers that are not shown. Hidden
//! entities stay registered and indexed but are skipped by hit-testing,
//! drag-selection and [`SelectionEngine::entities_in`]. Entities without a
//! layer are always shown.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::{BTreeSet, HashMap};

use crate::camera::Point;
use crate::consts::{DEFAULT_CELL_SIZE, DEFAULT_MIN_SELECTION_AREA};
use crate::doc::{Bounds, Entity, EntityId};
use crate::grid::GridIndex;
use crate::hit::{self, Hit};

/// Modifier policy for a point selection. `toggle` wins if both flags are set;
/// callers are expected to resolve conflicting modifiers first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Add the hit to the selection (e.g. Shift+click).
    pub additive: bool,
    /// Flip the hit's membership (e.g. Ctrl/Cmd+click).
    pub toggle: bool,
    /// Keep the selection when a plain click hits nothing.
    pub keep_existing_on_miss: bool,
}

/// Options for closing a drag-selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalizeOptions {
    /// Union with the current selection instead of replacing it.
    pub additive: bool,
    /// Boxes with a smaller area (world units²) are discarded as accidental.
    pub min_area: f64,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self { additive: false, min_area: DEFAULT_MIN_SELECTION_AREA }
    }
}

/// An in-progress drag-selection.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragBox {
    origin: Point,
    bounds: Bounds,
}

/// Registry, spatial index and selection state for one drawing surface.
#[derive(Debug, Clone)]
pub struct SelectionEngine<P> {
    entities: HashMap<EntityId, Entity<P>>,
    index: GridIndex<EntityId>,
    selected: BTreeSet<EntityId>,
    hovered: Option<EntityId>,
    drag: Option<DragBox>,
    /// Shown layers; `None` shows every layer.
    layer_filter: Option<BTreeSet<i64>>,
}

impl<P> Default for SelectionEngine<P> {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl<P> SelectionEngine<P> {
    /// Create an empty engine whose index uses `cell_size` world units per cell.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        Self {
            entities: HashMap::new(),
            index: GridIndex::new(cell_size),
            selected: BTreeSet::new(),
            hovered: None,
            drag: None,
            layer_filter: None,
        }
    }

    // --- Registry ---

    /// Replace every entity and rebuild the index from scratch. Clears the
    /// selection, hover and any drag in progress. Returns the registered ids
    /// in input order.
    pub fn register_entities(&mut self, entities: Vec<Entity<P>>) -> Vec<EntityId> {
        let ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
        self.index.load(entities.iter().map(|e| (e.id, e.bounds)));
        self.entities = entities.into_iter().map(|e| (e.id, e)).collect();
        self.selected.clear();
        self.hovered = None;
        self.drag = None;
        tracing::debug!(count = self.entities.len(), cells = self.index.occupied_cells(), "entities registered");
        ids
    }

    /// Insert a new entity or replace an existing one with the same id.
    /// Returns true when an existing entity was replaced.
    pub fn add_or_update_entity(&mut self, entity: Entity<P>) -> bool {
        let replaced = self.entities.contains_key(&entity.id);
        if replaced {
            self.index.update(entity.id, entity.bounds);
        } else {
            self.index.insert(entity.id, entity.bounds);
        }
        self.entities.insert(entity.id, entity);
        replaced
    }

    /// Remove one entity, pruning it from the selection and hover.
    /// Returns false if the id is unknown.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if self.entities.remove(&id).is_none() {
            return false;
        }
        self.index.remove(id);
        self.selected.remove(&id);
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        true
    }

    /// Drop every entity along with the selection, hover and drag state.
    pub fn clear_entities(&mut self) {
        self.entities.clear();
        self.index.clear();
        self.selected.clear();
        self.hovered = None;
        self.drag = None;
    }

    /// Back to a freshly constructed engine, keeping the index cell size.
    pub fn reset(&mut self) {
        self.clear_entities();
        self.layer_filter = None;
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity<P>> {
        self.entities.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Every registered entity, in arbitrary order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity<P>> + '_ {
        self.entities.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Shown entities whose boxes intersect `bounds`, ordered by id. Used for culling.
    #[must_use]
    pub fn entities_in(&self, bounds: &Bounds) -> Vec<&Entity<P>> {
        self.index
            .search(bounds)
            .into_iter()
            .filter_map(|id| self.entities.get(&id))
            .filter(|e| self.is_shown(e))
            .collect()
    }

    #[must_use]
    pub fn index(&self) -> &GridIndex<EntityId> {
        &self.index
    }

    // --- Hit-testing ---

    /// The entity best matching `point` within a square of half-width `radius`:
    /// nearest box center, then smallest box. `None` on a miss.
    #[must_use]
    pub fn hit_test(&self, point: Point, radius: f64) -> Option<Hit> {
        let query = Bounds::around(point, radius);
        let candidates = self
            .index
            .search(&query)
            .into_iter()
            .filter_map(|id| self.entities.get(&id))
            .filter(|e| self.is_shown(e))
            .map(|e| (e.id, e.bounds));
        hit::best_hit(point, candidates)
    }

    // --- Selection ---

    /// The current selection, ascending and deduplicated.
    #[must_use]
    pub fn selection(&self) -> Vec<EntityId> {
        self.selected.iter().copied().collect()
    }

    #[must_use]
    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    /// Point selection with modifier policy. Returns the resulting selection.
    ///
    /// - plain: replace with the hit; a miss clears unless `keep_existing_on_miss`.
    /// - `toggle`: flip the hit's membership; a miss changes nothing.
    /// - `additive`: add the hit; a miss changes nothing.
    pub fn select_at(&mut self, point: Point, radius: f64, options: SelectOptions) -> Vec<EntityId> {
        let Some(hit) = self.hit_test(point, radius) else {
            if !options.keep_existing_on_miss && !options.additive && !options.toggle {
                self.selected.clear();
            }
            return self.selection();
        };

        if options.toggle {
            if !self.selected.remove(&hit.id) {
                self.selected.insert(hit.id);
            }
        } else if options.additive {
            self.selected.insert(hit.id);
        } else {
            self.selected.clear();
            self.selected.insert(hit.id);
        }
        self.selection()
    }

    /// Select every entity whose box intersects `bounds`, replacing the
    /// selection or, with `additive`, adding to it. Returns the resulting selection.
    pub fn select_within(&mut self, bounds: &Bounds, additive: bool) -> Vec<EntityId> {
        let hits: Vec<EntityId> = self.entities_in(bounds).iter().map(|e| e.id).collect();
        if !additive {
            self.selected.clear();
        }
        self.selected.extend(hits);
        self.selection()
    }

    /// Flip one id's membership. Unknown ids are ignored.
    pub fn toggle_selection(&mut self, id: EntityId) -> Vec<EntityId> {
        if self.entities.contains_key(&id) && !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.selection()
    }

    /// Select the given ids, replacing or extending the selection. Unknown ids are ignored.
    pub fn select_ids(&mut self, ids: &[EntityId], additive: bool) -> Vec<EntityId> {
        if !additive {
            self.selected.clear();
        }
        self.selected.extend(ids.iter().copied().filter(|id| self.entities.contains_key(id)));
        self.selection()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Remove every selected entity. Returns the removed ids, ascending;
    /// empty when nothing was selected.
    pub fn delete_selected(&mut self) -> Vec<EntityId> {
        let removed: Vec<EntityId> = std::mem::take(&mut self.selected).into_iter().collect();
        for id in &removed {
            self.entities.remove(id);
            self.index.remove(*id);
        }
        if self.hovered.is_some_and(|id| removed.binary_search(&id).is_ok()) {
            self.hovered = None;
        }
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "deleted selected entities");
        }
        removed
    }

    // --- Layers ---

    /// Every layer id carried by a registered entity, ascending.
    #[must_use]
    pub fn layers(&self) -> Vec<i64> {
        let layers: BTreeSet<i64> = self.entities.values().filter_map(|e| e.layer_id).collect();
        layers.into_iter().collect()
    }

    /// Known layers currently shown, ascending.
    #[must_use]
    pub fn visible_layers(&self) -> Vec<i64> {
        self.layers().into_iter().filter(|layer| self.is_layer_visible(*layer)).collect()
    }

    #[must_use]
    pub fn is_layer_visible(&self, layer: i64) -> bool {
        self.layer_filter.as_ref().is_none_or(|shown| shown.contains(&layer))
    }

    /// Show only `layers`; `None` or an empty list shows every layer.
    /// Clears the hover if it lands on a hidden entity. Returns true if the
    /// filter changed.
    pub fn set_visible_layers(&mut self, layers: Option<&[i64]>) -> bool {
        let next: Option<BTreeSet<i64>> =
            layers.filter(|l| !l.is_empty()).map(|l| l.iter().copied().collect());
        if next == self.layer_filter {
            return false;
        }
        self.layer_filter = next;
        if self.hovered.is_some_and(|id| self.entities.get(&id).is_some_and(|e| !self.is_shown(e))) {
            self.hovered = None;
        }
        tracing::debug!(layers = ?self.layer_filter, "layer filter changed");
        true
    }

    /// Flip one layer. Hiding the last shown layer shows every layer again,
    /// and showing every known layer drops the filter.
    pub fn toggle_layer(&mut self, layer: i64) -> bool {
        let mut shown: BTreeSet<i64> = self.visible_layers().into_iter().collect();
        if !shown.remove(&layer) {
            shown.insert(layer);
        }
        let shown: Vec<i64> = shown.into_iter().collect();
        if shown == self.layers() {
            return self.set_visible_layers(None);
        }
        self.set_visible_layers(Some(&shown))
    }

    fn is_shown(&self, entity: &Entity<P>) -> bool {
        entity.layer_id.is_none_or(|layer| self.is_layer_visible(layer))
    }

    // --- Hover ---

    #[must_use]
    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    /// Set the hovered id. Returns true if it changed. Does not touch the selection.
    pub fn set_hovered(&mut self, id: Option<EntityId>) -> bool {
        if self.hovered == id {
            return false;
        }
        self.hovered = id;
        true
    }

    // --- Drag-selection ---

    /// Open a zero-area drag box anchored at `origin`, replacing any box in progress.
    pub fn begin_selection(&mut self, origin: Point) {
        if !origin.is_finite() {
            return;
        }
        self.drag = Some(DragBox { origin, bounds: Bounds::from_corners(origin, origin) });
    }

    /// Stretch the drag box to span its origin and `point`. Returns the new box,
    /// or `None` when no drag is in progress.
    pub fn update_selection(&mut self, point: Point) -> Option<Bounds> {
        let drag = self.drag.as_mut()?;
        if point.is_finite() {
            drag.bounds = Bounds::from_corners(drag.origin, point);
        }
        Some(drag.bounds)
    }

    /// Close the drag box. If its area reaches `min_area` the box is applied
    /// with [`Self::select_within`] and the resulting selection is returned;
    /// smaller boxes (and calls while idle) return nothing and leave the
    /// selection untouched.
    pub fn finalize_selection(&mut self, options: FinalizeOptions) -> Vec<EntityId> {
        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        if drag.bounds.area() < options.min_area {
            tracing::trace!(area = drag.bounds.area(), "drag below threshold discarded");
            return Vec::new();
        }
        self.select_within(&drag.bounds, options.additive)
    }

    /// Discard the drag box without selecting.
    pub fn cancel_selection(&mut self) {
        self.drag = None;
    }

    /// The drag box in progress, for overlay rendering.
    #[must_use]
    pub fn selection_box(&self) -> Option<Bounds> {
        self.drag.map(|d| d.bounds)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
