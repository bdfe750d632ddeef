#![allow(clippy::float_cmp)]

use super::*;

fn b(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
    Bounds::new(min_x, min_y, max_x, max_y)
}

fn entity(id: EntityId, bounds: Bounds) -> Entity<()> {
    Entity::new(id, bounds, ())
}

/// Two 10x10 boxes side by side and a small box inside the first.
fn engine() -> SelectionEngine<()> {
    let mut engine = SelectionEngine::new(16.0);
    engine.register_entities(vec![
        entity(1, b(0.0, 0.0, 10.0, 10.0)),
        entity(2, b(20.0, 0.0, 30.0, 10.0)),
        entity(3, b(4.0, 4.0, 6.0, 6.0)),
    ]);
    engine
}

const PLAIN: SelectOptions = SelectOptions { additive: false, toggle: false, keep_existing_on_miss: false };
const SHIFT: SelectOptions = SelectOptions { additive: true, toggle: false, keep_existing_on_miss: true };
const CTRL: SelectOptions = SelectOptions { additive: false, toggle: true, keep_existing_on_miss: true };

// --- Registry ---

#[test]
fn register_replaces_everything() {
    let mut engine = engine();
    engine.select_ids(&[1, 2], false);
    engine.set_hovered(Some(1));
    engine.begin_selection(Point::new(0.0, 0.0));

    let ids = engine.register_entities(vec![entity(7, b(0.0, 0.0, 1.0, 1.0))]);
    assert_eq!(ids, vec![7]);
    assert_eq!(engine.len(), 1);
    assert!(engine.selection().is_empty());
    assert_eq!(engine.hovered(), None);
    assert!(!engine.is_dragging());
    assert_eq!(engine.index().len(), 1);
}

#[test]
fn add_or_update_reindexes() {
    let mut engine = engine();
    assert!(!engine.add_or_update_entity(entity(4, b(100.0, 100.0, 101.0, 101.0))));
    assert!(engine.add_or_update_entity(entity(1, b(200.0, 200.0, 210.0, 210.0))));
    assert_eq!(engine.len(), 4);
    assert!(engine.hit_test(Point::new(1.0, 1.0), 0.5).is_none_or(|h| h.id != 1));
    assert_eq!(engine.hit_test(Point::new(205.0, 205.0), 1.0).map(|h| h.id), Some(1));
}

#[test]
fn remove_entity_prunes_selection_and_hover() {
    let mut engine = engine();
    engine.select_ids(&[1, 2], false);
    engine.set_hovered(Some(1));
    assert!(engine.remove_entity(1));
    assert!(!engine.remove_entity(1));
    assert_eq!(engine.selection(), vec![2]);
    assert_eq!(engine.hovered(), None);
    assert!(engine.entity(1).is_none());
}

#[test]
fn clear_and_reset() {
    let mut engine = engine();
    engine.select_ids(&[3], false);
    engine.clear_entities();
    assert!(engine.is_empty());
    assert!(engine.selection().is_empty());

    let mut engine = self::engine();
    engine.reset();
    assert!(engine.is_empty());
    assert_eq!(engine.index().cell_size(), 16.0);
}

#[test]
fn entities_in_orders_by_id() {
    let engine = engine();
    let ids: Vec<EntityId> = engine.entities_in(&b(-1.0, -1.0, 25.0, 11.0)).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(engine.entities().count(), 3);
}

// --- Hit-testing ---

#[test]
fn hit_test_center_beats_offset() {
    let mut engine = SelectionEngine::new(16.0);
    engine.register_entities(vec![entity(1, b(-5.0, -5.0, 5.0, 5.0)), entity(2, b(0.0, 0.0, 10.0, 10.0))]);
    let hit = engine.hit_test(Point::new(0.0, 0.0), 6.0).unwrap();
    assert_eq!(hit.id, 1);
    assert_eq!(hit.distance, 0.0);
}

#[test]
fn hit_test_center_distance_reported() {
    let mut engine = SelectionEngine::new(16.0);
    engine.register_entities(vec![entity(1, b(0.0, 0.0, 10.0, 10.0))]);
    let hit = engine.hit_test(Point::new(5.0, 0.0), 6.0).unwrap();
    assert_eq!(hit.distance, 5.0);
}

#[test]
fn hit_test_equal_distance_prefers_smaller() {
    let engine = engine();
    // Boxes 1 and 3 share the center (5, 5).
    assert_eq!(engine.hit_test(Point::new(5.0, 5.0), 1.0).map(|h| h.id), Some(3));
}

#[test]
fn hit_test_miss() {
    assert!(engine().hit_test(Point::new(15.0, 50.0), 2.0).is_none());
}

#[test]
fn hit_test_radius_reaches_nearby_box() {
    let engine = engine();
    assert!(engine.hit_test(Point::new(15.0, 5.0), 4.0).is_none());
    assert_eq!(engine.hit_test(Point::new(15.0, 5.0), 5.0).map(|h| h.id), Some(1));
}

// --- Point selection ---

#[test]
fn plain_click_replaces() {
    let mut engine = engine();
    assert_eq!(engine.select_at(Point::new(25.0, 5.0), 1.0, PLAIN), vec![2]);
    assert_eq!(engine.select_at(Point::new(5.0, 5.0), 1.0, PLAIN), vec![3]);
}

#[test]
fn plain_miss_clears() {
    let mut engine = engine();
    engine.select_ids(&[1, 2], false);
    assert!(engine.select_at(Point::new(15.0, 50.0), 1.0, PLAIN).is_empty());
}

#[test]
fn miss_with_keep_preserves() {
    let mut engine = engine();
    engine.select_ids(&[2], false);
    let keep = SelectOptions { keep_existing_on_miss: true, ..PLAIN };
    assert_eq!(engine.select_at(Point::new(15.0, 50.0), 1.0, keep), vec![2]);
}

#[test]
fn shift_click_adds() {
    let mut engine = engine();
    engine.select_at(Point::new(25.0, 5.0), 1.0, PLAIN);
    assert_eq!(engine.select_at(Point::new(1.0, 1.0), 1.0, SHIFT), vec![1, 2]);
    assert_eq!(engine.select_at(Point::new(1.0, 1.0), 1.0, SHIFT), vec![1, 2]);
}

#[test]
fn toggle_click_flips_membership() {
    let mut engine = engine();
    engine.select_ids(&[1, 2], false);
    assert_eq!(engine.select_at(Point::new(25.0, 5.0), 1.0, CTRL), vec![1]);
    assert_eq!(engine.select_at(Point::new(25.0, 5.0), 1.0, CTRL), vec![1, 2]);
    assert_eq!(engine.select_at(Point::new(15.0, 50.0), 1.0, CTRL), vec![1, 2]);
}

#[test]
fn toggle_wins_over_additive() {
    let mut engine = engine();
    engine.select_ids(&[2], false);
    let both = SelectOptions { additive: true, toggle: true, keep_existing_on_miss: true };
    assert!(engine.select_at(Point::new(25.0, 5.0), 1.0, both).is_empty());
}

#[test]
fn toggle_and_select_ids_ignore_unknown() {
    let mut engine = engine();
    assert!(engine.toggle_selection(99).is_empty());
    assert_eq!(engine.toggle_selection(2), vec![2]);
    assert_eq!(engine.select_ids(&[3, 99, 1], true), vec![1, 2, 3]);
    assert!(engine.is_selected(3));
    engine.clear_selection();
    assert!(engine.selection().is_empty());
}

// --- Box selection ---

#[test]
fn select_within_replaces_or_extends() {
    let mut engine = engine();
    engine.select_ids(&[2], false);
    assert_eq!(engine.select_within(&b(3.0, 3.0, 7.0, 7.0), false), vec![1, 3]);
    engine.select_ids(&[2], false);
    assert_eq!(engine.select_within(&b(3.0, 3.0, 7.0, 7.0), true), vec![1, 2, 3]);
}

#[test]
fn drag_lifecycle_selects_intersecting() {
    let mut engine = engine();
    engine.begin_selection(Point::new(-1.0, -1.0));
    assert!(engine.is_dragging());
    assert_eq!(engine.update_selection(Point::new(21.0, 2.0)), Some(b(-1.0, -1.0, 21.0, 2.0)));
    assert_eq!(engine.selection_box(), Some(b(-1.0, -1.0, 21.0, 2.0)));
    assert_eq!(engine.finalize_selection(FinalizeOptions::default()), vec![1, 2]);
    assert!(!engine.is_dragging());
    assert_eq!(engine.selection_box(), None);
}

#[test]
fn drag_box_normalizes_reverse_drag() {
    let mut engine = engine();
    engine.begin_selection(Point::new(10.0, 10.0));
    assert_eq!(engine.update_selection(Point::new(0.0, 0.0)), Some(b(0.0, 0.0, 10.0, 10.0)));
}

#[test]
fn tiny_drag_is_discarded() {
    let mut engine = engine();
    engine.select_ids(&[2], false);
    engine.begin_selection(Point::new(4.0, 4.0));
    engine.update_selection(Point::new(5.0, 5.0));
    assert!(engine.finalize_selection(FinalizeOptions::default()).is_empty());
    assert_eq!(engine.selection(), vec![2]);
    assert!(!engine.is_dragging());
}

#[test]
fn additive_drag_extends() {
    let mut engine = engine();
    engine.select_ids(&[2], false);
    engine.begin_selection(Point::new(0.0, 0.0));
    engine.update_selection(Point::new(3.0, 3.0));
    let selected = engine.finalize_selection(FinalizeOptions { additive: true, min_area: 4.0 });
    assert_eq!(selected, vec![1, 2]);
}

#[test]
fn drag_calls_while_idle_are_noops() {
    let mut engine = engine();
    assert_eq!(engine.update_selection(Point::new(1.0, 1.0)), None);
    assert!(engine.finalize_selection(FinalizeOptions::default()).is_empty());
    engine.cancel_selection();
    assert!(!engine.is_dragging());
}

#[test]
fn cancel_drag_selects_nothing() {
    let mut engine = engine();
    engine.begin_selection(Point::new(-1.0, -1.0));
    engine.update_selection(Point::new(40.0, 40.0));
    engine.cancel_selection();
    assert!(engine.finalize_selection(FinalizeOptions::default()).is_empty());
    assert!(engine.selection().is_empty());
}

#[test]
fn begin_ignores_non_finite_origin() {
    let mut engine = engine();
    engine.begin_selection(Point::new(f64::NAN, 0.0));
    assert!(!engine.is_dragging());
}

// --- Delete / hover ---

#[test]
fn delete_selected_removes_and_clears() {
    let mut engine = engine();
    engine.select_ids(&[3, 1], false);
    engine.set_hovered(Some(3));
    assert_eq!(engine.delete_selected(), vec![1, 3]);
    assert_eq!(engine.len(), 1);
    assert!(engine.selection().is_empty());
    assert_eq!(engine.hovered(), None);
    assert!(engine.hit_test(Point::new(5.0, 5.0), 1.0).is_none());
}

#[test]
fn delete_with_empty_selection_is_noop() {
    let mut engine = engine();
    assert!(engine.delete_selected().is_empty());
    assert_eq!(engine.len(), 3);
}

#[test]
fn hover_does_not_touch_selection() {
    let mut engine = engine();
    engine.select_ids(&[2], false);
    assert!(engine.set_hovered(Some(1)));
    assert!(!engine.set_hovered(Some(1)));
    assert_eq!(engine.selection(), vec![2]);
    assert!(engine.set_hovered(None));
}

// --- Layers ---

/// Entity 1 on layer 10, entity 2 on layer 20, entity 3 without a layer.
fn layered() -> SelectionEngine<()> {
    let mut engine = SelectionEngine::new(16.0);
    engine.register_entities(vec![
        entity(1, b(0.0, 0.0, 10.0, 10.0)).with_layer(10),
        entity(2, b(20.0, 0.0, 30.0, 10.0)).with_layer(20),
        entity(3, b(40.0, 0.0, 42.0, 2.0)),
    ]);
    engine
}

fn ids(entities: &[&Entity<()>]) -> Vec<EntityId> {
    entities.iter().map(|e| e.id).collect()
}

#[test]
fn every_layer_shown_by_default() {
    let engine = layered();
    assert_eq!(engine.layers(), vec![10, 20]);
    assert_eq!(engine.visible_layers(), vec![10, 20]);
    assert_eq!(ids(&engine.entities_in(&b(-5.0, -5.0, 50.0, 50.0))), vec![1, 2, 3]);
}

#[test]
fn hidden_layer_is_skipped_by_queries() {
    let mut engine = layered();
    assert!(engine.set_visible_layers(Some(&[20])));
    assert!(!engine.is_layer_visible(10));
    assert_eq!(engine.visible_layers(), vec![20]);
    assert_eq!(ids(&engine.entities_in(&b(-5.0, -5.0, 50.0, 50.0))), vec![2, 3]);
    assert!(engine.hit_test(Point::new(5.0, 5.0), 1.0).is_none());
    assert_eq!(engine.select_within(&b(-5.0, -5.0, 50.0, 50.0), false), vec![2, 3]);
    // Hidden entities stay registered.
    assert!(engine.contains(1));
}

#[test]
fn empty_layer_list_shows_everything() {
    let mut engine = layered();
    engine.set_visible_layers(Some(&[10]));
    assert!(engine.set_visible_layers(Some(&[])));
    assert_eq!(engine.visible_layers(), vec![10, 20]);
    assert!(!engine.set_visible_layers(None));
}

#[test]
fn hiding_hovered_layer_clears_hover() {
    let mut engine = layered();
    engine.set_hovered(Some(1));
    engine.set_visible_layers(Some(&[20]));
    assert_eq!(engine.hovered(), None);
}

#[test]
fn toggle_layer_flips_and_restores() {
    let mut engine = layered();
    assert!(engine.toggle_layer(10));
    assert_eq!(engine.visible_layers(), vec![20]);
    assert!(engine.toggle_layer(10));
    assert_eq!(engine.visible_layers(), vec![10, 20]);
    assert!(engine.is_layer_visible(99), "no filter left behind");
}

#[test]
fn reset_drops_layer_filter() {
    let mut engine = layered();
    engine.set_visible_layers(Some(&[10]));
    engine.reset();
    assert!(engine.is_layer_visible(20));
}
