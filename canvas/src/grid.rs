//! Uniform-grid spatial index over axis-aligned boxes.
//!
//! Every entry is registered under each cell its bounds overlap, where a cell
//! is `(floor(x / cell_size), floor(y / cell_size))`. Queries visit only the
//! cells the query box covers, so their cost depends on the matched cells and
//! not on the total number of entries. Results are approximate by design:
//! an entry matches when its *box* intersects the query box.
//!
//! The index owns cell membership. Callers only insert, update and remove by
//! id; bucket contents are never exposed for mutation.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::consts::{DEFAULT_CELL_SIZE, MAX_CELLS_PER_ENTRY};
use crate::doc::Bounds;

type CellKey = (i64, i64);

/// Inclusive range of grid columns and rows covered by a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min_col: i64,
    max_col: i64,
    min_row: i64,
    max_row: i64,
}

impl CellRange {
    fn count(&self) -> i64 {
        let cols = self.max_col.saturating_sub(self.min_col).saturating_add(1).max(0);
        let rows = self.max_row.saturating_sub(self.min_row).saturating_add(1).max(0);
        cols.saturating_mul(rows)
    }

    fn contains(&self, key: CellKey) -> bool {
        (self.min_col..=self.max_col).contains(&key.0) && (self.min_row..=self.max_row).contains(&key.1)
    }

    fn keys(self) -> impl Iterator<Item = CellKey> {
        (self.min_col..=self.max_col).flat_map(move |col| (self.min_row..=self.max_row).map(move |row| (col, row)))
    }
}

/// Where an entry lives inside the index.
#[derive(Debug, Clone)]
enum Placement {
    /// Registered in these grid cells.
    Cells(Vec<CellKey>),
    /// Too large for the grid; scanned on every query.
    Oversized,
    /// Non-finite bounds; counted but never matched.
    Unplaced,
}

#[derive(Debug, Clone)]
struct Slot {
    bounds: Bounds,
    placement: Placement,
}

/// Bucket-grid acceleration structure mapping boxes to ids.
#[derive(Debug, Clone)]
pub struct GridIndex<K> {
    cell_size: f64,
    slots: HashMap<K, Slot>,
    cells: HashMap<CellKey, HashSet<K>>,
    oversized: HashSet<K>,
}

impl<K> Default for GridIndex<K>
where
    K: Copy + Eq + Hash + Ord + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl<K> GridIndex<K>
where
    K: Copy + Eq + Hash + Ord + std::fmt::Debug,
{
    /// Create an empty index. `cell_size` is fixed for the index's lifetime
    /// and must be finite and positive.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        debug_assert!(cell_size.is_finite() && cell_size > 0.0, "cell size must be positive");
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { DEFAULT_CELL_SIZE };
        Self { cell_size, slots: HashMap::new(), cells: HashMap::new(), oversized: HashSet::new() }
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of distinct registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of non-empty grid cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn contains(&self, id: K) -> bool {
        self.slots.contains_key(&id)
    }

    /// The bounds an entry was last registered with.
    #[must_use]
    pub fn bounds(&self, id: K) -> Option<Bounds> {
        self.slots.get(&id).map(|slot| slot.bounds)
    }

    /// Register `id` under every cell its bounds cover.
    ///
    /// The id must not already be present; call [`Self::update`] to move an
    /// entry. Violations assert in debug builds and are treated as an update
    /// in release builds.
    pub fn insert(&mut self, id: K, bounds: Bounds) {
        debug_assert!(!self.slots.contains_key(&id), "grid insert of existing id {id:?}");
        if self.remove(id) {
            tracing::warn!(?id, "grid insert of existing id; replacing");
        }
        self.place(id, bounds);
    }

    /// Move an existing entry to new bounds. Old cell membership is found from
    /// the previously stored placement, never from the new bounds.
    ///
    /// Returns false (and asserts in debug builds) if `id` was never inserted.
    pub fn update(&mut self, id: K, bounds: Bounds) -> bool {
        debug_assert!(self.slots.contains_key(&id), "grid update of unknown id {id:?}");
        if !self.remove(id) {
            tracing::warn!(?id, "grid update of unknown id ignored");
            return false;
        }
        self.place(id, bounds);
        true
    }

    /// Remove an entry from every cell it occupies, pruning emptied cells.
    /// Returns whether the id was present.
    pub fn remove(&mut self, id: K) -> bool {
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };
        match slot.placement {
            Placement::Cells(keys) => {
                for key in keys {
                    let Some(bucket) = self.cells.get_mut(&key) else {
                        continue;
                    };
                    bucket.remove(&id);
                    if bucket.is_empty() {
                        self.cells.remove(&key);
                    }
                }
            }
            Placement::Oversized => {
                self.oversized.remove(&id);
            }
            Placement::Unplaced => {}
        }
        true
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.cells.clear();
        self.oversized.clear();
    }

    /// Replace the whole contents. Later duplicates of an id win.
    pub fn load<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, Bounds)>,
    {
        self.clear();
        for (id, bounds) in entries {
            self.remove(id);
            self.place(id, bounds);
        }
    }

    /// Every distinct id whose stored bounds intersect `query` (touching edges
    /// included), in ascending order. Non-finite or inverted queries match nothing.
    #[must_use]
    pub fn search(&self, query: &Bounds) -> Vec<K> {
        if !query.is_valid() {
            return Vec::new();
        }
        let Some(range) = self.cell_range(query) else {
            return Vec::new();
        };

        let mut seen: HashSet<K> = HashSet::new();
        let mut hits: Vec<K> = Vec::new();
        let mut visit = |bucket: &HashSet<K>| {
            for id in bucket {
                if !seen.insert(*id) {
                    continue;
                }
                if self.slots.get(id).is_some_and(|slot| slot.bounds.intersects(query)) {
                    hits.push(*id);
                }
            }
        };

        // Walk whichever side is smaller: the query's cells or the occupied ones.
        if usize::try_from(range.count()).map_or(true, |n| n > self.cells.len()) {
            for (key, bucket) in &self.cells {
                if range.contains(*key) {
                    visit(bucket);
                }
            }
        } else {
            for key in range.keys() {
                if let Some(bucket) = self.cells.get(&key) {
                    visit(bucket);
                }
            }
        }

        for id in &self.oversized {
            if self.slots.get(id).is_some_and(|slot| slot.bounds.intersects(query)) {
                hits.push(*id);
            }
        }

        hits.sort_unstable();
        hits
    }

    /// Iterate over every registered `(id, bounds)` pair in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Bounds)> + '_ {
        self.slots.iter().map(|(id, slot)| (*id, slot.bounds))
    }

    fn place(&mut self, id: K, bounds: Bounds) {
        let placement = match self.cell_range(&bounds) {
            None => {
                tracing::warn!(?id, ?bounds, "non-finite bounds; entry will never match a query");
                Placement::Unplaced
            }
            Some(range) if range.count() > MAX_CELLS_PER_ENTRY => {
                self.oversized.insert(id);
                Placement::Oversized
            }
            Some(range) => {
                let keys: Vec<CellKey> = range.keys().collect();
                for key in &keys {
                    self.cells.entry(*key).or_default().insert(id);
                }
                Placement::Cells(keys)
            }
        };
        self.slots.insert(id, Slot { bounds, placement });
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_range(&self, bounds: &Bounds) -> Option<CellRange> {
        if !bounds.is_finite() {
            return None;
        }
        let cell = |v: f64| (v / self.cell_size).floor() as i64;
        Some(CellRange {
            min_col: cell(bounds.min_x),
            max_col: cell(bounds.max_x),
            min_row: cell(bounds.min_y),
            max_row: cell(bounds.max_y),
        })
    }
}
