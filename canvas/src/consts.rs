//! Shared numeric constants for the canvas crate.

// ── Spatial index ───────────────────────────────────────────────

/// Default grid cell edge length in world units.
pub const DEFAULT_CELL_SIZE: f64 = 256.0;

/// Entries spanning more cells than this are kept out of the grid and scanned
/// linearly on every query.
pub const MAX_CELLS_PER_ENTRY: i64 = 4096;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed world-to-screen scale.
pub const DEFAULT_MIN_SCALE: f64 = 0.05;

/// Largest allowed world-to-screen scale.
pub const DEFAULT_MAX_SCALE: f64 = 40.0;

/// Wheel zoom step: one notch zooms by `1 + step` (in) or `1 / (1 + step)` (out).
pub const DEFAULT_ZOOM_STEP: f64 = 0.2;

// ── Hit-testing and selection ───────────────────────────────────

/// Screen-space hit slop in pixels for point selection and hover.
pub const DEFAULT_HIT_RADIUS_PX: f64 = 6.0;

/// Drag boxes smaller than this (world units²) are treated as accidental.
pub const DEFAULT_MIN_SELECTION_AREA: f64 = 4.0;

/// Pointer travel in screen pixels before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 3.0;

// ── Drawing tools ───────────────────────────────────────────────

/// Maximum length of a committed text label, in characters.
pub const MAX_TEXT_CHARS: usize = 200;

/// Glyph height assigned to text entities when none is given.
pub const DEFAULT_TEXT_HEIGHT: f64 = 12.0;
