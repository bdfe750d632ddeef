//! Viewport transform: bidirectional world <-> screen mapping with pan and
//! pivot-anchored zoom.
//!
//! World space is Y-up; screen space is Y-down with its origin at the top-left
//! of the viewport, in CSS pixels. `translation` is the screen position of the
//! world origin.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE};
use crate::doc::Bounds;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Snapshot of the transform, handed to subscribers and renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// World-to-screen scale factor. Always within the camera's scale limits.
    pub scale: f64,
    /// Screen-space position of the world origin.
    pub translation: Point,
    /// Viewport size in CSS pixels.
    pub viewport: Size,
}

impl Default for CameraState {
    fn default() -> Self {
        Self { scale: 1.0, translation: Point::default(), viewport: Size::default() }
    }
}

/// Handle returned by [`Camera::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&CameraState)>;

/// Pan/zoom camera for the drawing surface.
///
/// Every mutation that actually changes the state notifies all subscribers
/// exactly once, synchronously, after the new state is committed.
pub struct Camera {
    state: CameraState,
    min_scale: f64,
    max_scale: f64,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    }
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("state", &self.state)
            .field("min_scale", &self.min_scale)
            .field("max_scale", &self.max_scale)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Camera {
    /// Create a camera with the given scale limits. Limits are assumed to be
    /// validated (see [`crate::config::CanvasConfig::validate`]).
    #[must_use]
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        debug_assert!(min_scale > 0.0 && min_scale <= max_scale, "invalid scale limits");
        let state = CameraState { scale: 1.0_f64.max(min_scale).min(max_scale), ..CameraState::default() };
        Self { state, min_scale, max_scale, listeners: Vec::new(), next_subscription: 0 }
    }

    /// The current transform state.
    #[must_use]
    pub fn state(&self) -> CameraState {
        self.state
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    #[must_use]
    pub fn translation(&self) -> Point {
        self.state.translation
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.state.viewport
    }

    /// Register a listener called after every effective state change.
    pub fn subscribe(&mut self, listener: impl FnMut(&CameraState) + 'static) -> Subscription {
        let sub = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((sub, Box::new(listener)));
        sub
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != sub);
        self.listeners.len() != before
    }

    fn commit(&mut self, next: CameraState) {
        if next == self.state {
            return;
        }
        self.state = next;
        let snapshot = self.state;
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    fn center(&self) -> Point {
        Point::new(self.state.viewport.width / 2.0, self.state.viewport.height / 2.0)
    }

    /// Update the viewport size. The first call (from a zero-sized viewport)
    /// centers the world origin; later calls keep the translation.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let current = self.state.viewport;
        if width == current.width && height == current.height {
            return;
        }
        if !width.is_finite() || !height.is_finite() {
            return;
        }

        let is_initial = current.width == 0.0 && current.height == 0.0;
        let translation =
            if is_initial { Point::new(width / 2.0, height / 2.0) } else { self.state.translation };

        self.commit(CameraState { translation, viewport: Size { width, height }, ..self.state });
    }

    /// Set the scale, keeping the world point under `pivot` (default: viewport
    /// center) fixed on screen.
    pub fn set_scale(&mut self, scale: f64, pivot: Option<Point>) {
        if !scale.is_finite() {
            return;
        }
        let clamped = self.clamp_scale(scale);
        if clamped == self.state.scale {
            return;
        }

        let pivot = pivot.filter(|p| p.is_finite()).unwrap_or_else(|| self.center());
        let world_pivot = self.screen_to_world(pivot);
        let translation =
            Point::new(pivot.x - world_pivot.x * clamped, pivot.y + world_pivot.y * clamped);

        self.commit(CameraState { scale: clamped, translation, ..self.state });
    }

    /// Multiply the current scale by `factor`. Non-finite or zero factors are ignored.
    pub fn zoom(&mut self, factor: f64, pivot: Option<Point>) {
        if !factor.is_finite() || factor == 0.0 {
            return;
        }
        self.set_scale(self.state.scale * factor, pivot);
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, delta: Point) {
        if !delta.is_finite() || (delta.x == 0.0 && delta.y == 0.0) {
            return;
        }
        let translation =
            Point::new(self.state.translation.x + delta.x, self.state.translation.y + delta.y);
        self.commit(CameraState { translation, ..self.state });
    }

    /// Back to scale 1 with the world origin at the viewport center.
    pub fn reset(&mut self) {
        let scale = self.clamp_scale(1.0);
        let translation = self.center();
        self.commit(CameraState { scale, translation, ..self.state });
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        let CameraState { scale, translation, .. } = self.state;
        Point { x: world.x * scale + translation.x, y: -world.y * scale + translation.y }
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let CameraState { scale, translation, .. } = self.state;
        if scale == 0.0 {
            return Point::default();
        }
        Point { x: (screen.x - translation.x) / scale, y: -(screen.y - translation.y) / scale }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        if self.state.scale == 0.0 {
            return 0.0;
        }
        screen_dist / self.state.scale
    }

    /// World-space rectangle covered by the whole viewport.
    #[must_use]
    pub fn view_bounds(&self) -> Bounds {
        let top_left = self.screen_to_world(Point::new(0.0, 0.0));
        let bottom_right =
            self.screen_to_world(Point::new(self.state.viewport.width, self.state.viewport.height));
        Bounds::from_corners(top_left, bottom_right)
    }
}
