//! Document model: bounding boxes, entities and their origin.
//!
//! An [`Entity`] is the unit the spatial index and selection engine work
//! with: an id, an axis-aligned world-space box, and an arbitrary payload.
//! For the drawing surface the payload is a [`crate::shape::Shape`], decoded
//! once at ingestion (see [`crate::ingest`]) or built by a drawing tool.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Unique identifier for an entity within one selection engine.
pub type EntityId = i64;

/// Axis-aligned world-space box. Zero-area boxes are valid (points, text anchors).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// The smallest box spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { min_x: a.x.min(b.x), min_y: a.y.min(b.y), max_x: a.x.max(b.x), max_y: a.y.max(b.y) }
    }

    /// The smallest box containing every point. `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let seed = Self::from_corners(*first, *first);
        Some(rest.iter().fold(seed, |acc, p| Self {
            min_x: acc.min_x.min(p.x),
            min_y: acc.min_y.min(p.y),
            max_x: acc.max_x.max(p.x),
            max_y: acc.max_y.max(p.y),
        }))
    }

    /// A square of half-width `radius` centered on `point`.
    #[must_use]
    pub fn around(point: Point, radius: f64) -> Self {
        Self {
            min_x: point.x - radius,
            min_y: point.y - radius,
            max_x: point.x + radius,
            max_y: point.y + radius,
        }
    }

    /// Inclusive box intersection: touching edges count.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    /// Area, clamped at zero for inverted boxes.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite() && self.max_x.is_finite() && self.max_y.is_finite()
    }

    /// Finite and ordered on both axes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    #[must_use]
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Where an entity came from.
///
/// Locally authored entities have not been persisted upstream yet; they get
/// negative ids, but callers should branch on this tag rather than the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Created on this client by a drawing tool.
    Local,
    /// Loaded from the data layer.
    #[default]
    Remote,
}

/// An indexed item on the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<P> {
    /// Identity; unique within one selection engine.
    pub id: EntityId,
    /// World-space extent. May change over the entity's lifetime.
    pub bounds: Bounds,
    /// Whether the entity was authored locally or loaded.
    pub origin: Origin,
    /// Owning layer, when the data layer supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<i64>,
    /// Kind-specific geometry or other per-entity data.
    pub payload: P,
}

impl<P> Entity<P> {
    /// A remote entity with no layer.
    #[must_use]
    pub fn new(id: EntityId, bounds: Bounds, payload: P) -> Self {
        Self { id, bounds, origin: Origin::Remote, layer_id: None, payload }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer_id: i64) -> Self {
        self.layer_id = Some(layer_id);
        self
    }
}
