//! Shape payloads: one variant per known entity kind.
//!
//! Geometry is decoded once at ingestion (or built by a drawing tool) so the
//! hot paths never inspect free-form data.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::Bounds;

/// Discriminant of a [`Shape`], as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeKind {
    Line,
    Polyline,
    Arc,
    Circle,
    Text,
    Insert,
    Rect,
    Polygon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        Self::Line,
        Self::Polyline,
        Self::Arc,
        Self::Circle,
        Self::Text,
        Self::Insert,
        Self::Rect,
        Self::Polygon,
    ];

    /// Wire name, e.g. `"LINE"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "LINE",
            Self::Polyline => "POLYLINE",
            Self::Arc => "ARC",
            Self::Circle => "CIRCLE",
            Self::Text => "TEXT",
            Self::Insert => "INSERT",
            Self::Rect => "RECT",
            Self::Polygon => "POLYGON",
        }
    }

    /// Case-insensitive lookup by wire name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry of a drawable entity. Angles are in degrees, counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Shape {
    Line { start: Point, end: Point },
    Polyline { vertices: Vec<Point>, closed: bool },
    Arc { center: Point, radius: f64, start_angle: f64, end_angle: f64 },
    Circle { center: Point, radius: f64 },
    Text { position: Point, content: String, height: f64 },
    Insert { position: Point, block_name: String, scale_x: f64, scale_y: f64, rotation: f64 },
    Rect { a: Point, b: Point },
    /// Open vertex list; no closing segment is stored.
    Polygon { points: Vec<Point> },
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Line { .. } => ShapeKind::Line,
            Self::Polyline { .. } => ShapeKind::Polyline,
            Self::Arc { .. } => ShapeKind::Arc,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Text { .. } => ShapeKind::Text,
            Self::Insert { .. } => ShapeKind::Insert,
            Self::Rect { .. } => ShapeKind::Rect,
            Self::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Axis-aligned extent of the geometry. `None` when there is nothing to
    /// bound (an empty vertex list). Text and inserts bound to their anchor.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Bounds> {
        match self {
            Self::Line { start, end } => Some(Bounds::from_corners(*start, *end)),
            Self::Rect { a, b } => Some(Bounds::from_corners(*a, *b)),
            Self::Polyline { vertices, .. } => Bounds::from_points(vertices),
            Self::Polygon { points } => Bounds::from_points(points),
            Self::Circle { center, radius } => Some(Bounds::around(*center, radius.abs())),
            Self::Arc { center, radius, start_angle, end_angle } => {
                Some(arc_bounds(*center, radius.abs(), *start_angle, *end_angle))
            }
            Self::Text { position, .. } | Self::Insert { position, .. } => {
                Some(Bounds::from_corners(*position, *position))
            }
        }
    }
}

fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Whether `angle` lies on the counter-clockwise sweep from `start` to `end`.
fn angle_in_sweep(angle: f64, start: f64, end: f64) -> bool {
    let (angle, start, end) = (normalize_degrees(angle), normalize_degrees(start), normalize_degrees(end));
    if start <= end { (start..=end).contains(&angle) } else { angle >= start || angle <= end }
}

fn arc_bounds(center: Point, radius: f64, start_angle: f64, end_angle: f64) -> Bounds {
    let on_circle = |deg: f64| {
        let rad = deg.to_radians();
        Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
    };

    // A sweep of 360° or more is a full circle.
    if (end_angle - start_angle).abs() >= 360.0 {
        return Bounds::around(center, radius);
    }

    let mut points = vec![on_circle(start_angle), on_circle(end_angle)];
    for extreme in [0.0, 90.0, 180.0, 270.0] {
        if angle_in_sweep(extreme, start_angle, end_angle) {
            points.push(on_circle(extreme));
        }
    }
    Bounds::from_points(&points).unwrap_or_else(|| Bounds::from_corners(center, center))
}
