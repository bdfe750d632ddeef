//! Hit ranking: choosing the single best entity under a point.
//!
//! Only bounding boxes are consulted, never exact geometry. Among candidates
//! the one whose box center is nearest the point wins; equal distances go to
//! the smaller box, and equal areas to the smaller id so results are stable.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::cmp::Ordering;

use crate::camera::Point;
use crate::doc::{Bounds, EntityId};

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: EntityId,
    /// Distance from the query point to the box center, in world units.
    pub distance: f64,
    /// Area of the hit box, in world units².
    pub area: f64,
}

impl Hit {
    #[must_use]
    pub fn new(id: EntityId, bounds: &Bounds, point: Point) -> Self {
        Self { id, distance: bounds.center().distance(point), area: bounds.area() }
    }

    /// Ranking order: closer first, then smaller, then lower id.
    #[must_use]
    pub fn rank(&self, other: &Hit) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.area.total_cmp(&other.area))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Pick the best-ranked candidate. `None` when there are no candidates.
#[must_use]
pub fn best_hit<I>(point: Point, candidates: I) -> Option<Hit>
where
    I: IntoIterator<Item = (EntityId, Bounds)>,
{
    candidates
        .into_iter()
        .map(|(id, bounds)| Hit::new(id, &bounds, point))
        .min_by(Hit::rank)
}
