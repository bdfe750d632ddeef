//! Strict decoding of entity records delivered by the data-loading layer.
//!
//! Records arrive as `{id, layer_id, entity_type, data, min_x, min_y, max_x, max_y}`
//! with a free-form `data` object. Each record is decoded once into an
//! [`Entity<Shape>`]; a record that does not decode is skipped and reported,
//! never coerced. Numbers must be JSON numbers, so `"12"` is rejected.

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::camera::Point;
use crate::consts::DEFAULT_TEXT_HEIGHT;
use crate::doc::{Bounds, Entity, EntityId, Origin};
use crate::shape::{Shape, ShapeKind};

/// Why a single record could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown entity type {0:?}")]
    UnknownKind(String),
    #[error("entity data must be a JSON object")]
    DataNotObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be {expected}")]
    InvalidField { field: &'static str, expected: &'static str },
    #[error("bounds must be finite and ordered: {0:?}")]
    InvalidBounds(Bounds),
}

/// An entity as delivered on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<i64>,
    pub entity_type: String,
    #[serde(default)]
    pub data: Value,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl EntityRecord {
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// A record that was dropped during [`decode_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub id: EntityId,
    pub error: DecodeError,
}

/// Result of decoding a batch.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub entities: Vec<Entity<Shape>>,
    pub skipped: Vec<SkippedRecord>,
}

/// Decode every record, skipping (and logging) the ones that fail.
#[must_use]
pub fn decode_all(records: &[EntityRecord]) -> Decoded {
    let mut out = Decoded { entities: Vec::with_capacity(records.len()), skipped: Vec::new() };
    for record in records {
        match decode_record(record) {
            Ok(entity) => out.entities.push(entity),
            Err(error) => {
                tracing::warn!(id = record.id, entity_type = %record.entity_type, %error, "skipping entity record");
                out.skipped.push(SkippedRecord { id: record.id, error });
            }
        }
    }
    tracing::debug!(decoded = out.entities.len(), skipped = out.skipped.len(), "entity records decoded");
    out
}

/// Decode one record into a remote entity.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first problem found.
pub fn decode_record(record: &EntityRecord) -> Result<Entity<Shape>, DecodeError> {
    let bounds = record.bounds();
    if !bounds.is_valid() {
        return Err(DecodeError::InvalidBounds(bounds));
    }
    let kind = ShapeKind::parse(&record.entity_type)
        .ok_or_else(|| DecodeError::UnknownKind(record.entity_type.clone()))?;
    let data = record.data.as_object().ok_or(DecodeError::DataNotObject)?;
    let shape = decode_shape(kind, &Fields(data))?;

    let mut entity = Entity::new(record.id, bounds, shape).with_origin(Origin::Remote);
    entity.layer_id = record.layer_id;
    Ok(entity)
}

fn decode_shape(kind: ShapeKind, f: &Fields<'_>) -> Result<Shape, DecodeError> {
    Ok(match kind {
        ShapeKind::Line => Shape::Line { start: f.point("start")?, end: f.point("end")? },
        ShapeKind::Polyline => Shape::Polyline {
            vertices: f.points_any(&["vertices", "points"])?,
            closed: f.opt_bool("closed")?.or(f.opt_bool("is_closed")?).unwrap_or(false),
        },
        ShapeKind::Arc => Shape::Arc {
            center: f.point("center")?,
            radius: f.number("radius")?,
            start_angle: f.opt_number("start_angle")?.unwrap_or(0.0),
            end_angle: f.opt_number("end_angle")?.unwrap_or(360.0),
        },
        ShapeKind::Circle => Shape::Circle { center: f.point("center")?, radius: f.number("radius")? },
        ShapeKind::Text => Shape::Text {
            position: f.point("position")?,
            content: f.string_any(&["text", "content"])?,
            height: f.opt_number("height")?.unwrap_or(DEFAULT_TEXT_HEIGHT),
        },
        ShapeKind::Insert => {
            let (scale_x, scale_y) = match f.get("scale") {
                None => (1.0, 1.0),
                Some(value) => {
                    let p = point_value(value, "scale")?;
                    (p.x, p.y)
                }
            };
            Shape::Insert {
                position: f.point("position")?,
                block_name: f.opt_string("block_name")?.unwrap_or_default(),
                scale_x,
                scale_y,
                rotation: f.opt_number("rotation")?.unwrap_or(0.0),
            }
        }
        ShapeKind::Rect => Shape::Rect { a: f.point("a")?, b: f.point("b")? },
        ShapeKind::Polygon => Shape::Polygon { points: f.points_any(&["points", "vertices"])? },
    })
}

/// Typed, strict access to a record's `data` object.
struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    fn number(&self, key: &'static str) -> Result<f64, DecodeError> {
        self.opt_number(key)?.ok_or(DecodeError::MissingField(key))
    }

    fn opt_number(&self, key: &'static str) -> Result<Option<f64>, DecodeError> {
        self.get(key).map(|v| number_value(v, key)).transpose()
    }

    fn opt_bool(&self, key: &'static str) -> Result<Option<bool>, DecodeError> {
        self.get(key)
            .map(|v| v.as_bool().ok_or(DecodeError::InvalidField { field: key, expected: "a boolean" }))
            .transpose()
    }

    fn opt_string(&self, key: &'static str) -> Result<Option<String>, DecodeError> {
        self.get(key)
            .map(|v| v.as_str().map(str::to_owned).ok_or(DecodeError::InvalidField { field: key, expected: "a string" }))
            .transpose()
    }

    fn string_any(&self, keys: &[&'static str]) -> Result<String, DecodeError> {
        for &key in keys {
            if let Some(s) = self.opt_string(key)? {
                return Ok(s);
            }
        }
        Err(DecodeError::MissingField(keys[0]))
    }

    fn point(&self, key: &'static str) -> Result<Point, DecodeError> {
        let value = self.get(key).ok_or(DecodeError::MissingField(key))?;
        point_value(value, key)
    }

    fn points_any(&self, keys: &[&'static str]) -> Result<Vec<Point>, DecodeError> {
        for &key in keys {
            let Some(value) = self.get(key) else {
                continue;
            };
            let items =
                value.as_array().ok_or(DecodeError::InvalidField { field: key, expected: "an array of points" })?;
            return items.iter().map(|item| point_value(item, key)).collect();
        }
        Err(DecodeError::MissingField(keys[0]))
    }
}

fn number_value(value: &Value, field: &'static str) -> Result<f64, DecodeError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or(DecodeError::InvalidField { field, expected: "a finite number" })
}

fn point_value(value: &Value, field: &'static str) -> Result<Point, DecodeError> {
    let invalid = DecodeError::InvalidField { field, expected: "a point {x, y}" };
    let obj = value.as_object().ok_or_else(|| invalid.clone())?;
    let coord = |axis: &str| obj.get(axis).and_then(Value::as_f64).filter(|n| n.is_finite());
    match (coord("x"), coord("y")) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)),
        _ => Err(invalid),
    }
}
