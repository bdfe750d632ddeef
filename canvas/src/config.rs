//! Tunables for the drawing surface, with defaults, JSON and environment loading.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CELL_SIZE, DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_HIT_RADIUS_PX, DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE,
    DEFAULT_MIN_SELECTION_AREA, DEFAULT_ZOOM_STEP,
};

/// Error returned by [`CanvasConfig::from_env`] and [`CanvasConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set but is not a number.
    #[error("invalid value for {var}: {value:?}")]
    Parse { var: &'static str, value: String },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Construction-time configuration for [`crate::engine::EngineCore`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Grid cell edge length in world units.
    pub cell_size: f64,
    /// Lower zoom limit.
    pub min_scale: f64,
    /// Upper zoom limit.
    pub max_scale: f64,
    /// Hit-test slop in screen pixels; converted to world units per query.
    pub hit_radius_px: f64,
    /// Drag boxes below this area (world units²) select nothing.
    pub min_selection_area: f64,
    /// Screen-pixel travel that turns a press into a drag.
    pub drag_threshold_px: f64,
    /// Wheel zoom step; one notch scales by `1 + zoom_step`.
    pub zoom_step: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            hit_radius_px: DEFAULT_HIT_RADIUS_PX,
            min_selection_area: DEFAULT_MIN_SELECTION_AREA,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

impl CanvasConfig {
    /// Build config from environment variables, falling back to defaults for
    /// unset ones.
    ///
    /// Recognized:
    /// - `CANVAS_CELL_SIZE`
    /// - `CANVAS_MIN_SCALE` / `CANVAS_MAX_SCALE`
    /// - `CANVAS_HIT_RADIUS_PX`
    /// - `CANVAS_MIN_SELECTION_AREA`
    /// - `CANVAS_DRAG_THRESHOLD_PX`
    /// - `CANVAS_ZOOM_STEP`
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] when a variable is set but not a number,
    /// [`ConfigError::Invalid`] when the resulting config fails [`Self::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            // Surfaces as a parse error below.
            Err(std::env::VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
        })
    }

    /// Like [`Self::from_env`] but reading from an arbitrary source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |var: &'static str, default: f64| -> Result<f64, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(raw) if raw.trim().is_empty() => Ok(default),
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| ConfigError::Parse { var, value: raw }),
            }
        };

        let config = Self {
            cell_size: read("CANVAS_CELL_SIZE", defaults.cell_size)?,
            min_scale: read("CANVAS_MIN_SCALE", defaults.min_scale)?,
            max_scale: read("CANVAS_MAX_SCALE", defaults.max_scale)?,
            hit_radius_px: read("CANVAS_HIT_RADIUS_PX", defaults.hit_radius_px)?,
            min_selection_area: read("CANVAS_MIN_SELECTION_AREA", defaults.min_selection_area)?,
            drag_threshold_px: read("CANVAS_DRAG_THRESHOLD_PX", defaults.drag_threshold_px)?,
            zoom_step: read("CANVAS_ZOOM_STEP", defaults.zoom_step)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 { Ok(()) } else { Err(ConfigError::Invalid(format!("{name} must be > 0, got {v}"))) }
        };
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be >= 0, got {v}")))
            }
        };

        positive("cell_size", self.cell_size)?;
        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid(format!(
                "min_scale ({}) exceeds max_scale ({})",
                self.min_scale, self.max_scale
            )));
        }
        non_negative("hit_radius_px", self.hit_radius_px)?;
        non_negative("min_selection_area", self.min_selection_area)?;
        non_negative("drag_threshold_px", self.drag_threshold_px)?;
        positive("zoom_step", self.zoom_step)?;
        Ok(())
    }
}
