//! In-process performance harness for the canvas interaction core.
//!
//! Builds seeded synthetic scenes of mixed CAD entities, then times the hot
//! paths a pointer-driven host hits on every event: index search, hit-testing,
//! drag-box updates, and viewport culling. Results are reported as latency
//! percentiles so regressions at 10^5-entity scale show up as numbers.

use std::time::{Duration, Instant};

use canvas::camera::{Camera, Point};
use canvas::config::{CanvasConfig, ConfigError};
use canvas::doc::{Bounds, Entity, EntityId};
use canvas::selection::{FinalizeOptions, SelectionEngine};
use canvas::shape::Shape;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Average spacing between generated entities, in world units.
const SCENE_SPACING: f64 = 40.0;

/// Runtime configuration for perf tests, loaded from environment variables.
#[derive(Clone, Debug)]
pub struct PerfConfig {
    /// Scene sizes to benchmark.
    pub entity_counts: Vec<usize>,
    /// Operations timed per measurement.
    pub query_iterations: usize,
    /// RNG seed; the same seed yields the same scene and query sequence.
    pub seed: u64,
    /// Grid cell edge length in world units.
    pub cell_size: f64,
}

impl PerfConfig {
    /// Load perf config from environment with sane defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            entity_counts: env_usize_list("PERF_ENTITY_COUNTS", &[1_000, 10_000, 100_000]),
            query_iterations: env_usize("PERF_QUERY_ITERATIONS", 2_000),
            seed: env_parse("PERF_SEED", 0x5eed),
            cell_size: env_parse("PERF_CELL_SIZE", canvas::consts::DEFAULT_CELL_SIZE),
        }
    }

    /// Canvas config for the engine under test.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Config`] when `PERF_CELL_SIZE` is not a positive number.
    pub fn canvas_config(&self) -> Result<CanvasConfig, PerfError> {
        let config = CanvasConfig { cell_size: self.cell_size, ..CanvasConfig::default() };
        config.validate()?;
        Ok(config)
    }
}

/// Error type for perf harness operations.
#[derive(Debug, thiserror::Error)]
pub enum PerfError {
    /// The derived canvas config is out of range.
    #[error("invalid perf config: {0}")]
    Config(#[from] ConfigError),
    /// A scenario needs at least one entity.
    #[error("scene is empty")]
    EmptyScene,
}

/// Aggregated latency metrics in milliseconds.
#[derive(Clone, Debug)]
pub struct LatencyMetrics {
    /// Total number of operations measured.
    pub count: usize,
    /// Minimum observed latency in milliseconds.
    pub min_ms: f64,
    /// Maximum observed latency in milliseconds.
    pub max_ms: f64,
    /// Arithmetic mean latency in milliseconds.
    pub avg_ms: f64,
    /// Median (50th percentile) latency in milliseconds.
    pub p50_ms: f64,
    /// 95th percentile latency in milliseconds.
    pub p95_ms: f64,
    /// 99th percentile latency in milliseconds.
    pub p99_ms: f64,
    /// Throughput in operations per second.
    pub ops_per_sec: f64,
}

impl LatencyMetrics {
    /// Build latency metrics from operation durations.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_durations(durations: &[Duration]) -> Self {
        let mut ms = durations.iter().map(|d| d.as_secs_f64() * 1_000.0).collect::<Vec<_>>();
        ms.sort_by(f64::total_cmp);

        let (Some(&min_ms), Some(&max_ms)) = (ms.first(), ms.last()) else {
            return Self {
                count: 0,
                min_ms: 0.0,
                max_ms: 0.0,
                avg_ms: 0.0,
                p50_ms: 0.0,
                p95_ms: 0.0,
                p99_ms: 0.0,
                ops_per_sec: 0.0,
            };
        };

        let count = ms.len();
        let total_s = durations.iter().map(Duration::as_secs_f64).sum::<f64>().max(1e-9);

        Self {
            count,
            min_ms,
            max_ms,
            avg_ms: ms.iter().sum::<f64>() / count as f64,
            p50_ms: percentile(&ms, 0.50),
            p95_ms: percentile(&ms, 0.95),
            p99_ms: percentile(&ms, 0.99),
            ops_per_sec: count as f64 / total_s,
        }
    }
}

/// A generated scene: entities plus the square world extent they fill.
#[derive(Clone, Debug)]
pub struct Scene {
    pub entities: Vec<Entity<Shape>>,
    pub extent: f64,
}

impl Scene {
    /// Generate `count` mixed entities with roughly constant density.
    ///
    /// Mostly small lines, circles, arcs and text with the occasional long
    /// polyline spanning many cells, which is what real floor plans look like.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    pub fn generate(count: usize, seed: u64) -> Self {
        let extent = (count.max(1) as f64).sqrt() * SCENE_SPACING;
        let mut rng = StdRng::seed_from_u64(seed);
        let entities = (0..count)
            .map(|i| {
                let shape = random_shape(&mut rng, extent);
                let bounds = shape.bounding_box().unwrap_or_default();
                Entity::new(i as EntityId + 1, bounds, shape)
            })
            .collect();
        Self { entities, extent }
    }

    /// Build a selection engine over this scene, returning it with the build time.
    #[must_use]
    pub fn build(&self, cell_size: f64) -> (SelectionEngine<Shape>, Duration) {
        let mut engine = SelectionEngine::new(cell_size);
        let started = Instant::now();
        engine.register_entities(self.entities.clone());
        (engine, started.elapsed())
    }
}

fn random_point(rng: &mut StdRng, extent: f64) -> Point {
    Point::new(rng.random_range(0.0..extent), rng.random_range(0.0..extent))
}

fn random_shape(rng: &mut StdRng, extent: f64) -> Shape {
    let origin = random_point(rng, extent);
    let near = |rng: &mut StdRng, reach: f64| {
        Point::new(origin.x + rng.random_range(-reach..reach), origin.y + rng.random_range(-reach..reach))
    };
    match rng.random_range(0..100) {
        0..40 => Shape::Line { start: origin, end: near(rng, 30.0) },
        40..60 => Shape::Circle { center: origin, radius: rng.random_range(1.0..15.0) },
        60..75 => Shape::Arc {
            center: origin,
            radius: rng.random_range(1.0..20.0),
            start_angle: rng.random_range(0.0..360.0),
            end_angle: rng.random_range(0.0..360.0),
        },
        75..90 => Shape::Text { position: origin, content: format!("T{}", rng.random_range(0..1000)), height: 12.0 },
        90..99 => Shape::Rect { a: origin, b: near(rng, 25.0) },
        _ => Shape::Polyline {
            vertices: (0..8).map(|_| near(rng, extent / 8.0)).collect(),
            closed: false,
        },
    }
}

/// Time one index search per iteration with viewport-sized query boxes.
///
/// # Errors
///
/// Returns [`PerfError::EmptyScene`] for an empty scene.
pub fn measure_search(
    scene: &Scene,
    engine: &SelectionEngine<Shape>,
    query_size: f64,
    iterations: usize,
    seed: u64,
) -> Result<LatencyMetrics, PerfError> {
    ensure_populated(scene)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = (0..iterations)
        .map(|_| {
            let corner = random_point(&mut rng, scene.extent);
            let query = Bounds::new(corner.x, corner.y, corner.x + query_size, corner.y + query_size);
            timed(|| engine.index().search(&query).len())
        })
        .collect::<Vec<_>>();
    Ok(LatencyMetrics::from_durations(&samples))
}

/// Time one hit-test per iteration at random points.
///
/// # Errors
///
/// Returns [`PerfError::EmptyScene`] for an empty scene.
pub fn measure_hit_test(
    scene: &Scene,
    engine: &SelectionEngine<Shape>,
    radius: f64,
    iterations: usize,
    seed: u64,
) -> Result<LatencyMetrics, PerfError> {
    ensure_populated(scene)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = (0..iterations)
        .map(|_| {
            let point = random_point(&mut rng, scene.extent);
            timed(|| engine.hit_test(point, radius).map_or(0, |hit| hit.id))
        })
        .collect::<Vec<_>>();
    Ok(LatencyMetrics::from_durations(&samples))
}

/// Time a continuous drag: one `update_selection` per pointer-move, then a
/// final `finalize_selection`. Each sample is one update.
///
/// # Errors
///
/// Returns [`PerfError::EmptyScene`] for an empty scene.
#[allow(clippy::cast_precision_loss)]
pub fn measure_drag(
    scene: &Scene,
    engine: &mut SelectionEngine<Shape>,
    span: f64,
    moves: usize,
) -> Result<(LatencyMetrics, usize), PerfError> {
    ensure_populated(scene)?;
    let origin = Point::new(scene.extent / 2.0, scene.extent / 2.0);
    engine.begin_selection(origin);
    let steps = moves.max(1) as f64;
    let samples = (1..=moves)
        .map(|i| {
            let t = i as f64 / steps;
            let point = Point::new(origin.x + span * t, origin.y - span * t);
            timed(|| engine.update_selection(point))
        })
        .collect::<Vec<_>>();
    let selected = engine.finalize_selection(FinalizeOptions::default()).len();
    Ok((LatencyMetrics::from_durations(&samples), selected))
}

/// Time viewport culling while the camera pans across the scene.
///
/// # Errors
///
/// Returns [`PerfError::EmptyScene`] for an empty scene.
#[allow(clippy::cast_precision_loss)]
pub fn measure_view_culling(
    scene: &Scene,
    engine: &SelectionEngine<Shape>,
    camera: &mut Camera,
    iterations: usize,
) -> Result<LatencyMetrics, PerfError> {
    ensure_populated(scene)?;
    let step = scene.extent / iterations.max(1) as f64;
    let samples = (0..iterations)
        .map(|_| {
            camera.pan(Point::new(-step * camera.scale(), 0.0));
            timed(|| engine.entities_in(&camera.view_bounds()).len())
        })
        .collect::<Vec<_>>();
    Ok(LatencyMetrics::from_durations(&samples))
}

fn ensure_populated(scene: &Scene) -> Result<(), PerfError> {
    if scene.entities.is_empty() { Err(PerfError::EmptyScene) } else { Ok(()) }
}

fn timed<T>(op: impl FnOnce() -> T) -> Duration {
    let started = Instant::now();
    std::hint::black_box(op());
    started.elapsed()
}

fn env_usize(key: &str, default: usize) -> usize {
    env_parse(key, default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok()).unwrap_or(default)
}

fn env_usize_list(key: &str, default: &[usize]) -> Vec<usize> {
    let Some(raw) = std::env::var(key).ok() else {
        return default.to_vec();
    };

    let values = raw.split(',').filter_map(|part| part.trim().parse::<usize>().ok()).collect::<Vec<_>>();

    if values.is_empty() { default.to_vec() } else { values }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let index = ((sorted_values.len() - 1) as f64 * p).round() as usize;
    sorted_values[index.min(sorted_values.len() - 1)]
}

#[cfg(test)]
#[path = "scene_perf_test.rs"]
mod tests;
