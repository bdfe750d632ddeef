//! Interaction core for a 2D CAD drawing surface.
//!
//! The crate owns everything between raw host input events and the entity
//! set: a uniform-grid spatial index, the viewport transform between Y-up
//! world space and Y-down screen space, hit-testing and selection, drawing
//! tool drafts, and strict decoding of entity records. It performs no I/O and
//! draws nothing; hosts feed events into [`engine::EngineCore`] and apply the
//! resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Event-driven [`engine::EngineCore`] and its action stream |
//! | [`grid`] | Uniform-grid spatial index over bounding boxes |
//! | [`camera`] | Viewport transform, pan/zoom and change subscriptions |
//! | [`selection`] | Entity registry, layer filter, hit-testing, selection and drag boxes |
//! | [`hit`] | Hit ranking: nearest center, then smaller area |
//! | [`tools`] | Drawing tools and draft lifecycle |
//! | [`input`] | Tools, modifiers, buttons and the gesture state machine |
//! | [`shape`] | CAD entity geometry and bounding boxes |
//! | [`ingest`] | Strict decoding of wire entity records |
//! | [`doc`] | Entity, bounds and id types |
//! | [`config`] | Tunables with defaults and environment loading |
//! | [`consts`] | Shared numeric defaults |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod grid;
pub mod hit;
pub mod ingest;
pub mod input;
pub mod selection;
pub mod shape;
pub mod tools;
