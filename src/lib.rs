// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// Documentation
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Cast hygiene: graphics code casts sizes and coordinates on purpose
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

//! Sample viewer for G3DJ-style JSON 3D models.
//!
//! g3dview loads a scene-graph-described model from the JSON exchange
//! format, lets a user browse a folder of model files, toggle a fixed
//! directional light rig, and orbit/pan/fly a camera with mouse and
//! keyboard input. Rendering is a deliberately small wgpu forward pass;
//! the interesting parts live in the camera input controller and the
//! viewer state machine.
//!
//! # Key entry points
//!
//! - `Viewer` (feature `viewer`) - the standalone window shell
//! - [`engine::ViewerEngine`] - scene + state + controller + renderer
//! - [`state::ViewerState`] - folder/model/animation/lighting state
//! - [`camera::controller::CameraInputController`] - per-frame camera input
//! - [`options::Options`] - TOML-backed runtime configuration
//!
//! # Frame model
//!
//! Everything runs on one thread. Each frame drains window events (UI
//! events mutate [`state::ViewerState`] synchronously), pushes sampled
//! input into the camera controller exactly once, advances the active
//! model's animation clock, and draws the scene through
//! [`renderer::ForwardRenderer`]. Model loads are synchronous; a large
//! file stalls the frame loop by design.

pub mod camera;
pub mod effect;
pub mod engine;
pub mod error;
pub mod files;
pub mod gpu;
pub mod input;
pub mod lighting;
pub mod model;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod state;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use camera::controller::{
    CameraInputController, ControlKey, ControllerSpeeds, TouchGesture,
};
pub use camera::core::Camera;
pub use error::ViewError;
pub use lighting::{DirectLight, DEFAULT_LIGHTS};
pub use model::{load_model, load_model_file, AnimationHandle, Model};
pub use options::Options;
pub use scene::Scene;
pub use state::{ViewerEvent, ViewerState};
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
