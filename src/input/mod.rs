//! Input plumbing for the viewer shell.
//!
//! [`bindings`] maps physical keys to discrete viewer actions; the
//! `sampler` module (viewer feature) flattens winit events into the
//! per-frame state the camera controller samples.

/// Key-to-action bindings.
pub mod bindings;
/// Per-frame input sampling from window events.
#[cfg(feature = "viewer")]
pub mod sampler;

pub use bindings::{KeyAction, KeyBindings};
#[cfg(feature = "viewer")]
pub use sampler::FrameSampler;
