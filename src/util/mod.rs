//! Small support utilities.

/// Frame delta measurement with smoothed FPS.
pub mod frame_timing;
