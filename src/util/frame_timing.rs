//! Frame delta measurement with a smoothed FPS readout.

use std::time::Instant;

/// Measures per-frame elapsed time and keeps an exponentially smoothed
/// frames-per-second figure for the status line.
pub struct FrameTiming {
    last_frame: Instant,
    smoothed_fps: f32,
    smoothing: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Create a timer; the first `tick` measures from here.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Call once per frame. Returns the seconds elapsed since the
    /// previous tick and folds the instantaneous FPS into the smoothed
    /// average.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if dt > 0.0 {
            let instant_fps = 1.0 / dt;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        dt
    }

    /// The smoothed frames-per-second figure.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}
