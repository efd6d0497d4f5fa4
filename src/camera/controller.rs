//! Per-frame camera input controller.
//!
//! Sampled input state (held movement keys, active pointer gestures, the
//! pointer position) is pushed in through the `set_*` methods, then
//! [`CameraInputController::update`] is called exactly once per frame to
//! apply the accumulated motion to a [`Camera`]. None of the operations
//! fail; degenerate states are skipped rather than panicking.

use glam::{IVec2, Vec2, Vec3};

use crate::camera::core::Camera;

/// Pitch stays strictly inside (-89deg, +89deg) so the camera never flips
/// over the poles.
const PITCH_LIMIT: f32 = 89.0 * (std::f32::consts::PI / 180.0);

/// Dolly never brings the position closer than this to the target,
/// preserving the `position != target` invariant.
const MIN_DOLLY_DISTANCE: f32 = 0.25;

/// Logical movement directions, set from held keys once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    /// Strafe along negative local right.
    Left,
    /// Strafe along local right.
    Right,
    /// Move along the view direction.
    Forward,
    /// Move against the view direction.
    Backward,
    /// Move along world up.
    Up,
    /// Move against world up.
    Down,
}

impl ControlKey {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Forward => 2,
            Self::Backward => 3,
            Self::Up => 4,
            Self::Down => 5,
        }
    }
}

/// Pointer gestures. `Move` authorizes panning, `Rotate` authorizes
/// orbiting; both may be active in the same frame and then both apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchGesture {
    /// Pan camera and target together.
    Move,
    /// Orbit the camera around the target.
    Rotate,
}

/// Movement scale factors, one per motion kind.
///
/// The per-frame step is `speed * time_scale` for key movement (see
/// [`CameraInputController::update_scaled`]); pointer-derived motion uses
/// the speeds directly since pointer deltas are already per-frame values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSpeeds {
    /// Radians of orbit per pixel of pointer delta.
    pub rotate: f32,
    /// World units of pan per pixel of pointer delta.
    pub pan: f32,
    /// World units of key movement per frame step.
    pub movement: f32,
    /// Dolly factor per scroll unit.
    pub zoom: f32,
}

impl Default for ControllerSpeeds {
    fn default() -> Self {
        Self {
            rotate: 0.01,
            pan: 0.02,
            movement: 0.15,
            zoom: 0.1,
        }
    }
}

/// Translates discrete per-frame input samples into continuous camera
/// motion.
///
/// The expected call pattern per frame is: any number of `set_*` calls,
/// then [`update`](Self::update) exactly once. The first-ever `update`
/// produces no pointer-derived motion regardless of pointer state, so a
/// gesture that begins before the first frame cannot cause a jump.
pub struct CameraInputController {
    held: [bool; ControlKey::COUNT],
    move_active: bool,
    rotate_active: bool,
    pointer: IVec2,
    previous_pointer: Option<IVec2>,
    scroll: f32,
    speeds: ControllerSpeeds,
}

impl Default for CameraInputController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraInputController {
    /// Create a controller with default speeds and no held input.
    #[must_use]
    pub fn new() -> Self {
        Self::with_speeds(ControllerSpeeds::default())
    }

    /// Create a controller with explicit speeds.
    #[must_use]
    pub fn with_speeds(speeds: ControllerSpeeds) -> Self {
        Self {
            held: [false; ControlKey::COUNT],
            move_active: false,
            rotate_active: false,
            pointer: IVec2::ZERO,
            previous_pointer: None,
            scroll: 0.0,
            speeds,
        }
    }

    /// Record whether a movement key is held. Idempotent; the last write
    /// per key before `update` wins.
    pub fn set_control_key_state(&mut self, key: ControlKey, pressed: bool) {
        self.held[key.index()] = pressed;
    }

    /// Record whether a pointer gesture is active. Same idempotency
    /// contract as [`set_control_key_state`](Self::set_control_key_state).
    pub fn set_touch_state(&mut self, gesture: TouchGesture, active: bool) {
        match gesture {
            TouchGesture::Move => self.move_active = active,
            TouchGesture::Rotate => self.rotate_active = active,
        }
    }

    /// Record the current pointer position in integer screen space.
    /// Out-of-range coordinates are accepted as-is.
    pub fn set_pointer_position(&mut self, x: i32, y: i32) {
        self.pointer = IVec2::new(x, y);
    }

    /// Accumulate scroll-wheel input for this frame (positive = dolly in).
    pub fn add_scroll(&mut self, delta: f32) {
        self.scroll += delta;
    }

    fn held_key(&self, key: ControlKey) -> bool {
        self.held[key.index()]
    }

    /// Apply one fixed-step frame of accumulated input to `camera`.
    pub fn update(&mut self, camera: &mut Camera) {
        self.update_scaled(camera, 1.0);
    }

    /// Apply one frame of accumulated input, scaling key movement by
    /// `time_scale` (e.g. `dt * 60.0` for frame-rate-independent motion
    /// normalized to a 60 Hz step). Pointer-derived motion is not scaled.
    pub fn update_scaled(&mut self, camera: &mut Camera, time_scale: f32) {
        // The previous pointer position is overwritten whether or not a
        // gesture is active, so the first frame of a new gesture never
        // sees a stale accumulated delta.
        let delta = match self.previous_pointer {
            Some(prev) => (self.pointer - prev).as_vec2(),
            None => Vec2::ZERO,
        };
        self.previous_pointer = Some(self.pointer);

        if self.rotate_active {
            self.orbit(camera, delta);
        }
        if self.move_active {
            self.pan(camera, delta);
        }

        self.translate(camera, time_scale);

        if self.scroll != 0.0 {
            self.dolly(camera, self.scroll);
        }
        self.scroll = 0.0;
    }

    /// Yaw/pitch the position around the target, clamping pitch inside
    /// the pole limits. Distance to the target is preserved.
    fn orbit(&self, camera: &mut Camera, delta: Vec2) {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let mut yaw = offset.z.atan2(offset.x);
        let mut pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();

        yaw += delta.x * self.speeds.rotate;
        pitch = (pitch + delta.y * self.speeds.rotate)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let horizontal = radius * pitch.cos();
        camera.position = camera.target
            + Vec3::new(
                horizontal * yaw.cos(),
                radius * pitch.sin(),
                horizontal * yaw.sin(),
            );
        camera.up = Vec3::Y;
    }

    /// Translate position and target together along the camera's local
    /// right/up axes; the viewing direction is unchanged.
    fn pan(&self, camera: &mut Camera, delta: Vec2) {
        let dir = camera.direction();
        let right = dir.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(dir);

        let translation = right * (-delta.x * self.speeds.pan)
            + up * (delta.y * self.speeds.pan);
        camera.position += translation;
        camera.target += translation;
    }

    /// Move position and target together along the axes of all held keys.
    /// Simultaneous keys compose additively.
    fn translate(&self, camera: &mut Camera, time_scale: f32) {
        let dir = camera.direction();
        let right = dir.cross(Vec3::Y).normalize_or(Vec3::X);

        let mut movement = Vec3::ZERO;
        if self.held_key(ControlKey::Forward) {
            movement += dir;
        }
        if self.held_key(ControlKey::Backward) {
            movement -= dir;
        }
        if self.held_key(ControlKey::Right) {
            movement += right;
        }
        if self.held_key(ControlKey::Left) {
            movement -= right;
        }
        if self.held_key(ControlKey::Up) {
            movement += Vec3::Y;
        }
        if self.held_key(ControlKey::Down) {
            movement -= Vec3::Y;
        }

        if movement == Vec3::ZERO {
            return;
        }

        let step = movement * self.speeds.movement * time_scale;
        camera.position += step;
        camera.target += step;
    }

    /// Exponential dolly toward/away from the target, clamped so the
    /// position never reaches it.
    fn dolly(&self, camera: &mut Camera, scroll: f32) {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let scaled = (radius * (1.0 - scroll * self.speeds.zoom))
            .max(MIN_DOLLY_DISTANCE);
        camera.position = camera.target + offset / radius * scaled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut cam = Camera::default();
        cam.set_look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        cam
    }

    #[test]
    fn first_update_ignores_pointer_position() {
        let mut cam = camera();
        let before = cam.position;
        let mut ctl = CameraInputController::new();
        ctl.set_touch_state(TouchGesture::Rotate, true);
        ctl.set_pointer_position(500, 400);
        ctl.update(&mut cam);
        assert_eq!(cam.position, before);
    }

    #[test]
    fn held_keys_translate_additively() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_control_key_state(ControlKey::Right, true);
        ctl.set_control_key_state(ControlKey::Up, true);
        ctl.update(&mut cam);

        let step = ControllerSpeeds::default().movement;
        // View direction is -Z, so local right is +X.
        let expected = Vec3::new(step, step, 10.0);
        assert!((cam.position - expected).length() < 1e-5);
        assert!((cam.target - Vec3::new(step, step, 0.0)).length() < 1e-5);
    }

    #[test]
    fn released_keys_produce_no_motion() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_control_key_state(ControlKey::Forward, true);
        ctl.set_control_key_state(ControlKey::Forward, false);
        ctl.update(&mut cam);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn translation_preserves_view_direction() {
        let mut cam = camera();
        let dir_before = cam.direction();
        let mut ctl = CameraInputController::new();
        ctl.set_control_key_state(ControlKey::Left, true);
        ctl.set_control_key_state(ControlKey::Down, true);
        ctl.update(&mut cam);
        assert!((cam.direction() - dir_before).length() < 1e-6);
    }

    #[test]
    fn rotate_toggle_without_pointer_motion_is_a_no_op() {
        let mut cam = camera();
        let before = cam.position;
        let mut ctl = CameraInputController::new();

        ctl.set_pointer_position(100, 100);
        ctl.set_touch_state(TouchGesture::Rotate, true);
        ctl.update(&mut cam);
        ctl.set_touch_state(TouchGesture::Rotate, false);
        ctl.update(&mut cam);

        assert!((cam.position - before).length() < 1e-6);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn orbit_preserves_distance_to_target() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_touch_state(TouchGesture::Rotate, true);
        ctl.update(&mut cam);
        ctl.set_pointer_position(40, 25);
        ctl.update(&mut cam);

        assert!((cam.position.length() - 10.0).abs() < 1e-4);
        assert!(cam.position.distance(Vec3::new(0.0, 0.0, 10.0)) > 1e-3);
    }

    #[test]
    fn pitch_clamps_at_the_poles() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_touch_state(TouchGesture::Rotate, true);
        ctl.update(&mut cam);

        // Huge repeated vertical deltas try to push the camera over the
        // top.
        for i in 1..=50 {
            ctl.set_pointer_position(0, i * 1000);
            ctl.update(&mut cam);
        }

        let offset = cam.position - cam.target;
        let pitch = (offset.y / offset.length()).asin();
        assert!(pitch <= PITCH_LIMIT + 1e-4);
        assert!((offset.length() - 10.0).abs() < 1e-3);
        // Still looking at the target from a valid orientation.
        assert!(offset.x.abs() > 1e-4 || offset.z.abs() > 1e-4);
    }

    #[test]
    fn pan_moves_position_and_target_together() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_touch_state(TouchGesture::Move, true);
        ctl.update(&mut cam);
        ctl.set_pointer_position(10, -4);
        ctl.update(&mut cam);

        let shift = cam.target - Vec3::ZERO;
        assert!(shift.length() > 1e-4);
        assert!(
            (cam.position - (Vec3::new(0.0, 0.0, 10.0) + shift)).length()
                < 1e-5
        );
    }

    #[test]
    fn both_gestures_active_applies_both() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_touch_state(TouchGesture::Move, true);
        ctl.set_touch_state(TouchGesture::Rotate, true);
        ctl.update(&mut cam);
        ctl.set_pointer_position(30, 12);
        ctl.update(&mut cam);

        // Orbit moved the offset, pan moved the target.
        assert!(cam.target.length() > 1e-4);
    }

    #[test]
    fn dolly_never_reaches_the_target() {
        let mut cam = camera();
        let mut ctl = CameraInputController::new();
        for _ in 0..200 {
            ctl.add_scroll(5.0);
            ctl.update(&mut cam);
        }
        assert!(cam.position.distance(cam.target) >= MIN_DOLLY_DISTANCE - 1e-5);
    }

    #[test]
    fn time_scale_scales_key_movement() {
        let mut slow = camera();
        let mut fast = camera();
        let mut ctl = CameraInputController::new();
        ctl.set_control_key_state(ControlKey::Forward, true);
        ctl.update_scaled(&mut slow, 1.0);

        let mut ctl2 = CameraInputController::new();
        ctl2.set_control_key_state(ControlKey::Forward, true);
        ctl2.update_scaled(&mut fast, 2.0);

        let slow_step = (Vec3::new(0.0, 0.0, 10.0) - slow.position).length();
        let fast_step = (Vec3::new(0.0, 0.0, 10.0) - fast.position).length();
        assert!((fast_step - 2.0 * slow_step).abs() < 1e-5);
    }
}
