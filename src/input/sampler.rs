//! Per-frame input sampling.
//!
//! winit delivers input as events, but the camera controller wants the
//! held state sampled once per frame tick. The sampler accumulates
//! events between redraws and pushes a whole-frame snapshot into the
//! controller right before its `update`.

use glam::IVec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::controller::{
    CameraInputController, ControlKey, TouchGesture,
};

/// Movement key layout: A/D strafe, W/S fly, arrow up/down elevate.
fn control_key_for(code: KeyCode) -> Option<ControlKey> {
    match code {
        KeyCode::KeyA => Some(ControlKey::Left),
        KeyCode::KeyD => Some(ControlKey::Right),
        KeyCode::KeyW => Some(ControlKey::Forward),
        KeyCode::KeyS => Some(ControlKey::Backward),
        KeyCode::ArrowUp => Some(ControlKey::Up),
        KeyCode::ArrowDown => Some(ControlKey::Down),
        _ => None,
    }
}

/// Accumulates window events into per-frame input state.
#[derive(Debug, Default)]
pub struct FrameSampler {
    left: bool,
    right: bool,
    forward: bool,
    backward: bool,
    up: bool,
    down: bool,
    move_button: bool,
    rotate_button: bool,
    pointer: IVec2,
    scroll: f32,
}

impl FrameSampler {
    /// Create a sampler with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a window event into the sampled state. Returns `true` when
    /// the event was input this sampler tracks.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return false;
                };
                let Some(key) = control_key_for(code) else {
                    return false;
                };
                let pressed = event.state == ElementState::Pressed;
                match key {
                    ControlKey::Left => self.left = pressed,
                    ControlKey::Right => self.right = pressed,
                    ControlKey::Forward => self.forward = pressed,
                    ControlKey::Backward => self.backward = pressed,
                    ControlKey::Up => self.up = pressed,
                    ControlKey::Down => self.down = pressed,
                }
                true
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.move_button = pressed,
                    MouseButton::Right => self.rotate_button = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer =
                    IVec2::new(position.x as i32, position.y as i32);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                true
            }
            _ => false,
        }
    }

    /// Push the frame's snapshot into the controller. Call once per
    /// frame, immediately before the controller's `update`.
    pub fn apply(&mut self, controller: &mut CameraInputController) {
        controller.set_control_key_state(ControlKey::Left, self.left);
        controller.set_control_key_state(ControlKey::Right, self.right);
        controller.set_control_key_state(ControlKey::Forward, self.forward);
        controller
            .set_control_key_state(ControlKey::Backward, self.backward);
        controller.set_control_key_state(ControlKey::Up, self.up);
        controller.set_control_key_state(ControlKey::Down, self.down);

        controller.set_touch_state(TouchGesture::Move, self.move_button);
        controller.set_touch_state(TouchGesture::Rotate, self.rotate_button);
        controller.set_pointer_position(self.pointer.x, self.pointer.y);

        if self.scroll != 0.0 {
            controller.add_scroll(self.scroll);
            self.scroll = 0.0;
        }
    }
}
