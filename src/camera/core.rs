use std::fmt;

use glam::{Mat4, Vec3};

/// Camera position used after startup and whenever a model is (un)loaded.
pub const DEFAULT_VIEW_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);

/// Perspective look-at camera.
///
/// Invariant: `position != target`, otherwise the view orientation is
/// undefined. [`CameraInputController`](super::controller::CameraInputController)
/// preserves this by clamping dolly distance and skipping degenerate orbits.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DEFAULT_VIEW_POSITION,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.5,
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    /// Point the camera at `target` from `position`, keeping world up.
    pub fn set_look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        self.up = Vec3::Y;
    }

    /// Normalized view direction from position toward target.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Build the combined view-projection matrix ([0,1] depth, wgpu
    /// convention).
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, self.up);
        let proj = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        proj * view
    }
}

impl fmt::Display for Camera {
    /// One-line summary for the status readout.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos ({:.2}, {:.2}, {:.2}) -> ({:.2}, {:.2}, {:.2})",
            self.position.x,
            self.position.y,
            self.position.z,
            self.target.x,
            self.target.y,
            self.target.z
        )
    }
}

/// GPU uniform holding the view-projection matrix and camera position.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Padding for GPU alignment.
    pub _pad: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            _pad: 0.0,
        }
    }
}

impl CameraUniform {
    /// Refresh uniform fields from the camera's current state.
    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.position = camera.position.to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_at_origin() {
        let cam = Camera::default();
        assert_eq!(cam.position, DEFAULT_VIEW_POSITION);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn display_summarizes_position_and_target() {
        let mut cam = Camera::default();
        cam.set_look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        assert_eq!(
            cam.to_string(),
            "pos (1.00, 2.00, 3.00) -> (0.00, 0.00, 0.00)"
        );
    }

    #[test]
    fn direction_is_normalized() {
        let mut cam = Camera::default();
        cam.set_look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let dir = cam.direction();
        assert!((dir - Vec3::NEG_Z).length() < 1e-6);
    }
}
