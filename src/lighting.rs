//! Directional lights and their GPU uniform.

use glam::Vec3;

/// A light with direction and color but no position (infinite distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectLight {
    /// Direction the light travels, world space.
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
}

/// Maximum directional lights the forward shader consumes per frame.
pub const MAX_LIGHTS: usize = 3;

/// The process-wide default light rig applied when lighting is toggled on:
/// a warm key light, an amber fill, and a cool rim. Read-only; consumers
/// copy values out of the table and never hold a mutable alias into it.
pub const DEFAULT_LIGHTS: [DirectLight; 3] = [
    DirectLight {
        direction: Vec3::new(-0.526_540_8, -0.573_576_5, -0.627_506_9),
        color: Vec3::new(1.0, 0.960_784_4, 0.807_843_2),
    },
    DirectLight {
        direction: Vec3::new(0.719_846_4, 0.342_020_1, 0.604_022_7),
        color: Vec3::new(0.964_705_9, 0.760_784_4, 0.407_843_2),
    },
    DirectLight {
        direction: Vec3::new(0.454_519_5, -0.766_044_4, 0.454_519_5),
        color: Vec3::new(0.323_137_3, 0.360_784_4, 0.393_725_5),
    },
];

/// One light slot in [`LightsUniform`]. vec4 fields keep WGSL-compatible
/// 16-byte alignment; the `w` components are unused.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// Light direction, `w` unused.
    pub direction: [f32; 4],
    /// Light color, `w` unused.
    pub color: [f32; 4],
}

/// GPU uniform for the active directional light list.
/// NOTE: field order and padding must match the WGSL `Lights` struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    /// Fixed-capacity light slots; only the first `count` are valid.
    pub lights: [GpuLight; MAX_LIGHTS],
    /// Number of valid entries in `lights`.
    pub count: u32,
    /// Padding for GPU alignment.
    pub _pad: [u32; 3],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            lights: [GpuLight {
                direction: [0.0; 4],
                color: [0.0; 4],
            }; MAX_LIGHTS],
            count: 0,
            _pad: [0; 3],
        }
    }
}

impl LightsUniform {
    /// Pack a light list into the uniform, truncating past [`MAX_LIGHTS`].
    #[must_use]
    pub fn from_lights(lights: &[DirectLight]) -> Self {
        let mut uniform = Self::default();
        for (slot, light) in uniform.lights.iter_mut().zip(lights) {
            let d = light.direction.normalize_or(Vec3::NEG_Y);
            slot.direction = [d.x, d.y, d.z, 0.0];
            slot.color = [light.color.x, light.color.y, light.color.z, 0.0];
        }
        uniform.count = lights.len().min(MAX_LIGHTS) as u32;
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig_has_three_lights() {
        assert_eq!(DEFAULT_LIGHTS.len(), 3);
        // Key light is the warm near-white one.
        assert_eq!(DEFAULT_LIGHTS[0].color.x, 1.0);
        for light in DEFAULT_LIGHTS {
            // Directions in the rig are unit-length by construction.
            assert!((light.direction.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn uniform_packs_and_truncates() {
        let empty = LightsUniform::from_lights(&[]);
        assert_eq!(empty.count, 0);

        let rig = LightsUniform::from_lights(&DEFAULT_LIGHTS);
        assert_eq!(rig.count, 3);
        assert!((rig.lights[1].direction[0] - 0.719_846_4).abs() < 1e-6);

        let mut many = DEFAULT_LIGHTS.to_vec();
        many.extend_from_slice(&DEFAULT_LIGHTS);
        assert_eq!(LightsUniform::from_lights(&many).count, 3);
    }
}
