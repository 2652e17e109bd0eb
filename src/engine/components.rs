// ECS components for scene objects
// The camera is not an entity; it lives in the pointer-lock controls

use bevy_ecs::prelude::*;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, orientation and scale of an entity in 3D space.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z (intrinsic).
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

/// RGB color for rendering
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// `0xRRGGBB` in sRGB, stored linear for an sRGB render target.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self { r: channel(16), g: channel(8), b: channel(0) }
    }

    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Which procedural mesh an entity is drawn with.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cube,
    Floor,
}

/// Constant rotation added to `Transform::rotation` every frame (radians).
/// Purely decorative; independent of input.
#[derive(Component, Debug, Clone, Copy)]
pub struct Spin {
    pub per_frame: Vec3,
}
