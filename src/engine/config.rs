// Fixed tuning constants for the first-person scene.
// There is no runtime configuration surface; tests build variants of the
// structs below directly.

use glam::Vec3;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Horizontal velocity gained per frame while a movement key is held.
pub const ACCEL: f32 = 0.05;
/// Fraction of horizontal velocity retained each frame. Must stay below 1.
pub const DAMP: f32 = 0.9;
/// Height change per frame while Space / Shift is held.
pub const VERTICAL_STEP: f32 = 0.25;
/// Descending stops at this camera height.
pub const MIN_HEIGHT: f32 = 0.1;

/// Radians of yaw/pitch per pixel of relative mouse motion.
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEG: f32 = 100.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 3.0);

/// Decorative cube rotation per frame, applied on X and Y.
pub const CUBE_SPIN: f32 = 0.05;
pub const CUBE_SIZE: f32 = 1.0;
/// sRGB hex colour.
pub const CUBE_COLOR: u32 = 0x00205b;

pub const FLOOR_SIZE: f32 = 100.0;
pub const FLOOR_HEIGHT: f32 = -1.0;
pub const FLOOR_COLOR: u32 = 0xffffff;

// ============================================================================
// MOTION
// ============================================================================

/// Parameters of the per-frame motion integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub accel: f32,
    /// Velocity retention factor in (0, 1).
    pub damp: f32,
    pub vertical_step: f32,
    pub min_height: f32,
    /// Ascent cap. `None` keeps ascent unbounded.
    pub max_height: Option<f32>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            accel: ACCEL,
            damp: DAMP,
            vertical_step: VERTICAL_STEP,
            min_height: MIN_HEIGHT,
            max_height: None,
        }
    }
}

// ============================================================================
// CAMERA
// ============================================================================

/// Projection and look parameters for the first-person camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub start: Vec3,
    pub look_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: CAMERA_FOV_DEG.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            start: CAMERA_START,
            look_sensitivity: LOOK_SENSITIVITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damping_retains_less_than_everything() {
        let config = MotionConfig::default();
        assert!(config.damp > 0.0 && config.damp < 1.0);
        assert!(config.max_height.is_none());
    }

    #[test]
    fn camera_starts_behind_the_cube() {
        let config = CameraConfig::default();
        assert!(config.start.z > CUBE_SIZE);
        assert!(config.near < config.far);
    }
}
