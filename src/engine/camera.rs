// First-person camera pose
//
// Camera model:
//   - An eye position in world space
//   - Yaw about world Y, then pitch about the camera's local X (YXZ order)
//   - yaw=0, pitch=0 looks along -Z with +X to the right
//   - Horizontal movement axes ignore pitch, so looking up or down never
//     changes walking speed or direction

use glam::{EulerRot, Mat4, Quat, Vec3};
use super::config::CameraConfig;

pub struct FirstPersonCamera {
    pub position: Vec3,

    /// Horizontal rotation in radians (0 = looking along -Z axis).
    pub yaw: f32,

    /// Elevation in radians (positive looks up). Kept within [-PI/2, PI/2]
    /// by the pointer-lock controls.
    pub pitch: f32,

    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl FirstPersonCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: config.start,
            yaw: 0.0,
            pitch: 0.0,
            fov: config.fov,
            near: config.near,
            far: config.far,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Full 3D look direction, including pitch.
    pub fn look_direction(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Facing direction projected onto the XZ plane (unit length).
    pub fn horizontal_forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Camera right axis on the XZ plane (unit length).
    pub fn horizontal_right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// View matrix: inverse of the camera's world transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    /// Perspective projection matrix.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn camera() -> FirstPersonCamera {
        FirstPersonCamera::new(&CameraConfig::default())
    }

    #[test]
    fn default_pose_looks_down_negative_z() {
        let cam = camera();
        assert!(cam.look_direction().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.horizontal_right().abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn quarter_turn_left_faces_negative_x() {
        let mut cam = camera();
        cam.yaw = std::f32::consts::FRAC_PI_2;
        assert!(cam.horizontal_forward().abs_diff_eq(Vec3::NEG_X, EPS));
        assert!(cam.look_direction().abs_diff_eq(Vec3::NEG_X, EPS));
        assert!(cam.horizontal_right().abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn horizontal_axes_ignore_pitch() {
        let mut cam = camera();
        cam.yaw = 0.7;
        let forward = cam.horizontal_forward();
        cam.pitch = 1.2;
        assert!(cam.horizontal_forward().abs_diff_eq(forward, EPS));
        assert!(cam.look_direction().y > 0.9);
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let cam = camera();
        let eye = cam.view_matrix().transform_point3(cam.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn straight_up_view_projection_is_finite() {
        let mut cam = camera();
        cam.pitch = std::f32::consts::FRAC_PI_2;
        let vp = cam.view_projection(16.0 / 9.0);
        assert!(vp.is_finite());
    }
}
