// Pointer-lock look controls
//
// While locked, relative mouse motion turns the camera (yaw/pitch). Locking
// is requested by a click and released by Escape, focus loss or teardown.
// Horizontal translation works whether or not the pointer is locked.

use std::f32::consts::FRAC_PI_2;

use winit::window::{CursorGrabMode, Window};

use super::camera::FirstPersonCamera;
use super::config::CameraConfig;

#[derive(Debug, thiserror::Error)]
pub enum PointerLockError {
    #[error("cursor grab refused: {0}")]
    Refused(#[from] winit::error::ExternalError),
}

/// Something that can capture and release the OS cursor.
pub trait CursorSurface {
    fn grab_cursor(&self) -> Result<(), PointerLockError>;
    fn release_cursor(&self) -> Result<(), PointerLockError>;
}

impl CursorSurface for Window {
    fn grab_cursor(&self) -> Result<(), PointerLockError> {
        // Locked is unsupported on some platforms (Windows); Confined plus
        // relative device motion behaves the same for look control.
        self.set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.set_cursor_grab(CursorGrabMode::Confined))?;
        self.set_cursor_visible(false);
        Ok(())
    }

    fn release_cursor(&self) -> Result<(), PointerLockError> {
        self.set_cursor_visible(true);
        self.set_cursor_grab(CursorGrabMode::None)?;
        Ok(())
    }
}

pub struct PointerLockControls {
    camera: FirstPersonCamera,
    locked: bool,
    /// Radians per pixel of relative mouse motion.
    pub sensitivity: f32,
}

impl PointerLockControls {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            camera: FirstPersonCamera::new(config),
            locked: false,
            sensitivity: config.look_sensitivity,
        }
    }

    pub fn camera(&self) -> &FirstPersonCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FirstPersonCamera {
        &mut self.camera
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Capture the cursor and start routing mouse motion to the camera.
    /// Locking an already locked surface is a no-op.
    pub fn lock(&mut self, surface: &impl CursorSurface) -> Result<(), PointerLockError> {
        if self.locked {
            return Ok(());
        }
        surface.grab_cursor()?;
        self.locked = true;
        log::debug!("pointer locked");
        Ok(())
    }

    /// Release the cursor. Safe to call when already unlocked; a failed
    /// release is logged and the controls still end up unlocked.
    pub fn unlock(&mut self, surface: &impl CursorSurface) {
        if let Err(e) = surface.release_cursor() {
            log::warn!("pointer release failed: {e}");
        }
        if self.locked {
            log::debug!("pointer unlocked");
        }
        self.locked = false;
    }

    /// Apply a relative mouse delta (pixels). Ignored unless locked.
    /// Returns whether the camera turned.
    pub fn handle_mouse_motion(&mut self, dx: f32, dy: f32) -> bool {
        if !self.locked {
            return false;
        }
        self.camera.yaw -= dx * self.sensitivity;
        self.camera.pitch = (self.camera.pitch - dy * self.sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
        true
    }

    /// Translate along the camera's facing direction on the XZ plane.
    pub fn move_forward(&mut self, distance: f32) {
        let forward = self.camera.horizontal_forward();
        self.camera.position += forward * distance;
    }

    /// Strafe along the camera's right axis on the XZ plane.
    pub fn move_right(&mut self, distance: f32) {
        let right = self.camera.horizontal_right();
        self.camera.position += right * distance;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use glam::Vec3;

    const EPS: f32 = 1e-5;

    /// In-memory cursor surface that counts grabs and releases.
    #[derive(Default)]
    pub(crate) struct FakeSurface {
        pub refuse: bool,
        pub grabs: Cell<u32>,
        pub releases: Cell<u32>,
    }

    impl CursorSurface for FakeSurface {
        fn grab_cursor(&self) -> Result<(), PointerLockError> {
            if self.refuse {
                return Err(winit::error::ExternalError::Ignored.into());
            }
            self.grabs.set(self.grabs.get() + 1);
            Ok(())
        }

        fn release_cursor(&self) -> Result<(), PointerLockError> {
            self.releases.set(self.releases.get() + 1);
            Ok(())
        }
    }

    fn controls() -> PointerLockControls {
        PointerLockControls::new(&CameraConfig::default())
    }

    #[test]
    fn mouse_motion_is_ignored_until_locked() {
        let mut controls = controls();
        assert!(!controls.handle_mouse_motion(100.0, 50.0));
        assert_eq!(controls.camera().yaw, 0.0);
        assert_eq!(controls.camera().pitch, 0.0);
    }

    #[test]
    fn locked_mouse_motion_turns_the_camera() {
        let surface = FakeSurface::default();
        let mut controls = controls();
        controls.lock(&surface).unwrap();
        assert!(controls.handle_mouse_motion(100.0, 50.0));
        // Moving the mouse right turns right (negative yaw), down looks down.
        assert!((controls.camera().yaw + 0.2).abs() < EPS);
        assert!((controls.camera().pitch + 0.1).abs() < EPS);
    }

    #[test]
    fn pitch_is_clamped_to_straight_up_and_down() {
        let surface = FakeSurface::default();
        let mut controls = controls();
        controls.lock(&surface).unwrap();
        controls.handle_mouse_motion(0.0, -100_000.0);
        assert!((controls.camera().pitch - FRAC_PI_2).abs() < EPS);
        controls.handle_mouse_motion(0.0, 100_000.0);
        assert!((controls.camera().pitch + FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn lock_is_idempotent() {
        let surface = FakeSurface::default();
        let mut controls = controls();
        controls.lock(&surface).unwrap();
        controls.lock(&surface).unwrap();
        assert_eq!(surface.grabs.get(), 1);
        assert!(controls.is_locked());
    }

    #[test]
    fn refused_grab_leaves_controls_unlocked() {
        let surface = FakeSurface { refuse: true, ..Default::default() };
        let mut controls = controls();
        assert!(controls.lock(&surface).is_err());
        assert!(!controls.is_locked());
    }

    #[test]
    fn unlock_twice_does_not_fail() {
        let surface = FakeSurface::default();
        let mut controls = controls();
        controls.lock(&surface).unwrap();
        controls.unlock(&surface);
        controls.unlock(&surface);
        assert!(!controls.is_locked());
        assert!(!controls.handle_mouse_motion(10.0, 0.0));
    }

    #[test]
    fn move_forward_follows_facing() {
        let mut controls = controls();
        let start = controls.camera().position;
        controls.move_forward(2.0);
        assert!(controls.camera().position.abs_diff_eq(start + Vec3::new(0.0, 0.0, -2.0), EPS));
    }

    #[test]
    fn move_right_strafes() {
        let mut controls = controls();
        let start = controls.camera().position;
        controls.move_right(1.5);
        assert!(controls.camera().position.abs_diff_eq(start + Vec3::new(1.5, 0.0, 0.0), EPS));
    }

    #[test]
    fn looking_up_does_not_lift_the_camera() {
        let surface = FakeSurface::default();
        let mut controls = controls();
        controls.lock(&surface).unwrap();
        controls.handle_mouse_motion(0.0, -400.0);
        let start = controls.camera().position;
        controls.move_forward(1.0);
        let moved = controls.camera().position - start;
        assert!(moved.y.abs() < EPS);
        assert!((moved.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn movement_works_while_unlocked() {
        let mut controls = controls();
        let start = controls.camera().position;
        controls.move_forward(0.5);
        assert!(controls.camera().position != start);
    }
}
