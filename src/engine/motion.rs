// Per-frame motion integration for the first-person camera.
//
// Horizontal: held keys give a unit direction, which accelerates a damped
// velocity; the velocity is applied through the pointer-lock controls so
// movement follows the camera's facing. Releasing the keys leaves the
// velocity to coast and decay geometrically.
//
// Vertical: fixed steps, no inertia. Descent stops at the floor height.
//
// Runs once per rendered frame. Quantities are per frame, not per second.

use glam::Vec2;
use super::config::MotionConfig;
use super::input::MovementState;
use super::pointer_lock::PointerLockControls;

/// Unit movement direction from held keys: x = right, y = forward.
///
/// Zero when no horizontal key is held or opposite keys cancel out.
/// Diagonals are normalized so they are no faster than a single axis.
pub fn movement_direction(state: &MovementState) -> Vec2 {
    let dx = state.right as i8 - state.left as i8;
    let dz = state.forward as i8 - state.backward as i8;
    Vec2::new(dx as f32, dz as f32).normalize_or_zero()
}

/// What one tick did to the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionStep {
    /// Distance passed to `move_forward`.
    pub forward: f32,
    /// Distance passed to `move_right`.
    pub right: f32,
    /// Change in camera height.
    pub vertical: f32,
}

pub struct MotionIntegrator {
    pub config: MotionConfig,
    /// x = right axis, y = forward axis. Pressing forward drives y negative;
    /// the sign is flipped when the velocity is applied.
    velocity: Vec2,
}

impl MotionIntegrator {
    pub fn new(config: MotionConfig) -> Self {
        debug_assert!(config.damp > 0.0 && config.damp < 1.0, "damping must be in (0, 1)");
        Self {
            config,
            velocity: Vec2::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Advance one frame: accelerate, translate the camera, damp, then step
    /// the camera height.
    pub fn tick(&mut self, state: &MovementState, controls: &mut PointerLockControls) -> MotionStep {
        let direction = movement_direction(state);

        if state.forward || state.backward {
            self.velocity.y -= direction.y * self.config.accel;
        }
        if state.left || state.right {
            self.velocity.x -= direction.x * self.config.accel;
        }

        let step_forward = -self.velocity.y;
        let step_right = -self.velocity.x;
        controls.move_forward(step_forward);
        controls.move_right(step_right);

        self.velocity *= self.config.damp;

        let vertical = self.step_height(state, controls);

        MotionStep {
            forward: step_forward,
            right: step_right,
            vertical,
        }
    }

    fn step_height(&self, state: &MovementState, controls: &mut PointerLockControls) -> f32 {
        let camera = controls.camera_mut();
        let before = camera.position.y;
        let mut y = before;

        if state.up {
            y += self.config.vertical_step;
            if let Some(max) = self.config.max_height {
                // Like the floor, the cap only blocks; it never pulls down.
                y = y.min(max.max(before));
            }
        }
        // Floor test uses the height at the start of the frame.
        if state.down && before > self.config.min_height {
            y = (y - self.config.vertical_step).max(self.config.min_height);
        }

        camera.position.y = y;
        y - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::CameraConfig;

    const EPS: f32 = 1e-6;

    fn setup() -> (MotionIntegrator, PointerLockControls) {
        (
            MotionIntegrator::new(MotionConfig::default()),
            PointerLockControls::new(&CameraConfig::default()),
        )
    }

    fn every_flag_combination() -> impl Iterator<Item = MovementState> {
        (0u8..64).map(|bits| MovementState {
            forward: bits & 1 != 0,
            backward: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
            up: bits & 16 != 0,
            down: bits & 32 != 0,
        })
    }

    #[test]
    fn direction_is_zero_or_unit_for_every_combination() {
        for state in every_flag_combination() {
            let cancels_z = state.forward == state.backward;
            let cancels_x = state.left == state.right;
            let length = movement_direction(&state).length();
            if cancels_z && cancels_x {
                assert_eq!(length, 0.0, "{state:?}");
            } else {
                assert!((length - 1.0).abs() < EPS, "{state:?}");
            }
        }
    }

    #[test]
    fn diagonal_is_not_faster_than_straight() {
        let diagonal = MovementState { forward: true, right: true, ..Default::default() };
        let dir = movement_direction(&diagonal);
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!((dir.x - half).abs() < EPS);
        assert!((dir.y - half).abs() < EPS);
    }

    #[test]
    fn first_forward_frame_moves_by_accel() {
        let (mut motion, mut controls) = setup();
        let state = MovementState { forward: true, ..Default::default() };
        let start = controls.camera().position;

        let step = motion.tick(&state, &mut controls);

        assert!((step.forward - 0.05).abs() < EPS);
        assert_eq!(step.right, 0.0);
        // Damped after application.
        assert!((motion.velocity().y + 0.045).abs() < EPS);
        // Default camera faces -Z.
        let moved = controls.camera().position - start;
        assert!((moved.z + 0.05).abs() < EPS);
    }

    #[test]
    fn velocity_decays_geometrically_without_input() {
        let (mut motion, mut controls) = setup();
        let forward = MovementState { forward: true, right: true, ..Default::default() };
        for _ in 0..10 {
            motion.tick(&forward, &mut controls);
        }

        let idle = MovementState::default();
        let mut previous = motion.velocity().length();
        for _ in 0..100 {
            motion.tick(&idle, &mut controls);
            let current = motion.velocity().length();
            assert!(current < previous);
            assert!(current > 0.0);
            assert!((current / previous - motion.config.damp).abs() < 1e-4);
            previous = current;
        }
    }

    #[test]
    fn releasing_keys_coasts_then_settles() {
        let (mut motion, mut controls) = setup();
        let forward = MovementState { forward: true, ..Default::default() };
        for _ in 0..30 {
            motion.tick(&forward, &mut controls);
        }

        let idle = MovementState::default();
        let first = motion.tick(&idle, &mut controls);
        assert!(first.forward > 0.0, "expected inertia after release");

        let mut last = first;
        for _ in 0..48 {
            last = motion.tick(&idle, &mut controls);
        }
        assert!(last.forward > 0.0);
        assert!(last.forward < first.forward * 0.01);
    }

    #[test]
    fn no_acceleration_on_an_axis_without_its_keys() {
        let (mut motion, mut controls) = setup();
        let strafe = MovementState { right: true, ..Default::default() };
        motion.tick(&strafe, &mut controls);
        assert_eq!(motion.velocity().y, 0.0);
        assert!(motion.velocity().x < 0.0);
    }

    #[test]
    fn opposite_keys_hold_velocity_steady_except_for_damping() {
        let (mut motion, mut controls) = setup();
        let forward = MovementState { forward: true, ..Default::default() };
        motion.tick(&forward, &mut controls);
        let before = motion.velocity().y;

        let both = MovementState { forward: true, backward: true, ..Default::default() };
        motion.tick(&both, &mut controls);
        assert!((motion.velocity().y - before * motion.config.damp).abs() < EPS);
    }

    #[test]
    fn holding_down_never_goes_below_the_floor() {
        let (mut motion, mut controls) = setup();
        controls.camera_mut().position.y = 3.3;
        let down = MovementState { down: true, ..Default::default() };
        for _ in 0..200 {
            motion.tick(&down, &mut controls);
            assert!(controls.camera().position.y >= motion.config.min_height);
        }
        assert!((controls.camera().position.y - motion.config.min_height).abs() < EPS);
    }

    #[test]
    fn descent_below_floor_start_is_suppressed_not_corrected() {
        let (mut motion, mut controls) = setup();
        controls.camera_mut().position.y = 0.0;
        let down = MovementState { down: true, ..Default::default() };
        let step = motion.tick(&down, &mut controls);
        assert_eq!(step.vertical, 0.0);
        assert_eq!(controls.camera().position.y, 0.0);
    }

    #[test]
    fn up_and_down_at_the_floor_only_rises() {
        let (mut motion, mut controls) = setup();
        let min = motion.config.min_height;
        controls.camera_mut().position.y = min;
        let both = MovementState { up: true, down: true, ..Default::default() };
        let step = motion.tick(&both, &mut controls);
        assert!((step.vertical - motion.config.vertical_step).abs() < EPS);
        assert!((controls.camera().position.y - (min + motion.config.vertical_step)).abs() < EPS);
    }

    #[test]
    fn ascent_is_unbounded_by_default() {
        let (mut motion, mut controls) = setup();
        let up = MovementState { up: true, ..Default::default() };
        for _ in 0..1000 {
            motion.tick(&up, &mut controls);
        }
        assert!(controls.camera().position.y > 200.0);
    }

    #[test]
    fn optional_ceiling_caps_ascent() {
        let config = MotionConfig { max_height: Some(2.0), ..Default::default() };
        let mut motion = MotionIntegrator::new(config);
        let mut controls = PointerLockControls::new(&CameraConfig::default());
        let up = MovementState { up: true, ..Default::default() };
        for _ in 0..100 {
            motion.tick(&up, &mut controls);
        }
        assert!((controls.camera().position.y - 2.0).abs() < EPS);
    }

    #[test]
    fn forward_follows_camera_yaw() {
        let (mut motion, mut controls) = setup();
        controls.camera_mut().yaw = std::f32::consts::FRAC_PI_2;
        let start = controls.camera().position;
        let forward = MovementState { forward: true, ..Default::default() };
        motion.tick(&forward, &mut controls);
        let moved = controls.camera().position - start;
        assert!(moved.x < 0.0);
        assert!(moved.z.abs() < EPS);
    }
}
