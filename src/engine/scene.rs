// One scene instance: input flags, pointer-lock controls, motion integrator
// and the ECS world holding the cube and floor.
//
// Everything the scene holds on to is acquired in `new` and released in
// `teardown`, so several sessions can exist side by side and a torn-down
// session leaves no cursor grab or held keys behind.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use glam::Vec3;
use winit::event::WindowEvent;

use super::components::{Color, MeshKind, Spin, Transform};
use super::config::{self, CameraConfig, MotionConfig};
use super::input::MovementState;
use super::motion::{MotionIntegrator, MotionStep};
use super::pointer_lock::{CursorSurface, PointerLockControls, PointerLockError};
use super::systems::spin_system;

pub struct SceneSession {
    movement: MovementState,
    controls: PointerLockControls,
    motion: MotionIntegrator,
    world: World,
    schedule: Schedule,
    frame: u64,
    active: bool,
}

impl SceneSession {
    pub fn new(motion: MotionConfig, camera: CameraConfig) -> Self {
        let mut world = World::new();
        spawn_scene(&mut world);

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(spin_system);

        log::info!("scene session started");
        Self {
            movement: MovementState::new(),
            controls: PointerLockControls::new(&camera),
            motion: MotionIntegrator::new(motion),
            world,
            schedule,
            frame: 0,
            active: true,
        }
    }

    /// Route a window event to the input tracker. Focus loss also releases
    /// the pointer, since the OS drops the grab anyway.
    pub fn handle_window_event(&mut self, event: &WindowEvent, surface: &impl CursorSurface) {
        if !self.active {
            return;
        }
        self.movement.process_event(event);
        if let WindowEvent::Focused(false) = event {
            self.controls.unlock(surface);
        }
    }

    /// Relative mouse motion from the device; turns the camera while locked.
    pub fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.active {
            self.controls.handle_mouse_motion(dx, dy);
        }
    }

    /// Click-to-look. On failure the scene keeps running unlocked.
    pub fn request_lock(&mut self, surface: &impl CursorSurface) -> Result<(), PointerLockError> {
        if !self.active {
            return Ok(());
        }
        self.controls.lock(surface)
    }

    pub fn release_lock(&mut self, surface: &impl CursorSurface) {
        self.controls.unlock(surface);
    }

    /// One frame of scene logic; call before drawing. Does nothing after teardown.
    pub fn tick(&mut self) -> MotionStep {
        if !self.active {
            return MotionStep::default();
        }
        let step = self.motion.tick(&self.movement, &mut self.controls);
        self.schedule.run(&mut self.world);
        self.frame += 1;
        step
    }

    /// Release the pointer and drop all input state. Safe to call repeatedly.
    pub fn teardown(&mut self, surface: &impl CursorSurface) {
        self.controls.unlock(surface);
        self.movement.clear();
        if self.active {
            log::info!("scene session torn down after {} frames", self.frame);
        }
        self.active = false;
    }

    pub fn is_locked(&self) -> bool { self.controls.is_locked() }
    pub fn frame(&self) -> u64 { self.frame }
    pub fn movement(&self) -> &MovementState { &self.movement }
    pub fn controls(&self) -> &PointerLockControls { &self.controls }
    pub fn velocity(&self) -> glam::Vec2 { self.motion.velocity() }

    /// Mutable world access for queries that need it (bevy_ecs caches query state).
    pub fn world_mut(&mut self) -> &mut World { &mut self.world }
}

/// The cube (spinning, at the origin) and the floor beneath it.
fn spawn_scene(world: &mut World) {
    world.spawn((
        Transform::default(),
        MeshKind::Cube,
        Color::from_hex(config::CUBE_COLOR),
        Spin { per_frame: Vec3::new(config::CUBE_SPIN, config::CUBE_SPIN, 0.0) },
    ));
    world.spawn((
        Transform::from_position(Vec3::new(0.0, config::FLOOR_HEIGHT, 0.0)),
        MeshKind::Floor,
        Color::from_hex(config::FLOOR_COLOR),
    ));
}
