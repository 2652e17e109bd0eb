// ECS systems for updating scene state
// Run once per frame through the session's schedule

use bevy_ecs::prelude::*;
use super::components::*;

/// Advance every spinning entity by its per-frame rotation.
pub fn spin_system(mut query: Query<(&mut Transform, &Spin)>) {
    for (mut transform, spin) in query.iter_mut() {
        transform.rotation += spin.per_frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn spin_accumulates_each_run() {
        let mut world = World::new();
        let spinning = world
            .spawn((Transform::default(), Spin { per_frame: Vec3::new(0.05, 0.05, 0.0) }))
            .id();
        let still = world.spawn(Transform::default()).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(spin_system);
        for _ in 0..4 {
            schedule.run(&mut world);
        }

        let rotation = world.get::<Transform>(spinning).unwrap().rotation;
        assert!(rotation.abs_diff_eq(Vec3::new(0.2, 0.2, 0.0), 1e-6));
        assert_eq!(world.get::<Transform>(still).unwrap().rotation, Vec3::ZERO);
    }
}
