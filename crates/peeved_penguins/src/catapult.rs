use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use game_helpers::restart::CleanupMarker;
use thiserror::Error;

use crate::config::{
    ARM_MASS, ARM_PIVOT, ARM_POSITION, ARM_SIZE, ARM_SPRING_ANCHOR, ARM_SPRING_DAMPING,
    ARM_SPRING_STIFFNESS, CATAPULT_POSITION, CATAPULT_SIZE, CATEGORY_LAUNCHER, CATEGORY_SCENERY,
};
use crate::level::PhysicsCategory;

const BASE_COLOR: Color = Color::srgb(0.45, 0.3, 0.15);
const ARM_COLOR: Color = Color::srgb(0.7, 0.5, 0.25);

pub struct CatapultPlugin;

impl Plugin for CatapultPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_rig);
    }
}

/// Entities of the launcher, available to every system once spawned.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneRig {
    pub catapult: Entity,
    pub arm: Entity,
    pub cantilever: Entity,
    pub drag_handle: Entity,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RigError {
    #[error("catapult rig is missing its {0}")]
    MissingElement(&'static str),
}

#[derive(Component)]
pub struct LaunchArm;

#[derive(Component)]
pub struct DragHandle;

pub fn spawn_rig(mut commands: Commands) {
    let catapult = commands
        .spawn((
            Name::new("Catapult"),
            Sprite::from_color(BASE_COLOR, CATAPULT_SIZE),
            Transform::from_translation(CATAPULT_POSITION.extend(0.5)),
            RigidBody::Fixed,
            Collider::cuboid(CATAPULT_SIZE.x / 2.0, CATAPULT_SIZE.y / 2.0),
            PhysicsCategory(CATEGORY_SCENERY),
            PhysicsCategory(CATEGORY_SCENERY).collision_groups(),
            CleanupMarker,
        ))
        .id();

    let cantilever_position = ARM_POSITION + ARM_SPRING_ANCHOR;
    let cantilever = commands
        .spawn((
            Name::new("Cantilever"),
            Transform::from_translation(cantilever_position.extend(0.0)),
            RigidBody::Fixed,
            CleanupMarker,
        ))
        .id();

    // The arm never collides: the penguin sits in its bucket.
    let arm = commands
        .spawn((
            Name::new("Launch arm"),
            Sprite::from_color(ARM_COLOR, ARM_SIZE),
            Transform::from_translation(ARM_POSITION.extend(0.6)),
            RigidBody::Dynamic,
            Collider::cuboid(ARM_SIZE.x / 2.0, ARM_SIZE.y / 2.0),
            ColliderMassProperties::Mass(ARM_MASS),
            CollisionGroups::new(
                Group::from_bits_truncate(CATEGORY_LAUNCHER),
                Group::NONE,
            ),
            Ccd::enabled(),
            GravityScale(0.0),
            Velocity::zero(),
            LaunchArm,
            CleanupMarker,
        ))
        .id();

    let pin = RevoluteJointBuilder::new()
        .local_anchor1(ARM_PIVOT - CATAPULT_POSITION)
        .local_anchor2(ARM_PIVOT - ARM_POSITION);
    let spring = SpringJointBuilder::new(0.0, ARM_SPRING_STIFFNESS, ARM_SPRING_DAMPING)
        .local_anchor1(Vec2::ZERO)
        .local_anchor2(ARM_SPRING_ANCHOR);
    commands.entity(arm).with_children(|arm| {
        arm.spawn((Name::new("Arm pivot"), ImpulseJoint::new(catapult, pin)));
        arm.spawn((Name::new("Arm spring"), ImpulseJoint::new(cantilever, spring)));
    });

    let drag_handle = commands
        .spawn((
            Name::new("Drag handle"),
            Transform::from_translation(ARM_POSITION.extend(0.0)),
            RigidBody::KinematicPositionBased,
            DragHandle,
            CleanupMarker,
        ))
        .id();

    commands.insert_resource(SceneRig {
        catapult,
        arm,
        cantilever,
        drag_handle,
    });
    info!("catapult rig spawned");
}

/// Brings the arm back to rest after a launch.
pub fn reset_arm(transform: &mut Transform, velocity: &mut Velocity) {
    *velocity = Velocity::zero();
    transform.rotation = Quat::IDENTITY;
}

/// `point` in the arm's local frame, if it lands on the arm's oriented rectangle.
pub fn arm_local_point(point: Vec2, arm: &Transform) -> Option<Vec2> {
    let local = (arm.rotation.inverse() * (point.extend(0.0) - arm.translation)).truncate();
    let half = ARM_SIZE / 2.0;
    (local.x.abs() <= half.x && local.y.abs() <= half.y).then_some(local)
}

#[cfg(test)]
mod tests {
    use core::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn press_on_the_upright_arm_is_a_hit() {
        let arm = Transform::from_translation(ARM_POSITION.extend(0.0));

        let local = arm_local_point(ARM_POSITION + Vec2::new(5.0, 40.0), &arm);

        assert_eq!(local, Some(Vec2::new(5.0, 40.0)), "local offset from the centre");
        assert_eq!(arm_local_point(ARM_POSITION + Vec2::new(15.0, 0.0), &arm), None, "beside it");
    }

    #[test]
    fn hit_test_follows_the_arm_rotation() {
        let arm = Transform::from_translation(ARM_POSITION.extend(0.0))
            .with_rotation(Quat::from_rotation_z(FRAC_PI_2));

        assert!(
            arm_local_point(ARM_POSITION + Vec2::new(40.0, 0.0), &arm).is_some(),
            "lying arm reaches sideways"
        );
        assert!(
            arm_local_point(ARM_POSITION + Vec2::new(0.0, 40.0), &arm).is_none(),
            "and no longer upwards"
        );
    }

    #[test]
    fn reset_puts_the_arm_at_rest() {
        let mut transform = Transform::from_rotation(Quat::from_rotation_z(0.8));
        let mut velocity = Velocity::linear(Vec2::new(3.0, 4.0));

        reset_arm(&mut transform, &mut velocity);

        assert_eq!(transform.rotation, Quat::IDENTITY, "upright");
        assert_eq!(velocity, Velocity::zero(), "still");
    }

    #[test]
    fn rig_is_spawned_with_both_arm_joints() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, CatapultPlugin));

        app.update();

        let rig = *app.world().resource::<SceneRig>();
        let children = app.world().get::<Children>(rig.arm).expect("arm joints");
        let joints: Vec<Entity> = children
            .iter()
            .filter_map(|child| app.world().get::<ImpulseJoint>(*child).map(|joint| joint.parent))
            .collect();
        assert_eq!(joints, vec![rig.catapult, rig.cantilever], "pinned and sprung");
        assert!(app.world().get::<DragHandle>(rig.drag_handle).is_some(), "handle tagged");
    }
}
