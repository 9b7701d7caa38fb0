use core::time::Duration;

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use game_helpers::input::{PointerEvent, pointer_events};
use game_helpers::log_error;
use game_helpers::restart::{CleanupMarker, Restarted};

use crate::camera::CameraReturn;
use crate::catapult::{DragHandle, LaunchArm, RigError, SceneRig, arm_local_point};
use crate::config::{
    BUCKET_OFFSET, CATEGORY_PROJECTILE, CONTACT_FORCE_THRESHOLD, DRAG_SPRING_DAMPING,
    DRAG_SPRING_STIFFNESS, PENGUIN_DENSITY, PENGUIN_RADIUS, SETTLE_GRACE,
};
use crate::level::PhysicsCategory;
use crate::round::{Round, RoundState};
use crate::screen::LifeIndicator;

const PENGUIN_COLOR: Color = Color::srgb(0.1, 0.1, 0.15);

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PointerEvent>()
            .init_resource::<LaunchJoints>()
            .init_resource::<CameraTarget>()
            .add_systems(
                Update,
                (read_pointer, handle_pointer.pipe(log_error))
                    .chain()
                    .run_if(in_state(RoundState::Playing)),
            )
            .add_systems(Update, forget_launch.run_if(on_event::<Restarted>));
    }
}

#[derive(Component)]
pub struct Penguin;

/// Counts down from the moment a penguin leaves the bucket.
#[derive(Component, Debug)]
pub struct Released(Timer);

impl Released {
    pub fn after(seconds: f32) -> Self {
        Self(Timer::from_seconds(seconds, TimerMode::Once))
    }

    pub fn tick(&mut self, delta: Duration) {
        self.0.tick(delta);
    }

    pub fn finished(&self) -> bool {
        self.0.finished()
    }
}

/// The two joints of a loaded penguin: the pointer spring on the arm and the bucket pin.
#[derive(Resource, Debug, Default)]
pub struct LaunchJoints {
    drag: Option<Entity>,
    pin: Option<Entity>,
}

/// The projectile the camera follows.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct CameraTarget(Option<Entity>);

impl CameraTarget {
    pub const fn get(self) -> Option<Entity> {
        self.0
    }

    pub fn set(&mut self, entity: Entity) {
        self.0 = Some(entity);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

fn read_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut pointer: EventWriter<PointerEvent>,
) {
    for event in pointer_events(&buttons, &touches, &windows, &cameras) {
        pointer.send(event);
    }
}

fn handle_pointer(
    mut commands: Commands,
    mut pointer: EventReader<PointerEvent>,
    rig: Option<Res<SceneRig>>,
    mut round: ResMut<Round>,
    mut joints: ResMut<LaunchJoints>,
    mut target: ResMut<CameraTarget>,
    mut camera_return: ResMut<CameraReturn>,
    arms: Query<&Transform, (With<LaunchArm>, Without<DragHandle>)>,
    mut handles: Query<&mut Transform, With<DragHandle>>,
    lives: Query<(Entity, &LifeIndicator)>,
) -> Result<(), RigError> {
    for event in pointer.read() {
        match *event {
            PointerEvent::Pressed(point) => {
                let rig = rig.as_deref().ok_or(RigError::MissingElement("scene rig"))?;
                let arm = arms
                    .get(rig.arm)
                    .ok()
                    .ok_or(RigError::MissingElement("launch arm"))?;
                let Some(grab) = arm_local_point(point, arm) else {
                    continue;
                };
                if !round.begin_launch() {
                    continue;
                }

                let mut handle = handles
                    .get_mut(rig.drag_handle)
                    .ok()
                    .ok_or(RigError::MissingElement("drag handle"))?;
                handle.translation = point.extend(handle.translation.z);

                let drag = SpringJointBuilder::new(0.0, DRAG_SPRING_STIFFNESS, DRAG_SPRING_DAMPING)
                    .local_anchor1(Vec2::ZERO)
                    .local_anchor2(grab);
                joints.drag = Some(
                    commands
                        .spawn((Name::new("Drag spring"), ImpulseJoint::new(rig.drag_handle, drag)))
                        .set_parent(rig.arm)
                        .id(),
                );

                let bucket = arm.transform_point(BUCKET_OFFSET.extend(0.0)).truncate();
                let penguin = spawn_penguin(&mut commands, bucket);
                let pin = RevoluteJointBuilder::new()
                    .local_anchor1(BUCKET_OFFSET)
                    .local_anchor2(Vec2::ZERO);
                joints.pin = Some(
                    commands
                        .spawn((Name::new("Bucket pin"), ImpulseJoint::new(rig.arm, pin)))
                        .set_parent(penguin)
                        .id(),
                );

                camera_return.cancel(&mut commands);
                target.set(penguin);
                info!("penguin loaded");
            }
            PointerEvent::Dragged(point) => {
                if joints.drag.is_none() {
                    continue;
                }
                let Some(rig) = rig.as_deref() else {
                    continue;
                };
                if let Ok(mut handle) = handles.get_mut(rig.drag_handle) {
                    handle.translation = point.extend(handle.translation.z);
                }
            }
            PointerEvent::Released => {
                if let Some(drag) = joints.drag.take() {
                    commands.entity(drag).despawn_recursive();
                }
                if let Some(pin) = joints.pin.take() {
                    commands.entity(pin).despawn_recursive();
                }
                let Some(slot) = round.release() else {
                    continue;
                };

                if let Some(penguin) = target.get() {
                    commands.entity(penguin).insert(Released::after(SETTLE_GRACE));
                }
                for (entity, indicator) in &lives {
                    if indicator.0 == slot {
                        commands.entity(entity).despawn_recursive();
                    }
                }
            }
        }
    }
    Ok(())
}

fn spawn_penguin(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("Penguin"),
            Sprite::from_color(PENGUIN_COLOR, Vec2::splat(PENGUIN_RADIUS * 2.0)),
            Transform::from_translation(position.extend(2.0)),
            RigidBody::Dynamic,
            Collider::ball(PENGUIN_RADIUS),
            ColliderMassProperties::Density(PENGUIN_DENSITY),
            Ccd::enabled(),
            Velocity::zero(),
            PhysicsCategory(CATEGORY_PROJECTILE),
            PhysicsCategory(CATEGORY_PROJECTILE).collision_groups(),
            ActiveEvents::CONTACT_FORCE_EVENTS,
            ContactForceEventThreshold(CONTACT_FORCE_THRESHOLD),
            Penguin,
            CleanupMarker,
        ))
        .id()
}

/// The joints and projectile went away with the old scene.
fn forget_launch(mut joints: ResMut<LaunchJoints>, mut target: ResMut<CameraTarget>) {
    *joints = LaunchJoints::default();
    target.clear();
}
