use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy_rapier2d::prelude::*;
use game_helpers::high_score::HighScore;
use game_helpers::log_error;
use game_helpers::tween::{MoveTween, TweenHandle, start_tween};

use crate::catapult::{LaunchArm, RigError, SceneRig, reset_arm};
use crate::config::{
    CAMERA_HOME_X, CAMERA_RETURN_DELAY, CAMERA_RETURN_DURATION, CAMERA_Y, KILL_Y, SCENE_HEIGHT,
};
use crate::input::{CameraTarget, Penguin, Released};
use crate::level::RoundStarted;
use crate::round::{GameOverSummary, Round, RoundState, Settlement, camera_follow_x};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraReturn>()
            .add_event::<GameOverSummary>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (tick_flights, follow_target, settle_projectile.pipe(log_error))
                    .chain()
                    .run_if(in_state(RoundState::Playing)),
            )
            .add_systems(Update, recenter_camera.run_if(on_event::<RoundStarted>));
    }
}

#[derive(Component)]
pub struct MainCamera;

/// The pending "back to the catapult" move, if any.
#[derive(Resource, Debug, Default)]
pub struct CameraReturn(Option<TweenHandle>);

impl CameraReturn {
    pub fn start(&mut self, commands: &mut Commands, camera: Entity) {
        let tween = MoveTween::to_x(CAMERA_HOME_X, CAMERA_RETURN_DELAY, CAMERA_RETURN_DURATION);
        self.0 = Some(start_tween(commands, camera, tween));
    }

    pub fn cancel(&mut self, commands: &mut Commands) {
        if let Some(handle) = self.0.take() {
            handle.cancel(commands);
        }
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: SCENE_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(CAMERA_HOME_X, CAMERA_Y, 0.0),
        MainCamera,
    ));
}

fn tick_flights(time: Res<Time>, mut released: Query<&mut Released>) {
    for mut released in &mut released {
        released.tick(time.delta());
    }
}

fn follow_target(
    target: Res<CameraTarget>,
    projectiles: Query<&Transform, (With<Penguin>, Without<MainCamera>)>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(projectile) = target.get().and_then(|entity| projectiles.get(entity).ok()) else {
        return;
    };
    let Ok(mut camera) = cameras.get_single_mut() else {
        return;
    };

    camera.translation.x = camera_follow_x(projectile.translation.x);
}

fn settle_projectile(
    mut commands: Commands,
    mut round: ResMut<Round>,
    mut high_score: ResMut<HighScore>,
    mut target: ResMut<CameraTarget>,
    mut camera_return: ResMut<CameraReturn>,
    mut next_state: ResMut<NextState<RoundState>>,
    mut game_over: EventWriter<GameOverSummary>,
    rig: Option<Res<SceneRig>>,
    projectiles: Query<(&Transform, &Velocity, Option<&Released>, Option<&Children>), With<Penguin>>,
    joints: Query<(), With<ImpulseJoint>>,
    mut arms: Query<(&mut Transform, &mut Velocity), (With<LaunchArm>, Without<Penguin>)>,
    cameras: Query<Entity, With<MainCamera>>,
) -> Result<(), RigError> {
    let Some(entity) = target.get() else {
        return Ok(());
    };
    let Ok((transform, velocity, released, children)) = projectiles.get(entity) else {
        target.clear();
        return Ok(());
    };

    let fell_out = transform.translation.y < KILL_Y;
    let joint_count = children.map_or(0, |children| {
        children.iter().filter(|child| joints.contains(**child)).count()
    });
    let at_rest = released.is_some_and(Released::finished)
        && round.is_settled(joint_count, velocity.linvel.length());
    if !fell_out && !at_rest {
        return Ok(());
    }

    commands.entity(entity).despawn_recursive();
    target.clear();

    if let Ok(camera) = cameras.get_single() {
        camera_return.start(&mut commands, camera);
    }

    match round.settle(&mut high_score) {
        Settlement::GameOver(summary) => {
            next_state.set(RoundState::GameOver);
            game_over.send(summary);
        }
        Settlement::NextLaunch { lives } => info!("penguin settled, {lives} left"),
        Settlement::Ignored => {}
    }

    // Already settled, so a missing rig only leaves the arm unreset.
    let rig = rig.ok_or(RigError::MissingElement("scene rig"))?;
    let (mut arm_transform, mut arm_velocity) = arms
        .get_mut(rig.arm)
        .ok()
        .ok_or(RigError::MissingElement("launch arm"))?;
    reset_arm(&mut arm_transform, &mut arm_velocity);
    Ok(())
}

fn recenter_camera(
    mut commands: Commands,
    mut camera_return: ResMut<CameraReturn>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    camera_return.cancel(&mut commands);
    for mut camera in &mut cameras {
        camera.translation.x = CAMERA_HOME_X;
    }
}
