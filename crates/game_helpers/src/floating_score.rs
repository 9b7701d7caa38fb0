use core::time::Duration;

use bevy::prelude::*;

const RISE: f32 = 40.0;
const FONT_SIZE: f32 = 18.0;

/// World-space label that drifts upward and shrinks away over one second.
#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    initial_position: Vec2,
}

pub fn spawn_floating_score(commands: &mut Commands, position: Vec2, text: &str, color: Srgba) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font_size: FONT_SIZE,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Transform::from_translation(position.extend(10.0)),
        FloatingScore {
            timer: Timer::new(Duration::from_secs(1), TimerMode::Once),
            initial_position: position,
        },
    ));
}

pub fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut FloatingScore)>,
) {
    for (entity, mut transform, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        transform.translation.y = RISE.mul_add(progress, floating_score.initial_position.y);
        transform.scale = Vec3::splat(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
