use core::f32::consts::TAU;

use bevy::color::palettes::css::GOLD;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use game_helpers::floating_score::spawn_floating_score;
use game_helpers::lifetime::DespawnAfter;

use crate::config::{
    PARTICLE_COUNT, PARTICLE_LIFETIME, PARTICLE_SPEED, PIXELS_PER_METER, SEAL_REMOVAL_DELAY,
};
use crate::level::PhysicsCategory;
use crate::round::{Round, RoundState};

const SPARK_COLOR: Color = Color::srgb(1.0, 0.95, 0.8);
const SPARK_SIZE: f32 = 3.0;

pub struct ScoringPlugin;

impl Plugin for ScoringPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TargetDestroyed>().add_systems(
            Update,
            (
                destroy_struck_targets.run_if(in_state(RoundState::Playing)),
                drift_particles,
            ),
        );
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TargetDestroyed {
    pub position: Vec2,
}

/// Already scored, waiting to be removed.
#[derive(Component)]
pub struct Dying;

/// Straight-line motion for burst particles.
#[derive(Component, Debug)]
pub struct Drift(Vec2);

/// Impulse transferred during one step by a contact pushing with `force_magnitude`.
///
/// Rapier masses are density times pixel area, so the reported force carries the length unit
/// squared on top of the usual kilograms times pixels per second squared.
pub fn contact_impulse(force_magnitude: f32, step_seconds: f32, pixels_per_meter: f32) -> f32 {
    force_magnitude * step_seconds / (pixels_per_meter * pixels_per_meter)
}

fn destroy_struck_targets(
    mut commands: Commands,
    time: Res<Time>,
    mut contacts: EventReader<ContactForceEvent>,
    mut round: ResMut<Round>,
    bodies: Query<(&PhysicsCategory, &Transform, Has<Dying>)>,
    mut destroyed: EventWriter<TargetDestroyed>,
) {
    let mut killed_this_frame: Vec<Entity> = Vec::new();

    for contact in contacts.read() {
        let impulse = contact_impulse(
            contact.total_force_magnitude,
            time.delta_secs(),
            PIXELS_PER_METER,
        );
        let pair = [contact.collider1, contact.collider2];
        let [category1, category2] =
            pair.map(|entity| bodies.get(entity).map_or(0, |(category, ..)| category.0));
        let kills = round.contact_kills(category1, category2, impulse);

        for (entity, killed) in pair.into_iter().zip(kills) {
            if !killed || killed_this_frame.contains(&entity) {
                continue;
            }
            let Ok((_, transform, dying)) = bodies.get(entity) else {
                continue;
            };
            if dying {
                continue;
            }
            killed_this_frame.push(entity);

            let position = transform.translation.truncate();
            commands
                .entity(entity)
                .insert((Dying, DespawnAfter::from_seconds(SEAL_REMOVAL_DELAY)))
                .remove::<ActiveEvents>();
            spawn_burst(&mut commands, position);

            if let Some(score) = round.award_target() {
                let reward = format!("+{}", round.rules().target_reward);
                spawn_floating_score(&mut commands, position, &reward, GOLD);
                info!("seal destroyed with impulse {impulse:.2}, score {score}");
            }
            destroyed.send(TargetDestroyed { position });
        }
    }
}

fn spawn_burst(commands: &mut Commands, position: Vec2) {
    for _ in 0..PARTICLE_COUNT {
        let direction = Vec2::from_angle(fastrand::f32() * TAU);
        let speed = PARTICLE_SPEED * fastrand::f32().mul_add(0.5, 0.5);
        commands.spawn((
            Sprite::from_color(SPARK_COLOR, Vec2::splat(SPARK_SIZE)),
            Transform::from_translation(position.extend(3.0)),
            Drift(direction * speed),
            DespawnAfter::from_seconds(PARTICLE_LIFETIME),
        ));
    }
}

fn drift_particles(time: Res<Time>, mut particles: Query<(&mut Transform, &Drift)>) {
    for (mut transform, drift) in &mut particles {
        transform.translation += (drift.0 * time.delta_secs()).extend(0.0);
    }
}
