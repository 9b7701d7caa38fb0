use bevy::prelude::*;

/// Fire-and-forget removal: the entity (and its children) is despawned once the timer runs out.
#[derive(Component, Debug)]
pub struct DespawnAfter(Timer);

impl DespawnAfter {
    pub fn from_seconds(seconds: f32) -> Self {
        Self(Timer::from_seconds(seconds, TimerMode::Once))
    }
}

pub fn despawn_expired(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    for (entity, mut lifetime) in &mut query {
        if lifetime.0.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}
