use core::time::Duration;

use bevy::prelude::*;

#[derive(Component, Debug, Clone)]
pub struct MoveTween {
    delay: Timer,
    travel: Timer,
    target_x: f32,
    start_x: Option<f32>,
}

impl MoveTween {
    pub fn to_x(target_x: f32, delay: Duration, duration: Duration) -> Self {
        Self {
            delay: Timer::new(delay, TimerMode::Once),
            travel: Timer::new(duration, TimerMode::Once),
            target_x,
            start_x: None,
        }
    }

    pub fn finished(&self) -> bool {
        self.delay.finished() && self.travel.finished()
    }

    /// Advances by `delta` and returns the x to apply, or `None` while still waiting.
    ///
    /// The start point is captured from `current_x` on the first frame after the delay.
    pub fn advance(&mut self, delta: Duration, current_x: f32) -> Option<f32> {
        if !self.delay.finished() {
            self.delay.tick(delta);
            if !self.delay.finished() {
                return None;
            }
        } else {
            self.travel.tick(delta);
        }

        let start_x = *self.start_x.get_or_insert(current_x);
        Some(start_x.lerp(self.target_x, self.travel.fraction()))
    }
}

/// Cancelling removes the tween before it touches the entity again. Cancelling a finished
/// tween is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweenHandle(Entity);

impl TweenHandle {
    pub fn cancel(self, commands: &mut Commands) {
        commands.entity(self.0).remove::<MoveTween>();
    }
}

/// Replaces any tween already running on `entity`.
pub fn start_tween(commands: &mut Commands, entity: Entity, tween: MoveTween) -> TweenHandle {
    commands.entity(entity).insert(tween);
    TweenHandle(entity)
}

pub fn advance_tweens(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut MoveTween)>,
) {
    for (entity, mut transform, mut tween) in &mut query {
        if let Some(x) = tween.advance(time.delta(), transform.translation.x) {
            transform.translation.x = x;
        }

        if tween.finished() {
            commands.entity(entity).remove::<MoveTween>();
        }
    }
}
