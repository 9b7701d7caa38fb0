use bevy::prelude::*;

/// Any UI button that restarts the game when pressed.
#[derive(Component)]
pub struct RestartButton;

/// Entities rebuilt from scratch on restart.
#[derive(Component)]
pub struct CleanupMarker;

/// Sent once a [`Restartable`] resource has been reset, so scene rebuilding can follow.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restarted;

pub trait Restartable: Resource {
    fn reset(&mut self);
}

pub fn handle_restart<T: Restartable>(
    mut restartable: ResMut<T>,
    interaction_query: Query<
        (&Interaction, &InheritedVisibility),
        (Changed<Interaction>, With<RestartButton>),
    >,
    mut restarted: EventWriter<Restarted>,
) {
    for (interaction, visibility) in &interaction_query {
        // Hidden buttons stay in the tree, so presses on them are dropped here.
        if *interaction == Interaction::Pressed && visibility.get() {
            restartable.reset();
            restarted.send(Restarted);
        }
    }
}

pub fn cleanup_marked_entities(mut commands: Commands, query: Query<Entity, With<CleanupMarker>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Counter {
        resets: u32,
    }

    impl Restartable for Counter {
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<Restarted>()
            .init_resource::<Counter>()
            .add_systems(Update, handle_restart::<Counter>);
        app
    }

    #[test]
    fn pressing_a_visible_restart_button_resets_and_notifies() {
        let mut app = app();
        app.world_mut().spawn((
            RestartButton,
            Interaction::Pressed,
            InheritedVisibility::VISIBLE,
        ));

        app.update();

        assert_eq!(app.world().resource::<Counter>().resets, 1, "one reset");
        let events = app.world().resource::<Events<Restarted>>();
        assert_eq!(events.len(), 1, "one restart event");
    }

    #[test]
    fn hidden_restart_buttons_are_ignored() {
        let mut app = app();
        app.world_mut().spawn((
            RestartButton,
            Interaction::Pressed,
            InheritedVisibility::HIDDEN,
        ));

        app.update();

        assert_eq!(app.world().resource::<Counter>().resets, 0, "no reset");
    }

    #[test]
    fn cleanup_despawns_marked_entities_only() {
        let mut app = App::new();
        app.add_systems(Update, cleanup_marked_entities);
        let marked = app.world_mut().spawn(CleanupMarker).id();
        let kept = app.world_mut().spawn_empty().id();

        app.update();

        assert!(!app.world().entities().contains(marked), "marked entity removed");
        assert!(app.world().entities().contains(kept), "unmarked entity kept");
    }
}
