use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{WgpuSettings, WgpuSettingsPriority};
use bevy::window::{WindowMode, WindowResolution};

use crate::floating_score::animate_floating_scores;
use crate::lifetime::despawn_expired;
use crate::restart::Restarted;
use crate::tween::advance_tweens;

// Landscape phone ratio, twice the 568x320 logical scene.
pub const WINDOW_WIDTH: f32 = 1136.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Registers the timers shared by every game: floating labels, timed despawns and tweens.
pub struct GameHelpersPlugin;

impl Plugin for GameHelpersPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Restarted>().add_systems(
            Update,
            (animate_floating_scores, advance_tweens, despawn_expired),
        );
    }
}

/// Sink for fallible systems: `my_system.pipe(log_error)`. The failed operation is dropped.
pub fn log_error<E: core::fmt::Display>(In(result): In<Result<(), E>>) {
    if let Err(err) = result {
        error!("{err}");
    }
}

// Creates a Bevy app with the window, asset and render settings shared by our games.
pub fn get_default_app(title: &str) -> App {
    let mut app = App::new();

    let asset_plugin = bevy::asset::AssetPlugin {
        mode: bevy::asset::AssetMode::Unprocessed,
        file_path: "assets".to_string(),
        processed_file_path: "imported_assets/Default".to_string(),
        watch_for_changes_override: None,
        meta_check: AssetMetaCheck::Never,
    };

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: title.to_string(),
            present_mode: bevy::window::PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            mode: WindowMode::Windowed,
            ..default()
        }),
        ..default()
    };

    let render_plugin = RenderPlugin {
        render_creation: bevy::render::settings::RenderCreation::Automatic(WgpuSettings {
            power_preference: bevy::render::settings::PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..Default::default()
        }),
        ..Default::default()
    };

    app.add_plugins(
        DefaultPlugins
            .set(asset_plugin)
            .set(window_plugin)
            .set(render_plugin),
    );

    // This plugin is useful to preserve battery life on mobile.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);

    // Sky blue behind the level.
    app.insert_resource(ClearColor(Color::srgb(0.55, 0.8, 0.95)));

    app.add_plugins(GameHelpersPlugin);

    app
}
