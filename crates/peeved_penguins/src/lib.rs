mod audio;
mod camera;
pub mod catapult;
pub mod config;
mod input;
pub mod level;
pub mod round;
pub mod scoring;
mod screen;

use std::path::PathBuf;

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use game_helpers::high_score::{HighScore, JsonFileStore, MemoryStore};

use crate::config::{DEFAULT_SAVE_FILE, PIXELS_PER_METER, SAVE_FILE_ENV};
use crate::round::{Round, RoundRules, RoundState};

pub fn run() {
    game_helpers::get_default_app("Peeved Penguins")
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(PIXELS_PER_METER))
        // .add_plugins(RapierDebugRenderPlugin::default()) // Activate when you need to debug physics
        .init_state::<RoundState>()
        .insert_resource(Round::new(RoundRules::default()))
        .insert_resource(load_high_score())
        .add_plugins(camera::CameraPlugin)
        .add_plugins(catapult::CatapultPlugin)
        .add_plugins(level::LevelPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(scoring::ScoringPlugin)
        .add_plugins(screen::ScreenPlugin)
        .add_plugins(audio::GameAudioPlugin)
        .run();
}

fn save_file() -> PathBuf {
    std::env::var_os(SAVE_FILE_ENV).map_or_else(|| PathBuf::from(DEFAULT_SAVE_FILE), PathBuf::from)
}

/// Falls back to a session-only store when the save file is unreadable.
fn load_high_score() -> HighScore {
    match JsonFileStore::open(save_file()) {
        Ok(store) => {
            info!("high score file: {}", store.path().display());
            HighScore::load(store)
        }
        Err(err) => {
            warn!("high score will not be saved: {err}");
            HighScore::load(MemoryStore::default())
        }
    }
}
