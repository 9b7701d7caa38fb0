use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::*;

use crate::scoring::TargetDestroyed;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
enum AssetState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

#[derive(AssetCollection, Resource)]
struct AudioAssets {
    #[asset(path = "audio/sfx_seal.wav")]
    seal: Handle<bevy_kira_audio::prelude::AudioSource>,
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .init_state::<AssetState>()
            .add_loading_state(
                LoadingState::new(AssetState::Loading)
                    .continue_to_state(AssetState::Loaded)
                    .on_failure_continue_to_state(AssetState::Failed)
                    .load_collection::<AudioAssets>(),
            )
            .add_systems(OnEnter(AssetState::Failed), report_missing_audio)
            .add_systems(Update, seal_audio.run_if(in_state(AssetState::Loaded)));
    }
}

fn seal_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut destroyed: EventReader<TargetDestroyed>,
) {
    for _ in destroyed.read() {
        audio.play(audio_assets.seal.clone_weak());
    }
}

fn report_missing_audio() {
    warn!("sound effects failed to load, playing without audio");
}
