use bevy::color::palettes::css::GOLD;
use bevy::prelude::*;
use game_helpers::log_error;
use game_helpers::restart::{RestartButton, Restarted, cleanup_marked_entities, handle_restart};
use strum::Display;

use crate::catapult::spawn_rig;
use crate::level::RoundStarted;
use crate::round::{GameOverSummary, Round, RoundError, RoundState};

const FONT_SIZE_SMALL: f32 = 24.0;
const FONT_SIZE_LARGE: f32 = 48.0;
const LIFE_COLOR: Color = Color::srgb(0.1, 0.1, 0.15);
const BUTTON_COLOR: Color = Color::srgb(0.15, 0.35, 0.6);

pub struct ScreenPlugin;

impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_hud, begin_first_round))
            .add_systems(OnEnter(RoundState::Playing), hide_game_over_ui)
            .add_systems(OnEnter(RoundState::GameOver), show_game_over_ui)
            .add_systems(
                Update,
                (
                    handle_restart::<Round>,
                    (cleanup_marked_entities, spawn_rig, begin_first_round)
                        .chain()
                        .run_if(on_event::<Restarted>),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    handle_next_level.pipe(log_error),
                    show_summary,
                    rebuild_lives.run_if(on_event::<RoundStarted>),
                    update_score_label.run_if(resource_changed::<Round>),
                    sync_button_visibility,
                ),
            );
    }
}

#[derive(Component)]
struct ScoreLabel;

#[derive(Component)]
struct LivesRow;

/// One life left to spend; slots count up from 1.
#[derive(Component, Debug)]
pub struct LifeIndicator(pub u32);

#[derive(Component)]
struct GameOverElement;

#[derive(Component)]
struct FinalScoreLabel;

#[derive(Component)]
struct HighScoreLabel;

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Restart,
    #[strum(to_string = "Play Again")]
    PlayAgain,
    #[strum(to_string = "Next Level")]
    NextLevel,
}

impl ButtonAction {
    /// State after the game-over panel is hidden or shown. `None` leaves the button alone.
    pub const fn state_when(self, game_over_hidden: bool) -> Option<ButtonState> {
        match (self, game_over_hidden) {
            (Self::Restart, true) | (Self::PlayAgain, false) => Some(ButtonState::Active),
            (Self::Restart, false) | (Self::PlayAgain | Self::NextLevel, true) => {
                Some(ButtonState::Hidden)
            }
            // Unlocked separately from the round summary.
            (Self::NextLevel, false) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Active,
    Hidden,
}

/// Hidden buttons are invisible and their presses are dropped.
#[derive(Component, Debug)]
pub struct UiButton {
    pub action: ButtonAction,
    pub state: ButtonState,
}

fn label(text: impl Into<String>, font_size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

fn button_node() -> Node {
    Node {
        width: Val::Px(160.0),
        height: Val::Px(48.0),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        margin: UiRect::all(Val::Px(8.0)),
        ..default()
    }
}

fn button(action: ButtonAction, state: ButtonState) -> impl Bundle {
    (
        Button,
        BackgroundColor(BUTTON_COLOR),
        UiButton { action, state },
    )
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            top: Val::Px(12.0),
            flex_direction: FlexDirection::Column,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((label("Score: 0", FONT_SIZE_SMALL, Color::WHITE), ScoreLabel));
            parent.spawn((
                Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(6.0),
                    margin: UiRect::top(Val::Px(6.0)),
                    ..default()
                },
                LivesRow,
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(16.0),
                top: Val::Px(12.0),
                ..button_node()
            },
            button(ButtonAction::Restart, ButtonState::Active),
            RestartButton,
        ))
        .with_children(|parent| {
            parent.spawn(label(
                ButtonAction::Restart.to_string(),
                FONT_SIZE_SMALL,
                Color::WHITE,
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
            BackgroundColor::from(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            Visibility::Hidden,
            GameOverElement,
        ))
        .with_children(|parent| {
            parent.spawn(label("Game Over", FONT_SIZE_LARGE, Color::WHITE));
            parent.spawn((label("Score: 0", FONT_SIZE_SMALL, Color::WHITE), FinalScoreLabel));
            parent.spawn((label("High Score: 0", FONT_SIZE_SMALL, GOLD.into()), HighScoreLabel));
            parent
                .spawn((
                    button_node(),
                    button(ButtonAction::PlayAgain, ButtonState::Hidden),
                    RestartButton,
                ))
                .with_children(|parent| {
                    parent.spawn(label(
                        ButtonAction::PlayAgain.to_string(),
                        FONT_SIZE_SMALL,
                        Color::WHITE,
                    ));
                });
            parent
                .spawn((button_node(), button(ButtonAction::NextLevel, ButtonState::Hidden)))
                .with_children(|parent| {
                    parent.spawn(label(
                        ButtonAction::NextLevel.to_string(),
                        FONT_SIZE_SMALL,
                        Color::WHITE,
                    ));
                });
        });
}

fn begin_first_round(
    mut started: EventWriter<RoundStarted>,
    mut next_state: ResMut<NextState<RoundState>>,
) {
    started.send(RoundStarted { level: 1 });
    next_state.set(RoundState::Playing);
}

fn toggle_game_over_ui(
    hidden: bool,
    buttons: &mut Query<&mut UiButton>,
    panels: &mut Query<&mut Visibility, (With<GameOverElement>, Without<ScoreLabel>)>,
    score_labels: &mut Query<&mut Visibility, (With<ScoreLabel>, Without<GameOverElement>)>,
) {
    let (panel, score_label) = if hidden {
        (Visibility::Hidden, Visibility::Inherited)
    } else {
        (Visibility::Inherited, Visibility::Hidden)
    };
    for mut visibility in panels.iter_mut() {
        *visibility = panel;
    }
    for mut visibility in score_labels.iter_mut() {
        *visibility = score_label;
    }
    for mut button in buttons.iter_mut() {
        if let Some(state) = button.action.state_when(hidden) {
            button.state = state;
        }
    }
}

fn hide_game_over_ui(
    mut buttons: Query<&mut UiButton>,
    mut panels: Query<&mut Visibility, (With<GameOverElement>, Without<ScoreLabel>)>,
    mut score_labels: Query<&mut Visibility, (With<ScoreLabel>, Without<GameOverElement>)>,
) {
    toggle_game_over_ui(true, &mut buttons, &mut panels, &mut score_labels);
}

fn show_game_over_ui(
    mut buttons: Query<&mut UiButton>,
    mut panels: Query<&mut Visibility, (With<GameOverElement>, Without<ScoreLabel>)>,
    mut score_labels: Query<&mut Visibility, (With<ScoreLabel>, Without<GameOverElement>)>,
) {
    toggle_game_over_ui(false, &mut buttons, &mut panels, &mut score_labels);
}

fn show_summary(
    mut summaries: EventReader<GameOverSummary>,
    mut final_scores: Query<&mut Text, (With<FinalScoreLabel>, Without<HighScoreLabel>)>,
    mut high_scores: Query<&mut Text, (With<HighScoreLabel>, Without<FinalScoreLabel>)>,
    mut buttons: Query<&mut UiButton>,
) {
    let Some(summary) = summaries.read().last() else {
        return;
    };

    for mut text in &mut final_scores {
        text.0 = format!("Score: {}", summary.score);
    }
    for mut text in &mut high_scores {
        text.0 = format!("High Score: {}", summary.high_score);
    }
    for mut button in &mut buttons {
        if button.action == ButtonAction::NextLevel {
            button.state = if summary.next_level_unlocked {
                ButtonState::Active
            } else {
                ButtonState::Hidden
            };
        }
    }
}

fn handle_next_level(
    interactions: Query<(&Interaction, &UiButton, &InheritedVisibility), Changed<Interaction>>,
    mut round: ResMut<Round>,
    mut started: EventWriter<RoundStarted>,
    mut next_state: ResMut<NextState<RoundState>>,
) -> Result<(), RoundError> {
    for (interaction, button, visibility) in &interactions {
        if *interaction != Interaction::Pressed
            || button.action != ButtonAction::NextLevel
            || button.state != ButtonState::Active
            || !visibility.get()
        {
            continue;
        }

        let level = round.load_next_level()?;
        started.send(RoundStarted { level });
        next_state.set(RoundState::Playing);
    }
    Ok(())
}

fn rebuild_lives(
    mut commands: Commands,
    round: Res<Round>,
    rows: Query<Entity, With<LivesRow>>,
    indicators: Query<Entity, With<LifeIndicator>>,
) {
    for entity in &indicators {
        commands.entity(entity).despawn_recursive();
    }
    for row in &rows {
        commands.entity(row).with_children(|parent| {
            for slot in 1..=round.lives() {
                parent.spawn((
                    Node {
                        width: Val::Px(16.0),
                        height: Val::Px(16.0),
                        ..default()
                    },
                    BackgroundColor(LIFE_COLOR),
                    LifeIndicator(slot),
                ));
            }
        });
    }
}

fn update_score_label(round: Res<Round>, mut labels: Query<&mut Text, With<ScoreLabel>>) {
    for mut text in &mut labels {
        text.0 = format!("Score: {}", round.score());
    }
}

fn sync_button_visibility(mut buttons: Query<(&UiButton, &mut Visibility), Changed<UiButton>>) {
    for (button, mut visibility) in &mut buttons {
        *visibility = match button.state {
            ButtonState::Active => Visibility::Inherited,
            ButtonState::Hidden => Visibility::Hidden,
        };
    }
}
