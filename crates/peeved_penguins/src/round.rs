use bevy::prelude::*;
use game_helpers::high_score::HighScore;
use game_helpers::restart::Restartable;
use thiserror::Error;

use crate::config::{CAMERA_MAX_X, CAMERA_MIN_X, CATEGORY_TARGET};

#[derive(States, Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum RoundState {
    #[default]
    Playing,
    GameOver,
}

/// Where the current penguin is in its launch cycle.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum LaunchPhase {
    #[default]
    Idle,
    /// Pinned in the bucket while the arm is being dragged.
    Loaded,
    /// Released and not yet at rest.
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundRules {
    pub starting_lives: u32,
    pub target_reward: u32,
    /// Contacts must exceed this impulse to kill a target.
    pub kill_impulse: f32,
    /// Final scores above this unlock the next level.
    pub unlock_score: u32,
    pub level_count: u32,
    /// Projectiles slower than this (and free of joints) are at rest.
    pub settle_speed: f32,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            target_reward: 100,
            kill_impulse: 2.0,
            unlock_score: 350,
            level_count: 2,
            settle_speed: 0.18,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    #[error("level {requested} does not exist, the last level is {level_count}")]
    NoMoreLevels { requested: u32, level_count: u32 },
}

/// Sent when a round ends, for the game-over panel.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverSummary {
    pub level: u32,
    pub score: u32,
    pub high_score: u32,
    pub next_level_unlocked: bool,
}

/// What a projectile coming to rest means for the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Nothing was in flight.
    Ignored,
    NextLaunch { lives: u32 },
    GameOver(GameOverSummary),
}

/// Lives, score and level of the current round. Systems ask it what a press, a settle or a
/// contact means and perform the engine side effects themselves.
#[derive(Resource, Debug, Clone)]
pub struct Round {
    rules: RoundRules,
    state: RoundState,
    lives: u32,
    score: u32,
    level: u32,
    launch: LaunchPhase,
    next_level_unlocked: bool,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(RoundRules::default())
    }
}

impl Round {
    pub fn new(rules: RoundRules) -> Self {
        Self::at_level(rules, 1)
    }

    fn at_level(rules: RoundRules, level: u32) -> Self {
        Self {
            lives: rules.starting_lives,
            rules,
            state: RoundState::Playing,
            score: 0,
            level,
            launch: LaunchPhase::Idle,
            next_level_unlocked: false,
        }
    }

    pub const fn rules(&self) -> &RoundRules {
        &self.rules
    }

    pub const fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == RoundState::Playing
    }

    pub const fn lives(&self) -> u32 {
        self.lives
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub const fn launch(&self) -> LaunchPhase {
        self.launch
    }

    pub const fn next_level_unlocked(&self) -> bool {
        self.next_level_unlocked
    }

    /// A press landed on the arm. Returns whether a penguin should be loaded.
    ///
    /// Refused outside `Playing`, while another penguin is loaded or flying, and with no lives.
    pub fn begin_launch(&mut self) -> bool {
        if !self.is_playing() || self.launch != LaunchPhase::Idle || self.lives == 0 {
            return false;
        }

        self.launch = LaunchPhase::Loaded;
        true
    }

    /// The press ended. Returns the life slot to remove when a loaded penguin was let go.
    ///
    /// Lives never go below zero; an extra release is a no-op.
    pub fn release(&mut self) -> Option<u32> {
        if self.launch != LaunchPhase::Loaded {
            return None;
        }
        self.launch = LaunchPhase::InFlight;

        if !self.is_playing() || self.lives == 0 {
            return None;
        }

        let slot = self.lives;
        self.lives -= 1;
        tracing::info!(lives = self.lives, "penguin launched");
        Some(slot)
    }

    /// The projectile in flight came to rest.
    pub fn settle(&mut self, high_score: &mut HighScore) -> Settlement {
        if !self.is_playing() || self.launch != LaunchPhase::InFlight {
            return Settlement::Ignored;
        }
        self.launch = LaunchPhase::Idle;

        if self.lives > 0 {
            return Settlement::NextLaunch { lives: self.lives };
        }

        self.state = RoundState::GameOver;
        let high_score = high_score.submit(self.score);
        self.next_level_unlocked =
            self.score > self.rules.unlock_score && self.level < self.rules.level_count;

        let summary = GameOverSummary {
            level: self.level,
            score: self.score,
            high_score,
            next_level_unlocked: self.next_level_unlocked,
        };
        tracing::info!(?summary, "round over");
        Settlement::GameOver(summary)
    }

    pub fn is_settled(&self, joint_count: usize, speed: f32) -> bool {
        joint_count == 0 && speed < self.rules.settle_speed
    }

    /// Which side of a contact dies. Only targets die, only above the kill impulse, and only
    /// while `Playing`.
    pub fn contact_kills(&self, category_a: u32, category_b: u32, impulse: f32) -> [bool; 2] {
        if !self.is_playing() || impulse <= self.rules.kill_impulse {
            return [false, false];
        }

        [is_target(category_a), is_target(category_b)]
    }

    /// Awards a destroyed target and returns the new score.
    pub fn award_target(&mut self) -> Option<u32> {
        if !self.is_playing() {
            return None;
        }

        self.score += self.rules.target_reward;
        Some(self.score)
    }

    /// Moves on to the next level with fresh lives and score, whatever the current state.
    pub fn load_next_level(&mut self) -> Result<u32, RoundError> {
        let requested = self.level + 1;
        if requested > self.rules.level_count {
            return Err(RoundError::NoMoreLevels {
                requested,
                level_count: self.rules.level_count,
            });
        }

        *self = Self::at_level(self.rules.clone(), requested);
        tracing::info!(level = requested, "next level");
        Ok(requested)
    }
}

impl Restartable for Round {
    fn reset(&mut self) {
        *self = Self::new(self.rules.clone());
        tracing::info!("round restarted");
    }
}

pub const fn is_target(category: u32) -> bool {
    category & CATEGORY_TARGET != 0
}

/// Horizontal camera position while following a projectile at `target_x`.
pub fn camera_follow_x(target_x: f32) -> f32 {
    target_x.clamp(CAMERA_MIN_X, CAMERA_MAX_X)
}

#[cfg(test)]
mod tests {
    use game_helpers::high_score::{HIGH_SCORE_KEY, MemoryStore};
    use proptest::prelude::*;

    use super::*;
    use crate::config::CATEGORY_PROJECTILE;

    fn high_score(best: u32) -> HighScore {
        HighScore::load(MemoryStore::with_value(HIGH_SCORE_KEY, best))
    }

    fn launch(round: &mut Round, high_score: &mut HighScore) -> Settlement {
        assert!(round.begin_launch(), "launch accepted");
        round.release();
        round.settle(high_score)
    }

    #[test]
    fn three_launches_without_hits_end_the_round() {
        let mut round = Round::default();
        let mut best = high_score(0);

        assert_eq!(launch(&mut round, &mut best), Settlement::NextLaunch { lives: 2 }, "first");
        assert_eq!(launch(&mut round, &mut best), Settlement::NextLaunch { lives: 1 }, "second");
        let last = launch(&mut round, &mut best);

        assert_eq!(round.lives(), 0, "all lives used");
        assert_eq!(round.state(), RoundState::GameOver, "round over");
        assert!(matches!(last, Settlement::GameOver(_)), "got {last:?}");
    }

    #[test]
    fn game_over_waits_for_the_last_penguin_to_settle() {
        let mut round = Round::default();
        let mut best = high_score(0);
        launch(&mut round, &mut best);
        launch(&mut round, &mut best);

        assert!(round.begin_launch(), "third launch accepted");
        assert_eq!(round.release(), Some(1), "last life slot removed");

        assert_eq!(round.lives(), 0, "no lives left");
        assert_eq!(round.state(), RoundState::Playing, "still playing while in flight");
    }

    #[test]
    fn release_removes_the_highest_slot_first() {
        let mut round = Round::default();
        assert!(round.begin_launch(), "launch accepted");

        assert_eq!(round.release(), Some(3), "slot matching the lives count");
    }

    #[test]
    fn release_without_a_loaded_penguin_is_a_no_op() {
        let mut round = Round::default();

        assert_eq!(round.release(), None, "nothing loaded");
        assert_eq!(round.lives(), 3, "lives untouched");
    }

    #[test]
    fn second_press_while_in_flight_is_refused() {
        let mut round = Round::default();
        assert!(round.begin_launch(), "first launch accepted");
        round.release();

        assert!(!round.begin_launch(), "one projectile in flight at a time");
    }

    #[test]
    fn hard_hit_on_a_target_scores() {
        let mut round = Round::default();

        let kills = round.contact_kills(CATEGORY_TARGET, CATEGORY_PROJECTILE, 3.0);
        assert_eq!(kills, [true, false], "only the target dies");
        assert_eq!(round.award_target(), Some(100), "reward added");
    }

    #[test]
    fn soft_hit_does_nothing() {
        let round = Round::default();

        assert_eq!(
            round.contact_kills(CATEGORY_TARGET, CATEGORY_PROJECTILE, 1.0),
            [false, false],
            "below the kill impulse"
        );
    }

    #[test]
    fn two_targets_colliding_both_die() {
        let round = Round::default();

        assert_eq!(
            round.contact_kills(CATEGORY_TARGET, CATEGORY_TARGET, 2.5),
            [true, true],
            "both sides are targets"
        );
    }

    #[test]
    fn contacts_and_awards_are_ignored_after_game_over() {
        let mut round = Round::default();
        let mut best = high_score(0);
        for _ in 0..3 {
            launch(&mut round, &mut best);
        }

        assert_eq!(
            round.contact_kills(CATEGORY_TARGET, CATEGORY_PROJECTILE, 10.0),
            [false, false],
            "no kills after game over"
        );
        assert_eq!(round.award_target(), None, "no score after game over");
    }

    #[test]
    fn big_score_on_the_first_level_unlocks_the_next() {
        let mut round = Round::default();
        let mut best = high_score(100);
        for _ in 0..4 {
            round.award_target();
        }
        launch(&mut round, &mut best);
        launch(&mut round, &mut best);

        let summary = match launch(&mut round, &mut best) {
            Settlement::GameOver(summary) => summary,
            other => panic!("expected game over, got {other:?}"),
        };

        assert_eq!(summary.score, 400, "four targets");
        assert_eq!(summary.high_score, 400, "best updated");
        assert!(summary.next_level_unlocked, "next level available");
    }

    #[test]
    fn last_level_never_unlocks_another() {
        let mut round = Round::default();
        round.load_next_level().expect("level 2 exists");
        let mut best = high_score(0);
        for _ in 0..5 {
            round.award_target();
        }
        for _ in 0..3 {
            launch(&mut round, &mut best);
        }

        assert!(!round.next_level_unlocked(), "no level 3");
    }

    #[test]
    fn next_level_resets_lives_and_score() {
        let mut round = Round::default();
        let mut best = high_score(0);
        round.award_target();
        for _ in 0..3 {
            launch(&mut round, &mut best);
        }

        assert_eq!(round.load_next_level(), Ok(2), "advanced");
        assert_eq!(round.lives(), 3, "lives restored");
        assert_eq!(round.score(), 0, "score cleared");
        assert_eq!(round.state(), RoundState::Playing, "playing again");
    }

    #[test]
    fn next_level_past_the_last_is_an_error_and_changes_nothing() {
        let mut round = Round::default();
        round.load_next_level().expect("level 2 exists");
        round.award_target();

        let err = round.load_next_level();

        assert_eq!(
            err,
            Err(RoundError::NoMoreLevels {
                requested: 3,
                level_count: 2
            }),
            "no third level"
        );
        assert_eq!(round.score(), 100, "score kept");
        assert_eq!(round.level(), 2, "level kept");
    }

    #[test]
    fn restart_goes_back_to_level_one() {
        let mut round = Round::default();
        round.load_next_level().expect("level 2 exists");
        round.award_target();

        Restartable::reset(&mut round);

        assert_eq!(round.level(), 1, "first level");
        assert_eq!(round.score(), 0, "score cleared");
        assert_eq!(round.lives(), 3, "lives restored");
    }

    #[test]
    fn settle_needs_no_joints_and_low_speed() {
        let round = Round::default();

        assert!(round.is_settled(0, 0.1), "free and slow");
        assert!(!round.is_settled(1, 0.0), "still pinned");
        assert!(!round.is_settled(0, 0.18), "threshold is exclusive");
    }

    #[test]
    fn camera_follow_is_clamped() {
        assert!((camera_follow_x(100.0) - CAMERA_MIN_X).abs() < f32::EPSILON, "left edge");
        assert!((camera_follow_x(500.0) - 500.0).abs() < f32::EPSILON, "inside");
        assert!((camera_follow_x(900.0) - CAMERA_MAX_X).abs() < f32::EPSILON, "right edge");
    }

    #[derive(Debug, Clone, Copy)]
    enum Action {
        Press,
        Release,
        Settle,
        Hit(f32),
        NextLevel,
        Restart,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            3 => Just(Action::Press),
            3 => Just(Action::Release),
            3 => Just(Action::Settle),
            3 => (0.0f32..6.0).prop_map(Action::Hit),
            1 => Just(Action::NextLevel),
            1 => Just(Action::Restart),
        ]
    }

    proptest! {
        #[test]
        fn round_invariants_hold(actions in prop::collection::vec(action(), 0..64), best in 0u32..1000) {
            let mut round = Round::default();
            let mut high_score = high_score(best);

            for action in actions {
                let before = round.clone();
                let best_before = high_score.best();

                match action {
                    Action::Press => {
                        round.begin_launch();
                    }
                    Action::Release => {
                        let slot = round.release();
                        if slot.is_some() {
                            prop_assert!(before.is_playing(), "lives only change while playing");
                            prop_assert_eq!(round.lives() + 1, before.lives(), "one life per launch");
                        } else {
                            prop_assert_eq!(round.lives(), before.lives(), "no launch, no life lost");
                        }
                    }
                    Action::Settle => {
                        let settlement = round.settle(&mut high_score);
                        let game_over = matches!(settlement, Settlement::GameOver(_));
                        prop_assert_eq!(
                            game_over,
                            before.is_playing() && before.launch() == LaunchPhase::InFlight && round.lives() == 0,
                            "game over iff no lives are left at a settle"
                        );
                        if let Settlement::GameOver(summary) = settlement {
                            prop_assert_eq!(summary.high_score, best_before.max(round.score()), "best of old and new");
                        }
                    }
                    Action::Hit(impulse) => {
                        let kills = round.contact_kills(CATEGORY_TARGET, CATEGORY_PROJECTILE, impulse);
                        for killed in kills {
                            if killed {
                                round.award_target();
                            }
                        }
                        if round.score() != before.score() {
                            prop_assert!(before.is_playing(), "score only changes while playing");
                            prop_assert_eq!(round.score(), before.score() + 100, "exactly one reward");
                        }
                    }
                    Action::NextLevel => {
                        if round.load_next_level().is_ok() {
                            prop_assert_eq!(round.score(), 0, "score cleared");
                            prop_assert_eq!(round.lives(), 3, "lives restored");
                            prop_assert_eq!(round.state(), RoundState::Playing, "playing");
                        }
                    }
                    Action::Restart => Restartable::reset(&mut round),
                }

                prop_assert!(round.lives() <= 3, "lives within bounds");
                prop_assert_eq!(round.score() % 100, 0, "score moves in rewards");
                prop_assert!(high_score.best() >= best_before, "high score never drops");
                if before.state() == RoundState::GameOver
                    && !matches!(action, Action::NextLevel | Action::Restart)
                {
                    prop_assert_eq!(round.state(), RoundState::GameOver, "only restart or next level leave game over");
                }
                if before.state() == RoundState::Playing && round.state() == RoundState::GameOver {
                    prop_assert!(matches!(action, Action::Settle), "game over only happens at a settle");
                }
            }
        }
    }
}
