/// Session: the single owned aggregate for one page-lifetime of play.
///
/// ## Layout
///
///   - identity     - `player_name`, set once on the entry screen
///   - economy      - diamonds, owned themes, armed buffs, theme selection
///   - game         - `phase`, `grid`, `score`, the current `Round`
///   - time         - `timer` (elapsed seconds) and `scheduler` (delayed
///                    transitions on a virtual clock)
///
/// All mutation goes through `step::apply` / `step::advance`. Nothing here
/// is written to disk; dropping the `Session` is the only reset.
///
/// ## Epochs
///
/// `epoch` increases on every new round, restart and exit to menu. Delayed
/// transitions are scheduled with the epoch current at the time, and a
/// transition that fires under a different epoch is ignored.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, TimingConfig};
use crate::domain::economy::Economy;
use crate::domain::rules::GRID_MIN;
use crate::domain::theme::{self, Theme};
use super::clock::SessionTimer;
use super::schedule::Scheduler;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    EnterName,
    Main,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Countdown,
    Revealing,
    Accepting,
    Feedback,
    LevelUp,
    GameOver,
    Paused,
}

impl Phase {
    /// Is a game on screen (anything but the menu)?
    pub fn in_game(self) -> bool {
        self != Phase::Idle
    }

    /// Does the session clock run in this phase?
    pub fn clock_runs(self) -> bool {
        matches!(self, Phase::Revealing | Phase::Accepting | Phase::Feedback | Phase::LevelUp)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CountdownCue {
    Three,
    Two,
    One,
    Start,
}

impl CountdownCue {
    pub const SEQUENCE: [CountdownCue; 4] =
        [CountdownCue::Three, CountdownCue::Two, CountdownCue::One, CountdownCue::Start];

    pub fn label(self) -> &'static str {
        match self {
            CountdownCue::Three => "3",
            CountdownCue::Two => "2",
            CountdownCue::One => "1",
            CountdownCue::Start => "START!",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FeedbackKind {
    Great,
    DoublePoints,
    Shielded,
}

impl FeedbackKind {
    pub fn message(self) -> &'static str {
        match self {
            FeedbackKind::Great => "GREAT!",
            FeedbackKind::DoublePoints => "2X POINTS!",
            FeedbackKind::Shielded => "SHIELDED!",
        }
    }
}

/// Transient marker drawn on one tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileFeedback {
    pub index: usize,
    pub kind: FeedbackKind,
}

/// One reveal-then-reproduce cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub grid: usize,
    /// Tiles lit this round. Always `lit_count(grid)` distinct indices < grid².
    pub sequence: BTreeSet<usize>,
    /// Correct taps in the order they happened. No repeats.
    pub user_clicks: Vec<usize>,
    /// Pattern currently displayed.
    pub lit: bool,
    /// The off-pattern tap that ended the game.
    pub miss: Option<usize>,
}

impl Round {
    pub fn empty(grid: usize) -> Self {
        Round { grid, sequence: BTreeSet::new(), user_clicks: Vec::new(), lit: false, miss: None }
    }

    pub fn tile_count(&self) -> usize {
        self.grid * self.grid
    }

    pub fn remaining(&self) -> usize {
        self.sequence.iter().filter(|i| !self.user_clicks.contains(i)).count()
    }

    pub fn is_complete(&self) -> bool {
        !self.sequence.is_empty() && self.remaining() == 0
    }
}

pub struct Session {
    // ── Identity ──
    pub screen: Screen,
    pub player_name: String,

    // ── Economy ──
    pub economy: Economy,
    pub starting_lit_count: u8,

    // ── Game ──
    pub phase: Phase,
    /// Grid for the current game. Runs one step ahead of `round.grid`
    /// during the level-up transient.
    pub grid: usize,
    pub score: u32,
    pub round: Round,
    pub countdown: Option<CountdownCue>,
    pub feedback: Option<TileFeedback>,
    /// Cosmetic emphasis raised on every reveal.
    pub pulse: bool,

    // ── Time ──
    pub timer: SessionTimer,
    pub scheduler: Scheduler,
    pub timing: TimingConfig,
    pub(crate) epoch: u64,

    pub(crate) rng: StdRng,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: &GameConfig, rng: StdRng) -> Self {
        Session {
            screen: Screen::EnterName,
            player_name: String::new(),
            economy: Economy::new(config.game.initial_diamonds),
            starting_lit_count: config.game.starting_lit_count,
            phase: Phase::Idle,
            grid: GRID_MIN,
            score: 0,
            round: Round::empty(GRID_MIN),
            countdown: None,
            feedback: None,
            pulse: false,
            timer: SessionTimer::new(config.timing.timer_unit_ms),
            scheduler: Scheduler::new(),
            timing: config.timing.clone(),
            epoch: 0,
            rng,
        }
    }

    pub fn elapsed(&self) -> u64 {
        self.timer.elapsed()
    }

    pub fn theme(&self) -> &'static Theme {
        theme::resolve(self.economy.current_theme())
    }

    /// Tile presses are accepted right now.
    pub fn accepting(&self) -> bool {
        self.phase == Phase::Accepting
    }

    pub(crate) fn clock_should_run(&self) -> bool {
        self.screen == Screen::Main && self.phase.clock_runs()
    }

    pub(crate) fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
