/// Inputs and outputs of the state machine.
///
/// The presentation layer turns key presses into `Intent`s and feeds them
/// to `step::apply`; every call returns the `GameEvent`s it produced, which
/// the presentation layer consumes for sound and status messages.

use crate::domain::rejection::Rejection;
use crate::domain::rules::Reward;
use super::session::CountdownCue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    SubmitName(String),
    StartGame,
    Restart,
    ExitToMenu,
    TogglePause,
    PressTile(usize),
    Purchase(String),
    SetTheme(String),
    SetStartingLitCount(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    NameSet(String),
    GameStarted,
    Countdown(CountdownCue),
    PatternShown { grid: usize, tiles: usize },
    PatternHidden,
    InputOpen,
    TileHit { index: usize },
    Shielded { index: usize },
    RoundCleared { reward: Reward, score: u32 },
    LevelUp { grid: usize },
    GameOver { score: u32, elapsed: u64 },
    Paused,
    Resumed,
    ExitedToMenu,
    Purchased { item: &'static str },
    ThemeChanged { theme: &'static str },
    LitCountChanged(u8),
    TimerTick { elapsed: u64 },
    Rejected(Rejection),
}
