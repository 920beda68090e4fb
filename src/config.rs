/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The file is only ever read; nothing about a session is written back.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::rules::{DEFAULT_LIT_COUNT, LIT_COUNT_MAX, LIT_COUNT_MIN};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub game: GameSettings,
    pub gamepad: GamepadConfig,
}

/// Every delay of the round state machine, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub countdown_step_ms: u64,
    pub reveal_ms: u64,
    pub reveal_large_ms: u64,  // grids of 6 and up
    pub accept_delay_ms: u64,  // pattern hidden → input open
    pub feedback_ms: u64,
    pub level_up_ms: u64,
    pub shield_feedback_ms: u64,
    pub grid_pulse_ms: u64,
    pub timer_unit_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub starting_lit_count: u8,
    pub initial_diamonds: u32,
    pub game_url: String,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub press: Vec<String>,
    pub pause: Vec<String>,
    pub back: Vec<String>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let t = TomlTiming::default();
        TimingConfig {
            frame_ms: t.frame_ms,
            countdown_step_ms: t.countdown_step_ms,
            reveal_ms: t.reveal_ms,
            reveal_large_ms: t.reveal_large_ms,
            accept_delay_ms: t.accept_delay_ms,
            feedback_ms: t.feedback_ms,
            level_up_ms: t.level_up_ms,
            shield_feedback_ms: t.shield_feedback_ms,
            grid_pulse_ms: t.grid_pulse_ms,
            timer_unit_ms: t.timer_unit_ms,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            starting_lit_count: DEFAULT_LIT_COUNT,
            initial_diamonds: default_initial_diamonds(),
            game_url: default_game_url(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_countdown_step")]
    countdown_step_ms: u64,
    #[serde(default = "default_reveal")]
    reveal_ms: u64,
    #[serde(default = "default_reveal_large")]
    reveal_large_ms: u64,
    #[serde(default = "default_accept_delay")]
    accept_delay_ms: u64,
    #[serde(default = "default_feedback")]
    feedback_ms: u64,
    #[serde(default = "default_level_up")]
    level_up_ms: u64,
    #[serde(default = "default_shield_feedback")]
    shield_feedback_ms: u64,
    #[serde(default = "default_grid_pulse")]
    grid_pulse_ms: u64,
    #[serde(default = "default_timer_unit")]
    timer_unit_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_lit_count")]
    starting_lit_count: u8,
    #[serde(default = "default_initial_diamonds")]
    initial_diamonds: u32,
    #[serde(default = "default_game_url")]
    game_url: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_press")]
    press: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
    #[serde(default = "default_back")]
    back: Vec<String>,
}

// ── Defaults ──

fn default_frame() -> u64 { 33 }
fn default_countdown_step() -> u64 { 1000 }  // 3, 2, 1, START
fn default_reveal() -> u64 { 1000 }
fn default_reveal_large() -> u64 { 600 }
fn default_accept_delay() -> u64 { 400 }
fn default_feedback() -> u64 { 800 }
fn default_level_up() -> u64 { 1800 }
fn default_shield_feedback() -> u64 { 800 }
fn default_grid_pulse() -> u64 { 240 }
fn default_timer_unit() -> u64 { 1000 }

fn default_lit_count() -> u8 { DEFAULT_LIT_COUNT }
fn default_initial_diamonds() -> u32 { 2500 }
fn default_game_url() -> String { "https://farcmind.vercel.app".into() }

fn default_press() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }
fn default_back() -> Vec<String> { vec!["Select".into(), "B".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame(),
            countdown_step_ms: default_countdown_step(),
            reveal_ms: default_reveal(),
            reveal_large_ms: default_reveal_large(),
            accept_delay_ms: default_accept_delay(),
            feedback_ms: default_feedback(),
            level_up_ms: default_level_up(),
            shield_feedback_ms: default_shield_feedback(),
            grid_pulse_ms: default_grid_pulse(),
            timer_unit_ms: default_timer_unit(),
        }
    }
}

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            starting_lit_count: default_lit_count(),
            initial_diamonds: default_initial_diamonds(),
            game_url: default_game_url(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            press: default_press(),
            pause: default_pause(),
            back: default_back(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/farcmind`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        Self::from_toml(load_toml(&candidate_dirs()))
    }

    /// Parse a config document. A malformed document yields defaults.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => Self::from_toml(cfg),
            Err(e) => {
                log::warn!("config.toml parse error, using default settings: {e}");
                Self::from_toml(TomlConfig::default())
            }
        }
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let t = toml_cfg.timing;
        let g = toml_cfg.game;

        let lit = g.starting_lit_count.clamp(LIT_COUNT_MIN, LIT_COUNT_MAX);
        if lit != g.starting_lit_count {
            log::warn!(
                "starting_lit_count {} outside {}..={}, using {}",
                g.starting_lit_count, LIT_COUNT_MIN, LIT_COUNT_MAX, lit,
            );
        }

        GameConfig {
            timing: TimingConfig {
                frame_ms: t.frame_ms.max(1),
                countdown_step_ms: t.countdown_step_ms,
                reveal_ms: t.reveal_ms,
                reveal_large_ms: t.reveal_large_ms,
                accept_delay_ms: t.accept_delay_ms,
                feedback_ms: t.feedback_ms,
                level_up_ms: t.level_up_ms,
                shield_feedback_ms: t.shield_feedback_ms,
                grid_pulse_ms: t.grid_pulse_ms,
                // A zero unit would never advance the clock.
                timer_unit_ms: t.timer_unit_ms.max(1),
            },
            game: GameSettings {
                starting_lit_count: lit,
                initial_diamonds: g.initial_diamonds,
                game_url: g.game_url,
            },
            gamepad: GamepadConfig {
                press: toml_cfg.gamepad.press,
                pause: toml_cfg.gamepad.pause,
                back: toml_cfg.gamepad.back,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/farcmind");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("loaded {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("config.toml parse error, using default settings: {e}");
                    return TomlConfig::default();
                }
            },
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}
