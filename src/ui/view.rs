/// Presentation-only state: which tab is open, where the cursors are,
/// the name being typed and the status line. None of this affects the game
/// rules, so it lives outside `Session`.

use crate::domain::rules::{LIT_COUNT_MAX, LIT_COUNT_MIN};
use crate::domain::shop::SHOP_ITEMS;
use crate::sim::event::GameEvent;
use crate::sim::session::CountdownCue;
use super::input::Nav;

const NAME_MAX: usize = 24;
const MESSAGE_MS: u64 = 2500;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Play,
    Shop,
    Settings,
}

impl Tab {
    pub fn next(self) -> Tab {
        match self {
            Tab::Play => Tab::Shop,
            Tab::Shop => Tab::Settings,
            Tab::Settings => Tab::Play,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Play => "Play",
            Tab::Shop => "Shop",
            Tab::Settings => "Settings",
        }
    }
}

pub struct ViewState {
    pub tab: Tab,
    pub name_input: String,
    /// Tile under the cursor.
    pub cursor: usize,
    pub shop_cursor: usize,
    /// Highlighted starting pattern length on the settings tab.
    pub lit_choice: u8,
    pub message: String,
    message_ms: u64,
}

impl ViewState {
    pub fn new(lit_choice: u8) -> Self {
        ViewState {
            tab: Tab::Play,
            name_input: String::new(),
            cursor: 0,
            shop_cursor: 0,
            lit_choice,
            message: String::new(),
            message_ms: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
        self.message_ms = MESSAGE_MS;
    }

    pub fn tick(&mut self, dt_ms: u64) {
        if self.message_ms == 0 {
            return;
        }
        self.message_ms = self.message_ms.saturating_sub(dt_ms);
        if self.message_ms == 0 {
            self.message.clear();
        }
    }

    pub fn type_chars(&mut self, chars: &[char]) {
        for &c in chars {
            if !c.is_control() && self.name_input.chars().count() < NAME_MAX {
                self.name_input.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        self.name_input.pop();
    }

    /// Move the tile cursor on a `grid`×`grid` board, clamped at the edges.
    pub fn move_cursor(&mut self, nav: Nav, grid: usize) {
        let (mut x, mut y) = (self.cursor % grid, self.cursor / grid);
        match nav {
            Nav::Up => y = y.saturating_sub(1),
            Nav::Down => y = (y + 1).min(grid - 1),
            Nav::Left => x = x.saturating_sub(1),
            Nav::Right => x = (x + 1).min(grid - 1),
        }
        self.cursor = y * grid + x;
    }

    /// Keep the cursor on the board after the grid changes size.
    pub fn clamp_cursor(&mut self, grid: usize) {
        if self.cursor >= grid * grid {
            self.cursor = 0;
        }
    }

    pub fn move_shop_cursor(&mut self, nav: Nav) {
        let last = SHOP_ITEMS.len() - 1;
        match nav {
            Nav::Up | Nav::Left => self.shop_cursor = self.shop_cursor.saturating_sub(1),
            Nav::Down | Nav::Right => self.shop_cursor = (self.shop_cursor + 1).min(last),
        }
    }

    pub fn move_lit_choice(&mut self, nav: Nav) {
        match nav {
            Nav::Up | Nav::Left => self.lit_choice = self.lit_choice.saturating_sub(1).max(LIT_COUNT_MIN),
            Nav::Down | Nav::Right => self.lit_choice = (self.lit_choice + 1).min(LIT_COUNT_MAX),
        }
    }

    /// Turn state-machine events into status-line text.
    pub fn observe(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::Rejected(r) => self.set_message(&r.to_string()),
                GameEvent::Purchased { item } => self.set_message(&format!("Purchased {item}")),
                GameEvent::Shielded { .. } => self.set_message("SHIELDED!"),
                GameEvent::LitCountChanged(n) => {
                    self.lit_choice = *n;
                    self.set_message(&format!("Starting pattern length: {n}"));
                }
                GameEvent::Countdown(CountdownCue::Three) => self.cursor = 0,
                _ => {}
            }
        }
    }
}
