/// Keyboard input: one batch of fresh key presses per frame.
///
/// Everything in this game is edge-triggered (a tap is a tap), so unlike a
/// held-key tracker we only keep what arrived since the last drain:
///   - `presses`  - key codes pressed or auto-repeated this frame
///   - `typed`    - printable characters, for the name entry field
///
/// Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Cursor movement shared by keyboard and gamepad.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Nav {
    Up,
    Down,
    Left,
    Right,
}

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const KEYS_SHARE: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
pub const KEYS_THEME: &[KeyCode] = &[KeyCode::Char('t'), KeyCode::Char('T')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
pub const KEYS_TAB: &[KeyCode] = &[KeyCode::Tab];
pub const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc];

pub struct InputState {
    presses: Vec<KeyCode>,
    typed: Vec<char>,
    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            typed: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.typed.clear();
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.push(key),
                _ => {}
            }
        }
    }

    fn push(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        self.raw_events.push(key);
        self.presses.push(key.code);
        if let KeyCode::Char(c) = key.code {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                self.typed.push(c);
            }
        }
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Printable characters typed this frame, in order.
    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    /// Digit 1-9 pressed this frame, as a zero-based tile index.
    pub fn digit_pressed(&self) -> Option<usize> {
        self.presses.iter().find_map(|k| match k {
            KeyCode::Char(c @ '1'..='9') => Some(*c as usize - '1' as usize),
            _ => None,
        })
    }

    pub fn nav(&self) -> Option<Nav> {
        if self.any_pressed(KEYS_UP) {
            Some(Nav::Up)
        } else if self.any_pressed(KEYS_DOWN) {
            Some(Nav::Down)
        } else if self.any_pressed(KEYS_LEFT) {
            Some(Nav::Left)
        } else if self.any_pressed(KEYS_RIGHT) {
            Some(Nav::Right)
        } else {
            None
        }
    }

    /// Arrow keys only; letters belong to the name field there.
    pub fn arrow_nav(&self) -> Option<Nav> {
        if self.was_pressed(KeyCode::Up) {
            Some(Nav::Up)
        } else if self.was_pressed(KeyCode::Down) {
            Some(Nav::Down)
        } else {
            None
        }
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
