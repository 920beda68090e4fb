/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move tile / shop cursor
///   A / X                 →  Press tile, buy, confirm
///   Start                 →  Pause / Resume
///   Select / B            →  Back to menu
///
/// Everything is edge-triggered: one press, one action.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::Nav;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical face/shoulder button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South        => Some(Btn::A),
            Button::East         => Some(Btn::B),
            Button::West         => Some(Btn::X),
            Button::North        => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start        => Some(Btn::Start),
            Button::Select       => Some(Btn::Select),
            _ => None,
        }
    }
}

fn parse_list(names: &[String]) -> Vec<Btn> {
    names.iter().filter_map(|s| Btn::from_name(s)).collect()
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq, Eq)]
struct ActionMap {
    press: Vec<Btn>,
    pause: Vec<Btn>,
    back: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            press: vec![Btn::A, Btn::X],
            pause: vec![Btn::Start],
            back:  vec![Btn::Select, Btn::B],
        }
    }
}

impl ActionMap {
    /// Overlay configured lists; an empty or unparseable list keeps the default.
    fn apply(&mut self, cfg: &GamepadConfig) {
        let press = parse_list(&cfg.press);
        if !press.is_empty() { self.press = press; }
        let pause = parse_list(&cfg.pause);
        if !pause.is_empty() { self.pause = pause; }
        let back = parse_list(&cfg.back);
        if !back.is_empty() { self.back = back; }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update`.
    just_pressed: [bool; BTN_COUNT],
    nav: Option<Nav>,

    // Stick direction last frame, for edge detection
    stick_dir: Option<Nav>,
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            just_pressed: [false; BTN_COUNT],
            nav: None,
            stick_dir: None,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map.apply(cfg);
    }

    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.nav = None;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        // Stick: fire once when it leaves the dead zone
        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir.is_some() && dir != self.stick_dir && self.nav.is_none() {
            self.nav = dir;
        }
        self.stick_dir = dir;
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, gilrs_btn: Button) {
        match gilrs_btn {
            Button::DPadUp    => self.nav = Some(Nav::Up),
            Button::DPadDown  => self.nav = Some(Nav::Down),
            Button::DPadLeft  => self.nav = Some(Nav::Left),
            Button::DPadRight => self.nav = Some(Nav::Right),
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.just_pressed[btn as usize] = true;
                }
            }
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    pub fn nav(&self) -> Option<Nav> {
        self.nav
    }
    pub fn press_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.press)
    }
    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }
    pub fn back_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.back)
    }
}

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Nav> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    // gilrs: +Y is up
    if x.abs() > y.abs() {
        Some(if x > 0.0 { Nav::Right } else { Nav::Left })
    } else {
        Some(if y > 0.0 { Nav::Up } else { Nav::Down })
    }
}
