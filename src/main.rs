/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use simplelog::{LevelFilter, WriteLogger};

use config::GameConfig;
use domain::shop::{Category, SHOP_ITEMS};
use sim::event::Intent;
use sim::session::{Phase, Screen, Session};
use sim::share::{self, Platform, ShareMessage, TerminalPlatform};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::{self as keys, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;
use ui::view::{Tab, ViewState};

const LOG_FILE: &str = "farcmind.log";

fn main() {
    if let Err(e) = setup_logging() {
        eprintln!("Logging disabled: {e}");
    }

    let config = GameConfig::load();
    let mut session = Session::new(&config);
    let mut view = ViewState::new(session.starting_lit_count);
    let mut platform = TerminalPlatform::new();

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    platform.ready();

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut view, &mut renderer, &mut platform, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Farc !!! Mind!");
    if !session.player_name.is_empty() {
        println!("{}: {} points in {}", session.player_name, session.score,
            domain::rules::format_time(session.elapsed()));
    }
    if let Some(link) = &platform.last_link {
        println!("Share your score: {link}");
    }
}

/// `--debug` writes a log file next to the working directory; otherwise
/// no logger is installed and the `log` macros are no-ops.
fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().any(|arg| arg == "--debug") {
        WriteLogger::init(
            LevelFilter::Debug,
            simplelog::ConfigBuilder::new()
                .set_target_level(LevelFilter::Error)
                .build(),
            File::create(LOG_FILE)?,
        )?;
    }
    Ok(())
}

fn game_loop(
    session: &mut Session,
    view: &mut ViewState,
    renderer: &mut Renderer,
    platform: &mut TerminalPlatform,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let frame = Duration::from_millis(config.timing.frame_ms);
    let started = Instant::now();
    let mut fed_ms: u64 = 0;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let controls = read_controls(session, view, &kb, &gp);
        if controls.quit {
            break;
        }
        for intent in controls.intents {
            let events = step::apply(session, intent);
            view.observe(&events);
            if let Some(sfx) = sound {
                sfx.play_events(&events);
            }
        }
        if controls.share {
            let message = ShareMessage::new(session.score, session.elapsed(), &config.game.game_url);
            share::share(platform, &message);
            view.set_message("Share link ready, printed on exit");
        }

        // Feed wall time as whole milliseconds, carrying the remainder
        let now_ms = started.elapsed().as_millis() as u64;
        let dt = now_ms - fed_ms;
        fed_ms = now_ms;

        let events = step::advance(session, dt);
        view.observe(&events);
        if let Some(sfx) = sound {
            sfx.play_events(&events);
        }
        view.clamp_cursor(session.round.grid);
        view.tick(dt);

        renderer.render(session, view)?;
        std::thread::sleep(frame);
    }

    Ok(())
}

/// What one frame of input asks for.
#[derive(Default)]
struct Controls {
    intents: Vec<Intent>,
    share: bool,
    quit: bool,
}

fn read_controls(s: &Session, v: &mut ViewState, kb: &InputState, gp: &GamepadState) -> Controls {
    let mut out = Controls::default();

    if s.screen == Screen::EnterName {
        v.type_chars(kb.typed());
        if kb.was_pressed(KeyCode::Backspace) {
            v.backspace();
        }
        if kb.was_pressed(KeyCode::Enter) || gp.press_pressed() {
            out.intents.push(Intent::SubmitName(v.name_input.clone()));
        }
        return out;
    }

    if kb.any_pressed(keys::KEYS_TAB) {
        v.tab = v.tab.next();
        return out;
    }
    if kb.any_pressed(keys::KEYS_BACK) || gp.back_pressed() {
        if v.tab != Tab::Play {
            v.tab = Tab::Play;
        } else {
            out.intents.push(Intent::ExitToMenu);
        }
        return out;
    }
    if s.phase == Phase::Idle && kb.any_pressed(keys::KEYS_QUIT) {
        out.quit = true;
        return out;
    }

    let confirm = kb.any_pressed(keys::KEYS_CONFIRM) || gp.press_pressed();
    let nav = kb.nav().or(gp.nav());

    match v.tab {
        Tab::Play => play_controls(s, v, kb, gp, confirm, nav, &mut out),
        Tab::Shop => {
            if let Some(dir) = nav {
                v.move_shop_cursor(dir);
            }
            if let Some(item) = SHOP_ITEMS.get(v.shop_cursor) {
                if confirm {
                    out.intents.push(Intent::Purchase(item.id.to_string()));
                } else if kb.any_pressed(keys::KEYS_THEME) {
                    let id = match item.category {
                        Category::Theme => item.id.to_string(),
                        Category::Consumable => next_owned_theme(s),
                    };
                    out.intents.push(Intent::SetTheme(id));
                }
            }
        }
        Tab::Settings => {
            if let Some(dir) = nav {
                v.move_lit_choice(dir);
            }
            if confirm {
                out.intents.push(Intent::SetStartingLitCount(v.lit_choice));
            }
        }
    }
    out
}

fn play_controls(
    s: &Session,
    v: &mut ViewState,
    kb: &InputState,
    gp: &GamepadState,
    confirm: bool,
    nav: Option<keys::Nav>,
    out: &mut Controls,
) {
    match s.phase {
        Phase::Idle => {
            if confirm {
                out.intents.push(Intent::StartGame);
            } else if kb.any_pressed(keys::KEYS_THEME) {
                out.intents.push(Intent::SetTheme(next_owned_theme(s)));
            }
        }
        Phase::GameOver => {
            if kb.any_pressed(keys::KEYS_RESTART) || gp.press_pressed() {
                out.intents.push(Intent::Restart);
            } else if kb.any_pressed(keys::KEYS_SHARE) {
                out.share = true;
            }
        }
        _ => {
            if kb.any_pressed(keys::KEYS_PAUSE) || gp.pause_pressed() {
                out.intents.push(Intent::TogglePause);
                return;
            }
            if let Some(dir) = nav {
                v.move_cursor(dir, s.round.grid);
            }
            if confirm {
                out.intents.push(Intent::PressTile(v.cursor));
            } else if let Some(index) = kb.digit_pressed() {
                if index < s.round.tile_count() && s.round.grid == 3 {
                    v.cursor = index;
                    out.intents.push(Intent::PressTile(index));
                }
            }
        }
    }
}

/// The owned theme after the current one, wrapping around.
fn next_owned_theme(s: &Session) -> String {
    let owned: Vec<&str> = s.economy.owned_themes().map(|t| t.id).collect();
    let current = s.economy.current_theme();
    let at = owned.iter().position(|&id| id == current).unwrap_or(0);
    owned.get((at + 1) % owned.len().max(1)).copied().unwrap_or(current).to_string()
}
