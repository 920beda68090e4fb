/// The state machine: every mutation of a `Session` goes through here.
///
/// Two entry points:
///   - `apply(session, intent)`  - a discrete player action
///   - `advance(session, dt_ms)` - wall time passing; fires due transitions
///                                 and ticks the session timer
///
/// Phase graph:
///
///   Idle ─start─▶ Countdown ─4 cues─▶ Revealing ─hide+delay─▶ Accepting
///   Accepting ─all tiles─▶ Feedback ─▶ Revealing   (same grid)
///   Accepting ─all tiles─▶ LevelUp  ─▶ Revealing   (grid + 1)
///   Accepting ─miss─▶ GameOver ─restart─▶ Countdown
///   Accepting ◀─toggle─▶ Paused
///   any in-game phase ─exit─▶ Idle
///
/// Each call is atomic with respect to the next: it runs to completion and
/// leaves the session consistent. Delayed transitions are checked against
/// the current epoch and phase before they touch anything.

use crate::domain::rejection::Rejection;
use crate::domain::rules::{self, GRID_MIN, LIT_COUNT_MAX, LIT_COUNT_MIN};
use crate::domain::shop::Category;
use super::event::{GameEvent, Intent};
use super::schedule::{Action, Fired};
use super::session::{
    CountdownCue, FeedbackKind, Phase, Round, Screen, Session, TileFeedback,
};

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

pub fn apply(session: &mut Session, intent: Intent) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if session.screen == Screen::EnterName {
        if let Intent::SubmitName(name) = intent {
            submit_name(session, &name, &mut events);
        }
        return events;
    }

    match intent {
        Intent::SubmitName(_) => {} // name is immutable once set
        Intent::StartGame => {
            if session.phase == Phase::Idle {
                restart(session, &mut events);
            }
        }
        Intent::Restart => {
            if session.phase == Phase::GameOver {
                restart(session, &mut events);
            }
        }
        Intent::ExitToMenu => exit_to_menu(session, &mut events),
        Intent::TogglePause => toggle_pause(session, &mut events),
        Intent::PressTile(index) => press_tile(session, index, &mut events),
        Intent::Purchase(item) => purchase(session, &item, &mut events),
        Intent::SetTheme(id) => match session.economy.set_theme(&id) {
            Ok(()) => events.push(GameEvent::ThemeChanged { theme: session.economy.current_theme() }),
            Err(r) => reject(r, &mut events),
        },
        Intent::SetStartingLitCount(n) => {
            if (LIT_COUNT_MIN..=LIT_COUNT_MAX).contains(&n) {
                session.starting_lit_count = n;
                events.push(GameEvent::LitCountChanged(n));
            } else {
                reject(Rejection::LitCountOutOfRange(n), &mut events);
            }
        }
    }

    sync_timer(session);
    events
}

pub fn advance(session: &mut Session, dt_ms: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let start = session.scheduler.now();
    let target = start + dt_ms;
    let mut last = start;

    while let Some(fired) = session.scheduler.pop_due(target) {
        tick_timer(session, fired.due_ms - last, &mut events);
        last = fired.due_ms;
        fire(session, fired, &mut events);
        sync_timer(session);
    }
    tick_timer(session, target - last, &mut events);
    session.scheduler.advance_to(target);

    events
}

// ══════════════════════════════════════════════════════════════
// Timer
// ══════════════════════════════════════════════════════════════

fn sync_timer(session: &mut Session) {
    let run = session.clock_should_run();
    session.timer.sync(run);
}

fn tick_timer(session: &mut Session, dt_ms: u64, events: &mut Vec<GameEvent>) {
    if dt_ms == 0 {
        return;
    }
    if session.timer.advance(dt_ms) > 0 {
        events.push(GameEvent::TimerTick { elapsed: session.timer.elapsed() });
    }
}

// ══════════════════════════════════════════════════════════════
// Entry screen & settings
// ══════════════════════════════════════════════════════════════

fn submit_name(session: &mut Session, raw: &str, events: &mut Vec<GameEvent>) {
    let name = raw.trim();
    if name.is_empty() {
        reject(Rejection::EmptyName, events);
        return;
    }
    session.player_name = name.to_string();
    session.screen = Screen::Main;
    log::info!("player [{}] entered", session.player_name);
    events.push(GameEvent::NameSet(session.player_name.clone()));
}

fn reject(rejection: Rejection, events: &mut Vec<GameEvent>) {
    log::debug!("rejected: {rejection}");
    events.push(GameEvent::Rejected(rejection));
}

// ══════════════════════════════════════════════════════════════
// Game lifecycle
// ══════════════════════════════════════════════════════════════

/// New game: grid 3, score and clock zeroed, countdown before the first
/// reveal. Economy is untouched.
fn restart(session: &mut Session, events: &mut Vec<GameEvent>) {
    session.scheduler.cancel_all();
    let epoch = session.bump_epoch();

    session.grid = GRID_MIN;
    session.score = 0;
    session.round = Round::empty(GRID_MIN);
    session.feedback = None;
    session.pulse = false;
    session.timer.reset();

    session.phase = Phase::Countdown;
    session.countdown = Some(CountdownCue::Three);
    let step = session.timing.countdown_step_ms;
    for (i, cue) in CountdownCue::SEQUENCE.iter().enumerate().skip(1) {
        session.scheduler.schedule(step * i as u64, epoch, Action::Countdown(*cue));
    }
    let reveal_at = step * CountdownCue::SEQUENCE.len() as u64;
    session.scheduler.schedule(reveal_at, epoch, Action::RevealPattern);

    log::info!("game started by [{}]", session.player_name);
    events.push(GameEvent::GameStarted);
    events.push(GameEvent::Countdown(CountdownCue::Three));
}

fn exit_to_menu(session: &mut Session, events: &mut Vec<GameEvent>) {
    if !session.phase.in_game() {
        return;
    }
    session.scheduler.cancel_all();
    session.bump_epoch();
    session.phase = Phase::Idle;
    session.countdown = None;
    session.feedback = None;
    session.pulse = false;
    session.round = Round::empty(session.grid);
    log::debug!("exit to menu");
    events.push(GameEvent::ExitedToMenu);
}

fn toggle_pause(session: &mut Session, events: &mut Vec<GameEvent>) {
    match session.phase {
        Phase::Accepting => {
            session.phase = Phase::Paused;
            events.push(GameEvent::Paused);
        }
        Phase::Paused => {
            session.phase = Phase::Accepting;
            events.push(GameEvent::Resumed);
        }
        _ => {}
    }
}

/// Generate and show a fresh pattern on `grid`.
fn start_round(session: &mut Session, grid: usize, events: &mut Vec<GameEvent>) {
    let epoch = session.bump_epoch();
    let count = rules::lit_count(grid, session.starting_lit_count);
    let sequence = rules::generate_pattern(grid, count, &mut session.rng);

    session.round = Round { grid, sequence, user_clicks: Vec::new(), lit: true, miss: None };
    session.phase = Phase::Revealing;
    session.countdown = None;
    session.feedback = None;
    session.pulse = true;

    let t = &session.timing;
    let display = if grid >= 6 { t.reveal_large_ms } else { t.reveal_ms };
    let pulse = t.grid_pulse_ms;
    session.scheduler.schedule(pulse, epoch, Action::EndPulse);
    session.scheduler.schedule(display, epoch, Action::HidePattern);

    log::debug!("round {epoch}: {grid}x{grid}, pattern {:?}", session.round.sequence);
    events.push(GameEvent::PatternShown { grid, tiles: count });
}

// ══════════════════════════════════════════════════════════════
// Delayed transitions
// ══════════════════════════════════════════════════════════════

fn fire(session: &mut Session, fired: Fired, events: &mut Vec<GameEvent>) {
    if fired.epoch != session.epoch {
        log::debug!("stale {:?} from epoch {} ignored", fired.action, fired.epoch);
        return;
    }
    let epoch = fired.epoch;

    match fired.action {
        Action::Countdown(cue) if session.phase == Phase::Countdown => {
            session.countdown = Some(cue);
            events.push(GameEvent::Countdown(cue));
        }
        Action::RevealPattern if session.phase == Phase::Countdown => {
            let grid = session.grid;
            start_round(session, grid, events);
        }
        Action::HidePattern if session.phase == Phase::Revealing => {
            session.round.lit = false;
            let delay = session.timing.accept_delay_ms;
            session.scheduler.schedule(delay, epoch, Action::OpenInput);
            events.push(GameEvent::PatternHidden);
        }
        Action::OpenInput if session.phase == Phase::Revealing => {
            session.phase = Phase::Accepting;
            events.push(GameEvent::InputOpen);
        }
        Action::EndPulse => session.pulse = false,
        Action::ClearShieldFeedback => {
            if matches!(session.feedback, Some(TileFeedback { kind: FeedbackKind::Shielded, .. })) {
                session.feedback = None;
            }
        }
        Action::FeedbackDone if session.phase == Phase::Feedback => {
            let grid = session.grid;
            start_round(session, grid, events);
        }
        Action::LevelUpDone if session.phase == Phase::LevelUp => {
            let grid = session.grid;
            start_round(session, grid, events);
        }
        other => log::debug!("{other:?} ignored in {:?}", session.phase),
    }
}

// ══════════════════════════════════════════════════════════════
// Tile presses
// ══════════════════════════════════════════════════════════════

fn press_tile(session: &mut Session, index: usize, events: &mut Vec<GameEvent>) {
    if session.phase != Phase::Accepting {
        return;
    }
    if index >= session.round.tile_count() || session.round.user_clicks.contains(&index) {
        return;
    }

    if !session.round.sequence.contains(&index) {
        if session.economy.consume_shield() {
            session.feedback = Some(TileFeedback { index, kind: FeedbackKind::Shielded });
            let delay = session.timing.shield_feedback_ms;
            session.scheduler.schedule(delay, session.epoch, Action::ClearShieldFeedback);
            log::info!("shield absorbed a miss on tile {index}");
            events.push(GameEvent::Shielded { index });
            return;
        }
        session.round.miss = Some(index);
        session.phase = Phase::GameOver;
        log::info!("game over: score {} in {}", session.score, rules::format_time(session.elapsed()));
        events.push(GameEvent::GameOver { score: session.score, elapsed: session.elapsed() });
        return;
    }

    session.round.user_clicks.push(index);
    events.push(GameEvent::TileHit { index });

    if session.round.is_complete() {
        complete_round(session, index, events);
    }
}

fn complete_round(session: &mut Session, last_index: usize, events: &mut Vec<GameEvent>) {
    let doubled = session.economy.consume_double_points();
    let reward = rules::round_reward(doubled);
    session.score += reward.points;
    session.economy.credit(reward.diamonds);
    events.push(GameEvent::RoundCleared { reward, score: session.score });

    let epoch = session.epoch;
    match rules::next_grid(session.grid, session.score) {
        Some(next) => {
            session.grid = next;
            session.phase = Phase::LevelUp;
            session.feedback = None;
            let delay = session.timing.level_up_ms;
            session.scheduler.schedule(delay, epoch, Action::LevelUpDone);
            log::info!("level up: {next}x{next} at score {}", session.score);
            events.push(GameEvent::LevelUp { grid: next });
        }
        None => {
            session.phase = Phase::Feedback;
            let kind = if doubled { FeedbackKind::DoublePoints } else { FeedbackKind::Great };
            session.feedback = Some(TileFeedback { index: last_index, kind });
            let delay = session.timing.feedback_ms;
            session.scheduler.schedule(delay, epoch, Action::FeedbackDone);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Shop
// ══════════════════════════════════════════════════════════════

fn purchase(session: &mut Session, item_id: &str, events: &mut Vec<GameEvent>) {
    match session.economy.purchase(item_id) {
        Ok(item) => {
            log::info!("bought {} for {}, balance {}", item.id, item.price, session.economy.diamonds());
            events.push(GameEvent::Purchased { item: item.id });
            if item.category == Category::Theme {
                events.push(GameEvent::ThemeChanged { theme: item.id });
            }
        }
        Err(r) => reject(r, events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::economy::ActiveBuffs;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // ── Helpers ──

    fn session() -> Session {
        let mut s = Session::with_rng(&GameConfig::default(), StdRng::seed_from_u64(99));
        apply(&mut s, Intent::SubmitName("  dwr  ".into()));
        s
    }

    /// Start a game and run the clock until input opens.
    fn playing() -> Session {
        let mut s = session();
        apply(&mut s, Intent::StartGame);
        run_until_accepting(&mut s);
        s
    }

    fn run_until_accepting(s: &mut Session) {
        for _ in 0..1000 {
            if s.phase == Phase::Accepting {
                return;
            }
            advance(s, 10);
        }
        panic!("never reached Accepting, stuck in {:?}", s.phase);
    }

    fn miss_index(s: &Session) -> usize {
        (0..s.round.tile_count()).find(|i| !s.round.sequence.contains(i)).unwrap()
    }

    fn clear_round(s: &mut Session) -> Vec<GameEvent> {
        let tiles: Vec<usize> = s.round.sequence.iter().rev().copied().collect();
        let mut events = vec![];
        for t in tiles {
            events.extend(apply(s, Intent::PressTile(t)));
        }
        events
    }

    /// Clear the current round and wait for the next one to accept input.
    fn clear_and_continue(s: &mut Session) {
        clear_round(s);
        run_until_accepting(s);
    }

    // ── Entry screen ──

    #[test]
    fn name_is_trimmed_and_required() {
        let mut s = Session::with_rng(&GameConfig::default(), StdRng::seed_from_u64(1));
        assert_eq!(apply(&mut s, Intent::StartGame), vec![]);
        assert_eq!(
            apply(&mut s, Intent::SubmitName("   ".into())),
            vec![GameEvent::Rejected(Rejection::EmptyName)]
        );
        assert_eq!(s.screen, Screen::EnterName);

        apply(&mut s, Intent::SubmitName(" alice ".into()));
        assert_eq!(s.player_name, "alice");
        assert_eq!(s.screen, Screen::Main);

        apply(&mut s, Intent::SubmitName("bob".into()));
        assert_eq!(s.player_name, "alice");
    }

    // ── Countdown & reveal timing ──

    #[test]
    fn countdown_then_reveal_then_accept() {
        let mut s = session();
        let ev = apply(&mut s, Intent::StartGame);
        assert!(ev.contains(&GameEvent::GameStarted));
        assert_eq!(s.phase, Phase::Countdown);
        assert_eq!(s.countdown, Some(CountdownCue::Three));

        advance(&mut s, 1000);
        assert_eq!(s.countdown, Some(CountdownCue::Two));
        advance(&mut s, 1000);
        assert_eq!(s.countdown, Some(CountdownCue::One));
        advance(&mut s, 1000);
        assert_eq!(s.countdown, Some(CountdownCue::Start));
        assert_eq!(s.phase, Phase::Countdown);

        let ev = advance(&mut s, 1000);
        assert!(ev.contains(&GameEvent::PatternShown { grid: 3, tiles: 3 }));
        assert_eq!(s.phase, Phase::Revealing);
        assert_eq!(s.countdown, None);
        assert!(s.round.lit);
        assert!(s.pulse);

        advance(&mut s, 240);
        assert!(!s.pulse);
        advance(&mut s, 759);
        assert!(s.round.lit);
        advance(&mut s, 1);
        assert!(!s.round.lit);
        assert_eq!(s.phase, Phase::Revealing);

        advance(&mut s, 399);
        assert_eq!(s.phase, Phase::Revealing);
        let ev = advance(&mut s, 1);
        assert_eq!(ev, vec![GameEvent::InputOpen]);
        assert_eq!(s.phase, Phase::Accepting);
    }

    #[test]
    fn one_large_advance_runs_the_whole_chain() {
        let mut s = session();
        apply(&mut s, Intent::StartGame);
        let ev = advance(&mut s, 4000 + 1000 + 400);
        assert_eq!(s.phase, Phase::Accepting);
        assert!(ev.contains(&GameEvent::PatternHidden));
        assert!(ev.contains(&GameEvent::InputOpen));
    }

    #[test]
    fn taps_ignored_outside_accepting() {
        let mut s = session();
        apply(&mut s, Intent::StartGame);
        advance(&mut s, 4000);
        assert_eq!(s.phase, Phase::Revealing);
        let any = *s.round.sequence.iter().next().unwrap();
        assert_eq!(apply(&mut s, Intent::PressTile(any)), vec![]);
        assert!(s.round.user_clicks.is_empty());
    }

    #[test]
    fn large_grids_reveal_for_shorter() {
        let mut s = playing();
        s.grid = 6;
        s.score = 200;
        clear_round(&mut s);
        assert_eq!(s.phase, Phase::Feedback);
        advance(&mut s, 800);
        assert_eq!(s.round.grid, 6);
        assert_eq!(s.round.sequence.len(), 6);
        advance(&mut s, 599);
        assert!(s.round.lit);
        advance(&mut s, 1);
        assert!(!s.round.lit);
    }

    // ── Tapping ──

    #[test]
    fn clearing_in_any_order_completes() {
        let mut s = playing();
        let ev = clear_round(&mut s);
        assert!(ev.iter().any(|e| matches!(e, GameEvent::RoundCleared { score: 10, .. })));
        assert_eq!(s.phase, Phase::Feedback);
        assert_eq!(s.score, 10);
        assert_eq!(s.economy.diamonds(), 2502);
        assert_eq!(s.feedback.map(|f| f.kind), Some(FeedbackKind::Great));

        advance(&mut s, 800);
        assert_eq!(s.phase, Phase::Revealing);
        assert!(s.round.user_clicks.is_empty());
        assert_eq!(s.feedback, None);
    }

    #[test]
    fn repeat_and_out_of_range_taps_are_noops() {
        let mut s = playing();
        let hit = *s.round.sequence.iter().next().unwrap();
        apply(&mut s, Intent::PressTile(hit));
        assert_eq!(apply(&mut s, Intent::PressTile(hit)), vec![]);
        assert_eq!(apply(&mut s, Intent::PressTile(9)), vec![]);
        assert_eq!(s.round.user_clicks, vec![hit]);
        assert_eq!(s.phase, Phase::Accepting);
    }

    #[test]
    fn miss_without_shield_ends_the_game() {
        let mut s = playing();
        let miss = miss_index(&s);
        let ev = apply(&mut s, Intent::PressTile(miss));
        assert_eq!(ev, vec![GameEvent::GameOver { score: 0, elapsed: s.elapsed() }]);
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.round.miss, Some(miss));

        // Terminal: only restart / exit do anything.
        assert_eq!(apply(&mut s, Intent::TogglePause), vec![]);
        assert_eq!(apply(&mut s, Intent::StartGame), vec![]);
        assert!(advance(&mut s, 10_000).is_empty());
    }

    #[test]
    fn shield_absorbs_one_miss() {
        let mut s = session();
        apply(&mut s, Intent::Purchase("shield".into()));
        apply(&mut s, Intent::StartGame);
        run_until_accepting(&mut s);

        let miss = miss_index(&s);
        let ev = apply(&mut s, Intent::PressTile(miss));
        assert_eq!(ev, vec![GameEvent::Shielded { index: miss }]);
        assert_eq!(s.phase, Phase::Accepting);
        assert!(!s.economy.buffs().shield);
        assert!(s.round.user_clicks.is_empty());
        assert_eq!(s.feedback.map(|f| f.kind), Some(FeedbackKind::Shielded));

        advance(&mut s, 800);
        assert_eq!(s.feedback, None);

        apply(&mut s, Intent::PressTile(miss));
        assert_eq!(s.phase, Phase::GameOver);
    }

    // ── Scoring & buffs ──

    #[test]
    fn double_points_is_one_shot() {
        let mut s = session();
        apply(&mut s, Intent::Purchase("double_points".into()));
        assert_eq!(s.economy.diamonds(), 2200);
        apply(&mut s, Intent::StartGame);
        run_until_accepting(&mut s);

        clear_round(&mut s);
        assert_eq!(s.score, 20);
        assert_eq!(s.economy.diamonds(), 2204);
        assert!(!s.economy.buffs().double_points);
        assert_eq!(s.feedback.map(|f| f.kind), Some(FeedbackKind::DoublePoints));

        run_until_accepting(&mut s);
        clear_round(&mut s);
        assert_eq!(s.score, 30);
        assert_eq!(s.economy.diamonds(), 2206);
    }

    #[test]
    fn grid_grows_at_thresholds() {
        let mut s = playing();
        let mut grids = vec![];
        while s.score < 250 {
            clear_and_continue(&mut s);
            grids.push((s.score, s.round.grid));
        }
        let grid_at = |score: u32| grids.iter().find(|(sc, _)| *sc == score).map(|(_, g)| *g);
        assert_eq!(grid_at(40), Some(3));
        assert_eq!(grid_at(50), Some(4));
        assert_eq!(grid_at(110), Some(4));
        assert_eq!(grid_at(120), Some(5));
        assert_eq!(grid_at(190), Some(5));
        assert_eq!(grid_at(200), Some(6));
        assert_eq!(grid_at(240), Some(6));
        assert_eq!(grid_at(250), Some(7));
    }

    #[test]
    fn level_up_replaces_feedback() {
        let mut s = playing();
        s.score = 40;
        let ev = clear_round(&mut s);
        assert!(ev.contains(&GameEvent::LevelUp { grid: 4 }));
        assert_eq!(s.phase, Phase::LevelUp);
        assert_eq!(s.grid, 4);
        assert_eq!(s.round.grid, 3);

        advance(&mut s, 1799);
        assert_eq!(s.phase, Phase::LevelUp);
        advance(&mut s, 1);
        assert_eq!(s.phase, Phase::Revealing);
        assert_eq!(s.round.grid, 4);
        assert_eq!(s.round.sequence.len(), 4);
    }

    #[test]
    fn no_level_up_at_max_grid() {
        let mut s = playing();
        s.grid = 7;
        s.score = 290;
        clear_round(&mut s);
        assert_eq!(s.score, 300);
        assert_eq!(s.phase, Phase::Feedback);
        assert_eq!(s.grid, 7);
    }

    #[test]
    fn starting_lit_count_setting() {
        let mut s = session();
        assert_eq!(
            apply(&mut s, Intent::SetStartingLitCount(7)),
            vec![GameEvent::Rejected(Rejection::LitCountOutOfRange(7))]
        );
        apply(&mut s, Intent::SetStartingLitCount(5));
        apply(&mut s, Intent::StartGame);
        run_until_accepting(&mut s);
        assert_eq!(s.round.sequence.len(), 5);
    }

    // ── Pause ──

    #[test]
    fn pause_freezes_clock_and_input() {
        let mut s = playing();
        advance(&mut s, 3000);
        let before = s.elapsed();
        assert!(before > 0);

        assert_eq!(apply(&mut s, Intent::TogglePause), vec![GameEvent::Paused]);
        advance(&mut s, 1000);
        advance(&mut s, 1000);
        assert_eq!(s.elapsed(), before);

        let hit = *s.round.sequence.iter().next().unwrap();
        assert_eq!(apply(&mut s, Intent::PressTile(hit)), vec![]);

        assert_eq!(apply(&mut s, Intent::TogglePause), vec![GameEvent::Resumed]);
        advance(&mut s, 1000);
        assert_eq!(s.elapsed(), before + 1);
        assert_eq!(apply(&mut s, Intent::PressTile(hit)), vec![GameEvent::TileHit { index: hit }]);
    }

    #[test]
    fn pause_only_from_accepting() {
        let mut s = session();
        apply(&mut s, Intent::StartGame);
        assert_eq!(apply(&mut s, Intent::TogglePause), vec![]);
        advance(&mut s, 4000);
        assert_eq!(s.phase, Phase::Revealing);
        assert_eq!(apply(&mut s, Intent::TogglePause), vec![]);
    }

    // ── Session clock ──

    #[test]
    fn clock_gated_by_phase() {
        let mut s = session();
        advance(&mut s, 5000);
        assert_eq!(s.elapsed(), 0);

        apply(&mut s, Intent::StartGame);
        advance(&mut s, 4000);
        assert_eq!(s.elapsed(), 0, "countdown does not count");
        advance(&mut s, 3000);
        assert_eq!(s.elapsed(), 3);

        let miss = miss_index(&s);
        apply(&mut s, Intent::PressTile(miss));
        advance(&mut s, 5000);
        assert_eq!(s.elapsed(), 3);
    }

    // ── Restart & exit ──

    #[test]
    fn restart_resets_game_but_not_economy() {
        let mut s = session();
        apply(&mut s, Intent::Purchase("theme_neon".into()));
        apply(&mut s, Intent::StartGame);
        run_until_accepting(&mut s);
        s.score = 40;
        clear_round(&mut s);
        run_until_accepting(&mut s);
        advance(&mut s, 2000);
        let miss = miss_index(&s);
        apply(&mut s, Intent::PressTile(miss));
        let diamonds = s.economy.diamonds();

        apply(&mut s, Intent::Restart);
        assert_eq!(s.phase, Phase::Countdown);
        assert_eq!(s.grid, 3);
        assert_eq!(s.score, 0);
        assert_eq!(s.elapsed(), 0);
        assert!(s.round.sequence.is_empty());
        assert!(s.round.user_clicks.is_empty());
        assert_eq!(s.economy.diamonds(), diamonds);
        assert_eq!(s.economy.inventory(), &["theme_neon"]);
        assert_eq!(s.economy.current_theme(), "theme_neon");
    }

    #[test]
    fn exit_cancels_pending_transitions() {
        let mut s = session();
        apply(&mut s, Intent::StartGame);
        advance(&mut s, 2500);
        assert_eq!(apply(&mut s, Intent::ExitToMenu), vec![GameEvent::ExitedToMenu]);
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(s.countdown, None);

        assert!(advance(&mut s, 10_000).is_empty());
        assert_eq!(s.phase, Phase::Idle);
        assert!(s.round.sequence.is_empty());
    }

    #[test]
    fn stale_transition_is_ignored() {
        let mut s = playing();
        clear_round(&mut s);
        let old_epoch = s.epoch();
        // Exit and immediately start a new game; re-queue the old round's
        // follow-up by hand as if cancellation had been missed.
        apply(&mut s, Intent::ExitToMenu);
        apply(&mut s, Intent::StartGame);
        s.scheduler.schedule(10, old_epoch, Action::FeedbackDone);
        s.scheduler.schedule(10, old_epoch, Action::RevealPattern);
        advance(&mut s, 10);
        assert_eq!(s.phase, Phase::Countdown);
        assert!(s.round.sequence.is_empty());
    }

    #[test]
    fn exit_from_pause() {
        let mut s = playing();
        apply(&mut s, Intent::TogglePause);
        apply(&mut s, Intent::ExitToMenu);
        assert_eq!(s.phase, Phase::Idle);
        assert!(!s.timer.is_running());
        assert_eq!(apply(&mut s, Intent::ExitToMenu), vec![]);
    }

    // ── Shop through the state machine ──

    #[test]
    fn purchase_events() {
        let mut s = session();
        assert_eq!(
            apply(&mut s, Intent::Purchase("theme_fire".into())),
            vec![
                GameEvent::Purchased { item: "theme_fire" },
                GameEvent::ThemeChanged { theme: "theme_fire" },
            ]
        );
        assert_eq!(
            apply(&mut s, Intent::Purchase("theme_fire".into())),
            vec![GameEvent::Rejected(Rejection::ThemeOwned)]
        );
        assert_eq!(
            apply(&mut s, Intent::SetTheme("theme_space".into())),
            vec![GameEvent::Rejected(Rejection::ThemeLocked)]
        );
        assert_eq!(
            apply(&mut s, Intent::SetTheme("default".into())),
            vec![GameEvent::ThemeChanged { theme: "default" }]
        );
    }

    #[test]
    fn broke_purchase_is_rejected_without_change() {
        let mut s = session();
        apply(&mut s, Intent::Purchase("theme_fire".into()));
        apply(&mut s, Intent::Purchase("theme_ocean".into()));
        assert_eq!(s.economy.diamonds(), 500);
        let ev = apply(&mut s, Intent::Purchase("theme_space".into()));
        assert_eq!(
            ev,
            vec![GameEvent::Rejected(Rejection::InsufficientDiamonds { price: 1000, balance: 500 })]
        );
        assert_eq!(s.economy.diamonds(), 500);
        assert_eq!(s.economy.inventory(), &["theme_fire", "theme_ocean"]);
        assert_eq!(s.economy.buffs(), ActiveBuffs::default());
    }
}
