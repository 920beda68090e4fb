/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of Cells)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed, batched with `queue!`
///   4. Flush once, then swap front/back
///
/// Screen layout:
///
///   row 0        header: title, TIME, SCORE, diamonds, armed buffs, player
///   row 1        tab bar (Play / Shop / Settings)
///   row 3..      body: name entry, menu, board, shop or settings
///   last 2 rows  status message and key hints

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::rules::{format_time, LIT_COUNT_MAX, LIT_COUNT_MIN};
use crate::domain::shop::{Buff, Category, SHOP_ITEMS};
use crate::domain::theme::{Rgb, Theme};
use crate::sim::session::{FeedbackKind, Phase, Screen, Session};
use super::view::{Tab, ViewState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every empty cell, also used for Clear,
    /// so the gaps between rows match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composition, so a back buffer full of these
    /// forces every position to repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// One column per char; clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
        cx
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Colours ──

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

fn blend(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

const ERROR_RGB: Rgb = Rgb(220, 38, 38);
const SHIELD_RGB: Rgb = Rgb(59, 130, 246);
const DIAMOND: Color = Color::Rgb { r: 103, g: 232, b: 249 };
const DIM: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const GOLD: Color = Color::Rgb { r: 255, g: 220, b: 50 };

// ── Board geometry and tile looks ──

const HEADER_ROW: usize = 0;
const TABS_ROW: usize = 1;
const BODY_ROW: usize = 3;
const TILE_GAP: usize = 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct BoardLayout {
    x0: usize,
    y0: usize,
    tile_w: usize,
    tile_h: usize,
    grid: usize,
}

impl BoardLayout {
    fn fit(grid: usize, width: usize, height: usize) -> Self {
        // Body minus the caption above and the status rows below
        let avail_h = height.saturating_sub(BODY_ROW + 5);
        let tile_h = ((avail_h + TILE_GAP) / grid).saturating_sub(TILE_GAP).clamp(1, 3);
        let avail_w = width.saturating_sub(4);
        let max_w = ((avail_w + TILE_GAP) / grid).saturating_sub(TILE_GAP).max(3);
        let tile_w = (tile_h * 2 + 3).min(max_w);

        let total_w = grid * (tile_w + TILE_GAP) - TILE_GAP;
        BoardLayout {
            x0: width.saturating_sub(total_w) / 2,
            y0: BODY_ROW + 2,
            tile_w,
            tile_h,
            grid,
        }
    }

    fn total_w(&self) -> usize {
        self.grid * (self.tile_w + TILE_GAP) - TILE_GAP
    }

    fn total_h(&self) -> usize {
        self.grid * (self.tile_h + TILE_GAP) - TILE_GAP
    }

    fn origin(&self, index: usize) -> (usize, usize) {
        let (col, row) = (index % self.grid, index / self.grid);
        (self.x0 + col * (self.tile_w + TILE_GAP), self.y0 + row * (self.tile_h + TILE_GAP))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TileLook {
    Blank,
    Lit,
    Hit,
    Success,
    Shielded,
    /// Part of the pattern but never tapped; shown after a loss.
    Missed,
    Error,
}

fn tile_look(s: &Session, index: usize) -> TileLook {
    let round = &s.round;
    if let Some(fb) = s.feedback {
        if fb.index == index {
            return match fb.kind {
                FeedbackKind::Shielded => TileLook::Shielded,
                _ => TileLook::Success,
            };
        }
    }
    let clicked = round.user_clicks.contains(&index);
    if s.phase == Phase::GameOver {
        if round.miss == Some(index) {
            return TileLook::Error;
        }
        if round.sequence.contains(&index) && !clicked {
            return TileLook::Missed;
        }
    }
    if round.lit && round.sequence.contains(&index) {
        TileLook::Lit
    } else if clicked {
        TileLook::Hit
    } else {
        TileLook::Blank
    }
}

fn look_colour(look: TileLook, theme: &Theme) -> (Rgb, char) {
    match look {
        TileLook::Blank => (blend(theme.bg, theme.text, 0.14), ' '),
        TileLook::Lit => (theme.tile_lit, ' '),
        TileLook::Hit => (theme.primary, ' '),
        TileLook::Success => (theme.secondary, '★'),
        TileLook::Shielded => (SHIELD_RGB, '◈'),
        TileLook::Missed => (blend(theme.tile_lit, theme.bg, 0.55), '·'),
        TileLook::Error => (ERROR_RGB, '✕'),
    }
}

// ── Renderer ──

/// Cleared and fully repainted whenever this changes.
type SceneKey = (Screen, Tab, Phase);

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_scene: Option<SceneKey>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_scene: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, s: &Session, v: &ViewState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }

        let scene = (s.screen, v.tab, s.phase);
        if resized || self.last_scene != Some(scene) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_scene = Some(scene);
        }

        self.compose(s, v);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, s: &Session, v: &ViewState) {
        self.front.clear();
        let theme = s.theme();

        match s.screen {
            Screen::EnterName => self.compose_enter_name(v, theme),
            Screen::Main => {
                self.compose_header(s, theme);
                self.compose_tabs(v, theme);
                match v.tab {
                    Tab::Play if s.phase == Phase::Idle => self.compose_menu(s, theme),
                    Tab::Play => self.compose_board(s, v, theme),
                    Tab::Shop => self.compose_shop(s, v, theme),
                    Tab::Settings => self.compose_settings(s, v, theme),
                }
            }
        }

        self.compose_footer(s, v);
    }

    fn compose_enter_name(&mut self, v: &ViewState, theme: &Theme) {
        let top = self.front.height / 2 - self.front.height.min(8) / 2;
        let title = rgb(theme.primary);
        self.front.put_centered(top, "╔═══════════════════════════╗", title, Color::Reset);
        self.front.put_centered(top + 1, "║       FARC !!! MIND       ║", title, Color::Reset);
        self.front.put_centered(top + 2, "╚═══════════════════════════╝", title, Color::Reset);
        self.front.put_centered(top + 4, "Enter your name to begin", rgb(theme.text), Color::Reset);

        let field = format!(" {:<24} ", format!("{}_", v.name_input));
        let field_bg = rgb(blend(theme.bg, theme.text, 0.14));
        self.front.put_centered(top + 6, &field, rgb(theme.text), field_bg);
    }

    fn compose_header(&mut self, s: &Session, theme: &Theme) {
        let w = self.front.width;
        let bar = rgb(theme.bg);
        self.front.fill_rect(0, HEADER_ROW, w, 1, bar);

        let mut x = self.front.put_str(1, HEADER_ROW, "FARC !!! MIND", rgb(theme.primary), bar);
        x = self.front.put_str(x + 3, HEADER_ROW, &format!("TIME {}", format_time(s.elapsed())), rgb(theme.text), bar);
        x = self.front.put_str(x + 3, HEADER_ROW, &format!("SCORE {}", s.score), rgb(theme.text), bar);
        x = self.front.put_str(x + 3, HEADER_ROW, &format!("◆ {}", s.economy.diamonds()), DIAMOND, bar);

        let buffs = s.economy.buffs();
        if buffs.is_armed(Buff::Shield) {
            x = self.front.put_str(x + 2, HEADER_ROW, "[SHIELD]", rgb(SHIELD_RGB), bar);
        }
        if buffs.is_armed(Buff::DoublePoints) {
            self.front.put_str(x + 2, HEADER_ROW, "[2X]", GOLD, bar);
        }

        let who = format!("@{} ", s.player_name);
        let len = who.chars().count();
        if w > len {
            self.front.put_str(w - len, HEADER_ROW, &who, DIM, bar);
        }
    }

    fn compose_tabs(&mut self, v: &ViewState, theme: &Theme) {
        let mut x = 1;
        for tab in [Tab::Play, Tab::Shop, Tab::Settings] {
            let label = format!(" {} ", tab.label());
            let (fg, bg) = if tab == v.tab {
                (rgb(theme.text), rgb(theme.primary))
            } else {
                (DIM, Color::Reset)
            };
            x = self.front.put_str(x, TABS_ROW, &label, fg, bg) + 1;
        }
    }

    fn compose_menu(&mut self, s: &Session, theme: &Theme) {
        let text = rgb(theme.text);
        let mut y = BODY_ROW + 1;
        self.front.put_centered(y, &format!("Welcome, {}!", s.player_name), rgb(theme.primary), Color::Reset);
        y += 2;
        self.front.put_centered(y, "Memorise the lit tiles, then tap them back.", text, Color::Reset);
        y += 1;
        self.front.put_centered(y, "One wrong tap ends the game.", text, Color::Reset);
        y += 2;
        if s.score > 0 || s.elapsed() > 0 {
            let last = format!("Last game: {} points in {}", s.score, format_time(s.elapsed()));
            self.front.put_centered(y, &last, DIM, Color::Reset);
            y += 2;
        }
        self.front.put_centered(y, "▸ ENTER: Start game", GOLD, Color::Reset);
        y += 2;

        let chips: Vec<String> = s
            .economy
            .owned_themes()
            .map(|t| if t.id == theme.id { format!("[{}]", t.name) } else { t.name.to_string() })
            .collect();
        self.front.put_centered(y, &format!("Themes: {}", chips.join("  ")), DIM, Color::Reset);
    }

    fn compose_board(&mut self, s: &Session, v: &ViewState, theme: &Theme) {
        let grid = s.round.grid;
        let layout = BoardLayout::fit(grid, self.front.width, self.front.height);

        // Caption
        let caption = match s.feedback {
            Some(fb) => fb.kind.message().to_string(),
            None => format!("{g}×{g} grid", g = grid),
        };
        let caption_fg = if s.feedback.is_some() { GOLD } else { DIM };
        self.front.put_centered(BODY_ROW, &caption, caption_fg, Color::Reset);

        // Panel behind the board; brighter border while the pulse is up
        let panel = rgb(theme.bg);
        let border = if s.pulse { rgb(theme.secondary) } else { rgb(blend(theme.bg, theme.primary, 0.4)) };
        let (px, py) = (layout.x0.saturating_sub(2), layout.y0 - 1);
        let (pw, ph) = (layout.total_w() + 4, layout.total_h() + 2);
        self.front.fill_rect(px, py, pw, ph, panel);
        for yy in py..py + ph {
            self.front.set(px, yy, Cell::new('▌', border, panel));
            self.front.set(px + pw - 1, yy, Cell::new('▐', border, panel));
        }

        for index in 0..grid * grid {
            let (x, y) = layout.origin(index);
            let (colour, mark) = look_colour(tile_look(s, index), theme);
            let bg = rgb(colour);
            self.front.fill_rect(x, y, layout.tile_w, layout.tile_h, bg);

            let mid_y = y + layout.tile_h / 2;
            if mark != ' ' {
                self.front.set(x + layout.tile_w / 2, mid_y, Cell::new(mark, rgb(theme.text), bg));
            }
            if grid * grid <= 9 {
                let digit = char::from(b'1' + index as u8);
                self.front.set(x, y, Cell::new(digit, rgb(blend(colour, theme.text, 0.5)), bg));
            }
            if s.accepting() && v.cursor == index {
                self.front.set(x, mid_y, Cell::new('[', rgb(theme.text), bg));
                self.front.set(x + layout.tile_w - 1, mid_y, Cell::new(']', rgb(theme.text), bg));
            }
        }

        self.compose_overlay(s, &layout, theme);
    }

    fn compose_overlay(&mut self, s: &Session, layout: &BoardLayout, theme: &Theme) {
        let lines: Vec<(String, Color)> = match s.phase {
            Phase::Countdown => match s.countdown {
                Some(cue) => vec![(format!("  {}  ", cue.label()), GOLD)],
                None => return,
            },
            Phase::LevelUp => vec![
                ("LEVEL UP!".to_string(), GOLD),
                (format!("NEXT LEVEL {g}×{g} grid coming up!", g = s.grid), rgb(theme.text)),
            ],
            Phase::Paused => vec![
                ("PAUSED".to_string(), GOLD),
                ("P: resume   ESC: menu".to_string(), DIM),
            ],
            Phase::GameOver => vec![
                ("GAME OVER".to_string(), rgb(ERROR_RGB)),
                (format!("Score: {}", s.score), rgb(theme.text)),
                (format!("Time:  {}", format_time(s.elapsed())), rgb(theme.text)),
                (format!("Reached {g}×{g}", g = s.grid), rgb(theme.text)),
            ],
            _ => return,
        };

        let box_w = lines.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0) + 4;
        let box_h = lines.len() + 2;
        let bg = Color::Rgb { r: 40, g: 40, b: 48 };
        let mid_y = layout.y0 + layout.total_h() / 2;
        let top = mid_y.saturating_sub(box_h / 2);
        let left = self.front.width.saturating_sub(box_w) / 2;
        self.front.fill_rect(left, top, box_w, box_h, bg);
        for (i, (line, fg)) in lines.iter().enumerate() {
            let len = line.chars().count();
            self.front.put_str(left + (box_w - len) / 2, top + 1 + i, line, *fg, bg);
        }
    }

    fn compose_shop(&mut self, s: &Session, v: &ViewState, theme: &Theme) {
        let eco = &s.economy;
        self.front.put_str(2, BODY_ROW, &format!("Balance: ◆ {}", eco.diamonds()), DIAMOND, Color::Reset);

        let mut y = BODY_ROW + 2;
        for (i, item) in SHOP_ITEMS.iter().enumerate() {
            let selected = i == v.shop_cursor;
            let status = match (item.category, item.buff()) {
                (Category::Theme, _) if eco.current_theme() == item.id => "Active".to_string(),
                (Category::Theme, _) if eco.owns_theme(item.id) => "Owned".to_string(),
                (_, Some(buff)) if eco.buffs().is_armed(buff) => "Armed".to_string(),
                _ => format!("◆ {}", item.price),
            };
            let marker = if selected { "▸" } else { " " };
            let name_fg = if selected { rgb(theme.primary) } else { rgb(theme.text) };
            self.front.put_str(2, y, marker, GOLD, Color::Reset);
            self.front.put_str(4, y, item.name, name_fg, Color::Reset);
            self.front.put_str(22, y, &status, if status.starts_with('◆') { DIAMOND } else { GOLD }, Color::Reset);
            self.front.put_str(34, y, item.desc, DIM, Color::Reset);
            y += 1;
        }
    }

    fn compose_settings(&mut self, s: &Session, v: &ViewState, theme: &Theme) {
        self.front.put_str(2, BODY_ROW, "Starting pattern length", rgb(theme.text), Color::Reset);
        self.front.put_str(2, BODY_ROW + 1, "Tiles lit on the first grid size", DIM, Color::Reset);

        let mut x = 4;
        for n in LIT_COUNT_MIN..=LIT_COUNT_MAX {
            let label = format!(" {n} ");
            let (fg, bg) = match (n == s.starting_lit_count, n == v.lit_choice) {
                (true, _) => (rgb(theme.text), rgb(theme.primary)),
                (false, true) => (rgb(theme.text), rgb(blend(theme.bg, theme.text, 0.2))),
                _ => (DIM, Color::Reset),
            };
            x = self.front.put_str(x, BODY_ROW + 3, &label, fg, bg) + 1;
        }
    }

    fn compose_footer(&mut self, s: &Session, v: &ViewState) {
        let h = self.front.height;
        if h < 2 {
            return;
        }
        if !v.message.is_empty() {
            self.front.put_centered(h - 2, &v.message, GOLD, Color::Reset);
        }

        let hint = match (s.screen, v.tab, s.phase) {
            (Screen::EnterName, _, _) => "ENTER: Continue   Ctrl+C: Quit",
            (_, Tab::Shop, _) => "↑↓: Browse   ENTER: Buy   T: Use theme   TAB: Next tab",
            (_, Tab::Settings, _) => "←→: Choose   ENTER: Apply   TAB: Next tab",
            (_, Tab::Play, Phase::Idle) => "ENTER: Start   T: Theme   TAB: Shop   Q: Quit",
            (_, Tab::Play, Phase::GameOver) => "R: Play again   X: Share   ESC: Menu",
            (_, Tab::Play, Phase::Paused) => "P: Resume   ESC: Menu",
            (_, Tab::Play, _) => "Arrows/WASD: Move   ENTER: Tap   1-9: Tap   P: Pause   ESC: Menu",
        };
        self.front.put_centered(h - 1, hint, DIM, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::event::Intent;
    use crate::sim::step;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session {
        let mut s = Session::with_rng(&GameConfig::default(), StdRng::seed_from_u64(7));
        step::apply(&mut s, Intent::SubmitName("ada".into()));
        s
    }

    fn composed(s: &Session, v: &ViewState) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(100, 30);
        r.compose(s, v);
        r
    }

    fn screen_text(r: &Renderer) -> String {
        (0..r.front.height).map(|y| r.front.row_text(y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn name_entry_shows_typed_text() {
        let s = Session::with_rng(&GameConfig::default(), StdRng::seed_from_u64(1));
        let mut v = ViewState::new(3);
        v.type_chars(&['b', 'o', 'b']);
        let text = screen_text(&composed(&s, &v));
        assert!(text.contains("FARC !!! MIND"));
        assert!(text.contains("bob_"));
    }

    #[test]
    fn header_shows_time_score_and_balance() {
        let s = session();
        let text = composed(&s, &ViewState::new(3)).front.row_text(HEADER_ROW);
        assert!(text.contains("TIME 00:00"));
        assert!(text.contains("SCORE 0"));
        assert!(text.contains("◆ 2500"));
        assert!(text.contains("@ada"));
    }

    #[test]
    fn shop_marks_active_theme_and_prices() {
        let mut s = session();
        step::apply(&mut s, Intent::Purchase("shield".into()));
        let mut v = ViewState::new(3);
        v.tab = Tab::Shop;
        let text = screen_text(&composed(&s, &v));
        assert!(text.contains("Armed"));
        assert!(text.contains("◆ 300"));
        assert!(text.contains("Balance: ◆ 2350"));
    }

    #[test]
    fn game_over_board_marks_missed_and_wrong_tiles() {
        let mut s = session();
        step::apply(&mut s, Intent::StartGame);
        step::advance(&mut s, 10_000);
        assert_eq!(s.phase, Phase::Accepting);
        let wrong = (0..9).find(|i| !s.round.sequence.contains(i)).unwrap_or(0);
        step::apply(&mut s, Intent::PressTile(wrong));
        assert_eq!(s.phase, Phase::GameOver);

        assert_eq!(tile_look(&s, wrong), TileLook::Error);
        for &i in &s.round.sequence {
            assert_eq!(tile_look(&s, i), TileLook::Missed);
        }
        let text = screen_text(&composed(&s, &ViewState::new(3)));
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("R: Play again"));
    }

    #[test]
    fn lit_tiles_only_while_revealing() {
        let mut s = session();
        step::apply(&mut s, Intent::StartGame);
        step::advance(&mut s, 4_000);
        assert_eq!(s.phase, Phase::Revealing);
        let lit = s.round.sequence.iter().next().copied().unwrap_or(0);
        assert_eq!(tile_look(&s, lit), TileLook::Lit);
        step::advance(&mut s, 1_000);
        assert_eq!(tile_look(&s, lit), TileLook::Blank);
    }

    #[test]
    fn layout_fits_largest_grid() {
        let l = BoardLayout::fit(7, 80, 24);
        assert!(l.x0 + l.total_w() <= 80);
        assert!(l.y0 + l.total_h() <= 24 - 2);
    }
}
