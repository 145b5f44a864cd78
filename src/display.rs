//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! session.  No game logic is performed; this module only scales world
//! coordinates onto the terminal grid and translates state into commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use fleet_shooter::config::{GameConfig, INITIALS_LEN};
use fleet_shooter::entities::{EnemyShip, EnemyStatus, Phase, Point, Session};
use rand::Rng;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_STAR: Color = Color::DarkGrey;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::Cyan;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_EXPLOSION: Color = Color::Red;
const C_ENEMY_FORMATION: Color = Color::DarkYellow;
const C_ENEMY_DROPPING: Color = Color::Red;
const C_ENEMY_RETURNING: Color = Color::Magenta;
const C_MISSILE: Color = Color::Green;
const C_TITLE: Color = Color::Cyan;
const C_TEXT: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;

/// Terminal dimensions in cells.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub width: u16,
    pub height: u16,
}

impl Screen {
    /// Map a world point into the bordered play area, or `None` if it is
    /// outside the field (e.g. a ship re-entering from above).
    fn cell(&self, config: &GameConfig, p: Point) -> Option<(u16, u16)> {
        if p.x < 0.0 || p.y < 0.0 || p.x >= config.field_width || p.y >= config.field_height {
            return None;
        }
        let inner_w = self.width.saturating_sub(2) as f32;
        let inner_h = self.height.saturating_sub(4) as f32;
        let col = 1 + (p.x / config.field_width * inner_w) as u16;
        let row = 2 + (p.y / config.field_height * inner_h) as u16;
        Some((col, row))
    }
}

/// Scatter background stars across the field.
pub fn generate_stars(config: &GameConfig, rng: &mut impl Rng) -> Vec<Point> {
    (0..config.star_count)
        .map(|_| {
            Point::new(
                rng.gen_range(0.0..config.field_width),
                rng.gen_range(0.0..config.field_height),
            )
        })
        .collect()
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &Session,
    stars: &[Point],
    screen: Screen,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, screen)?;
    draw_stars(out, state, stars, screen)?;

    match state.phase {
        Phase::Start => draw_start(out, state, screen)?,
        Phase::Playing => {
            draw_hud(out, state, screen)?;
            for ship in &state.fleet.ships {
                draw_enemy(out, state, ship, screen)?;
            }
            draw_missiles(out, state, screen)?;
            draw_player(out, state, screen)?;
            draw_controls_hint(out, screen)?;
        }
        Phase::LevelComplete => {
            draw_hud(out, state, screen)?;
            let cleared = format!("Level {} cleared!", state.level);
            draw_centered(
                out,
                screen,
                &[
                    (cleared.as_str(), C_TITLE),
                    ("", C_TEXT),
                    ("Press [space] to continue", C_TEXT),
                ],
            )?;
        }
        Phase::GameOver => draw_game_over(out, state, screen)?,
        Phase::EnteringInitials => draw_initials(out, state, screen)?,
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, screen.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border & background ───────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, screen: Screen) -> std::io::Result<()> {
    let w = screen.width as usize;
    let h = screen.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(screen.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

fn draw_stars<W: Write>(
    out: &mut W,
    state: &Session,
    stars: &[Point],
    screen: Screen,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_STAR))?;
    for &star in stars {
        if let Some((col, row)) = screen.cell(&state.config, star) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("·"))?;
        }
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &Session, screen: Screen) -> std::io::Result<()> {
    // Score and best score, left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    match state.leaderboard.best() {
        Some(best) => out.queue(Print(format!(
            "Score:{:>6}  Hi:{:>6}",
            state.score,
            best.max(state.score)
        )))?,
        None => out.queue(Print(format!("Score:{:>6}", state.score)))?,
    };

    // Level, centre
    let level_str = format!("[ LEVEL {} ]", state.level);
    let lx = (screen.width / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(&level_str))?;

    // Lives, right
    let hearts = "♥".repeat(state.player.lives.max(0) as usize);
    let lives_str = format!("Lives:{}", hearts);
    let rx = screen
        .width
        .saturating_sub(lives_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &Session, screen: Screen) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols):
    //   ▲       ← tip
    //  /█\      ← rear vertices
    let Some((col, row)) = screen.cell(&state.config, state.player.tip()) else {
        return Ok(());
    };

    if state.player.is_exploding() {
        out.queue(style::SetForegroundColor(C_EXPLOSION))?;
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
        out.queue(Print("\\|/"))?;
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/|\\"))?;
        return Ok(());
    }

    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;
    if row + 1 < screen.height.saturating_sub(2) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/█\\"))?;
    }
    Ok(())
}

fn draw_enemy<W: Write>(
    out: &mut W,
    state: &Session,
    ship: &EnemyShip,
    screen: Screen,
) -> std::io::Result<()> {
    let Some((col, row)) = screen.cell(&state.config, ship.center()) else {
        return Ok(());
    };
    let (color, sprite) = match ship.status {
        EnemyStatus::Formation => (C_ENEMY_FORMATION, "«■»"),
        EnemyStatus::Dropping => (C_ENEMY_DROPPING, "«▼»"),
        EnemyStatus::Returning => (C_ENEMY_RETURNING, "«▲»"),
    };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_missiles<W: Write>(out: &mut W, state: &Session, screen: Screen) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_MISSILE))?;
    for missile in &state.player.projectiles {
        if let Some((col, row)) = screen.cell(&state.config, missile.position()) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("║"))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, screen: Screen) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, screen.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── Full-screen overlays ──────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    screen: Screen,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = screen.width / 2;
    let start_row = (screen.height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_start<W: Write>(out: &mut W, state: &Session, screen: Screen) -> std::io::Result<()> {
    let rows: Vec<String> = state
        .leaderboard
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{:>2}. {:<3} {:>7}", i + 1, e.initials, e.score))
        .collect();

    let mut lines: Vec<(&str, Color)> = vec![
        ("★  FLEET  SHOOTER  ★", C_TITLE),
        ("", C_TEXT),
        ("Press [space] to play", C_TEXT),
        ("", C_TEXT),
    ];
    if !rows.is_empty() {
        lines.push(("── HIGH SCORES ──", C_HUD_SCORE));
        lines.extend(rows.iter().map(|r| (r.as_str(), C_TEXT)));
    }
    draw_centered(out, screen, &lines)?;
    draw_controls_hint(out, screen)
}

fn draw_game_over<W: Write>(out: &mut W, state: &Session, screen: Screen) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", state.score);
    let level_line = format!("Reached level {}", state.level);
    draw_centered(
        out,
        screen,
        &[
            ("╔════════════════════╗", Color::Red),
            ("║     YOU  LOST!     ║", Color::Red),
            ("╚════════════════════╝", Color::Red),
            (score_line.as_str(), C_HUD_SCORE),
            (level_line.as_str(), C_HINT),
            ("", C_TEXT),
            ("Press [space] to continue", C_TEXT),
        ],
    )
}

fn draw_initials<W: Write>(out: &mut W, state: &Session, screen: Screen) -> std::io::Result<()> {
    let slots: String = (0..INITIALS_LEN)
        .map(|i| state.initials.chars().nth(i).unwrap_or('_'))
        .map(|c| format!(" {} ", c))
        .collect();
    let score_line = format!("Score: {}", state.score);
    draw_centered(
        out,
        screen,
        &[
            ("NEW HIGH SCORE!", C_HUD_SCORE),
            (score_line.as_str(), C_TEXT),
            ("", C_TEXT),
            ("Enter your initials:", C_TEXT),
            (slots.as_str(), C_TITLE),
            ("", C_TEXT),
            ("[enter] save   [backspace] erase", C_HINT),
        ],
    )
}
