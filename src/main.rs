mod display;
mod input;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use crossterm::{
    cursor,
    event::{
        self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::ThreadRng;
use rand::thread_rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fleet_shooter::compute::{handle_command, init_state, player_shoot, steer_player, tick};
use fleet_shooter::config::{self, GameConfig};
use fleet_shooter::entities::{Command, Phase, Point, Session};
use fleet_shooter::leaderboard::{self, Leaderboard};

use crate::display::Screen;
use crate::input::{HeldKeys, SHOOT_COOLDOWN};

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs go to `config.log_file`.
/// `RUST_LOG` filters, `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing(config: &GameConfig) {
    let Ok(file) = File::create(&config.log_file) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let writer = Mutex::new(file);

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .compact()
            .init();
    }
}

/// Log the panic, give the terminal back, then let the default hook print
/// the message to stderr as usual.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
        restore_terminal(&mut stdout(), true);
        default_hook(info);
    }));
}

fn restore_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn load_leaderboard(path: &Path) -> Leaderboard {
    leaderboard::load(path).unwrap_or_else(|e| {
        warn!(error = %e, "leaderboard unreadable, starting empty");
        Leaderboard::default()
    })
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Apply one command, persisting the leaderboard whenever it changed.
fn apply(state: &mut Session, command: Command, rng: &mut ThreadRng, scores: &Path) {
    let next = handle_command(state, command, rng);
    if next.leaderboard != state.leaderboard {
        if let Err(e) = leaderboard::save(scores, &next.leaderboard) {
            warn!(error = %e, "could not save leaderboard");
        }
    }
    *state = next;
}

/// Runs until the player quits.
///
/// Input model: one-shot keys act on their press event; movement and
/// firing are read from `HeldKeys` once per frame, so Space and a direction
/// can be held together.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut Session,
    stars: &[Point],
    rx: &mpsc::Receiver<Event>,
    scores: &Path,
) -> std::io::Result<()> {
    let mut rng = thread_rng();
    let mut keys = HeldKeys::default();
    let mut shoot_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let frame_budget = state.config.tick_interval();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = event else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    keys.press(code, frame);
                    let phase = state.phase;
                    if let Some(command) = input::command_for_press(code, modifiers, phase) {
                        if command == Command::Quit {
                            info!(score = state.score, "quit");
                            return Ok(());
                        }
                        apply(state, command, &mut rng, scores);
                        // Don't let the key that changed screens fire a shot.
                        if state.phase != phase {
                            keys.clear();
                        }
                    }
                }
                KeyEventKind::Repeat => keys.press(code, frame),
                KeyEventKind::Release => keys.release(code),
            }
        }

        // ── Apply held-key actions every frame ────────────────────────────────
        if state.phase == Phase::Playing {
            *state = steer_player(state, keys.steer(frame));
            if shoot_cooldown == 0 && keys.firing(frame) {
                *state = player_shoot(state);
                shoot_cooldown = SHOOT_COOLDOWN;
            }
        }
        shoot_cooldown = shoot_cooldown.saturating_sub(1);

        *state = tick(state, &mut rng);

        let (width, height) = terminal::size()?;
        display::render(out, state, stars, Screen { width, height })?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            thread::sleep(frame_budget - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let config = config::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    init_tracing(&config);
    install_panic_hook();

    let scores = config.scores_path();
    let board = load_leaderboard(&scores);
    let mut rng = thread_rng();
    let stars = display::generate_stars(&config, &mut rng);
    let mut state = init_state(config, board, &mut rng);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    info!(path = %scores.display(), "session started");
    let result = game_loop(&mut out, &mut state, &stars, &rx, &scores);

    restore_terminal(&mut out, keyboard_enhanced);
    result
}

#[cfg(test)]
mod tests {
    use super::restore_terminal;

    #[test]
    fn restore_shows_cursor_and_leaves_alternate_screen() {
        let mut buf: Vec<u8> = Vec::new();
        restore_terminal(&mut buf, false);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\x1b[?25h"));
        assert!(text.contains("\x1b[?1049l"));
    }
}
