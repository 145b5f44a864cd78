//! Game state machine.
//!
//! Every public function takes an immutable reference to the current
//! `Session` (and, where needed, an RNG handle) and returns a brand-new
//! `Session`.  Side effects are limited to the injected RNG and logging.
//!
//! Phases: Start → Playing ⇄ LevelComplete, Playing → GameOver →
//! (EnteringInitials →) Start.

use rand::Rng;
use tracing::{debug, info};

use crate::collision;
use crate::config::{GameConfig, INITIALS_LEN};
use crate::entities::{Command, Phase, PlayerShip, Projectile, Session, Steer};
use crate::fleet;
use crate::leaderboard::{Leaderboard, LeaderboardEntry};

// ── Constructors ─────────────────────────────────────────────────────────────

/// A fresh session on the start screen with a level-1 fleet waiting.
pub fn init_state(config: GameConfig, leaderboard: Leaderboard, rng: &mut impl Rng) -> Session {
    let mut next_enemy_id = 0;
    let fleet = fleet::generate(&config, 1, &mut next_enemy_id, rng);
    Session {
        phase: Phase::Start,
        player: PlayerShip::new(&config),
        fleet,
        score: 0,
        level: 1,
        frame: 0,
        next_enemy_id,
        initials: String::new(),
        leaderboard,
        config,
    }
}

fn restart(state: &Session, leaderboard: Leaderboard, rng: &mut impl Rng) -> Session {
    info!(score = state.score, level = state.level, "session over");
    init_state(state.config.clone(), leaderboard, rng)
}

// ── Input-driven transitions (pure) ─────────────────────────────────────────

/// The one place keyboard characters become initials.
pub fn initial_letter(c: char) -> Option<char> {
    c.is_ascii_alphabetic().then(|| c.to_ascii_uppercase())
}

/// Set the ship's horizontal velocity.  Ignored while the ship is exploding.
pub fn steer_player(state: &Session, steer: Steer) -> Session {
    if state.player.is_exploding() {
        return state.clone();
    }
    let speed = state.config.player_speed;
    let velocity = match steer {
        Steer::Left => -speed,
        Steer::Right => speed,
        Steer::Idle => 0.0,
    };
    let mut next = state.clone();
    next.player.velocity = velocity;
    next
}

/// Launch a missile from the ship's tip.  Only while playing and not exploding.
pub fn player_shoot(state: &Session) -> Session {
    if state.phase != Phase::Playing || state.player.is_exploding() {
        return state.clone();
    }
    let tip = state.player.tip();
    let mut next = state.clone();
    next.player.projectiles.push(Projectile { x: tip.x, y: tip.y });
    next
}

/// Move on to the next level with a denser fleet.  Lives and score carry over.
pub fn advance_level(state: &Session, rng: &mut impl Rng) -> Session {
    if state.phase != Phase::LevelComplete {
        return state.clone();
    }
    let mut next = state.clone();
    next.level += 1;
    next.fleet = fleet::generate(&next.config, next.level, &mut next.next_enemy_id, rng);
    next.player.projectiles.clear();
    next.phase = Phase::Playing;
    info!(level = next.level, ships = next.fleet.len(), "level started");
    next
}

/// Space: whatever "continue" means in the current phase.
pub fn confirm(state: &Session, rng: &mut impl Rng) -> Session {
    match state.phase {
        Phase::Start => {
            let mut next = state.clone();
            next.phase = Phase::Playing;
            info!(level = next.level, ships = next.fleet.len(), "game started");
            next
        }
        Phase::Playing => player_shoot(state),
        Phase::LevelComplete => advance_level(state, rng),
        Phase::GameOver => {
            if state.score > 0 && state.leaderboard.qualifies(state.score) {
                let mut next = state.clone();
                next.phase = Phase::EnteringInitials;
                next.initials.clear();
                debug!(score = state.score, "score qualifies for leaderboard");
                next
            } else {
                restart(state, state.leaderboard.clone(), rng)
            }
        }
        Phase::EnteringInitials => state.clone(),
    }
}

pub fn push_initial(state: &Session, c: char) -> Session {
    if state.phase != Phase::EnteringInitials || state.initials.len() >= INITIALS_LEN {
        return state.clone();
    }
    match initial_letter(c) {
        Some(letter) => {
            let mut next = state.clone();
            next.initials.push(letter);
            next
        }
        None => state.clone(),
    }
}

pub fn pop_initial(state: &Session) -> Session {
    if state.phase != Phase::EnteringInitials {
        return state.clone();
    }
    let mut next = state.clone();
    next.initials.pop();
    next
}

/// Record the score under the collected initials and go back to the start
/// screen.  Needs at least one letter.
pub fn submit_initials(state: &Session, rng: &mut impl Rng) -> Session {
    if state.phase != Phase::EnteringInitials || state.initials.is_empty() {
        return state.clone();
    }
    let entry = LeaderboardEntry::new(state.initials.clone(), state.score);
    let (board, inserted) = state.leaderboard.insert(entry);
    info!(initials = %state.initials, score = state.score, inserted, "leaderboard entry");
    restart(state, board, rng)
}

/// Route a command to the transition for the current phase.  `Quit` is the
/// driver's business and leaves the session untouched.
pub fn handle_command(state: &Session, command: Command, rng: &mut impl Rng) -> Session {
    match command {
        Command::Steer(steer) => steer_player(state, steer),
        Command::Fire => player_shoot(state),
        Command::Confirm => confirm(state, rng),
        Command::Letter(c) => push_initial(state, c),
        Command::Backspace => pop_initial(state),
        Command::Submit => submit_initials(state, rng),
        Command::Quit => state.clone(),
    }
}

// ── Per-frame tick (RNG is injected) ───────────────────────────────

fn move_player(player: &mut PlayerShip, config: &GameConfig) {
    player.translate(player.velocity);
    player.clamp_tip(config.field_width * 0.1, config.field_width * 0.9);
}

fn move_projectiles(player: &mut PlayerShip, speed: f32) {
    for missile in player.projectiles.iter_mut() {
        missile.y -= speed;
    }
    player.projectiles.retain(|m| m.y >= 0.0);
}

/// Advance the simulation by one frame.  Does nothing outside `Playing`.
pub fn tick(state: &Session, rng: &mut impl Rng) -> Session {
    if state.phase != Phase::Playing {
        return state.clone();
    }
    let mut next = state.clone();
    next.frame += 1;
    let config = &next.config;

    // ── 1. Player & missiles ────────────────────────────────────────────────
    let was_exploding = next.player.is_exploding();
    if was_exploding {
        next.player.exploding -= 1;
    } else {
        move_player(&mut next.player, config);
    }
    move_projectiles(&mut next.player, config.missile_speed);

    // ── 2. Fleet ────────────────────────────────────────────────────────────
    if !was_exploding {
        fleet::roll_detachment(&mut next.fleet, next.level, config, rng);
    }
    fleet::advance(&mut next.fleet, &next.player, config);

    // ── 3. Collisions ───────────────────────────────────────────────────────
    next.score += collision::resolve_projectile_hits(&mut next.player, &mut next.fleet);
    collision::resolve_enemy_contacts(&mut next.player, &mut next.fleet, config);

    // ── 4. Phase ────────────────────────────────────────────────────────────
    if next.player.lives < 0 {
        next.phase = Phase::GameOver;
        info!(score = next.score, level = next.level, "game over");
    } else if next.fleet.is_empty() {
        next.phase = Phase::LevelComplete;
        info!(score = next.score, level = next.level, "level complete");
    }
    next
}
