//! Tuning constants and where they come from.
//!
//! Every gameplay number lives in `GameConfig`.  The defaults reproduce the
//! classic feel; a `fleet_shooter.toml` next to the binary (or the file named
//! by `FLEET_SHOOTER_CONFIG`) may override any subset of them.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{GameError, GameResult};

pub const CONFIG_ENV: &str = "FLEET_SHOOTER_CONFIG";
pub const SCORES_ENV: &str = "FLEET_SHOOTER_SCORES";
pub const DEFAULT_CONFIG_FILE: &str = "fleet_shooter.toml";

/// Number of entries kept on the leaderboard.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Maximum number of letters in a set of initials.
pub const INITIALS_LEN: usize = 3;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Play field ───────────────────────────────────────────────────────────
    pub field_width: f32,
    pub field_height: f32,
    pub ticks_per_second: u32,

    // ── Player ───────────────────────────────────────────────────────────────
    pub player_speed: f32,
    pub missile_speed: f32,
    pub starting_lives: i32,
    /// Ticks the player stays frozen (and untouchable) after a hit.
    pub explosion_ticks: u32,

    // ── Fleet motion ─────────────────────────────────────────────────────────
    pub sway_speed: f32,
    /// The sway direction flips once the timer exceeds this many ticks.
    pub sway_period: u32,
    /// Initial timer value; half the period centres the swing on the home grid.
    pub sway_phase: u32,
    pub drop_speed: f32,
    pub pursuit_max_speed: f32,
    pub return_speed: f32,
    pub return_snap: f32,
    /// A detachment happens when `uniform[0,1) * drop_roll < drop_chance_per_level * level`.
    pub drop_roll: f32,
    pub drop_chance_per_level: f32,

    // ── Fleet layout ─────────────────────────────────────────────────────────
    pub enemy_width: f32,
    pub enemy_value: u32,
    pub fleet_rows: usize,
    pub row_spacing: f32,
    pub min_row_ships: usize,
    pub row_spread_per_level: usize,
    pub max_row_ships: usize,

    // ── Files ────────────────────────────────────────────────────────────────
    pub leaderboard_path: Option<PathBuf>,
    pub log_file: PathBuf,
    /// Stars scattered across the background by the renderer.
    pub star_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 480.0,
            field_height: 600.0,
            ticks_per_second: 60,

            player_speed: 5.0,
            missile_speed: 7.0,
            starting_lives: 3,
            explosion_ticks: 60,

            sway_speed: 0.2,
            sway_period: 150,
            sway_phase: 75,
            drop_speed: 2.0,
            pursuit_max_speed: 2.0,
            return_speed: 1.0,
            return_snap: 10.0,
            drop_roll: 500.0,
            drop_chance_per_level: 2.0,

            enemy_width: 15.0,
            enemy_value: 10,
            fleet_rows: 4,
            row_spacing: 30.0,
            min_row_ships: 5,
            row_spread_per_level: 2,
            max_row_ships: 12,

            leaderboard_path: None,
            log_file: PathBuf::from("fleet_shooter.log"),
            star_count: 60,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("`{name}` must be a positive number, got {value}"))
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.ticks_per_second.max(1)))
    }

    /// Leaderboard location: `FLEET_SHOOTER_SCORES`, then the config file,
    /// then `$HOME/.fleet_shooter_scores`.
    pub fn scores_path(&self) -> PathBuf {
        if let Ok(path) = env::var(SCORES_ENV) {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.leaderboard_path {
            return path.clone();
        }
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".fleet_shooter_scores")
    }

    /// Reject values that would stall or break the simulation: non-positive
    /// or non-finite sizes and speeds, a zero period, inverted row bounds.
    pub fn validate(&self) -> Result<(), String> {
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("player_speed", self.player_speed)?;
        positive("missile_speed", self.missile_speed)?;
        positive("sway_speed", self.sway_speed)?;
        positive("drop_speed", self.drop_speed)?;
        positive("pursuit_max_speed", self.pursuit_max_speed)?;
        positive("return_speed", self.return_speed)?;
        positive("return_snap", self.return_snap)?;
        positive("drop_roll", self.drop_roll)?;
        positive("enemy_width", self.enemy_width)?;
        positive("row_spacing", self.row_spacing)?;
        if !(self.drop_chance_per_level.is_finite() && self.drop_chance_per_level >= 0.0) {
            return Err(format!(
                "`drop_chance_per_level` must be zero or more, got {}",
                self.drop_chance_per_level
            ));
        }
        // A step longer than the snap radius can overshoot the slot forever.
        if self.return_speed > self.return_snap {
            return Err(format!(
                "`return_speed` ({}) must not exceed `return_snap` ({})",
                self.return_speed, self.return_snap
            ));
        }
        if self.ticks_per_second == 0 {
            return Err("`ticks_per_second` must be at least 1".to_string());
        }
        if self.sway_period == 0 {
            return Err("`sway_period` must be at least 1".to_string());
        }
        if self.min_row_ships > self.max_row_ships {
            return Err(format!(
                "`min_row_ships` ({}) exceeds `max_row_ships` ({})",
                self.min_row_ships, self.max_row_ships
            ));
        }
        Ok(())
    }
}

/// Parse a config from TOML text.  Missing keys keep their defaults; values
/// that fail `GameConfig::validate` are an error.
pub fn parse(text: &str, origin: &Path) -> GameResult<GameConfig> {
    let config: GameConfig = toml::from_str(text).map_err(|source| GameError::Config {
        path: origin.to_path_buf(),
        source,
    })?;
    config
        .validate()
        .map_err(|message| GameError::InvalidConfig {
            path: origin.to_path_buf(),
            message,
        })?;
    Ok(config)
}

/// Load the config from `path`, falling back to defaults when the file is absent.
pub fn load_from(path: &Path) -> GameResult<GameConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let config = parse(&text, path)?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(GameConfig::default())
        }
        Err(source) => Err(GameError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the config from `FLEET_SHOOTER_CONFIG` or `./fleet_shooter.toml`.
pub fn load() -> GameResult<GameConfig> {
    let path = env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    load_from(&path)
}
