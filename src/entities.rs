//! All game entity types: plain data plus the small accessors the
//! engines share.  World space is continuous: x grows rightward, y grows
//! downward, and anything with y < 0 is above the top edge.

use std::collections::BTreeSet;

use crate::config::GameConfig;
use crate::leaderboard::Leaderboard;

/// Session-unique enemy identifier.  Never reused, even across levels.
pub type EnemyId = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

// ── Phases & commands ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Playing,
    LevelComplete,
    GameOver,
    EnteringInitials,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    Idle,
}

/// Everything the driver can ask the core to do.  Key translation happens
/// outside the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Steer(Steer),
    Fire,
    /// Space: start the game, advance a level, leave the game-over screen.
    Confirm,
    Letter(char),
    Backspace,
    /// Enter: commit the collected initials.
    Submit,
    Quit,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
}

impl Projectile {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerShip {
    /// Tip, rear-left, rear-right.  Every move translates all three.
    pub vertices: [Point; 3],
    /// Horizontal velocity per tick.
    pub velocity: f32,
    pub lives: i32,
    /// Enemies that have already cost a life.
    pub hits: BTreeSet<EnemyId>,
    pub projectiles: Vec<Projectile>,
    /// Ticks left in the explosion; movement, firing and contact are off meanwhile.
    pub exploding: u32,
}

impl PlayerShip {
    pub fn new(config: &GameConfig) -> Self {
        let (w, h) = (config.field_width, config.field_height);
        Self {
            vertices: [
                Point::new(w * 0.5, h * 0.85),
                Point::new(w * 0.47, h * 0.9),
                Point::new(w * 0.53, h * 0.9),
            ],
            velocity: 0.0,
            lives: config.starting_lives,
            hits: BTreeSet::new(),
            projectiles: Vec::new(),
            exploding: 0,
        }
    }

    pub fn tip(&self) -> Point {
        self.vertices[0]
    }

    /// Midpoint of the two rear vertices: the pursuit target and contact point.
    pub fn rear_midpoint(&self) -> Point {
        let [_, left, right] = self.vertices;
        Point::new((left.x + right.x) / 2.0, (left.y + right.y) / 2.0)
    }

    pub fn hitbox_height(&self) -> f32 {
        self.vertices[1].y - self.vertices[0].y
    }

    pub fn translate(&mut self, dx: f32) {
        for v in self.vertices.iter_mut() {
            v.x += dx;
        }
    }

    /// Shift the whole triangle so the tip lies within `[min_x, max_x]`.
    pub fn clamp_tip(&mut self, min_x: f32, max_x: f32) {
        let tip = self.tip().x;
        if tip < min_x {
            self.translate(min_x - tip);
        } else if tip > max_x {
            self.translate(max_x - tip);
        }
    }

    pub fn is_exploding(&self) -> bool {
        self.exploding > 0
    }

    /// Record contact with `enemy`.  Returns `true` only the first time a
    /// given enemy is seen, which is also the only time a life is lost.
    pub fn register_hit(&mut self, enemy: EnemyId) -> bool {
        if self.hits.insert(enemy) {
            self.lives -= 1;
            true
        } else {
            false
        }
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Which behaviour drives an enemy this tick.  Exactly one at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStatus {
    Formation,
    Dropping,
    Returning,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyShip {
    pub id: EnemyId,
    /// Top-left corner of the square bounding box.
    pub position: Point,
    /// Formation slot the ship was generated at.
    pub home: Point,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub value: u32,
    pub status: EnemyStatus,
}

impl EnemyShip {
    pub fn new(id: EnemyId, home: Point, width: f32, value: u32, sway: f32) -> Self {
        Self {
            id,
            position: home,
            home,
            vx: sway,
            vy: 0.0,
            width,
            value,
            status: EnemyStatus::Formation,
        }
    }

    pub fn center(&self) -> Point {
        self.position.offset(self.width / 2.0, self.width / 2.0)
    }

    /// Strict containment in the square bounding box.
    pub fn contains(&self, p: Point) -> bool {
        let Point { x, y } = self.position;
        x < p.x && p.x < x + self.width && y < p.y && p.y < y + self.width
    }

    /// Put the ship back in its slot, moving with the fleet again.
    pub fn rejoin(&mut self, sway: f32) {
        self.position = self.home;
        self.vx = sway;
        self.vy = 0.0;
        self.status = EnemyStatus::Formation;
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Fleet {
    pub ships: Vec<EnemyShip>,
    /// `true` while the formation drifts rightward.
    pub sway_right: bool,
    pub sway_timer: u32,
}

impl Fleet {
    pub fn new(ships: Vec<EnemyShip>, sway_phase: u32) -> Self {
        Self {
            ships,
            sway_right: true,
            sway_timer: sway_phase,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    /// Signed horizontal sway speed for the current direction.
    pub fn sway_velocity(&self, speed: f32) -> f32 {
        if self.sway_right {
            speed
        } else {
            -speed
        }
    }

    pub fn get(&self, id: EnemyId) -> Option<&EnemyShip> {
        self.ships.iter().find(|s| s.id == id)
    }

    /// Remove a ship by id.  Removing a ship that is already gone is a no-op.
    pub fn remove(&mut self, id: EnemyId) -> Option<EnemyShip> {
        let index = self.ships.iter().position(|s| s.id == id)?;
        Some(self.ships.remove(index))
    }

    pub fn count(&self, status: EnemyStatus) -> usize {
        self.ships.iter().filter(|s| s.status == status).count()
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// One game session, owned by the driver and handed to every subsystem.
/// Cloneable so the top-level update functions can return a fresh copy.
#[derive(Clone, Debug)]
pub struct Session {
    pub config: GameConfig,
    pub phase: Phase,
    pub player: PlayerShip,
    pub fleet: Fleet,
    pub score: u32,
    pub level: u32,
    pub frame: u64,
    pub next_enemy_id: EnemyId,
    /// Letters collected on the initials screen.
    pub initials: String,
    pub leaderboard: Leaderboard,
}
