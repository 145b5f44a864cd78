//! Fleet motion engine.
//!
//! The formation sways as one body; individual ships peel off to dive at the
//! player ("dropping"), wrap back in from the top once they miss, and steer
//! into their slot ("returning") relative to wherever the formation has
//! swayed to by then.  All randomness comes through the injected RNG.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::entities::{EnemyId, EnemyShip, EnemyStatus, Fleet, PlayerShip, Point};

/// Stand-in for a slope (or run) that would otherwise be zero.
const SLOPE_EPSILON: f32 = 1e-3;

// ── Fleet construction ───────────────────────────────────────────────────────

/// Ships per row for `level`.  Each row draws from a range whose upper end
/// grows with the level, so expected density never goes down.
pub fn row_counts(config: &GameConfig, level: u32, rng: &mut impl Rng) -> Vec<usize> {
    let low = config.min_row_ships;
    let high = (low + config.row_spread_per_level * level as usize)
        .min(config.max_row_ships)
        .max(low);
    (0..config.fleet_rows)
        .map(|_| rng.gen_range(low..=high))
        .collect()
}

/// Lay out a formation from explicit row counts.  Ids are taken from
/// `next_id`, which is advanced past the last one used.
pub fn layout(config: &GameConfig, rows: &[usize], next_id: &mut EnemyId) -> Fleet {
    let mut ships = Vec::with_capacity(rows.iter().sum());
    for (row, &count) in rows.iter().enumerate() {
        let y = config.row_spacing * (row + 1) as f32;
        for i in 0..count {
            let x = (i + 1) as f32 * config.field_width / (count + 1) as f32;
            ships.push(EnemyShip::new(
                *next_id,
                Point::new(x, y),
                config.enemy_width,
                config.enemy_value,
                config.sway_speed,
            ));
            *next_id += 1;
        }
    }
    Fleet::new(ships, config.sway_phase)
}

/// Build the fleet for `level`.
pub fn generate(
    config: &GameConfig,
    level: u32,
    next_id: &mut EnemyId,
    rng: &mut impl Rng,
) -> Fleet {
    let rows = row_counts(config, level, rng);
    let fleet = layout(config, &rows, next_id);
    debug!(level, ?rows, ships = fleet.len(), "fleet generated");
    fleet
}

// ── Detachment ───────────────────────────────────────────────────────────────

/// Send one ship diving at the player.
pub fn detach(ship: &mut EnemyShip, drop_speed: f32) {
    ship.status = EnemyStatus::Dropping;
    ship.vy = drop_speed;
}

/// Per-tick detachment roll.  Succeeds with probability
/// `drop_chance_per_level * level / drop_roll`, then picks one formation ship
/// uniformly.  Returns the id of the ship that broke away, if any.
pub fn roll_detachment(
    fleet: &mut Fleet,
    level: u32,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Option<EnemyId> {
    if fleet.is_empty() {
        return None;
    }
    let roll = rng.gen::<f32>() * config.drop_roll;
    if roll >= config.drop_chance_per_level * level as f32 {
        return None;
    }

    let candidates: Vec<usize> = fleet
        .ships
        .iter()
        .enumerate()
        .filter(|(_, s)| s.status == EnemyStatus::Formation)
        .map(|(i, _)| i)
        .collect();
    let &index = candidates.choose(rng)?;

    let ship = &mut fleet.ships[index];
    detach(ship, config.drop_speed);
    debug!(enemy = ship.id, "enemy dropping");
    Some(ship.id)
}

// ── Steering ─────────────────────────────────────────────────────────────────

/// Horizontal speed for a ship falling at `fall` per tick toward `target`:
/// `fall / slope`, clamped to `±max`.  Zero runs and zero slopes are replaced
/// by a small epsilon, so no alignment of ship and target can divide by zero.
pub fn pursuit_velocity(from: Point, target: Point, fall: f32, max: f32) -> f32 {
    let mut run = target.x - from.x;
    if run.abs() < SLOPE_EPSILON {
        run = SLOPE_EPSILON.copysign(run);
    }
    let mut slope = (target.y - from.y) / run;
    if slope.abs() < SLOPE_EPSILON {
        slope = SLOPE_EPSILON.copysign(slope);
    }
    (fall / slope).clamp(-max, max)
}

fn approach(current: f32, target: f32, step: f32, settled: f32) -> f32 {
    if current < target {
        step
    } else if current > target {
        -step
    } else {
        settled
    }
}

/// Where a returning ship's slot is right now: its home plus the live sway
/// displacement of the formation.
pub fn return_target(ship: &EnemyShip, displacement: Point) -> Point {
    ship.home.offset(displacement.x, displacement.y)
}

/// How far the formation has drifted from its home grid, measured on the
/// first ship still in formation.  Zero when none is.
pub fn formation_displacement(fleet: &Fleet) -> Point {
    fleet
        .ships
        .iter()
        .find(|s| s.status == EnemyStatus::Formation)
        .map(|s| Point::new(s.position.x - s.home.x, s.position.y - s.home.y))
        .unwrap_or_default()
}

/// Steer a returning ship one tick closer to `target`, snapping each axis
/// once it is inside `return_snap`.  On exact arrival the ship rejoins the
/// formation at the current sway speed.
fn steer_home(ship: &mut EnemyShip, target: Point, sway: f32, config: &GameConfig) {
    ship.vx = approach(ship.position.x, target.x, config.return_speed, sway);
    ship.vy = approach(ship.position.y, target.y, config.return_speed, 0.0);

    if (ship.position.x - target.x).abs() < config.return_snap {
        ship.position.x = target.x;
        ship.vx = sway;
    }
    if (ship.position.y - target.y).abs() < config.return_snap {
        ship.position.y = target.y;
        ship.vy = 0.0;
    }

    if ship.position == target {
        ship.status = EnemyStatus::Formation;
        debug!(enemy = ship.id, "enemy back in formation");
    }
}

// ── Per-tick motion ──────────────────────────────────────────────────────────

/// Advance every ship by one tick and run the sway timer.
pub fn advance(fleet: &mut Fleet, player: &PlayerShip, config: &GameConfig) {
    fleet.sway_timer += 1;
    let sway = fleet.sway_velocity(config.sway_speed);
    let displacement = formation_displacement(fleet);
    let aim = player.rear_midpoint();

    for ship in fleet.ships.iter_mut() {
        if ship.status == EnemyStatus::Formation {
            ship.vx = sway;
        }

        if ship.status == EnemyStatus::Dropping {
            ship.vx = pursuit_velocity(
                ship.position,
                aim,
                config.drop_speed,
                config.pursuit_max_speed,
            );
            // Missed: wrap to just above the top edge and head home.
            if ship.position.y > config.field_height {
                ship.position = Point::new(ship.position.x, -ship.width);
                ship.status = EnemyStatus::Returning;
                debug!(enemy = ship.id, "enemy returning");
            }
        }

        if ship.status == EnemyStatus::Returning {
            let target = return_target(ship, displacement);
            steer_home(ship, target, sway, config);
        }

        ship.position = ship.position.offset(ship.vx, ship.vy);
    }

    if fleet.sway_timer > config.sway_period {
        fleet.sway_right = !fleet.sway_right;
        fleet.sway_timer = 0;
    }
}

/// Put every surviving ship back in its home slot, moving with the current
/// sway direction.
pub fn regroup(fleet: &mut Fleet, config: &GameConfig) {
    let sway = fleet.sway_velocity(config.sway_speed);
    for ship in fleet.ships.iter_mut() {
        ship.rejoin(sway);
    }
}
