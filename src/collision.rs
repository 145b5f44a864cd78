//! Collision engine: missiles against enemies, diving enemies against the
//! player.  Both passes collect every hit first and apply the side effects
//! afterwards, so several independent hits can resolve in one tick.

use tracing::info;

use crate::config::GameConfig;
use crate::entities::{EnemyId, EnemyStatus, Fleet, PlayerShip};
use crate::fleet;

/// What the enemy-player pass did this tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactReport {
    /// Ships that rammed the player and were destroyed.
    pub colliders: Vec<EnemyId>,
    pub lives_lost: u32,
}

impl ContactReport {
    pub fn is_hit(&self) -> bool {
        !self.colliders.is_empty()
    }
}

/// Missile against enemy bounding box.  Each missile destroys at most one
/// ship and each ship is destroyed at most once.  Returns the points earned.
pub fn resolve_projectile_hits(player: &mut PlayerShip, fleet: &mut Fleet) -> u32 {
    let mut destroyed: Vec<EnemyId> = Vec::new();
    let mut gained = 0;

    player.projectiles.retain(|missile| {
        let target = fleet
            .ships
            .iter()
            .find(|s| !destroyed.contains(&s.id) && s.contains(missile.position()));
        match target {
            Some(ship) => {
                destroyed.push(ship.id);
                gained += ship.value;
                false
            }
            None => true,
        }
    });

    for id in destroyed {
        fleet.remove(id);
    }
    gained
}

/// Diving ships against the player.  Contact is a distance test between the
/// ship's centre and the player's rear midpoint, against
/// `1.5 * width / 2 + hitbox_height / 2`.
///
/// Every colliding ship is removed and costs one life the first time it is
/// seen.  The player then explodes and, if any ships survive, the whole
/// fleet regroups at its home slots.  Nothing is tested while the player is
/// already exploding.
pub fn resolve_enemy_contacts(
    player: &mut PlayerShip,
    fleet: &mut Fleet,
    config: &GameConfig,
) -> ContactReport {
    if player.is_exploding() {
        return ContactReport::default();
    }

    let contact = player.rear_midpoint();
    let player_reach = player.hitbox_height() / 2.0;
    let colliders: Vec<EnemyId> = fleet
        .ships
        .iter()
        .filter(|s| s.status == EnemyStatus::Dropping)
        .filter(|s| s.center().distance(contact) < 1.5 * s.width / 2.0 + player_reach)
        .map(|s| s.id)
        .collect();

    if colliders.is_empty() {
        return ContactReport::default();
    }

    let mut lives_lost = 0;
    for &id in &colliders {
        fleet.remove(id);
        if player.register_hit(id) {
            lives_lost += 1;
        }
    }

    player.exploding = config.explosion_ticks;
    player.velocity = 0.0;
    if !fleet.is_empty() {
        fleet::regroup(fleet, config);
    }

    info!(
        colliders = ?colliders,
        lives_lost,
        lives = player.lives,
        survivors = fleet.len(),
        "player hit"
    );
    ContactReport {
        colliders,
        lives_lost,
    }
}
