use fleet_shooter::config::GameConfig;
use fleet_shooter::entities::*;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn ship_at(id: EnemyId, x: f32, y: f32) -> EnemyShip {
    EnemyShip::new(id, Point::new(x, y), 15.0, 10, 0.2)
}

// ── PlayerShip ────────────────────────────────────────────────────────────────

#[test]
fn player_starts_centred_near_bottom() {
    let p = PlayerShip::new(&GameConfig::default());
    assert!(approx(p.tip().x, 240.0));
    assert!(approx(p.tip().y, 510.0));
    assert!(approx(p.vertices[1].x, 225.6));
    assert!(approx(p.vertices[2].x, 254.4));
    assert_eq!(p.lives, 3);
    assert!(p.projectiles.is_empty());
    assert!(!p.is_exploding());
}

#[test]
fn rear_midpoint_and_hitbox() {
    let p = PlayerShip::new(&GameConfig::default());
    let mid = p.rear_midpoint();
    assert!(approx(mid.x, 240.0));
    assert!(approx(mid.y, 540.0));
    assert!(approx(p.hitbox_height(), 30.0));
}

#[test]
fn translate_moves_every_vertex() {
    let mut p = PlayerShip::new(&GameConfig::default());
    let before = p.vertices;
    p.translate(-12.5);
    for (old, new) in before.iter().zip(p.vertices.iter()) {
        assert!(approx(new.x, old.x - 12.5));
        assert_eq!(new.y, old.y);
    }
}

#[test]
fn clamp_tip_keeps_triangle_shape() {
    let mut p = PlayerShip::new(&GameConfig::default());
    p.translate(-1000.0);
    p.clamp_tip(48.0, 432.0);
    assert!(approx(p.tip().x, 48.0));
    assert!(approx(p.vertices[1].x, 48.0 - 14.4));
    assert!(approx(p.vertices[2].x, 48.0 + 14.4));

    p.translate(2000.0);
    p.clamp_tip(48.0, 432.0);
    assert!(approx(p.tip().x, 432.0));
}

#[test]
fn register_hit_counts_each_enemy_once() {
    let mut p = PlayerShip::new(&GameConfig::default());
    assert!(p.register_hit(7));
    assert!(!p.register_hit(7));
    assert_eq!(p.lives, 2);
    assert!(p.register_hit(8));
    assert_eq!(p.lives, 1);
    assert_eq!(p.hits.len(), 2);
}

// ── EnemyShip ─────────────────────────────────────────────────────────────────

#[test]
fn enemy_starts_in_formation_at_home() {
    let e = ship_at(1, 100.0, 30.0);
    assert_eq!(e.status, EnemyStatus::Formation);
    assert_eq!(e.position, e.home);
    assert_eq!(e.vx, 0.2);
    assert_eq!(e.vy, 0.0);
    assert_eq!(e.center(), Point::new(107.5, 37.5));
}

#[test]
fn enemy_bounding_box_is_strict() {
    let e = ship_at(1, 100.0, 100.0);
    assert!(e.contains(Point::new(107.0, 107.0)));
    assert!(!e.contains(Point::new(100.0, 107.0))); // left edge
    assert!(!e.contains(Point::new(115.0, 107.0))); // right edge
    assert!(!e.contains(Point::new(107.0, 115.0))); // bottom edge
    assert!(!e.contains(Point::new(90.0, 90.0)));
}

#[test]
fn rejoin_resets_slot_and_velocity() {
    let mut e = ship_at(1, 100.0, 30.0);
    e.position = Point::new(300.0, 400.0);
    e.status = EnemyStatus::Dropping;
    e.vx = 1.7;
    e.vy = 2.0;
    e.rejoin(-0.2);
    assert_eq!(e.position, e.home);
    assert_eq!(e.status, EnemyStatus::Formation);
    assert_eq!(e.vx, -0.2);
    assert_eq!(e.vy, 0.0);
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

#[test]
fn removing_a_missing_ship_is_a_no_op() {
    let mut fleet = Fleet::new(vec![ship_at(1, 10.0, 10.0), ship_at(2, 40.0, 10.0)], 75);
    assert!(fleet.remove(1).is_some());
    assert!(fleet.remove(1).is_none());
    assert_eq!(fleet.len(), 1);
    assert!(fleet.get(2).is_some());
}

#[test]
fn sway_velocity_follows_direction() {
    let mut fleet = Fleet::new(Vec::new(), 75);
    assert!(fleet.sway_right);
    assert_eq!(fleet.sway_velocity(0.2), 0.2);
    fleet.sway_right = false;
    assert_eq!(fleet.sway_velocity(0.2), -0.2);
}

#[test]
fn count_by_status() {
    let mut fleet = Fleet::new(
        vec![ship_at(1, 10.0, 10.0), ship_at(2, 40.0, 10.0), ship_at(3, 70.0, 10.0)],
        75,
    );
    fleet.ships[0].status = EnemyStatus::Dropping;
    fleet.ships[2].status = EnemyStatus::Returning;
    assert_eq!(fleet.count(EnemyStatus::Formation), 1);
    assert_eq!(fleet.count(EnemyStatus::Dropping), 1);
    assert_eq!(fleet.count(EnemyStatus::Returning), 1);
}

#[test]
fn point_distance() {
    assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    assert_eq!(Point::new(1.0, 2.0).offset(2.0, -1.0), Point::new(3.0, 1.0));
}
