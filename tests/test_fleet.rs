use fleet_shooter::config::GameConfig;
use fleet_shooter::entities::*;
use fleet_shooter::fleet::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn make_fleet(rows: &[usize]) -> Fleet {
    let mut next_id = 0;
    layout(&GameConfig::default(), rows, &mut next_id)
}

fn player() -> PlayerShip {
    PlayerShip::new(&GameConfig::default())
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn layout_spaces_ships_evenly() {
    let mut next_id = 5;
    let fleet = layout(&GameConfig::default(), &[3, 1], &mut next_id);
    assert_eq!(fleet.len(), 4);
    assert_eq!(next_id, 9);

    let homes: Vec<Point> = fleet.ships.iter().map(|s| s.home).collect();
    assert_eq!(homes[0], Point::new(120.0, 30.0));
    assert_eq!(homes[1], Point::new(240.0, 30.0));
    assert_eq!(homes[2], Point::new(360.0, 30.0));
    assert_eq!(homes[3], Point::new(240.0, 60.0));

    let ids: Vec<EnemyId> = fleet.ships.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![5, 6, 7, 8]);
    assert!(fleet.ships.iter().all(|s| s.status == EnemyStatus::Formation));
    assert!(fleet.sway_right);
    assert_eq!(fleet.sway_timer, 75);
}

#[test]
fn row_counts_widen_with_level() {
    let config = GameConfig::default();
    let mut rng = seeded_rng();
    for _ in 0..50 {
        let rows = row_counts(&config, 1, &mut rng);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|&n| (5..=7).contains(&n)));
    }
    for _ in 0..50 {
        let rows = row_counts(&config, 3, &mut rng);
        assert!(rows.iter().all(|&n| (5..=11).contains(&n)));
    }
}

#[test]
fn row_counts_are_capped() {
    let config = GameConfig::default();
    let mut rng = seeded_rng();
    for _ in 0..50 {
        let rows = row_counts(&config, 40, &mut rng);
        assert!(rows.iter().all(|&n| (5..=12).contains(&n)));
    }
}

#[test]
fn generate_never_reuses_ids() {
    let config = GameConfig::default();
    let mut rng = seeded_rng();
    let mut next_id = 0;
    let first = generate(&config, 1, &mut next_id, &mut rng);
    let second = generate(&config, 2, &mut next_id, &mut rng);
    let max_first = first.ships.iter().map(|s| s.id).max().unwrap();
    assert!(second.ships.iter().all(|s| s.id > max_first));
    assert_eq!(next_id as usize, first.len() + second.len());
}

// ── Pursuit ───────────────────────────────────────────────────────────────────

#[test]
fn pursuit_steers_along_slope() {
    // run 40, rise 400 → slope 10 → 2 / 10
    let vx = pursuit_velocity(Point::new(200.0, 140.0), Point::new(240.0, 540.0), 2.0, 2.0);
    assert!(approx(vx, 0.2));
}

#[test]
fn pursuit_directly_below_is_finite() {
    let vx = pursuit_velocity(Point::new(240.0, 100.0), Point::new(240.0, 540.0), 2.0, 2.0);
    assert!(vx.is_finite());
    assert!(vx.abs() < 1e-3);
}

#[test]
fn pursuit_horizontally_aligned_is_clamped() {
    let right = pursuit_velocity(Point::new(100.0, 540.0), Point::new(240.0, 540.0), 2.0, 2.0);
    assert_eq!(right, 2.0);
    let left = pursuit_velocity(Point::new(300.0, 540.0), Point::new(240.0, 540.0), 2.0, 2.0);
    assert_eq!(left, -2.0);
}

#[test]
fn pursuit_on_top_of_target_is_finite() {
    let p = Point::new(240.0, 540.0);
    let vx = pursuit_velocity(p, p, 2.0, 2.0);
    assert!(vx.is_finite());
    assert!(vx.abs() <= 2.0);
}

// ── Sway ──────────────────────────────────────────────────────────────────────

#[test]
fn formation_drifts_with_sway() {
    let mut fleet = make_fleet(&[3]);
    advance(&mut fleet, &player(), &GameConfig::default());
    for ship in &fleet.ships {
        assert!(approx(ship.position.x, ship.home.x + 0.2));
        assert_eq!(ship.position.y, ship.home.y);
    }
    assert_eq!(fleet.sway_timer, 76);
}

#[test]
fn sway_flips_after_period() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[2]);
    let p = player();
    for _ in 0..75 {
        advance(&mut fleet, &p, &config);
    }
    assert!(fleet.sway_right);
    advance(&mut fleet, &p, &config);
    assert!(!fleet.sway_right);
    assert_eq!(fleet.sway_timer, 0);

    // Next tick moves left.
    let x = fleet.ships[0].position.x;
    advance(&mut fleet, &p, &config);
    assert!(approx(fleet.ships[0].position.x, x - 0.2));
}

#[test]
fn all_formation_ships_share_sway_speed() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[4, 4]);
    fleet.sway_right = false;
    advance(&mut fleet, &player(), &config);
    assert!(fleet.ships.iter().all(|s| s.vx == -0.2));
}

// ── Dropping & returning ──────────────────────────────────────────────────────

#[test]
fn dropping_ship_falls_and_pursues() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[3]);
    detach(&mut fleet.ships[0], config.drop_speed);
    let before = fleet.ships[0].position;
    advance(&mut fleet, &player(), &config);

    let ship = &fleet.ships[0];
    assert_eq!(ship.status, EnemyStatus::Dropping);
    assert!(approx(ship.position.y, before.y + 2.0));
    // Player is to the right of the left-most ship.
    assert!(ship.vx > 0.0 && ship.vx <= 2.0);
}

#[test]
fn dropping_ship_past_bottom_wraps_and_returns() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[2]);
    detach(&mut fleet.ships[0], config.drop_speed);
    fleet.ships[0].position = Point::new(120.0, 601.0);

    advance(&mut fleet, &player(), &config);

    let ship = &fleet.ships[0];
    assert_eq!(ship.status, EnemyStatus::Returning);
    // Wrapped to -width, then one unit-speed step down toward its slot.
    assert!(approx(ship.position.y, -14.0));
    assert_eq!(ship.vy, 1.0);
}

#[test]
fn returning_ship_steps_at_unit_speed() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[2]);
    let home = fleet.ships[0].home;
    fleet.ships[0].status = EnemyStatus::Returning;
    fleet.ships[0].position = home.offset(50.0, 50.0);

    advance(&mut fleet, &player(), &config);

    let ship = &fleet.ships[0];
    assert_eq!(ship.status, EnemyStatus::Returning);
    assert_eq!(ship.position, home.offset(49.0, 49.0));
}

#[test]
fn returning_ship_snaps_and_rejoins() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[2]);
    let home = fleet.ships[0].home;
    fleet.ships[0].status = EnemyStatus::Returning;
    fleet.ships[0].position = home.offset(3.0, 4.0);

    advance(&mut fleet, &player(), &config);

    let ship = &fleet.ships[0];
    assert_eq!(ship.status, EnemyStatus::Formation);
    assert_eq!(ship.vx, 0.2);
    assert_eq!(ship.vy, 0.0);
    assert!(approx(ship.position.x, home.x + 0.2));
    assert_eq!(ship.position.y, home.y);
}

#[test]
fn return_target_follows_live_sway() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[2]);
    let home = fleet.ships[0].home;
    // The formation has drifted 5 units right since the fleet spawned.
    let other_home = fleet.ships[1].home;
    fleet.ships[1].position = other_home.offset(5.0, 0.0);
    fleet.ships[0].status = EnemyStatus::Returning;
    fleet.ships[0].position = home.offset(8.0, 0.0);

    assert_eq!(formation_displacement(&fleet), Point::new(5.0, 0.0));
    advance(&mut fleet, &player(), &config);

    let ship = &fleet.ships[0];
    assert_eq!(ship.status, EnemyStatus::Formation);
    assert!(approx(ship.position.x, home.x + 5.2));
    assert!(approx(fleet.ships[1].position.x, other_home.x + 5.2));
}

#[test]
fn formation_displacement_is_zero_without_formation() {
    let mut fleet = make_fleet(&[2]);
    for ship in fleet.ships.iter_mut() {
        ship.status = EnemyStatus::Dropping;
        ship.position = ship.home.offset(40.0, 40.0);
    }
    assert_eq!(formation_displacement(&fleet), Point::default());
}

// ── Detachment ────────────────────────────────────────────────────────────────

#[test]
fn detachment_roll_can_fire() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[3, 3]);
    // Level high enough that every roll succeeds.
    let id = roll_detachment(&mut fleet, 1000, &config, &mut seeded_rng());
    let id = id.expect("a ship should drop");
    let ship = fleet.get(id).unwrap();
    assert_eq!(ship.status, EnemyStatus::Dropping);
    assert_eq!(ship.vy, 2.0);
    assert_eq!(fleet.count(EnemyStatus::Dropping), 1);
}

#[test]
fn detachment_never_fires_at_zero_chance() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[3, 3]);
    let mut rng = seeded_rng();
    for _ in 0..1000 {
        assert!(roll_detachment(&mut fleet, 0, &config, &mut rng).is_none());
    }
    assert_eq!(fleet.count(EnemyStatus::Formation), 6);
}

#[test]
fn detachment_only_picks_formation_ships() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[4]);
    for ship in fleet.ships.iter_mut().take(3) {
        ship.status = EnemyStatus::Returning;
    }
    let id = roll_detachment(&mut fleet, 1000, &config, &mut seeded_rng());
    assert_eq!(id, Some(fleet.ships[3].id));
    assert_eq!(fleet.count(EnemyStatus::Returning), 3);

    // Nobody left in formation: nothing to pick.
    assert!(roll_detachment(&mut fleet, 1000, &config, &mut seeded_rng()).is_none());
}

#[test]
fn detachment_on_empty_fleet() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[]);
    assert!(roll_detachment(&mut fleet, 1000, &config, &mut seeded_rng()).is_none());
}

#[test]
fn detachment_rate_scales_with_level() {
    let config = GameConfig::default();
    let mut rng = seeded_rng();
    let mut drops = [0usize; 2];
    for (slot, level) in [(0, 1), (1, 20)] {
        for _ in 0..5000 {
            let mut fleet = make_fleet(&[1]);
            if roll_detachment(&mut fleet, level, &config, &mut rng).is_some() {
                drops[slot] += 1;
            }
        }
    }
    // Expected ≈ 20 vs ≈ 400 of 5000.
    assert!(drops[0] < 60);
    assert!(drops[1] > 250);
}

// ── Regroup ───────────────────────────────────────────────────────────────────

#[test]
fn regroup_resyncs_to_current_sway() {
    let config = GameConfig::default();
    let mut fleet = make_fleet(&[3]);
    detach(&mut fleet.ships[1], config.drop_speed);
    fleet.ships[2].status = EnemyStatus::Returning;
    for ship in fleet.ships.iter_mut() {
        ship.position = ship.home.offset(17.0, 90.0);
    }
    fleet.sway_right = false;

    regroup(&mut fleet, &config);

    for ship in &fleet.ships {
        assert_eq!(ship.position, ship.home);
        assert_eq!(ship.status, EnemyStatus::Formation);
        assert_eq!(ship.vx, -0.2);
        assert_eq!(ship.vy, 0.0);
    }
}
