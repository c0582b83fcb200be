use stellar_conflict::assets::AssetCatalog;
use stellar_conflict::config::GameConfig;
use stellar_conflict::entities::*;
use stellar_conflict::events::{FrameEvent, SoundCue};
use stellar_conflict::input::{InputState, Key};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> GameState {
    GameState::new(GameConfig::default(), &AssetCatalog::standard(), 0)
}

fn make_player(state: &GameState) -> Player {
    Player::new(&state.config, &state.looks)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn player_starts_bottom_centre() {
    let s = make_state();
    let p = make_player(&s);
    assert_eq!(p.x, 400.0); // width / 2
    assert_eq!(p.y, 500.0); // height - 100
    assert_eq!(p.width, 72.0);
    assert!(!p.is_dashing);
}

#[test]
fn player_moves_at_base_speed() {
    let mut s = make_state();
    let mut p = make_player(&s);
    p.update(&mut s, &InputState::new().with(Key::Left));
    assert_eq!(p.x, 395.0);
    p.update(&mut s, &InputState::new().with(Key::Up));
    assert_eq!(p.y, 495.0);
}

#[test]
fn player_is_clamped_to_viewport() {
    let mut s = make_state();
    let mut p = make_player(&s);

    p.x = 2.0;
    p.update(&mut s, &InputState::new().with(Key::Left));
    assert_eq!(p.x, 0.0);

    p.x = 726.0;
    p.update(&mut s, &InputState::new().with(Key::Right));
    assert_eq!(p.x, 800.0 - 72.0);

    p.y = 600.0 - 72.0 - 1.0;
    p.update(&mut s, &InputState::new().with(Key::Down));
    assert_eq!(p.y, 600.0 - 72.0);
}

#[test]
fn dash_boosts_speed_and_sets_cooldown() {
    let mut s = make_state();
    let mut p = make_player(&s);
    p.update(&mut s, &InputState::new().with(Key::Dash).with(Key::Right));

    assert!(p.is_dashing);
    assert_eq!(p.current_speed, 15.0);
    assert_eq!(p.x, 415.0);
    assert_eq!(s.dash_cooldown, 100);
}

#[test]
fn dash_speed_eases_back_to_base() {
    let mut s = make_state();
    let mut p = make_player(&s);
    p.update(&mut s, &InputState::new().with(Key::Dash));
    let mut last = p.current_speed;
    for _ in 0..18 {
        p.update(&mut s, &InputState::new());
        assert!(p.current_speed < last);
        assert!(p.current_speed > 5.0);
        last = p.current_speed;
    }
    assert!(p.is_dashing);
    p.update(&mut s, &InputState::new());
    assert!(!p.is_dashing);
    p.update(&mut s, &InputState::new());
    assert_eq!(p.current_speed, 5.0);
}

#[test]
fn dash_needs_zero_cooldown() {
    let mut s = make_state();
    s.dash_cooldown = 3;
    let mut p = make_player(&s);
    p.update(&mut s, &InputState::new().with(Key::Dash));
    assert!(!p.is_dashing);
}

#[test]
fn trail_only_kept_while_dashing() {
    let mut s = make_state();
    let mut p = make_player(&s);
    let dash_right = InputState::new().with(Key::Dash).with(Key::Right);
    for _ in 0..10 {
        p.update(&mut s, &dash_right);
    }
    assert_eq!(p.trail.len(), p.trail_length);

    for _ in 0..20 {
        p.update(&mut s, &InputState::new());
    }
    assert!(p.trail.is_empty());
}

#[test]
fn shoot_spends_energy_and_fires_upwards() {
    let mut s = make_state();
    let p = make_player(&s);

    assert!(p.shoot(&mut s));
    assert_eq!(s.energy, 90.0);
    assert_eq!(s.projectiles.len(), 1);
    let shot = &s.projectiles[0];
    assert_eq!(shot.owner, ProjectileOwner::Player);
    assert_eq!(shot.speed, -10.0);
    assert_eq!((shot.x, shot.y), (400.0, 464.0));
    assert_eq!(s.stats.shots_fired, 1);
    assert!(s.events.contains(&FrameEvent::Sound(SoundCue::Laser)));
}

#[test]
fn shoot_fails_without_energy() {
    let mut s = make_state();
    s.energy = 9.0;
    let p = make_player(&s);
    assert!(!p.shoot(&mut s));
    assert!(s.projectiles.is_empty());
    assert_eq!(s.energy, 9.0);
}

#[test]
fn player_damage_never_drops_health_below_zero() {
    let mut s = make_state();
    let p = make_player(&s);

    assert!(!p.take_damage(15, &mut s));
    assert_eq!(s.health, 85);
    assert!(p.take_damage(500, &mut s));
    assert_eq!(s.health, 0);
    assert!(s
        .events
        .iter()
        .any(|e| matches!(e, FrameEvent::ScreenShake { .. })));
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[test]
fn enemy_survives_first_hit_dies_on_second() {
    let s = make_state();
    let mut e = Enemy::new(100.0, 100.0, 2.0, EnemyKind::Red, &s.config, &s.looks);
    assert_eq!(e.health, 45);

    assert!(!e.take_damage(25));
    assert_eq!(e.health, 20);
    assert!(e.is_alive());

    assert!(e.take_damage(25));
    assert!(!e.is_alive());
}

#[test]
fn dead_enemy_does_not_die_twice() {
    let s = make_state();
    let mut e = Enemy::new(100.0, 100.0, 2.0, EnemyKind::Green, &s.config, &s.looks);
    assert!(e.take_damage(100));
    assert!(!e.take_damage(25));
}

#[test]
fn enemy_spawns_above_the_top_edge() {
    let s = make_state();
    let mut rng = seeded_rng();
    for _ in 0..50 {
        let e = Enemy::spawn(&s.config, &s.looks, EnemyKind::Red, &mut rng);
        assert_eq!(e.y, -68.0);
        assert!(e.x >= 0.0 && e.x < 800.0 - 68.0);
        assert!(e.speed >= 2.0 && e.speed <= 4.0);
    }
}

#[test]
fn enemy_descends_and_rolls_to_shoot() {
    let s = make_state();
    let mut rng = seeded_rng();
    let mut e = Enemy::new(100.0, 100.0, 3.0, EnemyKind::Red, &s.config, &s.looks);

    let muzzle = e.update(&s.config.viewport, 1.0, &mut rng);
    assert_eq!(e.y, 103.0);
    assert_eq!(muzzle, Some((100.0, 103.0 + 34.0)));

    assert_eq!(e.update(&s.config.viewport, 0.0, &mut rng), None);
}

// ── Projectile ────────────────────────────────────────────────────────────────

#[test]
fn projectile_deactivates_past_the_top() {
    let s = make_state();
    let mut p = Projectile::new(0, 100.0, -20.0, ProjectileOwner::Player, &s.config, &s.looks);
    p.update(600.0);
    assert!(!p.active);
}

#[test]
fn enemy_projectile_deactivates_past_the_bottom() {
    let s = make_state();
    let mut p = Projectile::new(0, 100.0, 620.0, ProjectileOwner::Enemy, &s.config, &s.looks);
    assert!(p.active);
    p.update(600.0);
    assert!(!p.active);
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[test]
fn health_powerup_clamps_to_100() {
    let mut s = make_state();
    s.health = 90;
    let up = PowerUp::new(0.0, 0.0, PowerUpKind::Health, &s.config, &s.looks);
    up.apply_effect(&mut s);
    assert_eq!(s.health, 100);
    assert_eq!(s.stats.powerups_collected, 1);
}

#[test]
fn shield_powerup_can_exceed_100_up_to_150() {
    let mut s = make_state();
    let up = PowerUp::new(0.0, 0.0, PowerUpKind::Shield, &s.config, &s.looks);
    up.apply_effect(&mut s);
    assert_eq!(s.health, 150);
    up.apply_effect(&mut s);
    assert_eq!(s.health, 150);
}

#[test]
fn ammo_powerup_clamps_energy() {
    let mut s = make_state();
    s.energy = 150.0;
    let up = PowerUp::new(0.0, 0.0, PowerUpKind::Ammo, &s.config, &s.looks);
    up.apply_effect(&mut s);
    assert_eq!(s.energy, 200.0);
}

#[test]
fn powerup_falls_and_glows() {
    let s = make_state();
    let mut up = PowerUp::new(10.0, 10.0, PowerUpKind::Ammo, &s.config, &s.looks);
    up.update();
    assert_eq!(up.y, 11.0);
    assert!(up.glow > 0.0);
}

// ── Explosion ─────────────────────────────────────────────────────────────────

#[test]
fn explosion_completes_after_all_frames() {
    let s = make_state();
    let mut ex = Explosion::new(0.0, 0.0, &s.config, &s.looks);
    assert_eq!(ex.lifetime_ticks(), 27);
    for _ in 0..26 {
        ex.update();
    }
    assert!(!ex.is_complete);
    ex.update();
    assert!(ex.is_complete);
}

// ── Placeholders ──────────────────────────────────────────────────────────────

#[test]
fn missing_sprite_becomes_placeholder() {
    let mut assets = AssetCatalog::standard();
    assets.remove("enemyred");
    let s = GameState::new(GameConfig::default(), &assets, 0);
    let mut rng = seeded_rng();

    let mut e = Enemy::spawn(&s.config, &s.looks, EnemyKind::Red, &mut rng);
    assert!(e.appearance.placeholder);
    assert_eq!(e.appearance.frame_count, 1);

    let y = e.y;
    e.update(&s.config.viewport, 0.0, &mut rng);
    assert!(e.y > y);

    let green = Enemy::spawn(&s.config, &s.looks, EnemyKind::Green, &mut rng);
    assert!(!green.appearance.placeholder);
    assert_eq!(green.appearance.frame_count, 3);
}

#[test]
fn explosion_sprite_has_nine_frames() {
    let s = make_state();
    assert_eq!(s.looks.explosion.frame_count, 9);
    assert!(!s.looks.explosion.placeholder);
}
