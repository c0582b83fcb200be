//! Playing-state coordinator: one fixed simulation tick.
//!
//! [`tick`] mutates the session's [`GameState`] and the player in a fixed
//! order; collision passes always see this tick's positions. All randomness
//! comes through `rng` and all time through `now` (ms), so callers control
//! determinism.

use rand::Rng;

use crate::collision::overlaps;
use crate::combo;
use crate::entities::{Enemy, EnemyKind, GameState, Player, PowerUp, PowerUpKind, ProjectileOwner};
use crate::events::{FrameEvent, SoundCue};
use crate::input::{InputState, Key};

/// Sparks per destroyed ship.
const BURST_PARTICLES: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// Health reached zero during this tick; `is_game_over` is now set.
    PlayerDestroyed,
    /// The session had already ended; only cosmetics advanced.
    AlreadyOver,
}

/// Advance the session by one frame.
pub fn tick(
    state: &mut GameState,
    player: &mut Player,
    input: &InputState,
    now: u64,
    rng: &mut impl Rng,
) -> TickOutcome {
    if state.is_game_over {
        advance_cosmetics(state);
        return TickOutcome::AlreadyOver;
    }
    state.stats.frames_survived += 1;

    // ── 1. Cooldowns ─────────────────────────────────────────────────────────
    if input.is_pressed(Key::Fire) && state.shoot_cooldown == 0 && player.shoot(state) {
        state.shoot_cooldown = state.config.player.shoot_cooldown;
    }
    state.shoot_cooldown = state.shoot_cooldown.saturating_sub(1);
    state.dash_cooldown = state.dash_cooldown.saturating_sub(1);

    // ── 2. Spawn ─────────────────────────────────────────────────────────────
    spawn_enemies(state, now, rng);

    // ── 3. Player ────────────────────────────────────────────────────────────
    player.update(state, input);
    if player.is_dashing {
        state.particles.trail(player.x, player.y + player.height / 2.0, rng);
    }

    // ── 4. Enemies ───────────────────────────────────────────────────────────
    update_enemies(state, rng);

    // ── 5. Projectiles ───────────────────────────────────────────────────────
    let viewport_height = state.config.viewport.height;
    state.projectile_pool.reclaim_from(&mut state.projectiles, |p| {
        p.update(viewport_height);
        p.active
    });

    // ── 6. Player projectiles ↔ enemies ──────────────────────────────────────
    resolve_player_hits(state, now, rng);

    // ── 7. Enemy projectiles ↔ player ────────────────────────────────────────
    resolve_enemy_hits(state, player);

    // Projectiles spent in a hit leave the world this tick.
    state.projectile_pool.reclaim_from(&mut state.projectiles, |p| p.active);

    // ── 8. Power-ups ─────────────────────────────────────────────────────────
    collect_powerups(state, player, rng);

    // ── 9. Explosions ────────────────────────────────────────────────────────
    advance_cosmetics(state);

    // ── 10. Energy regeneration ──────────────────────────────────────────────
    let regen = state.config.player.energy_regen;
    state.regen_energy(regen);

    log::trace!(
        "tick now={now} enemies={} projectiles={} powerups={} explosions={}",
        state.enemies.len(),
        state.projectiles.len(),
        state.powerups.len(),
        state.explosions.len()
    );

    // ── 11. Game over ────────────────────────────────────────────────────────
    if state.health <= 0 {
        state.is_game_over = true;
        state.spawn_explosion(player.x, player.y);
        state.particles.burst(player.x, player.y, BURST_PARTICLES, rng);
        state.events.push(FrameEvent::ScreenShake { intensity: 2.0 });
        state.events.push(FrameEvent::Sound(SoundCue::Explosion));
        log::info!("Player destroyed, final score {}", state.score);
        return TickOutcome::PlayerDestroyed;
    }

    TickOutcome::Running
}

/// Animate explosions and particles only. Safe to call while paused or after game over.
pub fn advance_cosmetics(state: &mut GameState) {
    state.explosion_pool.reclaim_from(&mut state.explosions, |e| {
        e.update();
        !e.is_complete
    });
    state.particles.update();
}

/// One enemy per elapsed spawn interval of wall-clock time, 50/50 between the two kinds.
pub fn spawn_enemies(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    if now.saturating_sub(state.last_spawn_time) <= state.spawn_interval {
        return;
    }
    let kind = if rng.gen_bool(0.5) {
        EnemyKind::Red
    } else {
        EnemyKind::Green
    };
    let enemy = Enemy::spawn(&state.config, &state.looks, kind, rng);
    log::debug!("Spawned {:?} enemy at x={:.0}", kind, enemy.x);
    state.enemies.push(enemy);
    state.last_spawn_time = now;
}

/// Move every live enemy, drop the destroyed and the ones past the bottom
/// edge, and put this tick's enemy shots into the world.
fn update_enemies(state: &mut GameState, rng: &mut impl Rng) {
    let viewport = state.config.viewport.clone();
    let shoot_chance = state.config.enemy.shoot_chance;
    let mut shots = Vec::new();

    state.enemies.retain_mut(|enemy| {
        if !enemy.is_alive() {
            return false;
        }
        if let Some(muzzle) = enemy.update(&viewport, shoot_chance, rng) {
            shots.push(muzzle);
        }
        enemy.y < viewport.height
    });

    for (x, y) in shots {
        state.fire_projectile(x, y, ProjectileOwner::Enemy);
    }
}

/// First match wins: a projectile stops at the first live enemy it overlaps,
/// in enemy list order.
fn resolve_player_hits(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    let damage = state.config.projectile.damage;

    for pi in 0..state.projectiles.len() {
        if state.projectiles[pi].owner != ProjectileOwner::Player {
            continue;
        }
        for ei in 0..state.enemies.len() {
            let projectile = &state.projectiles[pi];
            if !projectile.active {
                break;
            }
            let enemy = &state.enemies[ei];
            if !enemy.is_alive() || !overlaps(projectile, enemy) {
                continue;
            }
            let (hit_x, hit_y) = (projectile.x, projectile.y);
            state.projectiles[pi].deactivate();
            state.stats.shots_hit += 1;
            state.events.push(FrameEvent::HitEffect {
                x: hit_x,
                y: hit_y,
                owner: ProjectileOwner::Player,
            });
            damage_enemy(state, ei, damage, now, rng);
        }
    }
}

/// Apply a hit to `state.enemies[index]`. Returns true when the hit destroyed it.
///
/// A lethal hit pays out the combo reward, starts an explosion and may drop a
/// power-up. The enemy itself leaves the list on the next enemy pass.
pub fn damage_enemy(
    state: &mut GameState,
    index: usize,
    amount: i32,
    now: u64,
    rng: &mut impl Rng,
) -> bool {
    let enemy = &mut state.enemies[index];
    let destroyed = enemy.take_damage(amount);
    let (x, y) = (enemy.x, enemy.y);
    state.events.push(FrameEvent::DamageNumber { x, y, amount });

    if destroyed {
        let reward = combo::register_kill(state, now);
        state.stats.enemies_defeated += 1;
        log::debug!(
            "Enemy destroyed: combo={} multiplier={} score={}",
            reward.combo_count,
            reward.multiplier,
            state.score
        );
        state.spawn_explosion(x, y);
        state.particles.burst(x, y, BURST_PARTICLES, rng);
        state.events.push(FrameEvent::ScreenShake { intensity: 1.0 });
        state.events.push(FrameEvent::Sound(SoundCue::Explosion));
        try_drop_powerup(state, x, y, rng);
    }
    destroyed
}

fn try_drop_powerup(state: &mut GameState, x: f32, y: f32, rng: &mut impl Rng) {
    if rng.gen::<f64>() >= state.config.powerup.drop_chance {
        return;
    }
    let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
    let powerup = PowerUp::new(x, y, kind, &state.config, &state.looks);
    state.powerups.push(powerup);
}

fn resolve_enemy_hits(state: &mut GameState, player: &Player) {
    let damage = state.config.enemy.damage;

    for pi in 0..state.projectiles.len() {
        let projectile = &state.projectiles[pi];
        if projectile.owner != ProjectileOwner::Enemy
            || !projectile.active
            || !overlaps(projectile, player)
        {
            continue;
        }
        let (hit_x, hit_y) = (projectile.x, projectile.y);
        state.projectiles[pi].deactivate();
        state.events.push(FrameEvent::HitEffect {
            x: hit_x,
            y: hit_y,
            owner: ProjectileOwner::Enemy,
        });
        player.take_damage(damage, state);
    }
}

fn collect_powerups(state: &mut GameState, player: &Player, rng: &mut impl Rng) {
    let mut collected = Vec::new();
    let bottom = state.config.viewport.height;

    state.powerups.retain_mut(|powerup| {
        powerup.update();
        if overlaps(&*powerup, player) {
            collected.push(powerup.clone());
            return false;
        }
        powerup.y < bottom + powerup.height
    });

    for powerup in collected {
        powerup.apply_effect(state);
        state.particles.sparkles(powerup.x, powerup.y, rng);
    }
}
