//! Game entities and the per-run game state record.
//!
//! Every `update` advances exactly one fixed tick; nothing here is scaled by
//! elapsed time. Entities never hold a reference back to [`GameState`]; it
//! is passed in where an entity needs it.

use std::collections::VecDeque;

use rand::Rng;

use crate::assets::{Appearance, AssetProvider};
use crate::collision::{Bounds, Rect};
use crate::config::{GameConfig, ViewportConfig};
use crate::events::{FrameEvent, SoundCue};
use crate::input::{InputState, Key};
use crate::particles::ParticleSystem;
use crate::pool::ObjectPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Red,
    Green,
}

impl EnemyKind {
    pub fn sprite_key(self) -> &'static str {
        match self {
            EnemyKind::Red => "enemyred",
            EnemyKind::Green => "enemygreen",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    Health,
    Shield,
    Ammo,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Health, PowerUpKind::Shield, PowerUpKind::Ammo];

    pub fn image_key(self) -> &'static str {
        match self {
            PowerUpKind::Health => "powerup_health",
            PowerUpKind::Shield => "powerup_shield",
            PowerUpKind::Ammo => "powerup_ammo",
        }
    }
}

// ── Resolved appearances ──────────────────────────────────────────────────────

/// Appearances looked up once per session so spawning never touches the asset provider.
#[derive(Clone, Debug)]
pub struct Looks {
    pub player: Appearance,
    pub enemy_red: Appearance,
    pub enemy_green: Appearance,
    pub explosion: Appearance,
    pub laser: Appearance,
    pub plasma: Appearance,
    pub powerup_health: Appearance,
    pub powerup_shield: Appearance,
    pub powerup_ammo: Appearance,
}

impl Looks {
    pub fn resolve(assets: &dyn AssetProvider) -> Self {
        Self {
            player: Appearance::sprite(assets, "playerBlue"),
            enemy_red: Appearance::sprite(assets, EnemyKind::Red.sprite_key()),
            enemy_green: Appearance::sprite(assets, EnemyKind::Green.sprite_key()),
            explosion: Appearance::sprite(assets, "explosions"),
            laser: Appearance::image(assets, "projectile_laser"),
            plasma: Appearance::image(assets, "projectile_plasma"),
            powerup_health: Appearance::image(assets, PowerUpKind::Health.image_key()),
            powerup_shield: Appearance::image(assets, PowerUpKind::Shield.image_key()),
            powerup_ammo: Appearance::image(assets, PowerUpKind::Ammo.image_key()),
        }
    }

    pub fn enemy(&self, kind: EnemyKind) -> &Appearance {
        match kind {
            EnemyKind::Red => &self.enemy_red,
            EnemyKind::Green => &self.enemy_green,
        }
    }

    pub fn projectile(&self, owner: ProjectileOwner) -> &Appearance {
        match owner {
            ProjectileOwner::Player => &self.laser,
            ProjectileOwner::Enemy => &self.plasma,
        }
    }

    pub fn powerup(&self, kind: PowerUpKind) -> &Appearance {
        match kind {
            PowerUpKind::Health => &self.powerup_health,
            PowerUpKind::Shield => &self.powerup_shield,
            PowerUpKind::Ammo => &self.powerup_ammo,
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub dash_speed: f32,
    pub current_speed: f32,
    pub is_dashing: bool,
    pub dash_duration: u32,
    pub dash_timer: u32,
    /// Recent positions, only kept while dashing.
    pub trail: VecDeque<(f32, f32)>,
    pub trail_length: usize,
    pub appearance: Appearance,
    pub current_frame: usize,
    frame_timer: u32,
    frame_delay: u32,
}

impl Player {
    /// A player at the bottom centre of the viewport.
    pub fn new(config: &GameConfig, looks: &Looks) -> Self {
        let p = &config.player;
        Self {
            x: config.viewport.width / 2.0,
            y: config.viewport.height - 100.0,
            width: p.size,
            height: p.size,
            speed: p.speed,
            dash_speed: p.dash_speed,
            current_speed: p.speed,
            is_dashing: false,
            dash_duration: p.dash_duration.max(1),
            dash_timer: 0,
            trail: VecDeque::with_capacity(p.trail_length + 1),
            trail_length: p.trail_length,
            appearance: looks.player.clone(),
            current_frame: 0,
            frame_timer: 0,
            frame_delay: p.frame_delay.max(1),
        }
    }

    /// One tick of dash handling, movement and animation.
    ///
    /// Starting a dash needs the dash key, a zero `state.dash_cooldown` and no
    /// dash in progress; it refills the cooldown to its maximum.
    pub fn update(&mut self, state: &mut GameState, input: &InputState) {
        if self.is_dashing {
            self.trail.push_back((self.x, self.y));
            if self.trail.len() > self.trail_length {
                self.trail.pop_front();
            }
        } else {
            self.trail.clear();
        }

        if input.is_pressed(Key::Dash) && state.dash_cooldown == 0 && !self.is_dashing {
            self.is_dashing = true;
            self.dash_timer = self.dash_duration;
            state.dash_cooldown = state.max_dash_cooldown;
        }

        if self.is_dashing {
            let t = self.dash_timer as f32 / self.dash_duration as f32;
            self.current_speed = self.speed + (self.dash_speed - self.speed) * t;
            self.dash_timer = self.dash_timer.saturating_sub(1);
            if self.dash_timer == 0 {
                self.is_dashing = false;
            }
        } else {
            self.current_speed = self.speed;
        }

        let view = &state.config.viewport;
        let max_x = view.width - self.width;
        let max_y = view.height - self.height;
        if input.is_pressed(Key::Left) && self.x > 0.0 {
            self.x -= self.current_speed;
        }
        if input.is_pressed(Key::Right) && self.x < max_x {
            self.x += self.current_speed;
        }
        if input.is_pressed(Key::Up) && self.y > 0.0 {
            self.y -= self.current_speed;
        }
        if input.is_pressed(Key::Down) && self.y < max_y {
            self.y += self.current_speed;
        }
        self.x = self.x.min(max_x).max(0.0);
        self.y = self.y.min(max_y).max(0.0);

        self.frame_timer += 1;
        if self.frame_timer >= self.frame_delay {
            self.current_frame = (self.current_frame + 1) % self.appearance.frame_count.max(1);
            self.frame_timer = 0;
        }
    }

    /// Fire one shot if there is enough energy. Returns whether a shot was fired.
    pub fn shoot(&self, state: &mut GameState) -> bool {
        let cost = state.config.player.shoot_cost;
        if state.energy < cost {
            return false;
        }
        state.fire_projectile(self.x, self.y - self.height / 2.0, ProjectileOwner::Player);
        state.energy = (state.energy - cost).max(0.0);
        state.stats.shots_fired += 1;
        state.events.push(FrameEvent::Sound(SoundCue::Laser));
        true
    }

    /// Reduce health (never below zero). Returns true when the hit was lethal.
    pub fn take_damage(&self, amount: i32, state: &mut GameState) -> bool {
        state.health = (state.health - amount).max(0);
        state.stats.damage_taken += amount.max(0) as u64;
        state.events.push(FrameEvent::ScreenShake { intensity: 1.0 });
        state.events.push(FrameEvent::DamageNumber {
            x: self.x,
            y: self.y,
            amount,
        });
        state.health <= 0
    }
}

impl Bounds for Player {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub kind: EnemyKind,
    pub appearance: Appearance,
    pub current_frame: usize,
    frame_timer: u32,
    frame_delay: u32,
}

impl Enemy {
    /// A fresh enemy just above the top edge at a random column, with a random speed.
    pub fn spawn(config: &GameConfig, looks: &Looks, kind: EnemyKind, rng: &mut impl Rng) -> Self {
        let e = &config.enemy;
        let span = (config.viewport.width - e.size).max(0.0);
        let x = rng.gen::<f32>() * span;
        let speed = e.min_speed + rng.gen::<f32>() * (e.max_speed - e.min_speed);
        Self::new(x, -e.size, speed, kind, config, looks)
    }

    pub fn new(x: f32, y: f32, speed: f32, kind: EnemyKind, config: &GameConfig, looks: &Looks) -> Self {
        Self {
            x,
            y,
            width: config.enemy.size,
            height: config.enemy.size,
            speed,
            health: config.enemy.health,
            kind,
            appearance: looks.enemy(kind).clone(),
            current_frame: 0,
            frame_timer: 0,
            frame_delay: config.enemy.frame_delay.max(1),
        }
    }

    /// Descend one tick and roll for a shot. Returns the muzzle position when firing.
    ///
    /// Each call is an independent Bernoulli trial with probability `shoot_chance`.
    pub fn update(
        &mut self,
        viewport: &ViewportConfig,
        shoot_chance: f64,
        rng: &mut impl Rng,
    ) -> Option<(f32, f32)> {
        self.y += self.speed;
        self.x = self.x.min(viewport.width - self.width).max(0.0);
        self.y = self.y.min(viewport.height).max(-self.height);

        self.frame_timer += 1;
        if self.frame_timer >= self.frame_delay {
            self.current_frame = (self.current_frame + 1) % self.appearance.frame_count.max(1);
            self.frame_timer = 0;
        }

        if rng.gen::<f64>() < shoot_chance {
            Some((self.x, self.y + self.height / 2.0))
        } else {
            None
        }
    }

    /// Subtract `amount` from health. Returns true when this hit destroyed the enemy.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.health -= amount;
        was_alive && !self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

impl Bounds for Enemy {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Projectile ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Projectile {
    /// Stable identity across pool reuse.
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Signed vertical speed, fixed by the owner at creation.
    pub speed: f32,
    pub owner: ProjectileOwner,
    pub active: bool,
    pub appearance: Appearance,
}

impl Projectile {
    pub fn new(id: u64, x: f32, y: f32, owner: ProjectileOwner, config: &GameConfig, looks: &Looks) -> Self {
        let mut projectile = Self {
            id,
            x,
            y,
            width: config.projectile.width,
            height: config.projectile.height,
            speed: 0.0,
            owner,
            active: true,
            appearance: looks.projectile(owner).clone(),
        };
        projectile.reset(x, y, owner, config, looks);
        projectile
    }

    /// Re-arm a pooled projectile. The id is kept.
    pub fn reset(&mut self, x: f32, y: f32, owner: ProjectileOwner, config: &GameConfig, looks: &Looks) {
        self.x = x;
        self.y = y;
        self.width = config.projectile.width;
        self.height = config.projectile.height;
        self.speed = match owner {
            ProjectileOwner::Player => config.projectile.player_speed,
            ProjectileOwner::Enemy => config.projectile.enemy_speed,
        };
        if self.owner != owner || self.appearance.key != looks.projectile(owner).key {
            self.appearance = looks.projectile(owner).clone();
        }
        self.owner = owner;
        self.active = true;
    }

    /// Move one tick; deactivates once fully outside the vertical bounds.
    pub fn update(&mut self, viewport_height: f32) {
        self.y += self.speed;
        if self.y < -self.height || self.y > viewport_height + self.height {
            self.active = false;
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Bounds for Projectile {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Power-up ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PowerUpKind,
    pub speed: f32,
    pub appearance: Appearance,
    /// Pulsing glow in `0.0..=1.0`, cosmetic.
    pub glow: f32,
    glow_rising: bool,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpKind, config: &GameConfig, looks: &Looks) -> Self {
        Self {
            x,
            y,
            width: config.powerup.size,
            height: config.powerup.size,
            kind,
            speed: config.powerup.speed,
            appearance: looks.powerup(kind).clone(),
            glow: 0.0,
            glow_rising: true,
        }
    }

    pub fn update(&mut self) {
        self.y += self.speed;

        if self.glow_rising {
            self.glow += 0.05;
            if self.glow >= 1.0 {
                self.glow = 1.0;
                self.glow_rising = false;
            }
        } else {
            self.glow -= 0.05;
            if self.glow <= 0.0 {
                self.glow = 0.0;
                self.glow_rising = true;
            }
        }
    }

    /// Apply this power-up's single effect, clamped to its cap.
    pub fn apply_effect(&self, state: &mut GameState) {
        let p = &state.config.powerup;
        match self.kind {
            PowerUpKind::Health => {
                state.health = (state.health + p.health_restore).min(p.health_cap);
            }
            PowerUpKind::Shield => {
                state.health = (state.health + p.shield_restore).min(p.shield_cap);
            }
            PowerUpKind::Ammo => {
                state.energy = (state.energy + p.energy_restore).min(state.config.max_energy);
            }
        }
        state.stats.powerups_collected += 1;
        state.events.push(FrameEvent::PowerUpCollected {
            x: self.x,
            y: self.y,
            kind: self.kind,
        });
        state.events.push(FrameEvent::Sound(SoundCue::PowerUp));
    }
}

impl Bounds for PowerUp {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Explosion ─────────────────────────────────────────────────────────────────

/// Purely visual; never blocks game logic.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub current_frame: u32,
    pub frame_count: u32,
    frame_delay: u32,
    frame_timer: u32,
    pub is_complete: bool,
    pub appearance: Appearance,
}

impl Explosion {
    pub fn new(x: f32, y: f32, config: &GameConfig, looks: &Looks) -> Self {
        let mut explosion = Self {
            x,
            y,
            size: config.explosion.size,
            current_frame: 0,
            frame_count: config.explosion.frames.max(1),
            frame_delay: config.explosion.frame_delay.max(1),
            frame_timer: 0,
            is_complete: false,
            appearance: looks.explosion.clone(),
        };
        explosion.reset(x, y);
        explosion
    }

    pub fn reset(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.current_frame = 0;
        self.frame_timer = 0;
        self.is_complete = false;
    }

    pub fn update(&mut self) {
        if self.is_complete {
            return;
        }
        self.frame_timer += 1;
        if self.frame_timer >= self.frame_delay {
            self.frame_timer = 0;
            self.current_frame += 1;
            if self.current_frame >= self.frame_count {
                self.is_complete = true;
            }
        }
    }

    /// Ticks from a fresh explosion until `is_complete`.
    pub fn lifetime_ticks(&self) -> u32 {
        self.frame_count * self.frame_delay
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Per-run counters used for stats and achievements at game over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    pub enemies_defeated: u32,
    pub powerups_collected: u32,
    pub max_combo: u32,
    pub damage_taken: u64,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub frames_survived: u64,
}

/// The single mutable record of one Playing session.
///
/// A new one is built for every session; nothing carries over from the last run.
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub looks: Looks,

    pub score: u64,
    /// `0..=shield cap`; only a shield power-up takes it above the health cap.
    pub health: i32,
    pub energy: f32,
    /// Flips to true once and stays there for this session.
    pub is_game_over: bool,

    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    pub particles: ParticleSystem,
    pub projectile_pool: ObjectPool<Projectile>,
    pub explosion_pool: ObjectPool<Explosion>,

    pub last_spawn_time: u64,
    pub spawn_interval: u64,
    pub shoot_cooldown: u32,
    pub dash_cooldown: u32,
    pub max_dash_cooldown: u32,

    pub combo_count: u32,
    pub last_combo_time: u64,
    pub combo_timeout: u64,

    pub stats: RunStats,
    pub started_at: u64,
    /// Effects emitted since the last render pass.
    pub events: Vec<FrameEvent>,
    next_projectile_id: u64,
}

impl GameState {
    pub fn new(config: GameConfig, assets: &dyn AssetProvider, now: u64) -> Self {
        let looks = Looks::resolve(assets);
        Self::with_looks(config, looks, now)
    }

    pub fn with_looks(config: GameConfig, looks: Looks, now: u64) -> Self {
        Self {
            score: 0,
            health: config.player.initial_health,
            energy: config.player.initial_energy,
            is_game_over: false,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            particles: ParticleSystem::new(config.particle_pool_capacity),
            projectile_pool: ObjectPool::unbounded(),
            explosion_pool: ObjectPool::unbounded(),
            last_spawn_time: 0,
            spawn_interval: config.enemy.spawn_interval_ms,
            shoot_cooldown: 0,
            dash_cooldown: 0,
            max_dash_cooldown: config.max_dash_cooldown,
            combo_count: 0,
            last_combo_time: 0,
            combo_timeout: config.combo.timeout_ms,
            stats: RunStats::default(),
            started_at: now,
            events: Vec::new(),
            next_projectile_id: 0,
            config,
            looks,
        }
    }

    /// Put a projectile into the world, reusing a pooled one when available.
    pub fn fire_projectile(&mut self, x: f32, y: f32, owner: ProjectileOwner) {
        let projectile = match self.projectile_pool.acquire() {
            Some(mut pooled) => {
                pooled.reset(x, y, owner, &self.config, &self.looks);
                pooled
            }
            None => {
                let id = self.next_projectile_id;
                self.next_projectile_id += 1;
                Projectile::new(id, x, y, owner, &self.config, &self.looks)
            }
        };
        self.projectiles.push(projectile);
    }

    /// Start an explosion animation, reusing a pooled one when available.
    pub fn spawn_explosion(&mut self, x: f32, y: f32) {
        let explosion = match self.explosion_pool.acquire() {
            Some(mut pooled) => {
                pooled.reset(x, y);
                pooled
            }
            None => Explosion::new(x, y, &self.config, &self.looks),
        };
        self.explosions.push(explosion);
    }

    /// Add energy, capped at the configured maximum.
    pub fn regen_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).min(self.config.max_energy).max(0.0);
    }
}
