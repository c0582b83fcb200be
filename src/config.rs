//! Tunable game constants.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. `Difficulty::Normal` with the defaults is the reference balance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Difficulty tables ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    fn spawn_interval_factor(self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.6,
        }
    }

    fn shoot_chance_factor(self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: f32,
    pub speed: f32,
    pub dash_speed: f32,
    /// Frames a dash lasts.
    pub dash_duration: u32,
    pub initial_health: i32,
    pub initial_energy: f32,
    /// Energy regained every frame.
    pub energy_regen: f32,
    pub shoot_cost: f32,
    /// Frames between two shots.
    pub shoot_cooldown: u32,
    pub trail_length: usize,
    pub frame_delay: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 72.0,
            speed: 5.0,
            dash_speed: 15.0,
            dash_duration: 20,
            initial_health: 100,
            initial_energy: 100.0,
            energy_regen: 0.2,
            shoot_cost: 10.0,
            shoot_cooldown: 10,
            trail_length: 5,
            frame_delay: 25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub health: i32,
    /// Damage an enemy projectile deals to the player.
    pub damage: i32,
    /// Per-frame probability that an enemy fires.
    pub shoot_chance: f64,
    pub spawn_interval_ms: u64,
    pub frame_delay: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            size: 68.0,
            min_speed: 2.0,
            max_speed: 4.0,
            health: 45,
            damage: 15,
            shoot_chance: 0.01,
            spawn_interval_ms: 2000,
            frame_delay: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub width: f32,
    pub height: f32,
    pub player_speed: f32,
    pub enemy_speed: f32,
    /// Damage a player projectile deals to an enemy.
    pub damage: i32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 24.0,
            player_speed: -10.0,
            enemy_speed: 5.0,
            damage: 25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub size: f32,
    pub speed: f32,
    pub drop_chance: f64,
    pub health_restore: i32,
    pub health_cap: i32,
    pub shield_restore: i32,
    pub shield_cap: i32,
    pub energy_restore: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            size: 32.0,
            speed: 1.0,
            drop_chance: 0.3,
            health_restore: 30,
            health_cap: 100,
            shield_restore: 50,
            shield_cap: 150,
            energy_restore: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub timeout_ms: u64,
    pub max_multiplier: u32,
    pub base_score: u64,
    pub energy_gain: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            max_multiplier: 5,
            base_score: 100,
            energy_gain: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    pub size: f32,
    pub frames: u32,
    pub frame_delay: u32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            size: 128.0,
            frames: 9,
            frame_delay: 3,
        }
    }
}

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub viewport: ViewportConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub powerup: PowerUpConfig,
    pub combo: ComboConfig,
    pub explosion: ExplosionConfig,
    /// Upper bound for both dash cooldown and the dash bar.
    pub max_dash_cooldown: u32,
    /// Upper bound for energy.
    pub max_energy: f32,
    /// Delay between the player's death and the GameOver screen.
    pub game_over_delay_ms: u64,
    pub particle_pool_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            projectile: ProjectileConfig::default(),
            powerup: PowerUpConfig::default(),
            combo: ComboConfig::default(),
            explosion: ExplosionConfig::default(),
            max_dash_cooldown: 100,
            max_energy: 200.0,
            game_over_delay_ms: 1000,
            particle_pool_capacity: 1000,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(path, &text)
    }

    /// Like [`GameConfig::load`], but a missing or broken file only costs a log line.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    /// Copy with the difficulty scaling applied to spawn cadence and enemy fire.
    pub fn with_difficulty(&self, difficulty: Difficulty) -> Self {
        let mut config = self.clone();
        config.enemy.spawn_interval_ms =
            (self.enemy.spawn_interval_ms as f64 * difficulty.spawn_interval_factor()).round()
                as u64;
        config.enemy.shoot_chance =
            (self.enemy.shoot_chance * difficulty.shoot_chance_factor()).min(1.0);
        config
    }
}
