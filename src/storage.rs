//! Persistence boundary: high scores, settings, lifetime stats and achievements.
//!
//! Every store is best effort. Reads that fail come back as defaults, writes
//! that fail return `false`; both log and neither ever reaches the game loop
//! as an error.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::error::StorageError;

pub const MAX_HIGH_SCORES: usize = 10;
const FILE_PREFIX: &str = "stellar-conflict";

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub score: u64,
    /// Seconds since the Unix epoch.
    pub date: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub is_muted: bool,
    pub show_tutorial: bool,
    pub difficulty: Difficulty,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.2,
            sfx_volume: 0.5,
            is_muted: false,
            show_tutorial: true,
            difficulty: Difficulty::Normal,
        }
    }
}

/// Lifetime totals across all runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub games_played: u32,
    pub total_score: u64,
    pub total_time_ms: u64,
    pub enemies_defeated: u64,
    pub powerups_collected: u64,
    pub highest_combo: u32,
    pub last_updated: u64,
}

/// Partial stats write; `None` fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsUpdate {
    pub games_played: Option<u32>,
    pub total_score: Option<u64>,
    pub total_time_ms: Option<u64>,
    pub enemies_defeated: Option<u64>,
    pub powerups_collected: Option<u64>,
    pub highest_combo: Option<u32>,
}

impl Stats {
    pub fn merge(&mut self, update: &StatsUpdate) {
        if let Some(v) = update.games_played {
            self.games_played = v;
        }
        if let Some(v) = update.total_score {
            self.total_score = v;
        }
        if let Some(v) = update.total_time_ms {
            self.total_time_ms = v;
        }
        if let Some(v) = update.enemies_defeated {
            self.enemies_defeated = v;
        }
        if let Some(v) = update.powerups_collected {
            self.powerups_collected = v;
        }
        if let Some(v) = update.highest_combo {
            self.highest_combo = v;
        }
        self.last_updated = unix_now();
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Insert, sort descending and keep the best [`MAX_HIGH_SCORES`].
fn insert_high_score(scores: &mut Vec<HighScore>, score: u64, date: u64) {
    scores.push(HighScore { score, date });
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(MAX_HIGH_SCORES);
}

// ── Boundary ──────────────────────────────────────────────────────────────────

pub trait PersistenceStore {
    /// Best first.
    fn get_high_scores(&self) -> Vec<HighScore>;
    fn save_high_score(&mut self, score: u64) -> bool;
    fn get_settings(&self) -> Settings;
    fn save_settings(&mut self, settings: &Settings) -> bool;
    fn get_stats(&self) -> Stats;
    fn update_stats(&mut self, update: &StatsUpdate) -> bool;
    fn get_achievements(&self) -> Vec<String>;
    /// Idempotent: saving an already unlocked id succeeds without duplicating it.
    fn save_achievement(&mut self, id: &str) -> bool;

    fn is_new_high_score(&self, score: u64) -> bool {
        let scores = self.get_high_scores();
        if scores.len() < MAX_HIGH_SCORES {
            return true;
        }
        scores.last().is_some_and(|lowest| score > lowest.score)
    }

    fn has_achievement(&self, id: &str) -> bool {
        self.get_achievements().iter().any(|a| a == id)
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    high_scores: Vec<HighScore>,
    settings: Settings,
    stats: Stats,
    achievements: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get_high_scores(&self) -> Vec<HighScore> {
        self.high_scores.clone()
    }

    fn save_high_score(&mut self, score: u64) -> bool {
        insert_high_score(&mut self.high_scores, score, unix_now());
        true
    }

    fn get_settings(&self) -> Settings {
        self.settings.clone()
    }

    fn save_settings(&mut self, settings: &Settings) -> bool {
        self.settings = settings.clone();
        true
    }

    fn get_stats(&self) -> Stats {
        self.stats.clone()
    }

    fn update_stats(&mut self, update: &StatsUpdate) -> bool {
        self.stats.merge(update);
        true
    }

    fn get_achievements(&self) -> Vec<String> {
        self.achievements.clone()
    }

    fn save_achievement(&mut self, id: &str) -> bool {
        if !self.achievements.iter().any(|a| a == id) {
            self.achievements.push(id.to_string());
        }
        true
    }
}

// ── RON file store ────────────────────────────────────────────────────────────

/// One RON file per record under a directory.
#[derive(Clone, Debug)]
pub struct RonFileStore {
    dir: PathBuf,
}

impl RonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// `<data dir>/stellar_conflict`.
    pub fn in_data_dir() -> Result<Self, StorageError> {
        let base = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Self::new(base.join("stellar_conflict"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}-{key}.ron"))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path).map_err(|source| StorageError::Io { path, source })?;
        ron::from_str(&text).map(Some).map_err(|e| StorageError::Parse {
            key: key.to_string(),
            details: e.to_string(),
        })
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).map_err(|e| {
            StorageError::Serialize {
                key: key.to_string(),
                details: e.to_string(),
            }
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, text).map_err(|source| StorageError::Io { path, source })
    }

    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                log::warn!("{e}; using defaults");
                T::default()
            }
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match self.write(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save to storage: {e}");
                false
            }
        }
    }
}

impl PersistenceStore for RonFileStore {
    fn get_high_scores(&self) -> Vec<HighScore> {
        self.get_or_default("highScores")
    }

    fn save_high_score(&mut self, score: u64) -> bool {
        let mut scores = self.get_high_scores();
        insert_high_score(&mut scores, score, unix_now());
        self.set("highScores", &scores)
    }

    fn get_settings(&self) -> Settings {
        self.get_or_default("settings")
    }

    fn save_settings(&mut self, settings: &Settings) -> bool {
        self.set("settings", settings)
    }

    fn get_stats(&self) -> Stats {
        self.get_or_default("stats")
    }

    fn update_stats(&mut self, update: &StatsUpdate) -> bool {
        let mut stats = self.get_stats();
        stats.merge(update);
        self.set("stats", &stats)
    }

    fn get_achievements(&self) -> Vec<String> {
        self.get_or_default("achievements")
    }

    fn save_achievement(&mut self, id: &str) -> bool {
        let mut achievements = self.get_achievements();
        if achievements.iter().any(|a| a == id) {
            return true;
        }
        achievements.push(id.to_string());
        self.set("achievements", &achievements)
    }
}
