use stellar_conflict::achievements::{self, RunSummary};
use stellar_conflict::config::{Difficulty, GameConfig};
use stellar_conflict::entities::RunStats;
use stellar_conflict::storage::*;

use tempfile::TempDir;

fn file_store() -> (TempDir, RonFileStore) {
    let dir = TempDir::new().unwrap();
    let store = RonFileStore::new(dir.path()).unwrap();
    (dir, store)
}

// ── High scores ───────────────────────────────────────────────────────────────

#[test]
fn high_scores_are_sorted_and_capped() {
    let mut store = MemoryStore::new();
    for score in [50, 400, 10, 300, 200, 700, 20, 90, 60, 80, 30, 1000] {
        store.save_high_score(score);
    }
    let scores: Vec<u64> = store.get_high_scores().iter().map(|h| h.score).collect();
    assert_eq!(scores, vec![1000, 700, 400, 300, 200, 90, 80, 60, 50, 30]);
}

#[test]
fn new_high_score_needs_to_beat_the_lowest_once_full() {
    let mut store = MemoryStore::new();
    assert!(store.is_new_high_score(1));
    for score in 1..=10 {
        store.save_high_score(score * 100);
    }
    assert!(!store.is_new_high_score(100));
    assert!(store.is_new_high_score(101));
}

#[test]
fn file_store_round_trips_high_scores() {
    let (_dir, mut store) = file_store();
    assert!(store.get_high_scores().is_empty());
    assert!(store.save_high_score(500));
    assert!(store.save_high_score(900));

    let scores = store.get_high_scores();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].score, 900);
    assert!(scores[0].date > 0);
}

#[test]
fn file_store_uses_prefixed_files() {
    let (dir, mut store) = file_store();
    store.save_high_score(10);
    assert!(dir.path().join("stellar-conflict-highScores.ron").exists());
}

// ── Settings and stats ────────────────────────────────────────────────────────

#[test]
fn settings_default_when_nothing_saved() {
    let (_dir, store) = file_store();
    let settings = store.get_settings();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.music_volume, 0.2);
    assert_eq!(settings.sfx_volume, 0.5);
    assert!(settings.show_tutorial);
    assert_eq!(settings.difficulty, Difficulty::Normal);
}

#[test]
fn settings_persist_across_store_instances() {
    let (dir, mut store) = file_store();
    let settings = Settings {
        is_muted: true,
        difficulty: Difficulty::Hard,
        ..Settings::default()
    };
    assert!(store.save_settings(&settings));

    let reopened = RonFileStore::new(dir.path()).unwrap();
    assert_eq!(reopened.get_settings(), settings);
}

#[test]
fn stats_update_merges_only_given_fields() {
    let (_dir, mut store) = file_store();
    store.update_stats(&StatsUpdate {
        games_played: Some(3),
        total_score: Some(4200),
        ..StatsUpdate::default()
    });
    store.update_stats(&StatsUpdate {
        highest_combo: Some(12),
        ..StatsUpdate::default()
    });

    let stats = store.get_stats();
    assert_eq!(stats.games_played, 3);
    assert_eq!(stats.total_score, 4200);
    assert_eq!(stats.highest_combo, 12);
    assert_eq!(stats.enemies_defeated, 0);
    assert!(stats.last_updated > 0);
}

// ── Achievements ──────────────────────────────────────────────────────────────

#[test]
fn saving_an_achievement_twice_keeps_one_copy() {
    let (_dir, mut store) = file_store();
    assert!(store.save_achievement("FIRST_KILL"));
    assert!(store.save_achievement("FIRST_KILL"));
    assert_eq!(store.get_achievements(), vec!["FIRST_KILL".to_string()]);
    assert!(store.has_achievement("FIRST_KILL"));
}

#[test]
fn evaluate_skips_already_unlocked() {
    let run = RunSummary {
        score: 6000,
        elapsed_ms: 6 * 60 * 1000,
        stats: RunStats {
            enemies_defeated: 40,
            max_combo: 11,
            powerups_collected: 25,
            shots_fired: 60,
            shots_hit: 55,
            damage_taken: 30,
            ..RunStats::default()
        },
    };
    let all = achievements::evaluate(&run, &[]);
    assert_eq!(
        all,
        vec![
            "FIRST_KILL",
            "COMBO_MASTER",
            "SURVIVOR",
            "SHARPSHOOTER",
            "POWERUP_COLLECTOR",
            "HIGH_SCORE_1000",
            "HIGH_SCORE_5000",
        ]
    );

    let unlocked = vec!["SURVIVOR".to_string(), "FIRST_KILL".to_string()];
    let fresh = achievements::evaluate(&run, &unlocked);
    assert_eq!(fresh.len(), 5);
    assert!(!fresh.contains(&"SURVIVOR"));
}

#[test]
fn sharpshooter_needs_fifty_shots() {
    let run = RunSummary {
        stats: RunStats {
            shots_fired: 49,
            shots_hit: 49,
            ..RunStats::default()
        },
        ..RunSummary::default()
    };
    assert!(achievements::evaluate(&run, &[]).is_empty());
    assert!(achievements::find("SHARPSHOOTER").is_some());
}

// ── Failure handling ──────────────────────────────────────────────────────────

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let (dir, store) = file_store();
    std::fs::write(dir.path().join("stellar-conflict-settings.ron"), "not ron at all {").unwrap();
    std::fs::write(dir.path().join("stellar-conflict-highScores.ron"), "[[[").unwrap();

    assert_eq!(store.get_settings(), Settings::default());
    assert!(store.get_high_scores().is_empty());
}

#[test]
fn failed_write_reports_false() {
    let (dir, mut store) = file_store();
    // A directory where the file should be makes the write fail.
    std::fs::create_dir(dir.path().join("stellar-conflict-achievements.ron")).unwrap();
    assert!(!store.save_achievement("FIRST_KILL"));
}

// ── Config file ───────────────────────────────────────────────────────────────

#[test]
fn config_file_overrides_only_named_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ron");
    std::fs::write(&path, "(enemy: (health: 90), game_over_delay_ms: 500)").unwrap();

    let config = GameConfig::load(&path).unwrap();
    assert_eq!(config.enemy.health, 90);
    assert_eq!(config.game_over_delay_ms, 500);
    assert_eq!(config.enemy.size, 68.0);
    assert_eq!(config.player.speed, 5.0);
}

#[test]
fn broken_or_missing_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ron");
    assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());

    std::fs::write(&path, "(enemy: (health: \"lots\"))").unwrap();
    assert!(GameConfig::load(&path).is_err());
    assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());
}

#[test]
fn difficulty_scales_spawns_and_fire() {
    let base = GameConfig::default();
    let easy = base.with_difficulty(Difficulty::Easy);
    let hard = base.with_difficulty(Difficulty::Hard);

    assert_eq!(base.with_difficulty(Difficulty::Normal), base);
    assert_eq!(easy.enemy.spawn_interval_ms, 3000);
    assert_eq!(hard.enemy.spawn_interval_ms, 1200);
    assert!(easy.enemy.shoot_chance < base.enemy.shoot_chance);
    assert!(hard.enemy.shoot_chance > base.enemy.shoot_chance);
}
