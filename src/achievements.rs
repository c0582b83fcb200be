//! Achievements unlocked from a finished run.

use crate::entities::RunStats;

/// What a run looked like when it ended.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub score: u64,
    pub elapsed_ms: u64,
    pub stats: RunStats,
}

pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    unlocked_by: fn(&RunSummary) -> bool,
}

impl Achievement {
    pub fn is_earned(&self, run: &RunSummary) -> bool {
        (self.unlocked_by)(run)
    }
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement").field("id", &self.id).finish()
    }
}

const SURVIVOR_MS: u64 = 5 * 60 * 1000;
const SHARPSHOOTER_MIN_SHOTS: u32 = 50;

fn accuracy(stats: &RunStats) -> f64 {
    if stats.shots_fired == 0 {
        return 0.0;
    }
    stats.shots_hit as f64 / stats.shots_fired as f64
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "FIRST_KILL",
        title: "First Blood",
        description: "Destroy your first enemy",
        unlocked_by: |run| run.stats.enemies_defeated >= 1,
    },
    Achievement {
        id: "COMBO_MASTER",
        title: "Combo Master",
        description: "Achieve a 10x combo",
        unlocked_by: |run| run.stats.max_combo >= 10,
    },
    Achievement {
        id: "SURVIVOR",
        title: "Survivor",
        description: "Survive for 5 minutes",
        unlocked_by: |run| run.elapsed_ms >= SURVIVOR_MS,
    },
    Achievement {
        id: "SHARPSHOOTER",
        title: "Sharpshooter",
        description: "Achieve 90% accuracy with 50+ shots",
        unlocked_by: |run| {
            run.stats.shots_fired >= SHARPSHOOTER_MIN_SHOTS && accuracy(&run.stats) >= 0.9
        },
    },
    Achievement {
        id: "POWERUP_COLLECTOR",
        title: "Power Hungry",
        description: "Collect 20 power-ups in one game",
        unlocked_by: |run| run.stats.powerups_collected >= 20,
    },
    Achievement {
        id: "HIGH_SCORE_1000",
        title: "Score Master",
        description: "Reach a score of 1,000 points",
        unlocked_by: |run| run.score >= 1000,
    },
    Achievement {
        id: "HIGH_SCORE_5000",
        title: "Score Legend",
        description: "Reach a score of 5,000 points",
        unlocked_by: |run| run.score >= 5000,
    },
    Achievement {
        id: "PERFECT_ROUND",
        title: "Perfect Round",
        description: "Finish a run with kills and no damage taken",
        unlocked_by: |run| run.stats.damage_taken == 0 && run.stats.enemies_defeated > 0,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Ids earned by `run` that are not already in `unlocked`, in table order.
pub fn evaluate(run: &RunSummary, unlocked: &[String]) -> Vec<&'static str> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !unlocked.iter().any(|u| u == a.id))
        .filter(|a| a.is_earned(run))
        .map(|a| a.id)
        .collect()
}
