//! Combo and score rules applied when an enemy is destroyed.

use crate::entities::GameState;
use crate::events::FrameEvent;

/// What a single kill was worth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KillReward {
    pub combo_count: u32,
    pub multiplier: u32,
    pub score_gain: u64,
    pub energy_gain: f32,
}

/// Register a kill at `now` (ms) and pay out score and energy.
///
/// A kill within `combo_timeout` of the previous one extends the chain; a
/// later kill restarts it at 1. The multiplier is the chain length capped at
/// `max_multiplier`, and each level above 1 adds 20% to the energy gain.
pub fn register_kill(state: &mut GameState, now: u64) -> KillReward {
    let rules = &state.config.combo;

    if now.saturating_sub(state.last_combo_time) <= state.combo_timeout {
        state.combo_count += 1;
    } else {
        state.combo_count = 1;
    }
    state.last_combo_time = now;

    let multiplier = state.combo_count.min(rules.max_multiplier.max(1));
    let score_gain = rules.base_score * multiplier as u64;
    let energy_gain = rules.energy_gain * (1.0 + (multiplier - 1) as f32 * 0.2);

    state.score += score_gain;
    state.regen_energy(energy_gain);
    state.stats.max_combo = state.stats.max_combo.max(state.combo_count);
    state.events.push(FrameEvent::ComboUpdated {
        count: state.combo_count,
        multiplier,
    });

    KillReward {
        combo_count: state.combo_count,
        multiplier,
        score_gain,
        energy_gain,
    }
}
