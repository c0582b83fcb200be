//! Visual and audio effects emitted by the simulation.
//!
//! The core never draws or plays anything itself; it pushes descriptors
//! here and the presentation layer consumes them once per frame.

use crate::entities::{PowerUpKind, ProjectileOwner};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Laser,
    Explosion,
    PowerUp,
    StartMission,
}

impl SoundCue {
    /// Audio asset key for this cue.
    pub fn asset_key(self) -> &'static str {
        match self {
            SoundCue::Laser => "laser",
            SoundCue::Explosion => "explosion",
            SoundCue::PowerUp => "powerup",
            SoundCue::StartMission => "startMissionSound",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// Floating "-N" text at the hit position.
    DamageNumber { x: f32, y: f32, amount: i32 },
    ScreenShake { intensity: f32 },
    HitEffect { x: f32, y: f32, owner: ProjectileOwner },
    PowerUpCollected { x: f32, y: f32, kind: PowerUpKind },
    ComboUpdated { count: u32, multiplier: u32 },
    Sound(SoundCue),
    NewHighScore { score: u64 },
    AchievementUnlocked { id: &'static str },
}
