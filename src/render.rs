//! Renderer boundary and the presentation state the machine owns.
//!
//! The core decides *what* is on screen (which overlays, which music, which
//! effects fired this frame); a [`Renderer`] decides how it looks.

use std::collections::BTreeSet;

use crate::achievements::RunSummary;
use crate::assets::AudioHandle;
use crate::entities::{GameState, Player};
use crate::error::RenderError;
use crate::events::FrameEvent;
use crate::machine::{GameStatus, Session};
use crate::storage::{HighScore, Settings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Overlay {
    MainMenu,
    Controls,
    Hud,
    PauseMenu,
    ConfirmQuit,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MusicTrack {
    Menu,
    Battle,
}

impl MusicTrack {
    pub fn asset_key(self) -> &'static str {
        match self {
            MusicTrack::Menu => "menuMusic",
            MusicTrack::Battle => "bgMusic",
        }
    }
}

/// The one music slot. `handle` is `None` when the track failed to load;
/// the slot is still tracked so enter/exit pairing stays observable.
#[derive(Clone, Debug, PartialEq)]
pub struct Music {
    pub track: MusicTrack,
    pub handle: Option<AudioHandle>,
    pub volume: f32,
    pub paused: bool,
}

/// Outcome of the last finished run, shown on the game-over screen.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub summary: RunSummary,
    pub new_high_score: bool,
    pub unlocked: Vec<&'static str>,
}

/// Everything besides the world itself that a frame needs to show.
pub struct PresentedFrame<'a> {
    pub status: GameStatus,
    pub overlays: &'a BTreeSet<Overlay>,
    pub music: Option<&'a Music>,
    /// Effects emitted since the previous frame; consumed once.
    pub events: &'a [FrameEvent],
    pub session: Option<&'a Session>,
    pub high_scores: &'a [HighScore],
    pub last_run: Option<&'a RunResult>,
    pub settings: &'a Settings,
}

impl PresentedFrame<'_> {
    pub fn shows(&self, overlay: Overlay) -> bool {
        self.overlays.contains(&overlay)
    }

    /// Gameplay is frozen behind an overlay.
    pub fn dimmed(&self) -> bool {
        matches!(self.status, GameStatus::Paused | GameStatus::GameOver)
    }
}

/// Called once per frame: `clear`, then `render` when a session exists, then `present`.
pub trait Renderer {
    fn clear(&mut self) -> Result<(), RenderError>;
    fn render(&mut self, state: &GameState, player: &Player) -> Result<(), RenderError>;
    fn present(&mut self, frame: &PresentedFrame<'_>) -> Result<(), RenderError>;
}
