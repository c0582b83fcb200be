//! Top-level game state machine.
//!
//! The current state is a closed tag; each tag selects a row of plain
//! function pointers (`enter`, `exit`, `update`, `render`). The machine owns
//! every collaborator (assets, persistence, RNG) and the presentation state,
//! so nothing in the game reaches for a global.
//!
//! Transitions:
//!
//! ```text
//! Menu ──Start──▶ Playing ──Pause──▶ Paused ──Resume──▶ Playing
//!                    │                  └──ConfirmQuit──▶ Menu
//!                    └─(death + delay)─▶ GameOver ──Restart──▶ Playing
//!                                           └──ReturnToMenu──▶ Menu
//! ```
//!
//! Anything else is ignored.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::achievements::{self, RunSummary};
use crate::assets::AssetProvider;
use crate::compute::{self, TickOutcome};
use crate::config::{Difficulty, GameConfig};
use crate::entities::{GameState, Player};
use crate::error::{AssetError, GameError, RenderError};
use crate::events::{FrameEvent, SoundCue};
use crate::input::{Command, InputState, Key, ListenerId, ListenerOwner, ListenerRegistry};
use crate::render::{Music, MusicTrack, Overlay, PresentedFrame, Renderer, RunResult};
use crate::storage::{HighScore, PersistenceStore, Settings, StatsUpdate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
}

impl GameStatus {
    fn handlers(self) -> &'static StateHandlers {
        &HANDLERS[self as usize]
    }

    fn listener_owner(self) -> ListenerOwner {
        match self {
            GameStatus::Menu => ListenerOwner::Menu,
            GameStatus::Playing => ListenerOwner::Playing,
            GameStatus::Paused => ListenerOwner::Paused,
            GameStatus::GameOver => ListenerOwner::GameOver,
        }
    }
}

/// One run: the authoritative state plus the player it belongs to.
#[derive(Debug)]
pub struct Session {
    pub state: GameState,
    pub player: Player,
}

// ── Handler table ─────────────────────────────────────────────────────────────

struct StateHandlers {
    enter: fn(&mut StateMachine, u64),
    exit: fn(&mut StateMachine, u64),
    update: fn(&mut StateMachine, u64, &InputState),
    render: fn(&StateMachine, &mut dyn Renderer) -> Result<(), RenderError>,
}

/// Indexed by `GameStatus as usize`.
static HANDLERS: [StateHandlers; 4] = [
    StateHandlers {
        enter: enter_menu,
        exit: exit_menu,
        update: update_idle,
        render: render_menu,
    },
    StateHandlers {
        enter: enter_playing,
        exit: exit_playing,
        update: update_playing,
        render: render_session,
    },
    StateHandlers {
        enter: enter_paused,
        exit: exit_paused,
        update: update_frozen,
        render: render_session,
    },
    StateHandlers {
        enter: enter_game_over,
        exit: exit_game_over,
        update: update_frozen,
        render: render_session,
    },
];

// ── Machine ───────────────────────────────────────────────────────────────────

pub struct StateMachine {
    config: GameConfig,
    assets: Box<dyn AssetProvider>,
    store: Box<dyn PersistenceStore>,
    rng: StdRng,

    status: GameStatus,
    session: Option<Session>,
    /// Set by `Resume` so Playing's `enter` keeps the paused session.
    resuming: bool,
    /// When the GameOver screen may appear, once the player has been destroyed.
    game_over_at: Option<u64>,

    overlays: BTreeSet<Overlay>,
    music: Option<Music>,
    listeners: ListenerRegistry,
    /// Paused-state bindings swapped in and out by the quit prompt.
    quit_bindings: Vec<ListenerId>,
    events: Vec<FrameEvent>,

    settings: Settings,
    high_scores: Vec<HighScore>,
    last_run: Option<RunResult>,
}

impl StateMachine {
    /// Build the machine in the Menu state.
    ///
    /// Fails only when the asset provider has nothing loaded at all.
    pub fn new(
        config: GameConfig,
        assets: Box<dyn AssetProvider>,
        store: Box<dyn PersistenceStore>,
    ) -> Result<Self, GameError> {
        Self::with_rng(config, assets, store, StdRng::from_entropy())
    }

    pub fn with_rng(
        config: GameConfig,
        assets: Box<dyn AssetProvider>,
        store: Box<dyn PersistenceStore>,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        if assets.loaded_count() == 0 {
            return Err(AssetError::NothingLoaded.into());
        }
        let settings = store.get_settings();
        let high_scores = store.get_high_scores();

        let mut machine = Self {
            config,
            assets,
            store,
            rng,
            status: GameStatus::Menu,
            session: None,
            resuming: false,
            game_over_at: None,
            overlays: BTreeSet::new(),
            music: None,
            listeners: ListenerRegistry::new(),
            quit_bindings: Vec::new(),
            events: Vec::new(),
            settings,
            high_scores,
            last_run: None,
        };
        (GameStatus::Menu.handlers().enter)(&mut machine, 0);
        log::info!("State machine ready ({} assets loaded)", machine.assets.loaded_count());
        Ok(machine)
    }

    /// One frame: the current state's update, then its render pass.
    ///
    /// Render failures are logged and the frame is dropped; the caller keeps
    /// calling `frame` regardless.
    pub fn frame(&mut self, now: u64, input: &InputState, renderer: &mut dyn Renderer) {
        (self.status.handlers().update)(self, now, input);

        // The update may have changed state; render whatever is current now.
        if let Err(e) = (self.status.handlers().render)(self, renderer) {
            log::error!("Render failed, frame skipped: {e}");
        }
        self.events.clear();
    }

    /// Dispatch a key press through the current bindings. Returns whether
    /// any bound command was accepted.
    pub fn key_pressed(&mut self, key: Key, now: u64) -> bool {
        let commands = self.listeners.dispatch(key);
        let mut handled = false;
        for command in commands {
            handled |= self.handle(command, now);
        }
        handled
    }

    /// Apply a command. Requests that are not legal in the current state are
    /// ignored and return `false`.
    pub fn handle(&mut self, command: Command, now: u64) -> bool {
        let prompt_open = self.overlays.contains(&Overlay::ConfirmQuit);

        let accepted = match (self.status, command) {
            (GameStatus::Menu, Command::Start) => {
                self.transition(GameStatus::Playing, now);
                true
            }
            (GameStatus::Menu, Command::ToggleControls) => {
                if !self.overlays.remove(&Overlay::Controls) {
                    self.overlays.insert(Overlay::Controls);
                }
                true
            }
            // Once the player is destroyed the run only waits for the GameOver screen.
            (GameStatus::Playing, Command::Pause) if !self.session_over() => {
                self.transition(GameStatus::Paused, now);
                true
            }
            (GameStatus::Paused, Command::Resume) => {
                self.resuming = true;
                self.transition(GameStatus::Playing, now);
                true
            }
            (GameStatus::Paused, Command::RequestQuit) if !prompt_open => {
                self.overlays.insert(Overlay::ConfirmQuit);
                self.bind_quit_keys(true);
                true
            }
            (GameStatus::Paused, Command::CancelQuit) if prompt_open => {
                self.overlays.remove(&Overlay::ConfirmQuit);
                self.bind_quit_keys(false);
                true
            }
            (GameStatus::Paused, Command::ConfirmQuit) if prompt_open => {
                self.transition(GameStatus::Menu, now);
                true
            }
            (GameStatus::GameOver, Command::Restart) => {
                self.transition(GameStatus::Playing, now);
                true
            }
            (GameStatus::GameOver, Command::ReturnToMenu) => {
                self.transition(GameStatus::Menu, now);
                true
            }
            _ => false,
        };

        if !accepted {
            log::debug!("Ignored {command:?} in {:?}", self.status);
        }
        accepted
    }

    fn transition(&mut self, to: GameStatus, now: u64) {
        let from = self.status;
        (from.handlers().exit)(self, now);
        self.status = to;
        log::info!("{from:?} -> {to:?}");
        (to.handlers().enter)(self, now);
    }

    fn session_over(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.state.is_game_over)
    }

    fn start_session(&mut self, now: u64) {
        let config = self.config.with_difficulty(self.settings.difficulty);
        let mut state = GameState::new(config, self.assets.as_ref(), now);
        let player = Player::new(&state.config, &state.looks);
        state.events.push(FrameEvent::Sound(SoundCue::StartMission));

        self.session = Some(Session { state, player });
        self.game_over_at = None;
        self.last_run = None;
        log::info!("Session started ({:?})", self.settings.difficulty);
    }

    fn play_music(&mut self, track: MusicTrack) {
        let handle = self.assets.get_audio(track.asset_key());
        if handle.is_none() {
            let missing = AssetError::Missing {
                kind: "Audio",
                key: track.asset_key().to_string(),
            };
            log::warn!("{missing}; music stays silent");
        }
        let volume = if self.settings.is_muted {
            0.0
        } else {
            self.settings.music_volume
        };
        self.music = Some(Music {
            track,
            handle,
            volume,
            paused: false,
        });
    }

    /// HUD and battle music belong to a session; drop them when it ends.
    fn release_session_effects(&mut self) {
        self.overlays.remove(&Overlay::Hud);
        if self.music.as_ref().is_some_and(|m| m.track == MusicTrack::Battle) {
            self.music = None;
        }
    }

    /// Paused owns Cancel (and Confirm while the prompt is up).
    fn bind_quit_keys(&mut self, prompt_open: bool) {
        for id in self.quit_bindings.drain(..) {
            self.listeners.unsubscribe(id);
        }
        let owner = ListenerOwner::Paused;
        if prompt_open {
            self.quit_bindings
                .push(self.listeners.subscribe(owner, Key::Cancel, Command::CancelQuit));
            self.quit_bindings
                .push(self.listeners.subscribe(owner, Key::Confirm, Command::ConfirmQuit));
        } else {
            self.quit_bindings
                .push(self.listeners.subscribe(owner, Key::Cancel, Command::RequestQuit));
        }
    }

    /// Persist the finished run: high score, lifetime stats, achievements.
    /// Storage failures are logged and otherwise ignored.
    fn record_run(&mut self, now: u64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let summary = RunSummary {
            score: session.state.score,
            elapsed_ms: now.saturating_sub(session.state.started_at),
            stats: session.state.stats.clone(),
        };

        let new_high_score = summary.score > 0 && self.store.is_new_high_score(summary.score);
        if new_high_score {
            if !self.store.save_high_score(summary.score) {
                log::warn!("High score {} was not saved", summary.score);
            }
            self.events.push(FrameEvent::NewHighScore {
                score: summary.score,
            });
        }

        let lifetime = self.store.get_stats();
        let run = &summary.stats;
        let update = StatsUpdate {
            games_played: Some(lifetime.games_played + 1),
            total_score: Some(lifetime.total_score + summary.score),
            total_time_ms: Some(lifetime.total_time_ms + summary.elapsed_ms),
            enemies_defeated: Some(lifetime.enemies_defeated + u64::from(run.enemies_defeated)),
            powerups_collected: Some(lifetime.powerups_collected + u64::from(run.powerups_collected)),
            highest_combo: Some(lifetime.highest_combo.max(run.max_combo)),
        };
        if !self.store.update_stats(&update) {
            log::warn!("Run stats were not saved");
        }

        let already = self.store.get_achievements();
        let unlocked = achievements::evaluate(&summary, &already);
        for &id in &unlocked {
            if !self.store.save_achievement(id) {
                log::warn!("Achievement {id} was not saved");
            }
            log::info!("Achievement unlocked: {id}");
            self.events.push(FrameEvent::AchievementUnlocked { id });
        }

        self.high_scores = self.store.get_high_scores();
        log::info!(
            "Run over: score={} kills={} time={}ms",
            summary.score,
            summary.stats.enemies_defeated,
            summary.elapsed_ms
        );
        self.last_run = Some(RunResult {
            summary,
            new_high_score,
            unlocked,
        });
    }

    fn presented(&self) -> PresentedFrame<'_> {
        PresentedFrame {
            status: self.status,
            overlays: &self.overlays,
            music: self.music.as_ref(),
            events: &self.events,
            session: self.session.as_ref(),
            high_scores: &self.high_scores,
            last_run: self.last_run.as_ref(),
            settings: &self.settings,
        }
    }

    // ── Settings ─────────────────────────────────────────────────────────────

    /// Takes effect from the next session.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        self.settings.difficulty = difficulty;
        self.store.save_settings(&self.settings)
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.settings.is_muted = !self.settings.is_muted;
        let volume = if self.settings.is_muted {
            0.0
        } else {
            self.settings.music_volume
        };
        if let Some(music) = self.music.as_mut() {
            music.volume = volume;
        }
        self.store.save_settings(&self.settings)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn game_over_at(&self) -> Option<u64> {
        self.game_over_at
    }

    pub fn overlays(&self) -> &BTreeSet<Overlay> {
        &self.overlays
    }

    pub fn music(&self) -> Option<&Music> {
        self.music.as_ref()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &[HighScore] {
        &self.high_scores
    }

    pub fn last_run(&self) -> Option<&RunResult> {
        self.last_run.as_ref()
    }

    pub fn store(&self) -> &dyn PersistenceStore {
        self.store.as_ref()
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

fn enter_menu(m: &mut StateMachine, _now: u64) {
    m.release_session_effects();
    m.session = None;
    m.game_over_at = None;
    m.overlays.insert(Overlay::MainMenu);
    m.play_music(MusicTrack::Menu);
    m.high_scores = m.store.get_high_scores();

    let owner = ListenerOwner::Menu;
    m.listeners.subscribe(owner, Key::Confirm, Command::Start);
    m.listeners.subscribe(owner, Key::Fire, Command::Start);
    m.listeners.subscribe(owner, Key::Cancel, Command::ToggleControls);
}

fn exit_menu(m: &mut StateMachine, _now: u64) {
    m.listeners.unsubscribe_owner(GameStatus::Menu.listener_owner());
    m.overlays.remove(&Overlay::MainMenu);
    m.overlays.remove(&Overlay::Controls);
}

// ── Playing ───────────────────────────────────────────────────────────────────

fn enter_playing(m: &mut StateMachine, now: u64) {
    let resuming = std::mem::take(&mut m.resuming);
    if !resuming || m.session.is_none() {
        m.start_session(now);
    }
    m.listeners
        .subscribe(ListenerOwner::Playing, Key::Pause, Command::Pause);
    m.overlays.insert(Overlay::Hud);
    if !m.music.as_ref().is_some_and(|music| music.track == MusicTrack::Battle) {
        m.play_music(MusicTrack::Battle);
    }
}

fn exit_playing(m: &mut StateMachine, _now: u64) {
    m.listeners
        .unsubscribe_owner(GameStatus::Playing.listener_owner());
}

fn update_playing(m: &mut StateMachine, now: u64, input: &InputState) {
    let Some(session) = m.session.as_mut() else {
        return;
    };
    let outcome = compute::tick(&mut session.state, &mut session.player, input, now, &mut m.rng);
    m.events.append(&mut session.state.events);

    if outcome == TickOutcome::PlayerDestroyed {
        let at = now + m.config.game_over_delay_ms;
        m.game_over_at = Some(at);
        log::debug!("Game over screen due at {at} ms");
    }
    if m.game_over_at.is_some_and(|at| now >= at) {
        m.transition(GameStatus::GameOver, now);
    }
}

// ── Paused ────────────────────────────────────────────────────────────────────

fn enter_paused(m: &mut StateMachine, _now: u64) {
    m.listeners
        .subscribe(ListenerOwner::Paused, Key::Pause, Command::Resume);
    m.bind_quit_keys(false);
    m.overlays.insert(Overlay::PauseMenu);
    if let Some(music) = m.music.as_mut() {
        music.paused = true;
    }
}

fn exit_paused(m: &mut StateMachine, _now: u64) {
    m.listeners
        .unsubscribe_owner(GameStatus::Paused.listener_owner());
    m.quit_bindings.clear();
    m.overlays.remove(&Overlay::PauseMenu);
    m.overlays.remove(&Overlay::ConfirmQuit);
    if let Some(music) = m.music.as_mut() {
        music.paused = false;
    }
}

// ── Game over ─────────────────────────────────────────────────────────────────

fn enter_game_over(m: &mut StateMachine, now: u64) {
    m.release_session_effects();
    m.overlays.insert(Overlay::GameOver);
    m.record_run(now);

    let owner = ListenerOwner::GameOver;
    m.listeners.subscribe(owner, Key::Confirm, Command::Restart);
    m.listeners.subscribe(owner, Key::Cancel, Command::ReturnToMenu);
}

fn exit_game_over(m: &mut StateMachine, _now: u64) {
    m.listeners
        .unsubscribe_owner(GameStatus::GameOver.listener_owner());
    m.overlays.remove(&Overlay::GameOver);
    m.game_over_at = None;
}

// ── Shared update / render ────────────────────────────────────────────────────

fn update_idle(_m: &mut StateMachine, _now: u64, _input: &InputState) {}

/// Gameplay frozen; explosions and particles keep animating.
fn update_frozen(m: &mut StateMachine, _now: u64, _input: &InputState) {
    if let Some(session) = m.session.as_mut() {
        compute::advance_cosmetics(&mut session.state);
        m.events.append(&mut session.state.events);
    }
}

fn render_menu(m: &StateMachine, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
    renderer.clear()?;
    renderer.present(&m.presented())
}

fn render_session(m: &StateMachine, renderer: &mut dyn Renderer) -> Result<(), RenderError> {
    renderer.clear()?;
    if let Some(session) = &m.session {
        renderer.render(&session.state, &session.player)?;
    }
    renderer.present(&m.presented())
}
