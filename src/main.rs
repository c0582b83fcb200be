mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        ModifierKeyCode, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use display::TerminalRenderer;
use stellar_conflict::assets::AssetCatalog;
use stellar_conflict::config::{Difficulty, GameConfig};
use stellar_conflict::error::GameError;
use stellar_conflict::input::{InputState, Key};
use stellar_conflict::machine::{GameStatus, StateMachine};
use stellar_conflict::storage::{MemoryStore, PersistenceStore, RonFileStore};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

const CONFIG_ENV: &str = "STELLAR_CONFLICT_CONFIG";

// ── Key mapping ───────────────────────────────────────────────────────────────

fn logical_key(code: &KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Key::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Key::Right,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Key::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Key::Down,
        KeyCode::Char(' ') => Key::Fire,
        KeyCode::Char('x')
        | KeyCode::Char('X')
        | KeyCode::Modifier(ModifierKeyCode::LeftShift)
        | KeyCode::Modifier(ModifierKeyCode::RightShift) => Key::Dash,
        KeyCode::Char('p') | KeyCode::Char('P') => Key::Pause,
        KeyCode::Enter => Key::Confirm,
        KeyCode::Esc => Key::Cancel,
        _ => return None,
    };
    Some(key)
}

/// Logical keys whose terminal key was seen within the last `HOLD_WINDOW` frames.
fn held_input(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputState {
    let mut input = InputState::new();
    for (code, &last) in key_frame {
        if frame.saturating_sub(last) <= HOLD_WINDOW {
            if let Some(key) = logical_key(code) {
                input.set(key, true);
            }
        }
    }
    input
}

/// One-shot handling of a key press. Returns `true` → quit program.
fn handle_press(machine: &mut StateMachine, code: KeyCode, modifiers: KeyModifiers, now: u64) -> bool {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if machine.status() == GameStatus::Menu {
        let difficulty = match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Char('1') => Some(Difficulty::Easy),
            KeyCode::Char('2') => Some(Difficulty::Normal),
            KeyCode::Char('3') => Some(Difficulty::Hard),
            _ => None,
        };
        if let Some(difficulty) = difficulty {
            machine.set_difficulty(difficulty);
            return false;
        }
    }
    if matches!(code, KeyCode::Char('m') | KeyCode::Char('M')) {
        machine.toggle_mute();
        return false;
    }
    if let Some(key) = logical_key(&code) {
        machine.key_pressed(key, now);
    }
    false
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("stellar_conflict").join("config.ron"))
}

fn open_store() -> Box<dyn PersistenceStore> {
    match RonFileStore::in_data_dir() {
        Ok(store) => {
            log::info!("Saving progress under {}", store.dir().display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!("{e}; progress will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we keep a
/// `key_frame` map with the frame of the last press/repeat event for every
/// key. Each frame the keys still "fresh" form the `InputState` the
/// simulation reads, so Space + arrows can be held together. Presses are
/// also forwarded once to the state machine's key bindings.
fn run<W: Write>(
    machine: &mut StateMachine,
    renderer: &mut TerminalRenderer<W>,
    rx: &mpsc::Receiver<Event>,
) -> Result<(), GameError> {
    let start = Instant::now();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let now = start.elapsed().as_millis() as u64;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code, kind, modifiers, ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        if handle_press(machine, code, modifiers, now) {
                            return Ok(());
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Resize(cols, rows) => renderer.resize(cols, rows),
                _ => {}
            }
        }

        let input = held_input(&key_frame, frame);
        machine.frame(now, &input, renderer);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match config_path() {
        Some(path) => GameConfig::load_or_default(&path),
        None => GameConfig::default(),
    };
    let assets = AssetCatalog::standard();
    assets.validate()?;
    let mut machine = StateMachine::new(config.clone(), Box::new(assets), open_store())?;

    let (cols, rows) = terminal::size()?;
    let mut renderer = TerminalRenderer::new(BufWriter::new(stdout()), cols, rows, &config.viewport);

    terminal::enable_raw_mode()?;
    renderer.writer().execute(terminal::EnterAlternateScreen)?;
    renderer.writer().execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to HOLD_WINDOW.
    let keyboard_enhanced = renderer
        .writer()
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut machine, &mut renderer, &rx);

    // Always restore the terminal
    let out = renderer.writer();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
