//! Logical input: the held-key map the coordinator reads, and the
//! per-state key bindings that turn presses into state-machine commands.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Dash,
    Pause,
    Confirm,
    Cancel,
}

/// Live pressed-state per logical key, written by the host and only read by the core.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    pressed: HashMap<Key, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        self.pressed.insert(key, pressed);
    }

    pub fn with(mut self, key: Key) -> Self {
        self.set(key, true);
        self
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.get(&key).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

// ── Bindings ──────────────────────────────────────────────────────────────────

/// Requests the state machine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Pause,
    Resume,
    /// Ask for quit confirmation while paused.
    RequestQuit,
    ConfirmQuit,
    CancelQuit,
    Restart,
    ReturnToMenu,
    ToggleControls,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Which state registered a binding; `exit` removes everything its owner added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerOwner {
    Menu,
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, Debug)]
struct Binding {
    id: ListenerId,
    owner: ListenerOwner,
    key: Key,
    command: Command,
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    bindings: Vec<Binding>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, owner: ListenerOwner, key: Key, command: Command) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.bindings.push(Binding {
            id,
            owner,
            key,
            command,
        });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != id);
        self.bindings.len() != before
    }

    /// Remove every binding `owner` registered. Returns how many were removed.
    pub fn unsubscribe_owner(&mut self, owner: ListenerOwner) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.owner != owner);
        before - self.bindings.len()
    }

    /// Commands bound to `key`, one per registered binding, in registration order.
    pub fn dispatch(&self, key: Key) -> Vec<Command> {
        self.bindings
            .iter()
            .filter(|b| b.key == key)
            .map(|b| b.command)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn count_for(&self, owner: ListenerOwner) -> usize {
        self.bindings.iter().filter(|b| b.owner == owner).count()
    }
}
