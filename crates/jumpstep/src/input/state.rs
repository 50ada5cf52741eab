use serde::{Deserialize, Serialize};

/// Abstract input identifiers the engine understands.
/// Device mapping (keys, touch buttons) happens outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Run,
    /// Companion ability (tongue on the ground, dive in the air).
    Action,
    Confirm,
    Cancel,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
        Action::Jump,
        Action::Run,
        Action::Action,
        Action::Confirm,
        Action::Cancel,
    ];

    fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Parse the host-side name of an action.
    pub fn from_name(name: &str) -> Option<Action> {
        match name {
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "up" => Some(Action::Up),
            "down" => Some(Action::Down),
            "jump" => Some(Action::Jump),
            "run" => Some(Action::Run),
            "action" => Some(Action::Action),
            "confirm" => Some(Action::Confirm),
            "cancel" => Some(Action::Cancel),
            _ => None,
        }
    }
}

/// The set of actions held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    bits: u16,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: Action) -> Self {
        self.press(action);
        self
    }

    pub fn press(&mut self, action: Action) {
        self.bits |= action.bit();
    }

    pub fn release(&mut self, action: Action) {
        self.bits &= !action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.bits & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Union of two snapshots.
    pub fn merge(self, other: InputSnapshot) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.contains(*a))
    }
}

impl FromIterator<Action> for InputSnapshot {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut snapshot = InputSnapshot::new();
        for action in iter {
            snapshot.press(action);
        }
        snapshot
    }
}

/// Edge detector over successive held-input snapshots.
///
/// `advance` is called once per tick with the caller's fresh snapshot;
/// `pressed` is true only on the first tick an action is held.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    current: InputSnapshot,
    previous: InputSnapshot,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the current snapshot into history and adopt `next`.
    pub fn advance(&mut self, next: InputSnapshot) {
        self.previous = self.current;
        self.current = next;
    }

    /// Level-triggered query.
    pub fn held(&self, action: Action) -> bool {
        self.current.contains(action)
    }

    /// Edge-triggered query: held now, not held last tick.
    pub fn pressed(&self, action: Action) -> bool {
        self.current.contains(action) && !self.previous.contains(action)
    }

    pub fn released(&self, action: Action) -> bool {
        !self.current.contains(action) && self.previous.contains(action)
    }

    /// Horizontal intent: -1 (left), 0, or 1 (right).
    pub fn axis_x(&self) -> f32 {
        let mut dir = 0.0;
        if self.held(Action::Left) {
            dir -= 1.0;
        }
        if self.held(Action::Right) {
            dir += 1.0;
        }
        dir
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.current
    }
}
