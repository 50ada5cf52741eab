use serde::Serialize;

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::player::Character;
use crate::input::state::{Action, InputState};

/// Character select cursor over `Character::ALL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CharacterSelect {
    pub cursor: usize,
}

impl CharacterSelect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Character {
        Character::ALL[self.cursor % Character::ALL.len()]
    }

    /// Left/right cycle, confirm picks.
    pub fn update(&mut self, ctx: &mut EngineContext, input: &InputState) -> Option<Character> {
        let len = Character::ALL.len();
        if input.pressed(Action::Left) {
            self.cursor = (self.cursor + len - 1) % len;
            ctx.emit_sound(SoundEvent::SELECT);
        } else if input.pressed(Action::Right) {
            self.cursor = (self.cursor + 1) % len;
            ctx.emit_sound(SoundEvent::SELECT);
        }
        if input.pressed(Action::Confirm) {
            ctx.emit_sound(SoundEvent::CONFIRM);
            return Some(self.current());
        }
        None
    }
}
