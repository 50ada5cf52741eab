use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::player::Facing;
use crate::physics::body::Body;

pub const COMPANION_SIZE: Vec2 = Vec2::new(30.0, 32.0);

/// Explicit mount state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionState {
    /// Idling (and digging) where it stands.
    Free,
    /// Carrying the player; position is slaved to the rider.
    Mounted,
    /// Left alone away from its spawn for too long; walking home.
    Fleeing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionAnim {
    Idle,
    Dig,
    Walk,
    Ride,
    Tongue,
    Dive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Companion {
    pub body: Body,
    pub state: CompanionState,
    pub facing: Facing,
    /// Feet anchor it returns to.
    pub spawn: Vec2,
    /// Visible tongue ticks remaining.
    pub tongue: u32,
    pub tongue_cooldown: u32,
    pub diving: bool,
    /// The dive is one-shot per airtime.
    pub dive_used: bool,
    /// Ticks spent free since the last dismount.
    pub idle_ticks: u32,
    /// Derived each tick by `companion_anim`; only read by the presentation layer.
    pub anim: CompanionAnim,
}

impl Companion {
    pub fn new(anchor: Vec2) -> Self {
        Self {
            body: Body::standing_at(anchor, COMPANION_SIZE),
            state: CompanionState::Free,
            facing: Facing::Left,
            spawn: anchor,
            tongue: 0,
            tongue_cooldown: 0,
            diving: false,
            dive_used: false,
            idle_ticks: 0,
            anim: CompanionAnim::Idle,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state == CompanionState::Mounted
    }
}

/// Pure function of state and the level frame counter.
pub fn companion_anim(companion: &Companion, frame: u64) -> CompanionAnim {
    match companion.state {
        CompanionState::Mounted if companion.tongue > 0 => CompanionAnim::Tongue,
        CompanionState::Mounted if companion.diving => CompanionAnim::Dive,
        CompanionState::Mounted => CompanionAnim::Ride,
        CompanionState::Fleeing => CompanionAnim::Walk,
        CompanionState::Free => {
            if (frame / 90) % 2 == 0 {
                CompanionAnim::Idle
            } else {
                CompanionAnim::Dig
            }
        }
    }
}
