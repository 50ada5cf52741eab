use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::items::PowerUpKind;
use crate::physics::body::Body;

pub const SMALL_SIZE: Vec2 = Vec2::new(24.0, 30.0);
pub const BIG_SIZE: Vec2 = Vec2::new(24.0, 58.0);
/// Extra hitbox height while riding the companion.
pub const RIDE_LIFT: f32 = 32.0;
pub const FIREBALL_SIZE: Vec2 = Vec2::new(12.0, 12.0);
pub const MAX_FIREBALLS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerTier {
    #[default]
    None,
    Big,
    Fire,
}

impl PowerTier {
    /// One step down, or `None` when damage is lethal.
    pub fn step_down(self) -> Option<PowerTier> {
        match self {
            PowerTier::Fire => Some(PowerTier::Big),
            PowerTier::Big => Some(PowerTier::None),
            PowerTier::None => None,
        }
    }

    /// Tier after collecting a power-up. Never moves down, at most one step up.
    pub fn advance(self, kind: PowerUpKind) -> PowerTier {
        match (self, kind) {
            (PowerTier::None, _) => PowerTier::Big,
            (PowerTier::Big, PowerUpKind::Flower) => PowerTier::Fire,
            (tier, _) => tier,
        }
    }

    pub fn body_size(self) -> Vec2 {
        match self {
            PowerTier::None => SMALL_SIZE,
            PowerTier::Big | PowerTier::Fire => BIG_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_sign(x: f32) -> Option<Facing> {
        if x < 0.0 {
            Some(Facing::Left)
        } else if x > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// Selectable characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    #[default]
    Mario,
    Luigi,
    Peach,
    Toad,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterProfile {
    pub speed: f32,
    pub jump: f32,
    pub can_float: bool,
}

impl Character {
    pub const ALL: [Character; 4] = [Character::Mario, Character::Luigi, Character::Peach, Character::Toad];

    pub fn profile(self) -> CharacterProfile {
        match self {
            Character::Mario => CharacterProfile { speed: 1.0, jump: 1.0, can_float: false },
            Character::Luigi => CharacterProfile { speed: 0.95, jump: 1.15, can_float: false },
            Character::Peach => CharacterProfile { speed: 0.9, jump: 0.95, can_float: true },
            Character::Toad => CharacterProfile { speed: 1.15, jump: 0.9, can_float: false },
        }
    }
}

/// Derived each tick from motion, tier and timers; never read back by logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimState {
    #[default]
    Idle,
    Walk,
    Run,
    Jump,
    Fall,
    Float,
    WallSlide,
    Grow,
    Ride,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlayerTimers {
    pub invincible: u32,
    pub coyote: u32,
    pub jump_buffer: u32,
    /// Float ticks spent since last grounded.
    pub float: u32,
    pub grow: u32,
    pub mount_cooldown: u32,
    pub fire_cooldown: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fireball {
    pub body: Body,
    pub bounces: u32,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    pub alive: bool,
    pub tier: PowerTier,
    pub anim: AnimState,
    pub timers: PlayerTimers,
    pub fireballs: Vec<Fireball>,
    /// Riding the companion (hitbox includes the mount).
    pub riding: bool,
    pub floating: bool,
    pub wall_sliding: bool,
    /// Side of a wall touched during the last sweep.
    pub wall_contact: Option<Facing>,
}

impl Player {
    pub fn new(anchor: Vec2, tier: PowerTier) -> Self {
        Self {
            body: Body::standing_at(anchor, tier.body_size()),
            facing: Facing::Right,
            alive: true,
            tier,
            anim: AnimState::Idle,
            timers: PlayerTimers::default(),
            fireballs: Vec::with_capacity(MAX_FIREBALLS),
            riding: false,
            floating: false,
            wall_sliding: false,
            wall_contact: None,
        }
    }

    /// Hitbox for the current tier and mount state.
    pub fn hitbox_size(&self) -> Vec2 {
        let size = self.tier.body_size();
        if self.riding {
            size + Vec2::new(0.0, RIDE_LIFT)
        } else {
            size
        }
    }

    /// Re-derive the hitbox, keeping the feet planted.
    pub fn refresh_hitbox(&mut self) {
        let size = self.hitbox_size();
        self.body.resize_keep_feet(size);
    }

    pub fn set_tier(&mut self, tier: PowerTier) {
        self.tier = tier;
        self.refresh_hitbox();
    }

    pub fn set_riding(&mut self, riding: bool) {
        self.riding = riding;
        self.refresh_hitbox();
    }

    pub fn is_invincible(&self) -> bool {
        self.timers.invincible > 0
    }
}

/// Animation as a pure function of the player's current state.
pub fn animation_for(player: &Player) -> AnimState {
    if !player.alive {
        return AnimState::Dead;
    }
    if player.timers.grow > 0 {
        return AnimState::Grow;
    }
    if player.riding {
        return AnimState::Ride;
    }
    let body = &player.body;
    if !body.on_ground {
        if player.wall_sliding {
            return AnimState::WallSlide;
        }
        if player.floating {
            return AnimState::Float;
        }
        return if body.vel.y < 0.0 { AnimState::Jump } else { AnimState::Fall };
    }
    let speed = body.vel.x.abs();
    if speed > 3.5 {
        AnimState::Run
    } else if speed > 0.1 {
        AnimState::Walk
    } else {
        AnimState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_down_is_single_step() {
        assert_eq!(PowerTier::Fire.step_down(), Some(PowerTier::Big));
        assert_eq!(PowerTier::Big.step_down(), Some(PowerTier::None));
        assert_eq!(PowerTier::None.step_down(), None);
    }

    #[test]
    fn advance_never_skips_or_lowers() {
        assert_eq!(PowerTier::None.advance(PowerUpKind::Mushroom), PowerTier::Big);
        assert_eq!(PowerTier::None.advance(PowerUpKind::Flower), PowerTier::Big);
        assert_eq!(PowerTier::Big.advance(PowerUpKind::Flower), PowerTier::Fire);
        assert_eq!(PowerTier::Fire.advance(PowerUpKind::Mushroom), PowerTier::Fire);
    }

    #[test]
    fn set_tier_keeps_feet() {
        let mut player = Player::new(Vec2::new(100.0, 320.0), PowerTier::None);
        player.set_tier(PowerTier::Big);
        assert_eq!(player.body.bottom(), 320.0);
        assert_eq!(player.body.size, BIG_SIZE);
        player.set_riding(true);
        assert_eq!(player.body.size.y, BIG_SIZE.y + RIDE_LIFT);
        assert_eq!(player.body.bottom(), 320.0);
    }

    #[test]
    fn animation_is_derived() {
        let mut player = Player::new(Vec2::new(100.0, 320.0), PowerTier::None);
        player.body.on_ground = true;
        assert_eq!(animation_for(&player), AnimState::Idle);
        player.body.vel.x = 2.0;
        assert_eq!(animation_for(&player), AnimState::Walk);
        player.body.on_ground = false;
        player.body.vel.y = -3.0;
        assert_eq!(animation_for(&player), AnimState::Jump);
        player.alive = false;
        assert_eq!(animation_for(&player), AnimState::Dead);
    }
}
