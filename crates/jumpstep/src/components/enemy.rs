use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::body::Body;

pub const GOOMBA_SIZE: Vec2 = Vec2::new(28.0, 28.0);
pub const KOOPA_SIZE: Vec2 = Vec2::new(28.0, 44.0);
pub const SHELL_SIZE: Vec2 = Vec2::new(28.0, 28.0);
pub const PLANT_SIZE: Vec2 = Vec2::new(24.0, 40.0);
pub const LADYBUG_SIZE: Vec2 = Vec2::new(28.0, 24.0);
pub const BOSS_SIZE: Vec2 = Vec2::new(60.0, 64.0);

pub const PATROL_SPEED: f32 = 1.0;
pub const LADYBUG_SPEED: f32 = 1.2;
pub const BOSS_MAX_HP: u32 = 3;

/// Plant cycle: hidden, rising, exposed, retracting (ticks).
pub const PLANT_HIDDEN: u64 = 80;
pub const PLANT_RISING: u64 = 20;
pub const PLANT_EXPOSED: u64 = 80;
pub const PLANT_RETRACTING: u64 = 20;
pub const PLANT_CYCLE: u64 = PLANT_HIDDEN + PLANT_RISING + PLANT_EXPOSED + PLANT_RETRACTING;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Goomba,
    Koopa,
    Plant,
    Boss,
    Ladybug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyState {
    Walk,
    Shell,
    ShellSlide,
    Dead,
}

/// How a dead enemy leaves the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathStyle {
    /// Flattened in place (stomp).
    Squish,
    /// Flipped and falls through the floor (shell, fireball, tongue, slam).
    Knocked,
    /// Shrinks and vanishes (boss).
    Shrink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossData {
    pub hp: u32,
    pub max_hp: u32,
    /// Invulnerable and frozen while positive.
    pub stun: u32,
    pub jump_timer: u32,
    /// Set while airborne from a leap, cleared on the landing pound.
    pub leaping: bool,
}

impl BossData {
    pub fn new() -> Self {
        Self {
            hp: BOSS_MAX_HP,
            max_hp: BOSS_MAX_HP,
            stun: 0,
            jump_timer: 120,
            leaping: false,
        }
    }

    /// 1 at full health, rising by one per hit taken.
    pub fn phase(&self) -> u32 {
        self.max_hp.saturating_sub(self.hp) + 1
    }
}

impl Default for BossData {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyExtra {
    None,
    Boss(BossData),
    /// Flight baseline y.
    Ladybug { baseline: f32 },
    /// Fully-exposed top-left; the plant hides below it.
    Plant { origin: Vec2 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub state: EnemyState,
    /// Ticks until a dead enemy is dropped from the world.
    pub squish: u32,
    pub death: Option<DeathStyle>,
    /// Shell countdown until the koopa stands back up.
    pub shell_timer: u32,
    /// Ticks during which a freshly kicked shell ignores the player.
    pub kick_grace: u32,
    pub extra: EnemyExtra,
}

impl Enemy {
    /// Spawn an enemy of `kind` standing on `anchor` (bottom-centre of its cell).
    pub fn spawn(kind: EnemyKind, anchor: Vec2) -> Self {
        let (size, vel, extra) = match kind {
            EnemyKind::Goomba => (GOOMBA_SIZE, Vec2::new(-PATROL_SPEED, 0.0), EnemyExtra::None),
            EnemyKind::Koopa => (KOOPA_SIZE, Vec2::new(-PATROL_SPEED, 0.0), EnemyExtra::None),
            EnemyKind::Plant => (PLANT_SIZE, Vec2::ZERO, EnemyExtra::None),
            EnemyKind::Ladybug => (LADYBUG_SIZE, Vec2::new(-LADYBUG_SPEED, 0.0), EnemyExtra::None),
            EnemyKind::Boss => (BOSS_SIZE, Vec2::ZERO, EnemyExtra::Boss(BossData::new())),
        };
        let body = Body::standing_at(anchor, size).with_velocity(vel);
        let extra = match kind {
            EnemyKind::Ladybug => EnemyExtra::Ladybug { baseline: body.pos.y },
            EnemyKind::Plant => EnemyExtra::Plant { origin: body.pos },
            _ => extra,
        };
        Self {
            body,
            kind,
            state: EnemyState::Walk,
            squish: 0,
            death: None,
            shell_timer: 0,
            kick_grace: 0,
            extra,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }

    pub fn boss(&self) -> Option<&BossData> {
        match &self.extra {
            EnemyExtra::Boss(data) => Some(data),
            _ => None,
        }
    }

    pub fn boss_mut(&mut self) -> Option<&mut BossData> {
        match &mut self.extra {
            EnemyExtra::Boss(data) => Some(data),
            _ => None,
        }
    }

    /// Begin the death countdown. Dead enemies never come back.
    pub fn kill(&mut self, style: DeathStyle, ticks: u32) {
        self.state = EnemyState::Dead;
        self.death = Some(style);
        self.squish = ticks;
        match style {
            DeathStyle::Squish | DeathStyle::Shrink => self.body.vel = Vec2::ZERO,
            DeathStyle::Knocked => self.body.vel = Vec2::new(self.body.vel.x.signum() * 1.0, -6.0),
        }
    }
}

/// Where in its cycle a plant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantPhase {
    Hidden,
    Rising,
    Exposed,
    Retracting,
}

/// Pure function of the level frame counter.
pub fn plant_phase(frame: u64) -> PlantPhase {
    let t = frame % PLANT_CYCLE;
    if t < PLANT_HIDDEN {
        PlantPhase::Hidden
    } else if t < PLANT_HIDDEN + PLANT_RISING {
        PlantPhase::Rising
    } else if t < PLANT_HIDDEN + PLANT_RISING + PLANT_EXPOSED {
        PlantPhase::Exposed
    } else {
        PlantPhase::Retracting
    }
}

/// How far (0..=1) the plant sticks out of its pipe.
pub fn plant_extension(frame: u64) -> f32 {
    let t = frame % PLANT_CYCLE;
    match plant_phase(frame) {
        PlantPhase::Hidden => 0.0,
        PlantPhase::Rising => (t - PLANT_HIDDEN) as f32 / PLANT_RISING as f32,
        PlantPhase::Exposed => 1.0,
        PlantPhase::Retracting => {
            1.0 - (t - PLANT_HIDDEN - PLANT_RISING - PLANT_EXPOSED) as f32 / PLANT_RETRACTING as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_cycle_phases() {
        assert_eq!(plant_phase(0), PlantPhase::Hidden);
        assert_eq!(plant_phase(PLANT_HIDDEN), PlantPhase::Rising);
        assert_eq!(plant_phase(PLANT_HIDDEN + PLANT_RISING), PlantPhase::Exposed);
        assert_eq!(plant_phase(PLANT_CYCLE - 1), PlantPhase::Retracting);
        assert_eq!(plant_phase(PLANT_CYCLE), PlantPhase::Hidden);
        assert_eq!(plant_extension(PLANT_HIDDEN + PLANT_RISING + 5), 1.0);
        assert!(plant_extension(PLANT_HIDDEN + 10) > 0.4 && plant_extension(PLANT_HIDDEN + 10) < 0.6);
    }

    #[test]
    fn boss_phase_escalates_with_damage() {
        let mut boss = BossData::new();
        assert_eq!(boss.phase(), 1);
        boss.hp -= 1;
        assert_eq!(boss.phase(), 2);
        boss.hp = 0;
        assert_eq!(boss.phase(), BOSS_MAX_HP + 1);
    }

    #[test]
    fn spawn_stands_on_anchor() {
        let koopa = Enemy::spawn(EnemyKind::Koopa, Vec2::new(48.0, 128.0));
        assert_eq!(koopa.body.bottom(), 128.0);
        assert_eq!(koopa.state, EnemyState::Walk);
        let bug = Enemy::spawn(EnemyKind::Ladybug, Vec2::new(48.0, 128.0));
        assert_eq!(bug.extra, EnemyExtra::Ladybug { baseline: 104.0 });
        assert!(Enemy::spawn(EnemyKind::Boss, Vec2::ZERO).boss().is_some());
    }
}
