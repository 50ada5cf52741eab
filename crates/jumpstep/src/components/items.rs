//! Collectibles, interactive blocks, cosmetic particles and level fixtures.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::level::grid::TILE_SIZE;
use crate::physics::body::Body;

pub const COIN_SIZE: Vec2 = Vec2::new(20.0, 24.0);
pub const ITEM_SIZE: Vec2 = Vec2::new(28.0, 28.0);
pub const PLATFORM_SIZE: Vec2 = Vec2::new(96.0, 16.0);
/// Ticks a block-spawned coin floats before it is counted.
pub const COIN_POP_TICKS: u32 = 30;
/// Ticks a power-up takes to rise out of its block.
pub const EMERGE_TICKS: u32 = 32;
pub const BUMP_TICKS: u32 = 10;
const PLATFORM_RANGE: f32 = 64.0;
const PLATFORM_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Mushroom,
    Flower,
}

/// What a block yields when struck from below. Fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reward {
    Coin,
    PowerUp(PowerUpKind),
    /// Plain brick: breakable by a powered-up player, otherwise only bumps.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
    /// Block coins float upward for this many ticks before being counted.
    pub pop: Option<u32>,
    pub vel_y: f32,
}

impl Coin {
    /// A coin placed in the level, collected on touch.
    pub fn placed(cell_origin: Vec2) -> Self {
        Self {
            pos: cell_origin + (Vec2::splat(TILE_SIZE) - COIN_SIZE) * 0.5,
            collected: false,
            pop: None,
            vel_y: 0.0,
        }
    }

    /// A coin popping out of a struck block.
    pub fn popped(block_origin: Vec2) -> Self {
        Self {
            pos: block_origin + Vec2::new((TILE_SIZE - COIN_SIZE.x) * 0.5, -COIN_SIZE.y),
            collected: false,
            pop: Some(COIN_POP_TICKS),
            vel_y: -8.0,
        }
    }

    pub fn body(&self) -> Body {
        Body::new(self.pos, COIN_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub col: i32,
    pub row: i32,
    pub reward: Reward,
    pub hit: bool,
    /// Cosmetic bump countdown after being struck.
    pub bump: u32,
}

impl Block {
    pub fn new(col: i32, row: i32, reward: Reward) -> Self {
        Self {
            col,
            row,
            reward,
            hit: false,
            bump: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpItem {
    pub body: Body,
    pub kind: PowerUpKind,
    /// Remaining rise-out-of-block ticks; physics starts at zero.
    pub emerge: u32,
    pub alive: bool,
}

impl PowerUpItem {
    pub fn emerging(kind: PowerUpKind, block_origin: Vec2) -> Self {
        let pos = block_origin + Vec2::new((TILE_SIZE - ITEM_SIZE.x) * 0.5, TILE_SIZE - ITEM_SIZE.y);
        Self {
            body: Body::new(pos, ITEM_SIZE),
            kind,
            emerge: EMERGE_TICKS,
            alive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    /// Brick fragment, falls under gravity.
    Debris,
    /// Floating score number.
    Score(u32),
    /// Shockwave / dig dust.
    Dust,
}

/// Purely cosmetic; never feeds back into the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub kind: ParticleKind,
}

impl Particle {
    const GRAVITY: f32 = 0.4;
    const POPUP_RISE: f32 = -1.0;

    pub fn debris(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            life: 60,
            kind: ParticleKind::Debris,
        }
    }

    pub fn score(pos: Vec2, points: u32) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, Self::POPUP_RISE),
            life: 40,
            kind: ParticleKind::Score(points),
        }
    }

    pub fn dust(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            life: 20,
            kind: ParticleKind::Dust,
        }
    }

    /// Advance one tick. Returns false when expired.
    pub fn tick(&mut self) -> bool {
        if self.life == 0 {
            return false;
        }
        self.life -= 1;
        if self.kind == ParticleKind::Debris {
            self.vel.y += Self::GRAVITY;
        } else {
            self.vel *= 0.95;
        }
        self.pos += self.vel;
        self.life > 0
    }
}

/// Horizontally oscillating platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingPlatform {
    pub pos: Vec2,
    pub size: Vec2,
    pub center_x: f32,
    pub range: f32,
    /// +1 or -1.
    pub dir: f32,
    pub speed: f32,
    /// Horizontal displacement applied this tick; riders are carried by it.
    pub delta: f32,
}

impl MovingPlatform {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: PLATFORM_SIZE,
            center_x: pos.x,
            range: PLATFORM_RANGE,
            dir: 1.0,
            speed: PLATFORM_SPEED,
            delta: 0.0,
        }
    }

    /// Platform centred on a marker cell.
    pub fn at_cell(cell_origin: Vec2) -> Self {
        Self::new(Vec2::new(
            cell_origin.x + (TILE_SIZE - PLATFORM_SIZE.x) * 0.5,
            cell_origin.y,
        ))
    }

    pub fn update(&mut self) {
        let mut next = self.pos.x + self.dir * self.speed;
        if (next - self.center_x).abs() > self.range {
            next = self.center_x + self.range * self.dir;
            self.dir = -self.dir;
        }
        self.delta = next - self.pos.x;
        self.pos.x = next;
    }
}

/// Diggable ground cell paired with a sub-level entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigSpot {
    pub col: i32,
    pub row: i32,
    /// Feet anchor in the sub-level; `None` if no entry marker was left to pair.
    pub target: Option<Vec2>,
}

/// Sub-level exit paired with the dig spot of the same index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarpExit {
    pub col: i32,
    pub row: i32,
    /// Feet anchor on top of the paired dig spot.
    pub return_to: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flag {
    /// Top-left of the marker cell; the pole runs down to the ground.
    pub pos: Vec2,
    pub reached: bool,
}

impl Flag {
    pub fn new(cell_origin: Vec2) -> Self {
        Self {
            pos: cell_origin,
            reached: false,
        }
    }

    /// x coordinate the player must cross.
    pub fn pole_x(&self) -> f32 {
        self.pos.x + TILE_SIZE * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_expires() {
        let mut p = Particle::debris(Vec2::ZERO, Vec2::new(1.0, -3.0));
        p.life = 1;
        assert!(!p.tick(), "particle should expire");
        assert!(!p.tick());
    }

    #[test]
    fn debris_falls() {
        let mut p = Particle::debris(Vec2::ZERO, Vec2::ZERO);
        for _ in 0..10 {
            p.tick();
        }
        assert!(p.pos.y > 0.0);
    }

    #[test]
    fn score_popup_rises() {
        let mut p = Particle::score(Vec2::new(0.0, 100.0), 100);
        assert!(p.tick());
        assert!(p.pos.y < 100.0);
    }

    #[test]
    fn platform_oscillates_within_range() {
        let mut platform = MovingPlatform::new(Vec2::new(200.0, 100.0));
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for _ in 0..400 {
            platform.update();
            min_x = min_x.min(platform.pos.x);
            max_x = max_x.max(platform.pos.x);
            assert!(platform.delta.abs() <= platform.speed + 1e-4);
        }
        assert!((max_x - 264.0).abs() < 1e-3);
        assert!((min_x - 136.0).abs() < 1e-3);
    }

    #[test]
    fn popped_coin_starts_above_block() {
        let coin = Coin::popped(Vec2::new(64.0, 96.0));
        assert!(coin.pos.y < 96.0);
        assert_eq!(coin.pop, Some(COIN_POP_TICKS));
    }
}
