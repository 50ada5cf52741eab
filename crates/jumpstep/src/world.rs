//! Per-level simulation state and the playing-phase tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::companion::{Companion, CompanionState};
use crate::components::enemy::Enemy;
use crate::components::items::{
    Block, Coin, DigSpot, Flag, MovingPlatform, Particle, PowerUpItem, WarpExit,
};
use crate::components::player::{Character, Player, PowerTier};
use crate::core::rng::Rng;
use crate::input::state::InputState;
use crate::level::grid::{TileGrid, TILE_SIZE};
use crate::level::table::level_def;
use crate::physics::{GRAVITY, MAX_FALL};
use crate::systems::{blocks, camera, combat, companion, enemies, player, warp};
use crate::systems::camera::Camera;
use crate::systems::warp::WarpAnimation;

/// Distance below the playable area at which a falling player is lost.
pub const FALL_MARGIN: f32 = 64.0;
/// Ticks per level-timer unit.
pub const TICKS_PER_TIME_UNIT: u32 = 60;
pub const HURRY_TIME: u32 = 100;

/// State carried into the next level when advancing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOver {
    pub tier: PowerTier,
    pub mounted: bool,
}

/// Session counters that survive level reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub score: u32,
    pub lives: u32,
    pub coins: u32,
}

impl Stats {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            coins: 0,
        }
    }
}

/// Transient on-screen message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub text: &'static str,
    pub ticks: u32,
}

/// What a playing tick ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    Continue,
    Died,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
pub struct World {
    pub level_index: usize,
    pub level_name: &'static str,
    pub background: &'static str,
    pub grid: TileGrid,
    pub sub_level_row: Option<usize>,
    pub in_sub_level: bool,
    pub character: Character,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub companion: Option<Companion>,
    pub coins: Vec<Coin>,
    pub blocks: Vec<Block>,
    pub powerups: Vec<PowerUpItem>,
    pub particles: Vec<Particle>,
    pub platforms: Vec<MovingPlatform>,
    pub dig_spots: Vec<DigSpot>,
    pub warp_exits: Vec<WarpExit>,
    pub flag: Option<Flag>,
    pub warp: Option<WarpAnimation>,
    pub hint: Option<Hint>,
    pub camera: Camera,
    pub stats: Stats,
    /// Remaining time units; 0 with `time_limit == 0` means untimed.
    pub time: u32,
    pub time_limit: u32,
    pub time_ticks: u32,
    /// Ticks simulated in this level; drives cyclic animations.
    pub frame: u64,
    pub boss_defeated: bool,
    pub level_complete: bool,
    #[serde(skip)]
    pub rng: Rng,
}

impl World {
    /// Build a fresh level, keeping `stats` and applying `carry`.
    pub fn load(
        index: usize,
        character: Character,
        stats: Stats,
        carry: CarryOver,
        viewport: Vec2,
        seed: u64,
    ) -> Self {
        let (index, def) = level_def(index);
        let parsed = def.parse();
        let grid = parsed.grid;

        let start = parsed
            .player_start
            .unwrap_or_else(|| TileGrid::feet_anchor(1, grid.height() as i32 - 2));
        let mut player = Player::new(start, carry.tier);

        let mut companion = parsed.companion.map(Companion::new);
        if carry.mounted {
            let mut mount = Companion::new(parsed.companion.unwrap_or(start));
            mount.state = CompanionState::Mounted;
            mount.body.place_feet(start);
            player.set_riding(true);
            companion = Some(mount);
        }

        let enemies = parsed
            .enemies
            .iter()
            .map(|spawn| Enemy::spawn(spawn.kind, spawn.anchor))
            .collect();

        log::info!(
            "loaded level {} '{}' ({}x{}), tier {:?}, mounted {}",
            index,
            def.name,
            grid.width(),
            grid.height(),
            carry.tier,
            carry.mounted
        );

        let mut world = Self {
            level_index: index,
            level_name: def.name,
            background: def.background,
            sub_level_row: def.sub_level_row,
            in_sub_level: false,
            character,
            player,
            enemies,
            companion,
            coins: parsed.coins.into_iter().map(Coin::placed).collect(),
            blocks: parsed.blocks,
            powerups: Vec::new(),
            particles: Vec::new(),
            platforms: parsed.platforms.into_iter().map(MovingPlatform::at_cell).collect(),
            dig_spots: parsed.dig_spots,
            warp_exits: parsed.warp_exits,
            flag: parsed.flag.map(Flag::new),
            warp: None,
            hint: None,
            camera: Camera::new(viewport),
            stats,
            time: def.time_limit,
            time_limit: def.time_limit,
            time_ticks: 0,
            frame: 0,
            boss_defeated: false,
            level_complete: false,
            rng: Rng::new(seed),
            grid,
        };
        let target = camera::target_offset(&world);
        world.camera.snap(target);
        world
    }

    pub fn carry_over(&self) -> CarryOver {
        CarryOver {
            tier: self.player.tier,
            mounted: self.companion.as_ref().is_some_and(|c| c.is_mounted()),
        }
    }

    /// Bottom edge of the main (above-ground) area.
    pub fn main_bottom(&self) -> f32 {
        match self.sub_level_row {
            Some(row) => row as f32 * TILE_SIZE,
            None => self.grid.height_px(),
        }
    }

    /// Top edge of the sub-level area, if the level has one.
    pub fn sub_level_top(&self) -> Option<f32> {
        self.sub_level_row.map(|row| row as f32 * TILE_SIZE)
    }

    /// y beyond which the player has fallen out of the current area.
    pub fn kill_line(&self) -> f32 {
        let bottom = if self.in_sub_level {
            self.grid.height_px()
        } else {
            self.main_bottom()
        };
        bottom + FALL_MARGIN
    }

    /// Add points with a floating popup.
    pub fn award(&mut self, points: u32, at: Vec2) {
        self.stats.score += points;
        self.particles.push(Particle::score(at, points));
    }

    /// Count one coin; every hundredth grants a life.
    pub fn award_coin(&mut self, ctx: &mut EngineContext, at: Vec2) {
        self.stats.coins += 1;
        self.award(100, at);
        if self.stats.coins >= 100 {
            self.stats.coins -= 100;
            self.stats.lives += 1;
            ctx.emit_sound(SoundEvent::ONE_UP);
        }
    }

    /// Advance one playing tick.
    pub fn step(&mut self, ctx: &mut EngineContext, input: &InputState, dt: f32) -> LevelEvent {
        if self.warp.is_some() {
            warp::update(self, ctx);
            return LevelEvent::Continue;
        }
        if warp::try_start(self, ctx, input) {
            return LevelEvent::Continue;
        }

        self.frame += 1;
        for platform in &mut self.platforms {
            platform.update();
        }

        companion::handle_input(self, ctx, input);
        if let Some((col, row)) = player::update(self, ctx, input) {
            blocks::strike(self, ctx, col, row);
        }
        companion::update(self, ctx);
        player::update_fireballs(self);
        enemies::update(self, ctx);
        combat::resolve(self, ctx);
        blocks::update_items(self, ctx);
        self.tick_timer(ctx);
        self.check_flag(ctx);
        if let Some(hint) = self.hint.as_mut() {
            hint.ticks = hint.ticks.saturating_sub(1);
            if hint.ticks == 0 {
                self.hint = None;
            }
        }
        camera::update(self, dt);
        enemies::remove_finished(self);

        if !self.player.alive {
            LevelEvent::Died
        } else if self.level_complete {
            LevelEvent::Completed
        } else {
            LevelEvent::Continue
        }
    }

    /// Death animation: the player pops up and falls through everything.
    pub fn step_dying(&mut self) {
        let body = &mut self.player.body;
        body.apply_gravity(GRAVITY, MAX_FALL);
        body.pos += body.vel;
        self.particles.retain_mut(|p| p.tick());
    }

    fn tick_timer(&mut self, ctx: &mut EngineContext) {
        if self.time_limit == 0 || !self.player.alive || self.level_complete {
            return;
        }
        self.time_ticks += 1;
        if self.time_ticks < TICKS_PER_TIME_UNIT {
            return;
        }
        self.time_ticks = 0;
        self.time = self.time.saturating_sub(1);
        if self.time == HURRY_TIME {
            ctx.emit_sound(SoundEvent::HURRY);
        }
        if self.time == 0 {
            log::info!("time up in level {}", self.level_index);
            player::kill(self, ctx);
        }
    }

    fn check_flag(&mut self, ctx: &mut EngineContext) {
        if !self.player.alive {
            return;
        }
        let Some(flag) = self.flag.as_mut() else {
            return;
        };
        if flag.reached || self.player.body.right() < flag.pole_x() {
            return;
        }
        flag.reached = true;
        let at = flag.pos;
        self.level_complete = true;
        let bonus = 1000 + 10 * self.time;
        self.award(bonus, at);
        ctx.emit_sound(SoundEvent::FLAG);
        log::info!("flag reached in level {}, bonus {}", self.level_index, bonus);
    }
}
