//! Phase orchestrator. Exactly one phase's update runs per tick.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::Serialize;

use crate::api::game::{EngineContext, Game, GameConfig};
use crate::api::types::SoundEvent;
use crate::components::player::Character;
use crate::game::cinematic::{Cinematic, Scene};
use crate::game::demo::DemoPilot;
use crate::game::save::SaveSnapshot;
use crate::game::select::CharacterSelect;
use crate::game::world_map::{is_unlocked, move_cursor, node_for_level, node_views, NodeView, MAP_NODES};
use crate::input::state::{Action, InputState};
use crate::world::{CarryOver, LevelEvent, Stats, World};

/// Length of the death animation before a retry or game over.
pub const DYING_TICKS: u32 = 120;
/// Attract-mode runs restart after this long even without a death.
const DEMO_MAX_TICKS: u32 = 60 * 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Title,
    Cinematic,
    Select,
    World,
    Playing,
    Dying,
    Complete,
    GameOver,
}

/// Progression that survives level loads and is written to saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Progress {
    pub character: Character,
    pub completed: BTreeSet<usize>,
    /// World map node under the cursor.
    pub cursor: usize,
    pub visited_regions: BTreeSet<usize>,
    /// Applied to the next level load; reset on a retry.
    pub carry: CarryOver,
}

struct Demo {
    world: World,
    pilot: DemoPilot,
    input: InputState,
    ticks: u32,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    phase: Phase,
    stats: Stats,
    progress: &'a Progress,
    map: Vec<NodeView>,
    select: CharacterSelect,
    scene: Option<&'a Scene>,
    world: Option<&'a World>,
    demo: Option<&'a World>,
    warp_fade: Option<f32>,
    dying: u32,
}

pub struct Platformer {
    config: GameConfig,
    phase: Phase,
    progress: Progress,
    /// Session counters while no level is loaded; the world owns them
    /// during play.
    stats: Stats,
    select: CharacterSelect,
    cinematic: Option<Cinematic>,
    world: Option<World>,
    demo: Option<Demo>,
    dying: u32,
    seed: u64,
}

impl Platformer {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self {
            stats: Stats::new(config.starting_lives),
            seed: config.demo_seed,
            config,
            phase: Phase::Title,
            progress: Progress::default(),
            select: CharacterSelect::new(),
            cinematic: None,
            world: None,
            demo: None,
            dying: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Score, lives and coins as currently shown.
    pub fn stats(&self) -> Stats {
        self.world.as_ref().map_or(self.stats, |w| w.stats)
    }

    fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.viewport_width, self.config.viewport_height)
    }

    fn new_demo(&self) -> Demo {
        Demo {
            world: World::load(
                0,
                Character::default(),
                Stats::new(self.config.starting_lives),
                CarryOver::default(),
                self.viewport(),
                self.config.demo_seed,
            ),
            pilot: DemoPilot::new(self.config.demo_seed),
            input: InputState::new(),
            ticks: 0,
        }
    }

    fn start_level(&mut self, level: usize) {
        self.seed = self.seed.wrapping_add(1);
        let world = World::load(
            level,
            self.progress.character,
            self.stats,
            self.progress.carry,
            self.viewport(),
            self.seed,
        );
        self.world = Some(world);
        self.phase = Phase::Playing;
    }

    /// Build a save record for the current progression.
    pub fn save(&self, timestamp: u64) -> SaveSnapshot {
        let stats = self.stats();
        let level_index = match &self.world {
            Some(world) => world.level_index,
            None => MAP_NODES.get(self.progress.cursor).map_or(0, |n| n.level),
        };
        SaveSnapshot {
            character: self.progress.character,
            level_index,
            lives: stats.lives,
            score: stats.score,
            coins: stats.coins,
            completed: self.progress.completed.clone(),
            timestamp,
            tier: self.progress.carry.tier,
            mounted: self.progress.carry.mounted,
        }
    }

    /// Resume from a save on the world map.
    pub fn restore(&mut self, save: SaveSnapshot) {
        let cursor = node_for_level(MAP_NODES, save.level_index).unwrap_or(0);
        let visited_regions = MAP_NODES
            .iter()
            .filter(|n| save.completed.contains(&n.level))
            .map(|n| n.region)
            .collect();
        self.progress = Progress {
            character: save.character,
            completed: save.completed,
            cursor,
            visited_regions,
            carry: CarryOver {
                tier: save.tier,
                mounted: save.mounted,
            },
        };
        self.select.cursor = Character::ALL
            .iter()
            .position(|c| *c == save.character)
            .unwrap_or(0);
        self.stats = Stats {
            score: save.score,
            lives: save.lives,
            coins: save.coins,
        };
        self.world = None;
        self.demo = None;
        self.cinematic = None;
        self.phase = Phase::World;
        log::info!(
            "restored save: level {}, {} completed, {} lives",
            save.level_index,
            self.progress.completed.len(),
            save.lives
        );
    }

    fn update_title(&mut self, ctx: &mut EngineContext, input: &InputState) {
        let muted = ctx.muted;
        ctx.muted = true;
        let mut restart = false;
        if let Some(demo) = self.demo.as_mut() {
            let snapshot = demo.pilot.next_input(&demo.world);
            demo.input.advance(snapshot);
            let event = demo.world.step(ctx, &demo.input, self.config.fixed_dt);
            demo.ticks += 1;
            restart = event != LevelEvent::Continue || demo.ticks >= DEMO_MAX_TICKS;
        }
        ctx.muted = muted;
        if restart || self.demo.is_none() {
            self.demo = Some(self.new_demo());
        }

        if input.pressed(Action::Confirm) {
            ctx.emit_sound(SoundEvent::CONFIRM);
            self.demo = None;
            self.cinematic = Some(Cinematic::intro());
            self.phase = Phase::Cinematic;
        }
    }

    fn update_cinematic(&mut self, input: &InputState) {
        let Some(cinematic) = self.cinematic.as_mut() else {
            self.phase = Phase::Select;
            return;
        };
        if !cinematic.update(input) {
            return;
        }
        let then = cinematic.then_level;
        self.cinematic = None;
        match then {
            Some(level) => self.start_level(level),
            None => self.phase = Phase::Select,
        }
    }

    fn update_select(&mut self, ctx: &mut EngineContext, input: &InputState) {
        if let Some(character) = self.select.update(ctx, input) {
            self.progress.character = character;
            self.phase = Phase::World;
        }
    }

    fn update_world_map(&mut self, ctx: &mut EngineContext, input: &InputState) {
        let before = self.progress.cursor;
        if input.pressed(Action::Left) {
            self.progress.cursor = move_cursor(before, -1, MAP_NODES.len());
        } else if input.pressed(Action::Right) {
            self.progress.cursor = move_cursor(before, 1, MAP_NODES.len());
        }
        if self.progress.cursor != before {
            ctx.emit_sound(SoundEvent::SELECT);
        }

        if !input.pressed(Action::Confirm) {
            return;
        }
        let cursor = self.progress.cursor;
        if !is_unlocked(MAP_NODES, cursor, &self.progress.completed) {
            ctx.emit_sound(SoundEvent::BUMP);
            return;
        }
        let node = MAP_NODES[cursor];
        ctx.emit_sound(SoundEvent::CONFIRM);
        if self.progress.visited_regions.insert(node.region) {
            self.cinematic = Some(Cinematic::for_region(node.region, node.level));
            self.phase = Phase::Cinematic;
        } else {
            self.start_level(node.level);
        }
    }

    fn update_playing(&mut self, ctx: &mut EngineContext, input: &InputState) {
        let Some(world) = self.world.as_mut() else {
            self.phase = Phase::World;
            return;
        };
        match world.step(ctx, input, self.config.fixed_dt) {
            LevelEvent::Continue => {}
            LevelEvent::Died => {
                self.dying = DYING_TICKS;
                self.phase = Phase::Dying;
            }
            LevelEvent::Completed => {
                let level = world.level_index;
                self.stats = world.stats;
                self.progress.carry = world.carry_over();
                self.progress.completed.insert(level);
                if let Some(i) = node_for_level(MAP_NODES, level) {
                    if MAP_NODES.get(i + 1).is_some_and(|n| n.available) {
                        self.progress.cursor = i + 1;
                    }
                }
                self.phase = Phase::Complete;
            }
        }
    }

    fn update_dying(&mut self, ctx: &mut EngineContext) {
        let Some(world) = self.world.as_mut() else {
            self.phase = Phase::World;
            return;
        };
        world.step_dying();
        self.dying = self.dying.saturating_sub(1);
        if self.dying > 0 {
            return;
        }
        let level = world.level_index;
        self.stats = world.stats;
        self.stats.lives = self.stats.lives.saturating_sub(1);
        self.progress.carry = CarryOver::default();
        if self.stats.lives > 0 {
            log::info!("retrying level {}, {} lives left", level, self.stats.lives);
            self.start_level(level);
        } else {
            self.world = None;
            self.phase = Phase::GameOver;
            ctx.emit_sound(SoundEvent::GAME_OVER);
        }
    }

    fn update_complete(&mut self, input: &InputState) {
        if input.pressed(Action::Confirm) {
            self.world = None;
            self.phase = Phase::World;
        }
    }

    fn update_game_over(&mut self, input: &InputState) {
        if input.pressed(Action::Confirm) {
            self.stats = Stats::new(self.config.starting_lives);
            self.progress.carry = CarryOver::default();
            self.phase = Phase::World;
        }
    }
}

impl Default for Platformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Platformer {
    fn config(&self) -> GameConfig {
        self.config.clone()
    }

    fn init(&mut self, _ctx: &mut EngineContext) {
        self.phase = Phase::Title;
        self.demo = Some(self.new_demo());
        log::info!("platformer ready, {} map nodes", MAP_NODES.len());
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputState) {
        let before = self.phase;
        match self.phase {
            Phase::Title => self.update_title(ctx, input),
            Phase::Cinematic => self.update_cinematic(input),
            Phase::Select => self.update_select(ctx, input),
            Phase::World => self.update_world_map(ctx, input),
            Phase::Playing => self.update_playing(ctx, input),
            Phase::Dying => self.update_dying(ctx),
            Phase::Complete => self.update_complete(input),
            Phase::GameOver => self.update_game_over(input),
        }
        if self.phase != before {
            log::info!("phase {:?} -> {:?}", before, self.phase);
        }
    }

    fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        let snapshot = Snapshot {
            phase: self.phase,
            stats: self.stats(),
            progress: &self.progress,
            map: node_views(MAP_NODES, &self.progress.completed),
            select: self.select,
            scene: self.cinematic.as_ref().and_then(|c| c.current()),
            world: self.world.as_ref(),
            demo: self.demo.as_ref().map(|d| &d.world),
            warp_fade: self.world.as_ref().and_then(|w| w.warp.as_ref()).map(|w| w.fade()),
            dying: self.dying,
        };
        serde_json::to_string(&snapshot)
    }

    fn save_json(&self, timestamp: u64) -> Option<Result<String, serde_json::Error>> {
        Some(self.save(timestamp).to_json())
    }

    fn restore_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let save = SaveSnapshot::from_json(json)?;
        self.restore(save);
        Ok(())
    }
}
