//! Scripted move between the main area and a sub-level.
//!
//! A warp runs four fixed-length phases: dig, sink, blackout, arrive.
//! While one is active `World::step` advances nothing else. The teleport
//! itself happens halfway through the blackout, so the presentation layer
//! never shows the jump.

use glam::Vec2;
use serde::Serialize;

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::extensions::easing::{ease_vec2, progress, Easing};
use crate::input::state::{Action, InputState};
use crate::level::grid::{TileGrid, TILE_SIZE};
use crate::systems::{camera, companion};
use crate::world::{Hint, World};

pub const DIG_TICKS: u32 = 40;
pub const SINK_TICKS: u32 = 40;
pub const BLACKOUT_TICKS: u32 = 30;
pub const ARRIVE_TICKS: u32 = 30;
/// Remaining blackout ticks at which the teleport happens.
const TELEPORT_AT: u32 = BLACKOUT_TICKS / 2;
/// Height above the destination the player drops in from.
const ARRIVE_DROP: f32 = 48.0;
/// Horizontal reach of a warp exit.
const EXIT_REACH: f32 = 24.0;
const SHAKE: f32 = 1.5;
const HINT_TICKS: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpKind {
    DigDown,
    WarpUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarpPhase {
    Dig,
    Sink,
    Blackout,
    Arrive,
}

impl WarpPhase {
    pub fn duration(self) -> u32 {
        match self {
            WarpPhase::Dig => DIG_TICKS,
            WarpPhase::Sink => SINK_TICKS,
            WarpPhase::Blackout => BLACKOUT_TICKS,
            WarpPhase::Arrive => ARRIVE_TICKS,
        }
    }

    fn next(self) -> Option<WarpPhase> {
        match self {
            WarpPhase::Dig => Some(WarpPhase::Sink),
            WarpPhase::Sink => Some(WarpPhase::Blackout),
            WarpPhase::Blackout => Some(WarpPhase::Arrive),
            WarpPhase::Arrive => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarpAnimation {
    pub kind: WarpKind,
    pub phase: WarpPhase,
    /// Ticks left in the current phase.
    pub timer: u32,
    /// Player feet when the warp began.
    pub start: Vec2,
    /// Player feet at the destination.
    pub target: Vec2,
    pub camera_start: Vec2,
    pub teleported: bool,
}

impl WarpAnimation {
    pub fn new(kind: WarpKind, start: Vec2, target: Vec2, camera_start: Vec2) -> Self {
        Self {
            kind,
            phase: WarpPhase::Dig,
            timer: DIG_TICKS,
            start,
            target,
            camera_start,
            teleported: false,
        }
    }

    /// Screen cover opacity for the presentation layer.
    pub fn fade(&self) -> f32 {
        let t = progress(self.timer, self.phase.duration());
        match self.phase {
            WarpPhase::Dig => 0.0,
            WarpPhase::Sink => Easing::SineInOut.apply(t),
            WarpPhase::Blackout => 1.0,
            WarpPhase::Arrive => 1.0 - Easing::QuadOut.apply(t),
        }
    }
}

/// Begin a warp if the player asks for one where it is allowed.
pub fn try_start(world: &mut World, ctx: &mut EngineContext, input: &InputState) -> bool {
    if !world.player.alive || !world.player.body.on_ground {
        return false;
    }
    let start = world.player.body.feet();
    let warp = if input.pressed(Action::Down) {
        dig_target(world).map(|target| (WarpKind::DigDown, target))
    } else if input.pressed(Action::Up) {
        exit_target(world).map(|target| (WarpKind::WarpUp, target))
    } else {
        None
    };
    let Some((kind, target)) = warp else {
        return false;
    };

    world.player.body.vel = Vec2::ZERO;
    world.warp = Some(WarpAnimation::new(kind, start, target, world.camera.offset));
    ctx.emit_sound(match kind {
        WarpKind::DigDown => SoundEvent::DIG,
        WarpKind::WarpUp => SoundEvent::WARP,
    });
    log::debug!("warp {:?} from ({:.0}, {:.0}) to ({:.0}, {:.0})", kind, start.x, start.y, target.x, target.y);
    true
}

fn dig_target(world: &World) -> Option<Vec2> {
    if world.in_sub_level || !world.companion.as_ref().is_some_and(|c| c.is_mounted()) {
        return None;
    }
    let index = companion::dig_spot_under(world)?;
    world.dig_spots[index].target
}

fn exit_target(world: &World) -> Option<Vec2> {
    if !world.in_sub_level {
        return None;
    }
    let feet = world.player.body.feet();
    world
        .warp_exits
        .iter()
        .filter(|exit| {
            let anchor = TileGrid::feet_anchor(exit.col, exit.row);
            (anchor.x - feet.x).abs() <= EXIT_REACH && (anchor.y - feet.y).abs() < TILE_SIZE
        })
        .find_map(|exit| exit.return_to)
}

/// Advance the active warp by one tick.
pub fn update(world: &mut World, ctx: &mut EngineContext) {
    let Some(mut warp) = world.warp.take() else {
        return;
    };
    warp.timer = warp.timer.saturating_sub(1);
    let t = progress(warp.timer, warp.phase.duration());

    match warp.phase {
        WarpPhase::Dig => {
            let shake = if warp.timer % 4 < 2 { SHAKE } else { -SHAKE };
            world.player.body.place_feet(warp.start + Vec2::new(shake, 0.0));
        }
        WarpPhase::Sink => {
            let dir = match warp.kind {
                WarpKind::DigDown => 1.0,
                WarpKind::WarpUp => -1.0,
            };
            let depth = world.player.body.size.y * t;
            world.player.body.place_feet(warp.start + Vec2::new(0.0, dir * depth));
        }
        WarpPhase::Blackout => {
            if !warp.teleported && warp.timer <= TELEPORT_AT {
                teleport(world, ctx, &warp);
                warp.teleported = true;
            }
        }
        WarpPhase::Arrive => {
            let from = warp.target - Vec2::new(0.0, ARRIVE_DROP);
            world.player.body.place_feet(ease_vec2(from, warp.target, t, Easing::QuadIn));
        }
    }
    world.player.body.vel = Vec2::ZERO;
    slave_mount(world);

    if warp.timer > 0 {
        world.warp = Some(warp);
        return;
    }
    match warp.phase.next() {
        Some(phase) => {
            log::debug!("warp phase {:?} -> {:?}", warp.phase, phase);
            warp.phase = phase;
            warp.timer = phase.duration();
            world.warp = Some(warp);
        }
        None => {
            world.player.body.place_feet(warp.target);
            world.player.body.on_ground = true;
            slave_mount(world);
            log::debug!("warp {:?} finished", warp.kind);
        }
    }
}

fn teleport(world: &mut World, ctx: &mut EngineContext, warp: &WarpAnimation) {
    world.in_sub_level = warp.kind == WarpKind::DigDown;
    world.player.body.place_feet(warp.target - Vec2::new(0.0, ARRIVE_DROP));
    slave_mount(world);
    world.hint = Some(Hint {
        text: match warp.kind {
            WarpKind::DigDown => "Underground! Find the exit and press Up",
            WarpKind::WarpUp => "Back above ground",
        },
        ticks: HINT_TICKS,
    });
    let target = camera::target_offset(world);
    world.camera.snap(target);
    ctx.emit_sound(SoundEvent::PIPE);
    log::info!(
        "warped {} in level {}",
        if world.in_sub_level { "underground" } else { "to the surface" },
        world.level_index
    );
}

fn slave_mount(world: &mut World) {
    let feet = world.player.body.feet();
    if let Some(mount) = world.companion.as_mut().filter(|c| c.is_mounted()) {
        mount.body.place_feet(feet);
        mount.body.vel = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::companion::CompanionState;
    use crate::components::player::{Character, PowerTier};
    use crate::input::state::InputSnapshot;
    use crate::world::{CarryOver, LevelEvent, Stats};

    const TOTAL: u32 = DIG_TICKS + SINK_TICKS + BLACKOUT_TICKS + ARRIVE_TICKS;

    /// Burrow Fields with the player mounted and standing on the dig spot.
    fn mounted_on_dig_spot() -> World {
        let carry = CarryOver {
            tier: PowerTier::None,
            mounted: true,
        };
        let mut world = World::load(1, Character::Mario, Stats::new(3), carry, Vec2::new(800.0, 480.0), 4);
        let spot = world.dig_spots[0].clone();
        let feet = TileGrid::feet_anchor(spot.col, spot.row - 1);
        world.player.body.place_feet(feet);
        world.player.body.on_ground = true;
        if let Some(c) = world.companion.as_mut() {
            c.body.place_feet(feet);
        }
        world
    }

    fn press(action: Action) -> InputState {
        let mut input = InputState::new();
        input.advance(InputSnapshot::new().with(action));
        input
    }

    #[test]
    fn dig_needs_the_mount() {
        let mut world = mounted_on_dig_spot();
        let mut ctx = EngineContext::new();
        if let Some(c) = world.companion.as_mut() {
            c.state = CompanionState::Free;
        }
        world.player.set_riding(false);
        assert!(!try_start(&mut world, &mut ctx, &press(Action::Down)));
        assert!(world.warp.is_none());
    }

    #[test]
    fn dig_down_runs_all_phases_and_lands_underground() {
        let mut world = mounted_on_dig_spot();
        let mut ctx = EngineContext::new();
        let target = world.dig_spots[0].target;
        assert!(target.is_some());

        let event = world.step(&mut ctx, &press(Action::Down), 1.0 / 60.0);
        assert_eq!(event, LevelEvent::Continue);
        assert_eq!(world.warp.as_ref().map(|w| w.kind), Some(WarpKind::DigDown));
        assert!(ctx.sounds.contains(&SoundEvent::DIG));

        let idle = InputState::new();
        for tick in 0..TOTAL {
            assert!(world.warp.is_some(), "warp ended early at {tick}");
            world.step(&mut ctx, &idle, 1.0 / 60.0);
        }
        assert!(world.warp.is_none());
        assert!(world.in_sub_level);
        assert_eq!(Some(world.player.body.feet()), target);
        assert!(world.hint.is_some());
        assert!(world.companion.as_ref().is_some_and(|c| c.is_mounted()));
        assert!(world.camera.offset.y >= world.sub_level_top().unwrap_or_default());
    }

    #[test]
    fn nothing_else_moves_during_a_warp() {
        let mut world = mounted_on_dig_spot();
        let mut ctx = EngineContext::new();
        world.step(&mut ctx, &press(Action::Down), 1.0 / 60.0);

        let enemies = world.enemies.clone();
        let coins = world.coins.clone();
        let time = (world.time, world.time_ticks);
        let frame = world.frame;
        let camera = world.camera;
        let idle = InputState::new();
        for _ in 0..DIG_TICKS + SINK_TICKS {
            world.step(&mut ctx, &idle, 1.0 / 60.0);
            assert_eq!(world.enemies, enemies);
            assert_eq!(world.coins, coins);
            assert_eq!((world.time, world.time_ticks), time);
            assert_eq!(world.frame, frame);
            assert_eq!(world.camera, camera);
        }
        for _ in 0..BLACKOUT_TICKS + ARRIVE_TICKS {
            world.step(&mut ctx, &idle, 1.0 / 60.0);
            assert_eq!(world.enemies, enemies);
            assert_eq!(world.frame, frame);
        }
        assert!(world.warp.is_none());
    }

    #[test]
    fn warp_up_returns_to_the_dig_spot() {
        let mut world = mounted_on_dig_spot();
        let mut ctx = EngineContext::new();
        world.in_sub_level = true;
        let exit = world.warp_exits[0].clone();
        let back = exit.return_to;
        world.player.body.place_feet(TileGrid::feet_anchor(exit.col, exit.row));
        world.player.body.on_ground = true;

        assert!(try_start(&mut world, &mut ctx, &press(Action::Up)));
        for _ in 0..TOTAL {
            update(&mut world, &mut ctx);
        }
        assert!(world.warp.is_none());
        assert!(!world.in_sub_level);
        assert_eq!(Some(world.player.body.feet()), back);
    }

    #[test]
    fn fade_covers_the_teleport() {
        let mut warp = WarpAnimation::new(WarpKind::DigDown, Vec2::ZERO, Vec2::ONE, Vec2::ZERO);
        assert_eq!(warp.fade(), 0.0);
        warp.phase = WarpPhase::Blackout;
        assert_eq!(warp.fade(), 1.0);
        warp.phase = WarpPhase::Arrive;
        warp.timer = 0;
        assert!(warp.fade().abs() < 1e-6);
    }
}
