//! Mountable companion: free / mounted / fleeing state machine and the
//! tongue and dive-slam abilities it grants while ridden.

use glam::Vec2;

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::companion::{companion_anim, CompanionState};
use crate::components::enemy::{DeathStyle, EnemyKind};
use crate::components::items::Particle;
use crate::components::player::Facing;
use crate::input::state::{Action, InputState};
use crate::level::grid::{codes, TileGrid};
use crate::physics::body::Body;
use crate::physics::collision::{land_on_one_way, nudge_out_of_solid, ride_platforms, sweep, WallResponse};
use crate::physics::{GRAVITY, MAX_FALL};
use crate::systems::combat;
use crate::systems::enemies::{can_be_hit, KNOCKED_TICKS};
use crate::world::World;

pub const TONGUE_REACH: f32 = 64.0;
pub const TONGUE_TICKS: u32 = 20;
const TONGUE_COOLDOWN: u32 = 30;
pub const DIVE_SPEED: f32 = 12.0;
pub const SLAM_RADIUS: f32 = 96.0;
const TONGUE_POINTS: u32 = 200;
const SLAM_POINTS: u32 = 200;

const DISMOUNT_HOP: f32 = -6.0;
const DISMOUNT_COOLDOWN: u32 = 30;
const FORCED_BOUNCE: f32 = -7.0;
const FORCED_COOLDOWN: u32 = 60;
/// Mount only when last tick's feet were at most this far into the back.
const MOUNT_TOLERANCE: f32 = 12.0;

/// Ticks alone away from spawn before heading home.
pub const FLEE_DELAY: u32 = 300;
const FLEE_DISTANCE: f32 = 128.0;
const FLEE_SPEED: f32 = 1.5;

/// Dig spot index under the player's feet, if the player stands on a
/// paired one.
pub fn dig_spot_under(world: &World) -> Option<usize> {
    let body = &world.player.body;
    if !body.on_ground {
        return None;
    }
    let (col, row) = TileGrid::cell_of(body.feet() + Vec2::new(0.0, 1.0));
    if world.grid.get(col, row) != codes::DIG {
        return None;
    }
    world
        .dig_spots
        .iter()
        .position(|spot| spot.col == col && spot.row == row && spot.target.is_some())
}

/// Read the ability and dismount inputs while mounted. Runs before the
/// player controller so a dive overrides this tick's fall.
pub fn handle_input(world: &mut World, ctx: &mut EngineContext, input: &InputState) {
    let over_dig = dig_spot_under(world).is_some();
    let grounded = world.player.body.on_ground;
    let Some(companion) = world.companion.as_mut() else {
        return;
    };
    if companion.state != CompanionState::Mounted || !world.player.alive {
        return;
    }
    companion.tongue = companion.tongue.saturating_sub(1);
    companion.tongue_cooldown = companion.tongue_cooldown.saturating_sub(1);

    if input.pressed(Action::Action) {
        if grounded {
            if companion.tongue_cooldown == 0 {
                companion.tongue = TONGUE_TICKS;
                companion.tongue_cooldown = TONGUE_COOLDOWN;
                ctx.emit_sound(SoundEvent::TONGUE);
            }
        } else if !companion.dive_used {
            companion.diving = true;
            companion.dive_used = true;
        }
    }

    if input.pressed(Action::Down) && grounded && !over_dig && !companion.diving {
        companion.state = CompanionState::Free;
        companion.idle_ticks = 0;
        companion.tongue = 0;
        companion.body.place_feet(world.player.body.feet());
        companion.body.vel = Vec2::ZERO;
        world.player.set_riding(false);
        world.player.body.vel.y = DISMOUNT_HOP;
        world.player.body.on_ground = false;
        world.player.timers.mount_cooldown = DISMOUNT_COOLDOWN;
        log::debug!("companion dismounted");
    }
}

/// Post-physics companion update: slave to the rider, land dives, or run
/// the free / fleeing behaviors and the mount check.
pub fn update(world: &mut World, ctx: &mut EngineContext) {
    let Some(state) = world.companion.as_ref().map(|c| c.state) else {
        return;
    };
    match state {
        CompanionState::Mounted => update_mounted(world, ctx),
        CompanionState::Free | CompanionState::Fleeing => {
            update_unmounted(world);
            try_mount(world, ctx);
        }
    }
    let frame = world.frame;
    if let Some(companion) = world.companion.as_mut() {
        companion.anim = companion_anim(companion, frame);
    }
}

fn update_mounted(world: &mut World, ctx: &mut EngineContext) {
    let feet = world.player.body.feet();
    let grounded = world.player.body.on_ground;
    let facing = world.player.facing;
    let Some(companion) = world.companion.as_mut() else {
        return;
    };
    companion.body.place_feet(feet);
    companion.body.vel = world.player.body.vel;
    companion.body.on_ground = grounded;
    companion.facing = facing;

    if !grounded {
        return;
    }
    let landed_dive = companion.diving;
    companion.diving = false;
    companion.dive_used = false;
    if landed_dive {
        slam(world, ctx, feet);
    }
}

/// Shockwave on dive landing: every non-boss enemy in range dies.
fn slam(world: &mut World, ctx: &mut EngineContext, at: Vec2) {
    ctx.emit_sound(SoundEvent::SLAM);
    let mut hits = Vec::new();
    for enemy in &mut world.enemies {
        if enemy.kind == EnemyKind::Boss || !can_be_hit(enemy, world.frame) {
            continue;
        }
        if enemy.body.center().distance(at) <= SLAM_RADIUS {
            enemy.kill(DeathStyle::Knocked, KNOCKED_TICKS);
            hits.push(enemy.body.pos);
        }
    }
    for pos in hits {
        world.award(SLAM_POINTS, pos);
    }
    for dir in [-1.0, 1.0] {
        for speed in [2.0, 4.0] {
            world.particles.push(Particle::dust(at, Vec2::new(dir * speed, -0.5)));
        }
    }
    log::debug!("dive slam at ({:.0}, {:.0})", at.x, at.y);
}

/// The tongue's hit box in front of the rider.
pub fn tongue_rect(world: &World) -> Option<(Vec2, Vec2)> {
    let companion = world.companion.as_ref()?;
    if !companion.is_mounted() || companion.tongue == 0 {
        return None;
    }
    let body = &companion.body;
    let size = Vec2::new(TONGUE_REACH, body.size.y);
    let pos = match companion.facing {
        Facing::Right => Vec2::new(body.right(), body.top()),
        Facing::Left => Vec2::new(body.left() - TONGUE_REACH, body.top()),
    };
    Some((pos, size))
}

/// Tongue hit-scan: destroys overlapping enemies. A boss takes one point
/// of damage, as from a stomp.
pub fn apply_tongue(world: &mut World, ctx: &mut EngineContext) {
    let Some((pos, size)) = tongue_rect(world) else {
        return;
    };
    let mut hits = Vec::new();
    let mut bosses = Vec::new();
    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        if !can_be_hit(enemy, world.frame) || !enemy.body.overlaps_rect(pos, size) {
            continue;
        }
        if enemy.kind == EnemyKind::Boss {
            bosses.push(i);
        } else {
            enemy.kill(DeathStyle::Knocked, KNOCKED_TICKS);
            hits.push(enemy.body.pos);
        }
    }
    if !hits.is_empty() {
        ctx.emit_sound(SoundEvent::STOMP);
    }
    for at in hits {
        world.award(TONGUE_POINTS, at);
    }
    for index in bosses {
        combat::hit_boss(world, ctx, index);
    }
}

fn update_unmounted(world: &mut World) {
    let grid = &world.grid;
    let platforms = &world.platforms;
    let Some(companion) = world.companion.as_mut() else {
        return;
    };
    companion.idle_ticks = companion.idle_ticks.saturating_add(1);
    let away = companion.body.feet().x - companion.spawn.x;

    match companion.state {
        CompanionState::Free => {
            companion.body.vel.x = 0.0;
            if companion.idle_ticks > FLEE_DELAY && away.abs() > FLEE_DISTANCE {
                companion.state = CompanionState::Fleeing;
                log::debug!("companion heading home");
            }
        }
        CompanionState::Fleeing => {
            if away.abs() <= FLEE_SPEED {
                companion.body.place_feet(Vec2::new(companion.spawn.x, companion.body.bottom()));
                companion.body.vel.x = 0.0;
                companion.state = CompanionState::Free;
                companion.idle_ticks = 0;
            } else {
                companion.body.vel.x = -away.signum() * FLEE_SPEED;
                companion.facing = Facing::from_sign(companion.body.vel.x).unwrap_or(companion.facing);
            }
        }
        CompanionState::Mounted => return,
    }

    let body = &mut companion.body;
    body.apply_gravity(GRAVITY, MAX_FALL);
    sweep(body, grid, WallResponse::Stop);
    land_on_one_way(body, grid);
    ride_platforms(body, grid, platforms);
    // fell into a pit: reappear at spawn
    if body.top() > grid.height_px() {
        *body = Body::standing_at(companion.spawn, body.size);
        companion.state = CompanionState::Free;
        companion.idle_ticks = 0;
    }
}

/// Mount when the player drops onto the companion's back.
fn try_mount(world: &mut World, ctx: &mut EngineContext) {
    let player = &world.player;
    if !player.alive || player.body.vel.y <= 0.0 || player.timers.mount_cooldown > 0 || player.riding {
        return;
    }
    let Some(companion) = world.companion.as_mut() else {
        return;
    };
    let prev_bottom = player.body.bottom() - player.body.vel.y;
    if !player.body.overlaps(&companion.body) || prev_bottom > companion.body.top() + MOUNT_TOLERANCE {
        return;
    }
    companion.state = CompanionState::Mounted;
    companion.idle_ticks = 0;
    companion.diving = false;
    companion.dive_used = false;
    companion.body.vel = Vec2::ZERO;
    let feet = companion.body.feet();
    world.player.set_riding(true);
    world.player.body.place_feet(feet);
    world.player.body.vel.y = 0.0;
    nudge_out_of_solid(&mut world.player.body, &world.grid);
    ctx.emit_sound(SoundEvent::MOUNT);
    log::debug!("companion mounted");
}

/// Damage while riding: the companion stays idle where it is and the
/// player bounces off with a grace window, keeping its tier.
pub fn force_dismount(world: &mut World, ctx: &mut EngineContext) {
    release(world);
    let player = &mut world.player;
    player.body.vel.y = FORCED_BOUNCE;
    player.body.on_ground = false;
    player.timers.invincible = crate::systems::player::INVINCIBLE_TICKS;
    player.timers.mount_cooldown = FORCED_COOLDOWN;
    ctx.emit_sound(SoundEvent::PIPE);
    log::debug!("companion knocked off");
}

/// Drop the rider, leaving the companion free at the rider's feet.
pub fn release(world: &mut World) {
    let feet = world.player.body.feet();
    if let Some(companion) = world.companion.as_mut() {
        if companion.is_mounted() {
            companion.state = CompanionState::Free;
            companion.idle_ticks = 0;
            companion.tongue = 0;
            companion.diving = false;
            companion.body.place_feet(feet);
            companion.body.vel = Vec2::ZERO;
        }
    }
    world.player.set_riding(false);
}
