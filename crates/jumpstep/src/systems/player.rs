//! Player controller: movement physics, jump forgiveness, float, wall
//! interaction, fireballs and damage.

use glam::Vec2;

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::player::{animation_for, Facing, Fireball, PowerTier, FIREBALL_SIZE, MAX_FIREBALLS};
use crate::input::state::{Action, InputState};
use crate::physics::body::Body;
use crate::physics::collision::{land_on_one_way, ride_platforms, sweep_horizontal, sweep_vertical, WallResponse};
use crate::physics::{GRAVITY, MAX_FALL};
use crate::systems::companion;
use crate::world::World;

const ACCEL: f32 = 0.3;
const WALK_MAX: f32 = 3.0;
const GROUND_FRICTION: f32 = 0.85;
const AIR_FRICTION: f32 = 0.95;

pub const JUMP_VELOCITY: f32 = -10.5;
pub const COYOTE_TICKS: u32 = 6;
pub const JUMP_BUFFER_TICKS: u32 = 6;
/// Upward velocity kept when jump is released early.
const JUMP_CUT: f32 = 0.6;

pub const FLOAT_MAX_TICKS: u32 = 60;
const FLOAT_GRAVITY_SCALE: f32 = 0.15;
const FLOAT_MAX_FALL: f32 = 1.5;

const WALL_SLIDE_MAX: f32 = 2.0;
const WALL_JUMP_PUSH: f32 = 5.0;

pub const GROW_TICKS: u32 = 40;
pub const INVINCIBLE_TICKS: u32 = 120;
const DEATH_HOP: f32 = -10.0;

const FIREBALL_SPEED: f32 = 7.0;
const FIREBALL_GRAVITY: f32 = 0.4;
const FIREBALL_BOUNCE: f32 = -5.0;
const FIREBALL_MAX_FALL: f32 = 8.0;
pub const FIREBALL_MAX_BOUNCES: u32 = 4;
const FIRE_COOLDOWN: u32 = 12;

/// Advance the player one tick. Returns the ceiling cell struck while
/// rising, for the block handler.
pub fn update(world: &mut World, ctx: &mut EngineContext, input: &InputState) -> Option<(i32, i32)> {
    if !world.player.alive {
        return None;
    }
    let profile = world.character.profile();
    let diving = world.companion.as_ref().is_some_and(|c| c.diving);
    let kill_line = world.kill_line();
    let player = &mut world.player;
    let timers = &mut player.timers;

    timers.invincible = timers.invincible.saturating_sub(1);
    timers.jump_buffer = timers.jump_buffer.saturating_sub(1);
    timers.coyote = timers.coyote.saturating_sub(1);
    timers.mount_cooldown = timers.mount_cooldown.saturating_sub(1);
    timers.fire_cooldown = timers.fire_cooldown.saturating_sub(1);
    if timers.grow > 0 {
        timers.grow -= 1;
        player.anim = animation_for(player);
        return None;
    }

    // horizontal intent
    let axis = input.axis_x();
    let cap = WALK_MAX * profile.speed * if input.held(Action::Run) { 2.0 } else { 1.0 };
    let body = &mut player.body;
    if axis != 0.0 {
        body.vel.x = (body.vel.x + axis * ACCEL).clamp(-cap, cap);
        if let Some(facing) = Facing::from_sign(axis) {
            player.facing = facing;
        }
    } else {
        body.vel.x *= if body.on_ground { GROUND_FRICTION } else { AIR_FRICTION };
        if body.vel.x.abs() < 0.05 {
            body.vel.x = 0.0;
        }
    }

    // jump buffer + coyote time
    if body.on_ground {
        timers.coyote = COYOTE_TICKS;
        timers.float = 0;
    }
    if input.pressed(Action::Jump) {
        timers.jump_buffer = JUMP_BUFFER_TICKS;
    }
    let mut jumped = false;
    if player.wall_sliding && timers.coyote == 0 && timers.jump_buffer > 0 {
        let away = player.wall_contact.map_or(-player.facing.sign(), |side| -side.sign());
        body.vel.y = JUMP_VELOCITY * profile.jump * 0.9;
        body.vel.x = away * WALL_JUMP_PUSH;
        if let Some(facing) = Facing::from_sign(away) {
            player.facing = facing;
        }
        timers.jump_buffer = 0;
        jumped = true;
    } else if timers.jump_buffer > 0 && timers.coyote > 0 {
        body.vel.y = JUMP_VELOCITY * profile.jump;
        timers.jump_buffer = 0;
        timers.coyote = 0;
        jumped = true;
    }
    if jumped {
        ctx.emit_sound(SoundEvent::JUMP);
    }

    // variable height
    if input.released(Action::Jump) && body.vel.y < 0.0 && !diving {
        body.vel.y *= JUMP_CUT;
    }

    // float
    player.floating = profile.can_float
        && !body.on_ground
        && !diving
        && input.held(Action::Jump)
        && body.vel.y > -1.0
        && timers.float < FLOAT_MAX_TICKS;
    if player.floating {
        timers.float += 1;
    }

    // gravity
    if diving {
        body.vel.y = companion::DIVE_SPEED;
    } else if player.floating {
        body.apply_gravity(GRAVITY * FLOAT_GRAVITY_SCALE, FLOAT_MAX_FALL);
    } else {
        body.apply_gravity(GRAVITY, MAX_FALL);
    }

    // collision
    let pushing = axis;
    let horizontal = sweep_horizontal(body, &world.grid, WallResponse::Stop);
    let vertical = sweep_vertical(body, &world.grid);
    land_on_one_way(body, &world.grid);
    ride_platforms(body, &world.grid, &world.platforms);

    player.wall_contact = if horizontal.hit_wall { Facing::from_sign(pushing) } else { None };
    player.wall_sliding = !body.on_ground
        && body.vel.y > 0.0
        && player.wall_contact.is_some()
        && !player.riding;
    if player.wall_sliding {
        body.vel.y = body.vel.y.min(WALL_SLIDE_MAX);
        timers.float = 0;
    }

    // fire
    if input.pressed(Action::Run)
        && player.tier == PowerTier::Fire
        && player.fireballs.len() < MAX_FIREBALLS
        && timers.fire_cooldown == 0
    {
        let dir = player.facing.sign();
        let center = body.center();
        let pos = Vec2::new(center.x + dir * body.size.x * 0.5, center.y) - FIREBALL_SIZE * 0.5;
        player.fireballs.push(Fireball {
            body: Body::new(pos, FIREBALL_SIZE).with_velocity(Vec2::new(dir * FIREBALL_SPEED, 1.0)),
            bounces: 0,
            alive: true,
        });
        timers.fire_cooldown = FIRE_COOLDOWN;
        ctx.emit_sound(SoundEvent::FIREBALL);
    }

    let fell_out = player.body.top() > kill_line;
    player.anim = animation_for(player);
    if fell_out {
        kill(world, ctx);
        return None;
    }
    vertical.ceiling
}

/// Fireballs bounce along the ground and burn out on walls.
pub fn update_fireballs(world: &mut World) {
    let kill_line = world.kill_line();
    let grid = &world.grid;
    for fireball in &mut world.player.fireballs {
        let body = &mut fireball.body;
        body.apply_gravity(FIREBALL_GRAVITY, FIREBALL_MAX_FALL);
        if sweep_horizontal(body, grid, WallResponse::Stop).blocked() {
            fireball.alive = false;
            continue;
        }
        let report = sweep_vertical(body, grid);
        if report.landed {
            fireball.bounces += 1;
            body.vel.y = FIREBALL_BOUNCE;
            if fireball.bounces > FIREBALL_MAX_BOUNCES {
                fireball.alive = false;
            }
        }
        if body.top() > kill_line {
            fireball.alive = false;
        }
    }
    world.player.fireballs.retain(|f| f.alive);
}

/// Apply one damage event: forced dismount while riding, otherwise a
/// single tier step down, or death at the lowest tier.
pub fn hurt(world: &mut World, ctx: &mut EngineContext) {
    let player = &world.player;
    if !player.alive || player.is_invincible() || player.timers.grow > 0 {
        return;
    }
    if player.riding {
        companion::force_dismount(world, ctx);
        return;
    }
    match world.player.tier.step_down() {
        Some(tier) => {
            world.player.set_tier(tier);
            world.player.timers.invincible = INVINCIBLE_TICKS;
            ctx.emit_sound(SoundEvent::PIPE);
            log::debug!("player hurt, tier now {:?}", tier);
        }
        None => kill(world, ctx),
    }
}

pub fn kill(world: &mut World, ctx: &mut EngineContext) {
    if !world.player.alive {
        return;
    }
    if world.player.riding {
        companion::release(world);
    }
    let player = &mut world.player;
    player.alive = false;
    player.body.vel = Vec2::new(0.0, DEATH_HOP);
    player.fireballs.clear();
    player.anim = animation_for(player);
    ctx.emit_sound(SoundEvent::DIE);
    log::info!("player died in level {}", world.level_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::player::{Character, Player};
    use crate::input::state::InputSnapshot;
    use crate::level::grid::TileGrid;
    use crate::world::{CarryOver, Stats};

    fn flat_world() -> World {
        let mut world = World::load(0, Character::Mario, Stats::new(3), CarryOver::default(), Vec2::new(800.0, 480.0), 1);
        world.grid = TileGrid::from_rows(&[
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "....................",
            "####################",
            "####################",
        ]);
        world.enemies.clear();
        world.coins.clear();
        world.blocks.clear();
        world.platforms.clear();
        world.companion = None;
        world.flag = None;
        world.player = Player::new(TileGrid::feet_anchor(3, 12), PowerTier::None);
        world.player.body.on_ground = true;
        world
    }

    fn tick(world: &mut World, ctx: &mut EngineContext, input: &mut InputState, held: InputSnapshot) {
        input.advance(held);
        update(world, ctx, input);
    }

    fn jumps(ctx: &EngineContext) -> usize {
        ctx.sounds.iter().filter(|s| **s == SoundEvent::JUMP).count()
    }

    #[test]
    fn grounded_press_jumps_exactly_once() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        let mut input = InputState::new();
        let jump = InputSnapshot::new().with(Action::Jump);
        tick(&mut world, &mut ctx, &mut input, jump);
        assert!(world.player.body.vel.y < 0.0);
        for _ in 0..40 {
            tick(&mut world, &mut ctx, &mut input, jump);
        }
        assert_eq!(jumps(&ctx), 1);
    }

    #[test]
    fn buffered_press_fires_on_landing() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        let mut input = InputState::new();
        // airborne, a few pixels above the ground and falling
        world.player.body.pos.y -= 3.0;
        world.player.body.on_ground = false;
        world.player.body.vel.y = 4.0;
        world.player.timers.coyote = 0;
        let jump = InputSnapshot::new().with(Action::Jump);
        tick(&mut world, &mut ctx, &mut input, jump);
        assert_eq!(jumps(&ctx), 0);
        assert!(world.player.body.on_ground);
        tick(&mut world, &mut ctx, &mut input, jump);
        assert_eq!(jumps(&ctx), 1);
        assert!(world.player.body.vel.y < 0.0);
    }

    #[test]
    fn coyote_window_allows_late_jump() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        let mut input = InputState::new();
        tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
        // walked off a ledge: airborne but recently grounded
        world.player.body.on_ground = false;
        world.player.body.pos.y -= 100.0;
        tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
        tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Jump));
        assert_eq!(jumps(&ctx), 1);
    }

    #[test]
    fn expired_windows_never_jump() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        let mut input = InputState::new();
        world.player.body.on_ground = false;
        world.player.body.pos.y -= 200.0;
        for _ in 0..COYOTE_TICKS + 1 {
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
        }
        tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Jump));
        assert_eq!(jumps(&ctx), 0);
        // buffer lapses before landing from high up
        for _ in 0..JUMP_BUFFER_TICKS + 1 {
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
        }
        assert!(!world.player.body.on_ground);
        while !world.player.body.on_ground {
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
        }
        tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
        assert_eq!(jumps(&ctx), 0);
    }

    #[test]
    fn releasing_jump_early_cuts_height() {
        let full = {
            let mut world = flat_world();
            let mut ctx = EngineContext::new();
            let mut input = InputState::new();
            let mut top = world.player.body.top();
            for _ in 0..60 {
                tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Jump));
                top = top.min(world.player.body.top());
            }
            top
        };
        let short = {
            let mut world = flat_world();
            let mut ctx = EngineContext::new();
            let mut input = InputState::new();
            let mut top = world.player.body.top();
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Jump));
            for _ in 0..60 {
                tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
                top = top.min(world.player.body.top());
            }
            top
        };
        assert!(short > full, "short hop {} should peak below full jump {}", short, full);
    }

    #[test]
    fn running_doubles_the_speed_cap() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        let mut input = InputState::new();
        for _ in 0..60 {
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Right));
        }
        assert!((world.player.body.vel.x - WALK_MAX).abs() < 1e-3);
        for _ in 0..30 {
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Right).with(Action::Run));
        }
        assert!(world.player.body.vel.x > WALK_MAX + 1.0);
    }

    #[test]
    fn only_floating_characters_float() {
        let fall_after = |character: Character| {
            let mut world = flat_world();
            world.character = character;
            let mut ctx = EngineContext::new();
            let mut input = InputState::new();
            world.player.body.on_ground = false;
            world.player.body.pos.y -= 300.0;
            let start = world.player.body.top();
            for _ in 0..20 {
                tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Jump));
            }
            world.player.body.top() - start
        };
        assert!(fall_after(Character::Peach) < fall_after(Character::Mario));
    }

    #[test]
    fn damage_steps_down_one_tier() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        world.player.set_tier(PowerTier::Fire);
        hurt(&mut world, &mut ctx);
        assert_eq!(world.player.tier, PowerTier::Big);
        assert!(world.player.is_invincible());
        // invincible: a second hit in the window changes nothing
        hurt(&mut world, &mut ctx);
        assert_eq!(world.player.tier, PowerTier::Big);
        world.player.timers.invincible = 0;
        hurt(&mut world, &mut ctx);
        assert_eq!(world.player.tier, PowerTier::None);
        assert!(world.player.alive);
        world.player.timers.invincible = 0;
        hurt(&mut world, &mut ctx);
        assert!(!world.player.alive);
    }

    #[test]
    fn fireballs_are_capped_and_burn_out_on_walls() {
        let mut world = flat_world();
        let mut ctx = EngineContext::new();
        let mut input = InputState::new();
        world.player.set_tier(PowerTier::Fire);
        for _ in 0..6 {
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new().with(Action::Run));
            tick(&mut world, &mut ctx, &mut input, InputSnapshot::new());
            world.player.timers.fire_cooldown = 0;
        }
        assert_eq!(world.player.fireballs.len(), MAX_FIREBALLS);

        world.grid.set(8, 12, '#');
        world.grid.set(8, 11, '#');
        for _ in 0..120 {
            update_fireballs(&mut world);
        }
        assert!(world.player.fireballs.is_empty());
    }

    #[test]
    fn fireball_dies_after_max_bounces() {
        let mut world = flat_world();
        let body = Body::new(Vec2::new(40.0, 380.0), FIREBALL_SIZE).with_velocity(Vec2::new(0.0, 1.0));
        world.player.fireballs.push(Fireball { body, bounces: 0, alive: true });
        for _ in 0..400 {
            update_fireballs(&mut world);
        }
        assert!(world.player.fireballs.is_empty());
    }
}
