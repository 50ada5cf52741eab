//! Block strikes and everything they release: coins, power-ups, debris.

use glam::Vec2;

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::items::{Coin, Particle, PowerUpItem, PowerUpKind, Reward, BUMP_TICKS};
use crate::components::player::PowerTier;
use crate::level::grid::{codes, is_question, TileGrid, TILE_SIZE};
use crate::physics::collision::{land_on_one_way, nudge_out_of_solid, ride_platforms, sweep, WallResponse};
use crate::physics::{GRAVITY, MAX_FALL};
use crate::systems::player::GROW_TICKS;
use crate::world::World;

pub const BRICK_POINTS: u32 = 50;
pub const POWERUP_POINTS: u32 = 1000;
const MUSHROOM_SPEED: f32 = 1.5;
const COIN_POP_GRAVITY: f32 = 0.5;
const DEBRIS_PIECES: usize = 4;

/// Resolve an upward hit on a cell.
pub fn strike(world: &mut World, ctx: &mut EngineContext, col: i32, row: i32) {
    let code = world.grid.get(col, row);
    let index = world.blocks.iter().position(|b| b.col == col && b.row == row);
    let origin = TileGrid::cell_origin(col, row);

    if is_question(code) {
        let reward = match index {
            Some(i) if world.blocks[i].hit => return,
            Some(i) => {
                let block = &mut world.blocks[i];
                block.hit = true;
                block.bump = BUMP_TICKS;
                block.reward
            }
            None => Reward::Coin,
        };
        world.grid.set(col, row, codes::USED);
        match reward {
            Reward::PowerUp(kind) => {
                world.powerups.push(PowerUpItem::emerging(kind, origin));
                ctx.emit_sound(SoundEvent::POWERUP_APPEAR);
            }
            Reward::Coin | Reward::Nothing => {
                world.coins.push(Coin::popped(origin));
                ctx.emit_sound(SoundEvent::COIN);
            }
        }
        log::debug!("question block ({}, {}) yielded {:?}", col, row, reward);
        return;
    }

    match code {
        codes::BRICK if world.player.tier > PowerTier::None => {
            world.grid.set(col, row, codes::EMPTY);
            if let Some(i) = index {
                world.blocks.remove(i);
            }
            let center = origin + Vec2::splat(TILE_SIZE * 0.5);
            for _ in 0..DEBRIS_PIECES {
                let vel = Vec2::new(world.rng.range(-3.0, 3.0), world.rng.range(-8.0, -4.0));
                world.particles.push(Particle::debris(center, vel));
            }
            world.award(BRICK_POINTS, origin);
            ctx.emit_sound(SoundEvent::BRICK);
            log::debug!("brick ({}, {}) broken", col, row);
        }
        codes::BRICK | codes::USED => {
            if let Some(i) = index {
                world.blocks[i].bump = BUMP_TICKS;
            }
            ctx.emit_sound(SoundEvent::BUMP);
        }
        _ => {}
    }
}

/// Advance coins, power-ups, particles and block bumps; collect what the
/// player touches.
pub fn update_items(world: &mut World, ctx: &mut EngineContext) {
    update_coins(world, ctx);
    update_powerups(world);
    collect_powerups(world, ctx);
    world.particles.retain_mut(|p| p.tick());
    for block in &mut world.blocks {
        block.bump = block.bump.saturating_sub(1);
    }
}

fn update_coins(world: &mut World, ctx: &mut EngineContext) {
    let player = world.player.body;
    let alive = world.player.alive;
    let mut counted = Vec::new();
    for coin in &mut world.coins {
        if coin.collected {
            continue;
        }
        match coin.pop {
            Some(ticks) => {
                coin.pos.y += coin.vel_y;
                coin.vel_y += COIN_POP_GRAVITY;
                if ticks <= 1 {
                    coin.pop = Some(0);
                    coin.collected = true;
                    counted.push(coin.pos);
                } else {
                    coin.pop = Some(ticks - 1);
                }
            }
            None => {
                if alive && player.overlaps(&coin.body()) {
                    coin.collected = true;
                    counted.push(coin.pos);
                    ctx.emit_sound(SoundEvent::COIN);
                }
            }
        }
    }
    world.coins.retain(|c| !c.collected);
    for at in counted {
        world.award_coin(ctx, at);
    }
}

fn update_powerups(world: &mut World) {
    let kill_line = world.kill_line();
    for item in &mut world.powerups {
        if item.emerge > 0 {
            item.body.pos.y -= 1.0;
            item.emerge -= 1;
            if item.emerge == 0 && item.kind == PowerUpKind::Mushroom {
                item.body.vel.x = MUSHROOM_SPEED;
            }
            continue;
        }
        if item.kind == PowerUpKind::Flower {
            continue;
        }
        let body = &mut item.body;
        body.apply_gravity(GRAVITY, MAX_FALL);
        sweep(body, &world.grid, WallResponse::Reverse);
        land_on_one_way(body, &world.grid);
        ride_platforms(body, &world.grid, &world.platforms);
        if body.top() > kill_line {
            item.alive = false;
        }
    }
    world.powerups.retain(|p| p.alive);
}

fn collect_powerups(world: &mut World, ctx: &mut EngineContext) {
    if !world.player.alive {
        return;
    }
    let Some(index) = world
        .powerups
        .iter()
        .position(|p| p.alive && p.emerge == 0 && world.player.body.overlaps(&p.body))
    else {
        return;
    };
    let item = world.powerups.remove(index);
    let before = world.player.tier;
    let after = before.advance(item.kind);
    if before == PowerTier::None && after != PowerTier::None {
        world.player.timers.grow = GROW_TICKS;
    }
    world.player.set_tier(after);
    nudge_out_of_solid(&mut world.player.body, &world.grid);
    world.award(POWERUP_POINTS, item.body.pos);
    ctx.emit_sound(SoundEvent::POWERUP);
    log::debug!("power-up {:?} collected, tier {:?} -> {:?}", item.kind, before, after);
}
