//! Contact resolution between the player, its projectiles, shells and
//! enemies.

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::enemy::{DeathStyle, Enemy, EnemyKind, EnemyState, SHELL_SIZE};
use crate::physics::body::Body;
use crate::systems::companion;
use crate::systems::enemies::{
    can_be_hit, damage_boss, BOSS_DEATH_TICKS, KICK_GRACE, KNOCKED_TICKS, SHELL_SPEED, SHELL_TICKS,
    SQUISH_TICKS,
};
use crate::systems::player;
use crate::world::World;

pub const STOMP_POINTS: u32 = 100;
pub const SHELL_POINTS: u32 = 200;
pub const FIREBALL_POINTS: u32 = 200;
pub const BOSS_HIT_POINTS: u32 = 500;
pub const BOSS_DEFEAT_POINTS: u32 = 5000;

/// Upward velocity after a stomp; smaller than a jump.
pub const STOMP_BOUNCE: f32 = -6.0;
/// How far last tick's feet may have been below an enemy's top for a stomp.
const STOMP_TOLERANCE: f32 = 10.0;
/// Fraction of the boss's height, from the top, that counts as its head.
const BOSS_HEAD_FRACTION: f32 = 0.35;

/// What touching an enemy does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Stomp,
    Kick,
    Hurt,
    Ignore,
}

/// `player` carries the velocity it had before this tick's contacts, so a
/// bounce off one enemy does not turn the next overlap into a side hit.
fn is_stomp(player: &Body, enemy: &Body) -> bool {
    let prev_bottom = player.bottom() - player.vel.y;
    player.vel.y > 0.0 && prev_bottom <= enemy.top() + STOMP_TOLERANCE
}

fn boss_head_hit(player: &Body, boss: &Body) -> bool {
    player.vel.y > 0.0 && player.bottom() <= boss.top() + boss.size.y * BOSS_HEAD_FRACTION
}

fn classify(player: &Body, enemy: &Enemy) -> Contact {
    match (enemy.kind, enemy.state) {
        // plants are never stompable
        (EnemyKind::Plant, _) => Contact::Hurt,
        (EnemyKind::Boss, _) => {
            if boss_head_hit(player, &enemy.body) {
                Contact::Stomp
            } else {
                Contact::Hurt
            }
        }
        (EnemyKind::Koopa, EnemyState::Shell) => Contact::Kick,
        (EnemyKind::Koopa, EnemyState::ShellSlide) => {
            if enemy.kick_grace > 0 {
                Contact::Ignore
            } else {
                Contact::Kick
            }
        }
        _ => {
            if is_stomp(player, &enemy.body) {
                Contact::Stomp
            } else {
                Contact::Hurt
            }
        }
    }
}

pub fn resolve(world: &mut World, ctx: &mut EngineContext) {
    player_contacts(world, ctx);
    fireball_hits(world, ctx);
    shell_hits(world, ctx);
    companion::apply_tongue(world, ctx);
}

fn player_contacts(world: &mut World, ctx: &mut EngineContext) {
    if !world.player.alive {
        return;
    }
    let frame = world.frame;
    let approach = world.player.body;
    for i in 0..world.enemies.len() {
        if !world.player.alive {
            return;
        }
        let enemy = &world.enemies[i];
        if !can_be_hit(enemy, frame) || !world.player.body.overlaps(&enemy.body) {
            continue;
        }
        match classify(&approach, enemy) {
            Contact::Stomp => stomp(world, ctx, i),
            Contact::Kick => {
                let stomped = is_stomp(&approach, &world.enemies[i].body);
                kick(world, ctx, i);
                if stomped {
                    world.player.body.vel.y = STOMP_BOUNCE;
                }
            }
            Contact::Hurt => player::hurt(world, ctx),
            Contact::Ignore => {}
        }
    }
}

fn stomp(world: &mut World, ctx: &mut EngineContext, index: usize) {
    world.player.body.vel.y = STOMP_BOUNCE;
    let enemy = &mut world.enemies[index];
    let at = enemy.body.pos;
    match enemy.kind {
        EnemyKind::Boss => hit_boss(world, ctx, index),
        EnemyKind::Koopa => {
            enemy.state = EnemyState::Shell;
            enemy.shell_timer = SHELL_TICKS;
            enemy.body.vel.x = 0.0;
            enemy.body.resize_keep_feet(SHELL_SIZE);
            world.award(STOMP_POINTS, at);
            ctx.emit_sound(SoundEvent::STOMP);
        }
        _ => {
            enemy.kill(DeathStyle::Squish, SQUISH_TICKS);
            world.award(STOMP_POINTS, at);
            ctx.emit_sound(SoundEvent::STOMP);
        }
    }
}

/// One point of boss damage: stun, score, and on the last point the
/// shrink countdown that ends the level.
pub fn hit_boss(world: &mut World, ctx: &mut EngineContext, index: usize) {
    let enemy = &mut world.enemies[index];
    let at = enemy.body.pos;
    let defeated = enemy.boss_mut().is_some_and(damage_boss);
    ctx.emit_sound(SoundEvent::BOSS_HIT);
    if defeated {
        enemy.kill(DeathStyle::Shrink, BOSS_DEATH_TICKS);
        world.boss_defeated = true;
        world.award(BOSS_HIT_POINTS + BOSS_DEFEAT_POINTS, at);
        ctx.emit_sound(SoundEvent::BOSS_DEFEAT);
        log::info!("boss defeated in level {}", world.level_index);
    } else {
        world.award(BOSS_HIT_POINTS, at);
    }
}

/// Send a shell sliding away from the side the player touched it from.
fn kick(world: &mut World, ctx: &mut EngineContext, index: usize) {
    let player_x = world.player.body.center().x;
    let facing = world.player.facing.sign();
    let enemy = &mut world.enemies[index];
    let dx = enemy.body.center().x - player_x;
    let dir = if dx.abs() < 1.0 { facing } else { dx.signum() };
    enemy.state = EnemyState::ShellSlide;
    enemy.body.vel.x = dir * SHELL_SPEED;
    enemy.kick_grace = KICK_GRACE;
    ctx.emit_sound(SoundEvent::KICK);
}

fn fireball_hits(world: &mut World, ctx: &mut EngineContext) {
    let frame = world.frame;
    let mut hits = Vec::new();
    for fireball in &mut world.player.fireballs {
        for enemy in &mut world.enemies {
            if !fireball.alive || !can_be_hit(enemy, frame) || !fireball.body.overlaps(&enemy.body) {
                continue;
            }
            fireball.alive = false;
            if enemy.kind != EnemyKind::Boss {
                enemy.kill(DeathStyle::Knocked, KNOCKED_TICKS);
                hits.push(enemy.body.pos);
            }
        }
    }
    world.player.fireballs.retain(|f| f.alive);
    if !hits.is_empty() {
        ctx.emit_sound(SoundEvent::KICK);
    }
    for at in hits {
        world.award(FIREBALL_POINTS, at);
    }
}

/// Sliding shells knock out every other non-boss enemy they touch.
fn shell_hits(world: &mut World, ctx: &mut EngineContext) {
    let frame = world.frame;
    let shells: Vec<(usize, Body)> = world
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive() && e.state == EnemyState::ShellSlide)
        .map(|(i, e)| (i, e.body))
        .collect();
    let mut hits = Vec::new();
    for (shell_index, shell) in shells {
        if !world.enemies[shell_index].is_alive() {
            continue;
        }
        for (i, enemy) in world.enemies.iter_mut().enumerate() {
            if i == shell_index || !can_be_hit(enemy, frame) || !shell.overlaps(&enemy.body) {
                continue;
            }
            if enemy.kind == EnemyKind::Boss {
                continue;
            }
            enemy.kill(DeathStyle::Knocked, KNOCKED_TICKS);
            hits.push(enemy.body.pos);
        }
    }
    if !hits.is_empty() {
        ctx.emit_sound(SoundEvent::KICK);
    }
    for at in hits {
        world.award(SHELL_POINTS, at);
    }
}
