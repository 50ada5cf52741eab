//! Enemy behavior engine. One record per enemy, dispatched on its kind.

use glam::Vec2;

use crate::api::game::EngineContext;
use crate::api::types::SoundEvent;
use crate::components::enemy::{
    plant_extension, plant_phase, BossData, DeathStyle, Enemy, EnemyExtra, EnemyKind, EnemyState,
    PlantPhase, KOOPA_SIZE, PATROL_SPEED,
};
use crate::components::items::{MovingPlatform, Particle};
use crate::level::grid::TileGrid;
use crate::physics::collision::{
    land_on_one_way, ride_platforms, sweep, sweep_horizontal, sweep_vertical, WallResponse,
};
use crate::physics::{GRAVITY, MAX_FALL};
use crate::world::World;

pub const SQUISH_TICKS: u32 = 30;
pub const KNOCKED_TICKS: u32 = 60;
pub const BOSS_DEATH_TICKS: u32 = 90;
pub const SHELL_TICKS: u32 = 300;
pub const SHELL_SPEED: f32 = 8.0;
/// Ticks a freshly kicked shell ignores the player.
pub const KICK_GRACE: u32 = 10;

const LADYBUG_AMPLITUDE: f32 = 24.0;
const LADYBUG_FREQUENCY: f32 = 0.05;

pub const BOSS_STUN_TICKS: u32 = 90;
const BOSS_WALK_SPEED: f32 = 1.0;
const BOSS_LEAP: f32 = 8.0;
const BOSS_JUMP_INTERVAL: u32 = 120;
const BOSS_MIN_INTERVAL: u32 = 30;

/// Whether an enemy can currently be touched at all.
pub fn can_be_hit(enemy: &Enemy, frame: u64) -> bool {
    if !enemy.is_alive() {
        return false;
    }
    match enemy.kind {
        EnemyKind::Plant => plant_phase(frame) == PlantPhase::Exposed,
        EnemyKind::Boss => enemy.boss().is_some_and(|b| b.stun == 0),
        _ => true,
    }
}

/// Boss walk speed, leap power and leap interval for a phase.
pub fn boss_tuning(phase: u32) -> (f32, f32, u32) {
    let step = phase.saturating_sub(1);
    let speed = BOSS_WALK_SPEED + 0.5 * step as f32;
    let leap = BOSS_LEAP + 1.5 * step as f32;
    let interval = BOSS_JUMP_INTERVAL.saturating_sub(30 * step).max(BOSS_MIN_INTERVAL);
    (speed, leap, interval)
}

pub fn update(world: &mut World, ctx: &mut EngineContext) {
    let frame = world.frame;
    let kill_line = world.grid.height_px();
    let player_x = world.player.body.center().x;
    let mut pounds = Vec::new();

    for enemy in &mut world.enemies {
        if !enemy.is_alive() {
            update_dead(enemy);
            continue;
        }
        match enemy.kind {
            EnemyKind::Goomba => patrol(enemy, &world.grid, &world.platforms),
            EnemyKind::Koopa => update_koopa(enemy, &world.grid, &world.platforms, player_x),
            EnemyKind::Plant => update_plant(enemy, frame),
            EnemyKind::Ladybug => update_ladybug(enemy, &world.grid, frame),
            EnemyKind::Boss => {
                if update_boss(enemy, &world.grid, player_x) {
                    pounds.push(enemy.body.feet());
                }
            }
        }
        if enemy.body.top() > kill_line {
            // fell out of the level: drop without an animation
            enemy.kill(DeathStyle::Knocked, 0);
        }
    }

    for at in pounds {
        ctx.emit_sound(SoundEvent::BOSS_POUND);
        for dir in [-1.0, 1.0] {
            world.particles.push(Particle::dust(at, Vec2::new(dir * 3.0, -1.0)));
        }
    }
}

/// Drop enemies whose death countdown has run out. A vanished boss ends
/// the level.
pub fn remove_finished(world: &mut World) {
    let mut boss_gone = false;
    world.enemies.retain(|enemy| {
        let done = !enemy.is_alive() && enemy.squish == 0;
        if done && enemy.kind == EnemyKind::Boss {
            boss_gone = true;
        }
        !done
    });
    if boss_gone && world.boss_defeated {
        world.level_complete = true;
        log::info!("boss vanished, level {} complete", world.level_index);
    }
}

fn update_dead(enemy: &mut Enemy) {
    enemy.squish = enemy.squish.saturating_sub(1);
    if enemy.death == Some(DeathStyle::Knocked) {
        enemy.body.apply_gravity(GRAVITY, MAX_FALL);
        enemy.body.pos += enemy.body.vel;
    }
}

fn fall_and_sweep(enemy: &mut Enemy, grid: &TileGrid, platforms: &[MovingPlatform]) {
    let body = &mut enemy.body;
    body.apply_gravity(GRAVITY, MAX_FALL);
    sweep(body, grid, WallResponse::Reverse);
    land_on_one_way(body, grid);
    ride_platforms(body, grid, platforms);
}

fn patrol(enemy: &mut Enemy, grid: &TileGrid, platforms: &[MovingPlatform]) {
    fall_and_sweep(enemy, grid, platforms);
}

fn update_koopa(enemy: &mut Enemy, grid: &TileGrid, platforms: &[MovingPlatform], player_x: f32) {
    match enemy.state {
        EnemyState::Walk => patrol(enemy, grid, platforms),
        EnemyState::Shell => {
            enemy.body.vel.x = 0.0;
            fall_and_sweep(enemy, grid, platforms);
            enemy.shell_timer = enemy.shell_timer.saturating_sub(1);
            if enemy.shell_timer == 0 {
                enemy.state = EnemyState::Walk;
                enemy.body.resize_keep_feet(KOOPA_SIZE);
                let toward = (player_x - enemy.body.center().x).signum();
                enemy.body.vel.x = toward * PATROL_SPEED;
            }
        }
        EnemyState::ShellSlide => {
            enemy.kick_grace = enemy.kick_grace.saturating_sub(1);
            fall_and_sweep(enemy, grid, platforms);
        }
        EnemyState::Dead => {}
    }
}

fn update_plant(enemy: &mut Enemy, frame: u64) {
    if let EnemyExtra::Plant { origin } = enemy.extra {
        let hidden = (1.0 - plant_extension(frame)) * enemy.body.size.y;
        enemy.body.pos = origin + Vec2::new(0.0, hidden);
    }
}

fn update_ladybug(enemy: &mut Enemy, grid: &TileGrid, frame: u64) {
    let EnemyExtra::Ladybug { baseline } = enemy.extra else {
        return;
    };
    sweep_horizontal(&mut enemy.body, grid, WallResponse::Reverse);
    enemy.body.pos.y = baseline + (frame as f32 * LADYBUG_FREQUENCY).sin() * LADYBUG_AMPLITUDE;
    enemy.body.vel.y = 0.0;
}

/// Returns true on the tick a leap lands.
fn update_boss(enemy: &mut Enemy, grid: &TileGrid, player_x: f32) -> bool {
    let EnemyExtra::Boss(mut boss) = enemy.extra else {
        return false;
    };
    let body = &mut enemy.body;

    if boss.stun > 0 {
        boss.stun -= 1;
        body.vel.x = 0.0;
    } else {
        let (speed, leap, interval) = boss_tuning(boss.phase());
        let toward = player_x - body.center().x;
        body.vel.x = if toward.abs() < 4.0 { 0.0 } else { toward.signum() * speed };
        if body.on_ground {
            boss.jump_timer = boss.jump_timer.saturating_sub(1);
            if boss.jump_timer == 0 {
                body.vel.y = -leap;
                boss.leaping = true;
                boss.jump_timer = interval;
            }
        }
    }

    body.apply_gravity(GRAVITY, MAX_FALL);
    sweep_horizontal(body, grid, WallResponse::Stop);
    let landed = sweep_vertical(body, grid).landed && boss.leaping;
    if landed {
        boss.leaping = false;
    }
    enemy.extra = EnemyExtra::Boss(boss);
    landed
}

/// Hit the boss once. Returns true if this hit defeated it.
pub fn damage_boss(boss: &mut BossData) -> bool {
    boss.hp = boss.hp.saturating_sub(1);
    boss.stun = BOSS_STUN_TICKS;
    boss.leaping = false;
    boss.hp == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::enemy::{PLANT_CYCLE, PLANT_HIDDEN, PLANT_RISING};
    use crate::components::player::{Character, Player, PowerTier};
    use crate::world::{CarryOver, Stats};

    fn arena() -> World {
        let mut world = World::load(0, Character::Mario, Stats::new(3), CarryOver::default(), Vec2::new(800.0, 480.0), 5);
        world.grid = TileGrid::from_rows(&[
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "#..................#",
            "####################",
        ]);
        world.enemies.clear();
        world.platforms.clear();
        world.companion = None;
        world.flag = None;
        world.player = Player::new(TileGrid::feet_anchor(2, 6), PowerTier::None);
        world
    }

    #[test]
    fn goomba_turns_at_walls() {
        let mut world = arena();
        let mut ctx = EngineContext::new();
        world.enemies.push(Enemy::spawn(EnemyKind::Goomba, TileGrid::feet_anchor(2, 6)));
        let mut turned = false;
        for _ in 0..200 {
            update(&mut world, &mut ctx);
            if world.enemies[0].body.vel.x > 0.0 {
                turned = true;
            }
            assert!(world.enemies[0].body.left() >= 32.0);
        }
        assert!(turned);
    }

    #[test]
    fn shell_stands_back_up() {
        let mut world = arena();
        let mut ctx = EngineContext::new();
        let mut koopa = Enemy::spawn(EnemyKind::Koopa, TileGrid::feet_anchor(8, 6));
        koopa.state = EnemyState::Shell;
        koopa.shell_timer = 5;
        world.enemies.push(koopa);
        for _ in 0..5 {
            update(&mut world, &mut ctx);
        }
        let koopa = &world.enemies[0];
        assert_eq!(koopa.state, EnemyState::Walk);
        assert_eq!(koopa.body.size, KOOPA_SIZE);
        assert_eq!(koopa.body.bottom(), 7.0 * 32.0);
    }

    #[test]
    fn plant_only_hittable_while_exposed() {
        let mut plant = Enemy::spawn(EnemyKind::Plant, TileGrid::feet_anchor(4, 6));
        let origin = plant.body.pos;
        update_plant(&mut plant, 0);
        assert!(plant.body.pos.y > origin.y);
        assert!(!can_be_hit(&plant, 0));
        let exposed = PLANT_HIDDEN + PLANT_RISING + 1;
        update_plant(&mut plant, exposed);
        assert_eq!(plant.body.pos, origin);
        assert!(can_be_hit(&plant, exposed));
        assert!(!can_be_hit(&plant, exposed + PLANT_CYCLE / 2));
    }

    #[test]
    fn ladybug_flies_around_baseline() {
        let mut world = arena();
        let mut ctx = EngineContext::new();
        world.enemies.push(Enemy::spawn(EnemyKind::Ladybug, TileGrid::feet_anchor(9, 3)));
        let baseline = world.enemies[0].body.pos.y;
        for _ in 0..300 {
            world.frame += 1;
            update(&mut world, &mut ctx);
            let y = world.enemies[0].body.pos.y;
            assert!((y - baseline).abs() <= LADYBUG_AMPLITUDE + 1e-3);
        }
        assert!(world.enemies[0].is_alive());
    }

    #[test]
    fn boss_escalates_with_phase() {
        let (s1, l1, i1) = boss_tuning(1);
        let (s3, l3, i3) = boss_tuning(3);
        assert!(s3 > s1 && l3 > l1 && i3 < i1);
        assert_eq!(boss_tuning(10).2, BOSS_MIN_INTERVAL);
    }

    #[test]
    fn boss_leaps_and_pounds() {
        let mut world = arena();
        let mut ctx = EngineContext::new();
        world.enemies.push(Enemy::spawn(EnemyKind::Boss, TileGrid::feet_anchor(14, 6)));
        for _ in 0..300 {
            update(&mut world, &mut ctx);
        }
        assert!(ctx.sounds.contains(&SoundEvent::BOSS_POUND));
        // walked toward the player
        assert!(world.enemies[0].body.center().x < TileGrid::feet_anchor(14, 6).x);
    }

    #[test]
    fn stunned_boss_is_untouchable() {
        let mut boss = Enemy::spawn(EnemyKind::Boss, Vec2::new(100.0, 100.0));
        if let Some(data) = boss.boss_mut() {
            assert!(!damage_boss(data));
        }
        assert!(!can_be_hit(&boss, 0));
    }

    #[test]
    fn dead_enemies_are_removed_after_countdown() {
        let mut world = arena();
        let mut ctx = EngineContext::new();
        let mut goomba = Enemy::spawn(EnemyKind::Goomba, TileGrid::feet_anchor(5, 6));
        goomba.kill(DeathStyle::Squish, 3);
        world.enemies.push(goomba);
        for _ in 0..2 {
            update(&mut world, &mut ctx);
            remove_finished(&mut world);
        }
        assert_eq!(world.enemies.len(), 1);
        update(&mut world, &mut ctx);
        remove_finished(&mut world);
        assert!(world.enemies.is_empty());
    }
}
