//! Attract-mode pilot for the title screen.

use glam::Vec2;

use crate::components::player::Facing;
use crate::core::rng::Rng;
use crate::input::state::{Action, InputSnapshot};
use crate::level::grid::TileGrid;
use crate::world::World;

/// Jumps are held this long, plus up to `JUMP_HOLD_JITTER` more.
const JUMP_HOLD_MIN: u32 = 8;
const JUMP_HOLD_JITTER: u32 = 12;
/// Average ticks between unprompted hops.
const RANDOM_HOP: u32 = 90;
/// How far ahead of the feet the pilot checks for a pit.
const LOOK_AHEAD: f32 = 20.0;

/// Holds right and hops when blocked, at a pit edge, or on a whim.
#[derive(Debug, Clone)]
pub struct DemoPilot {
    rng: Rng,
    hold: u32,
}

impl DemoPilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
            hold: 0,
        }
    }

    pub fn next_input(&mut self, world: &World) -> InputSnapshot {
        let mut snapshot = InputSnapshot::new().with(Action::Right);
        let player = &world.player;

        if self.hold > 0 {
            self.hold -= 1;
            return snapshot.with(Action::Jump);
        }
        if !player.body.on_ground {
            return snapshot;
        }

        let blocked = player.wall_contact == Some(Facing::Right);
        let ahead = player.body.feet() + Vec2::new(LOOK_AHEAD, 1.0);
        let (col, row) = TileGrid::cell_of(ahead);
        let pit = !world.grid.is_solid_at(col, row);
        if blocked || pit || self.rng.one_in(RANDOM_HOP) {
            self.hold = JUMP_HOLD_MIN + self.rng.next_int(JUMP_HOLD_JITTER);
            snapshot.press(Action::Jump);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::player::{Character, Player, PowerTier};
    use crate::world::{CarryOver, Stats};

    fn flat() -> World {
        let mut world = World::load(0, Character::Mario, Stats::new(3), CarryOver::default(), Vec2::new(800.0, 480.0), 1);
        world.grid = TileGrid::from_rows(&[
            "..........",
            "..........",
            "######..##",
        ]);
        world.player = Player::new(TileGrid::feet_anchor(1, 1), PowerTier::None);
        world.player.body.on_ground = true;
        world
    }

    #[test]
    fn always_runs_right() {
        let world = flat();
        let mut pilot = DemoPilot::new(3);
        for _ in 0..20 {
            assert!(pilot.next_input(&world).contains(Action::Right));
        }
    }

    #[test]
    fn jumps_at_a_pit_edge() {
        let mut world = flat();
        world.player.body.place_feet(TileGrid::feet_anchor(5, 1));
        let mut pilot = DemoPilot::new(3);
        let input = pilot.next_input(&world);
        assert!(input.contains(Action::Jump));
        // keeps holding jump for the variable-height window
        assert!(pilot.next_input(&world).contains(Action::Jump));
    }

    #[test]
    fn same_seed_same_inputs() {
        let world = flat();
        let mut a = DemoPilot::new(11);
        let mut b = DemoPilot::new(11);
        for _ in 0..300 {
            assert_eq!(a.next_input(&world), b.next_input(&world));
        }
    }
}
