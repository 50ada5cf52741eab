use glam::Vec2;
use serde::Serialize;

use crate::world::World;

/// Where the player sits horizontally, as a fraction of the viewport width.
pub const LEAD_FRACTION: f32 = 0.4;
/// Share of the remaining distance kept per 60 Hz tick.
const SMOOTHING: f32 = 0.9;

/// Scrolling viewport. `offset` is the world position of the viewport's
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Vec2,
    pub smoothing: f32,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport,
            smoothing: SMOOTHING,
        }
    }

    pub fn snap(&mut self, target: Vec2) {
        self.offset = target;
    }

    /// Exponential approach, frame-rate independent.
    pub fn follow(&mut self, target: Vec2, dt: f32) {
        let k = 1.0 - self.smoothing.powf(dt * 60.0);
        self.offset += (target - self.offset) * k;
    }
}

/// Where the camera wants to be this tick.
pub fn target_offset(world: &World) -> Vec2 {
    let view = world.camera.viewport;
    let focus = world.player.body.center();

    let max_x = (world.grid.width_px() - view.x).max(0.0);
    let x = (focus.x - view.x * LEAD_FRACTION).clamp(0.0, max_x);

    let y = if world.in_sub_level {
        let top = world.sub_level_top().unwrap_or(0.0);
        let max_y = (world.grid.height_px() - view.y).max(top);
        (focus.y - view.y * 0.5).clamp(top, max_y)
    } else {
        let bottom = world.main_bottom();
        if bottom > view.y * 2.0 {
            (focus.y - view.y * 0.5).clamp(0.0, (bottom - view.y).max(0.0))
        } else {
            // ground row pinned to the bottom edge
            bottom - view.y
        }
    };
    Vec2::new(x, y)
}

pub fn update(world: &mut World, dt: f32) {
    let target = target_offset(world);
    world.camera.follow(target, dt);
}
