use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned moving box. `pos` is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            on_ground: false,
        }
    }

    /// Box of `size` standing with its bottom-centre on `anchor`.
    pub fn standing_at(anchor: Vec2, size: Vec2) -> Self {
        Self::new(Vec2::new(anchor.x - size.x / 2.0, anchor.y - size.y), size)
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    /// Accelerate downward, capped at `max_fall`.
    pub fn apply_gravity(&mut self, gravity: f32, max_fall: f32) {
        self.vel.y = (self.vel.y + gravity).min(max_fall);
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Bottom-centre point.
    pub fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.bottom())
    }

    /// Move so the bottom-centre sits on `anchor`.
    pub fn place_feet(&mut self, anchor: Vec2) {
        self.pos = Vec2::new(anchor.x - self.size.x / 2.0, anchor.y - self.size.y);
    }

    /// Change the box height while keeping the feet where they are.
    pub fn resize_keep_feet(&mut self, size: Vec2) {
        let feet = self.feet();
        self.size = size;
        self.place_feet(feet);
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Body) -> bool {
        rects_overlap(self.pos, self.size, other.pos, other.size)
    }

    pub fn overlaps_rect(&self, pos: Vec2, size: Vec2) -> bool {
        rects_overlap(self.pos, self.size, pos, size)
    }

    pub fn horizontal_overlap(&self, other_left: f32, other_right: f32) -> bool {
        self.right() > other_left && self.left() < other_right
    }
}

pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}
