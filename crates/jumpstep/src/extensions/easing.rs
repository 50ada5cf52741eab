//! Easing curves for the scripted warp sequence.

use glam::Vec2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    /// Slow start; used for falling into view.
    QuadIn,
    QuadOut,
    SineInOut,
}

impl Easing {
    /// Map progress `t` (clamped to 0..=1) through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Fraction of a countdown that has elapsed, for a phase of `total` ticks
/// with `remaining` left.
pub fn progress(remaining: u32, total: u32) -> f32 {
    if total == 0 {
        return 1.0;
    }
    1.0 - remaining as f32 / total as f32
}

pub fn ease_vec2(a: Vec2, b: Vec2, t: f32, easing: Easing) -> Vec2 {
    a + (b - a) * easing.apply(t)
}
