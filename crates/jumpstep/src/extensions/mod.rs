// Interpolation helpers for scripted sequences (warp animation).

pub mod easing;

pub use easing::{ease_vec2, progress, Easing};
