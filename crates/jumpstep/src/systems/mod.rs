//! Per-tick systems. Each is a set of free functions over `&mut World`,
//! called in a fixed order by `World::step`.

pub mod blocks;
pub mod camera;
pub mod combat;
pub mod companion;
pub mod enemies;
pub mod player;
pub mod warp;
