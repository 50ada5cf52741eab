//! The platformer built on the simulation: phases, world map, menus,
//! cinematics, attract mode and saves.

pub mod cinematic;
pub mod demo;
pub mod platformer;
pub mod save;
pub mod select;
pub mod world_map;

pub use platformer::{Phase, Platformer, Progress};
pub use save::SaveSnapshot;
