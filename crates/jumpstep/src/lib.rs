pub mod api;
pub mod components;
pub mod core;
pub mod extensions;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;
pub mod systems;
pub mod world;

// Re-export key types at crate root for convenience
pub use api::game::{EngineContext, Game, GameConfig};
pub use api::types::SoundEvent;
pub use core::rng::Rng;
pub use core::time::FixedTimestep;
pub use input::state::{Action, InputSnapshot, InputState};

pub use components::companion::{Companion, CompanionState};
pub use components::enemy::{Enemy, EnemyKind, EnemyState};
pub use components::player::{Character, Player, PowerTier};
pub use level::{LevelDef, TileGrid, LEVELS, TILE_SIZE};
pub use physics::Body;
pub use systems::camera::Camera;
pub use systems::warp::{WarpAnimation, WarpKind, WarpPhase};
pub use world::{CarryOver, LevelEvent, Stats, World};

pub use game::{Phase, Platformer, Progress, SaveSnapshot};
