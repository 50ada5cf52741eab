pub mod grid;
pub mod loader;
pub mod table;

pub use grid::{TileGrid, TILE_SIZE};
pub use loader::{parse_level, EnemySpawn, ParsedLevel};
pub use table::{level_def, LevelDef, LEVELS};
