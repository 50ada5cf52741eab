pub mod companion;
pub mod enemy;
pub mod items;
pub mod player;
