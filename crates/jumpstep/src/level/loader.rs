//! Character-grid level parser.
//!
//! Scans rows top to bottom, left to right. Spawn-only markers are cleared
//! from the grid; interactive tiles stay so the resolver still sees them.
//! Dig spots and warp exits pair with entry markers purely by scan order.

use glam::Vec2;

use crate::components::enemy::EnemyKind;
use crate::components::items::{Block, DigSpot, PowerUpKind, Reward, WarpExit};
use crate::level::grid::{codes, TileGrid};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    /// Bottom-centre of the marker cell.
    pub anchor: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLevel {
    pub grid: TileGrid,
    /// Feet anchor of the first start marker.
    pub player_start: Option<Vec2>,
    /// Feet anchors of every later start marker, in scan order.
    pub entries: Vec<Vec2>,
    pub enemies: Vec<EnemySpawn>,
    /// Top-left corners of coin cells.
    pub coins: Vec<Vec2>,
    pub blocks: Vec<Block>,
    pub companion: Option<Vec2>,
    /// Top-left of the flag cell.
    pub flag: Option<Vec2>,
    /// Top-left of each platform marker cell.
    pub platforms: Vec<Vec2>,
    pub dig_spots: Vec<DigSpot>,
    pub warp_exits: Vec<WarpExit>,
}

fn enemy_kind(code: char) -> Option<EnemyKind> {
    match code {
        codes::GOOMBA => Some(EnemyKind::Goomba),
        codes::KOOPA => Some(EnemyKind::Koopa),
        codes::PLANT => Some(EnemyKind::Plant),
        codes::BOSS => Some(EnemyKind::Boss),
        codes::LADYBUG => Some(EnemyKind::Ladybug),
        _ => None,
    }
}

fn block_reward(code: char) -> Option<Reward> {
    match code {
        codes::QUESTION => Some(Reward::Coin),
        codes::QUESTION_MUSHROOM => Some(Reward::PowerUp(PowerUpKind::Mushroom)),
        codes::QUESTION_FLOWER => Some(Reward::PowerUp(PowerUpKind::Flower)),
        codes::BRICK => Some(Reward::Nothing),
        _ => None,
    }
}

/// Parse a level's rows into a mutable grid plus spawn descriptors.
pub fn parse_level<S: AsRef<str>>(rows: &[S]) -> ParsedLevel {
    let mut grid = TileGrid::from_rows(rows);
    let mut starts = Vec::new();
    let mut parsed = ParsedLevel {
        grid: TileGrid::new(0, 0),
        player_start: None,
        entries: Vec::new(),
        enemies: Vec::new(),
        coins: Vec::new(),
        blocks: Vec::new(),
        companion: None,
        flag: None,
        platforms: Vec::new(),
        dig_spots: Vec::new(),
        warp_exits: Vec::new(),
    };

    for row in 0..grid.height() as i32 {
        for col in 0..grid.width() as i32 {
            let code = grid.get(col, row);
            let anchor = TileGrid::feet_anchor(col, row);
            let origin = TileGrid::cell_origin(col, row);

            if let Some(kind) = enemy_kind(code) {
                parsed.enemies.push(EnemySpawn { kind, anchor });
                grid.set(col, row, codes::EMPTY);
                continue;
            }
            if let Some(reward) = block_reward(code) {
                parsed.blocks.push(Block::new(col, row, reward));
                continue;
            }
            match code {
                codes::START => {
                    starts.push(anchor);
                    grid.set(col, row, codes::EMPTY);
                }
                codes::COIN => {
                    parsed.coins.push(origin);
                    grid.set(col, row, codes::EMPTY);
                }
                codes::FLAG => {
                    if parsed.flag.is_none() {
                        parsed.flag = Some(origin);
                    }
                    grid.set(col, row, codes::EMPTY);
                }
                codes::COMPANION => {
                    if parsed.companion.is_none() {
                        parsed.companion = Some(anchor);
                    }
                    grid.set(col, row, codes::EMPTY);
                }
                codes::PLATFORM => {
                    parsed.platforms.push(origin);
                    grid.set(col, row, codes::EMPTY);
                }
                codes::DIG => parsed.dig_spots.push(DigSpot { col, row, target: None }),
                codes::WARP_EXIT => parsed.warp_exits.push(WarpExit {
                    col,
                    row,
                    return_to: None,
                }),
                _ => {}
            }
        }
    }

    let mut starts = starts.into_iter();
    parsed.player_start = starts.next();
    parsed.entries = starts.collect();

    for (i, spot) in parsed.dig_spots.iter_mut().enumerate() {
        spot.target = parsed.entries.get(i).copied();
    }
    for (i, exit) in parsed.warp_exits.iter_mut().enumerate() {
        exit.return_to = parsed
            .dig_spots
            .get(i)
            .map(|spot| TileGrid::feet_anchor(spot.col, spot.row - 1));
    }

    log::debug!(
        "parsed level {}x{}: {} enemies, {} blocks, {} dig spots",
        grid.width(),
        grid.height(),
        parsed.enemies.len(),
        parsed.blocks.len(),
        parsed.dig_spots.len()
    );
    parsed.grid = grid;
    parsed
}
