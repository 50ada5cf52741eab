//! Mutable tile grid shared by the collision resolver and the block handler.
//!
//! Cells hold single-character tile codes in row-major order. Lookups outside
//! the grid resolve to empty, so short or malformed rows degrade to air.

use glam::Vec2;
use serde::{Serialize, Serializer};

/// Edge length of one tile in world pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Tile codes understood by the loader and the resolver.
pub mod codes {
    pub const EMPTY: char = '.';
    pub const GROUND: char = '#';
    pub const PIPE: char = 'P';
    pub const BRICK: char = 'B';
    pub const QUESTION: char = '?';
    pub const QUESTION_MUSHROOM: char = 'M';
    pub const QUESTION_FLOWER: char = 'F';
    pub const USED: char = 'U';
    pub const ONE_WAY: char = '=';
    pub const DIG: char = 'D';
    pub const WARP_EXIT: char = 'W';
    pub const START: char = 'S';
    pub const GOOMBA: char = 'g';
    pub const KOOPA: char = 'k';
    pub const PLANT: char = 'p';
    pub const BOSS: char = 'b';
    pub const LADYBUG: char = 'l';
    pub const COIN: char = 'c';
    pub const FLAG: char = 'f';
    pub const COMPANION: char = 'y';
    pub const PLATFORM: char = 'm';
}

/// Solidity is a pure function of the tile code.
pub fn is_solid(code: char) -> bool {
    matches!(
        code,
        codes::GROUND
            | codes::PIPE
            | codes::BRICK
            | codes::QUESTION
            | codes::QUESTION_MUSHROOM
            | codes::QUESTION_FLOWER
            | codes::USED
            | codes::DIG
    )
}

pub fn is_one_way(code: char) -> bool {
    code == codes::ONE_WAY
}

/// Question-like tiles hold a reward until struck.
pub fn is_question(code: char) -> bool {
    matches!(
        code,
        codes::QUESTION | codes::QUESTION_MUSHROOM | codes::QUESTION_FLOWER
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl TileGrid {
    /// Create a grid filled with empty tiles.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![codes::EMPTY; width * height],
        }
    }

    /// Build a grid from text rows. Rows shorter than the widest are padded
    /// with empty; spaces read as empty.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let mut grid = Self::new(width, rows.len());
        for (row, line) in rows.iter().enumerate() {
            for (col, code) in line.as_ref().chars().enumerate() {
                let code = if code == ' ' { codes::EMPTY } else { code };
                grid.set(col as i32, row as i32, code);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn height_px(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        Some(row as usize * self.width + col as usize)
    }

    /// Tile code at (col, row); empty outside the grid.
    pub fn get(&self, col: i32, row: i32) -> char {
        self.index(col, row)
            .map(|i| self.cells[i])
            .unwrap_or(codes::EMPTY)
    }

    /// Overwrite a cell. Writes outside the grid are ignored.
    pub fn set(&mut self, col: i32, row: i32, code: char) {
        if let Some(i) = self.index(col, row) {
            self.cells[i] = code;
        }
    }

    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        is_solid(self.get(col, row))
    }

    /// Grid cell containing a world point.
    pub fn cell_of(point: Vec2) -> (i32, i32) {
        (
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        )
    }

    /// World-space top-left corner of a cell.
    pub fn cell_origin(col: i32, row: i32) -> Vec2 {
        Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE)
    }

    /// Bottom-centre of a cell: where a standing entity's feet go.
    pub fn feet_anchor(col: i32, row: i32) -> Vec2 {
        Vec2::new((col as f32 + 0.5) * TILE_SIZE, (row + 1) as f32 * TILE_SIZE)
    }

    pub fn row_string(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .collect()
    }

    /// Number of cells holding `code`.
    pub fn count(&self, code: char) -> usize {
        self.cells.iter().filter(|c| **c == code).count()
    }
}

impl Serialize for TileGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq((0..self.height).map(|row| self.row_string(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_empty() {
        let grid = TileGrid::from_rows(&["##", "##"]);
        assert_eq!(grid.get(-1, 0), codes::EMPTY);
        assert_eq!(grid.get(0, 5), codes::EMPTY);
        assert!(!grid.is_solid_at(2, 1));
        assert!(grid.is_solid_at(1, 1));
    }

    #[test]
    fn short_rows_are_padded() {
        let grid = TileGrid::from_rows(&["#####", "#", ""]);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(3, 1), codes::EMPTY);
        assert_eq!(grid.row_string(1), "#....");
    }

    #[test]
    fn set_mutates_in_place_and_ignores_outside() {
        let mut grid = TileGrid::from_rows(&["?B"]);
        grid.set(0, 0, codes::USED);
        grid.set(9, 9, codes::GROUND);
        assert_eq!(grid.get(0, 0), codes::USED);
        assert_eq!(grid.count(codes::GROUND), 0);
    }

    #[test]
    fn solidity_table() {
        for code in ['#', 'P', 'B', '?', 'M', 'F', 'U', 'D'] {
            assert!(is_solid(code), "{} should be solid", code);
        }
        for code in ['.', '=', 'W', 'S', 'g', 'c', 'f', 'y', 'm'] {
            assert!(!is_solid(code), "{} should not be solid", code);
        }
        assert!(is_one_way('='));
    }

    #[test]
    fn world_to_cell_conversion() {
        assert_eq!(TileGrid::cell_of(Vec2::new(33.0, 95.0)), (1, 2));
        assert_eq!(TileGrid::cell_of(Vec2::new(-1.0, 0.0)), (-1, 0));
        assert_eq!(TileGrid::feet_anchor(2, 3), Vec2::new(80.0, 128.0));
    }

    #[test]
    fn serializes_as_rows() {
        let grid = TileGrid::from_rows(&["#.", ".#"]);
        assert_eq!(serde_json::to_string(&grid).unwrap(), r##"["#.",".#"]"##);
    }
}
