//! Built-in level data.

use crate::level::loader::{parse_level, ParsedLevel};

/// Static per-level metadata plus the character grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelDef {
    pub name: &'static str,
    /// Background color id for the presentation layer.
    pub background: &'static str,
    /// Countdown in time units; 0 disables the timer.
    pub time_limit: u32,
    pub rows: &'static [&'static str],
    /// First grid row belonging to the sub-level area, if any.
    pub sub_level_row: Option<usize>,
}

impl LevelDef {
    pub fn parse(&self) -> ParsedLevel {
        parse_level(self.rows)
    }
}

pub static LEVELS: &[LevelDef] = &[
    LevelDef {
        name: "Meadow Run",
        background: "sky",
        time_limit: 300,
        rows: GRASSLAND_1,
        sub_level_row: None,
    },
    LevelDef {
        name: "Burrow Fields",
        background: "sky",
        time_limit: 300,
        rows: GRASSLAND_2,
        sub_level_row: Some(15),
    },
    LevelDef {
        name: "Cloud Bridge",
        background: "dusk",
        time_limit: 250,
        rows: SKY_1,
        sub_level_row: None,
    },
    LevelDef {
        name: "Thorn Keep",
        background: "castle",
        time_limit: 200,
        rows: CASTLE_1,
        sub_level_row: None,
    },
];

/// Look up a level, falling back to the first one for unknown indices.
pub fn level_def(index: usize) -> (usize, &'static LevelDef) {
    match LEVELS.get(index) {
        Some(def) => (index, def),
        None => {
            log::warn!("level index {} out of range, using level 0", index);
            (0, &LEVELS[0])
        }
    }
}

const GRASSLAND_1: &[&str] = &[
    "....................................................................................",
    "....................................................................................",
    "....................................................................................",
    "....................................................................................",
    "....................................................................................",
    "................?..................F................................................",
    "....................................................................................",
    "....................................................................................",
    "..................................cccc..............................................",
    "..........?...BMB?................====............B?BB.................#............",
    ".........................p............................................##............",
    "....................ccc..PP..........................................###............",
    "..S................g.....PP..............g.g....k.............k.....####.......f....",
    "##############################..#########################..#########################",
    "##############################..#########################..#########################",
];

const GRASSLAND_2: &[&str] = &[
    "........................................................................",
    "........................................................................",
    "........................................................................",
    "........................................................................",
    "........................................................................",
    "........................................................................",
    "........................................................................",
    "..........................................l.............................",
    "..............................l.........................................",
    "............?M......................====................................",
    "..................................................m.....................",
    "...............................................................PP.......",
    "..S.....y.................g......g..........................k..PP...f...",
    "####################D###########################......##################",
    "################################################......##################",
    "##########################..............................................",
    "#........................#..............................................",
    "#........................#..............................................",
    "#........................#..............................................",
    "#........................#..............................................",
    "#........................#..............................................",
    "#.........?F.............#..............................................",
    "#........................#..............................................",
    "#........................#..............................................",
    "#.....ccccccccccc........#..............................................",
    "#.....===========........#..............................................",
    "#........................#..............................................",
    "#..S.................W...#..............................................",
    "##########################..............................................",
    "##########################..............................................",
];

const SKY_1: &[&str] = &[
    "............................................................................",
    "............................................................................",
    "............................................................................",
    "............................................................................",
    "............................................................................",
    "............................................................................",
    "......................................l................l....................",
    "........................l...................................................",
    "............................................................................",
    "..................?F.......cccc...................====......................",
    "..........................=====...............................p.............",
    "...............................................m..............PP............",
    "..S..............k.............m......g...k...................PP........f...",
    "##########....########............############............##################",
    "##########....########............############............##################",
];

const CASTLE_1: &[&str] = &[
    "####################################",
    "#..................................#",
    "#..................................#",
    "#..................................#",
    "#..................................#",
    "#......M...........................#",
    "#..................................#",
    "#..................................#",
    "#..................................#",
    "#.....===..................===.....#",
    "#..................................#",
    "#..................................#",
    "#..S......................b........#",
    "####################################",
    "####################################",
];
