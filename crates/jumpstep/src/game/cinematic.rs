use serde::Serialize;

use crate::input::state::{Action, InputState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub text: &'static str,
    pub ticks: u32,
}

static INTRO: &[Scene] = &[
    Scene { text: "The meadow kingdom was quiet.", ticks: 180 },
    Scene { text: "Until thorns swallowed the old keep.", ticks: 180 },
    Scene { text: "Someone has to climb it.", ticks: 150 },
];

static REGIONS: &[&[Scene]] = &[
    &[
        Scene { text: "The Grasslands", ticks: 150 },
        Scene { text: "Something is digging under the fields.", ticks: 150 },
    ],
    &[Scene { text: "The Sky Road", ticks: 150 }],
    &[
        Scene { text: "Thorn Keep", ticks: 150 },
        Scene { text: "The ground shakes with every step.", ticks: 150 },
    ],
];

/// A timed slideshow of text scenes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cinematic {
    pub scenes: &'static [Scene],
    pub index: usize,
    pub timer: u32,
    /// Level to start once finished; `None` continues to character select.
    pub then_level: Option<usize>,
}

impl Cinematic {
    fn new(scenes: &'static [Scene], then_level: Option<usize>) -> Self {
        Self {
            scenes,
            index: 0,
            timer: scenes.first().map_or(0, |s| s.ticks),
            then_level,
        }
    }

    pub fn intro() -> Self {
        Self::new(INTRO, None)
    }

    /// Entry cinematic for a map region, followed by `level`.
    pub fn for_region(region: usize, level: usize) -> Self {
        let scenes = REGIONS.get(region).copied().unwrap_or(&[]);
        Self::new(scenes, Some(level))
    }

    pub fn current(&self) -> Option<&Scene> {
        self.scenes.get(self.index)
    }

    /// Advance one tick. Confirm skips the current scene. Returns true once
    /// every scene has played.
    pub fn update(&mut self, input: &InputState) -> bool {
        if self.current().is_none() {
            return true;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 || input.pressed(Action::Confirm) {
            self.index += 1;
            self.timer = self.current().map_or(0, |s| s.ticks);
        }
        self.current().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::state::InputSnapshot;

    #[test]
    fn scenes_run_out_on_their_own() {
        let mut cinematic = Cinematic::intro();
        let idle = InputState::new();
        let total: u32 = INTRO.iter().map(|s| s.ticks).sum();
        for _ in 0..total - 1 {
            assert!(!cinematic.update(&idle));
        }
        assert!(cinematic.update(&idle));
    }

    #[test]
    fn confirm_skips_a_scene() {
        let mut cinematic = Cinematic::for_region(0, 0);
        let mut input = InputState::new();
        input.advance(InputSnapshot::new().with(Action::Confirm));
        assert!(!cinematic.update(&input));
        assert_eq!(cinematic.index, 1);
        input.advance(InputSnapshot::new());
        input.advance(InputSnapshot::new().with(Action::Confirm));
        assert!(cinematic.update(&input));
        assert_eq!(cinematic.then_level, Some(0));
    }

    #[test]
    fn unknown_region_is_empty() {
        let mut cinematic = Cinematic::for_region(99, 3);
        assert!(cinematic.update(&InputState::new()));
    }
}
