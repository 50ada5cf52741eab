use serde::Deserialize;

use crate::api::types::SoundEvent;
use crate::input::state::InputState;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60). One tick per step.
    pub fixed_dt: f32,
    /// Visible width in pixels.
    pub viewport_width: f32,
    /// Visible height in pixels.
    pub viewport_height: f32,
    /// Lives granted on a new game and after game over (default: 3).
    pub starting_lives: u32,
    /// Maximum number of sound events kept per tick (default: 32).
    pub max_sounds: usize,
    /// Seed for the title demo pilot and cosmetic jitter.
    pub demo_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            viewport_width: 800.0,
            viewport_height: 480.0,
            starting_lives: 3,
            max_sounds: 32,
            demo_seed: 42,
        }
    }
}

impl GameConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state.
    fn init(&mut self, ctx: &mut EngineContext);

    /// Advance exactly one fixed simulation step.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputState);

    /// Read-only view of the simulation for the presentation layer.
    fn snapshot_json(&self) -> Result<String, serde_json::Error>;

    /// Produce a save record. Games without progression return `None`.
    fn save_json(&self, _timestamp: u64) -> Option<Result<String, serde_json::Error>> {
        None
    }

    /// Restore progression from a save record.
    fn restore_json(&mut self, _json: &str) -> Result<(), serde_json::Error> {
        Ok(())
    }
}

/// Callback receiving every emitted sound cue.
pub type SoundSink = Box<dyn FnMut(SoundEvent)>;

/// Per-tick outputs, passed to Game::init and Game::update.
pub struct EngineContext {
    /// Sound cues emitted since the last `clear_frame_data`.
    pub sounds: Vec<SoundEvent>,
    /// Suppresses emission entirely (attract mode).
    pub muted: bool,
    max_sounds: usize,
    sink: Option<SoundSink>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_max_sounds(GameConfig::default().max_sounds)
    }

    pub fn with_max_sounds(max_sounds: usize) -> Self {
        Self {
            sounds: Vec::with_capacity(max_sounds),
            muted: false,
            max_sounds,
            sink: None,
        }
    }

    /// Register the callback that receives sound cues as they are emitted.
    pub fn set_sound_sink(&mut self, sink: impl FnMut(SoundEvent) + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Emit a fire-and-forget sound cue.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        if self.muted {
            return;
        }
        if self.sounds.len() < self.max_sounds {
            self.sounds.push(event);
        }
        if let Some(sink) = self.sink.as_mut() {
            sink(event);
        }
    }

    /// Clear per-frame transient data.
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn config_from_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "starting_lives": 5 }"#).unwrap();
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.viewport_width, 800.0);
    }

    #[test]
    fn sink_receives_emitted_sounds() {
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut ctx = EngineContext::new();
        let log = heard.clone();
        ctx.set_sound_sink(move |ev| log.borrow_mut().push(ev.id()));

        ctx.emit_sound(SoundEvent::JUMP);
        ctx.emit_sound(SoundEvent::COIN);

        assert_eq!(*heard.borrow(), vec!["jump", "coin"]);
        assert_eq!(ctx.sounds.len(), 2);
    }

    #[test]
    fn muted_context_emits_nothing() {
        let mut ctx = EngineContext::new();
        ctx.muted = true;
        ctx.emit_sound(SoundEvent::STOMP);
        assert!(ctx.sounds.is_empty());
    }

    #[test]
    fn sound_list_is_capped() {
        let mut ctx = EngineContext::with_max_sounds(2);
        for _ in 0..5 {
            ctx.emit_sound(SoundEvent::COIN);
        }
        assert_eq!(ctx.sounds.len(), 2);
        ctx.clear_frame_data();
        assert!(ctx.sounds.is_empty());
    }
}
