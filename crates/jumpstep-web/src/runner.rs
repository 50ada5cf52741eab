use jumpstep::{
    Action, EngineContext, FixedTimestep, Game, GameConfig, InputSnapshot, InputState, SoundEvent,
};

/// Map a DOM `keyCode` to an engine action.
pub fn action_for_key(key_code: u32) -> Option<Action> {
    match key_code {
        37 | 65 => Some(Action::Left),
        39 | 68 => Some(Action::Right),
        38 | 87 => Some(Action::Up),
        40 | 83 => Some(Action::Down),
        32 | 90 => Some(Action::Jump),
        16 | 88 => Some(Action::Run),
        67 => Some(Action::Action),
        13 => Some(Action::Confirm),
        27 => Some(Action::Cancel),
        _ => None,
    }
}

/// Generic game runner that wires a `Game` to the host loop.
///
/// The host reports key state as it changes and calls `tick` once per
/// animation frame; the runner turns that into whole fixed steps, each
/// fed a fresh input snapshot. wasm-bindgen cannot export generic structs,
/// so each game keeps one in a `thread_local!` (see `export_game!`).
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputState,
    /// Actions the host currently reports as held.
    held: InputSnapshot,
    /// Actions pressed since the last simulated step. A tap that starts and
    /// ends between two steps still reaches the game once.
    latched: InputSnapshot,
    timestep: FixedTimestep,
    config: GameConfig,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self {
            game,
            ctx: EngineContext::with_max_sounds(config.max_sounds),
            input: InputState::new(),
            held: InputSnapshot::new(),
            latched: InputSnapshot::new(),
            timestep: FixedTimestep::new(config.fixed_dt),
            config,
            initialized: false,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.timestep = FixedTimestep::new(self.config.fixed_dt);
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Register the callback receiving every sound cue as it is emitted.
    pub fn set_sound_sink(&mut self, sink: impl FnMut(SoundEvent) + 'static) {
        self.ctx.set_sound_sink(sink);
    }

    pub fn action_down(&mut self, action: Action) {
        self.held.press(action);
        self.latched.press(action);
    }

    pub fn action_up(&mut self, action: Action) {
        self.held.release(action);
    }

    pub fn key_down(&mut self, key_code: u32) {
        if let Some(action) = action_for_key(key_code) {
            self.action_down(action);
        }
    }

    pub fn key_up(&mut self, key_code: u32) {
        if let Some(action) = action_for_key(key_code) {
            self.action_up(action);
        }
    }

    /// Run however many fixed steps `dt` seconds of host time cover.
    /// Returns the number of steps run.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.initialized {
            return 0;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            let snapshot = if step == 0 {
                self.held.merge(self.latched)
            } else {
                self.held
            };
            self.input.advance(snapshot);
            self.game.update(&mut self.ctx, &self.input);
        }
        if steps > 0 {
            self.latched = InputSnapshot::new();
        }
        steps
    }

    /// Sound ids emitted during the last `tick`.
    pub fn sounds(&self) -> &[SoundEvent] {
        &self.ctx.sounds
    }

    pub fn sounds_json(&self) -> String {
        serde_json::to_string(&self.ctx.sounds).unwrap_or_else(|_| "[]".to_string())
    }

    /// Render snapshot for the presentation layer; `null` if it could not
    /// be produced.
    pub fn snapshot_json(&self) -> String {
        match self.game.snapshot_json() {
            Ok(json) => json,
            Err(err) => {
                log::warn!("snapshot failed: {}", err);
                "null".to_string()
            }
        }
    }

    pub fn save_json(&self, timestamp: u64) -> Option<String> {
        match self.game.save_json(timestamp)? {
            Ok(json) => Some(json),
            Err(err) => {
                log::warn!("save failed: {}", err);
                None
            }
        }
    }

    /// Restore a save. On a malformed record the game keeps its state.
    pub fn load_save(&mut self, json: &str) -> bool {
        match self.game.restore_json(json) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("ignoring malformed save: {}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the input seen by every step.
    #[derive(Default)]
    struct Recorder {
        steps: Vec<InputSnapshot>,
        jumps: u32,
    }

    impl Game for Recorder {
        fn init(&mut self, _ctx: &mut EngineContext) {}

        fn update(&mut self, ctx: &mut EngineContext, input: &InputState) {
            self.steps.push(input.snapshot());
            if input.pressed(Action::Jump) {
                self.jumps += 1;
                ctx.emit_sound(SoundEvent::JUMP);
            }
        }

        fn snapshot_json(&self) -> Result<String, serde_json::Error> {
            serde_json::to_string(&self.jumps)
        }
    }

    fn runner() -> GameRunner<Recorder> {
        let mut runner = GameRunner::new(Recorder::default());
        runner.init();
        runner
    }

    #[test]
    fn nothing_runs_before_init() {
        let mut runner = GameRunner::new(Recorder::default());
        assert_eq!(runner.tick(1.0), 0);
        assert!(runner.game().steps.is_empty());
    }

    #[test]
    fn frame_time_becomes_whole_steps() {
        let mut runner = runner();
        assert_eq!(runner.tick(0.008), 0);
        assert_eq!(runner.tick(0.010), 1);
        assert_eq!(runner.tick(2.0 / 60.0 + 0.001), 2);
        assert_eq!(runner.game().steps.len(), 3);
    }

    #[test]
    fn short_tap_between_steps_still_lands() {
        let mut runner = runner();
        runner.key_down(32);
        runner.key_up(32);
        runner.tick(1.0 / 60.0);
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.game().jumps, 1);
        assert!(runner.game().steps[0].contains(Action::Jump));
        assert!(!runner.game().steps[1].contains(Action::Jump));
    }

    #[test]
    fn held_key_presses_once() {
        let mut runner = runner();
        runner.key_down(90);
        for _ in 0..5 {
            runner.tick(1.0 / 60.0);
        }
        assert_eq!(runner.game().jumps, 1);
        assert!(runner.game().steps.iter().all(|s| s.contains(Action::Jump)));
    }

    #[test]
    fn sounds_are_per_tick() {
        let mut runner = runner();
        runner.key_down(32);
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.sounds_json(), r#"["jump"]"#);
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.sounds_json(), "[]");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(action_for_key(1000), None);
        assert_eq!(action_for_key(13), Some(Action::Confirm));
        let mut runner = runner();
        assert!(runner.load_save("{}"));
        assert_eq!(runner.save_json(5), None);
    }
}
