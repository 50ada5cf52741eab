use wasm_bindgen::prelude::*;

pub mod runner;

pub use runner::{action_for_key, GameRunner};

/// Console warning for exports called before `game_init`.
pub fn not_initialized_message(game_name: &str) -> String {
    format!("{}: not initialized, call game_init() first", game_name)
}

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - a `with_runner()` helper that warns on the browser console and
///   returns `None` before init
/// - the exports: init, tick, key/action input, sound callback, render
///   snapshot, sounds, save and load
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// jumpstep_web::export_game!(MyGame, "my-game");
/// ```
///
/// `$game_type` must implement `jumpstep::Game` and provide `new()`.
/// The sound callback runs inside `game_tick` and must not call back into
/// the game.
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                match borrow.as_mut() {
                    Some(runner) => Some(f(runner)),
                    None => {
                        // no logger exists before game_init
                        web_sys::console::warn_1(&JsValue::from_str(
                            &$crate::not_initialized_message($game_name),
                        ));
                        None
                    }
                }
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::new();
            let runner = $crate::GameRunner::new(game);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        /// Advance by `dt` seconds of host time. Returns the steps run.
        #[wasm_bindgen]
        pub fn game_tick(dt: f32) -> u32 {
            with_runner(|r| r.tick(dt)).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.key_down(key_code));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.key_up(key_code));
        }

        /// Touch buttons report actions by name ("left", "jump", ...).
        #[wasm_bindgen]
        pub fn game_action_down(name: &str) {
            match jumpstep::Action::from_name(name) {
                Some(action) => {
                    with_runner(|r| r.action_down(action));
                }
                None => log::warn!("{}: unknown action '{}'", $game_name, name),
            }
        }

        #[wasm_bindgen]
        pub fn game_action_up(name: &str) {
            if let Some(action) = jumpstep::Action::from_name(name) {
                with_runner(|r| r.action_up(action));
            }
        }

        #[wasm_bindgen]
        pub fn game_set_sound_callback(callback: js_sys::Function) {
            with_runner(|r| {
                r.set_sound_sink(move |event| {
                    let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(event.id()));
                })
            });
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_snapshot() -> String {
            with_runner(|r| r.snapshot_json()).unwrap_or_else(|| "null".to_string())
        }

        #[wasm_bindgen]
        pub fn get_sounds() -> String {
            with_runner(|r| r.sounds_json()).unwrap_or_else(|| "[]".to_string())
        }

        #[wasm_bindgen]
        pub fn get_viewport_width() -> f32 {
            with_runner(|r| r.config().viewport_width).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_viewport_height() -> f32 {
            with_runner(|r| r.config().viewport_height).unwrap_or(0.0)
        }

        // ---- Persistence ----

        /// Save record as JSON, or undefined when there is nothing to save.
        #[wasm_bindgen]
        pub fn game_save(timestamp: f64) -> Option<String> {
            with_runner(|r| r.save_json(timestamp.max(0.0) as u64)).flatten()
        }

        /// Restore a save record. Returns false and keeps the current state
        /// if the record is malformed.
        #[wasm_bindgen]
        pub fn game_load(json: &str) -> bool {
            with_runner(|r| r.load_save(json)).unwrap_or(false)
        }
    };
}

export_game!(jumpstep::Platformer, "jumpstep");
