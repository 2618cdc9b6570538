//! `#[wasm_bindgen]` exports for Mari Arena.
//!
//! JS owns the animation-frame loop, the DOM and the coordinator socket. It
//! calls `arena_frame` on every frame while it returns `true`, forwards
//! container events and socket messages, and pulls render output, the
//! overlay and outgoing messages back as JSON.

use std::cell::RefCell;

use mari_arena::{ArenaConfig, ArenaScreen, Mode};
use mari_engine::{EngineConfig, InputEvent, InputKind, InputPayload};
use wasm_bindgen::prelude::*;

thread_local! {
    static SCREEN: RefCell<Option<ArenaScreen>> = const { RefCell::new(None) };
}

fn with_screen<R>(f: impl FnOnce(&mut ArenaScreen) -> R) -> Result<R, JsValue> {
    SCREEN.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let screen = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("arena not initialized, call arena_init() first"))?;
        Ok(f(screen))
    })
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Translate a container handler call into an engine input.
/// Keyboard handlers carry `code`, everything else the pointer position.
pub fn input_event(handler: &str, x: f32, y: f32, code: Option<String>) -> Option<InputEvent> {
    let kind = InputKind::from_handler_name(handler)?;
    let payload = if kind.is_keyboard() {
        InputPayload::Key {
            code: code.unwrap_or_default(),
        }
    } else {
        InputPayload::Pointer { x, y, button: 0 }
    };
    Some(InputEvent::new(kind, payload))
}

/// Create the screen. `config_json` is an `ArenaConfig` (empty for
/// defaults). Passing a `user_id` selects multiplayer.
#[wasm_bindgen]
pub fn arena_init(
    config_json: &str,
    user_id: Option<String>,
    game_type_id: Option<String>,
) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        ArenaConfig::default()
    } else {
        ArenaConfig::from_json(config_json).map_err(to_js)?
    };
    let mode = match user_id {
        Some(user_id) => Mode::Multiplayer {
            user_id,
            game_type_id: game_type_id.unwrap_or_default(),
        },
        None => Mode::Solo,
    };
    let screen = ArenaScreen::new(config, EngineConfig::default(), mode);
    SCREEN.with(|cell| *cell.borrow_mut() = Some(screen));
    log::info!("mari-arena: initialized");
    Ok(())
}

/// One animation frame. Returns whether JS should request another.
#[wasm_bindgen]
pub fn arena_frame(timestamp: f64) -> Result<bool, JsValue> {
    with_screen(|s| s.frame(timestamp))
}

/// Forward a container event (`onClick`, `onKeyPress`, ...). Unknown
/// handler names are dropped.
#[wasm_bindgen]
pub fn arena_input(handler: &str, x: f32, y: f32, code: Option<String>) -> Result<(), JsValue> {
    match input_event(handler, x, y, code) {
        Some(event) => with_screen(|s| s.input(event)),
        None => {
            log::debug!("mari-arena: ignoring {}", handler);
            Ok(())
        }
    }
}

/// The solo start button.
#[wasm_bindgen]
pub fn arena_begin() -> Result<(), JsValue> {
    with_screen(|s| s.begin())
}

#[wasm_bindgen]
pub fn arena_socket_message(json: &str) -> Result<(), JsValue> {
    with_screen(|s| s.handle_message(json))?.map_err(to_js)
}

/// Outgoing coordinator messages as a JSON array.
#[wasm_bindgen]
pub fn arena_take_outbound() -> Result<String, JsValue> {
    let outbound = with_screen(|s| s.take_outbound())?;
    serde_json::to_string(&outbound).map_err(to_js)
}

/// Pending toast texts as a JSON array.
#[wasm_bindgen]
pub fn arena_take_toasts() -> Result<String, JsValue> {
    let toasts = with_screen(|s| s.take_toasts())?;
    serde_json::to_string(&toasts).map_err(to_js)
}

/// The visual tree as a JSON array of positioned elements.
#[wasm_bindgen]
pub fn arena_render() -> Result<String, JsValue> {
    let visuals = with_screen(|s| s.render())?;
    serde_json::to_string(&visuals).map_err(to_js)
}

#[wasm_bindgen]
pub fn arena_overlay() -> Result<String, JsValue> {
    let overlay = with_screen(|s| s.overlay())?;
    serde_json::to_string(&overlay).map_err(to_js)
}

/// `true` once after the game starts: JS should focus the container so
/// key presses reach it.
#[wasm_bindgen]
pub fn arena_take_focus() -> Result<bool, JsValue> {
    with_screen(|s| s.take_focus_request())
}
