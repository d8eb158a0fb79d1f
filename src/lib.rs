/// Entry Bridge - QR/NFC landing page tracker
/// Built with Rust + WASM

pub mod bridge;
pub mod config;
pub mod dom;
pub mod entry;
pub mod error;
pub mod event;
pub mod reporter;
pub mod storage;

use std::cell::Cell;
use wasm_bindgen::prelude::*;

thread_local! {
    static STARTED: Cell<bool> = const { Cell::new(false) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Classify a query string for JavaScript callers
#[wasm_bindgen]
pub fn classify_entry(query: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&entry::Entry::from_query(query)).map_err(JsValue::from)
}

// Start the bridge with the built-in deployment constants
#[wasm_bindgen]
pub fn start_bridge() -> Result<(), JsValue> {
    start(config::BridgeConfig::default())
}

// Start the bridge with page-supplied constants
#[wasm_bindgen]
pub fn start_bridge_with(
    board_url: &str,
    endpoint_url: Option<String>,
    revisit_debounce_ms: u32,
) -> Result<(), JsValue> {
    start(config::BridgeConfig::new(
        board_url,
        endpoint_url.as_deref(),
        u64::from(revisit_debounce_ms),
    ))
}

fn start(config: config::BridgeConfig) -> Result<(), JsValue> {
    if STARTED.with(|started| started.replace(true)) {
        log::warn!("Entry bridge already started");
        return Ok(());
    }
    dom::install(config).map_err(|e| {
        STARTED.with(|started| started.set(false));
        JsValue::from_str(&e.to_string())
    })
}
