/// Browser wiring: fetch transport, window navigator and event bindings
use crate::bridge::{Bridge, Navigator};
use crate::config::BridgeConfig;
use crate::entry::Entry;
use crate::error::{BridgeError, Result, js_error_text};
use crate::reporter::Transport;
use crate::storage::{BrowserSessionStore, MemoryStore, SessionStore};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, EventTarget, Headers, RequestInit, RequestMode, VisibilityState, Window,
};

/// `fetch` in `no-cors` mode; the opaque response is never inspected.
pub struct FetchTransport {
    window: Window,
}

impl FetchTransport {
    pub fn new(window: Window) -> Self {
        FetchTransport { window }
    }
}

impl Transport for FetchTransport {
    fn send(&self, endpoint: &str, body: String) -> Result<()> {
        let headers = Headers::new().map_err(|e| BridgeError::Transport(js_error_text(&e)))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| BridgeError::Transport(js_error_text(&e)))?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::NoCors);
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let promise = self.window.fetch_with_str_and_init(endpoint, &init);

        // detached: only a network-level rejection is reported, never the response
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::error!("logEvent error: {}", js_error_text(&e));
            }
        });
        Ok(())
    }
}

/// `window.open(url, "_blank")`
pub struct WindowNavigator {
    window: Window,
}

impl WindowNavigator {
    pub fn new(window: Window) -> Self {
        WindowNavigator { window }
    }
}

impl Navigator for WindowNavigator {
    fn open(&self, url: &str) -> Result<()> {
        self.window
            .open_with_url_and_target(url, "_blank")
            .map(|_| ())
            .map_err(|e| BridgeError::Navigation(js_error_text(&e)))
    }
}

type PageBridge = Bridge<Box<dyn SessionStore>, FetchTransport, WindowNavigator>;

impl SessionStore for Box<dyn SessionStore> {
    fn get(&self, key: &str) -> Option<String> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().set(key, value)
    }
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Classify `location.href`, degrading to `unknown` if it can't be read.
fn page_entry(window: &Window) -> Entry {
    match window.location().href() {
        Ok(href) => Entry::from_url(&href),
        Err(e) => {
            log::debug!("location.href unavailable: {}", js_error_text(&e));
            Entry::default()
        }
    }
}

fn session_store(window: &Window) -> Box<dyn SessionStore> {
    match BrowserSessionStore::from_window(window) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{}; revisit clock kept in memory", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Build the bridge for the current page and bind its three triggers.
pub fn install(config: BridgeConfig) -> Result<()> {
    let config = config.validate()?;
    let window = web_sys::window().ok_or(BridgeError::MissingDom("window"))?;
    let document = window.document().ok_or(BridgeError::MissingDom("document"))?;

    let entry = page_entry(&window);
    log::info!(
        "Entry bridge starting: entry={} key={:?}",
        entry.entry_type.as_str(),
        entry.key_id
    );

    let bridge: Rc<PageBridge> = Rc::new(Bridge::new(
        &config,
        entry,
        session_store(&window),
        FetchTransport::new(window.clone()),
        WindowNavigator::new(window.clone()),
    ));

    if document.ready_state() == "loading" {
        let ready_listener = {
            let bridge = bridge.clone();
            let document = document.clone();
            let button_id = config.button_id.clone();
            Closure::once(move || on_ready(&bridge, &document, &button_id))
        };
        listen(&document, "DOMContentLoaded", ready_listener.as_ref())?;
        ready_listener.forget();
    } else {
        on_ready(&bridge, &document, &config.button_id);
    }

    Ok(())
}

fn listen(target: &EventTarget, event: &'static str, listener: &JsValue) -> Result<()> {
    target
        .add_event_listener_with_callback(event, listener.unchecked_ref())
        .map_err(|e| BridgeError::Binding(event, js_error_text(&e)))
}

fn on_ready(bridge: &Rc<PageBridge>, document: &Document, button_id: &str) {
    bridge.on_load(now_ms());

    if let Err(e) = bind_primary_action(bridge, document, button_id) {
        log::warn!("Primary control not bound: {}", e);
    }
    if let Err(e) = bind_visibility(bridge, document) {
        log::warn!("Visibility tracking not bound: {}", e);
    }
}

fn bind_primary_action(bridge: &Rc<PageBridge>, document: &Document, button_id: &str) -> Result<()> {
    let button = document
        .get_element_by_id(button_id)
        .ok_or(BridgeError::MissingDom("primary control"))?;

    let bridge = bridge.clone();
    let on_click = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_event: web_sys::MouseEvent| {
        bridge.on_primary_action();
    });
    listen(&button, "click", on_click.as_ref())?;
    on_click.forget();
    Ok(())
}

fn bind_visibility(bridge: &Rc<PageBridge>, document: &Document) -> Result<()> {
    let bridge = bridge.clone();
    let page = document.clone();
    let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        let visible = page.visibility_state() == VisibilityState::Visible;
        bridge.on_visibility_change(visible, now_ms());
    });
    listen(document, "visibilitychange", on_change.as_ref())?;
    on_change.forget();
    Ok(())
}
