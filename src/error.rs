/// Error type shared by the bridge modules
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("could not listen for {0}: {1}")]
    Binding(&'static str, String),

    #[error("{0} is not available")]
    MissingDom(&'static str),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Render a thrown JS value as text for logging.
pub fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
