/// Deployment-time configuration for the entry bridge
use crate::error::{BridgeError, Result};
use url::Url;

/// Collaborative board opened by the primary control
pub const DEFAULT_BOARD_URL: &str = "https://padlet.com/zhuh49092/padlet-8gnjzav71knt6wtr";

/// Apps Script web app that receives the event log
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbzS2FKCVSMblSMHGDmpdfWrnVwrPz1VoxberjLlKn6IKX_BLcECt3UIa3wgWC8LXI60Vg/exec";

/// Minimum gap between two logged visits (10 seconds)
pub const DEFAULT_REVISIT_DEBOUNCE_MS: u64 = 10_000;

/// Id of the button that opens the board
pub const DEFAULT_BUTTON_ID: &str = "tapButton";

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub board_url: String,
    /// `None` while the logging backend is not deployed yet
    pub endpoint_url: Option<String>,
    pub revisit_debounce_ms: u64,
    pub button_id: String,
}

impl BridgeConfig {
    pub fn new(board_url: &str, endpoint_url: Option<&str>, revisit_debounce_ms: u64) -> Self {
        BridgeConfig {
            board_url: board_url.to_string(),
            endpoint_url: endpoint_url.map(str::to_string),
            revisit_debounce_ms,
            button_id: DEFAULT_BUTTON_ID.to_string(),
        }
    }

    pub fn with_button_id(mut self, button_id: &str) -> Self {
        self.button_id = button_id.to_string();
        self
    }

    /// Check the board URL. A blank or malformed endpoint becomes "not
    /// configured" so logging problems never stop the board from opening.
    pub fn validate(mut self) -> Result<Self> {
        Url::parse(&self.board_url)
            .map_err(|e| BridgeError::InvalidConfig(format!("board url {:?}: {}", self.board_url, e)))?;

        self.endpoint_url = self
            .endpoint_url
            .map(|endpoint| endpoint.trim().to_string())
            .filter(|endpoint| !endpoint.is_empty())
            .filter(|endpoint| match Url::parse(endpoint) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("Ignoring endpoint url {:?}: {}", endpoint, e);
                    false
                }
            });

        if self.button_id.is_empty() {
            return Err(BridgeError::InvalidConfig("button id is empty".to_string()));
        }

        Ok(self)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig::new(
            DEFAULT_BOARD_URL,
            Some(DEFAULT_ENDPOINT_URL),
            DEFAULT_REVISIT_DEBOUNCE_MS,
        )
    }
}
