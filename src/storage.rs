/// Session-scoped key/value storage for the revisit clock
use crate::error::{BridgeError, Result, js_error_text};
use std::cell::RefCell;
use std::collections::HashMap;

/// Key holding the last log time, as string-encoded epoch milliseconds
pub const LAST_LOG_TIME_KEY: &str = "bridge_last_log_time";

/// Per-tab string store (`sessionStorage` in the browser)
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Read the last log time. Absent or unparsable means "never"; `0` is a real stamp.
pub fn read_last_log_time(store: &dyn SessionStore) -> Option<u64> {
    store
        .get(LAST_LOG_TIME_KEY)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
}

pub fn write_last_log_time(store: &dyn SessionStore, now_ms: u64) -> Result<()> {
    store.set(LAST_LOG_TIME_KEY, &now_ms.to_string())
}

/// In-memory stand-in used by tests and by pages without `sessionStorage`
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.sessionStorage`
pub struct BrowserSessionStore {
    storage: web_sys::Storage,
}

impl BrowserSessionStore {
    pub fn from_window(window: &web_sys::Window) -> Result<Self> {
        let storage = window
            .session_storage()
            .map_err(|e| BridgeError::Storage(js_error_text(&e)))?
            .ok_or(BridgeError::MissingDom("sessionStorage"))?;
        Ok(BrowserSessionStore { storage })
    }
}

impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("sessionStorage read of {} failed: {}", key, js_error_text(&e));
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| BridgeError::Storage(js_error_text(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_means_never() {
        let store = MemoryStore::new();

        assert_eq!(read_last_log_time(&store), None);
    }

    #[test]
    fn test_roundtrip_as_decimal_string() {
        let store = MemoryStore::new();
        write_last_log_time(&store, 1_698_508_200_000).unwrap();

        assert_eq!(store.get(LAST_LOG_TIME_KEY).as_deref(), Some("1698508200000"));
        assert_eq!(read_last_log_time(&store), Some(1_698_508_200_000));
    }

    #[test]
    fn test_garbage_means_never() {
        let store = MemoryStore::new();

        for raw in ["", "abc", "-5", "NaN"] {
            store.set(LAST_LOG_TIME_KEY, raw).unwrap();
            assert_eq!(read_last_log_time(&store), None, "value {:?}", raw);
        }
    }

    #[test]
    fn test_zero_is_a_stamp() {
        let store = MemoryStore::new();
        write_last_log_time(&store, 0).unwrap();

        assert_eq!(read_last_log_time(&store), Some(0));
    }

    #[test]
    fn test_other_keys_untouched() {
        let store = MemoryStore::new();
        store.set("other", "1").unwrap();
        write_last_log_time(&store, 42).unwrap();

        assert_eq!(store.get("other").as_deref(), Some("1"));
    }
}
