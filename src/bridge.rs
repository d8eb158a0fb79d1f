/// Page lifecycle and button bindings, with the revisit debounce
use crate::config::BridgeConfig;
use crate::entry::Entry;
use crate::error::Result;
use crate::event::EventKind;
use crate::reporter::{Reporter, Transport};
use crate::storage::{SessionStore, read_last_log_time, write_last_log_time};

/// Opens the external board in a new browsing context
pub trait Navigator {
    fn open(&self, url: &str) -> Result<()>;
}

/// Owns the per-tab revisit clock and decides which triggers get logged.
///
/// The clock lives in the injected store so it survives reloads within the
/// same tab. `page_view` and `revisit` share it: a page view suppresses a
/// revisit that arrives inside the debounce window.
pub struct Bridge<S: SessionStore, T: Transport, N: Navigator> {
    board_url: String,
    revisit_debounce_ms: u64,
    reporter: Reporter<T>,
    store: S,
    navigator: N,
}

impl<S: SessionStore, T: Transport, N: Navigator> Bridge<S, T, N> {
    pub fn new(config: &BridgeConfig, entry: Entry, store: S, transport: T, navigator: N) -> Self {
        Bridge {
            board_url: config.board_url.clone(),
            revisit_debounce_ms: config.revisit_debounce_ms,
            reporter: Reporter::new(entry, config.endpoint_url.clone(), transport),
            store,
            navigator,
        }
    }

    pub fn entry(&self) -> &Entry {
        self.reporter.entry()
    }

    pub fn reporter(&self) -> &Reporter<T> {
        &self.reporter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn last_log_time(&self) -> Option<u64> {
        read_last_log_time(&self.store)
    }

    /// Document structure is ready.
    pub fn on_load(&self, now_ms: u64) {
        if self.entry().is_test() {
            return;
        }
        let _ = self.reporter.log_event(EventKind::PageView);
        self.stamp(now_ms);
    }

    /// Primary control activated. Navigation happens whatever logging does.
    pub fn on_primary_action(&self) {
        if !self.entry().is_test() {
            let _ = self.reporter.log_event(EventKind::PadletOpen);
        }
        if let Err(e) = self.navigator.open(&self.board_url) {
            log::error!("Failed to open board: {}", e);
        }
    }

    /// Page visibility changed. Only hidden -> visible matters.
    pub fn on_visibility_change(&self, visible: bool, now_ms: u64) {
        if !visible {
            return;
        }

        let due = match self.last_log_time() {
            None => true,
            // a clock that went backwards never satisfies the window
            Some(last) => now_ms >= last && now_ms - last >= self.revisit_debounce_ms,
        };
        if !due {
            log::debug!("Revisit within {} ms window, not logged", self.revisit_debounce_ms);
            return;
        }

        if !self.entry().is_test() {
            let _ = self.reporter.log_event(EventKind::Revisit);
        }
        // advances in test mode too
        self.stamp(now_ms);
    }

    fn stamp(&self, now_ms: u64) {
        if let Err(e) = write_last_log_time(&self.store, now_ms) {
            log::warn!("Could not record last log time: {}", e);
        }
    }
}
