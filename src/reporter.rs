/// Best-effort event reporting to the logging endpoint
use crate::entry::Entry;
use crate::error::Result;
use crate::event::{EventKind, EventPayload};

/// One-way sink for serialized payloads.
///
/// `send` only reports whether the request could be started; the response
/// is never read.
pub trait Transport {
    fn send(&self, endpoint: &str, body: String) -> Result<()>;
}

/// What happened to a single `log_event` call. Callers are expected to
/// discard it; it exists so the non-guarantee is visible in the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "discard explicitly with `let _ =`"]
pub enum Delivery {
    /// Test-mode page view, nothing recorded
    Suppressed,
    /// Logging backend not configured
    NoEndpoint,
    /// Handed to the transport, outcome unknown
    Dispatched,
    /// Could not even be handed to the transport
    Failed,
}

pub struct Reporter<T: Transport> {
    entry: Entry,
    endpoint_url: Option<String>,
    transport: T,
}

impl<T: Transport> Reporter<T> {
    pub fn new(entry: Entry, endpoint_url: Option<String>, transport: T) -> Self {
        Reporter {
            entry,
            endpoint_url,
            transport,
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `kind` with the cached entry provenance. Never fails to the caller.
    pub fn log_event(&self, kind: EventKind) -> Delivery {
        if self.entry.is_test() {
            return Delivery::Suppressed;
        }

        let Some(endpoint) = self.endpoint_url.as_deref() else {
            log::warn!("Logging endpoint is empty, skip log: {}", kind.as_str());
            return Delivery::NoEndpoint;
        };

        match self.dispatch(endpoint, kind) {
            Ok(()) => {
                log::debug!("Dispatched {} event", kind.as_str());
                Delivery::Dispatched
            }
            Err(e) => {
                log::error!("logEvent error ({}): {}", kind.as_str(), e);
                Delivery::Failed
            }
        }
    }

    fn dispatch(&self, endpoint: &str, kind: EventKind) -> Result<()> {
        let body = EventPayload::new(kind, &self.entry).to_json()?;
        self.transport.send(endpoint, body)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Transport;
    use crate::error::{BridgeError, Result};
    use std::cell::{Cell, RefCell};

    /// Records every request; optionally fails them all.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: RefCell<Vec<(String, String)>>,
        pub fail: Cell<bool>,
    }

    impl RecordingTransport {
        pub fn failing() -> Self {
            let transport = RecordingTransport::default();
            transport.fail.set(true);
            transport
        }

        pub fn event_types(&self) -> Vec<String> {
            self.sent
                .borrow()
                .iter()
                .map(|(_, body)| {
                    let value: serde_json::Value = serde_json::from_str(body).unwrap();
                    value["event_type"].as_str().unwrap().to_string()
                })
                .collect()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, endpoint: &str, body: String) -> Result<()> {
            if self.fail.get() {
                return Err(BridgeError::Transport("network unreachable".to_string()));
            }
            self.sent.borrow_mut().push((endpoint.to_string(), body));
            Ok(())
        }
    }
}
