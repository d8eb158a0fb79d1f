/// Logged events and their wire payload
use crate::entry::{Entry, EntryType};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PageView,
    Revisit,
    PadletOpen,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PageView => "page_view",
            EventKind::Revisit => "revisit",
            EventKind::PadletOpen => "padlet_open",
        }
    }
}

/// Body of one POST to the logging endpoint. Built per dispatch, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub event_type: EventKind,
    pub entry_type: EntryType,
    pub key_id: String,
}

impl EventPayload {
    pub fn new(kind: EventKind, entry: &Entry) -> EventPayload {
        EventPayload {
            event_type: kind,
            entry_type: entry.entry_type,
            key_id: entry.key_id.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_json_shape() {
        let entry = Entry::new(EntryType::Qr, "07");
        let json = EventPayload::new(EventKind::PageView, &entry).to_json().unwrap();

        assert_eq!(
            json,
            r#"{"event_type":"page_view","entry_type":"qr","key_id":"07"}"#
        );
    }

    #[test]
    fn test_event_names_match_wire_format() {
        for kind in [EventKind::PageView, EventKind::Revisit, EventKind::PadletOpen] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_unknown_entry_with_empty_key() {
        let json = EventPayload::new(EventKind::Revisit, &Entry::default())
            .to_json()
            .unwrap();

        assert_eq!(
            json,
            r#"{"event_type":"revisit","entry_type":"unknown","key_id":""}"#
        );
    }
}
