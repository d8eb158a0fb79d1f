/// Entry classification from the page's query string
///
/// Links printed on QR codes and written to NFC tags carry
/// `?entry=<qr|nfc>&key=<n>`; operators use `entry=test` to exercise the
/// page without logging anything.
use serde::{Deserialize, Serialize};
use url::Url;
use url::form_urlencoded;

const ENTRY_PARAM: &str = "entry";
const KEY_PARAM: &str = "key";

/// How the visitor reached the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Qr,
    Nfc,
    Test,
    #[default]
    Unknown,
}

impl EntryType {
    /// Case-insensitive; anything unrecognized is `Unknown`.
    pub fn parse(raw: &str) -> EntryType {
        match raw.to_lowercase().as_str() {
            "test" => EntryType::Test,
            "qr" => EntryType::Qr,
            "nfc" => EntryType::Nfc,
            _ => EntryType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Qr => "qr",
            EntryType::Nfc => "nfc",
            EntryType::Test => "test",
            EntryType::Unknown => "unknown",
        }
    }

    pub fn is_test(&self) -> bool {
        *self == EntryType::Test
    }
}

/// Provenance of the current page view, computed once at load
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub entry_type: EntryType,
    /// Opaque keychain id, trimmed but otherwise verbatim
    pub key_id: String,
}

impl Entry {
    pub fn new(entry_type: EntryType, key_id: &str) -> Entry {
        Entry {
            entry_type,
            key_id: key_id.to_string(),
        }
    }

    /// Classify a raw query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Entry {
        let query = query.strip_prefix('?').unwrap_or(query);

        let entry_type = first_param(query, ENTRY_PARAM)
            .map(|raw| EntryType::parse(&raw))
            .unwrap_or_default();
        let key_id = first_param(query, KEY_PARAM)
            .map(|raw| raw.trim().to_string())
            .unwrap_or_default();

        Entry { entry_type, key_id }
    }

    /// Classify a full page URL. Unparsable URLs fall back to `unknown`.
    pub fn from_url(url: &str) -> Entry {
        match Url::parse(url) {
            Ok(parsed) => parsed.query().map(Entry::from_query).unwrap_or_default(),
            Err(e) => {
                log::debug!("Unparsable page url {:?}: {}", url, e);
                Entry::default()
            }
        }
    }

    pub fn is_test(&self) -> bool {
        self.entry_type.is_test()
    }
}

/// First value of `name`, like `URLSearchParams.get`
fn first_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_is_unknown() {
        assert_eq!(Entry::from_query("").entry_type, EntryType::Unknown);
        assert_eq!(Entry::from_query("?key=3").entry_type, EntryType::Unknown);
        assert_eq!(Entry::from_query("foo=bar&baz").entry_type, EntryType::Unknown);
    }

    #[test]
    fn test_known_entry_types() {
        assert_eq!(Entry::from_query("?entry=qr").entry_type, EntryType::Qr);
        assert_eq!(Entry::from_query("?entry=nfc").entry_type, EntryType::Nfc);
        assert_eq!(Entry::from_query("?entry=test").entry_type, EntryType::Test);
    }

    #[test]
    fn test_entry_is_case_insensitive() {
        assert_eq!(Entry::from_query("?entry=TEST").entry_type, EntryType::Test);
        assert_eq!(Entry::from_query("?entry=TeSt").entry_type, EntryType::Test);
        assert_eq!(Entry::from_query("?entry=QR").entry_type, EntryType::Qr);
        assert_eq!(Entry::from_query("?entry=Nfc").entry_type, EntryType::Nfc);
    }

    #[test]
    fn test_unrecognized_entry_is_unknown() {
        assert_eq!(Entry::from_query("?entry=email").entry_type, EntryType::Unknown);
        assert_eq!(Entry::from_query("?entry=").entry_type, EntryType::Unknown);
        assert_eq!(Entry::from_query("?entry=%20qr").entry_type, EntryType::Unknown);
    }

    #[test]
    fn test_key_is_not_normalized() {
        let entry = Entry::from_query("?entry=qr&key=07");

        assert_eq!(entry.entry_type, EntryType::Qr);
        assert_eq!(entry.key_id, "07");
    }

    #[test]
    fn test_key_is_trimmed_and_decoded() {
        assert_eq!(Entry::from_query("?key=%20%2012%20").key_id, "12");
        assert_eq!(Entry::from_query("?key=+a+b+").key_id, "a b");
        assert_eq!(Entry::from_query("?entry=nfc").key_id, "");
    }

    #[test]
    fn test_first_occurrence_wins() {
        let entry = Entry::from_query("entry=nfc&entry=qr&key=1&key=2");

        assert_eq!(entry.entry_type, EntryType::Nfc);
        assert_eq!(entry.key_id, "1");
    }

    #[test]
    fn test_from_url() {
        let entry = Entry::from_url("https://example.com/bridge/?entry=qr&key=3#top");
        assert_eq!(entry, Entry::new(EntryType::Qr, "3"));

        assert_eq!(Entry::from_url("https://example.com/"), Entry::default());
        assert_eq!(Entry::from_url("not a url"), Entry::default());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Entry::new(EntryType::Nfc, "5")).unwrap();

        assert_eq!(json, r#"{"entry_type":"nfc","key_id":"5"}"#);
    }
}
