//! Parsed message files.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::Result;
use crate::identifiers::LanguageCode;

// ============================================================================
// Types
// ============================================================================

/// One entry of a message file. `description` is for translators only.
#[derive(Debug, Deserialize)]
struct MessageEntry {
    message: String,
}

// ============================================================================
// MessageCatalog
// ============================================================================

/// Messages of one language, keyed by message key.
///
/// # Format
///
/// ```json
/// {
///   "greeting": { "message": "Hello", "description": "Popup title" }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    language: LanguageCode,
    messages: FxHashMap<String, String>,
}

impl MessageCatalog {
    /// Parses a message file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the text is not a
    /// key → `{message}` object.
    pub fn parse(language: LanguageCode, json: &str) -> Result<Self> {
        let entries: FxHashMap<String, MessageEntry> = serde_json::from_str(json)?;
        Ok(Self {
            language,
            messages: entries
                .into_iter()
                .map(|(key, entry)| (key, entry.message))
                .collect(),
        })
    }

    /// Builds a catalog from key/message pairs.
    #[must_use]
    pub fn from_messages<I, K, V>(language: LanguageCode, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            language,
            messages: messages
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Language of this catalog.
    #[inline]
    #[must_use]
    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Raw message for `key`, placeholders unexpanded.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Number of messages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the catalog holds no messages.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_file() {
        let catalog = MessageCatalog::parse(
            LanguageCode::new("fr"),
            r#"{
                "greeting": { "message": "Bonjour", "description": "Popup title" },
                "bye": { "message": "Au revoir" }
            }"#,
        )
        .expect("parse");

        assert_eq!(catalog.language().as_str(), "fr");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("greeting"), Some("Bonjour"));
        assert_eq!(catalog.get("missing"), None);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(MessageCatalog::parse(LanguageCode::new("en"), r#"{"a": "b"}"#).is_err());
        assert!(MessageCatalog::parse(LanguageCode::new("en"), "[]").is_err());
    }

    #[test]
    fn test_from_messages() {
        let catalog = MessageCatalog::from_messages(LanguageCode::new("en"), [("a", "A")]);
        assert_eq!(catalog.get("a"), Some("A"));
        assert!(!catalog.is_empty());
    }
}
