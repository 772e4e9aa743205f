//! Where message files come from.
//!
//! [`LocaleSource`] is the seam between the translation service and the
//! packaged `_locales` tree. [`DirectorySource`] reads it from disk;
//! [`StaticSource`] serves files held in memory.

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::LanguageCode;

// ============================================================================
// Constants
// ============================================================================

/// File name inside each language directory.
pub const MESSAGES_FILE: &str = "messages.json";

// ============================================================================
// LocaleSource
// ============================================================================

/// Fetches the raw text of a language's message file.
#[async_trait]
pub trait LocaleSource: Send + Sync {
    /// Returns the message file for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocaleNotFound`] if the language is not packaged.
    async fn fetch(&self, language: &LanguageCode) -> Result<String>;
}

// ============================================================================
// DirectorySource
// ============================================================================

/// Reads `<root>/<code>/messages.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source rooted at a `_locales` directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, language: &LanguageCode) -> PathBuf {
        self.root.join(language.as_str()).join(MESSAGES_FILE)
    }
}

#[async_trait]
impl LocaleSource for DirectorySource {
    async fn fetch(&self, language: &LanguageCode) -> Result<String> {
        let path = self.path_for(language);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            debug!(path = %path.display(), error = %e, "Message file unavailable");
            Error::locale_not_found(language.as_str())
        })
    }
}

// ============================================================================
// StaticSource
// ============================================================================

/// In-memory message files.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    files: FxHashMap<LanguageCode, String>,
}

impl StaticSource {
    /// Creates an empty source.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message file verbatim.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<LanguageCode>, json: impl Into<String>) -> Self {
        self.files.insert(language.into(), json.into());
        self
    }

    /// Adds a message file built from key/message pairs.
    #[must_use]
    pub fn with_messages<'a>(
        self,
        language: impl Into<LanguageCode>,
        messages: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let file: Map<String, Value> = messages
            .into_iter()
            .map(|(key, message)| (key.to_string(), json!({ "message": message })))
            .collect();
        self.with_language(language, Value::Object(file).to_string())
    }
}

#[async_trait]
impl LocaleSource for StaticSource {
    async fn fetch(&self, language: &LanguageCode) -> Result<String> {
        self.files
            .get(language)
            .cloned()
            .ok_or_else(|| Error::locale_not_found(language.as_str()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_source_reads_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fr = dir.path().join("fr");
        std::fs::create_dir_all(&fr).expect("mkdir");
        std::fs::write(fr.join(MESSAGES_FILE), r#"{"a":{"message":"b"}}"#).expect("write");

        let source = DirectorySource::new(dir.path());
        let text = source.fetch(&LanguageCode::new("fr")).await.expect("fetch");
        assert!(text.contains("\"b\""));

        let err = source.fetch(&LanguageCode::new("de")).await.unwrap_err();
        assert!(matches!(err, Error::LocaleNotFound { .. }));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource::new().with_messages("en", [("hello", "Hello")]);

        let text = source.fetch(&LanguageCode::new("en")).await.expect("fetch");
        let parsed: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(parsed["hello"]["message"], "Hello");

        assert!(source.fetch(&LanguageCode::new("it")).await.is_err());
    }
}
