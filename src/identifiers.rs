//! Type-safe identifiers.
//!
//! Newtype wrappers keep request ids and language codes from being mixed
//! with arbitrary strings.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// RequestId
// ============================================================================

/// Identifier attached to every store request for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// LanguageCode
// ============================================================================

/// A locale code in message-file form (`en`, `fr`, `fr_CA`).
///
/// Hyphenated codes (`pt-BR`) are normalized to underscores so they match
/// the locale directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Creates a normalized language code.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().replace('-', "_"))
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the region-agnostic prefix (`fr_CA` → `fr`).
    ///
    /// `None` when the code has no region part.
    #[must_use]
    pub fn region_agnostic(&self) -> Option<Self> {
        self.0
            .rsplit_once('_')
            .map(|(prefix, _)| prefix)
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| Self(prefix.to_string()))
    }

    /// Every shorter prefix, longest first (`zh_Hant_TW` → `zh_Hant`, `zh`).
    pub fn fallbacks(&self) -> impl Iterator<Item = Self> + use<> {
        std::iter::successors(self.region_agnostic(), Self::region_agnostic)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LanguageCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for LanguageCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn test_language_code_normalizes_hyphen() {
        assert_eq!(LanguageCode::new("pt-BR").as_str(), "pt_BR");
        assert_eq!(LanguageCode::new(" en ").as_str(), "en");
    }

    #[test]
    fn test_region_agnostic() {
        assert_eq!(
            LanguageCode::new("fr_CA").region_agnostic(),
            Some(LanguageCode::new("fr"))
        );
        assert_eq!(
            LanguageCode::new("zh_Hant_TW").region_agnostic(),
            Some(LanguageCode::new("zh_Hant"))
        );
        assert_eq!(LanguageCode::new("en").region_agnostic(), None);
    }

    #[test]
    fn test_fallbacks_walk_every_prefix() {
        let codes: Vec<String> = LanguageCode::new("zh-Hant-TW")
            .fallbacks()
            .map(String::from)
            .collect();
        assert_eq!(codes, vec!["zh_Hant", "zh"]);
        assert_eq!(LanguageCode::new("en").fallbacks().count(), 0);
    }
}
