//! Error types for the tab registry and translation service.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use setup_tabs::{Result, Error, TabData};
//!
//! async fn example(container: &TabContainer) -> Result<()> {
//!     match container.add_tab(TabData::new("Users", "ManageUsers"), true).await {
//!         Err(Error::DuplicateTab { .. }) => Ok(()),
//!         other => other.map(|_| ()),
//!     }
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Tabs | [`Error::InvalidTab`], [`Error::DuplicateTab`], [`Error::TabNotFound`], [`Error::InvalidImport`] |
//! | Lifecycle | [`Error::SingleInstanceViolation`] |
//! | Translation | [`Error::MissingTranslationKey`], [`Error::LocaleNotFound`] |
//! | Store | [`Error::Store`], [`Error::RequestTimeout`], [`Error::ConnectionClosed`] |
//! | Context | [`Error::ActiveTabNotFound`], [`Error::InvalidArgument`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Tab Errors
    // ========================================================================
    /// A tab-shaped value failed required-field validation.
    ///
    /// Returned when `label` or `url` is missing or empty.
    #[error("Invalid tab: {message}")]
    InvalidTab {
        /// Which field failed and why.
        message: String,
    },

    /// Insertion would create a second tab with the same label, url and org.
    #[error("Duplicate tab: label={label}, url={url}, org={}", .org.as_deref().unwrap_or("<generic>"))]
    DuplicateTab {
        /// Label of the rejected tab.
        label: String,
        /// URL of the rejected tab.
        url: String,
        /// Org of the rejected tab.
        org: Option<String>,
    },

    /// A move, pin or click addressed a tab that does not exist.
    #[error("Tab not found: {query}")]
    TabNotFound {
        /// Human readable form of the lookup.
        query: String,
    },

    /// A JSON import contained invalid elements.
    ///
    /// Nothing is imported when this is returned.
    #[error("Invalid import ({} invalid element(s)): {}", .invalid.len(), .invalid.join("; "))]
    InvalidImport {
        /// One description per invalid element.
        invalid: Vec<String>,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// A second instance of a per-context singleton was requested.
    ///
    /// Indicates a programming error.
    #[error("Single instance violation: {component} already exists in this context")]
    SingleInstanceViolation {
        /// Name of the component.
        component: &'static str,
    },

    // ========================================================================
    // Translation Errors
    // ========================================================================
    /// Key missing from the current, region-agnostic and default catalogs.
    #[error("Missing translation key: {key}")]
    MissingTranslationKey {
        /// The unresolved key.
        key: String,
    },

    /// No message file could be loaded for a language.
    #[error("Locale not found: {language}")]
    LocaleNotFound {
        /// Requested language code.
        language: String,
    },

    // ========================================================================
    // Store Errors
    // ========================================================================
    /// The background store rejected a request.
    #[error("Store error: {message}")]
    Store {
        /// Description reported by the store.
        message: String,
    },

    /// Store request timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The background store task is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Context Errors
    // ========================================================================
    /// The active browser tab could not be determined.
    #[error("Active tab not found after {attempts} attempts")]
    ActiveTabNotFound {
        /// Number of lookups performed.
        attempts: u32,
    },

    /// Invalid argument.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid tab error.
    #[inline]
    pub fn invalid_tab(message: impl Into<String>) -> Self {
        Self::InvalidTab {
            message: message.into(),
        }
    }

    /// Creates a duplicate tab error.
    #[inline]
    pub fn duplicate_tab(
        label: impl Into<String>,
        url: impl Into<String>,
        org: Option<String>,
    ) -> Self {
        Self::DuplicateTab {
            label: label.into(),
            url: url.into(),
            org,
        }
    }

    /// Creates a tab not found error.
    #[inline]
    pub fn tab_not_found(query: impl Into<String>) -> Self {
        Self::TabNotFound {
            query: query.into(),
        }
    }

    /// Creates an invalid import error.
    #[inline]
    pub fn invalid_import(invalid: Vec<String>) -> Self {
        Self::InvalidImport { invalid }
    }

    /// Creates a single instance violation.
    #[inline]
    pub fn single_instance(component: &'static str) -> Self {
        Self::SingleInstanceViolation { component }
    }

    /// Creates a missing translation key error.
    #[inline]
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingTranslationKey { key: key.into() }
    }

    /// Creates a locale not found error.
    #[inline]
    pub fn locale_not_found(language: impl Into<String>) -> Self {
        Self::LocaleNotFound {
            language: language.into(),
        }
    }

    /// Creates a store error.
    #[inline]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates an active tab not found error.
    #[inline]
    pub fn active_tab_not_found(attempts: u32) -> Self {
        Self::ActiveTabNotFound { attempts }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a tab validation or lookup error.
    #[inline]
    #[must_use]
    pub fn is_tab_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTab { .. }
                | Self::DuplicateTab { .. }
                | Self::TabNotFound { .. }
                | Self::InvalidImport { .. }
        )
    }

    /// Returns `true` if this error came from the store channel.
    #[inline]
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::Store { .. }
                | Self::RequestTimeout { .. }
                | Self::ConnectionClosed
                | Self::ChannelClosed(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors leave state consistent. Bulk inserts skip
    /// duplicates and lookups degrade missing keys to the raw key; a
    /// timed-out request may be retried.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTab { .. }
                | Self::RequestTimeout { .. }
                | Self::MissingTranslationKey { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_duplicate_display() {
        let err = Error::duplicate_tab("x", "y", None);
        assert_eq!(
            err.to_string(),
            "Duplicate tab: label=x, url=y, org=<generic>"
        );

        let err = Error::duplicate_tab("x", "y", Some("acme".into()));
        assert!(err.to_string().ends_with("org=acme"));
    }

    #[test]
    fn test_invalid_import_lists_every_element() {
        let err = Error::invalid_import(vec!["#0: missing label".into(), "#3: not an object".into()]);
        let text = err.to_string();
        assert!(text.contains("2 invalid"));
        assert!(text.contains("#0: missing label"));
        assert!(text.contains("#3: not an object"));
    }

    #[test]
    fn test_is_tab_error() {
        assert!(Error::invalid_tab("empty label").is_tab_error());
        assert!(Error::tab_not_found("url=c").is_tab_error());
        assert!(!Error::store("boom").is_tab_error());
    }

    #[test]
    fn test_is_store_error() {
        assert!(Error::store("boom").is_store_error());
        assert!(Error::ConnectionClosed.is_store_error());
        assert!(
            Error::request_timeout(RequestId::generate(), 10).is_store_error()
        );
        assert!(!Error::missing_key("k").is_store_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::duplicate_tab("a", "b", None).is_recoverable());
        assert!(Error::missing_key("k").is_recoverable());
        assert!(!Error::single_instance("TabContainer").is_recoverable());
        assert!(!Error::invalid_tab("x").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
