//! Runtime configuration of an execution context.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use setup_tabs::RuntimeOptions;
//!
//! let options = RuntimeOptions::new()
//!     .with_store_timeout(Duration::from_secs(5))
//!     .with_default_language("en")
//!     .without_default_tabs();
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::i18n::placeholder::DEFAULT_MAX_DEPTH;
use crate::identifiers::LanguageCode;
use crate::store::handle::DEFAULT_REQUEST_TIMEOUT;

// ============================================================================
// Constants
// ============================================================================

/// Language every fallback chain ends with.
pub const DEFAULT_LANGUAGE: &str = "en";

// ============================================================================
// RuntimeOptions
// ============================================================================

/// Context configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Timeout for every store request.
    pub store_timeout: Duration,

    /// Last language of every fallback chain.
    pub default_language: LanguageCode,

    /// Placeholder nesting limit.
    pub max_placeholder_depth: usize,

    /// Store the default tab set when the store holds none.
    pub initialize_default_tabs: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_language: LanguageCode::new(DEFAULT_LANGUAGE),
            max_placeholder_depth: DEFAULT_MAX_DEPTH,
            initialize_default_tabs: true,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl RuntimeOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RuntimeOptions {
    /// Sets the store request timeout.
    #[inline]
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Sets the default language.
    #[inline]
    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<LanguageCode>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Sets the placeholder nesting limit.
    #[inline]
    #[must_use]
    pub fn with_max_placeholder_depth(mut self, depth: usize) -> Self {
        self.max_placeholder_depth = depth;
        self
    }

    /// Leaves an empty store empty instead of writing the default tabs.
    #[inline]
    #[must_use]
    pub fn without_default_tabs(mut self) -> Self {
        self.initialize_default_tabs = false;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
