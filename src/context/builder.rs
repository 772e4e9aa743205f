//! Builder pattern for context configuration.
//!
//! # Example
//!
//! ```ignore
//! use setup_tabs::{BackgroundStore, ContextKind, ExtensionContext, StoreOptions};
//!
//! let store = BackgroundStore::spawn(StoreOptions::new()).await?;
//! let popup = ExtensionContext::builder()
//!     .kind(ContextKind::Popup)
//!     .store(store)
//!     .locale_dir("./_locales")
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::i18n::{DirectorySource, LocaleSource, StaticSource};
use crate::store::{Messenger, StoreHandle};

use super::active_tab::ActiveTabLocator;
use super::options::RuntimeOptions;
use super::{ContextKind, ExtensionContext};

// ============================================================================
// ContextBuilder
// ============================================================================

/// Builder for an [`ExtensionContext`].
///
/// Use [`ExtensionContext::builder()`] to create a new builder.
#[derive(Default)]
pub struct ContextBuilder {
    /// Which execution context this is.
    kind: ContextKind,
    /// Built-in store client.
    store: Option<StoreHandle>,
    /// Custom store channel.
    messenger: Option<Arc<dyn Messenger>>,
    /// Message file provider.
    locales: Option<Arc<dyn LocaleSource>>,
    /// Browser tab lookup.
    active_tab: Option<Arc<dyn ActiveTabLocator>>,
    /// Runtime configuration.
    options: RuntimeOptions,
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("kind", &self.kind)
            .field("store", &self.store.is_some())
            .field("messenger", &self.messenger.is_some())
            .field("locales", &self.locales.is_some())
            .field("active_tab", &self.active_tab.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// ContextBuilder Implementation
// ============================================================================

impl ContextBuilder {
    /// Creates a builder with no store configured.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the execution context kind.
    #[inline]
    #[must_use]
    pub fn kind(mut self, kind: ContextKind) -> Self {
        self.kind = kind;
        self
    }

    /// Uses the built-in background store.
    ///
    /// Also enables change watchers; the handle's timeout is replaced by
    /// [`RuntimeOptions::store_timeout`].
    #[inline]
    #[must_use]
    pub fn store(mut self, store: StoreHandle) -> Self {
        self.store = Some(store);
        self.messenger = None;
        self
    }

    /// Uses a custom store channel. Change watchers are unavailable.
    #[inline]
    #[must_use]
    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self.store = None;
        self
    }

    /// Sets the message file provider.
    #[inline]
    #[must_use]
    pub fn locales(mut self, source: impl LocaleSource + 'static) -> Self {
        self.locales = Some(Arc::new(source));
        self
    }

    /// Reads message files from a `_locales` directory.
    #[inline]
    #[must_use]
    pub fn locale_dir(self, root: impl Into<PathBuf>) -> Self {
        self.locales(DirectorySource::new(root))
    }

    /// Sets the active tab lookup.
    #[inline]
    #[must_use]
    pub fn active_tab_locator(mut self, locator: impl ActiveTabLocator + 'static) -> Self {
        self.active_tab = Some(Arc::new(locator));
        self
    }

    /// Sets the runtime options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the context.
    ///
    /// Without a locale source the context translates against an empty
    /// source, so [`ExtensionContext::translation_service`] fails.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if no store was configured
    /// - [`Error::InvalidArgument`] if the store timeout is zero
    pub fn build(self) -> Result<ExtensionContext> {
        if self.options.store_timeout.is_zero() {
            return Err(Error::invalid_argument("store timeout must be positive"));
        }

        let store = self
            .store
            .map(|handle| handle.with_timeout(self.options.store_timeout));

        let messenger = match (&store, self.messenger) {
            (Some(handle), _) => Arc::new(handle.clone()) as Arc<dyn Messenger>,
            (None, Some(messenger)) => messenger,
            (None, None) => {
                return Err(Error::invalid_argument(
                    "a store is required. Use .store() or .messenger() to set it.",
                ));
            }
        };

        let locales = self
            .locales
            .unwrap_or_else(|| Arc::new(StaticSource::new()));

        Ok(ExtensionContext::new(
            self.kind,
            messenger,
            store,
            locales,
            self.active_tab,
            self.options,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
