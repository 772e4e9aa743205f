//! Setup Tabs - persistent tab bar and translations for the CRM Setup console.
//!
//! This library implements the core of a browser extension that adds a
//! user-managed tab bar to Salesforce Setup pages.
//!
//! # Architecture
//!
//! The extension runs as several independent execution contexts:
//!
//! - **Background**: owns the persistent store ([`BackgroundStore`])
//! - **Popup / Options / Content script**: each an [`ExtensionContext`]
//!   talking to the store through a [`Messenger`]
//!
//! Key design principles:
//!
//! - Each context owns at most one [`TabContainer`] and one
//!   [`TranslationService`]
//! - The store is the only shared state; whole-list writes, last writer wins
//! - Every write is broadcast so other contexts can catch up
//! - Translations never fail towards the UI; the raw key is the last resort
//!
//! # Quick Start
//!
//! ```no_run
//! use setup_tabs::{
//!     BackgroundStore, ContextKind, ExtensionContext, MoveOptions, Result, StoreOptions,
//!     TabData, TabQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = BackgroundStore::spawn(StoreOptions::new().persist_to("store.json")).await?;
//!
//!     let popup = ExtensionContext::builder()
//!         .kind(ContextKind::Popup)
//!         .store(store)
//!         .locale_dir("./_locales")
//!         .build()?;
//!
//!     let tabs = popup.tab_container().await?;
//!     tabs.add_tab(TabData::new("Users", "ManageUsers"), true).await?;
//!     tabs.move_tab(&TabQuery::by_url("ManageUsers"), MoveOptions::to_front()).await?;
//!
//!     let i18n = popup.translation_service().await?;
//!     println!("{}", i18n.translate("save"));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | [`ExtensionContext`], builder and options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`i18n`] | [`TranslationService`] and message sources |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Store message types |
//! | [`store`] | [`BackgroundStore`] and the [`Messenger`] seam |
//! | [`tabs`] | [`Tab`], [`TabContainer`], drag-and-drop planning |

// ============================================================================
// Modules
// ============================================================================

/// Execution contexts.
///
/// Use [`ExtensionContext::builder()`] to create one.
pub mod context;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Translations: catalogs, fallback chains, placeholders.
pub mod i18n;

/// Type-safe identifiers.
pub mod identifiers;

/// Store message types.
///
/// Requests, storage keys and change notifications.
pub mod protocol;

/// Background store.
pub mod store;

/// Tab registry.
pub mod tabs;

// ============================================================================
// Re-exports
// ============================================================================

// Context types
pub use context::{
    ActiveTab, ActiveTabLocator, ContextBuilder, ContextKind, ExtensionContext, RuntimeOptions,
};

// Error types
pub use error::{Error, Result};

// Translation types
pub use i18n::{
    DirectorySource, I18nBinding, LocaleSource, MessageCatalog, PageElement, ServiceState,
    StaticSource, TranslationService,
};

// Identifier types
pub use identifiers::{LanguageCode, RequestId};

// Protocol types
pub use protocol::{Keys, Request, StorageChange, Verb};

// Store types
pub use store::{BackgroundStore, Messenger, StoreHandle, StoreOptions};

// Tab types
pub use tabs::{
    DropPlan, MoveOptions, ReorderEvent, ReplaceOptions, SortKey, Tab, TabContainer, TabData,
    TabInput, TabKey, TabQuery,
};
