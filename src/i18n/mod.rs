//! Translations.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `catalog` | Parsed `messages.json` files |
//! | `source` | [`LocaleSource`] seam, directory and in-memory sources |
//! | `placeholder` | Recursive `$name` expansion |
//! | `service` | [`TranslationService`] with fallback chains |
//! | `page` | Re-translation of bound UI elements |

// ============================================================================
// Submodules
// ============================================================================

/// Message catalogs.
pub mod catalog;

/// Page re-translation.
pub mod page;

/// Placeholder expansion.
pub mod placeholder;

/// Translation service.
pub mod service;

/// Message file sources.
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::MessageCatalog;
pub use page::{I18nBinding, PageElement};
pub use service::{ServiceState, TranslationService};
pub use source::{DirectorySource, LocaleSource, StaticSource};
