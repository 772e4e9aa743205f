//! Tab registry.
//!
//! A tab is a user-defined shortcut to a Salesforce setup page. The
//! container keeps them ordered, de-duplicated and split into a pinned
//! prefix and an unpinned remainder.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `tab` | [`Tab`] entity, raw [`TabData`], lookup keys |
//! | `container` | [`TabContainer`] and its options |
//! | `reorder` | Drag-and-drop planning |
//! | `url` | URL minification and org extraction |

// ============================================================================
// Submodules
// ============================================================================

/// Tab collection mirrored to the store.
pub mod container;

/// Drag-and-drop planning.
pub mod reorder;

/// Tab entity.
pub mod tab;

/// URL helpers.
pub mod url;

// ============================================================================
// Re-exports
// ============================================================================

pub use container::{MoveOptions, ReplaceOptions, SortKey, TabContainer};
pub use reorder::{DropPlan, ReorderEvent};
pub use tab::{Tab, TabData, TabInput, TabKey, TabQuery, is_valid};
