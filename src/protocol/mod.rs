//! Store message protocol.
//!
//! This module defines the messages exchanged between an execution context
//! (popup, content script, options page) and the background store.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Context → Background | Read or write a store key |
//! | reply | Background → Context | Stored value, `null` when absent, or a rejected channel |
//! | `StorageChange` | Background → all contexts | Broadcast after every write |
//!
//! # Verbs
//!
//! - `get` - read one key
//! - `set` - overwrite a key, or merge entries for style keys
//! - `get-settings` - read entries of the `settings` array by id
//! - `get-style-settings` - read the generic and/or org style arrays
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | `StorageChange` notification |
//! | `keys` | Well-known store keys and setting ids |
//! | `request` | `Request`, `Verb`, `Keys` |

// ============================================================================
// Submodules
// ============================================================================

/// Storage change notifications.
pub mod event;

/// Well-known store keys.
pub mod keys;

/// Request message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::StorageChange;
pub use request::{Keys, Request, Verb};
