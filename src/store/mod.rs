//! Background store and the messaging seam.
//!
//! Every execution context reaches the persistent store only through the
//! [`Messenger`] trait. The crate ships [`BackgroundStore`], a tokio task
//! that owns the key/value map and answers requests over channels.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   mpsc Request    ┌──────────────────┐
//! │  ExtensionContext│──────────────────►│  BackgroundStore │
//! │  (StoreHandle)   │◄──────────────────│  (tokio task)    │
//! └──────────────────┘  oneshot reply    │                  │
//!          ▲                             │  FxHashMap +     │
//!          └──── broadcast StorageChange─│  optional file   │
//!                                        └──────────────────┘
//! ```
//!
//! There is no cross-context locking. Whole-value writes make the last
//! writer win; the store is the only arbiter.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `background` | Store task and options |
//! | `handle` | Cloneable client implementing [`Messenger`] |
//! | `settings` | Settings and style entries, merge rules |

// ============================================================================
// Submodules
// ============================================================================

/// Store task.
pub mod background;

/// Store client.
pub mod handle;

/// Settings and style entries.
pub mod settings;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::protocol::{Keys, Request};

// ============================================================================
// Re-exports
// ============================================================================

pub use background::{BackgroundStore, StoreOptions};
pub use handle::StoreHandle;
pub use settings::{Setting, StyleSetting};

// ============================================================================
// Messenger
// ============================================================================

/// Request/response channel to the background store.
///
/// Replies are the stored value, or `Value::Null` when absent. Failures
/// surface as `Err`, never as an in-band payload.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a request and waits for the reply.
    async fn send(&self, request: Request) -> Result<Value>;

    /// Reads one key.
    async fn get(&self, key: &str) -> Result<Value> {
        self.send(Request::get(key)).await
    }

    /// Writes one key, returning the value the store kept.
    async fn set(&self, key: &str, value: Value) -> Result<Value> {
        self.send(Request::set(key, value)).await
    }

    /// Reads settings entries by id.
    async fn get_settings(&self, keys: Option<Keys>) -> Result<Value> {
        self.send(Request::get_settings(keys)).await
    }

    /// Reads style entries.
    async fn get_style_settings(&self, key: Option<&str>) -> Result<Value> {
        self.send(Request::get_style_settings(key.map(str::to_string)))
            .await
    }
}
