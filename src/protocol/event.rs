//! Storage change notifications.
//!
//! The background store broadcasts a [`StorageChange`] after every write so
//! other execution contexts can refresh their in-memory state.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::{PICKED_LANGUAGE, SETTINGS_KEY};

// ============================================================================
// StorageChange
// ============================================================================

/// A write observed by the background store.
///
/// # Format
///
/// ```json
/// {
///   "key": "settings",
///   "oldValue": [ ... ],
///   "newValue": [ ... ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    /// Store key that changed.
    pub key: String,

    /// Value before the write (`null` when absent).
    #[serde(default)]
    pub old_value: Value,

    /// Value after the write (`null` when deleted).
    #[serde(default)]
    pub new_value: Value,
}

impl StorageChange {
    /// Creates a new change notification.
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self {
            key: key.into(),
            old_value,
            new_value,
        }
    }

    /// Returns the language preference carried by a `settings` write.
    ///
    /// `None` for other keys, or when the language entry did not change.
    #[must_use]
    pub fn picked_language(&self) -> Option<&str> {
        if self.key != SETTINGS_KEY {
            return None;
        }

        let new = find_setting(&self.new_value, PICKED_LANGUAGE)?;
        let old = find_setting(&self.old_value, PICKED_LANGUAGE);
        (old != Some(new)).then_some(new)
    }
}

/// Finds the string `enabled` value of a settings entry by id.
fn find_setting<'a>(settings: &'a Value, id: &str) -> Option<&'a str> {
    settings
        .as_array()?
        .iter()
        .find(|entry| entry.get("id").and_then(Value::as_str) == Some(id))
        .and_then(|entry| entry.get("enabled"))
        .and_then(Value::as_str)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_picked_language_changed() {
        let change = StorageChange::new(
            SETTINGS_KEY,
            json!([{"id": PICKED_LANGUAGE, "enabled": "en"}]),
            json!([{"id": "other", "enabled": true}, {"id": PICKED_LANGUAGE, "enabled": "fr"}]),
        );
        assert_eq!(change.picked_language(), Some("fr"));
    }

    #[test]
    fn test_picked_language_unchanged() {
        let settings = json!([{"id": PICKED_LANGUAGE, "enabled": "it"}]);
        let change = StorageChange::new(SETTINGS_KEY, settings.clone(), settings);
        assert_eq!(change.picked_language(), None);
    }

    #[test]
    fn test_picked_language_other_key() {
        let change = StorageChange::new(
            "tabs",
            Value::Null,
            json!([{"id": PICKED_LANGUAGE, "enabled": "fr"}]),
        );
        assert_eq!(change.picked_language(), None);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let change = StorageChange::new("tabs", Value::Null, json!([]));
        let value = serde_json::to_value(&change).expect("serialize");
        assert!(value.get("newValue").is_some());
        assert!(value.get("oldValue").is_some());
    }
}
