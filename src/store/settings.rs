//! Typed settings and style entries with their merge rules.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::Keys;

// ============================================================================
// Setting
// ============================================================================

/// One entry of the `settings` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Setting id, e.g. `picked-language`.
    pub id: String,

    /// Setting value; a boolean for toggles, a string for choices.
    #[serde(default)]
    pub enabled: Value,
}

impl Setting {
    /// Creates a setting entry.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, enabled: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            enabled: enabled.into(),
        }
    }
}

/// Selects settings entries for a `get-settings` request.
///
/// - no keys: the whole array
/// - one key: that entry or `null`
/// - many keys: the matching entries
pub(crate) fn select_settings(stored: &Value, keys: Option<&Keys>) -> Value {
    let Some(entries) = stored.as_array() else {
        return match keys {
            Some(Keys::Many(_)) => Value::Array(Vec::new()),
            _ => Value::Null,
        };
    };

    let id_of = |entry: &Value| entry.get("id").and_then(Value::as_str).map(str::to_string);

    match keys {
        None => stored.clone(),
        Some(Keys::One(id)) => entries
            .iter()
            .find(|entry| id_of(entry).as_deref() == Some(id.as_str()))
            .cloned()
            .unwrap_or(Value::Null),
        Some(keys @ Keys::Many(_)) => Value::Array(
            entries
                .iter()
                .filter(|entry| id_of(entry).is_some_and(|id| keys.contains(&id)))
                .cloned()
                .collect(),
        ),
    }
}

// ============================================================================
// StyleSetting
// ============================================================================

/// One style entry, keyed by `(id, forActive)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSetting {
    /// Style property id, e.g. `background-color`.
    pub id: String,

    /// Applies to the active tab rather than inactive ones.
    #[serde(default)]
    pub for_active: bool,

    /// Property value; `null` or `""` in a write deletes the entry.
    #[serde(default)]
    pub value: Value,
}

impl StyleSetting {
    /// Returns `true` if this entry deletes its key when merged.
    #[inline]
    #[must_use]
    pub fn is_deletion(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    fn same_key(&self, other: &Self) -> bool {
        self.id == other.id && self.for_active == other.for_active
    }
}

/// Merges incoming style entries into the stored ones.
///
/// `incoming` may be a single entry or an array. Entries replace stored
/// entries with the same `(id, forActive)`; deletions remove them.
pub(crate) fn merge_style(stored: &Value, incoming: &Value) -> Result<Value> {
    let mut merged: Vec<StyleSetting> = match stored {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other.clone())?,
    };

    let updates: Vec<StyleSetting> = match incoming {
        Value::Array(_) => serde_json::from_value(incoming.clone())?,
        Value::Object(_) => vec![serde_json::from_value(incoming.clone())?],
        Value::Null => Vec::new(),
        other => {
            return Err(Error::store(format!(
                "style settings must be an object or array, got {other}"
            )));
        }
    };

    for update in updates {
        merged.retain(|entry| !entry.same_key(&update));
        if !update.is_deletion() {
            merged.push(update);
        }
    }

    Ok(serde_json::to_value(merged)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_style_replaces_by_composite_key() {
        let stored = json!([
            {"id": "color", "forActive": false, "value": "red"},
            {"id": "color", "forActive": true, "value": "blue"},
        ]);
        let merged = merge_style(
            &stored,
            &json!({"id": "color", "forActive": true, "value": "green"}),
        )
        .expect("merge");

        let entries: Vec<StyleSetting> = serde_json::from_value(merged).expect("parse");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| !e.for_active && e.value == "red"));
        assert!(entries.iter().any(|e| e.for_active && e.value == "green"));
    }

    #[test]
    fn test_merge_style_deletes_on_empty_value() {
        let stored = json!([
            {"id": "bold", "forActive": false, "value": "bold"},
            {"id": "color", "forActive": false, "value": "red"},
        ]);
        let merged = merge_style(
            &stored,
            &json!([
                {"id": "bold", "forActive": false, "value": ""},
                {"id": "color", "forActive": false, "value": null},
            ]),
        )
        .expect("merge");
        assert_eq!(merged, json!([]));
    }

    #[test]
    fn test_merge_style_rejects_scalars() {
        assert!(merge_style(&Value::Null, &json!(42)).is_err());
    }

    #[test]
    fn test_select_settings() {
        let stored = json!([
            {"id": "a", "enabled": true},
            {"id": "b", "enabled": "fr"},
        ]);

        assert_eq!(select_settings(&stored, None), stored);
        assert_eq!(
            select_settings(&stored, Some(&Keys::from("b"))),
            json!({"id": "b", "enabled": "fr"})
        );
        assert_eq!(select_settings(&stored, Some(&Keys::from("z"))), Value::Null);
        assert_eq!(
            select_settings(&stored, Some(&Keys::Many(vec!["a".into(), "z".into()]))),
            json!([{"id": "a", "enabled": true}])
        );
        assert_eq!(
            select_settings(&Value::Null, Some(&Keys::Many(vec!["a".into()]))),
            json!([])
        );
    }
}
