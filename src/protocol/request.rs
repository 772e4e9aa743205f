//! Request message types.
//!
//! Defines the message format for store requests sent from an execution
//! context to the background store.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::RequestId;

// ============================================================================
// Request
// ============================================================================

/// A store request.
///
/// # Format
///
/// ```json
/// {
///   "what": "set",
///   "key": "tabs",
///   "set": [ { "label": "Users", "url": "ManageUsers" } ]
/// }
/// ```
///
/// The `id` never goes over the wire; it only correlates log lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Log correlation id.
    #[serde(skip, default = "RequestId::generate")]
    pub id: RequestId,

    /// Verb.
    pub what: Verb,

    /// Target store key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Value to write (`set` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Value>,

    /// Tab list payload, accepted by `set` on the tabs key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs: Option<Value>,

    /// Setting ids (`get-settings`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Keys>,
}

impl Request {
    fn new(what: Verb) -> Self {
        Self {
            id: RequestId::generate(),
            what,
            key: None,
            set: None,
            tabs: None,
            keys: None,
        }
    }

    /// Creates a `get` request for one key.
    #[must_use]
    pub fn get(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(Verb::Get)
        }
    }

    /// Creates a `set` request.
    #[must_use]
    pub fn set(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: Some(key.into()),
            set: Some(value),
            ..Self::new(Verb::Set)
        }
    }

    /// Creates a `get-settings` request.
    ///
    /// `None` returns the whole settings array.
    #[must_use]
    pub fn get_settings(keys: Option<Keys>) -> Self {
        Self {
            keys,
            ..Self::new(Verb::GetSettings)
        }
    }

    /// Creates a `get-style-settings` request.
    ///
    /// `None` returns both style arrays.
    #[must_use]
    pub fn get_style_settings(key: Option<String>) -> Self {
        Self {
            key,
            ..Self::new(Verb::GetStyleSettings)
        }
    }

    /// Returns the value carried by a write, preferring `set` over `tabs`.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.set.as_ref().or(self.tabs.as_ref())
    }
}

// ============================================================================
// Verb
// ============================================================================

/// Store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verb {
    /// Read a key.
    Get,
    /// Write a key.
    Set,
    /// Read style entries.
    GetStyleSettings,
    /// Read settings entries.
    GetSettings,
}

impl Verb {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::GetStyleSettings => "get-style-settings",
            Self::GetSettings => "get-settings",
        }
    }
}

// ============================================================================
// Keys
// ============================================================================

/// One setting id or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keys {
    /// A single id; the reply is a single entry or `null`.
    One(String),
    /// Several ids; the reply is an array.
    Many(Vec<String>),
}

impl Keys {
    /// Returns `true` if `id` is requested.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::One(key) => key == id,
            Self::Many(keys) => keys.iter().any(|k| k == id),
        }
    }
}

impl From<&str> for Keys {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for Keys {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_serialization() {
        let request = Request::set("tabs", json!([{"label": "a", "url": "b"}]));
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["what"], "set");
        assert_eq!(value["key"], "tabs");
        assert_eq!(value["set"][0]["label"], "a");
        assert!(value.get("keys").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_verb_wire_names() {
        let json = serde_json::to_string(&Verb::GetStyleSettings).expect("serialize");
        assert_eq!(json, "\"get-style-settings\"");
        assert_eq!(Verb::GetSettings.as_str(), "get-settings");
    }

    #[test]
    fn test_parse_request_with_keys() {
        let request: Request =
            serde_json::from_str(r#"{"what":"get-settings","keys":["a","b"]}"#).expect("parse");
        assert_eq!(request.what, Verb::GetSettings);
        let keys = request.keys.expect("keys");
        assert!(keys.contains("b"));
        assert!(!keys.contains("c"));

        let request: Request =
            serde_json::from_str(r#"{"what":"get-settings","keys":"a"}"#).expect("parse");
        assert_eq!(request.keys, Some(Keys::One("a".into())));
    }

    #[test]
    fn test_payload_prefers_set() {
        let mut request = Request::set("tabs", json!([1]));
        request.tabs = Some(json!([2]));
        assert_eq!(request.payload(), Some(&json!([1])));

        request.set = None;
        assert_eq!(request.payload(), Some(&json!([2])));
    }
}
