//! Well-known store keys and setting ids.

/// Store key holding the persisted tab list.
pub const TABS_KEY: &str = "tabs";

/// Store key holding the `{id, enabled}` settings array.
pub const SETTINGS_KEY: &str = "settings";

/// Store key holding style entries applied to generic tabs.
pub const GENERIC_STYLE_KEY: &str = "settings-tab_generic_style";

/// Store key holding style entries applied to org tabs.
pub const ORG_STYLE_KEY: &str = "settings-tab_org_style";

/// Setting id carrying the user's language preference.
pub const PICKED_LANGUAGE: &str = "picked-language";

/// Returns `true` for keys whose `set` merges by `(id, forActive)`.
#[inline]
#[must_use]
pub fn is_style_key(key: &str) -> bool {
    key == GENERIC_STYLE_KEY || key == ORG_STYLE_KEY
}
