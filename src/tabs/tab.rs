//! Tab value object and its raw input form.
//!
//! [`TabData`] is untrusted input (forms, imports, store payloads).
//! [`Tab`] is the validated entity; [`Tab::create`] and
//! `Tab::try_from(TabData)` are the only ways to obtain one.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::url::{contains_salesforce_id, extract_org_name, minify_url};

// ============================================================================
// Tab
// ============================================================================

/// A user-defined shortcut.
///
/// Equality by data covers `label`, `url` and `org` only; `pinned` and
/// click metadata never make two tabs different.
///
/// # Format
///
/// ```json
/// { "label": "Users", "url": "ManageUsers", "org": "acme", "pinned": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TabData")]
pub struct Tab {
    label: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    org: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pinned: bool,
    #[serde(skip_serializing_if = "is_zero")]
    click_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    click_date: Option<u64>,
}

// ============================================================================
// Tab - Constructors
// ============================================================================

impl Tab {
    /// Creates a validated tab.
    ///
    /// Inputs are trimmed and the URL minified. When `org` is `None` and
    /// the URL is an org page holding a record id, the org is derived from
    /// the URL's host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTab`] if `label` or `url` is empty.
    pub fn create(label: &str, url: &str, org: Option<&str>) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::invalid_tab("label is required"));
        }

        let raw_url = url.trim();
        if raw_url.is_empty() {
            return Err(Error::invalid_tab(format!("url is required (label={label})")));
        }

        let org = match org.map(str::trim).filter(|o| !o.is_empty()) {
            Some(org) => Some(org.to_string()),
            None if contains_salesforce_id(raw_url) => extract_org_name(raw_url),
            None => None,
        };

        let url = minify_url(raw_url);
        if url.is_empty() {
            return Err(Error::invalid_tab(format!("url is required (label={label})")));
        }

        Ok(Self {
            label: label.to_string(),
            url,
            org,
            pinned: false,
            click_count: 0,
            click_date: None,
        })
    }

    /// Returns this tab with the given pinned status.
    #[inline]
    #[must_use]
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }
}

// ============================================================================
// Tab - Accessors
// ============================================================================

impl Tab {
    /// Display label.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Minified URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Org scope; `None` for generic tabs.
    #[inline]
    #[must_use]
    pub fn org(&self) -> Option<&str> {
        self.org.as_deref()
    }

    /// Whether the tab sits in the pinned prefix.
    #[inline]
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Number of recorded clicks.
    #[inline]
    #[must_use]
    pub fn click_count(&self) -> u64 {
        self.click_count
    }

    /// Last click, unix milliseconds.
    #[inline]
    #[must_use]
    pub fn click_date(&self) -> Option<u64> {
        self.click_date
    }

    /// Returns the identity used for duplicate detection.
    #[must_use]
    pub fn key(&self) -> TabKey {
        TabKey {
            label: self.label.clone(),
            url: self.url.clone(),
            org: self.org.clone(),
        }
    }
}

// ============================================================================
// Tab - Comparison & Mutation
// ============================================================================

impl Tab {
    /// Exact match on label, url and org.
    #[inline]
    #[must_use]
    pub fn equals_by_data(&self, key: &TabKey) -> bool {
        self.label == key.label && self.url == key.url && self.org == key.org
    }

    /// Exact match on label, url and org of another tab.
    #[inline]
    #[must_use]
    pub fn equals_by_tab(&self, other: &Tab) -> bool {
        self.label == other.label && self.url == other.url && self.org == other.org
    }

    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub(crate) fn record_click(&mut self, now_millis: u64) {
        self.click_count = self.click_count.saturating_add(1);
        self.click_date = Some(now_millis);
    }

    /// Converts back into the raw exchange form.
    #[must_use]
    pub fn to_data(&self) -> TabData {
        TabData {
            label: Some(self.label.clone()),
            url: Some(self.url.clone()),
            org: self.org.clone(),
            pinned: self.pinned.then_some(true),
            click_count: (self.click_count > 0).then_some(self.click_count),
            click_date: self.click_date,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.org {
            Some(org) => write!(f, "{} ({}) [{}]", self.label, self.url, org),
            None => write!(f, "{} ({})", self.label, self.url),
        }
    }
}

impl TryFrom<TabData> for Tab {
    type Error = Error;

    fn try_from(data: TabData) -> Result<Self> {
        let mut tab = Self::create(
            data.label.as_deref().unwrap_or_default(),
            data.url.as_deref().unwrap_or_default(),
            data.org.as_deref(),
        )?;
        tab.pinned = data.pinned.unwrap_or(false);
        tab.click_count = data.click_count.unwrap_or(0);
        tab.click_date = data.click_date;
        Ok(tab)
    }
}

// ============================================================================
// TabData
// ============================================================================

/// Raw, unvalidated tab shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabData {
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// URL in any form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Org scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Pinned flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    /// Click counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
    /// Last click, unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_date: Option<u64>,
}

impl TabData {
    /// Creates raw data with a label and URL.
    #[must_use]
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Sets the org scope.
    #[inline]
    #[must_use]
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// Sets the pinned flag.
    #[inline]
    #[must_use]
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }
}

// ============================================================================
// TabInput
// ============================================================================

/// Either a validated [`Tab`] or raw [`TabData`] awaiting validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabInput {
    /// Already validated.
    Tab(Tab),
    /// Needs `Tab::try_from`.
    Raw(TabData),
}

impl TabInput {
    /// Returns `true` if this is already a validated tab.
    #[inline]
    #[must_use]
    pub fn is_tab(&self) -> bool {
        matches!(self, Self::Tab(_))
    }

    /// Validates and converts into a [`Tab`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTab`] for raw data failing validation.
    pub fn into_tab(self) -> Result<Tab> {
        match self {
            Self::Tab(tab) => Ok(tab),
            Self::Raw(data) => Tab::try_from(data),
        }
    }
}

impl From<Tab> for TabInput {
    fn from(tab: Tab) -> Self {
        Self::Tab(tab)
    }
}

impl From<TabData> for TabInput {
    fn from(data: TabData) -> Self {
        Self::Raw(data)
    }
}

// ============================================================================
// TabKey & TabQuery
// ============================================================================

/// Full identity of a tab: label, url and org.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabKey {
    /// Label.
    pub label: String,
    /// Minified URL.
    pub url: String,
    /// Org; `None` only matches generic tabs.
    pub org: Option<String>,
}

impl TabKey {
    /// Creates a key.
    #[must_use]
    pub fn new(label: impl Into<String>, url: impl Into<String>, org: Option<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            org,
        }
    }
}

/// Partial lookup by label and/or url, used by move, pin and click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabQuery {
    /// Required label, if any.
    pub label: Option<String>,
    /// Required url, if any.
    pub url: Option<String>,
}

impl TabQuery {
    /// Matches by url.
    #[must_use]
    pub fn by_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Matches by label.
    #[must_use]
    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Additionally requires a label.
    #[inline]
    #[must_use]
    pub fn and_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns `true` when neither field is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.url.is_none()
    }

    /// Returns `true` if every set field matches.
    #[must_use]
    pub fn matches(&self, tab: &Tab) -> bool {
        !self.is_empty()
            && self.label.as_deref().is_none_or(|l| l == tab.label())
            && self.url.as_deref().is_none_or(|u| u == tab.url())
    }
}

impl fmt::Display for TabQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.label, &self.url) {
            (Some(label), Some(url)) => write!(f, "label={label}, url={url}"),
            (Some(label), None) => write!(f, "label={label}"),
            (None, Some(url)) => write!(f, "url={url}"),
            (None, None) => f.write_str("<empty>"),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Structural check on untrusted JSON.
///
/// True iff `label` and `url` are non-empty strings and `org`, when
/// present, is a string or `null`.
#[must_use]
pub fn is_valid(candidate: &Value) -> bool {
    let non_empty = |field: &str| {
        candidate
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };

    candidate.is_object()
        && non_empty("label")
        && non_empty("url")
        && candidate
            .get("org")
            .is_none_or(|org| org.is_string() || org.is_null())
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_trims_and_minifies() {
        let tab = Tab::create(
            "  Users ",
            "https://acme.my.salesforce-setup.com/lightning/setup/ManageUsers/home",
            None,
        )
        .expect("valid");

        assert_eq!(tab.label(), "Users");
        assert_eq!(tab.url(), "ManageUsers");
        assert_eq!(tab.org(), None);
        assert!(!tab.is_pinned());
    }

    #[test]
    fn test_create_extracts_org_for_record_urls() {
        let tab = Tab::create(
            "Acme account",
            "https://acme.lightning.force.com/lightning/r/Account/001000000000001AAA/view",
            None,
        )
        .expect("valid");

        assert_eq!(tab.org(), Some("acme"));
        assert_eq!(tab.url(), "/lightning/r/Account/001000000000001AAA/view");
    }

    #[test]
    fn test_explicit_org_wins() {
        let tab = Tab::create(
            "x",
            "https://acme.lightning.force.com/lightning/r/Account/001000000000001AAA/view",
            Some("other"),
        )
        .expect("valid");
        assert_eq!(tab.org(), Some("other"));

        let blank = Tab::create("x", "y", Some("  ")).expect("valid");
        assert_eq!(blank.org(), None);
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        assert!(matches!(
            Tab::create(" ", "url", None),
            Err(Error::InvalidTab { .. })
        ));
        assert!(matches!(
            Tab::create("label", "", None),
            Err(Error::InvalidTab { .. })
        ));
    }

    #[test]
    fn test_equality_ignores_pin_and_clicks() {
        let a = Tab::create("a", "b", Some("org")).expect("valid");
        let mut b = a.clone().with_pinned(true);
        b.record_click(10);

        assert!(a.equals_by_tab(&b));
        assert!(a.equals_by_data(&TabKey::new("a", "b", Some("org".into()))));
        assert!(!a.equals_by_data(&TabKey::new("a", "b", None)));
        assert!(!a.equals_by_data(&TabKey::new("A", "b", Some("org".into()))));
    }

    #[test]
    fn test_deserialize_validates() {
        let tab: Tab = serde_json::from_value(json!({
            "label": "Users",
            "url": "ManageUsers",
            "pinned": true,
            "clickCount": 3
        }))
        .expect("valid");
        assert!(tab.is_pinned());
        assert_eq!(tab.click_count(), 3);

        let invalid = serde_json::from_value::<Tab>(json!({"label": "", "url": "x"}));
        assert!(invalid.is_err());
    }

    #[test]
    fn test_serialize_skips_defaults() {
        let tab = Tab::create("a", "b", None).expect("valid");
        assert_eq!(
            serde_json::to_value(&tab).expect("serialize"),
            json!({"label": "a", "url": "b"})
        );
    }

    #[test]
    fn test_tab_input_branding() {
        let raw = TabInput::from(TabData::new("a", "b"));
        assert!(!raw.is_tab());

        let tab = raw.into_tab().expect("valid");
        assert!(TabInput::from(tab).is_tab());

        assert!(TabInput::from(TabData::default()).into_tab().is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(&json!({"label": "a", "url": "b"})));
        assert!(is_valid(&json!({"label": "a", "url": "b", "org": null})));
        assert!(is_valid(&json!({"label": "a", "url": "b", "org": "acme"})));
        assert!(!is_valid(&json!({"label": "a"})));
        assert!(!is_valid(&json!({"label": " ", "url": "b"})));
        assert!(!is_valid(&json!({"label": "a", "url": "b", "org": 3})));
        assert!(!is_valid(&json!(["a", "b"])));
    }

    #[test]
    fn test_query_matching() {
        let tab = Tab::create("Flows", "Flows", None).expect("valid");

        assert!(TabQuery::by_url("Flows").matches(&tab));
        assert!(TabQuery::by_label("Flows").matches(&tab));
        assert!(TabQuery::by_url("Flows").and_label("Flows").matches(&tab));
        assert!(!TabQuery::by_url("Flows").and_label("Other").matches(&tab));
        assert!(!TabQuery::default().matches(&tab));
        assert_eq!(TabQuery::by_url("c").to_string(), "url=c");
    }
}
