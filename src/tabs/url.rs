//! URL normalization for org pages.
//!
//! Tabs store URLs in a minified form that is unambiguous within an org:
//!
//! | Full URL | Minified |
//! |----------|----------|
//! | `https://acme.my.salesforce-setup.com/lightning/setup/ManageUsers/home` | `ManageUsers` |
//! | `https://acme.my.salesforce-setup.com/lightning/setup/Flows/page?x=1` | `Flows/page?x=1` |
//! | `https://acme.lightning.force.com/lightning/o/Account/list` | `/lightning/o/Account/list` |
//! | `https://example.com/docs` | `https://example.com/docs` |
//!
//! [`expand_url`] rebuilds the full URL against a context page:
//! `expand_url(&minify_url(u), ctx) == canonical_url(u)` for every org URL
//! `u` sharing `ctx`'s origin.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of Setup pages.
const SETUP_PREFIX: &str = "/lightning/setup/";

/// Suffix of Setup root pages.
const HOME_SUFFIX: &str = "/home";

/// Host suffixes of org domains, most specific first.
const ORG_DOMAIN_SUFFIXES: &[&str] = &[
    ".my.salesforce-setup.com",
    ".lightning.force.com",
    ".my.salesforce.com",
    ".my.site.com",
    ".salesforce-setup.com",
    ".salesforce.com",
    ".force.com",
];

/// 15 or 18 character record id, delimited by `/ = ? &` or the string ends.
static RECORD_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[/=?&])(?:[a-zA-Z0-9]{18}|[a-zA-Z0-9]{15})(?:$|[/=?&])")
        .expect("record id pattern is valid")
});

// ============================================================================
// Public API
// ============================================================================

/// Reduces a URL to its shortest form within the org.
///
/// Absolute URLs on non-org hosts are returned trimmed but otherwise
/// unchanged.
#[must_use]
pub fn minify_url(url: &str) -> String {
    let trimmed = url.trim();

    match Url::parse(trimmed) {
        Ok(parsed) if parsed.host_str().is_some_and(is_org_host) => {
            minify_path(&path_and_tail(&parsed))
        }
        Ok(_) => trimmed.to_string(),
        Err(_) if trimmed.starts_with('/') => minify_path(trimmed),
        Err(_) if trimmed.is_empty() => String::new(),
        Err(_) => minify_path(&format!("{SETUP_PREFIX}{trimmed}")),
    }
}

/// Rebuilds a full URL from a minified one.
///
/// `context_url` is any page of the target org; its origin is used.
/// Absolute URLs are returned unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `context_url` has no origin.
pub fn expand_url(mini_url: &str, context_url: &str) -> Result<String> {
    let mini = mini_url.trim();
    if Url::parse(mini).is_ok() {
        return Ok(mini.to_string());
    }

    let origin = origin_of(context_url)?;

    if mini.starts_with('/') {
        return Ok(format!("{origin}{mini}"));
    }

    let (path, tail) = split_tail(mini);
    let home = if tail.is_empty() && !path.contains('/') {
        HOME_SUFFIX
    } else {
        ""
    };

    Ok(format!("{origin}{SETUP_PREFIX}{path}{home}{tail}"))
}

/// Canonical form of an org URL.
///
/// Trailing slashes are dropped and Setup root pages always end in
/// `/home`. Non-org URLs are only trimmed.
#[must_use]
pub fn canonical_url(url: &str) -> String {
    let trimmed = url.trim();
    let Ok(parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    if !parsed.host_str().is_some_and(is_org_host) {
        return trimmed.to_string();
    }

    let origin = parsed.origin().ascii_serialization();
    let full = path_and_tail(&parsed);
    let (path, tail) = split_tail(&full);

    let mut path = path.trim_end_matches('/').to_string();
    if path.is_empty() {
        path.push('/');
    }
    if let Some(rest) = path.strip_prefix(SETUP_PREFIX)
        && !rest.is_empty()
        && !rest.contains('/')
        && tail.is_empty()
    {
        path.push_str(HOME_SUFFIX);
    }

    format!("{origin}{path}{tail}")
}

/// Returns `true` if the URL contains a 15 or 18 character record id.
#[inline]
#[must_use]
pub fn contains_salesforce_id(url: &str) -> bool {
    RECORD_ID.is_match(url)
}

/// Derives the org name from a URL's host.
///
/// `https://acme--uat.sandbox.my.salesforce-setup.com/...` → `acme--uat.sandbox`.
/// Accepts bare hosts. `None` for non-org hosts.
#[must_use]
pub fn extract_org_name(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{trimmed}")).ok())?;

    let host = parsed.host_str()?.to_ascii_lowercase();
    ORG_DOMAIN_SUFFIXES
        .iter()
        .find_map(|suffix| host.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Returns `true` for hosts on an org domain.
#[must_use]
pub fn is_org_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    ORG_DOMAIN_SUFFIXES
        .iter()
        .any(|suffix| host.len() > suffix.len() && host.ends_with(suffix))
}

// ============================================================================
// Helpers
// ============================================================================

/// Path, query and fragment of a parsed URL.
fn path_and_tail(parsed: &Url) -> String {
    let mut out = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Splits `path?query#fragment` into `(path, "?query#fragment")`.
fn split_tail(value: &str) -> (&str, &str) {
    match value.find(['?', '#']) {
        Some(index) => value.split_at(index),
        None => (value, ""),
    }
}

/// Minifies an absolute path (starting with `/`).
fn minify_path(full: &str) -> String {
    let (path, tail) = split_tail(full);
    let path = path.trim_end_matches('/');

    if let Some(rest) = path.strip_prefix(SETUP_PREFIX)
        && !rest.is_empty()
    {
        let rest = match rest.strip_suffix(HOME_SUFFIX) {
            Some(root) if tail.is_empty() && !root.is_empty() && !root.contains('/') => root,
            _ => rest,
        };
        return format!("{rest}{tail}");
    }

    if path.is_empty() {
        format!("/{tail}")
    } else {
        format!("{path}{tail}")
    }
}

/// Origin (`scheme://host[:port]`) of a context URL.
fn origin_of(context_url: &str) -> Result<String> {
    let parsed = Url::parse(context_url.trim())
        .map_err(|e| Error::invalid_argument(format!("context url {context_url:?}: {e}")))?;

    if parsed.host_str().is_none() {
        return Err(Error::invalid_argument(format!(
            "context url {context_url:?} has no host"
        )));
    }

    Ok(parsed.origin().ascii_serialization())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CTX: &str = "https://acme.my.salesforce-setup.com/lightning/setup/SetupOneHome/home";

    #[test]
    fn test_minify_setup_root() {
        assert_eq!(
            minify_url("https://acme.my.salesforce-setup.com/lightning/setup/ManageUsers/home"),
            "ManageUsers"
        );
        assert_eq!(minify_url("/lightning/setup/ManageUsers/home/"), "ManageUsers");
        assert_eq!(minify_url("ManageUsers/home"), "ManageUsers");
        assert_eq!(minify_url("ManageUsers"), "ManageUsers");
    }

    #[test]
    fn test_minify_keeps_deep_setup_paths() {
        assert_eq!(
            minify_url("https://acme.lightning.force.com/lightning/setup/Flows/page?address=%2F300"),
            "Flows/page?address=%2F300"
        );
        assert_eq!(
            minify_url("https://acme.lightning.force.com/lightning/setup/Flows/home?x=1"),
            "Flows/home?x=1"
        );
    }

    #[test]
    fn test_minify_other_org_paths_keep_leading_slash() {
        assert_eq!(
            minify_url("https://acme.lightning.force.com/lightning/o/Account/list"),
            "/lightning/o/Account/list"
        );
        assert_eq!(minify_url("https://acme.my.salesforce.com/"), "/");
    }

    #[test]
    fn test_minify_foreign_urls_untouched() {
        assert_eq!(minify_url(" https://example.com/docs/ "), "https://example.com/docs/");
        assert_eq!(minify_url(""), "");
    }

    #[test]
    fn test_expand() {
        assert_eq!(
            expand_url("ManageUsers", CTX).expect("expand"),
            "https://acme.my.salesforce-setup.com/lightning/setup/ManageUsers/home"
        );
        assert_eq!(
            expand_url("Flows/page?x=1", CTX).expect("expand"),
            "https://acme.my.salesforce-setup.com/lightning/setup/Flows/page?x=1"
        );
        assert_eq!(
            expand_url("/lightning/o/Account/list", CTX).expect("expand"),
            "https://acme.my.salesforce-setup.com/lightning/o/Account/list"
        );
        assert_eq!(
            expand_url("https://example.com", CTX).expect("expand"),
            "https://example.com"
        );
    }

    #[test]
    fn test_expand_requires_context_origin() {
        assert!(expand_url("ManageUsers", "not a url").is_err());
    }

    #[test]
    fn test_canonical_adds_home_to_setup_roots() {
        assert_eq!(
            canonical_url("https://acme.my.salesforce-setup.com/lightning/setup/Flows/"),
            "https://acme.my.salesforce-setup.com/lightning/setup/Flows/home"
        );
        assert_eq!(canonical_url("https://example.com/a/"), "https://example.com/a/");
    }

    #[test]
    fn test_contains_salesforce_id() {
        assert!(contains_salesforce_id("/lightning/r/Account/001000000000001AAA/view"));
        assert!(contains_salesforce_id("/lightning/r/Account/001000000000001/view"));
        assert!(contains_salesforce_id("page?id=001000000000001AAA"));
        assert!(contains_salesforce_id("001000000000001AAA"));
        assert!(!contains_salesforce_id("/lightning/setup/ManageUsers/home"));
        assert!(!contains_salesforce_id("/x/0010000000000012/view"));
    }

    #[test]
    fn test_extract_org_name() {
        assert_eq!(
            extract_org_name("https://acme--uat.sandbox.my.salesforce-setup.com/lightning"),
            Some("acme--uat.sandbox".to_string())
        );
        assert_eq!(
            extract_org_name("acme.lightning.force.com"),
            Some("acme".to_string())
        );
        assert_eq!(
            extract_org_name("https://ACME.my.salesforce.com"),
            Some("acme".to_string())
        );
        assert_eq!(extract_org_name("https://example.com"), None);
        assert_eq!(extract_org_name("ManageUsers"), None);
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9]{1,12}"
    }

    fn org_path() -> impl Strategy<Value = String> {
        prop_oneof![
            segment().prop_map(|s| format!("/lightning/setup/{s}/home")),
            segment().prop_map(|s| format!("/lightning/setup/{s}")),
            (segment(), segment()).prop_map(|(a, b)| format!("/lightning/setup/{a}/{b}/")),
            (segment(), segment()).prop_map(|(a, b)| format!("/lightning/setup/{a}/home?{b}=1")),
            (segment(), segment()).prop_map(|(a, b)| format!("/lightning/o/{a}/{b}")),
            Just("/".to_string()),
            Just("/lightning/setup/".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_expand_is_left_inverse_of_minify(path in org_path()) {
            let url = format!("https://acme.my.salesforce-setup.com{path}");
            let round_trip = expand_url(&minify_url(&url), CTX).expect("expand");
            prop_assert_eq!(round_trip, canonical_url(&url));
        }
    }
}
