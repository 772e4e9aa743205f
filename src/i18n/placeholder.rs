//! `$name` placeholder expansion.
//!
//! A message may reference other messages by key with a `$` sigil:
//!
//! ```text
//! greeting = "Hello"        name     = "$title $lastname"
//! title    = "Dr."          lastname = "Smith"
//!
//! "$greeting $name"  →  "Hello Dr. Smith"
//! ```
//!
//! Expansion is recursive. A reference that points back to a key already
//! being expanded, or that nests deeper than `max_depth`, stays as its raw
//! `$name` text.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

// ============================================================================
// Constants
// ============================================================================

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Placeholder sigil.
pub const SIGIL: char = '$';

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z0-9_]+)").expect("placeholder pattern is valid"));

// ============================================================================
// Public API
// ============================================================================

/// Returns `true` if `text` references at least one placeholder.
#[inline]
#[must_use]
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Expands every placeholder of `message`.
///
/// `origin` is the key `message` belongs to, if any; it counts as already
/// visited. `lookup` returns the raw message for a key.
#[must_use]
pub fn expand<F>(message: &str, origin: Option<&str>, lookup: F, max_depth: usize) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut visited: Vec<String> = origin.map(str::to_string).into_iter().collect();
    expand_inner(message, &lookup, &mut visited, max_depth)
}

// ============================================================================
// Helpers
// ============================================================================

fn expand_inner<F>(text: &str, lookup: &F, visited: &mut Vec<String>, max_depth: usize) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !has_placeholders(text) {
        return text.to_string();
    }

    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let raw = caps[0].to_string();
            let name = &caps[1];

            if visited.iter().any(|v| v == name) {
                warn!(placeholder = name, chain = ?visited, "Cyclic placeholder left unexpanded");
                return raw;
            }
            if visited.len() > max_depth {
                warn!(placeholder = name, max_depth, "Placeholder nesting too deep");
                return raw;
            }

            let Some(value) = lookup(name) else {
                return raw;
            };

            visited.push(name.to_string());
            let expanded = expand_inner(&value, lookup, visited, max_depth);
            visited.pop();
            expanded
        })
        .into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_nested_expansion() {
        let lookup = table(&[
            ("greeting", "Hello"),
            ("name", "$title $lastname"),
            ("title", "Dr."),
            ("lastname", "Smith"),
        ]);

        assert_eq!(
            expand("$greeting $name", None, lookup, DEFAULT_MAX_DEPTH),
            "Hello Dr. Smith"
        );
    }

    #[test]
    fn test_unknown_placeholder_stays_raw() {
        let lookup = table(&[("a", "A")]);
        assert_eq!(expand("$a and $b", None, lookup, DEFAULT_MAX_DEPTH), "A and $b");
    }

    #[test]
    fn test_self_reference_terminates() {
        let lookup = table(&[("loop", "again $loop")]);
        assert_eq!(
            expand("again $loop", Some("loop"), lookup, DEFAULT_MAX_DEPTH),
            "again $loop"
        );
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let lookup = table(&[("a", "[$b]"), ("b", "($a)")]);
        assert_eq!(expand("$a", None, lookup, DEFAULT_MAX_DEPTH), "[($a)]");
    }

    #[test]
    fn test_depth_limit() {
        let lookup = table(&[("d0", "$d1"), ("d1", "$d2"), ("d2", "$d3"), ("d3", "end")]);
        assert_eq!(expand("$d0", None, &lookup, 8), "end");
        assert_eq!(expand("$d0", None, &lookup, 1), "$d2");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert!(!has_placeholders("no sigil here, $ alone"));
        assert_eq!(expand("plain", None, |_| None, 0), "plain");
    }
}
