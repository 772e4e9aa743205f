//! Drag-and-drop reorder planning.
//!
//! A drop is described by the row the user picked up (`from`) and the row
//! it was released on (`to`). Drops never change pinned status: a drop that
//! would cross the pinned/unpinned boundary lands on the boundary row of the
//! source's own region instead.
//!
//! ```text
//!  pinned_count = 2
//!
//!  0 [P] ─┐
//!  1 [P]  │ drag 0 → 4 lands on 1 (last pinned row)
//!  ─────  │
//!  2 [ ]  │ drag 4 → 0 lands on 2 (first unpinned row)
//!  3 [ ]  │
//!  4 [ ] ─┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// ReorderEvent
// ============================================================================

/// A validated reorder, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEvent {
    /// Name of the list the drop happened in.
    pub container: String,
    /// Source index.
    pub from: usize,
    /// Destination index, already clamped to the source's region.
    pub to: usize,
}

// ============================================================================
// DropPlan
// ============================================================================

/// Turns raw drop coordinates into a [`ReorderEvent`].
pub struct DropPlan;

impl DropPlan {
    /// Plans a drop.
    ///
    /// Returns `Ok(None)` when the drop does not move anything, including
    /// a cross-boundary drop that clamps back onto its own row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if an index is out of range.
    pub fn plan(
        container: impl Into<String>,
        from: usize,
        to: usize,
        pinned_count: usize,
        len: usize,
    ) -> Result<Option<ReorderEvent>> {
        if from >= len || to >= len {
            return Err(Error::invalid_argument(format!(
                "drop {from} → {to} outside of {len} rows"
            )));
        }

        let to = clamp_to_region(from, to, pinned_count.min(len), len);
        if to == from {
            return Ok(None);
        }

        Ok(Some(ReorderEvent {
            container: container.into(),
            from,
            to,
        }))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Index range of the region (pinned or unpinned) containing `index`.
pub(crate) fn region_of(index: usize, pinned_count: usize, len: usize) -> Range<usize> {
    if index < pinned_count {
        0..pinned_count
    } else {
        pinned_count..len
    }
}

/// Clamps `to` into the region of `from`.
pub(crate) fn clamp_to_region(from: usize, to: usize, pinned_count: usize, len: usize) -> usize {
    let region = region_of(from, pinned_count, len);
    to.clamp(region.start, region.end.saturating_sub(1))
}

/// Moves the element at `from` so that it ends up at `to`.
pub(crate) fn move_index<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_drop() {
        let event = DropPlan::plan("tabs", 4, 2, 0, 5).expect("plan").expect("moves");
        assert_eq!(
            event,
            ReorderEvent {
                container: "tabs".into(),
                from: 4,
                to: 2
            }
        );
    }

    #[test]
    fn test_pinned_drop_clamps_to_last_pinned_row() {
        let event = DropPlan::plan("tabs", 0, 4, 2, 5).expect("plan").expect("moves");
        assert_eq!(event.to, 1);
    }

    #[test]
    fn test_unpinned_drop_clamps_to_first_unpinned_row() {
        let event = DropPlan::plan("tabs", 4, 0, 2, 5).expect("plan").expect("moves");
        assert_eq!(event.to, 2);
    }

    #[test]
    fn test_clamped_onto_itself_is_noop() {
        assert_eq!(DropPlan::plan("tabs", 1, 3, 2, 5).expect("plan"), None);
        assert_eq!(DropPlan::plan("tabs", 2, 0, 2, 5).expect("plan"), None);
        assert_eq!(DropPlan::plan("tabs", 3, 3, 0, 5).expect("plan"), None);
    }

    #[test]
    fn test_out_of_range() {
        assert!(DropPlan::plan("tabs", 5, 0, 0, 5).is_err());
        assert!(DropPlan::plan("tabs", 0, 5, 0, 5).is_err());
    }

    #[test]
    fn test_move_index() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        move_index(&mut items, 2, 1);
        assert_eq!(items, vec!['a', 'c', 'b', 'd', 'e']);

        move_index(&mut items, 0, 4);
        assert_eq!(items, vec!['c', 'b', 'd', 'e', 'a']);
    }
}
