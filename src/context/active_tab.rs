//! Active browser tab lookup.
//!
//! The browser may briefly report no active tab (window switching, devtools
//! focus). Lookups are retried a fixed number of times, back to back,
//! before giving up.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::tabs::url::extract_org_name;

// ============================================================================
// Constants
// ============================================================================

/// Lookups performed before [`Error::ActiveTabNotFound`].
pub const ACTIVE_TAB_ATTEMPTS: u32 = 5;

// ============================================================================
// ActiveTab
// ============================================================================

/// The browser tab the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTab {
    /// Browser tab id.
    pub id: u64,
    /// Page URL.
    pub url: String,
}

impl ActiveTab {
    /// Org of the page, if it is an org page.
    #[must_use]
    pub fn org(&self) -> Option<String> {
        extract_org_name(&self.url)
    }
}

// ============================================================================
// ActiveTabLocator
// ============================================================================

/// Queries the browser for the active tab.
#[async_trait]
pub trait ActiveTabLocator: Send + Sync {
    /// One lookup; `Ok(None)` when the browser reports no active tab.
    async fn query_active_tab(&self) -> Result<Option<ActiveTab>>;
}

/// Looks up the active tab, up to [`ACTIVE_TAB_ATTEMPTS`] times.
///
/// # Errors
///
/// Returns [`Error::ActiveTabNotFound`] when every attempt came back empty
/// or failed.
pub async fn find_active_tab(locator: &dyn ActiveTabLocator) -> Result<ActiveTab> {
    for attempt in 1..=ACTIVE_TAB_ATTEMPTS {
        match locator.query_active_tab().await {
            Ok(Some(tab)) => {
                trace!(attempt, tab_id = tab.id, "Active tab found");
                return Ok(tab);
            }
            Ok(None) => trace!(attempt, "No active tab yet"),
            Err(e) => debug!(attempt, error = %e, "Active tab lookup failed"),
        }
    }

    Err(Error::active_tab_not_found(ACTIVE_TAB_ATTEMPTS))
}

// ============================================================================
// Tests
// ============================================================================
