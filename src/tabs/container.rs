//! The tab collection of one execution context.
//!
//! [`TabContainer`] is an in-memory cache of the tab list persisted by the
//! background store. Mutations are applied locally and pushed to the store
//! as a full-list `set`; the list the store keeps becomes the new local
//! state.
//!
//! # Invariants
//!
//! - No two tabs are equal by data (label, url, org).
//! - Pinned tabs form a contiguous prefix; moves never cross the boundary.
//! - Mutations on one container run one at a time, from the local change
//!   through the store's reply.
//!
//! # Example
//!
//! ```ignore
//! let tabs = context.tab_container().await?;
//!
//! tabs.add_tab(TabData::new("Users", "ManageUsers"), true).await?;
//! tabs.move_tab(&TabQuery::by_url("ManageUsers"), MoveOptions::to_front()).await?;
//!
//! let json = tabs.export_tabs()?;
//! tabs.import_tabs(&json, true, true).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::StorageChange;
use crate::protocol::keys::TABS_KEY;
use crate::store::Messenger;

use super::reorder::{ReorderEvent, move_index, region_of};
use super::tab::{Tab, TabData, TabInput, TabKey, TabQuery, is_valid};
use super::url::extract_org_name;

// ============================================================================
// Constants
// ============================================================================

/// Tabs stored when the store holds none.
const DEFAULT_TABS: &[(&str, &str)] = &[
    ("⚡", "/lightning/app/standard__FlowsApp"),
    ("Flows", "Flows"),
    ("Users", "ManageUsers"),
];

// ============================================================================
// Options
// ============================================================================

/// Options for [`TabContainer::replace_tabs`].
///
/// | reset | remove_org | keep_not_this_org | kept before adding |
/// |-------|------------|-------------------|--------------------|
/// | true | true | `None` | nothing |
/// | true | true | `Some(o)` | org tabs of orgs other than `o` |
/// | true | false | - | all org tabs |
/// | false | true | `None` | generic tabs |
/// | false | true | `Some(o)` | everything except tabs of `o` |
/// | false | false | - | everything |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Drop existing tabs before adding.
    pub reset_tabs: bool,
    /// Drop existing org tabs before adding.
    pub remove_org_tabs: bool,
    /// Persist afterwards.
    pub sync: bool,
    /// Org whose tabs are the only org tabs removed.
    pub keep_tabs_not_this_org: Option<String>,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            reset_tabs: true,
            remove_org_tabs: false,
            sync: true,
            keep_tabs_not_this_org: None,
        }
    }
}

impl ReplaceOptions {
    /// Returns `true` if an existing tab survives reconciliation.
    fn keeps(&self, tab: &Tab) -> bool {
        let other_org = self.keep_tabs_not_this_org.as_deref();
        match (self.reset_tabs, self.remove_org_tabs) {
            (true, true) => match other_org {
                None => false,
                Some(org) => tab.org().is_some_and(|o| o != org),
            },
            (true, false) => tab.org().is_some(),
            (false, true) => match other_org {
                None => tab.org().is_none(),
                Some(org) => tab.org() != Some(org),
            },
            (false, false) => true,
        }
    }
}

/// Options for [`TabContainer::move_tab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    /// Move towards the front.
    pub move_before: bool,
    /// Move to the extreme of the region instead of one slot.
    pub full_movement: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            move_before: true,
            full_movement: false,
        }
    }
}

impl MoveOptions {
    /// One slot towards the front.
    #[must_use]
    pub fn left() -> Self {
        Self::default()
    }

    /// One slot towards the back.
    #[must_use]
    pub fn right() -> Self {
        Self {
            move_before: false,
            full_movement: false,
        }
    }

    /// First position of the region.
    #[must_use]
    pub fn to_front() -> Self {
        Self {
            move_before: true,
            full_movement: true,
        }
    }

    /// Last position of the region.
    #[must_use]
    pub fn to_back() -> Self {
        Self {
            move_before: false,
            full_movement: true,
        }
    }
}

/// Sort criteria for [`TabContainer::sort_tabs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive label.
    Label,
    /// Minified URL.
    Url,
    /// Org, generic tabs first.
    Org,
    /// Click counter.
    ClickCount,
    /// Last click, never-clicked first.
    ClickDate,
}

impl SortKey {
    fn compare(self, a: &Tab, b: &Tab) -> Ordering {
        match self {
            Self::Label => a.label().to_lowercase().cmp(&b.label().to_lowercase()),
            Self::Url => a.url().cmp(b.url()),
            Self::Org => a.org().cmp(&b.org()),
            Self::ClickCount => a.click_count().cmp(&b.click_count()),
            Self::ClickDate => a.click_date().cmp(&b.click_date()),
        }
    }
}

// ============================================================================
// TabContainer
// ============================================================================

/// Ordered, de-duplicated tab list mirrored to the store.
///
/// Obtain the context's single instance through
/// [`ExtensionContext::tab_container`](crate::ExtensionContext::tab_container)
/// or [`TabContainer::create`].
pub struct TabContainer {
    /// Ordered tabs; pinned prefix first.
    tabs: RwLock<Vec<Tab>>,
    /// Channel to the background store.
    store: Arc<dyn Messenger>,
    /// Serializes mutate, snapshot and store round trip.
    ops: Mutex<()>,
}

impl fmt::Debug for TabContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tabs = self.tabs.read();
        f.debug_struct("TabContainer")
            .field("len", &tabs.len())
            .field("pinned", &tabs.iter().filter(|t| t.is_pinned()).count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TabContainer - Construction
// ============================================================================

impl TabContainer {
    /// Loads the persisted list, storing the default tabs when it is empty
    /// and `initialize_defaults` is set.
    pub(crate) async fn load(store: Arc<dyn Messenger>, initialize_defaults: bool) -> Result<Self> {
        let container = Self {
            tabs: RwLock::new(Vec::new()),
            store,
            ops: Mutex::new(()),
        };

        container.reload().await?;

        if container.is_empty() && initialize_defaults {
            container.initialize_tabs().await?;
        }

        Ok(container)
    }

    /// Replaces the list with the default tabs and persists it.
    pub async fn initialize_tabs(&self) -> Result<()> {
        let defaults = DEFAULT_TABS
            .iter()
            .map(|(label, url)| Tab::create(label, url, None))
            .collect::<Result<Vec<_>>>()?;

        info!(count = defaults.len(), "Initializing default tabs");
        self.sync_tabs(Some(defaults)).await
    }

    /// Re-reads the list from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn reload(&self) -> Result<()> {
        let _ops = self.ops.lock().await;
        let stored = self.store.get(TABS_KEY).await?;
        let tabs = parse_stored(stored);
        debug!(count = tabs.len(), "Loaded tabs from store");
        *self.tabs.write() = tabs;
        Ok(())
    }

    /// Applies a change broadcast by the store.
    ///
    /// Returns `true` if the change concerned the tab list.
    pub fn apply_storage_change(&self, change: &StorageChange) -> bool {
        if change.key != TABS_KEY {
            return false;
        }
        *self.tabs.write() = parse_stored(change.new_value.clone());
        true
    }

    /// Applies tab list changes made by other contexts until the store's
    /// change channel closes.
    pub fn spawn_change_watcher(
        self: Arc<Self>,
        mut changes: broadcast::Receiver<StorageChange>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let _ops = self.ops.lock().await;

                        // Changes queued while waiting are older than the
                        // newest tab list; only that one is applied.
                        let mut latest = change;
                        while let Ok(next) = changes.try_recv() {
                            if next.key == TABS_KEY || latest.key != TABS_KEY {
                                latest = next;
                            }
                        }

                        if self.apply_storage_change(&latest) {
                            trace!(count = self.len(), "Applied tab list change");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Tab watcher lagged; reloading");
                        if let Err(e) = self.reload().await {
                            warn!(error = %e, "Failed to reload tabs");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            debug!("Tab watcher terminated");
        })
    }
}

// ============================================================================
// TabContainer - Queries
// ============================================================================

impl TabContainer {
    /// Number of tabs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.read().len()
    }

    /// Returns `true` if there are no tabs.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.read().is_empty()
    }

    /// Snapshot of all tabs in display order.
    #[must_use]
    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs.read().clone()
    }

    /// Tab at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Tab> {
        self.tabs.read().get(index).cloned()
    }

    /// Boundary index: the first `pinned_count()` tabs are pinned.
    #[must_use]
    pub fn pinned_count(&self) -> usize {
        pinned_count(&self.tabs.read())
    }

    /// Org-scoped tabs when `want_org_scoped`, generic tabs otherwise.
    #[must_use]
    pub fn get_tabs_with_org(&self, want_org_scoped: bool) -> Vec<Tab> {
        self.filtered(|tab| tab.org().is_some() == want_org_scoped)
    }

    /// Org-scoped tabs whose org equals (or, with `match_org = false`,
    /// differs from) `org`. Generic tabs never match.
    #[must_use]
    pub fn get_tabs_by_org(&self, org: &str, match_org: bool) -> Vec<Tab> {
        self.filtered(|tab| tab.org().is_some_and(|o| (o == org) == match_org))
    }

    /// Generic tabs plus the tabs of `org`, in display order.
    #[must_use]
    pub fn visible_tabs(&self, org: Option<&str>) -> Vec<Tab> {
        self.filtered(|tab| tab.org().is_none() || tab.org() == org)
    }

    /// Tabs visible on the page at `url`.
    #[must_use]
    pub fn visible_tabs_for_url(&self, url: &str) -> Vec<Tab> {
        self.visible_tabs(extract_org_name(url).as_deref())
    }

    /// Returns `true` if a tab with this label, url and org exists.
    #[must_use]
    pub fn tab_exists_by_data(&self, key: &TabKey) -> bool {
        self.tabs.read().iter().any(|tab| tab.equals_by_data(key))
    }

    /// Returns `true` if a tab equal by data to `tab` exists.
    #[must_use]
    pub fn tab_exists_by_tab(&self, tab: &Tab) -> bool {
        self.tabs.read().iter().any(|t| t.equals_by_tab(tab))
    }

    /// Serializes the list as a JSON array of `{label, url, org?}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn export_tabs(&self) -> Result<String> {
        let tabs = self.tabs.read();
        Ok(serde_json::to_string_pretty(&*tabs)?)
    }

    fn filtered(&self, keep: impl Fn(&Tab) -> bool) -> Vec<Tab> {
        self.tabs.read().iter().filter(|t| keep(t)).cloned().collect()
    }
}

// ============================================================================
// TabContainer - Mutations
// ============================================================================

impl TabContainer {
    /// Adds one tab.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTab`] if raw input fails validation
    /// - [`Error::DuplicateTab`] if an equal tab exists; nothing changes
    /// - store errors when `sync` is set
    pub async fn add_tab(&self, tab: impl Into<TabInput>, sync: bool) -> Result<()> {
        let input: TabInput = tab.into();
        let tab = input.into_tab()?;

        let _ops = self.ops.lock().await;
        let payload = {
            let mut tabs = self.tabs.write();
            insert_unique(&mut tabs, tab)?;
            snapshot_if(sync, &tabs)?
        };

        self.push_if(payload).await
    }

    /// Adds many tabs, skipping duplicates, with at most one sync.
    ///
    /// Every input is validated before anything is added.
    ///
    /// Returns the number of tabs added.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTab`] for the first invalid input
    /// - store errors when `sync` is set
    pub async fn add_tabs<I, T>(&self, tabs: I, sync: bool) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: Into<TabInput>,
    {
        let new_tabs = convert_all(tabs)?;

        let _ops = self.ops.lock().await;
        let (added, payload) = {
            let mut tabs = self.tabs.write();
            let added = insert_all(&mut tabs, new_tabs);
            (added, snapshot_if(sync, &tabs)?)
        };

        self.push_if(payload).await?;
        Ok(added)
    }

    /// Removes every tab equal to `key`. Does not sync.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_tabs_by_data(&self, key: &TabKey) -> bool {
        let mut tabs = self.tabs.write();
        let before = tabs.len();
        tabs.retain(|tab| !tab.equals_by_data(key));
        tabs.len() != before
    }

    /// Removes every tab equal by data to `tab`. Does not sync.
    pub fn remove_tabs_by_tab(&self, tab: &Tab) -> bool {
        self.remove_tabs_by_data(&tab.key())
    }

    /// Reconciles existing tabs per `options`, then adds `new_tabs`.
    ///
    /// Returns the number of tabs added.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTab`] if any input is invalid; nothing changes
    /// - store errors when `options.sync` is set
    pub async fn replace_tabs<I, T>(&self, new_tabs: I, options: ReplaceOptions) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
        T: Into<TabInput>,
    {
        let new_tabs = convert_all(new_tabs)?;

        let _ops = self.ops.lock().await;
        let (added, payload) = {
            let mut tabs = self.tabs.write();
            let before = tabs.len();
            tabs.retain(|tab| options.keeps(tab));
            debug!(
                removed = before - tabs.len(),
                incoming = new_tabs.len(),
                ?options,
                "Replacing tabs"
            );
            let added = insert_all(&mut tabs, new_tabs);
            (added, snapshot_if(options.sync, &tabs)?)
        };

        self.push_if(payload).await?;
        Ok(added)
    }

    /// Pushes the full list to the store.
    ///
    /// With `Some(tabs)`, the local list is replaced first. The list the
    /// store returns becomes the local state.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn sync_tabs(&self, tabs: Option<Vec<Tab>>) -> Result<()> {
        let _ops = self.ops.lock().await;
        let payload = {
            let mut current = self.tabs.write();
            if let Some(tabs) = tabs {
                *current = normalize(tabs);
            }
            serde_json::to_value(&*current)?
        };

        self.push(payload).await
    }

    /// Moves one tab within its region and syncs.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for an empty query
    /// - [`Error::TabNotFound`] if nothing matches
    /// - store errors
    pub async fn move_tab(&self, query: &TabQuery, options: MoveOptions) -> Result<()> {
        let _ops = self.ops.lock().await;
        let payload = {
            let mut tabs = self.tabs.write();
            let index = find(&tabs, query)?;
            let region = region_of(index, pinned_count(&tabs), tabs.len());
            let last = region.end - 1;

            let target = match (options.full_movement, options.move_before) {
                (true, true) => region.start,
                (true, false) => last,
                (false, true) => index.saturating_sub(1).max(region.start),
                (false, false) => (index + 1).min(last),
            };

            debug!(%query, from = index, to = target, "Moving tab");
            move_index(&mut *tabs, index, target);
            serde_json::to_value(&*tabs)?
        };

        self.push(payload).await
    }

    /// Applies a planned drag-and-drop reorder and syncs.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if indices are out of range or the move
    ///   crosses the pinned boundary
    /// - store errors
    pub async fn apply_reorder(&self, event: &ReorderEvent) -> Result<()> {
        let _ops = self.ops.lock().await;
        let payload = {
            let mut tabs = self.tabs.write();
            let len = tabs.len();
            if event.from >= len || event.to >= len {
                return Err(Error::invalid_argument(format!(
                    "reorder {} → {} outside of {len} tabs",
                    event.from, event.to
                )));
            }

            let region = region_of(event.from, pinned_count(&tabs), len);
            if !region.contains(&event.to) {
                return Err(Error::invalid_argument(format!(
                    "reorder {} → {} crosses the pinned boundary",
                    event.from, event.to
                )));
            }

            debug!(container = %event.container, from = event.from, to = event.to, "Applying reorder");
            move_index(&mut *tabs, event.from, event.to);
            serde_json::to_value(&*tabs)?
        };

        self.push(payload).await
    }

    /// Pins a tab, moving it to the end of the pinned region.
    ///
    /// Returns `false` (and does not sync) if it was already pinned.
    pub async fn pin_tab(&self, query: &TabQuery) -> Result<bool> {
        self.set_pinned(query, true).await
    }

    /// Unpins a tab, moving it to the start of the unpinned region.
    ///
    /// Returns `false` (and does not sync) if it was not pinned.
    pub async fn unpin_tab(&self, query: &TabQuery) -> Result<bool> {
        self.set_pinned(query, false).await
    }

    async fn set_pinned(&self, query: &TabQuery, pinned: bool) -> Result<bool> {
        let _ops = self.ops.lock().await;
        let payload = {
            let mut tabs = self.tabs.write();
            let index = find(&tabs, query)?;
            if tabs[index].is_pinned() == pinned {
                return Ok(false);
            }

            let mut tab = tabs.remove(index);
            tab.set_pinned(pinned);
            let boundary = pinned_count(&tabs);
            tabs.insert(boundary, tab);
            serde_json::to_value(&*tabs)?
        };

        self.push(payload).await?;
        Ok(true)
    }

    /// Records a click on a tab and syncs.
    pub async fn record_click(&self, query: &TabQuery) -> Result<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_millis)
            .unwrap_or_default();

        let _ops = self.ops.lock().await;
        let payload = {
            let mut tabs = self.tabs.write();
            let index = find(&tabs, query)?;
            tabs[index].record_click(now);
            serde_json::to_value(&*tabs)?
        };

        self.push(payload).await
    }

    /// Sorts each region independently and syncs.
    pub async fn sort_tabs(&self, key: SortKey, descending: bool) -> Result<()> {
        let _ops = self.ops.lock().await;
        let payload = {
            let mut tabs = self.tabs.write();
            let boundary = pinned_count(&tabs);
            let (pinned, unpinned) = tabs.split_at_mut(boundary);

            for region in [pinned, unpinned] {
                region.sort_by(|a, b| {
                    let ordering = key.compare(a, b);
                    if descending { ordering.reverse() } else { ordering }
                });
            }
            serde_json::to_value(&*tabs)?
        };

        self.push(payload).await
    }

    /// Sends a snapshot to the store and adopts the stored list.
    ///
    /// Callers hold `ops` from the mutation that produced `payload` until
    /// this returns.
    async fn push(&self, payload: Value) -> Result<()> {
        let stored = self.store.set(TABS_KEY, payload).await?;
        let tabs = parse_stored(stored);
        debug!(count = tabs.len(), "Synced tabs");
        *self.tabs.write() = tabs;
        Ok(())
    }

    async fn push_if(&self, payload: Option<Value>) -> Result<()> {
        match payload {
            Some(payload) => self.push(payload).await,
            None => Ok(()),
        }
    }

    /// Imports tabs from a JSON array.
    ///
    /// All-or-nothing: every element is validated before anything changes.
    /// Delegates to [`replace_tabs`](Self::replace_tabs) with
    /// `remove_org_tabs = !preserve_other_org`.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not JSON
    /// - [`Error::InvalidImport`] listing every invalid element
    /// - store errors
    pub async fn import_tabs(
        &self,
        json: &str,
        reset_tabs: bool,
        preserve_other_org: bool,
    ) -> Result<usize> {
        let parsed: Value = serde_json::from_str(json)?;
        let Value::Array(items) = parsed else {
            return Err(Error::invalid_import(vec![
                "expected a JSON array of tabs".to_string(),
            ]));
        };

        let mut invalid = Vec::new();
        let mut tabs = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            if !is_valid(&item) {
                invalid.push(format!("#{index}: {item}"));
                continue;
            }

            match serde_json::from_value::<TabData>(item)
                .map_err(Error::from)
                .and_then(Tab::try_from)
            {
                Ok(tab) => tabs.push(tab),
                Err(e) => invalid.push(format!("#{index}: {e}")),
            }
        }

        if !invalid.is_empty() {
            warn!(invalid = invalid.len(), "Rejected tab import");
            return Err(Error::invalid_import(invalid));
        }

        info!(count = tabs.len(), reset_tabs, preserve_other_org, "Importing tabs");

        self.replace_tabs(
            tabs,
            ReplaceOptions {
                reset_tabs,
                remove_org_tabs: !preserve_other_org,
                sync: true,
                keep_tabs_not_this_org: None,
            },
        )
        .await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn pinned_count(tabs: &[Tab]) -> usize {
    tabs.iter().take_while(|t| t.is_pinned()).count()
}

fn find(tabs: &[Tab], query: &TabQuery) -> Result<usize> {
    if query.is_empty() {
        return Err(Error::invalid_argument("tab query needs a label or url"));
    }
    tabs.iter()
        .position(|tab| query.matches(tab))
        .ok_or_else(|| Error::tab_not_found(query.to_string()))
}

fn convert_all<I, T>(tabs: I) -> Result<Vec<Tab>>
where
    I: IntoIterator<Item = T>,
    T: Into<TabInput>,
{
    tabs.into_iter()
        .map(|t| Into::<TabInput>::into(t).into_tab())
        .collect()
}

/// Inserts a tab, pinned ones at the end of the pinned region.
fn insert_unique(tabs: &mut Vec<Tab>, tab: Tab) -> Result<()> {
    if tabs.iter().any(|t| t.equals_by_tab(&tab)) {
        return Err(Error::duplicate_tab(
            tab.label(),
            tab.url(),
            tab.org().map(str::to_string),
        ));
    }

    if tab.is_pinned() {
        let boundary = pinned_count(tabs);
        tabs.insert(boundary, tab);
    } else {
        tabs.push(tab);
    }
    Ok(())
}

/// Inserts tabs, skipping duplicates. Returns the number inserted.
fn insert_all(tabs: &mut Vec<Tab>, new_tabs: Vec<Tab>) -> usize {
    let mut added = 0;
    for tab in new_tabs {
        match insert_unique(tabs, tab) {
            Ok(()) => added += 1,
            Err(e) => debug!(error = %e, "Skipping tab"),
        }
    }
    added
}

/// Serializes the list when `sync` is set.
fn snapshot_if(sync: bool, tabs: &[Tab]) -> Result<Option<Value>> {
    if !sync {
        return Ok(None);
    }
    Ok(Some(serde_json::to_value(tabs)?))
}

/// Drops duplicates (first wins) and moves pinned tabs to the front.
fn normalize(tabs: Vec<Tab>) -> Vec<Tab> {
    let mut seen = FxHashSet::default();
    let (mut pinned, unpinned): (Vec<Tab>, Vec<Tab>) = tabs
        .into_iter()
        .filter(|tab| {
            let fresh = seen.insert(tab.key());
            if !fresh {
                warn!(tab = %tab, "Dropping duplicate tab");
            }
            fresh
        })
        .partition(Tab::is_pinned);

    pinned.extend(unpinned);
    pinned
}

/// Parses the stored tab list, skipping entries that fail validation.
fn parse_stored(value: Value) -> Vec<Tab> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            warn!("Stored tabs are not an array; ignoring");
        }
        return Vec::new();
    };

    let tabs = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Tab>(item) {
            Ok(tab) => Some(tab),
            Err(e) => {
                warn!(error = %e, "Skipping invalid stored tab");
                None
            }
        })
        .collect();

    normalize(tabs)
}

// ============================================================================
// Tests
// ============================================================================
