//! Execution contexts.
//!
//! Every part of the extension (background page, popup, content script,
//! options page) runs as its own [`ExtensionContext`]. A context owns at
//! most one [`TabContainer`] and one [`TranslationService`]; both reach the
//! shared state only through the store.
//!
//! # Lifecycle
//!
//! ```text
//! ContextBuilder ──build()──► ExtensionContext
//!                                 │
//!                                 ├─ tab_container()        lazy, shared
//!                                 ├─ TabContainer::create() once, else error
//!                                 ├─ translation_service()  lazy, shared
//!                                 └─ start_watchers()       follow store changes
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `active_tab` | Browser tab lookup with bounded retry |
//! | `builder` | [`ContextBuilder`] |
//! | `options` | [`RuntimeOptions`] |

// ============================================================================
// Submodules
// ============================================================================

/// Active browser tab lookup.
pub mod active_tab;

/// Context builder.
pub mod builder;

/// Runtime options.
pub mod options;

mod slot;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Error, Result};
use crate::i18n::{LocaleSource, TranslationService};
use crate::protocol::StorageChange;
use crate::store::{Messenger, StoreHandle};
use crate::tabs::TabContainer;

use self::slot::SingletonSlot;

// ============================================================================
// Re-exports
// ============================================================================

pub use active_tab::{ACTIVE_TAB_ATTEMPTS, ActiveTab, ActiveTabLocator, find_active_tab};
pub use builder::ContextBuilder;
pub use options::RuntimeOptions;

// ============================================================================
// ContextKind
// ============================================================================

/// Which part of the extension a context runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Background page; usually also hosts the store.
    #[default]
    Background,
    /// Toolbar popup.
    Popup,
    /// Script injected into Salesforce pages.
    ContentScript,
    /// Options page.
    Options,
}

impl ContextKind {
    /// Short name for logs.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Popup => "popup",
            Self::ContentScript => "content-script",
            Self::Options => "options",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ExtensionContext
// ============================================================================

/// One execution context and its components.
pub struct ExtensionContext {
    kind: ContextKind,
    store: Arc<dyn Messenger>,
    /// Present when the built-in store is used; source of change events.
    store_handle: Option<StoreHandle>,
    locales: Arc<dyn LocaleSource>,
    active_tab: Option<Arc<dyn ActiveTabLocator>>,
    options: RuntimeOptions,
    tabs: SingletonSlot<TabContainer>,
    translations: SingletonSlot<TranslationService>,
}

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("tabs", &self.tabs.get().is_some())
            .field("translations", &self.translations.get().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ExtensionContext - Construction
// ============================================================================

impl ExtensionContext {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub(crate) fn new(
        kind: ContextKind,
        store: Arc<dyn Messenger>,
        store_handle: Option<StoreHandle>,
        locales: Arc<dyn LocaleSource>,
        active_tab: Option<Arc<dyn ActiveTabLocator>>,
        options: RuntimeOptions,
    ) -> Self {
        debug!(%kind, "Extension context created");
        Self {
            kind,
            store,
            store_handle,
            locales,
            active_tab,
            options,
            tabs: SingletonSlot::new("TabContainer"),
            translations: SingletonSlot::new("TranslationService"),
        }
    }
}

// ============================================================================
// ExtensionContext - Accessors
// ============================================================================

impl ExtensionContext {
    /// Context kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Runtime options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Store channel.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Messenger> {
        &self.store
    }

    /// Subscribes to store changes; `None` with a custom messenger.
    #[must_use]
    pub fn subscribe_changes(&self) -> Option<broadcast::Receiver<StorageChange>> {
        self.store_handle.as_ref().map(StoreHandle::subscribe)
    }

    /// The context's tab container, loaded on first use.
    ///
    /// # Errors
    ///
    /// Propagates store failures of the first load.
    pub async fn tab_container(&self) -> Result<Arc<TabContainer>> {
        self.tabs.get_or_try_init(|| self.load_tabs()).await
    }

    /// The context's translation service, initialized on first use.
    ///
    /// # Errors
    ///
    /// Propagates initialization failures; the next call retries.
    pub async fn translation_service(&self) -> Result<Arc<TranslationService>> {
        self.translations
            .get_or_try_init(|| self.load_translations())
            .await
    }

    /// Org of the page in the active browser tab.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if no locator was configured
    /// - [`Error::ActiveTabNotFound`] if the lookup keeps failing
    pub async fn current_org(&self) -> Result<Option<String>> {
        let locator = self.active_tab.as_deref().ok_or_else(|| {
            Error::invalid_argument("no active tab locator. Use .active_tab_locator() to set it.")
        })?;

        let tab = find_active_tab(locator).await?;
        Ok(tab.org())
    }

    /// Keeps the tab container and page translations in step with writes
    /// made by other contexts.
    ///
    /// Returns no handles with a custom messenger.
    ///
    /// # Errors
    ///
    /// Propagates construction failures of either component.
    pub async fn start_watchers(&self) -> Result<Vec<JoinHandle<()>>> {
        let Some(handle) = &self.store_handle else {
            return Ok(Vec::new());
        };

        let tabs = self.tab_container().await?;
        let translations = self.translation_service().await?;

        Ok(vec![
            tabs.spawn_change_watcher(handle.subscribe()),
            translations.spawn_language_watcher(handle.subscribe()),
        ])
    }

    async fn load_tabs(&self) -> Result<TabContainer> {
        TabContainer::load(Arc::clone(&self.store), self.options.initialize_default_tabs).await
    }

    async fn load_translations(&self) -> Result<TranslationService> {
        let service = TranslationService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.locales),
            &self.options,
        );
        service.initialize().await?;
        Ok(service)
    }
}

// ============================================================================
// Factories
// ============================================================================

impl TabContainer {
    /// Constructs the tab container of `context`.
    ///
    /// # Errors
    ///
    /// - [`Error::SingleInstanceViolation`] if the context already has one
    /// - store failures of the first load
    pub async fn create(context: &ExtensionContext) -> Result<Arc<Self>> {
        context.tabs.create(|| context.load_tabs()).await
    }
}

impl TranslationService {
    /// Constructs and initializes the translation service of `context`.
    ///
    /// # Errors
    ///
    /// - [`Error::SingleInstanceViolation`] if the context already has one
    /// - initialization failures
    pub async fn create(context: &ExtensionContext) -> Result<Arc<Self>> {
        context
            .translations
            .create(|| context.load_translations())
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::i18n::StaticSource;
    use crate::protocol::keys::{PICKED_LANGUAGE, SETTINGS_KEY, TABS_KEY};
    use crate::store::{BackgroundStore, StoreOptions};
    use crate::tabs::TabData;

    fn locales() -> StaticSource {
        StaticSource::new()
            .with_messages("en", [("save", "Save")])
            .with_messages("de", [("save", "Speichern")])
    }

    async fn context(kind: ContextKind, store: &StoreHandle) -> ExtensionContext {
        ExtensionContext::builder()
            .kind(kind)
            .store(store.clone())
            .locales(locales())
            .build()
            .expect("build")
    }

    struct FixedTab(&'static str);

    #[async_trait]
    impl ActiveTabLocator for FixedTab {
        async fn query_active_tab(&self) -> Result<Option<ActiveTab>> {
            Ok(Some(ActiveTab {
                id: 1,
                url: self.0.to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn test_accessor_returns_shared_instance() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let ctx = context(ContextKind::Popup, &store).await;

        let a = ctx.tab_container().await.expect("a");
        let b = ctx.tab_container().await.expect("b");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 3);
    }

    #[tokio::test]
    async fn test_second_construction_fails() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let ctx = context(ContextKind::Popup, &store).await;

        let created = TabContainer::create(&ctx).await.expect("first");
        let err = TabContainer::create(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::SingleInstanceViolation { .. }));
        assert!(Arc::ptr_eq(&created, &ctx.tab_container().await.expect("shared")));

        ctx.translation_service().await.expect("lazy");
        assert!(matches!(
            TranslationService::create(&ctx).await,
            Err(Error::SingleInstanceViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_contexts_are_independent() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let popup = context(ContextKind::Popup, &store).await;
        let options_page = context(ContextKind::Options, &store).await;

        TabContainer::create(&popup).await.expect("popup");
        TabContainer::create(&options_page).await.expect("options");
    }

    #[tokio::test]
    async fn test_defaults_can_be_disabled() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let ctx = ExtensionContext::builder()
            .store(store.clone())
            .options(RuntimeOptions::new().without_default_tabs())
            .build()
            .expect("build");

        assert!(ctx.tab_container().await.expect("tabs").is_empty());
        assert_eq!(store.get(TABS_KEY).await.expect("get"), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_translation_service_uses_picked_language() {
        let store = BackgroundStore::spawn(StoreOptions::new().with_value(
            SETTINGS_KEY,
            json!([{"id": PICKED_LANGUAGE, "enabled": "de"}]),
        ))
        .await
        .expect("spawn");
        let ctx = context(ContextKind::Popup, &store).await;

        let service = ctx.translation_service().await.expect("service");
        assert_eq!(service.translate("save"), "Speichern");
    }

    #[tokio::test]
    async fn test_translation_service_without_locales_fails() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let ctx = ExtensionContext::builder().store(store).build().expect("build");

        assert!(matches!(
            ctx.translation_service().await,
            Err(Error::LocaleNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_current_org() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let ctx = ExtensionContext::builder()
            .store(store.clone())
            .active_tab_locator(FixedTab(
                "https://acme.my.salesforce-setup.com/lightning/setup/Flows/home",
            ))
            .build()
            .expect("build");
        assert_eq!(ctx.current_org().await.expect("org").as_deref(), Some("acme"));

        let bare = context(ContextKind::Popup, &store).await;
        assert!(matches!(
            bare.current_org().await,
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_watchers_follow_other_contexts() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let popup = context(ContextKind::Popup, &store).await;
        let options_page = context(ContextKind::Options, &store).await;

        let handles = popup.start_watchers().await.expect("watchers");
        assert_eq!(handles.len(), 2);

        let popup_tabs = popup.tab_container().await.expect("popup tabs");
        let options_tabs = options_page.tab_container().await.expect("options tabs");
        options_tabs
            .add_tab(TabData::new("Profiles", "EnhancedProfiles"), true)
            .await
            .expect("add");

        tokio::time::timeout(Duration::from_secs(5), async {
            while popup_tabs.len() != options_tabs.len() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("popup caught up");

        for handle in handles {
            handle.abort();
        }
    }
}
