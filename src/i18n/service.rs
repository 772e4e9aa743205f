//! Translation service.
//!
//! [`TranslationService`] owns one message catalog per loaded language and
//! resolves keys through a fallback chain:
//!
//! ```text
//! fr_CA  →  fr  →  en (default)
//! ```
//!
//! Catalogs are loaded on demand, once per language, and kept for the life
//! of the service. Public lookups never fail: an unresolvable key is
//! returned as-is.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, trace, warn};

use crate::context::RuntimeOptions;
use crate::error::{Error, Result};
use crate::identifiers::LanguageCode;
use crate::protocol::Keys;
use crate::protocol::keys::PICKED_LANGUAGE;
use crate::store::Messenger;

use super::catalog::MessageCatalog;
use super::page::PageElement;
use super::placeholder::{SIGIL, expand};
use super::source::LocaleSource;

// ============================================================================
// Types
// ============================================================================

/// Lazily filled catalog slot; one per language.
type CatalogCell = Arc<OnceCell<Arc<MessageCatalog>>>;

/// Lifecycle of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    /// Nothing loaded yet.
    Uninitialized,
    /// A language switch is in progress.
    Loading(LanguageCode),
    /// Translations resolve against this language.
    Ready(LanguageCode),
}

// ============================================================================
// TranslationService
// ============================================================================

/// Per-context translation service.
///
/// Obtain the context's single instance through
/// [`ExtensionContext::translation_service`](crate::ExtensionContext::translation_service)
/// or [`TranslationService::create`].
///
/// # Thread Safety
///
/// All state sits behind `parking_lot` locks that are released before any
/// `.await`; the service can be shared as `Arc<TranslationService>`.
pub struct TranslationService {
    /// Store channel, for the language preference.
    store: Arc<dyn Messenger>,
    /// Message file provider.
    source: Arc<dyn LocaleSource>,
    /// Last link of every fallback chain.
    default_language: LanguageCode,
    /// Placeholder nesting limit.
    max_placeholder_depth: usize,
    /// Loaded catalogs.
    caches: Mutex<FxHashMap<LanguageCode, CatalogCell>>,
    /// Language lookups start from.
    current: RwLock<LanguageCode>,
    /// Lifecycle.
    state: RwLock<ServiceState>,
    /// Single-flight initialization.
    initialized: OnceCell<LanguageCode>,
    /// Elements re-translated by `update_page_translations`.
    pub(super) elements: RwLock<Vec<Arc<dyn PageElement>>>,
}

impl fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationService")
            .field("default_language", &self.default_language)
            .field("current", &*self.current.read())
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TranslationService - Construction
// ============================================================================

impl TranslationService {
    /// Creates an uninitialized service.
    pub(crate) fn new(
        store: Arc<dyn Messenger>,
        source: Arc<dyn LocaleSource>,
        options: &RuntimeOptions,
    ) -> Self {
        Self {
            store,
            source,
            default_language: options.default_language.clone(),
            max_placeholder_depth: options.max_placeholder_depth,
            caches: Mutex::new(FxHashMap::default()),
            current: RwLock::new(options.default_language.clone()),
            state: RwLock::new(ServiceState::Uninitialized),
            initialized: OnceCell::new(),
            elements: RwLock::new(Vec::new()),
        }
    }

    /// Loads the user's preferred language (store setting
    /// `picked-language`, else the default).
    ///
    /// Runs once; concurrent and later calls return the first result.
    ///
    /// # Errors
    ///
    /// - store errors while reading the preference
    /// - [`Error::LocaleNotFound`] if not even the default language loads
    pub async fn initialize(&self) -> Result<LanguageCode> {
        let language = self
            .initialized
            .get_or_try_init(|| async {
                let language = self
                    .picked_language()
                    .await?
                    .unwrap_or_else(|| self.default_language.clone());
                self.set_language(&language).await
            })
            .await?;

        Ok(language.clone())
    }

    /// Reads the `picked-language` setting.
    async fn picked_language(&self) -> Result<Option<LanguageCode>> {
        let entry = self
            .store
            .get_settings(Some(Keys::from(PICKED_LANGUAGE)))
            .await?;

        Ok(entry
            .get("enabled")
            .and_then(Value::as_str)
            .filter(|code| !code.trim().is_empty())
            .map(LanguageCode::new))
    }
}

// ============================================================================
// TranslationService - Loading
// ============================================================================

impl TranslationService {
    /// Switches the current language.
    ///
    /// Returns the language actually in effect after fallbacks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocaleNotFound`] if not even the default language
    /// loads; the previous language stays current.
    pub async fn set_language(&self, language: &LanguageCode) -> Result<LanguageCode> {
        let previous = self.state();
        *self.state.write() = ServiceState::Loading(language.clone());

        match self.load_language_file(language).await {
            Ok(resolved) => {
                *self.current.write() = resolved.clone();
                *self.state.write() = ServiceState::Ready(resolved.clone());
                info!(requested = %language, resolved = %resolved, "Language ready");
                Ok(resolved)
            }
            Err(e) => {
                *self.state.write() = previous;
                Err(e)
            }
        }
    }

    /// Loads the catalog for `language`.
    ///
    /// On failure tries each shorter prefix (`zh_Hant_TW` → `zh_Hant` →
    /// `zh`), then the default language. Returns the language that loaded. The prefix
    /// and the default are also cached so lookups can fall through to them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocaleNotFound`] if the default language fails too.
    pub async fn load_language_file(&self, language: &LanguageCode) -> Result<LanguageCode> {
        let mut candidate = Some(language.clone());

        while let Some(code) = candidate {
            match self.load_catalog(&code).await {
                Ok(_) => {
                    self.warm_fallbacks(&code).await;
                    return Ok(code);
                }
                Err(e) => {
                    debug!(language = %code, error = %e, "Catalog unavailable");
                    if code == self.default_language {
                        return Err(e);
                    }
                    candidate = code.region_agnostic();
                }
            }
        }

        warn!(requested = %language, default = %self.default_language, "Falling back to default language");
        self.load_catalog(&self.default_language).await?;
        Ok(self.default_language.clone())
    }

    /// Loads several languages concurrently.
    ///
    /// Returns one result per input, in order.
    pub async fn preload_languages<I>(&self, languages: I) -> Vec<Result<LanguageCode>>
    where
        I: IntoIterator<Item = LanguageCode>,
    {
        let loads = languages
            .into_iter()
            .map(|language| async move { self.load_language_file(&language).await });
        join_all(loads).await
    }

    /// Best-effort caching of the rest of the chain.
    async fn warm_fallbacks(&self, language: &LanguageCode) {
        let rest = language
            .fallbacks()
            .chain(std::iter::once(self.default_language.clone()))
            .filter(|code| code != language);

        for code in rest {
            if let Err(e) = self.load_catalog(&code).await {
                debug!(language = %code, error = %e, "Fallback catalog unavailable");
            }
        }
    }

    /// Fetches and parses one catalog, at most once per language.
    async fn load_catalog(&self, language: &LanguageCode) -> Result<Arc<MessageCatalog>> {
        let cell = Arc::clone(self.caches.lock().entry(language.clone()).or_default());

        let catalog = cell
            .get_or_try_init(|| async {
                let text = self.source.fetch(language).await?;
                let catalog = MessageCatalog::parse(language.clone(), &text)?;
                info!(language = %language, messages = catalog.len(), "Loaded message catalog");
                Ok::<_, Error>(Arc::new(catalog))
            })
            .await?;

        Ok(Arc::clone(catalog))
    }
}

// ============================================================================
// TranslationService - Lookups
// ============================================================================

impl TranslationService {
    /// Translates `key` in the current language.
    ///
    /// Returns `key` itself when nothing resolves.
    #[must_use]
    pub fn translate(&self, key: &str) -> String {
        let language = self.current_language();
        self.translate_in(key, &language)
    }

    /// Translates `key` starting from `language`.
    ///
    /// Only catalogs already loaded take part.
    #[must_use]
    pub fn translate_in(&self, key: &str, language: &LanguageCode) -> String {
        self.resolve(key, language).unwrap_or_else(|e| {
            debug!(key, language = %language, error = %e, "Showing raw key");
            key.to_string()
        })
    }

    /// Translates each key and joins the results with `connector`.
    ///
    /// Each key falls back to itself independently.
    #[must_use]
    pub fn translate_all<I, S>(&self, keys: I, connector: &str) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| self.translate(key.as_ref()))
            .collect::<Vec<_>>()
            .join(connector)
    }

    /// Resolves `key`, failing when no catalog in the chain has it.
    ///
    /// Free text is split on whitespace and each token resolved on its
    /// own; tokens that do not resolve are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTranslationKey`] for an unknown single key.
    pub fn resolve(&self, key: &str, language: &LanguageCode) -> Result<String> {
        let chain = self.chain(language);

        if let Some(message) = lookup_in(&chain, key) {
            return Ok(self.expand_message(&chain, key, &message));
        }

        if key.contains(char::is_whitespace) {
            trace!(key, "Resolving free text token by token");
            let tokens: Vec<String> = key
                .split_whitespace()
                .map(|token| {
                    self.resolve_token(&chain, token)
                        .unwrap_or_else(|_| token.to_string())
                })
                .collect();
            return Ok(tokens.join(" "));
        }

        self.resolve_token(&chain, key)
    }

    fn resolve_token(&self, chain: &[Arc<MessageCatalog>], token: &str) -> Result<String> {
        let name = token.strip_prefix(SIGIL).unwrap_or(token);
        lookup_in(chain, name)
            .map(|message| self.expand_message(chain, name, &message))
            .ok_or_else(|| Error::missing_key(token))
    }

    fn expand_message(&self, chain: &[Arc<MessageCatalog>], key: &str, message: &str) -> String {
        expand(
            message,
            Some(key),
            |name| lookup_in(chain, name),
            self.max_placeholder_depth,
        )
    }

    /// Loaded catalogs for `language`, each of its prefixes and the default.
    fn chain(&self, language: &LanguageCode) -> Vec<Arc<MessageCatalog>> {
        let caches = self.caches.lock();
        let mut codes = vec![language.clone()];
        codes.extend(language.fallbacks());
        if !codes.contains(&self.default_language) {
            codes.push(self.default_language.clone());
        }

        codes
            .iter()
            .filter_map(|code| caches.get(code).and_then(|cell| cell.get()).cloned())
            .collect()
    }
}

// ============================================================================
// TranslationService - Accessors
// ============================================================================

impl TranslationService {
    /// Language lookups start from.
    #[must_use]
    pub fn current_language(&self) -> LanguageCode {
        self.current.read().clone()
    }

    /// Last link of every fallback chain.
    #[inline]
    #[must_use]
    pub fn default_language(&self) -> &LanguageCode {
        &self.default_language
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.state.read().clone()
    }

    /// Returns `true` if the catalog for `language` is cached.
    #[must_use]
    pub fn is_loaded(&self, language: &LanguageCode) -> bool {
        self.caches
            .lock()
            .get(language)
            .is_some_and(|cell| cell.initialized())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn lookup_in(chain: &[Arc<MessageCatalog>], key: &str) -> Option<String> {
    chain
        .iter()
        .find_map(|catalog| catalog.get(key))
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
