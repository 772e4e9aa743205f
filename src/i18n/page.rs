//! Page re-translation.
//!
//! UI elements carry a `data-i18n` binding: either a message key, whose
//! translation becomes the element text, or `key+-+attribute`, whose
//! translation is written into that attribute instead.
//!
//! ```text
//! data-i18n="save"               → text      = translate("save")
//! data-i18n="save_hint+-+title"  → title=""  = translate("save_hint")
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::identifiers::LanguageCode;
use crate::protocol::StorageChange;

use super::service::TranslationService;

// ============================================================================
// Constants
// ============================================================================

/// Separator between key and attribute in a binding.
pub const ATTRIBUTE_SEPARATOR: &str = "+-+";

// ============================================================================
// PageElement
// ============================================================================

/// A translatable UI element.
///
/// Writes must overwrite previous content.
pub trait PageElement: Send + Sync {
    /// Raw `data-i18n` value, if the element has one.
    fn i18n_attribute(&self) -> Option<String>;

    /// Replaces the element text.
    fn set_text(&self, text: &str);

    /// Sets an attribute value.
    fn set_attribute(&self, name: &str, value: &str);
}

// ============================================================================
// I18nBinding
// ============================================================================

/// Parsed `data-i18n` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I18nBinding {
    /// Message key.
    pub key: String,
    /// Target attribute; element text when `None`.
    pub attribute: Option<String>,
}

impl I18nBinding {
    /// Parses a binding. `None` for a blank value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (key, attribute) = match raw.split_once(ATTRIBUTE_SEPARATOR) {
            Some((key, attribute)) => (key.trim(), Some(attribute.trim())),
            None => (raw, None),
        };

        Some(Self {
            key: key.to_string(),
            attribute: attribute.filter(|a| !a.is_empty()).map(str::to_string),
        })
    }
}

// ============================================================================
// TranslationService - Page
// ============================================================================

impl TranslationService {
    /// Registers an element for re-translation.
    pub fn subscribe(&self, element: Arc<dyn PageElement>) {
        self.elements.write().push(element);
    }

    /// Number of registered elements.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.elements.read().len()
    }

    /// Re-applies translations to every registered element.
    ///
    /// With `Some(language)` the language is switched first. Safe to call
    /// repeatedly. Returns the number of elements written.
    ///
    /// # Errors
    ///
    /// Returns the language switch error; elements are left untouched.
    pub async fn update_page_translations(&self, language: Option<LanguageCode>) -> Result<usize> {
        if let Some(language) = language {
            self.set_language(&language).await?;
        }

        let elements = self.elements.read().clone();
        let mut written = 0;

        for element in &elements {
            let Some(binding) = element.i18n_attribute().as_deref().and_then(I18nBinding::parse) else {
                continue;
            };

            let text = self.translate(&binding.key);
            match &binding.attribute {
                Some(attribute) => element.set_attribute(attribute, &text),
                None => element.set_text(&text),
            }
            written += 1;
        }

        debug!(written, language = %self.current_language(), "Page translations updated");
        Ok(written)
    }

    /// Re-translates the page whenever the `picked-language` setting
    /// changes.
    ///
    /// The task ends when the store's change channel closes.
    pub fn spawn_language_watcher(
        self: Arc<Self>,
        mut changes: broadcast::Receiver<StorageChange>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let Some(language) = change.picked_language() else {
                            continue;
                        };
                        let language = LanguageCode::new(language);
                        info!(%language, "Language preference changed");

                        if let Err(e) = self.update_page_translations(Some(language)).await {
                            warn!(error = %e, "Failed to re-translate page");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Language watcher lagged behind store changes");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            debug!("Language watcher terminated");
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use parking_lot::Mutex;
    use rustc_hash::FxHashMap;
    use serde_json::json;

    use crate::context::RuntimeOptions;
    use crate::i18n::StaticSource;
    use crate::protocol::keys::{PICKED_LANGUAGE, SETTINGS_KEY};
    use crate::store::{BackgroundStore, Messenger, StoreHandle, StoreOptions};

    #[derive(Default)]
    struct FakeElement {
        binding: Option<String>,
        text: Mutex<String>,
        attributes: Mutex<FxHashMap<String, String>>,
    }

    impl FakeElement {
        fn bound(binding: &str) -> Arc<Self> {
            Arc::new(Self {
                binding: Some(binding.to_string()),
                ..Self::default()
            })
        }

        fn text(&self) -> String {
            self.text.lock().clone()
        }

        fn attribute(&self, name: &str) -> Option<String> {
            self.attributes.lock().get(name).cloned()
        }
    }

    impl PageElement for FakeElement {
        fn i18n_attribute(&self) -> Option<String> {
            self.binding.clone()
        }

        fn set_text(&self, text: &str) {
            *self.text.lock() = text.to_string();
        }

        fn set_attribute(&self, name: &str, value: &str) {
            self.attributes
                .lock()
                .insert(name.to_string(), value.to_string());
        }
    }

    fn source() -> StaticSource {
        StaticSource::new()
            .with_messages("en", [("save", "Save"), ("hint", "Saves the tab")])
            .with_messages("fr", [("save", "Enregistrer"), ("hint", "Enregistre l'onglet")])
    }

    async fn service() -> (Arc<TranslationService>, StoreHandle) {
        let store = BackgroundStore::spawn(StoreOptions::new().with_value(
            SETTINGS_KEY,
            json!([{"id": PICKED_LANGUAGE, "enabled": "en"}]),
        ))
        .await
        .expect("spawn");

        let service = TranslationService::new(
            Arc::new(store.clone()),
            Arc::new(source()),
            &RuntimeOptions::default(),
        );
        service.initialize().await.expect("init");
        (Arc::new(service), store)
    }

    #[test]
    fn test_binding_parse() {
        assert_eq!(
            I18nBinding::parse("save"),
            Some(I18nBinding {
                key: "save".into(),
                attribute: None
            })
        );
        assert_eq!(
            I18nBinding::parse("hint+-+title"),
            Some(I18nBinding {
                key: "hint".into(),
                attribute: Some("title".into())
            })
        );
        assert_eq!(I18nBinding::parse("  "), None);
        assert_eq!(I18nBinding::parse("save+-+").and_then(|b| b.attribute), None);
    }

    #[tokio::test]
    async fn test_update_overwrites_text_and_attributes() {
        let (service, _) = service().await;
        let button = FakeElement::bound("save");
        let tooltip = FakeElement::bound("hint+-+title");
        let plain = Arc::new(FakeElement::default());

        service.subscribe(button.clone());
        service.subscribe(tooltip.clone());
        service.subscribe(plain.clone());

        assert_eq!(service.update_page_translations(None).await.expect("update"), 2);
        assert_eq!(button.text(), "Save");
        assert_eq!(tooltip.attribute("title").as_deref(), Some("Saves the tab"));
        assert_eq!(tooltip.text(), "");

        service
            .update_page_translations(Some(LanguageCode::new("fr")))
            .await
            .expect("update");
        service
            .update_page_translations(None)
            .await
            .expect("again");
        assert_eq!(button.text(), "Enregistrer");
        assert_eq!(tooltip.attribute("title").as_deref(), Some("Enregistre l'onglet"));
        assert_eq!(plain.text(), "");
    }

    #[tokio::test]
    async fn test_watcher_follows_language_setting() {
        let (service, store) = service().await;
        let button = FakeElement::bound("save");
        service.subscribe(button.clone());

        let watcher = Arc::clone(&service).spawn_language_watcher(store.subscribe());

        store
            .set(SETTINGS_KEY, json!([{"id": PICKED_LANGUAGE, "enabled": "fr"}]))
            .await
            .expect("set");

        tokio::time::timeout(Duration::from_secs(5), async {
            while button.text() != "Enregistrer" {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("re-translated");
        assert_eq!(service.current_language().as_str(), "fr");

        store.shutdown();
        drop(store);
        watcher.abort();
    }
}
