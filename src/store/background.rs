//! Background store task.
//!
//! The store owns a key/value map and serves [`Request`]s one at a time,
//! which gives per-channel FIFO ordering. Every write is broadcast as a
//! [`StorageChange`] and, when configured, flushed to a JSON file.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, trace};

use crate::error::{Error, Result};
use crate::protocol::keys::{GENERIC_STYLE_KEY, ORG_STYLE_KEY, SETTINGS_KEY, is_style_key};
use crate::protocol::{Request, StorageChange, Verb};

use super::handle::StoreHandle;
use super::settings::{merge_style, select_settings};

// ============================================================================
// Constants
// ============================================================================

/// Default capacity of the change broadcast channel.
const DEFAULT_CHANGE_CAPACITY: usize = 64;

// ============================================================================
// Types
// ============================================================================

/// Backing map of the store.
type StoreMap = FxHashMap<String, Value>;

/// Internal commands for the store loop.
pub(crate) enum StoreCommand {
    /// Serve a request.
    Request {
        request: Request,
        response_tx: oneshot::Sender<Result<Value>>,
    },
    /// Stop the loop.
    Shutdown,
}

// ============================================================================
// StoreOptions
// ============================================================================

/// Background store configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// JSON file mirrored after every write.
    pub persist_path: Option<PathBuf>,

    /// Initial contents, applied over the persisted file.
    pub seed: Vec<(String, Value)>,

    /// Capacity of the change broadcast channel.
    pub change_capacity: Option<usize>,
}

impl StoreOptions {
    /// Creates in-memory options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists the store to `path`.
    #[inline]
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    /// Seeds a key before the store starts serving.
    #[inline]
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.seed.push((key.into(), value));
        self
    }

    /// Sets the change broadcast capacity.
    #[inline]
    #[must_use]
    pub fn with_change_capacity(mut self, capacity: usize) -> Self {
        self.change_capacity = Some(capacity);
        self
    }
}

// ============================================================================
// BackgroundStore
// ============================================================================

/// The background execution context's store.
///
/// Use [`BackgroundStore::spawn`] to start the task and obtain a
/// [`StoreHandle`].
pub struct BackgroundStore {
    values: StoreMap,
    persist_path: Option<PathBuf>,
    changes: broadcast::Sender<StorageChange>,
}

impl BackgroundStore {
    /// Starts the store task.
    ///
    /// Loads `persist_path` when it exists, then applies `seed`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the persisted file cannot be read
    /// - [`Error::Json`] if the persisted file is not a JSON object
    pub async fn spawn(options: StoreOptions) -> Result<StoreHandle> {
        let mut values = match &options.persist_path {
            Some(path) if tokio::fs::try_exists(path).await? => {
                let bytes = tokio::fs::read(path).await?;
                let values: StoreMap = serde_json::from_slice(&bytes)?;
                info!(path = %path.display(), keys = values.len(), "Loaded persisted store");
                values
            }
            _ => StoreMap::default(),
        };

        values.extend(options.seed);

        let capacity = options.change_capacity.unwrap_or(DEFAULT_CHANGE_CAPACITY);
        let (changes, _) = broadcast::channel(capacity);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let store = Self {
            values,
            persist_path: options.persist_path,
            changes: changes.clone(),
        };

        tokio::spawn(store.run(command_rx));

        Ok(StoreHandle::new(command_tx, changes))
    }

    /// Store loop.
    async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<StoreCommand>) {
        debug!("Background store started");

        while let Some(command) = command_rx.recv().await {
            match command {
                StoreCommand::Request {
                    request,
                    response_tx,
                } => {
                    let request_id = request.id;
                    let what = request.what;
                    let result = self.handle_request(request).await;

                    if let Err(e) = &result {
                        debug!(%request_id, what = what.as_str(), error = %e, "Store request rejected");
                    } else {
                        trace!(%request_id, what = what.as_str(), "Store request served");
                    }

                    let _ = response_tx.send(result);
                }

                StoreCommand::Shutdown => {
                    debug!("Shutdown command received");
                    break;
                }
            }
        }

        debug!("Background store terminated");
    }

    /// Serves one request.
    async fn handle_request(&mut self, request: Request) -> Result<Value> {
        match request.what {
            Verb::Get => {
                let key = required_key(&request)?;
                Ok(self.values.get(key).cloned().unwrap_or(Value::Null))
            }

            Verb::Set => self.handle_set(&request).await,

            Verb::GetSettings => {
                let stored = self.values.get(SETTINGS_KEY).unwrap_or(&Value::Null);
                Ok(select_settings(stored, request.keys.as_ref()))
            }

            Verb::GetStyleSettings => match request.key.as_deref() {
                Some(key) if is_style_key(key) => {
                    Ok(self.values.get(key).cloned().unwrap_or(Value::Null))
                }
                Some(key) => Err(Error::store(format!("not a style key: {key}"))),
                None => {
                    let mut both = serde_json::Map::new();
                    for key in [GENERIC_STYLE_KEY, ORG_STYLE_KEY] {
                        both.insert(
                            key.to_string(),
                            self.values.get(key).cloned().unwrap_or(Value::Null),
                        );
                    }
                    Ok(Value::Object(both))
                }
            },
        }
    }

    /// Writes one key and broadcasts the change.
    async fn handle_set(&mut self, request: &Request) -> Result<Value> {
        let key = required_key(request)?;
        let incoming = request.payload().cloned().unwrap_or(Value::Null);
        let old_value = self.values.get(key).cloned().unwrap_or(Value::Null);

        let new_value = if is_style_key(key) {
            merge_style(&old_value, &incoming)?
        } else {
            incoming
        };

        let previous = if new_value.is_null() {
            self.values.remove(key)
        } else {
            self.values.insert(key.to_string(), new_value.clone())
        };

        if let Err(e) = self.persist().await {
            match previous {
                Some(value) => self.values.insert(key.to_string(), value),
                None => self.values.remove(key),
            };
            return Err(e);
        }

        // No receivers is fine.
        let _ = self
            .changes
            .send(StorageChange::new(key, old_value, new_value.clone()));

        Ok(new_value)
    }

    /// Mirrors the map to the persist file, if any.
    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(&self.values)?;
        if let Err(e) = tokio::fs::write(path, bytes).await {
            error!(path = %path.display(), error = %e, "Failed to persist store");
            return Err(e.into());
        }
        Ok(())
    }
}

/// Returns the request key or rejects the request.
fn required_key(request: &Request) -> Result<&str> {
    request
        .key
        .as_deref()
        .ok_or_else(|| Error::store(format!("`{}` requires a key", request.what.as_str())))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Keys;
    use crate::protocol::keys::{PICKED_LANGUAGE, TABS_KEY};
    use crate::store::Messenger;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_absent_is_null() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        assert_eq!(store.get(TABS_KEY).await.expect("get"), Value::Null);
    }

    #[tokio::test]
    async fn test_set_overwrites_non_style_keys() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");

        store.set(TABS_KEY, json!([{"label": "a", "url": "a"}])).await.expect("set");
        store.set(TABS_KEY, json!([{"label": "b", "url": "b"}])).await.expect("set");

        assert_eq!(
            store.get(TABS_KEY).await.expect("get"),
            json!([{"label": "b", "url": "b"}])
        );
    }

    #[tokio::test]
    async fn test_set_null_deletes() {
        let store = BackgroundStore::spawn(StoreOptions::new().with_value("k", json!(1)))
            .await
            .expect("spawn");

        store.set("k", Value::Null).await.expect("set");
        assert_eq!(store.get("k").await.expect("get"), Value::Null);
    }

    #[tokio::test]
    async fn test_style_keys_merge() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");

        store
            .set(GENERIC_STYLE_KEY, json!({"id": "color", "forActive": false, "value": "red"}))
            .await
            .expect("set");
        store
            .set(GENERIC_STYLE_KEY, json!({"id": "bold", "forActive": true, "value": "700"}))
            .await
            .expect("set");

        let both = store.get_style_settings(None).await.expect("get");
        assert_eq!(both[GENERIC_STYLE_KEY].as_array().map(Vec::len), Some(2));
        assert_eq!(both[ORG_STYLE_KEY], Value::Null);

        store
            .set(GENERIC_STYLE_KEY, json!({"id": "color", "forActive": false, "value": null}))
            .await
            .expect("set");
        let generic = store
            .get_style_settings(Some(GENERIC_STYLE_KEY))
            .await
            .expect("get");
        assert_eq!(generic, json!([{"id": "bold", "forActive": true, "value": "700"}]));
    }

    #[tokio::test]
    async fn test_get_style_settings_rejects_other_keys() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let err = store.get_style_settings(Some(TABS_KEY)).await.unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
    }

    #[tokio::test]
    async fn test_get_settings_by_id() {
        let store = BackgroundStore::spawn(StoreOptions::new().with_value(
            SETTINGS_KEY,
            json!([{"id": PICKED_LANGUAGE, "enabled": "fr"}, {"id": "x", "enabled": false}]),
        ))
        .await
        .expect("spawn");

        let entry = store
            .get_settings(Some(Keys::from(PICKED_LANGUAGE)))
            .await
            .expect("get");
        assert_eq!(entry["enabled"], "fr");
    }

    #[tokio::test]
    async fn test_missing_key_is_rejected() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let mut request = Request::get("ignored");
        request.key = None;

        let err = store.send(request).await.unwrap_err();
        assert!(err.is_store_error());
    }

    #[tokio::test]
    async fn test_set_broadcasts_change() {
        let store = BackgroundStore::spawn(StoreOptions::new()).await.expect("spawn");
        let mut changes = store.subscribe();

        store.set(TABS_KEY, json!([])).await.expect("set");

        let change = changes.recv().await.expect("change");
        assert_eq!(change.key, TABS_KEY);
        assert_eq!(change.old_value, Value::Null);
        assert_eq!(change.new_value, json!([]));
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing_dir").join("store.json");

        let store = BackgroundStore::spawn(
            StoreOptions::new()
                .persist_to(&path)
                .with_value("kept", json!(0)),
        )
        .await
        .expect("spawn");
        let mut changes = store.subscribe();

        let err = store.set("kept", json!(1)).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(store.set("fresh", json!(1)).await.is_err());
        assert!(store.set("kept", Value::Null).await.is_err());

        assert_eq!(store.get("kept").await.expect("get"), json!(0));
        assert_eq!(store.get("fresh").await.expect("get"), Value::Null);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_persists_across_restarts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");

        let store = BackgroundStore::spawn(StoreOptions::new().persist_to(&path))
            .await
            .expect("spawn");
        store.set(TABS_KEY, json!([{"label": "a", "url": "a"}])).await.expect("set");
        store.shutdown();

        let reopened = BackgroundStore::spawn(StoreOptions::new().persist_to(&path))
            .await
            .expect("respawn");
        assert_eq!(
            reopened.get(TABS_KEY).await.expect("get"),
            json!([{"label": "a", "url": "a"}])
        );
    }
}
