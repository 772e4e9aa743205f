//! Store client.
//!
//! [`StoreHandle`] is the cloneable end of the channel pair created by
//! [`BackgroundStore::spawn`](super::BackgroundStore::spawn). It sends
//! requests, waits for the reply with a timeout, and hands out change
//! subscriptions.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::protocol::{Request, StorageChange};

use super::Messenger;
use super::background::StoreCommand;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for store requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// StoreHandle
// ============================================================================

/// Client side of the background store.
///
/// # Thread Safety
///
/// `StoreHandle` is `Send + Sync` and cheap to clone; every context keeps
/// its own clone.
#[derive(Clone)]
pub struct StoreHandle {
    /// Channel into the store loop.
    command_tx: mpsc::UnboundedSender<StoreCommand>,
    /// Change broadcaster (for `subscribe`).
    changes: broadcast::Sender<StorageChange>,
    /// Per-request timeout.
    request_timeout: Duration,
}

impl StoreHandle {
    /// Creates a handle from the store's channel ends.
    pub(crate) fn new(
        command_tx: mpsc::UnboundedSender<StoreCommand>,
        changes: broadcast::Sender<StorageChange>,
    ) -> Self {
        Self {
            command_tx,
            changes,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Returns a handle using a different request timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Subscribes to change notifications.
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }

    /// Returns `true` while the store loop is running.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Stops the store loop.
    ///
    /// Requests already queued are dropped and their senders see
    /// [`Error::ChannelClosed`]; later requests see
    /// [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(StoreCommand::Shutdown);
    }

    /// Sends a request and waits for the reply with a custom timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the store is gone
    /// - [`Error::ChannelClosed`] if the store dropped the request unanswered
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::Store`] if the store rejected the request
    pub async fn send_with_timeout(
        &self,
        request: Request,
        request_timeout: Duration,
    ) -> Result<Value> {
        let request_id = request.id;
        let (response_tx, response_rx) = oneshot::channel();

        debug!(%request_id, what = request.what.as_str(), key = ?request.key, "Sending store request");

        self.command_tx
            .send(StoreCommand::Request {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                debug!(%request_id, "Store dropped the request without replying");
                Err(e.into())
            }
            Err(_) => {
                let timeout_ms = u64::try_from(request_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(%request_id, timeout_ms, "Store request timed out");
                Err(Error::request_timeout(request_id, timeout_ms))
            }
        }
    }
}

#[async_trait]
impl Messenger for StoreHandle {
    async fn send(&self, request: Request) -> Result<Value> {
        self.send_with_timeout(request, self.request_timeout).await
    }
}

// ============================================================================
// Tests
// ============================================================================
