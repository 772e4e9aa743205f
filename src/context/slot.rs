//! Per-context singletons.
//!
//! A [`SingletonSlot`] holds at most one instance of a component. The
//! instance is built either lazily by an accessor or explicitly by a
//! factory; a factory call after construction is a programming error.

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// SingletonSlot
// ============================================================================

/// At-most-once slot for a shared component.
#[derive(Debug)]
pub(crate) struct SingletonSlot<T> {
    component: &'static str,
    cell: OnceCell<Arc<T>>,
}

impl<T> SingletonSlot<T> {
    /// Creates an empty slot.
    pub(crate) fn new(component: &'static str) -> Self {
        Self {
            component,
            cell: OnceCell::new(),
        }
    }

    /// Returns the instance if it was built.
    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    /// Returns the instance, building it on first use.
    ///
    /// Concurrent callers share one build. A failed build leaves the slot
    /// empty.
    pub(crate) async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let value = self
            .cell
            .get_or_try_init(|| async {
                let value = init().await?;
                debug!(component = self.component, "Component constructed");
                Ok::<_, Error>(Arc::new(value))
            })
            .await?;

        Ok(Arc::clone(value))
    }

    /// Builds the instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingleInstanceViolation`] if the slot already holds
    /// an instance, including one built concurrently by another caller.
    pub(crate) async fn create<F, Fut>(&self, init: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.cell.initialized() {
            return Err(Error::single_instance(self.component));
        }

        let mut built_here = false;
        let value = self
            .get_or_try_init(|| {
                built_here = true;
                init()
            })
            .await?;

        if built_here {
            Ok(value)
        } else {
            Err(Error::single_instance(self.component))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_accessor_is_idempotent() {
        let slot = SingletonSlot::new("counter");
        let a = slot.get_or_try_init(|| async { Ok(1u32) }).await.expect("a");
        let b = slot.get_or_try_init(|| async { Ok(2u32) }).await.expect("b");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, 1);
    }

    #[tokio::test]
    async fn test_second_create_fails() {
        let slot = SingletonSlot::new("counter");
        slot.create(|| async { Ok(1u32) }).await.expect("first");

        let err = slot.create(|| async { Ok(2u32) }).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SingleInstanceViolation { component: "counter" }
        ));
    }

    #[tokio::test]
    async fn test_create_after_lazy_access_fails() {
        let slot = SingletonSlot::new("counter");
        slot.get_or_try_init(|| async { Ok(1u32) }).await.expect("lazy");
        assert!(slot.create(|| async { Ok(2u32) }).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_build_can_be_retried() {
        let slot: SingletonSlot<u32> = SingletonSlot::new("counter");
        assert!(
            slot.create(|| async { Err(Error::store("down")) })
                .await
                .is_err()
        );
        assert!(slot.get().is_none());

        let value = slot.create(|| async { Ok(3u32) }).await.expect("retry");
        assert_eq!(*value, 3);
    }
}
