use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use console_core::{ApiError, AsyncResult};
use console_logging::{console_debug, console_warn};

/// Clonable handle to an [`AsyncResult`] that owns the fetch.
///
/// The lock is only held for the synchronous transitions, never across the
/// awaited fetch, so views can read the state while a load is pending.
pub struct SharedResult<T> {
    inner: Arc<Mutex<AsyncResult<T>>>,
}

impl<T> Clone for SharedResult<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for SharedResult<T> {
    fn default() -> Self {
        Self::new(AsyncResult::new())
    }
}

impl<T> SharedResult<T> {
    pub fn new(result: AsyncResult<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(result)),
        }
    }

    /// Runs `fetch` and stores its outcome. Returns `false` without calling
    /// `fetch` when a load is already in flight, or when the load was
    /// abandoned by [`SharedResult::reset`] before it finished.
    pub async fn load<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let ticket = self.lock().begin_load();
        let Some(ticket) = ticket else {
            console_debug!("load skipped: already in flight");
            return false;
        };

        let result = fetch().await;
        if let Err(err) = &result {
            console_warn!("load failed: {}", err);
        }

        let applied = self.lock().finish_load(ticket, result);
        if !applied {
            console_debug!("load result dropped: result was reset");
        }
        applied
    }

    /// Like [`SharedResult::load`], but this and every later reload keep the
    /// previous value visible until the new one arrives.
    pub async fn load_while_keeping_old_result<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.lock().keep_previous_on_reload();
        self.load(fetch).await
    }

    /// Read access for rendering. The change listener must not call back into
    /// the same handle.
    pub fn with<R>(&self, read: impl FnOnce(&AsyncResult<T>) -> R) -> R {
        read(&self.lock())
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> MutexGuard<'_, AsyncResult<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
