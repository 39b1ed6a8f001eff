use std::fmt;
use std::sync::Arc;

use crate::error::{surface_error, ApiError, ErrorInterceptor, NoInterception};
use crate::StatusNode;

pub type ChangeListener<T> = Arc<dyn Fn(&AsyncResult<T>) + Send + Sync>;

/// A value that has to be fetched remotely: at any moment it is loading,
/// errored, present, or not yet requested.
///
/// The struct performs no IO. A load is split into [`AsyncResult::begin_load`]
/// and [`AsyncResult::finish_load`]; whoever owns the fetch awaits it in
/// between. The change listener runs synchronously after each transition.
pub struct AsyncResult<T> {
    value: Option<T>,
    loading: bool,
    error_message: Option<String>,
    keep_previous_on_reload: bool,
    generation: u64,
    on_change: Option<ChangeListener<T>>,
    interceptor: Arc<dyn ErrorInterceptor>,
}

/// Proof that a load was started; hand it back to `finish_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncResult<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            loading: false,
            error_message: None,
            keep_previous_on_reload: false,
            generation: 0,
            on_change: None,
            interceptor: Arc::new(NoInterception),
        }
    }

    pub fn with_on_change(
        mut self,
        listener: impl Fn(&AsyncResult<T>) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(listener));
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn ErrorInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn keeps_previous(&self) -> bool {
        self.keep_previous_on_reload
    }

    /// Makes every later reload keep the current value visible until the new
    /// fetch resolves. The flag is sticky.
    pub fn keep_previous_on_reload(&mut self) {
        self.keep_previous_on_reload = true;
    }

    /// Starts a load. Returns `None` without touching any state or notifying
    /// when a load is already in flight.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.loading {
            return None;
        }
        self.generation += 1;
        self.loading = true;
        self.error_message = None;
        if !self.keep_previous_on_reload {
            self.value = None;
        }
        self.notify();
        Some(LoadTicket {
            generation: self.generation,
        })
    }

    /// Completes the load identified by `ticket`. A ticket abandoned by
    /// [`AsyncResult::reset`] is ignored and `false` is returned.
    ///
    /// A failure always clears the value, even in keep-previous mode. If the
    /// interceptor claims the error, no local error message is stored.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<T, ApiError>) -> bool {
        if !self.loading || ticket.generation != self.generation {
            return false;
        }
        match result {
            Ok(value) => self.value = Some(value),
            Err(error) => {
                self.value = None;
                self.error_message = surface_error(self.interceptor.as_ref(), &error);
            }
        }
        self.loading = false;
        self.notify();
        true
    }

    /// Drops the value, error and any in-flight load.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.value = None;
        self.loading = false;
        self.error_message = None;
        self.notify();
    }

    pub fn status(&self) -> Option<StatusNode> {
        if self.loading {
            return Some(StatusNode::Loading);
        }
        self.error_message
            .as_ref()
            .map(|message| StatusNode::Error {
                message: message.clone(),
            })
    }

    pub fn unwrap(&self) -> (Option<&T>, Option<StatusNode>) {
        (self.value.as_ref(), self.status())
    }

    /// Renders the status node while loading or errored, otherwise applies
    /// `render` to the value. `None` means nothing was ever loaded.
    pub fn draw<N, F>(&self, render: F) -> Option<N>
    where
        N: From<StatusNode>,
        F: FnOnce(&T) -> N,
    {
        if let Some(status) = self.status() {
            return Some(N::from(status));
        }
        self.value.as_ref().map(render)
    }

    /// Combines two results. The first status in argument order wins, so an
    /// error in `b` is hidden while `a` is still loading.
    pub fn unwrap2<'a, B>(
        a: &'a AsyncResult<T>,
        b: &'a AsyncResult<B>,
    ) -> ((Option<&'a T>, Option<&'a B>), Option<StatusNode>) {
        let status = a.status().or_else(|| b.status());
        ((a.value(), b.value()), status)
    }

    pub fn unwrap3<'a, B, C>(
        a: &'a AsyncResult<T>,
        b: &'a AsyncResult<B>,
        c: &'a AsyncResult<C>,
    ) -> ((Option<&'a T>, Option<&'a B>, Option<&'a C>), Option<StatusNode>) {
        let status = a
            .status()
            .or_else(|| b.status())
            .or_else(|| c.status());
        ((a.value(), b.value(), c.value()), status)
    }

    fn notify(&self) {
        if let Some(listener) = &self.on_change {
            listener(self);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResult")
            .field("value", &self.value)
            .field("loading", &self.loading)
            .field("error_message", &self.error_message)
            .field("keep_previous_on_reload", &self.keep_previous_on_reload)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
