//! Debounced callbacks
//!
//! A burst of calls within the delay collapses to one invocation with the
//! last argument. Timers run on the tokio runtime, so `call` must be made
//! from within one.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

struct DebounceInner<T> {
    callback: Box<dyn Fn(T) + Send + Sync>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a debounced callback; clones share the same timer
pub struct Debounced<T> {
    inner: Arc<DebounceInner<T>>,
}

impl<T> Clone for Debounced<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Wrap `callback` so it runs `delay` after the last call in a burst
pub fn debounce<T, F>(callback: F, delay: Duration) -> Debounced<T>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    Debounced {
        inner: Arc::new(DebounceInner {
            callback: Box::new(callback),
            delay,
            pending: Mutex::new(None),
        }),
    }
}

impl<T: Send + 'static> Debounced<T> {
    /// Restart the timer with `arg` as the pending argument
    pub fn call(&self, arg: T) {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            (inner.callback)(arg);
        });

        let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    /// Drop the pending invocation, if any
    pub fn cancel(&self) {
        let mut pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.inner.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}
