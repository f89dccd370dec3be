//! Watch bridge: keeps a [`Target`] synchronized with one store key.
//!
//! # Lifecycle
//!
//! ```text
//! watch_and_update()
//!   store.get(key) -> decode -> target.update()      (fails: nothing started)
//!   store.watch(key)                                 (fails: target keeps seed)
//!   tokio::spawn(worker)                             -> Active
//!
//! worker, per notification:
//!   Some(value) -> decode + validate -> target.update_if(open)  (rejected: dropped)
//!   None        -> target.update_if(open, default)
//!
//! WatchHandle::close()  -> closed flag set, task cancelled (once, never blocks)
//! ```
//!
//! Updates that fail to decode or validate inside the worker are discarded and
//! the target keeps its previous value; a bad write to the store never
//! surfaces as an error to the owner of the watch. If the subscription ends on
//! its own, the worker exits and the target keeps its last good value.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::SystemTime;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::Target;
use super::WatchOptions;
use crate::from_value;
use crate::Error;
use crate::Result;
use crate::Store;
use crate::Value;
use crate::ValueWatch;
use crate::WatchValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Active,
    Closed,
}

/// State shared between a handle and its worker
#[derive(Debug)]
struct Shared {
    key: String,
    /// Checked by the worker inside the target's write section
    closed: AtomicBool,
    cancel: CancellationToken,
}

/// One active subscription tying a key to a target.
///
/// Dropping the handle closes the watch.
#[derive(Debug)]
pub struct WatchHandle {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn state(&self) -> WatchState {
        if self.shared.closed.load(Ordering::SeqCst) {
            WatchState::Closed
        } else {
            WatchState::Active
        }
    }

    /// Stops the watch without blocking.
    ///
    /// Any write that has not yet been granted write access to the target
    /// when this returns is discarded, so no store change made afterwards is
    /// ever applied. The background task is woken and exits at its next poll,
    /// releasing the subscription; use [`WatchHandle::shutdown`] to wait for
    /// that. Calling `close` more than once has no further effect.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.shared.cancel.cancel();
        debug!(key = %self.shared.key, "Watch closed");
    }

    /// Closes the watch and waits for its background task to terminate
    pub async fn shutdown(mut self) {
        self.close();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(key = %self.shared.key, "Watch task terminated abnormally: {:?}", e);
            }
        }
    }

    /// Whether the background task has terminated
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Background task state for one watch
struct Worker<T, U: ?Sized> {
    shared: Arc<Shared>,
    target: Arc<U>,
    default: T,
    options: WatchOptions<T>,
}

impl<T, U> Worker<T, U>
where
    T: WatchValue,
    U: Target<T> + ?Sized,
{
    async fn run(
        self,
        mut subscription: ValueWatch,
    ) {
        trace!(key = %self.shared.key, "Watch task started");

        loop {
            tokio::select! {
                biased;
                _ = self.shared.cancel.cancelled() => {
                    trace!(key = %self.shared.key, "Watch task cancelled");
                    break;
                }
                next = subscription.next() => match next {
                    Some(value) => self.handle(value),
                    None => {
                        debug!(key = %self.shared.key, "Subscription ended, keeping last applied value");
                        break;
                    }
                }
            }
        }

        drop(subscription);
        trace!(key = %self.shared.key, "Watch task exited");
    }

    fn handle(
        &self,
        value: Option<Value>,
    ) {
        let version = value.as_ref().map(Value::version);
        match from_value(
            value.as_ref(),
            &self.shared.key,
            self.default.clone(),
            self.options.validate_fn(),
        ) {
            Ok(decoded) => self.apply(decoded, version),
            Err(e) => self.reject(e, version),
        }
    }

    fn apply(
        &self,
        value: T,
        version: Option<u64>,
    ) {
        let closed = &self.shared.closed;
        if !self.target.update_if(value, &|| !closed.load(Ordering::SeqCst)) {
            trace!(key = %self.shared.key, ?version, "Dropping update received after close");
            return;
        }

        trace!(key = %self.shared.key, ?version, deleted = version.is_none(), "Applied update");
    }

    fn reject(
        &self,
        err: Error,
        version: Option<u64>,
    ) {
        if self.options.warn_on_rejection {
            warn!(key = %self.shared.key, ?version, "Rejected update: {}", err);
        } else {
            debug!(key = %self.shared.key, ?version, "Rejected update: {}", err);
        }

        if let Some(observer) = &self.options.rejection_observer {
            observer(&self.shared.key, &err);
        }
    }
}

/// Seeds `target` from the store and keeps it synchronized with `key`.
///
/// The initial value is decoded synchronously: if it cannot be decoded or
/// validated, the error is returned, `target` is left untouched, and no
/// subscription is opened. Once seeded, `target` keeps that value even if
/// the subscription itself cannot be opened.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
/// - [`Error::Store`] if the initial read fails
/// - [`Error::Decode`] / [`Error::Validation`] for a bad initial value
/// - [`Error::Subscription`] if the change subscription cannot be opened
pub async fn watch_and_update<T, S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: T,
    options: Option<WatchOptions<T>>,
) -> Result<WatchHandle>
where
    T: WatchValue,
    S: Store + ?Sized,
    U: Target<T> + ?Sized,
{
    let options = options.unwrap_or_default();

    let current = store.get(key).await?;
    let initial = from_value(current.as_ref(), key, default.clone(), options.validate_fn())?;
    target.update(initial);

    let subscription = store.watch(key).await.map_err(|source| Error::Subscription {
        key: key.to_string(),
        source,
    })?;

    let shared = Arc::new(Shared {
        key: key.to_string(),
        closed: AtomicBool::new(false),
        cancel: CancellationToken::new(),
    });
    let worker = Worker {
        shared: Arc::clone(&shared),
        target,
        default,
        options,
    };
    let task = tokio::spawn(worker.run(subscription));

    debug!(key, kind = %T::KIND, "Watch started");
    Ok(WatchHandle {
        shared,
        task: Some(task),
    })
}

pub async fn watch_and_update_bool<S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: bool,
    options: Option<WatchOptions<bool>>,
) -> Result<WatchHandle>
where
    S: Store + ?Sized,
    U: Target<bool> + ?Sized,
{
    watch_and_update(store, key, target, default, options).await
}

pub async fn watch_and_update_int64<S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: i64,
    options: Option<WatchOptions<i64>>,
) -> Result<WatchHandle>
where
    S: Store + ?Sized,
    U: Target<i64> + ?Sized,
{
    watch_and_update(store, key, target, default, options).await
}

pub async fn watch_and_update_float64<S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: f64,
    options: Option<WatchOptions<f64>>,
) -> Result<WatchHandle>
where
    S: Store + ?Sized,
    U: Target<f64> + ?Sized,
{
    watch_and_update(store, key, target, default, options).await
}

pub async fn watch_and_update_string<S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: String,
    options: Option<WatchOptions<String>>,
) -> Result<WatchHandle>
where
    S: Store + ?Sized,
    U: Target<String> + ?Sized,
{
    watch_and_update(store, key, target, default, options).await
}

pub async fn watch_and_update_string_array<S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: Vec<String>,
    options: Option<WatchOptions<Vec<String>>>,
) -> Result<WatchHandle>
where
    S: Store + ?Sized,
    U: Target<Vec<String>> + ?Sized,
{
    watch_and_update(store, key, target, default, options).await
}

/// Watches a key holding Unix seconds
pub async fn watch_and_update_time<S, U>(
    store: &S,
    key: &str,
    target: Arc<U>,
    default: SystemTime,
    options: Option<WatchOptions<SystemTime>>,
) -> Result<WatchHandle>
where
    S: Store + ?Sized,
    U: Target<SystemTime> + ?Sized,
{
    watch_and_update(store, key, target, default, options).await
}
