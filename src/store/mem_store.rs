//! In-memory store with per-key change subscriptions.
//!
//! # Architecture
//!
//! ```text
//! set()/delete():
//!   data.write() -> update entry -> send_replace(per-watcher channel)
//!                                          ↓
//! ValueWatch:
//!   WatchStream (yields current value, then every change)
//! ```
//!
//! Per-watcher channels are `tokio::sync::watch` channels: a slow subscriber
//! never blocks writers and always converges on the latest state, skipping
//! intermediate values instead of reordering them.
//!
//! Writers notify while holding the data lock, and new subscriptions capture
//! the current value under the same lock, so a write can never fall between a
//! subscriber's first notification and its registration.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::Stream;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use tracing::trace;

use super::Store;
use super::Value;
use super::ValueWatch;
use crate::Payload;
use crate::Result;
use crate::StoreConfig;
use crate::StoreError;

/// Internal watcher state
#[derive(Debug)]
struct Watcher {
    /// Unique identifier
    id: u64,
    /// Latest-state channel feeding the subscriber's stream
    sender: watch::Sender<Option<Value>>,
}

struct MemStoreInner {
    /// Key-value storage, keys already prefixed
    data: RwLock<HashMap<String, Value>>,

    /// Watchers grouped by key
    watchers: DashMap<String, Vec<Watcher>>,

    /// Next watcher ID (monotonically increasing)
    next_id: AtomicU64,

    closed: AtomicBool,

    config: StoreConfig,
}

impl std::fmt::Debug for MemStoreInner {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MemStoreInner")
            .field("watchers", &self.watchers)
            .field("next_id", &self.next_id)
            .field("closed", &self.closed)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Process-local [`Store`] implementation.
///
/// Cloning is cheap and every clone shares the same data and watchers.
#[derive(Debug, Clone)]
pub struct MemStore {
    inner: Arc<MemStoreInner>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::build(StoreConfig::default())
    }

    /// # Errors
    /// [`Error::Config`](crate::Error::Config) if `config` fails validation
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(MemStoreInner {
                data: RwLock::new(HashMap::new()),
                watchers: DashMap::new(),
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                config,
            }),
        }
    }

    /// Encodes `payload` and writes it under `key`
    pub async fn set_payload(
        &self,
        key: &str,
        payload: impl Into<Payload>,
    ) -> std::result::Result<u64, StoreError> {
        let data = payload.into().encode()?;
        self.set(key, data).await
    }

    /// Stops serving the store.
    ///
    /// Every open subscription ends and further operations fail with
    /// [`StoreError::Closed`]. Calling it again has no effect.
    pub fn close(&self) {
        // Serialize with in-flight writers before dropping the senders.
        let _data = self.inner.data.write();
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let watchers = self.inner.watchers.len();
        self.inner.watchers.clear();
        debug!(watched_keys = watchers, "MemStore closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Get the number of open subscriptions for a specific key
    pub fn watcher_count(
        &self,
        key: &str,
    ) -> usize {
        let key = self.inner.config.apply_prefix(key);
        self.inner.watchers.get(&key).map(|w| w.len()).unwrap_or(0)
    }

    /// Get the total number of watched keys
    pub fn watched_key_count(&self) -> usize {
        self.inner.watchers.len()
    }

    fn ensure_open(&self) -> std::result::Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Pushes the key's new state to every subscriber.
    ///
    /// Callers hold the data write lock.
    fn notify(
        &self,
        key: &str,
        value: Option<Value>,
    ) {
        if let Some(watchers) = self.inner.watchers.get(key) {
            for watcher in watchers.iter() {
                watcher.sender.send_replace(value.clone());
            }

            trace!(
                key,
                deleted = value.is_none(),
                watchers = watchers.len(),
                "Change dispatched"
            );
        }
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get(
        &self,
        key: &str,
    ) -> std::result::Result<Option<Value>, StoreError> {
        self.ensure_open()?;
        let key = self.inner.config.apply_prefix(key);
        Ok(self.inner.data.read().get(&key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        data: Bytes,
    ) -> std::result::Result<u64, StoreError> {
        let key = self.inner.config.apply_prefix(key);
        let mut entries = self.inner.data.write();
        self.ensure_open()?;

        let version = entries.get(&key).map(|v| v.version() + 1).unwrap_or(1);
        let value = Value::new(data, version);
        entries.insert(key.clone(), value.clone());
        trace!(key = %key, version, "Applied set");

        self.notify(&key, Some(value));
        Ok(version)
    }

    async fn delete(
        &self,
        key: &str,
    ) -> std::result::Result<Value, StoreError> {
        let key = self.inner.config.apply_prefix(key);
        let mut entries = self.inner.data.write();
        self.ensure_open()?;

        let removed = entries.remove(&key).ok_or_else(|| StoreError::NotFound(key.clone()))?;
        trace!(key = %key, version = removed.version(), "Applied delete");

        self.notify(&key, None);
        Ok(removed)
    }

    async fn watch(
        &self,
        key: &str,
    ) -> std::result::Result<ValueWatch, StoreError> {
        let key = self.inner.config.apply_prefix(key);
        let entries = self.inner.data.read();
        self.ensure_open()?;

        let (sender, receiver) = watch::channel(entries.get(&key).cloned());
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .watchers
            .entry(key.clone())
            .or_default()
            .push(Watcher { id, sender });
        drop(entries);

        trace!(watcher_id = id, key = %key, "Watcher registered");

        Ok(Box::pin(MemValueWatch {
            inner: WatchStream::new(receiver),
            cleanup: WatcherCleanup {
                id,
                key,
                store: Arc::clone(&self.inner),
            },
        }))
    }
}

/// Metadata required to unregister a watcher once its stream is dropped
struct WatcherCleanup {
    id: u64,
    key: String,
    store: Arc<MemStoreInner>,
}

impl Drop for WatcherCleanup {
    fn drop(&mut self) {
        // Atomically drop the key entry once its last watcher is gone.
        self.store.watchers.remove_if_mut(&self.key, |_key, watchers| {
            watchers.retain(|w| w.id != self.id);
            watchers.is_empty()
        });
        trace!(watcher_id = self.id, key = %self.key, "Watcher unregistered");
    }
}

/// Subscription stream returned by [`MemStore::watch`]
struct MemValueWatch {
    inner: WatchStream<Option<Value>>,
    cleanup: WatcherCleanup,
}

impl Stream for MemValueWatch {
    type Item = Option<Value>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl std::fmt::Debug for MemValueWatch {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MemValueWatch")
            .field("id", &self.cleanup.id)
            .field("key", &self.cleanup.key)
            .finish_non_exhaustive()
    }
}
