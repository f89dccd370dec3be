//! Store contract consumed by the watch engine.
//!
//! A store holds opaque versioned payloads and offers a change subscription
//! per key. [`MemStore`] is the in-process implementation; a networked backend
//! plugs in by implementing [`Store`].

mod mem_store;


pub use mem_store::*;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;

use crate::StoreError;

/// Payload held by the store for a key, with its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    data: Bytes,
    version: u64,
}

impl Value {
    pub fn new(
        data: Bytes,
        version: u64,
    ) -> Self {
        Self { data, version }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Starts at 1 and increases with every write to the key
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Change notifications for one key.
///
/// Each item is the key's current value, or `None` once it has been deleted.
/// Dropping the stream ends the subscription; the stream itself ends when the
/// store stops serving it.
pub type ValueWatch = BoxStream<'static, Option<Value>>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Returns `None` if the key does not exist
    async fn get(
        &self,
        key: &str,
    ) -> std::result::Result<Option<Value>, StoreError>;

    /// Writes `data` and returns the new version
    async fn set(
        &self,
        key: &str,
        data: Bytes,
    ) -> std::result::Result<u64, StoreError>;

    /// Removes the key and returns the value it held.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if the key does not exist
    async fn delete(
        &self,
        key: &str,
    ) -> std::result::Result<Value, StoreError>;

    /// Opens a change subscription on `key`
    async fn watch(
        &self,
        key: &str,
    ) -> std::result::Result<ValueWatch, StoreError>;
}
