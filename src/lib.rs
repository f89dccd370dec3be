//! # kvwatch
//!
//! Keeps in-process values synchronized with keys in a watchable key-value
//! store.
//!
//! A watch seeds a caller-owned [`Target`] from the store's current value,
//! then applies every later change that decodes to the expected type and
//! passes the caller's validation. Deleted keys fall back to the default.
//! Bad writes are dropped and never clobber the last good value.
//!
//! ```ignore
//! let store = MemStore::new();
//! store.set_payload("feature_enabled", true).await?;
//!
//! let flag = Arc::new(parking_lot::RwLock::new(false));
//! let handle = watch_and_update_bool(&store, "feature_enabled", flag.clone(), false, None).await?;
//! assert!(*flag.read());
//!
//! handle.shutdown().await;
//! ```

mod config;
mod errors;
mod store;
mod value;
mod watch;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use store::*;
pub use utils::*;
pub use value::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
