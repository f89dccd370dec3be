//! Keeps caller-owned values synchronized with store keys.
//!
//! [`watch_and_update`] seeds a [`Target`] from the store, then applies every
//! change that decodes and validates until the returned [`WatchHandle`] is
//! closed or dropped.

mod bridge;
mod options;
mod target;


pub use bridge::*;
pub use options::*;
pub use target::*;
