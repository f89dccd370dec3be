use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::RwLock;

/// Caller-owned cell a watch keeps synchronized.
///
/// The watch only ever writes through [`Target::update_if`]; readers use
/// whatever read path the cell offers.
pub trait Target<T>: Send + Sync + 'static {
    /// Writes `value` if `admit` still holds once write access is held.
    ///
    /// `admit` must be evaluated after any wait for write access, right
    /// before the write. Returns whether the value was written.
    fn update_if(
        &self,
        value: T,
        admit: &dyn Fn() -> bool,
    ) -> bool;

    fn update(
        &self,
        value: T,
    ) {
        self.update_if(value, &|| true);
    }
}

/// Exclusive write, shared read. The lock is held for the assignment only.
impl<T: Send + Sync + 'static> Target<T> for RwLock<T> {
    fn update_if(
        &self,
        value: T,
        admit: &dyn Fn() -> bool,
    ) -> bool {
        let mut guard = self.write();
        if !admit() {
            return false;
        }
        let previous = std::mem::replace(&mut *guard, value);
        drop(guard);
        drop(previous);
        true
    }
}

/// Lock-free snapshot swap; readers `load()` an immutable snapshot.
impl<T: Send + Sync + 'static> Target<T> for ArcSwap<T> {
    fn update_if(
        &self,
        value: T,
        admit: &dyn Fn() -> bool,
    ) -> bool {
        if !admit() {
            return false;
        }
        self.store(Arc::new(value));
        true
    }
}
