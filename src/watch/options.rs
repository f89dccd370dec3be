use std::fmt;
use std::sync::Arc;

use crate::validate_fn;
use crate::BoxError;
use crate::Error;
use crate::ValidateFn;
use crate::WatchConfig;

/// Callback invoked with the key and the reason whenever a running watch
/// discards an update
pub type RejectionObserver = Arc<dyn Fn(&str, &Error) + Send + Sync>;

/// Per-watch settings, fixed for the lifetime of the watch
pub struct WatchOptions<T> {
    pub(crate) validate_fn: Option<ValidateFn<T>>,
    pub(crate) rejection_observer: Option<RejectionObserver>,
    pub(crate) warn_on_rejection: bool,
}

impl<T> WatchOptions<T> {
    pub fn new() -> Self {
        Self {
            validate_fn: None,
            rejection_observer: None,
            warn_on_rejection: false,
        }
    }

    /// Takes the logging settings from the loaded configuration
    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new().with_warn_on_rejection(config.warn_on_rejection)
    }

    /// Rejects decoded values for which `f` returns an error
    pub fn with_validate_fn<F>(
        mut self,
        f: F,
    ) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.validate_fn = Some(validate_fn(f));
        self
    }

    pub fn with_shared_validate_fn(
        mut self,
        f: ValidateFn<T>,
    ) -> Self {
        self.validate_fn = Some(f);
        self
    }

    /// Reports every update a running watch discards.
    ///
    /// The observer runs on the watch's background task and must not block.
    pub fn with_rejection_observer<F>(
        mut self,
        f: F,
    ) -> Self
    where
        F: Fn(&str, &Error) + Send + Sync + 'static,
    {
        self.rejection_observer = Some(Arc::new(f));
        self
    }

    pub fn with_warn_on_rejection(
        mut self,
        enabled: bool,
    ) -> Self {
        self.warn_on_rejection = enabled;
        self
    }

    pub fn validate_fn(&self) -> Option<&ValidateFn<T>> {
        self.validate_fn.as_ref()
    }
}

impl<T> Default for WatchOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for WatchOptions<T> {
    fn clone(&self) -> Self {
        Self {
            validate_fn: self.validate_fn.clone(),
            rejection_observer: self.rejection_observer.clone(),
            warn_on_rejection: self.warn_on_rejection,
        }
    }
}

impl<T> fmt::Debug for WatchOptions<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchOptions")
            .field("validate_fn", &self.validate_fn.is_some())
            .field("rejection_observer", &self.rejection_observer.is_some())
            .field("warn_on_rejection", &self.warn_on_rejection)
            .finish()
    }
}
