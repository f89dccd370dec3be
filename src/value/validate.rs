use std::sync::Arc;

use crate::BoxError;

/// Acceptance predicate over a decoded value.
///
/// Runs inline during decoding, both when a watch is created and inside its
/// background task, so it must not block.
pub type ValidateFn<T> = Arc<dyn Fn(&T) -> std::result::Result<(), BoxError> + Send + Sync>;

/// Wraps a closure into a [`ValidateFn`]
pub fn validate_fn<T, F>(f: F) -> ValidateFn<T>
where
    F: Fn(&T) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Runs `validate` against `value`; an absent predicate always succeeds
pub(crate) fn check<T>(
    validate: Option<&ValidateFn<T>>,
    value: &T,
) -> std::result::Result<(), BoxError> {
    match validate {
        Some(validate) => validate(value),
        None => Ok(()),
    }
}
