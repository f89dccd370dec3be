use std::time::SystemTime;

use super::validate::check;
use super::Payload;
use super::ValidateFn;
use super::WatchValue;
use crate::Error;
use crate::Result;
use crate::Value;

/// Decodes a stored value into `T`.
///
/// - Absent value: returns `default` without consulting `validate`.
/// - Payload of another shape: [`Error::Decode`].
/// - Well-typed payload rejected by `validate`: [`Error::Validation`].
pub fn from_value<T: WatchValue>(
    value: Option<&Value>,
    key: &str,
    default: T,
    validate: Option<&ValidateFn<T>>,
) -> Result<T> {
    let Some(value) = value else {
        return Ok(default);
    };

    let decoded = decode_payload::<T>(value, key)?;
    check(validate, &decoded).map_err(|source| Error::Validation {
        key: key.to_string(),
        source,
    })?;

    Ok(decoded)
}

fn decode_payload<T: WatchValue>(
    value: &Value,
    key: &str,
) -> Result<T> {
    let payload = Payload::decode(value.data()).map_err(|e| Error::Decode {
        key: key.to_string(),
        expected: T::KIND,
        found: format!("malformed payload ({e})"),
    })?;

    T::from_payload(payload).map_err(|found| Error::Decode {
        key: key.to_string(),
        expected: T::KIND,
        found,
    })
}

pub fn bool_from_value(
    value: Option<&Value>,
    key: &str,
    default: bool,
    validate: Option<&ValidateFn<bool>>,
) -> Result<bool> {
    from_value(value, key, default, validate)
}

pub fn int64_from_value(
    value: Option<&Value>,
    key: &str,
    default: i64,
    validate: Option<&ValidateFn<i64>>,
) -> Result<i64> {
    from_value(value, key, default, validate)
}

pub fn float64_from_value(
    value: Option<&Value>,
    key: &str,
    default: f64,
    validate: Option<&ValidateFn<f64>>,
) -> Result<f64> {
    from_value(value, key, default, validate)
}

pub fn string_from_value(
    value: Option<&Value>,
    key: &str,
    default: String,
    validate: Option<&ValidateFn<String>>,
) -> Result<String> {
    from_value(value, key, default, validate)
}

pub fn string_array_from_value(
    value: Option<&Value>,
    key: &str,
    default: Vec<String>,
    validate: Option<&ValidateFn<Vec<String>>>,
) -> Result<Vec<String>> {
    from_value(value, key, default, validate)
}

/// Decodes Unix seconds into an instant
pub fn time_from_value(
    value: Option<&Value>,
    key: &str,
    default: SystemTime,
    validate: Option<&ValidateFn<SystemTime>>,
) -> Result<SystemTime> {
    from_value(value, key, default, validate)
}
