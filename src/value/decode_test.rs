use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use super::*;
use crate::test_utils::garbage_value;
use crate::test_utils::value_of;
use crate::BoxError;
use crate::Error;
use crate::Value;

fn must_be_true() -> ValidateFn<bool> {
    validate_fn(|v: &bool| -> std::result::Result<(), BoxError> {
        if *v {
            Ok(())
        } else {
            Err("val must be true".into())
        }
    })
}

fn at_most_twenty_f64() -> ValidateFn<f64> {
    validate_fn(|v: &f64| -> std::result::Result<(), BoxError> {
        if *v > 20.0 {
            return Err(format!("val must be <= 20, is {v}").into());
        }
        Ok(())
    })
}

fn at_most_twenty_i64() -> ValidateFn<i64> {
    validate_fn(|v: &i64| -> std::result::Result<(), BoxError> {
        if *v > 20 {
            return Err(format!("val must be <= 20, is {v}").into());
        }
        Ok(())
    })
}

fn starts_with_b() -> ValidateFn<String> {
    validate_fn(|v: &String| -> std::result::Result<(), BoxError> {
        if !v.starts_with('b') {
            return Err(format!("val must start with 'b', is {v}").into());
        }
        Ok(())
    })
}

fn two_elements() -> ValidateFn<Vec<String>> {
    validate_fn(|v: &Vec<String>| -> std::result::Result<(), BoxError> {
        if v.len() != 2 {
            return Err(format!("val must have 2 elements, has {}", v.len()).into());
        }
        Ok(())
    })
}

fn not_too_far_ahead() -> ValidateFn<SystemTime> {
    validate_fn(|v: &SystemTime| -> std::result::Result<(), BoxError> {
        if *v > SystemTime::now() + Duration::from_secs(60) {
            return Err("val must be at most one minute in the future".into());
        }
        Ok(())
    })
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn absent_value_should_return_default_without_validating() {
    assert!(!bool_from_value(None, "k", false, Some(&must_be_true())).unwrap());
    assert_eq!(int64_from_value(None, "k", 100, Some(&at_most_twenty_i64())).unwrap(), 100);
    assert_eq!(float64_from_value(None, "k", 99.5, Some(&at_most_twenty_f64())).unwrap(), 99.5);
    assert_eq!(
        string_from_value(None, "k", "abc".to_string(), Some(&starts_with_b())).unwrap(),
        "abc"
    );
    assert_eq!(
        string_array_from_value(None, "k", strings(&["x"]), Some(&two_elements())).unwrap(),
        strings(&["x"])
    );
    assert_eq!(time_from_value(None, "k", UNIX_EPOCH, None).unwrap(), UNIX_EPOCH);
}

#[test]
fn bool_from_value_should_decode_and_validate() {
    let value = value_of(true, 1);
    assert!(bool_from_value(Some(&value), "k", false, Some(&must_be_true())).unwrap());

    let value = value_of(false, 2);
    let err = bool_from_value(Some(&value), "k", true, Some(&must_be_true())).unwrap_err();
    assert!(matches!(err, Error::Validation { ref key, .. } if key == "k"));
    assert_eq!(err.to_string(), "validation failed for key k: val must be true");
}

#[test]
fn bool_from_value_should_reject_other_kinds() {
    let value = value_of(2.0f64, 1);

    let err = bool_from_value(Some(&value), "flags/enabled", false, None).unwrap_err();

    match err {
        Error::Decode { key, expected, found } => {
            assert_eq!(key, "flags/enabled");
            assert_eq!(expected, ValueKind::Bool);
            assert_eq!(found, "float64");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn int64_from_value_should_decode_and_validate() {
    let value = value_of(20i64, 1);
    assert_eq!(int64_from_value(Some(&value), "k", 0, Some(&at_most_twenty_i64())).unwrap(), 20);

    let value = value_of(22i64, 2);
    let err = int64_from_value(Some(&value), "k", 0, Some(&at_most_twenty_i64())).unwrap_err();
    assert_eq!(err.to_string(), "validation failed for key k: val must be <= 20, is 22");
}

#[test]
fn int64_from_value_should_not_accept_float_payload() {
    let value = value_of(3.0f64, 1);

    let err = int64_from_value(Some(&value), "k", 0, None).unwrap_err();

    assert!(matches!(err, Error::Decode { expected: ValueKind::Int64, .. }));
}

#[test]
fn float64_from_value_should_decode_and_validate() {
    let value = value_of(2.5f64, 1);
    assert_eq!(
        float64_from_value(Some(&value), "k", 0.0, Some(&at_most_twenty_f64())).unwrap(),
        2.5
    );

    let value = value_of(22.0f64, 2);
    let err = float64_from_value(Some(&value), "k", 0.0, Some(&at_most_twenty_f64())).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn float64_from_value_should_not_accept_int_payload() {
    let value = value_of(3i64, 1);

    let err = float64_from_value(Some(&value), "k", 0.0, None).unwrap_err();

    assert!(matches!(
        err,
        Error::Decode { expected: ValueKind::Float64, ref found, .. } if found == "int64"
    ));
}

#[test]
fn string_from_value_should_decode_and_validate() {
    let value = value_of("bar", 1);
    assert_eq!(
        string_from_value(Some(&value), "k", String::new(), Some(&starts_with_b())).unwrap(),
        "bar"
    );

    let value = value_of("foo", 2);
    let err = string_from_value(Some(&value), "k", String::new(), Some(&starts_with_b())).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn string_from_value_should_reject_other_kinds() {
    let value = value_of(strings(&["bar"]), 1);

    let err = string_from_value(Some(&value), "k", String::new(), None).unwrap_err();

    assert!(matches!(
        err,
        Error::Decode { expected: ValueKind::String, ref found, .. } if found == "string array"
    ));
}

#[test]
fn string_array_from_value_should_decode_and_validate() {
    let value = value_of(strings(&["a", "b"]), 1);
    assert_eq!(
        string_array_from_value(Some(&value), "k", vec![], Some(&two_elements())).unwrap(),
        strings(&["a", "b"])
    );

    let value = value_of(strings(&["a", "b", "c"]), 2);
    let err = string_array_from_value(Some(&value), "k", vec![], Some(&two_elements())).unwrap_err();
    assert_eq!(err.to_string(), "validation failed for key k: val must have 2 elements, has 3");
}

#[test]
fn string_array_from_value_should_accept_empty_array() {
    let value = value_of(Vec::<String>::new(), 1);

    assert!(string_array_from_value(Some(&value), "k", strings(&["x"]), None)
        .unwrap()
        .is_empty());
}

#[test]
fn time_from_value_should_decode_unix_seconds() {
    let value = value_of(1_700_000_000i64, 1);

    let t = time_from_value(Some(&value), "k", UNIX_EPOCH, Some(&not_too_far_ahead())).unwrap();

    assert_eq!(t, UNIX_EPOCH + Duration::from_secs(1_700_000_000));
}

#[test]
fn time_from_value_should_truncate_to_whole_seconds() {
    let written = UNIX_EPOCH + Duration::from_millis(1_700_000_000_999);
    let value = value_of(written, 1);

    let t = time_from_value(Some(&value), "k", UNIX_EPOCH, None).unwrap();

    assert_eq!(t, UNIX_EPOCH + Duration::from_secs(1_700_000_000));
}

#[test]
fn time_from_value_should_apply_validation() {
    let value = value_of(SystemTime::now() + Duration::from_secs(3600), 1);

    let err = time_from_value(Some(&value), "k", UNIX_EPOCH, Some(&not_too_far_ahead())).unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn time_from_value_should_reject_non_integer_payload() {
    let value = value_of("2024-01-01T00:00:00Z", 1);

    let err = time_from_value(Some(&value), "k", UNIX_EPOCH, None).unwrap_err();

    assert!(matches!(err, Error::Decode { expected: ValueKind::Time, .. }));
}

#[test]
fn malformed_payload_should_be_a_decode_error() {
    let value = garbage_value();

    let err = from_value::<String>(Some(&value), "k", String::new(), None).unwrap_err();

    match err {
        Error::Decode { expected, found, .. } => {
            assert_eq!(expected, ValueKind::String);
            assert!(found.starts_with("malformed payload"), "found: {found}");
        }
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn decode_error_should_not_consult_validator() {
    let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = calls.clone();
    let validate = validate_fn(move |_: &i64| -> std::result::Result<(), BoxError> {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    });
    let value = value_of(true, 1);

    assert!(int64_from_value(Some(&value), "k", 0, Some(&validate)).is_err());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn absent_time_should_return_default_even_if_validator_rejects_it() {
    let far_future = SystemTime::now() + Duration::from_secs(86_400);

    let t = time_from_value(None, "k", far_future, Some(&not_too_far_ahead())).unwrap();

    assert_eq!(t, far_future);
}

#[test]
fn string_array_from_value_should_reject_other_kinds() {
    let value = value_of("a,b", 1);

    let err = string_array_from_value(Some(&value), "k", vec![], None).unwrap_err();

    assert!(matches!(
        err,
        Error::Decode { expected: ValueKind::StringArray, ref found, .. } if found == "string"
    ));
}

#[test]
fn payload_with_trailing_bytes_should_be_a_decode_error() {
    let mut data = Payload::from(true).encode().unwrap().to_vec();
    data.extend_from_slice(b"garbage");
    let value = Value::new(data.into(), 1);

    let err = bool_from_value(Some(&value), "k", false, None).unwrap_err();

    assert!(matches!(err, Error::Decode { expected: ValueKind::Bool, .. }));
}
