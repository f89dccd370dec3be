use std::fmt;
use std::time::SystemTime;

use super::Payload;
use crate::time::from_unix_seconds;

/// Shapes a watched value can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int64,
    Float64,
    String,
    StringArray,
    /// Stored as [`ValueKind::Int64`] Unix seconds
    Time,
}

impl fmt::Display for ValueKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int64 => "int64",
            ValueKind::Float64 => "float64",
            ValueKind::String => "string",
            ValueKind::StringArray => "string array",
            ValueKind::Time => "time",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
    impl Sealed for Vec<String> {}
    impl Sealed for std::time::SystemTime {}
}

/// Closed set of types a watch can keep synchronized.
///
/// Implemented for `bool`, `i64`, `f64`, `String`, `Vec<String>` and
/// `SystemTime`; the trait is sealed.
pub trait WatchValue: sealed::Sealed + Clone + Send + Sync + 'static {
    const KIND: ValueKind;

    /// Interprets a decoded payload as `Self`.
    ///
    /// On mismatch returns a description of what was found instead.
    fn from_payload(payload: Payload) -> std::result::Result<Self, String>;
}

impl WatchValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_payload(payload: Payload) -> std::result::Result<Self, String> {
        match payload {
            Payload::Bool(v) => Ok(v),
            other => Err(other.kind().to_string()),
        }
    }
}

impl WatchValue for i64 {
    const KIND: ValueKind = ValueKind::Int64;

    fn from_payload(payload: Payload) -> std::result::Result<Self, String> {
        match payload {
            Payload::Int64(v) => Ok(v),
            other => Err(other.kind().to_string()),
        }
    }
}

impl WatchValue for f64 {
    const KIND: ValueKind = ValueKind::Float64;

    fn from_payload(payload: Payload) -> std::result::Result<Self, String> {
        match payload {
            Payload::Float64(v) => Ok(v),
            other => Err(other.kind().to_string()),
        }
    }
}

impl WatchValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_payload(payload: Payload) -> std::result::Result<Self, String> {
        match payload {
            Payload::String(v) => Ok(v),
            other => Err(other.kind().to_string()),
        }
    }
}

impl WatchValue for Vec<String> {
    const KIND: ValueKind = ValueKind::StringArray;

    fn from_payload(payload: Payload) -> std::result::Result<Self, String> {
        match payload {
            Payload::StringArray(v) => Ok(v),
            other => Err(other.kind().to_string()),
        }
    }
}

impl WatchValue for SystemTime {
    const KIND: ValueKind = ValueKind::Time;

    fn from_payload(payload: Payload) -> std::result::Result<Self, String> {
        match payload {
            Payload::Int64(secs) => from_unix_seconds(secs)
                .ok_or_else(|| format!("int64 {secs} outside the representable time range")),
            other => Err(other.kind().to_string()),
        }
    }
}
