use std::time::SystemTime;

use bincode::Options;
use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;

use super::ValueKind;
use crate::time::unix_seconds;
use crate::StoreError;

/// Wire representation of a stored value.
///
/// The encoding is tagged, so a payload written as one kind can never be
/// mistaken for another when it is read back. Time instants travel as
/// [`Payload::Int64`] Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    StringArray(Vec<String>),
}

impl Payload {
    pub fn encode(&self) -> std::result::Result<Bytes, StoreError> {
        Ok(Bytes::from(codec().serialize(self)?))
    }

    /// Fails unless `data` is exactly one encoded payload
    pub fn decode(data: &[u8]) -> std::result::Result<Self, bincode::Error> {
        codec().deserialize(data)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Payload::Bool(_) => ValueKind::Bool,
            Payload::Int64(_) => ValueKind::Int64,
            Payload::Float64(_) => ValueKind::Float64,
            Payload::String(_) => ValueKind::String,
            Payload::StringArray(_) => ValueKind::StringArray,
        }
    }
}

/// Fixed-width integers, as `bincode::serialize`; trailing bytes are an error
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Bool(v)
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Payload::Int64(v)
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Float64(v)
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::String(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::String(v.to_string())
    }
}

impl From<Vec<String>> for Payload {
    fn from(v: Vec<String>) -> Self {
        Payload::StringArray(v)
    }
}

impl From<SystemTime> for Payload {
    fn from(t: SystemTime) -> Self {
        Payload::Int64(unix_seconds(t))
    }
}
