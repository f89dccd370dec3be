use std::time::Duration;

use bytes::Bytes;
use tokio::time::sleep;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::Payload;
use crate::Value;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Builds a stored value holding `payload`
pub fn value_of(
    payload: impl Into<Payload>,
    version: u64,
) -> Value {
    let data = payload.into().encode().expect("payload should encode");
    Value::new(data, version)
}

/// Bytes no payload decodes from
pub fn garbage_value() -> Value {
    Value::new(Bytes::from_static(&[0xff, 0xff, 0xff, 0xff, 0xff]), 1)
}

/// Polls `condition` until it holds, panicking after `timeout`
pub async fn wait_until<F>(
    timeout: Duration,
    mut condition: F,
) where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while !condition() {
        if Instant::now() >= deadline {
            panic!("condition not met within {timeout:?}");
        }
        sleep(Duration::from_millis(5)).await;
    }
}
