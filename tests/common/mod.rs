#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use kvwatch::Error;
use kvwatch::WatchOptions;
use tokio::time::sleep;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

pub const WAIT: Duration = Duration::from_secs(2);

/// Grace period after which a closed watch must have released everything
pub const GRACE_PERIOD: Duration = Duration::from_millis(100);

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

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

/// Counts rejected updates so tests can wait for a bad write to be processed
#[derive(Clone, Default)]
pub struct RejectionCounter(Arc<AtomicUsize>);

impl RejectionCounter {
    pub fn attach<T>(
        &self,
        options: WatchOptions<T>,
    ) -> WatchOptions<T> {
        let counter = self.0.clone();
        options.with_rejection_observer(move |_key: &str, _err: &Error| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
