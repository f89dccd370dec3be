use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Whole seconds since the Unix epoch, rounded towards negative infinity
pub fn unix_seconds(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => since_epoch.as_secs() as i64,
        Err(e) => {
            let before_epoch = e.duration();
            let secs = before_epoch.as_secs() as i64;
            if before_epoch.subsec_nanos() > 0 {
                -secs - 1
            } else {
                -secs
            }
        }
    }
}

/// Builds an instant from a signed count of seconds since the Unix epoch.
///
/// Returns `None` when the instant is not representable on this platform.
pub fn from_unix_seconds(secs: i64) -> Option<SystemTime> {
    let offset = Duration::from_secs(secs.unsigned_abs());
    if secs >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
}
