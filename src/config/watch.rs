use serde::Deserialize;
use serde::Serialize;

/// Watch bridge settings
///
/// ```toml
/// [watch]
/// warn_on_rejection = false
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct WatchConfig {
    /// Log rejected updates at `warn` instead of `debug`.
    ///
    /// Rejected updates never reach the watch target either way; this only
    /// controls how loudly they are reported.
    ///
    /// **Default**: false
    #[serde(default)]
    pub warn_on_rejection: bool,
}
