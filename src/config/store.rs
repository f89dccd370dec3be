use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Store-level settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Namespace prepended to every key as `"{prefix}/{key}"`.
    ///
    /// Empty means keys are used as given.
    #[serde(default)]
    pub prefix: String,
}

impl StoreConfig {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Applies the prefix to the key
    pub fn apply_prefix(
        &self,
        key: &str,
    ) -> String {
        if self.prefix.is_empty() {
            return key.to_string();
        }
        format!("{}/{}", self.prefix, key)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.ends_with('/') {
            return Err(Error::Config(ConfigError::Message(format!(
                "store.prefix must not end with '/': {:?}",
                self.prefix
            ))));
        }

        if self.prefix.chars().any(char::is_whitespace) {
            return Err(Error::Config(ConfigError::Message(format!(
                "store.prefix must not contain whitespace: {:?}",
                self.prefix
            ))));
        }

        Ok(())
    }
}
