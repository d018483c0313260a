//! Purge endpoint configuration.
//!
//! ```toml
//! [cleanup]
//! secret = "${CRON_SECRET}"
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration for `POST /api/cleanup`.
///
/// The retention window itself is fixed; only the shared secret is
/// configurable. Without a secret every purge request is refused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    /// Pre-shared bearer secret presented by the external trigger.
    #[serde(default)]
    pub secret: Option<String>,
}

impl CleanupConfig {
    /// The configured secret, if it is set and non-empty.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.secret
            && secret.trim() != secret
        {
            return Err(ConfigError::Validation(
                "cleanup.secret must not have leading or trailing whitespace".into(),
            ));
        }
        Ok(())
    }
}
