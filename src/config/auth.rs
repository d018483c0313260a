use serde::{Deserialize, Serialize};

use super::ConfigError;

/// End-user identity configuration.
///
/// Sessions are terminated by an external authentication provider sitting in
/// front of the service. The provider forwards the signed-in user's subject
/// identifier in a header, which is trusted as-is.
///
/// ```toml
/// [auth]
/// identity_header = "X-User-Id"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Header carrying the authenticated user's subject identifier.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_header: default_identity_header(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if http::HeaderName::from_bytes(self.identity_header.as_bytes()).is_err() {
            return Err(ConfigError::Validation(format!(
                "auth.identity_header '{}' is not a valid header name",
                self.identity_header
            )));
        }
        Ok(())
    }
}

fn default_identity_header() -> String {
    "X-User-Id".to_string()
}
