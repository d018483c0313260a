//! Configuration module for Routinely.
//!
//! The service is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [database]
//! type = "sqlite"
//! path = "routinely.db"
//!
//! [cleanup]
//! secret = "${CRON_SECRET}"
//! ```

mod auth;
mod cleanup;
mod database;
mod observability;
mod server;

use std::path::Path;

pub use auth::*;
pub use cleanup::*;
pub use database::*;
pub use observability::*;
use serde::{Deserialize, Serialize};
pub use server::*;

/// Root configuration.
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration for persistent storage.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// End-user identity configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Purge endpoint configuration.
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Observability configuration (logging, metrics).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let config: AppConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.auth.validate()?;
        self.cleanup.validate()?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR}` references, ignoring anything after a `#` on the line.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');

        let mut line_result = String::with_capacity(line.len());
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            line_result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            line_result.push_str(&value);

            last_end = whole.end();
        }

        line_result.push_str(&line[last_end..]);
        result.push_str(&line_result);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.is_none());
        assert_eq!(config.auth.identity_header, "X-User-Id");
        assert!(config.cleanup.secret.is_none());
        assert!(!config.observability.metrics.enabled);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AppConfig::from_str("[server]\nbogus = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("ROUTINELY_TEST_SECRET", Some("s3cret"), || {
            let config =
                AppConfig::from_str("[cleanup]\nsecret = \"${ROUTINELY_TEST_SECRET}\"\n").unwrap();
            assert_eq!(config.cleanup.secret.as_deref(), Some("s3cret"));
        });
    }

    #[test]
    fn test_missing_env_var_errors() {
        temp_env::with_var_unset("ROUTINELY_TEST_MISSING", || {
            let err =
                AppConfig::from_str("[cleanup]\nsecret = \"${ROUTINELY_TEST_MISSING}\"\n")
                    .unwrap_err();
            assert!(
                matches!(err, ConfigError::EnvVarNotFound(ref name) if name == "ROUTINELY_TEST_MISSING")
            );
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        temp_env::with_var_unset("ROUTINELY_TEST_COMMENTED", || {
            let input = "# secret = \"${ROUTINELY_TEST_COMMENTED}\"\n[server]\nport = 4000\n";
            let config = AppConfig::from_str(input).unwrap();
            assert_eq!(config.server.port, 4000);
        });
    }

    #[test]
    fn test_env_var_before_comment_expanded() {
        temp_env::with_var("ROUTINELY_TEST_PORT", Some("4100"), || {
            let input = "[server]\nport = ${ROUTINELY_TEST_PORT} # ${NOT_EXPANDED}\n";
            let config = AppConfig::from_str(input).unwrap();
            assert_eq!(config.server.port, 4100);
        });
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routinely.toml");
        std::fs::write(&path, "[server]\nport = 8181\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 8181);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }

    #[cfg(feature = "database-sqlite")]
    #[test]
    fn test_sqlite_database_config() {
        let config = AppConfig::from_str(
            r#"
[database]
type = "sqlite"
path = "data/routinely.db"
"#,
        )
        .unwrap();

        match config.database {
            DatabaseConfig::Sqlite(cfg) => {
                assert_eq!(cfg.path, "data/routinely.db");
                assert!(cfg.create_if_missing);
                assert!(cfg.run_migrations);
            }
            other => panic!("expected sqlite config, got {:?}", other),
        }
    }
}
