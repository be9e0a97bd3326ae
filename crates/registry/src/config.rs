//! Service configuration.
//!
//! Values come from an optional TOML file, then from environment variables
//! prefixed with `CODEGUARD__`. A double underscore separates nesting levels:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CODEGUARD__SHARED_SECRET` | `shared_secret` |
//! | `CODEGUARD__STORE__PATH` | `store.path` |
//! | `CODEGUARD__STORE__LOCK` | `store.lock` |
//! | `CODEGUARD__STORE__LIMITS__MAX_CODE_LEN` | `store.limits.max_code_len` |
//!
//! ```toml
//! shared_secret = "change-me"
//!
//! [store]
//! path = "/var/lib/codeguard/codes.txt"
//! seed_codes = ["123ABC", "456DEF", "WHXGPO"]
//! ```

use codeguard_authn::SharedSecret;
use codeguard_storage::FileStoreConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CODEGUARD";

/// File consulted when no explicit path is given. Optional; the extension is
/// inferred.
pub const DEFAULT_CONFIG_NAME: &str = "codeguard";

/// Top-level configuration for [`RegistryService`](crate::RegistryService).
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Secret that authorizes mutations.
    pub shared_secret: SharedSecret,

    /// Durable store settings.
    pub store: FileStoreConfig,
}

impl RegistryConfig {
    /// Loads configuration from `path` (or [`DEFAULT_CONFIG_NAME`] if present)
    /// overlaid with `CODEGUARD__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Config`] if an explicit file is missing or
    /// unparsable, a required value is absent, the secret is empty, or the
    /// store settings are invalid.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    pub(crate) fn load_with_env(path: Option<&str>, env: config::Environment) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = match path {
            Some(path) => builder.add_source(config::File::with_name(path)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        let settings = builder
            .add_source(env)
            .build()
            .map_err(|e| RegistryError::config(format!("failed to load configuration: {e}")))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| RegistryError::config(format!("failed to parse configuration: {e}")))?;

        config
            .store
            .validate()
            .map_err(|e| RegistryError::config(format!("invalid store configuration: {e}")))?;

        debug!(path = %config.store.path().display(), "loaded registry configuration");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        config::Environment::with_prefix(ENV_PREFIX).separator("__").source(Some(source))
    }

    #[test]
    fn loads_entirely_from_environment() {
        let config = RegistryConfig::load_with_env(
            None,
            env(&[
                ("CODEGUARD__SHARED_SECRET", "s3cret"),
                ("CODEGUARD__STORE__PATH", "/tmp/codeguard/codes.txt"),
                ("CODEGUARD__STORE__LOCK", "false"),
            ]),
        )
        .expect("load");

        assert!(config.shared_secret.verify("s3cret").is_ok());
        assert_eq!(config.store.path(), std::path::Path::new("/tmp/codeguard/codes.txt"));
        assert!(!config.store.lock());
    }

    #[test]
    fn numeric_looking_secret_stays_a_string() {
        let config = RegistryConfig::load_with_env(
            None,
            env(&[
                ("CODEGUARD__SHARED_SECRET", "007"),
                ("CODEGUARD__STORE__PATH", "/tmp/codeguard/codes.txt"),
            ]),
        )
        .expect("load");
        assert!(config.shared_secret.verify("007").is_ok());
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("codeguard.toml");
        fs::write(
            &file,
            r#"
shared_secret = "from-file"

[store]
path = "/srv/codes.txt"
seed_codes = ["123ABC", "456DEF", "WHXGPO"]

[store.limits]
max_code_len = 16
"#,
        )
        .expect("write config");

        let config = RegistryConfig::load_with_env(
            file.to_str(),
            env(&[("CODEGUARD__SHARED_SECRET", "from-env")]),
        )
        .expect("load");

        assert!(config.shared_secret.verify("from-env").is_ok());
        assert!(config.shared_secret.verify("from-file").is_err());
        assert_eq!(config.store.path(), std::path::Path::new("/srv/codes.txt"));
        assert_eq!(config.store.seed_codes(), ["123ABC", "456DEF", "WHXGPO"]);
        assert_eq!(config.store.limits().max_code_len(), 16);
    }

    #[test]
    fn missing_secret_is_config_error() {
        let err = RegistryConfig::load_with_env(
            None,
            env(&[("CODEGUARD__STORE__PATH", "/tmp/codeguard/codes.txt")]),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn empty_secret_is_config_error() {
        let err = RegistryConfig::load_with_env(
            None,
            env(&[
                ("CODEGUARD__SHARED_SECRET", ""),
                ("CODEGUARD__STORE__PATH", "/tmp/codeguard/codes.txt"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "got {err}");
    }

    #[test]
    fn invalid_seed_code_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("codeguard.toml");
        fs::write(
            &file,
            "shared_secret = \"s\"\n[store]\npath = \"/srv/codes.txt\"\nseed_codes = [\"  \"]\n",
        )
        .expect("write config");

        let err = RegistryConfig::load_with_env(file.to_str(), env(&[])).unwrap_err();
        assert!(err.to_string().contains("seed_codes"), "got {err}");
    }

    #[test]
    fn explicit_missing_file_is_config_error() {
        let err =
            RegistryConfig::load_with_env(Some("/nonexistent/codeguard.toml"), env(&[])).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
