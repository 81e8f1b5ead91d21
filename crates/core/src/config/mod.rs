//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NOTEKEEP_*)
//! 2. TOML config file (if NOTEKEEP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NOTEKEEP_*)
/// 2. TOML config file (if NOTEKEEP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite note database.
    ///
    /// Set via NOTEKEEP_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to the SQLite cache database. May equal `db_path`.
    ///
    /// Set via NOTEKEEP_CACHE_PATH environment variable.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// HMAC secret for bearer token verification.
    ///
    /// Set via NOTEKEEP_JWT_SECRET environment variable.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued tokens in seconds.
    ///
    /// Set via NOTEKEEP_TOKEN_TTL_SECS environment variable.
    #[serde(default = "default_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Clock skew tolerated when checking token expiry.
    ///
    /// Set via NOTEKEEP_TOKEN_LEEWAY_SECS environment variable.
    #[serde(default)]
    pub token_leeway_secs: u64,

    /// Lifetime of the per-user note list cache entry.
    ///
    /// Set via NOTEKEEP_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("cache_path", &self.cache_path)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./notekeep.sqlite")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./notekeep-cache.sqlite")
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_path: default_cache_path(),
            jwt_secret: None,
            token_ttl_secs: default_ttl_secs(),
            token_leeway_secs: 0,
            cache_ttl_secs: default_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NOTEKEEP_`
    /// 2. TOML file from `NOTEKEEP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NOTEKEEP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NOTEKEEP_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The token secret, required before serving any request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the secret is not set.
    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "jwt_secret".into(),
            hint: "Set NOTEKEEP_JWT_SECRET environment variable".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./notekeep.sqlite"));
        assert_eq!(config.cache_path, PathBuf::from("./notekeep-cache.sqlite"));
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.token_leeway_secs, 0);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_require_jwt_secret_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_jwt_secret(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_jwt_secret_present() {
        let config = AppConfig { jwt_secret: Some("0123456789abcdef".into()), ..Default::default() };
        assert_eq!(config.require_jwt_secret().unwrap(), "0123456789abcdef");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig { jwt_secret: Some("super-secret-value".into()), ..Default::default() };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "notekeep.toml",
                r#"
                db_path = "/data/notes.sqlite"
                cache_ttl_secs = 600
                "#,
            )?;
            jail.set_env("NOTEKEEP_CONFIG_FILE", "notekeep.toml");
            jail.set_env("NOTEKEEP_CACHE_TTL_SECS", "900");
            jail.set_env("NOTEKEEP_JWT_SECRET", "0123456789abcdef");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.db_path, PathBuf::from("/data/notes.sqlite"));
            assert_eq!(config.cache_ttl_secs, 900);
            assert_eq!(config.require_jwt_secret().unwrap(), "0123456789abcdef");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NOTEKEEP_CACHE_TTL_SECS", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
            Ok(())
        });
    }
}
