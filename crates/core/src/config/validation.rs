//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

const MAX_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
const MAX_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const MAX_LEEWAY_SECS: u64 = 300;
const MIN_SECRET_BYTES: usize = 16;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_secs` is 0 or exceeds one day
    /// - `token_ttl_secs` is 0 or exceeds one week
    /// - `token_leeway_secs` exceeds 5 minutes
    /// - `jwt_secret` is set but shorter than 16 bytes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must not exceed one day".into() });
        }

        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "token_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid { field: "token_ttl_secs".into(), reason: "must not exceed one week".into() });
        }

        if self.token_leeway_secs > MAX_LEEWAY_SECS {
            return Err(ConfigError::Invalid {
                field: "token_leeway_secs".into(),
                reason: "must not exceed 5 minutes (300s)".into(),
            });
        }

        if let Some(secret) = &self.jwt_secret
            && secret.len() < MIN_SECRET_BYTES
        {
            return Err(ConfigError::Invalid {
                field: "jwt_secret".into(),
                reason: format!("must be at least {MIN_SECRET_BYTES} bytes"),
            });
        }

        if self.db_path == self.cache_path {
            tracing::warn!(
                path = %self.db_path.display(),
                "db_path and cache_path are the same file; notes and cache share one database"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cache_ttl_zero() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_cache_ttl_exceeds_limit() {
        let config = AppConfig { cache_ttl_secs: 86_401, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_token_ttl_bounds() {
        let config = AppConfig { token_ttl_secs: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "token_ttl_secs"));

        let config = AppConfig { token_ttl_secs: MAX_TOKEN_TTL_SECS + 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "token_ttl_secs"));
    }

    #[test]
    fn test_validate_leeway_limit() {
        let config = AppConfig { token_leeway_secs: 301, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "token_leeway_secs"));
    }

    #[test]
    fn test_validate_short_secret() {
        let config = AppConfig { jwt_secret: Some("short".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "jwt_secret"));
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig {
            cache_ttl_secs: MAX_CACHE_TTL_SECS,
            token_ttl_secs: MAX_TOKEN_TTL_SECS,
            token_leeway_secs: MAX_LEEWAY_SECS,
            jwt_secret: Some("0123456789abcdef".into()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
