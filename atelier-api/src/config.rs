//! Runtime configuration for the HTTP layer.
//!
//! Everything is read from environment variables; the defaults suit local
//! development, where no variable is usually set.

use atelier_core::Locale;
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, localization, and idempotency.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origins allowed by CORS, e.g. "https://atelierhq.app". An empty
    /// list switches the layer to permissive dev mode.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Locale for user-facing interpreter messages.
    pub locale: Locale,

    /// Time-to-live for idempotency ledger entries, in seconds.
    pub idempotency_ttl_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            locale: Locale::En,
            idempotency_ttl_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Read the configuration from the environment.
    ///
    /// Recognized variables:
    /// - `ATELIER_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `ATELIER_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `ATELIER_LOCALE`: "en" or "he" (default: "en")
    /// - `ATELIER_IDEMPOTENCY_TTL_SECS`: Ledger entry lifetime (default: 86400)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("ATELIER_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("ATELIER_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let locale = std::env::var("ATELIER_LOCALE")
            .ok()
            .and_then(|tag| Locale::from_tag(&tag))
            .unwrap_or(Locale::En);

        let idempotency_ttl_secs = std::env::var("ATELIER_IDEMPOTENCY_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Self {
            cors_origins,
            cors_max_age_secs,
            locale,
            idempotency_ttl_secs,
        }
    }

    /// Idempotency ledger TTL as a Duration.
    pub fn idempotency_ttl(&self) -> Duration {
        Duration::from_secs(self.idempotency_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.idempotency_ttl(), Duration::from_secs(86400));
    }

    #[test]
    fn test_locale_override() {
        let config = ApiConfig {
            locale: Locale::He,
            ..ApiConfig::default()
        };
        assert_eq!(config.locale, Locale::He);
    }

    #[test]
    fn test_idempotency_ttl_conversion() {
        let config = ApiConfig {
            idempotency_ttl_secs: 60,
            ..ApiConfig::default()
        };
        assert_eq!(config.idempotency_ttl(), Duration::from_secs(60));
    }
}
