//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Backing store selection and Redis connection settings
//! - `delivery` - Where generated codes are handed off for mailing
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Per-namespace code policies and hashing cost

pub mod cache;
pub mod delivery;
pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::{CacheBackend, CacheConfig};
pub use delivery::{DeliveryConfig, DeliveryProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::{
    CodeCharset, HasherConfig, NamespacePolicy, VerificationConfig, EMAIL_VERIFY_NAMESPACE,
    PASSWORD_RESET_NAMESPACE,
};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Backing store configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Verification policies
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Code delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    ///
    /// Uses the in-process store and logs codes instead of queueing mail.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                ..CacheConfig::default()
            },
            verification: VerificationConfig::default(),
            delivery: DeliveryConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            cache: CacheConfig::new("redis://redis:6379").with_prefix("verigate"),
            verification: VerificationConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        if std::env::var("REDIS_URL").is_ok() {
            config.cache = CacheConfig::from_env();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_uses_memory_store() {
        let config = AppConfig::development();
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.delivery.provider, DeliveryProvider::Log);
    }

    #[test]
    fn test_production_uses_redis() {
        let config = AppConfig::production();
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.make_key("a:b:code"), "verigate:a:b:code");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{ "environment": "staging", "cache": { "url": "redis://cache:6379" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.cache.url, "redis://cache:6379");
        assert_eq!(config.verification.email_verify.max_attempts, 5);
    }
}
