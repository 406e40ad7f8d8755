//! Configuration management for infrastructure services
//!
//! Sources, lowest precedence first:
//! - the preset for the detected environment (`AppConfig::from_env`)
//! - `config/default.toml`, then `config/config.{environment}.toml`
//! - `VERIGATE__*` environment variables, `__` separating nested keys
//!   (e.g. `VERIGATE__CACHE__URL`)
//!
//! A `.env` file in the working directory is loaded first.

use ::config::{Config, Environment as EnvSource, File};
use std::path::Path;
use vg_shared::AppConfig;

use crate::InfrastructureError;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "VERIGATE";

/// Load the application configuration from the default locations
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present
    load_config_from(Path::new("config"))
}

/// Load the application configuration, reading TOML files from `dir`
pub fn load_config_from(dir: &Path) -> Result<AppConfig, InfrastructureError> {
    let preset = AppConfig::from_env();
    let environment = preset.environment;

    let settings = Config::builder()
        .add_source(Config::try_from(&preset).map_err(config_error)?)
        .add_source(File::from(dir.join("default.toml")).required(false))
        .add_source(File::from(dir.join(environment.config_file())).required(false))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(config_error)?;

    let config: AppConfig = settings.try_deserialize().map_err(config_error)?;

    tracing::debug!(
        environment = %config.environment,
        cache_backend = ?config.cache.backend,
        delivery_provider = ?config.delivery.provider,
        "Configuration loaded"
    );

    Ok(config)
}

fn config_error(error: ::config::ConfigError) -> InfrastructureError {
    InfrastructureError::Config(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vg_shared::CacheBackend;

    #[test]
    fn test_file_overrides_preset() {
        let dir = std::env::temp_dir().join(format!("verigate-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut file = std::fs::File::create(dir.join("default.toml")).unwrap();
        writeln!(
            file,
            r#"
[cache]
backend = "memory"
key_prefix = "test"

[verification.email_verify]
namespace = "email-verify"
ttl_seconds = 120
max_attempts = 3
code_length = 8
rate_limit_window_seconds = 60
rate_limit_max = 2
"#
        )
        .unwrap();

        let config = load_config_from(&dir).unwrap();
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.key_prefix.as_deref(), Some("test"));
        assert_eq!(config.verification.email_verify.ttl_seconds, 120);
        assert_eq!(config.verification.email_verify.code_length, 8);
        // Untouched sections keep their defaults
        assert_eq!(config.verification.password_reset.rate_limit_max, 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_files_fall_back_to_preset() {
        let dir = std::env::temp_dir().join(format!("verigate-empty-{}", uuid::Uuid::new_v4()));
        let config = load_config_from(&dir).unwrap();
        assert_eq!(config.verification.email_verify.namespace, "email-verify");
    }
}
