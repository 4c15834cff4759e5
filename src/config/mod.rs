//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `NOTION_EXPORT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use notion_export::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Exporting into {}", config.export.output_dir.display());
//! ```

mod error;
mod export;
mod logging;
mod notion;

pub use error::{ConfigError, ValidationError};
pub use export::ExportConfig;
pub use logging::LoggingConfig;
pub use notion::NotionConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Content service configuration (API keys, endpoint, paging)
    #[serde(default)]
    pub notion: NotionConfig,

    /// Export configuration (sources, output, syntax)
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `NOTION_EXPORT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `NOTION_EXPORT__NOTION__API_KEYS=secret_a,secret_b` -> `notion.api_keys`
    /// - `NOTION_EXPORT__EXPORT__SOURCE_IDS=...` -> `export.source_ids`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NOTION_EXPORT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for missing API keys or sources, malformed
    /// source ids and out-of-range numbers.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.notion.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rendering::OutputSyntax;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const SOURCE: &str = "1429989fe8ac4effbc8f57f56486db54";

    fn set_minimal_env() {
        env::set_var("NOTION_EXPORT__NOTION__API_KEYS", "secret_a,secret_b");
        env::set_var("NOTION_EXPORT__EXPORT__SOURCE_IDS", SOURCE);
    }

    fn clear_env() {
        env::remove_var("NOTION_EXPORT__NOTION__API_KEYS");
        env::remove_var("NOTION_EXPORT__NOTION__PAGE_SIZE");
        env::remove_var("NOTION_EXPORT__EXPORT__SOURCE_IDS");
        env::remove_var("NOTION_EXPORT__EXPORT__SYNTAX");
        env::remove_var("NOTION_EXPORT__EXPORT__PRUNE_REMOVED");
        env::remove_var("NOTION_EXPORT__LOGGING__JSON");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.notion.api_key_list(), vec!["secret_a", "secret_b"]);
        assert_eq!(config.export.source_id_list().unwrap().len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.notion.page_size, 100);
        assert_eq!(config.export.syntax, OutputSyntax::Rich);
        assert_eq!(config.export.file_extension, "md");
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("NOTION_EXPORT__NOTION__PAGE_SIZE", "50");
        env::set_var("NOTION_EXPORT__EXPORT__SYNTAX", "plain");
        env::set_var("NOTION_EXPORT__EXPORT__PRUNE_REMOVED", "true");
        env::set_var("NOTION_EXPORT__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.notion.page_size, 50);
        assert_eq!(config.export.syntax, OutputSyntax::Plain);
        assert!(config.export.prune_removed);
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_keys_fail_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("NOTION_EXPORT__EXPORT__SOURCE_IDS", SOURCE);
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("NOTION__API_KEYS"))
        );
    }
}
