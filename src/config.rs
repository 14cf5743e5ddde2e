//! Configuration file handling
//!
//! Settings come from a TOML file (`auto-translations.toml` by default) and
//! fall back to built-in defaults for anything left unset:
//!
//! ```toml
//! lang_path = "resources/lang"
//! source_language = "en"
//! default_driver = "openai"
//! concurrency = 4
//!
//! [drivers.openai]
//! model = "gpt-4o-mini"
//! max_tokens = 4096
//!
//! [drivers.ollama]
//! api_url = "http://gpu-box:11434/v1"
//! model = "llama3"
//! timeout_secs = 120
//! ```
//!
//! API keys may be omitted from the file; each driver then reads its key from
//! the environment (see [`DriverConfig::api_key_or_env`]).

use crate::mt::batching::{DEFAULT_BUFFER_FACTOR, SizeUnit};
use crate::mt::engine::EngineOptions;
use crate::mt::error::{MtError, MtResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that points at the configuration file
pub const CONFIG_PATH_ENV: &str = "AUTO_TRANSLATIONS_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "auto-translations.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `<lang>.json` files and `<lang>/` directories
    pub lang_path: PathBuf,
    /// Language scanned when no `--lang` is given
    pub source_language: String,
    /// Driver used when no `--driver` is given
    pub default_driver: String,
    /// Batches dispatched at the same time
    pub concurrency: usize,
    /// Divisor applied to each driver's output budget
    pub buffer_factor: usize,
    /// Upper bound on any single provider request, on top of the driver's own timeout
    pub request_timeout_secs: Option<u64>,
    /// Per-driver options, keyed by driver name
    pub drivers: HashMap<String, DriverConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang_path: PathBuf::from("lang"),
            source_language: "en".to_string(),
            default_driver: "google".to_string(),
            concurrency: 1,
            buffer_factor: DEFAULT_BUFFER_FACTOR,
            request_timeout_secs: None,
            drivers: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> MtResult<Self> {
        toml::from_str(content).map_err(|e| MtError::ConfigError(e.to_string()))
    }

    /// Read configuration from `path`
    pub fn load(path: &Path) -> MtResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MtError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the configuration the CLI should use
    ///
    /// An explicit path must exist. Otherwise `$AUTO_TRANSLATIONS_CONFIG` is
    /// tried, then `./auto-translations.toml`, then built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> MtResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(Path::new(&path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::load(default_path);
        }

        Ok(Self::default())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            concurrency: self.concurrency.max(1),
            buffer_factor: self.buffer_factor.max(1),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Options recognized by every driver
///
/// Anything left as `None` falls back to the driver's own default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub api_key: Option<String>,
    /// Endpoint or base URL, depending on the driver
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    /// Output budget per request, in the driver's size unit
    pub max_tokens: Option<usize>,
    /// Override how request size is estimated
    pub size_unit: Option<SizeUnit>,
}

impl DriverConfig {
    /// The configured API key, or the value of `env_var`
    ///
    /// Blank values count as missing.
    pub fn api_key_or_env(&self, env_var: &str) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Same as [`api_key_or_env`](Self::api_key_or_env) but missing is an error
    pub fn require_api_key(&self, driver: &str, env_var: &str) -> MtResult<String> {
        self.api_key_or_env(env_var).ok_or_else(|| {
            MtError::ConfigError(format!(
                "No API key for driver '{}': set drivers.{}.api_key or {}",
                driver, driver, env_var
            ))
        })
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_secs.map(Duration::from_secs).unwrap_or(default)
    }

    pub fn api_url_or(&self, default: &str) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| default.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.lang_path, PathBuf::from("lang"));
        assert_eq!(config.default_driver, "google");
    }

    #[test]
    fn test_driver_sections() {
        let config = Config::from_toml_str(
            r#"
            default_driver = "ollama"
            concurrency = 3

            [drivers.ollama]
            api_url = "http://gpu-box:11434/v1/"
            model = "llama3"
            max_tokens = 8192
            temperature = 0.0
            size_unit = "chars"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_driver, "ollama");
        assert_eq!(config.engine_options().concurrency, 3);

        let ollama = &config.drivers["ollama"];
        assert_eq!(ollama.model.as_deref(), Some("llama3"));
        assert_eq!(ollama.max_tokens, Some(8192));
        assert_eq!(ollama.size_unit, Some(SizeUnit::Chars));
        assert_eq!(ollama.api_url_or("unused"), "http://gpu-box:11434/v1");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = Config::from_toml_str("langpath = \"lang\"");
        assert!(matches!(result, Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_engine_options_clamp_zero() {
        let config = Config {
            concurrency: 0,
            buffer_factor: 0,
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        let options = config.engine_options();
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.buffer_factor, 1);
        assert_eq!(options.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_configured_api_key_wins() {
        let config = DriverConfig {
            api_key: Some("from-file".to_string()),
            ..DriverConfig::default()
        };
        assert_eq!(
            config.api_key_or_env("AUTO_TRANSLATIONS_TEST_UNSET_KEY").as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = DriverConfig {
            api_key: Some("   ".to_string()),
            ..DriverConfig::default()
        };
        let result = config.require_api_key("google", "AUTO_TRANSLATIONS_TEST_UNSET_KEY");
        match result {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("drivers.google.api_key")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_timeout_default() {
        let config = DriverConfig::default();
        assert_eq!(config.timeout_or(Duration::from_secs(30)), Duration::from_secs(30));
    }
}
