//! Layered configuration.
//!
//! Sources, lowest precedence first:
//! - Default values
//! - TOML configuration file (`--config`, or `<config dir>/zatch/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the caller)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `ZATCH_` and use double
//! underscores to separate nested levels:
//! - `ZATCH_LATENCY_MS=100` sets `latency_ms`
//! - `ZATCH_LOGGING__DEFAULT=debug` sets `logging.default`
//! - `ZATCH_ON_RESOLUTION_FAILURE=abort` sets `on_resolution_failure`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths::ResolutionPolicy;

const ENV_PREFIX: &str = "ZATCH_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Coalescing hint passed to the notification source, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// List the watch roots on stdout before watching
    #[serde(default)]
    pub preflight: bool,

    /// Append the changed sub-path to every report
    #[serde(default)]
    pub sub_directories: bool,

    /// What to do with a directory that cannot be canonicalized
    #[serde(default)]
    pub on_resolution_failure: ResolutionPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_latency_ms() -> u64 {
    30
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            preflight: false,
            sub_directories: false,
            on_resolution_failure: ResolutionPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// `config_path` replaces the default settings file location.
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path);

        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(
                Env::prefixed(ENV_PREFIX).map(|key| {
                    key.as_str()
                        .to_lowercase()
                        .replace("__", ".") // Double underscore becomes dot
                        .into()
                }),
            )
            .extract()
            .map_err(Box::new)
    }

    /// `<config dir>/zatch/settings.toml`, if a config directory exists.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("zatch").join("settings.toml"))
    }

    /// Latency hint as a duration.
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.latency_ms, 30);
        assert_eq!(settings.latency(), Duration::from_millis(30));
        assert!(!settings.preflight);
        assert!(!settings.sub_directories);
        assert_eq!(settings.on_resolution_failure, ResolutionPolicy::Skip);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
preflight = true
sub_directories = true
on_resolution_failure = "abort"

[logging]
default = "info"

[logging.modules]
"zatch::watcher" = "trace"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load(Some(config_path.as_path())).unwrap();
        assert!(settings.preflight);
        assert!(settings.sub_directories);
        assert_eq!(settings.on_resolution_failure, ResolutionPolicy::Abort);
        assert_eq!(settings.logging.default, "info");
        assert_eq!(settings.logging.modules["zatch::watcher"], "trace");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(Some(temp_dir.path().join("absent.toml").as_path())).unwrap();
        assert!(!settings.preflight);
        assert_eq!(settings.on_resolution_failure, ResolutionPolicy::Skip);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "on_resolution_failure = \"sometimes\"\n").unwrap();

        assert!(Settings::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "latency_ms = 250\n").unwrap();

        unsafe {
            std::env::set_var("ZATCH_LATENCY_MS", "75");
        }

        let settings = Settings::load(Some(config_path.as_path())).unwrap();
        assert_eq!(settings.latency_ms, 75);

        unsafe {
            std::env::remove_var("ZATCH_LATENCY_MS");
        }
    }
}
