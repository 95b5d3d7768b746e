//! datemark configuration.
//!
//! Settings are layered: built-in defaults, then `~/.config/datemark/config.toml`,
//! then `DATEMARK_*` environment variables (e.g. `DATEMARK_HOLIDAY_COUNTRY=DE`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatemarkError, DatemarkResult};
use crate::holidays::DEFAULT_HOLIDAY_API;

static DEFAULT_STORE_PATH: &str = "~/.local/share/datemark/events.json";
static DEFAULT_LOG_LEVEL: &str = "warn";

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

fn default_holiday_api() -> String {
    DEFAULT_HOLIDAY_API.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatemarkConfig {
    /// Where the event store lives; `~` is expanded
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Country for the holiday overlay; no overlay when unset
    #[serde(default)]
    pub holiday_country: Option<String>,

    #[serde(default = "default_holiday_api")]
    pub holiday_api: String,

    /// Default tracing filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DatemarkConfig {
    fn default() -> Self {
        DatemarkConfig {
            store_path: default_store_path(),
            holiday_country: None,
            holiday_api: default_holiday_api(),
            log_level: default_log_level(),
        }
    }
}

impl DatemarkConfig {
    pub fn config_path() -> DatemarkResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DatemarkError::Config("Could not determine config directory".into()))?
            .join("datemark");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path and the environment.
    pub fn load() -> DatemarkResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (optional) and the environment.
    pub fn load_from(path: &Path) -> DatemarkResult<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix("DATEMARK"))
            .build()
            .map_err(|e| DatemarkError::Config(e.to_string()))?;

        let loaded: DatemarkConfig = settings
            .try_deserialize()
            .map_err(|e| DatemarkError::Config(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), config = ?loaded, "Loaded configuration");
        Ok(loaded)
    }

    /// The store path with `~` expanded.
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store_path).into_owned())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DatemarkResult<()> {
        let contents = format!(
            "\
# datemark configuration

# Where events are stored:
# store_path = \"{}\"

# Show public holidays for this country (ISO 3166-1 alpha-2):
# holiday_country = \"US\"

# Holiday API base URL:
# holiday_api = \"{}\"

# Log level (overridden by RUST_LOG):
# log_level = \"{}\"
",
            DEFAULT_STORE_PATH, DEFAULT_HOLIDAY_API, DEFAULT_LOG_LEVEL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatemarkError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DatemarkError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_loads_as_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datemark/config.toml");

        DatemarkConfig::create_default_config(&path).unwrap();
        let config = DatemarkConfig::load_from(&path).unwrap();

        assert_eq!(config.store_path, DEFAULT_STORE_PATH);
        assert_eq!(config.holiday_api, DEFAULT_HOLIDAY_API);
        assert_eq!(config.holiday_country, None);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "store_path = \"/tmp/datemark/events.json\"\nholiday_country = \"DE\"\n",
        )
        .unwrap();

        let config = DatemarkConfig::load_from(&path).unwrap();

        assert_eq!(config.store_path(), PathBuf::from("/tmp/datemark/events.json"));
        assert_eq!(config.holiday_country.as_deref(), Some("DE"));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store_path = [").unwrap();

        assert!(matches!(
            DatemarkConfig::load_from(&path),
            Err(DatemarkError::Config(_))
        ));
    }
}
