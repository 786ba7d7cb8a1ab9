//! Config (library root, notebook extension, logging) read from the app data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_data;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding the notebooks. Defaults to `~/.noteorganiser`.
    pub library_root: Option<String>,
    /// Extension of notebook files, without the dot.
    pub extension: String,
    /// Folder, next to the notebook, where preview markdown is written.
    pub preview_dir: String,
    /// One of trace|debug|info|warn|error.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_root: None,
            extension: "md".to_string(),
            preview_dir: ".temp".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// The configured library root, or the default one.
    pub fn library_root(&self) -> Option<PathBuf> {
        self.library_root
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(app_data::default_library_root)
    }

    /// Notebook file name for `name`, adding the extension when missing.
    pub fn notebook_file_name(&self, name: &str) -> String {
        let suffix = format!(".{}", self.extension);
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }
}

/// Path of the config file, if the app data directory is available.
pub fn config_path() -> Option<PathBuf> {
    app_data::app_data_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Load config from the app data directory. Returns default config if missing or invalid.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_config_from(&path).unwrap_or_default()
}

/// Load config from `path`, reporting read and parse failures.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&s).map_err(ConfigError::Parse)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(toml::de::Error),
}
