use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_DIR_NAME: &str = "edid-decode";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no local configuration directory.
    #[error("Default configuration file path is not available")]
    NotAvailable,
    #[error("Couldn't read {0}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("Couldn't strip comments from {0}: {1}")]
    Strip(PathBuf, String),
    #[error("Invalid configuration in {0}: {1}")]
    Parse(PathBuf, serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecodeConfig {
    /// One of off, error, warn, info, debug or trace
    pub log_level: String,
    /// Pretty-print the decoded JSON
    pub pretty: bool,
    /// Print the conformance report to stderr
    pub print_failures: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            log_level: "info".to_string(),
            pretty: true,
            print_failures: true,
        }
    }
}

impl DecodeConfig {
    /// The configured level, `Info` if it doesn't name one.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Parses a configuration file's contents. Comments are allowed.
    pub fn from_json(mut source: Vec<u8>, path: &Path) -> Result<Self, ConfigError> {
        let slice = source.as_mut_slice();
        json_strip_comments::strip_slice(slice)
            .map_err(|e| ConfigError::Strip(path.to_path_buf(), e.to_string()))?;
        serde_json::from_slice::<DecodeConfig>(slice)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}

pub fn get_default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_local_dir()
        .map(|path| path.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NotAvailable)
}

/// Loads the configuration from the default path. A missing file is not an
/// error and yields the defaults.
pub fn load_config() -> Result<DecodeConfig, ConfigError> {
    let path = get_default_config_path()?;
    match fs::read(&path) {
        Ok(source) => DecodeConfig::from_json(source, &path),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(DecodeConfig::default()),
        Err(e) => Err(ConfigError::Io(path, e)),
    }
}
