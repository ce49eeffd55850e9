use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{ReqsError, Result};
use crate::locate::DEFAULT_NPM_EXCLUDE;
use crate::tool::SystemTool;

/// User defaults, read from `config.toml` in the platform config directory
/// (e.g. `~/.config/reqs/config.toml`). Command-line flags take precedence.
///
/// ```toml
/// tool = "apt"
/// recurse = true
/// list_with_sudo = false
/// npm_exclude = ["node_modules", "bower_components", "vendor"]
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Skip detection and use this system tool.
    pub tool: Option<SystemTool>,
    /// Recurse into subdirectories by default.
    pub recurse: bool,
    /// Run installed-package queries through `sudo`.
    pub list_with_sudo: bool,
    /// Directory names pruned when looking for npm packages.
    pub npm_exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: None,
            recurse: false,
            list_with_sudo: false,
            npm_exclude: DEFAULT_NPM_EXCLUDE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Loads a config file.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or is not valid config TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReqsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ReqsError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads `explicit` if given, else the default config file if it exists,
    /// else the built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            return Config::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!("Loading config from {}", path.display());
                Config::load(path)
            }
            _ => Ok(Config::default()),
        }
    }
}

/// `config.toml` inside the platform config directory for `reqs`.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "reqs", "reqs").map(|dirs| dirs.config_dir().join("config.toml"))
}
