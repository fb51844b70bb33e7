//! User configuration in `config.toml`
//!
//! Looked up at `$PRMERGE_CONFIG`, falling back to the platform config
//! directory (`~/.config/prmerge/config.toml` on Linux).

use crate::error::{Error, Result};
use crate::types::MergeMethod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PRMERGE_CONFIG";

/// Directory name under the platform config directory
const CONFIG_DIR: &str = "prmerge";

/// Filename for the configuration
const CONFIG_FILE: &str = "config.toml";

/// User configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Remote used for repository detection and base branch checkouts
    pub remote: Option<String>,
    /// GitHub settings
    pub github: GitHubConfig,
    /// Merge defaults
    pub merge: MergeConfig,
}

/// `[github]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// GitHub Enterprise host for `--repo OWNER/REPO`
    pub host: Option<String>,
}

/// `[merge]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    /// Method used when no method flag is given
    pub method: Option<MergeMethod>,
}

/// Path of the config file, if one can be determined
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the config from its default location
///
/// Returns defaults if there is no config file.
pub fn load_config() -> Result<Config> {
    config_path().map_or_else(|| Ok(Config::default()), |path| load_config_from(&path))
}

/// Load the config from `path`
///
/// Returns defaults if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}
