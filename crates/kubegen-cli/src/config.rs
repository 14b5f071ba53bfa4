//! `kubegen.toml` configuration
//!
//! ```toml
//! [output]
//! format = "yaml"        # or "json"
//! pretty = false
//! directory = "manifests"
//! extension = "by-content-type"   # or "always-structured"
//! ```
//!
//! Command-line flags take precedence over file values.

use std::fs;
use std::path::{Path, PathBuf};

use kubegen_core::{ExtensionPolicy, Format};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "kubegen.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Format,
    pub pretty: bool,
    pub directory: PathBuf,
    pub extension: ExtensionPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: Format::Yaml,
            pretty: false,
            directory: PathBuf::from("."),
            extension: ExtensionPolicy::default(),
        }
    }
}

impl Config {
    /// Load the config from `explicit` if given (it must exist), otherwise
    /// from `kubegen.toml` in `cwd` if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = cwd.join(CONFIG_FILE);
                if !path.is_file() {
                    debug!("no {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).map_err(|e| CliError::read(&path, e))?;
        let config = Self::parse(&content).map_err(|message| CliError::Config {
            path: path.clone(),
            message,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}
