//! Pack configuration management
//!
//! A pack file names the listen URIs and, optionally, the host config handed
//! to the engine:
//!
//! ```toml
//! uris = ["http://localhost:8888/", "http://localhost:8888/api/"]
//!
//! [host]
//! rewrite_localhost = true
//! allow_chunked_encoding = true
//! worker_threads = 2
//! ```
//!
//! See [`crate::paths`] for where the file is looked up.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::{DEFAULT_URI, HostConfig};
use crate::core::ports::HostEngine;
use crate::core::services::{HostController, HostError, Reconfigure};
use crate::paths;

/// Errors raised while reading or writing configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that was parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be serialized
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that was written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Contents of a pack file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    /// Listen URIs, validated when applied to a controller
    #[serde(default = "default_uris")]
    pub uris: Vec<String>,
    /// Host config; absent means the engine's defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostConfig>,
}

fn default_uris() -> Vec<String> {
    vec![DEFAULT_URI.to_string()]
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            uris: default_uris(),
            host: None,
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// No file found; built-in defaults
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl PackConfig {
    /// Load a pack file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_toml(path)
    }

    /// Find and load the effective configuration
    ///
    /// An explicit path (argument or `$NANCY_PACK_CONFIG`) must exist. The
    /// project and user files are used only if present.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let explicit = explicit.map(Path::to_path_buf).or_else(paths::env_config);
        if let Some(path) = explicit {
            debug!("loading config from {}", path.display());
            return Ok((Self::load(&path)?, ConfigSource::File(path)));
        }

        for path in [paths::local_config(), paths::global_config()] {
            if path.is_file() {
                debug!("loading config from {}", path.display());
                return Ok((Self::load(&path)?, ConfigSource::File(path)));
            }
        }

        debug!("no config file found, using defaults");
        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Save to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The batch of changes this config makes to a controller
    #[must_use]
    pub fn to_reconfigure(&self) -> Reconfigure {
        Reconfigure::new().listen_uris(&self.uris).host_config(self.host)
    }

    /// Apply URIs and host config to a controller with a single restart
    pub fn apply<E: HostEngine>(&self, controller: &mut HostController<E>) -> Result<(), HostError> {
        controller.reconfigure(self.to_reconfigure())?;
        Ok(())
    }
}

/// Load the host config named by a script's `config PATH`
///
/// Accepts either a bare host table or a whole pack file. A pack file
/// without a `[host]` table yields `None`, meaning engine defaults.
pub fn load_host_config(path: &Path) -> Result<Option<HostConfig>, ConfigError> {
    let table: toml::Table = read_toml(path)?;
    let is_pack_file = table.contains_key("host") || table.contains_key("uris");
    let parse_error = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    if is_pack_file {
        let pack: PackConfig = toml::Value::Table(table).try_into().map_err(parse_error)?;
        return Ok(pack.host);
    }

    toml::Value::Table(table).try_into().map(Some).map_err(parse_error)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
