//! Centralized path definitions for nancy-pack
//!
//! ## Configuration lookup
//!
//! ```text
//! --config <path>                         # explicit, must exist
//! $NANCY_PACK_CONFIG                      # explicit via environment
//! ./nancy-pack.toml                       # per-project
//! <config dir>/nancy-pack/config.toml     # per-user (XDG on Linux)
//! ```

use std::path::PathBuf;

/// Per-project configuration filename
pub const LOCAL_CONFIG_FILE: &str = "nancy-pack.toml";

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "NANCY_PACK_CONFIG";

/// Global config directory name
const GLOBAL_DIR: &str = "nancy-pack";

/// Global config filename
const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Get the per-project config path.
///
/// Returns `./nancy-pack.toml`.
#[must_use]
pub fn local_config() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG_FILE)
}

/// Get the global nancy-pack directory.
///
/// Returns `<config dir>/nancy-pack/`, falling back to `~/.config/nancy-pack/`.
#[must_use]
pub fn global_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join(GLOBAL_DIR)
}

/// Get the global config file path.
#[must_use]
pub fn global_config() -> PathBuf {
    global_config_dir().join(GLOBAL_CONFIG_FILE)
}

/// Config path named by `$NANCY_PACK_CONFIG`, if set and non-empty
#[must_use]
pub fn env_config() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
