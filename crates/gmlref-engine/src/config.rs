//! Configuration file support for gmlref
//!
//! Loads `gmlref.toml` from a start directory or its parents. All knobs
//! default to the safe choice, so an absent file means: block on every
//! conflict, one-hop dependents, no transpiler checking.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while locating or parsing `gmlref.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefactorConfig {
    pub rename: RenameConfig,
    pub hot_reload: HotReloadConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Proceed past warning-severity conflicts (shadowing). Blocking
    /// conflicts can never be waived.
    pub allow_warning_conflicts: bool,
    /// Report the transitive dependent closure instead of one hop
    pub transitive_dependents: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotReloadConfig {
    /// Transpile post-edit sources during hot-reload validation
    pub check_transpiler: bool,
}

impl RefactorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load config by searching for `gmlref.toml` from `start_dir` upward.
    /// Returns `None` when no config file exists on the path to the root.
    pub fn load_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>, ConfigError> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let config_path = dir.join("gmlref.toml");
            if config_path.exists() {
                let contents =
                    std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                        path: config_path.clone(),
                        source,
                    })?;
                let config = Self::from_toml_str(&contents, &config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }
}
