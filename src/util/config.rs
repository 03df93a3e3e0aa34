//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.legion-config/config.toml` - User-wide defaults
//! - Project: `.legion-config/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Variant preferences
//! from either file sit underneath the spec's own assignments.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::variant::RawValue;

/// Directory name used for both config locations.
pub const CONFIG_DIR_NAME: &str = ".legion-config";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallbacks for spec fields a spec file leaves out
    pub defaults: DefaultsConfig,

    /// Site-wide variant preferences
    pub variants: BTreeMap<String, RawValue>,

    /// Output settings
    pub output: OutputConfig,
}

/// Spec-level defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Compiler identity (e.g., "gcc@9.3.0")
    pub compiler: Option<String>,

    /// CMake build type (Debug, Release, RelWithDebInfo, MinSizeRel)
    pub build_type: Option<String>,

    /// Legion version to build
    pub version: Option<String>,

    /// Host architecture name
    pub target: Option<String>,
}

/// How `flags` prints a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One argument per line
    #[default]
    Lines,
    /// The full translation as JSON
    Json,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.defaults.compiler.is_some() {
            self.defaults.compiler = other.defaults.compiler;
        }
        if other.defaults.build_type.is_some() {
            self.defaults.build_type = other.defaults.build_type;
        }
        if other.defaults.version.is_some() {
            self.defaults.version = other.defaults.version;
        }
        if other.defaults.target.is_some() {
            self.defaults.target = other.defaults.target;
        }

        // Variant preferences merge per variant
        self.variants.extend(other.variants);

        if other.output.format != OutputFormat::default() {
            self.output.format = other.output.format;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.legion-config/config.toml)
/// 2. Global config (~/.legion-config/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.legion-config).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.legion-config/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Get the project config path (.legion-config/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}
