//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from four sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (`AURORA_ROOT_FOLDER`, then `AURORA_ROOT`)
//! 3. TOML config file (`~/.config/aurora/<module>.toml`, then `/etc/aurora/<module>.toml`)
//! 4. OS-dependent compiled default
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default HTTP port for the emotion service
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "aurora.db";

/// Compiled-in fallbacks used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so that a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Model version tag reported in analysis metadata
    #[serde(default)]
    pub model_version: Option<String>,

    /// Capacity of the background result recorder queue
    #[serde(default)]
    pub recorder_queue_capacity: Option<usize>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Modality weights used by the fusion engine
    #[serde(default)]
    pub fusion: FusionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Per-modality fusion weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_text_weight")]
    pub text_weight: f32,
    #[serde(default = "default_visual_weight")]
    pub visual_weight: f32,
    #[serde(default = "default_audio_weight")]
    pub audio_weight: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            text_weight: default_text_weight(),
            visual_weight: default_visual_weight(),
            audio_weight: default_audio_weight(),
        }
    }
}

impl FusionConfig {
    /// Reject weights that would make fusion scores meaningless
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("text_weight", self.text_weight),
            ("visual_weight", self.visual_weight),
            ("audio_weight", self.audio_weight),
        ] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(Error::Config(format!(
                    "fusion.{} must be a positive number, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_text_weight() -> f32 {
    1.0
}

fn default_visual_weight() -> f32 {
    0.8
}

fn default_audio_weight() -> f32 {
    0.7
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.fusion.validate()?;
    Ok(config)
}

/// Locate the TOML config file for a module, if one exists
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", module_name);
    let user_config = dirs::config_dir().map(|d| d.join("aurora").join(&file_name));
    let system_config = PathBuf::from("/etc/aurora").join(&file_name);

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|p| p.exists())
}

/// Load the module's TOML config, falling back to defaults on any problem
///
/// Missing files are silent; unreadable or invalid files log a warning.
pub fn load_module_config(module_name: &str, explicit_path: Option<&Path>) -> TomlConfig {
    let path = match explicit_path {
        Some(p) => Some(p.to_path_buf()),
        None => config_file_path(module_name),
    };

    let Some(path) = path else {
        debug!(module = module_name, "No config file found, using defaults");
        return TomlConfig::default();
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!(path = %path.display(), "Loaded config file");
            config
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Config file unusable, using defaults"
            );
            TomlConfig::default()
        }
    }
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Command-line override (priority 1)
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Root folder from an already-loaded TOML config (priority 3)
    pub fn with_toml_root(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in ["AURORA_ROOT_FOLDER", "AURORA_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        if let Some(path) = config_file_path(&self.module_name)
            .and_then(|p| load_toml_config(&p).ok())
            .and_then(|c| c.root_folder)
        {
            return path;
        }

        default_root_folder()
    }
}

/// Prepares the resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if missing. Safe to call repeatedly.
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("aurora"))
        .unwrap_or_else(|| PathBuf::from("./aurora_data"))
}
