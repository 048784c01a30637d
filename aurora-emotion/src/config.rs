//! Configuration resolution for aurora-emotion
//!
//! **Priority:** CLI → environment → TOML → compiled defaults
//!
//! Environment variables are read by clap alongside their flags, so the CLI
//! and environment tiers collapse into one `Option` per setting here.

use aurora_common::config::{CompiledDefaults, FusionConfig, RootFolderResolver, TomlConfig};
use aurora_common::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::services::emotion_analyzer::DEFAULT_MODEL_VERSION;
use crate::services::result_recorder::DEFAULT_QUEUE_CAPACITY;

/// Command-line arguments for aurora-emotion
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "aurora-emotion")]
#[command(about = "Multimodal emotion analysis service for Aurora")]
#[command(version)]
pub struct Cli {
    /// TOML config file (default: ~/.config/aurora/aurora-emotion.toml)
    #[arg(short, long, env = "AURORA_EMOTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root folder holding the database
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "AURORA_EMOTION_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "AURORA_EMOTION_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(long, env = "AURORA_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub model_version: String,
    pub recorder_queue_capacity: usize,
    pub fusion: FusionConfig,
}

impl ServiceConfig {
    /// Merge CLI/environment values over TOML values over defaults
    ///
    /// # Errors
    /// Returns `Error::Config` if the fusion weights are invalid.
    pub fn resolve(cli: &Cli, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        toml.fusion.validate()?;

        let root_folder = RootFolderResolver::new(crate::MODULE_NAME)
            .with_cli_arg(cli.root_folder.clone())
            .with_toml_root(toml.root_folder.clone())
            .resolve();

        let log_level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| toml.logging.level.clone());

        Ok(Self {
            root_folder,
            host: cli
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or(defaults.host),
            port: cli.port.or(toml.port).unwrap_or(defaults.port),
            log_level,
            model_version: toml
                .model_version
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            recorder_queue_capacity: toml
                .recorder_queue_capacity
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
            fusion: toml.fusion,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_root() -> Cli {
        Cli {
            root_folder: Some(PathBuf::from("/tmp/aurora-test-root")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let config = ServiceConfig::resolve(&cli_with_root(), &TomlConfig::default()).unwrap();
        assert_eq!(config.port, aurora_common::config::DEFAULT_PORT);
        assert_eq!(config.host, aurora_common::config::DEFAULT_HOST);
        assert_eq!(config.model_version, DEFAULT_MODEL_VERSION);
        assert_eq!(config.recorder_queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.root_folder, PathBuf::from("/tmp/aurora-test-root"));
    }

    #[test]
    fn test_toml_overrides_defaults_and_cli_overrides_toml() {
        let toml = TomlConfig {
            port: Some(9100),
            host: Some("0.0.0.0".to_string()),
            model_version: Some("lexicon-2".to_string()),
            ..Default::default()
        };

        let config = ServiceConfig::resolve(&cli_with_root(), &toml).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.bind_addr(), "0.0.0.0:9100");
        assert_eq!(config.model_version, "lexicon-2");

        let cli = Cli {
            port: Some(9200),
            ..cli_with_root()
        };
        let config = ServiceConfig::resolve(&cli, &toml).unwrap();
        assert_eq!(config.port, 9200);
    }

    #[test]
    fn test_zero_queue_capacity_falls_back() {
        let toml = TomlConfig {
            recorder_queue_capacity: Some(0),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(&cli_with_root(), &toml).unwrap();
        assert_eq!(config.recorder_queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_invalid_fusion_weights_rejected() {
        let toml = TomlConfig {
            fusion: FusionConfig {
                audio_weight: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(ServiceConfig::resolve(&cli_with_root(), &toml).is_err());
    }
}
