//! Layered configuration
//!
//! Sources, lowest precedence first: built-in defaults, `helpdesk.toml` in the
//! platform config directory, an explicit `--config` file, and `HELPDESK__*`
//! environment variables (`HELPDESK__LOG__LEVEL=debug`).

use crate::core::Priority;
use crate::error::Result;
use config::{Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-user configuration file
pub const CONFIG_FILE_NAME: &str = "helpdesk.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub log: LogConfig,
    pub output: OutputConfig,
    pub tickets: TicketConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// YAML snapshot holding every record
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `--verbose` is not given
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub color: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Priority given to new tickets that do not name one
    pub default_priority: Priority,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_file: PathBuf::from(".helpdesk").join("desk.yaml"),
            },
            log: LogConfig {
                level: "warn".to_string(),
            },
            output: OutputConfig { color: true },
            tickets: TicketConfig {
                default_priority: Priority::Medium,
            },
        }
    }
}

impl Config {
    /// Load configuration from every layer
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(default_path().as_deref(), explicit)
    }

    fn load_from(user_file: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default(
                "storage.data_file",
                defaults.storage.data_file.to_string_lossy().into_owned(),
            )?
            .set_default("log.level", defaults.log.level)?
            .set_default("output.color", defaults.output.color)?
            .set_default(
                "tickets.default_priority",
                defaults.tickets.default_priority.as_str(),
            )?;

        if let Some(path) = user_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix("HELPDESK").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

/// Location of the per-user configuration file, if the platform has one
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "helpdesk").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
