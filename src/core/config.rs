//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::command::UnrecognizedOptionsPrinting;

/// Environment variable naming an extra config file
pub const CONFIG_ENV: &str = "LIGHTCMD_CONFIG";

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "LIGHTCMD_LOG";

/// Environment variable overriding the unrecognized options printing behavior
pub const PRINTING_ENV: &str = "LIGHTCMD_UNRECOGNIZED_OPTIONS";

/// lightcmd configuration with layered hierarchy
///
/// Every field is optional; unset fields fall back to the built-in command
/// defaults through the accessor methods.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Abort invocations carrying unrecognized options
    pub fail_on_unrecognized_options: Option<bool>,

    /// Let `-h`/`--help` print command help
    pub show_help_on_help_flag: Option<bool>,

    /// What to print about unrecognized options
    pub unrecognized_options_printing: Option<UnrecognizedOptionsPrinting>,

    /// Log filter directive, e.g. `debug` or `lightcmd=trace`
    pub log: Option<String>,
}

/// Errors reading an explicit config file
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    #[diagnostic(code(lightcmd::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    #[diagnostic(
        code(lightcmd::config::parse),
        help("Valid keys: fail_on_unrecognized_options, show_help_on_help_flag, unrecognized_options_printing, log")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Unreadable files are skipped so a broken user config never blocks the CLI.
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/lightcmd/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                match Self::load_from(&global_path) {
                    Ok(global) => config.merge(global),
                    Err(e) => tracing::warn!("ignoring global config: {}", e),
                }
            }
        }

        // 3. Explicit config file
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::load_from(Path::new(&path)) {
                Ok(explicit) => config.merge(explicit),
                Err(e) => tracing::warn!("ignoring {}: {}", CONFIG_ENV, e),
            }
        }

        // 4. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Load a single config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "lightcmd")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.fail_on_unrecognized_options.is_some() {
            self.fail_on_unrecognized_options = other.fail_on_unrecognized_options;
        }
        if other.show_help_on_help_flag.is_some() {
            self.show_help_on_help_flag = other.show_help_on_help_flag;
        }
        if other.unrecognized_options_printing.is_some() {
            self.unrecognized_options_printing = other.unrecognized_options_printing;
        }
        if other.log.is_some() {
            self.log = other.log;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(log) = var(LOG_ENV) {
            self.log = Some(log);
        }
        if let Some(printing) = var(PRINTING_ENV) {
            match printing.parse() {
                Ok(printing) => self.unrecognized_options_printing = Some(printing),
                Err(e) => tracing::warn!("ignoring {}: {}", PRINTING_ENV, e),
            }
        }
    }

    pub fn fail_on_unrecognized_options(&self) -> bool {
        self.fail_on_unrecognized_options.unwrap_or(true)
    }

    pub fn show_help_on_help_flag(&self) -> bool {
        self.show_help_on_help_flag.unwrap_or(true)
    }

    pub fn unrecognized_options_printing(&self) -> UnrecognizedOptionsPrinting {
        self.unrecognized_options_printing.unwrap_or_default()
    }

    /// Log filter, defaulting to warnings only
    pub fn log_filter(&self) -> &str {
        self.log.as_deref().unwrap_or("warn")
    }
}
