// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker configuration
//!
//! Settings come from an optional TOML file, overridden by command-line
//! flags, and are resolved once into an immutable [`Config`].

use gantry_engine::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_RECEIVE_WAIT: Duration = Duration::from_secs(20);
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("queue directory not set (use --queue-dir or queue_dir in the config file)")]
    MissingQueueDir,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Contents of a config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub queue_dir: Option<PathBuf>,
    #[serde(default, with = "humantime_serde")]
    pub visibility_timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub poll_interval: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub receive_wait: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub kill_grace: Option<Duration>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
    pub debug: Option<bool>,
    pub contain_paths: Option<bool>,
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }
}

/// Settings given on the command line; set values win over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub queue_dir: Option<PathBuf>,
    pub log_format: Option<LogFormat>,
    pub debug: bool,
    pub visibility_timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub contain_paths: bool,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub queue_dir: PathBuf,
    pub visibility_timeout: Duration,
    pub poll_interval: Duration,
    pub receive_wait: Duration,
    pub kill_grace: Duration,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
    pub contain_paths: bool,
}

impl Config {
    pub fn resolve(file: FileConfig, flags: Overrides) -> Result<Self, ConfigError> {
        let config = Config {
            queue_dir: flags
                .queue_dir
                .or(file.queue_dir)
                .ok_or(ConfigError::MissingQueueDir)?,
            visibility_timeout: flags
                .visibility_timeout
                .or(file.visibility_timeout)
                .unwrap_or(DEFAULT_VISIBILITY_TIMEOUT),
            poll_interval: flags
                .poll_interval
                .or(file.poll_interval)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            receive_wait: file.receive_wait.unwrap_or(DEFAULT_RECEIVE_WAIT),
            kill_grace: file.kill_grace.unwrap_or(DEFAULT_KILL_GRACE),
            log_format: flags.log_format.or(file.log_format).unwrap_or_default(),
            log_file: file.log_file,
            debug: flags.debug || file.debug.unwrap_or(false),
            contain_paths: flags.contain_paths || file.contain_paths.unwrap_or(false),
        };

        if config.visibility_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("visibility_timeout"));
        }
        if config.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll_interval"));
        }
        Ok(config)
    }

    /// Load the file at `path` (if any) and apply `flags` on top
    pub fn load(path: Option<&Path>, flags: Overrides) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, flags)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
