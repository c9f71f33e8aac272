//! Configuration surface: a TOML file, overridable by CLI flags.
//!
//! Precedence: load the file (if any), then let any CLI flag the user
//! actually passed override the corresponding field. Flags left at
//! their clap default do not override a value the file set.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::ConfigError;

/// Minimum distinct-timestamp count to score a pair, and the degree
/// of parallelism in the Scorer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_connection_thresh: usize,
    pub worker_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_connection_thresh: beacon_proto::types::DEFAULT_CONNECTION_THRESH,
            worker_count: default_worker_count(),
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(thresh) = args.threshold {
            self.default_connection_thresh = thresh;
        }
        if let Some(workers) = args.workers {
            self.worker_count = workers;
        }
    }

    pub fn to_scorer_config(self) -> beacon_proto::Config {
        beacon_proto::Config {
            default_connection_thresh: self.default_connection_thresh,
        }
    }
}

/// Command-line arguments, using `clap`'s derive API with `env`
/// fallbacks.
#[derive(Debug, Parser)]
#[command(name = "beacond", about = "Beaconing analyzer pipeline")]
pub struct Args {
    /// Path to a TOML config file.
    #[arg(long, env = "BEACOND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the JSON-lines pair-input file (the Grouper's output).
    #[arg(long, env = "BEACOND_INPUT")]
    pub input: PathBuf,

    /// Path to write scored output JSON lines to. Defaults to stdout.
    #[arg(long, env = "BEACOND_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Override the config file's `default_connection_thresh`.
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Override the config file's `worker_count`.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Address to serve Prometheus metrics on, e.g. `127.0.0.1:9100`.
    #[arg(long, env = "BEACOND_METRICS_ADDR")]
    pub metrics_addr: Option<std::net::SocketAddr>,
}

impl Args {
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.apply_overrides(self);
        Ok(config)
    }
}
