//! Error taxonomy for the ambient stack around the scoring kernel.
//!
//! The kernel itself (`beacon_proto::score_pair`) is total over
//! admissible inputs and never returns a `Result` (see spec §7). Every
//! fallible edge lives out here, at the I/O boundary: config loading,
//! reading pair records, writing output records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read from pair source: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed pair record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("pair source closed before the global window header was read")]
    MissingWindow,
    #[error("invalid global window: max_time ({max_time}) must be greater than min_time ({min_time})")]
    InvalidWindow { min_time: i64, max_time: i64 },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write to output sink: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode output record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
