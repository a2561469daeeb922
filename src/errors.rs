// src/errors.rs

//! Crate-wide error type and result alias.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlakerError {
    /// The deadline lookup could not reach the store, or the store rejected it.
    #[error("failed to retrieve {key} from {table}, check your store: {source}")]
    StoreUnavailable {
        table: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid {key} value {value:?}: expected an RFC 3339 timestamp ({source})")]
    InvalidDeadlineFormat {
        key: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The run was skipped but the notice could not be written.
    #[error("failed to write skipped log: {message}")]
    SkipNoticeWriteFailed {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start command `{command}`: {source}")]
    ProcessSpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` did not finish within {after:?}; process killed")]
    Timeout { command: String, after: Duration },

    #[error("failed waiting for command `{command}`: {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("output relay for `{command}` ended abnormally: {reason}")]
    RelayFailed { command: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BlakerError>;
