//! Error types for mapbinder

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapBinderError {
    #[error("Invalid magic number in {0}")]
    InvalidMagic(PathBuf),

    #[error("Unsupported format version: {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("Checksum verification failed for '{0}'")]
    ChecksumMismatch(String),

    #[error("Malformed input {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::Error),

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid level id: {0} (expected two-digit map and one-digit block, e.g. 30_0)")]
    InvalidLevelId(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Worker thread failed: {0}")]
    Worker(String),
}

impl MapBinderError {
    /// Build a `Malformed` error for a file the codec rejected
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MapBinderError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapBinderError>;
