//! Engine config errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why an [`EngineConfig`](crate::EngineConfig) could not be loaded, saved
/// or accepted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read engine config {path}: {source}")]
    ReadFile {
        /// File that was opened.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// Config file unwritable
    #[error("cannot write engine config {path}: {source}")]
    WriteFile {
        /// File that was written.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// Parent directory could not be made
    #[error("cannot create config directory {path}: {source}")]
    CreateDir {
        /// Directory that was created.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// Text is not a valid engine config
    #[error("malformed engine config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML
    #[error("cannot encode engine config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds a value the engine cannot run with
    #[error("engine config field '{field}' rejected: {reason}")]
    Invalid {
        /// Dotted field path, e.g. `meters.refresh_rate_hz`.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// [`ReadFile`](Self::ReadFile) for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// [`WriteFile`](Self::WriteFile) for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// [`CreateDir`](Self::CreateDir) for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// [`Invalid`](Self::Invalid) for `field`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
