//! Error types for requirement resolution and installation.
//!
//! Library functions return [`Result`] over [`ReqsError`]. The binary wraps
//! these in `anyhow` at the command layer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReqsError {
    /// A requirement file, manifest or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk failed, either at the root or on an entry below it.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The manifest is not a mapping of names to lists of strings.
    #[error("failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("no requirements found in {path}")]
    NoRequirements { path: PathBuf },

    /// An external package manager exited unsuccessfully.
    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("no supported package manager found on PATH (tried {tried})")]
    NoPackageTool { tried: String },

    #[error("invalid config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ReqsError>;
