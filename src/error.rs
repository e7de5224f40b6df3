//! Error kinds for the build pipeline.
//!
//! Every variant is fatal. `main` logs the message and exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop a Windows build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The manifest is missing, unparsable, or has no usable `package.version`.
    #[error("Failed to read version from manifest {path:?}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    /// `--version` was given but is empty.
    #[error("Version must not be empty")]
    EmptyVersion,

    /// `--path` was given but is empty.
    #[error("Output path must not be empty")]
    EmptyPath,

    /// The output path already exists and overwriting is disabled.
    #[error("Path {0:?} already exists (pass --force true to replace it)")]
    PathExists(PathBuf),

    /// No `--path` was given and the home directory could not be determined.
    #[error("Failed to determine home directory")]
    NoHomeDirectory,

    /// Creating or clearing the output directory failed.
    #[error("Failed to prepare {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler could not be started or exited unsuccessfully.
    #[error("Native build failed: {0}")]
    NativeBuild(String),

    /// The Godot export could not be started or exited unsuccessfully.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Writing the zip archive failed.
    #[error("Failed to create archive {path:?}: {reason}")]
    Archive { path: PathBuf, reason: String },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
