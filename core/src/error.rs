//! Error types for reading todo files.
//!
//! Parsing itself never fails: every line is classified into some category.
//! Errors only come from the filesystem, and they come in two severities:
//!
//! - [`CoreError::ListDir`] - the todo directory cannot be enumerated. Fatal
//!   for the whole parse.
//! - [`CoreError::ReadFile`] - one file cannot be opened or decoded. The file
//!   is skipped and the remaining files are still parsed.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while collecting todo files.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The todo directory could not be listed.
    #[error("failed to list todo directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single todo file could not be opened or read.
    #[error("failed to read todo file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    /// Returns the path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::ListDir { path, .. } | Self::ReadFile { path, .. } => path,
        }
    }

    /// Returns `true` if the error aborts the whole parse.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ListDir { .. })
    }
}

/// A specialized `Result` type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
