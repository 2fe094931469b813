//! Opening todo files in the user's editor.
//!
//! The dashboard asks the server to open a file by path. The request is only
//! honoured for files that sit directly inside the todo folder; the editor
//! is started detached with the todo folder as its working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Reasons a file could not be opened.
#[derive(Error, Debug)]
pub enum OpenError {
    /// No file was given.
    #[error("file query parameter is required")]
    MissingFile,

    /// The editor executable is not on `PATH`.
    #[error("could not find editor.")]
    EditorNotFound {
        editor: String,
        #[source]
        source: which::Error,
    },

    /// The file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not directly inside the todo folder.
    #[error("file {} is not in the todo folder {}", file.display(), todo_dir.display())]
    OutsideTodoFolder { file: PathBuf, todo_dir: PathBuf },

    /// The editor process could not be started.
    #[error("could not open file: {source}")]
    Launch {
        editor: String,
        #[source]
        source: io::Error,
    },
}

impl OpenError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::EditorNotFound { .. } => "editor_not_found",
            Self::NotFound(_) => "not_found",
            Self::OutsideTodoFolder { .. } => "outside_todo_folder",
            Self::Launch { .. } => "launch_failed",
        }
    }

    /// The editor involved, for errors caused by the editor itself.
    #[must_use]
    pub fn editor(&self) -> Option<&str> {
        match self {
            Self::EditorNotFound { editor, .. } | Self::Launch { editor, .. } => Some(editor),
            _ => None,
        }
    }
}

/// Launches the configured editor on todo files.
#[derive(Debug, Clone)]
pub struct EditorLauncher {
    editor: String,
    todo_dir: PathBuf,
}

impl EditorLauncher {
    #[must_use]
    pub fn new(editor: impl Into<String>, todo_dir: impl Into<PathBuf>) -> Self {
        Self {
            editor: editor.into(),
            todo_dir: todo_dir.into(),
        }
    }

    /// The configured editor command.
    #[must_use]
    pub fn editor(&self) -> &str {
        &self.editor
    }

    /// Opens `file` in the editor without waiting for it to exit.
    ///
    /// Checks run in this order: a file was given, the editor can be found,
    /// the file exists, the file's directory is the todo folder. Must be
    /// called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the first [`OpenError`] whose check fails, or
    /// [`OpenError::Launch`] if the process cannot be spawned.
    pub fn open(&self, file: &str) -> Result<(), OpenError> {
        if file.trim().is_empty() {
            return Err(OpenError::MissingFile);
        }

        let executable = which::which(&self.editor).map_err(|source| OpenError::EditorNotFound {
            editor: self.editor.clone(),
            source,
        })?;

        let file_path = Path::new(file);
        let file_path =
            fs::canonicalize(file_path).map_err(|_| OpenError::NotFound(file_path.to_path_buf()))?;

        let todo_dir = fs::canonicalize(&self.todo_dir).unwrap_or_else(|_| self.todo_dir.clone());
        if file_path.parent() != Some(todo_dir.as_path()) {
            return Err(OpenError::OutsideTodoFolder {
                file: file_path,
                todo_dir,
            });
        }

        debug!(
            editor = %executable.display(),
            file = %file_path.display(),
            "Launching editor"
        );
        let child = Command::new(&executable)
            .arg(&file_path)
            .current_dir(&todo_dir)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| OpenError::Launch {
                editor: self.editor.clone(),
                source,
            })?;

        info!(
            editor = %self.editor,
            file = %file_path.display(),
            pid = child.id(),
            "Opened todo file in editor"
        );
        Ok(())
    }
}
