//! Server configuration module.
//!
//! Parses configuration from environment variables. A `.env` file in the
//! working directory is loaded first (see [`load_dotenv`]); variables that are
//! already set take precedence over it.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TODO_FOLDER` | Yes | - | Directory holding the todo files |
//! | `HOST` | No | `localhost` | Interface to bind |
//! | `PORT` | No | 8080 | HTTP server port |
//! | `EDITOR` | No | `code` | Program used by `/api/open` |
//! | `TODO_TAB_WIDTH` | No | 4 | Indentation units per tab |
//!
//! Empty values are treated as unset.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use todo_watcher_core::parser::{ParseOptions, DEFAULT_TAB_WIDTH};
use tracing::{debug, warn};

/// Default interface to bind.
const DEFAULT_HOST: &str = "localhost";

/// Default HTTP server port.
const DEFAULT_PORT: u16 = 8080;

/// Default editor command.
const DEFAULT_EDITOR: &str = "code";

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    /// Port number is invalid.
    #[error("invalid port number: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Server configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the todo files.
    pub todo_folder: PathBuf,

    /// Interface to bind.
    pub host: String,

    /// HTTP server port.
    pub port: u16,

    /// Editor command used to open todo files.
    pub editor: String,

    /// Indentation units per tab character.
    pub tab_width: usize,
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `TODO_FOLDER` is missing or empty
    /// - `PORT` is not a valid u16
    /// - `TODO_TAB_WIDTH` is not a positive integer
    ///
    /// # Example
    ///
    /// ```no_run
    /// use todo_watcher_server::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load config");
    /// println!("Watching {}", config.todo_folder.display());
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        let todo_folder = read_var("TODO_FOLDER")?
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("TODO_FOLDER".to_string()))?;
        let host = read_var("HOST")?.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_port()?;
        let editor = read_var("EDITOR")?.unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        let tab_width = parse_tab_width()?;

        let config = Self {
            todo_folder,
            host,
            port,
            editor,
            tab_width,
        };
        debug!(config = ?config, "Loaded configuration");
        Ok(config)
    }

    /// Address to bind, as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reads only `TODO_TAB_WIDTH`, for callers that do not need a todo folder.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the value is not a positive integer.
    pub fn tab_width_from_env() -> Result<usize, ConfigError> {
        parse_tab_width()
    }

    /// Parser options derived from this configuration.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            tab_width: self.tab_width,
            ..ParseOptions::default()
        }
    }
}

/// Loads a `.env` file from the working directory, if there is one.
///
/// Returns the path that was loaded. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(err) => {
            if !err.not_found() {
                warn!(error = %err, "Failed to load .env file");
            }
            None
        }
    }
}

/// Reads an environment variable, treating an empty value as unset.
fn read_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            var: name.to_string(),
            message: "contains invalid unicode".to_string(),
        }),
    }
}

/// Parse the PORT environment variable.
///
/// Returns the default port if not set.
fn parse_port() -> Result<u16, ConfigError> {
    match read_var("PORT")? {
        Some(port_str) => Ok(port_str.trim().parse()?),
        None => Ok(DEFAULT_PORT),
    }
}

/// Parse the TODO_TAB_WIDTH environment variable.
fn parse_tab_width() -> Result<usize, ConfigError> {
    let Some(raw) = read_var("TODO_TAB_WIDTH")? else {
        return Ok(DEFAULT_TAB_WIDTH);
    };

    let invalid = |message: String| ConfigError::InvalidValue {
        var: "TODO_TAB_WIDTH".to_string(),
        message,
    };
    let width: usize = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if width == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(width)
}
