//! Todo Watcher - Main entry point.
//!
//! Two subcommands:
//! - `serve` (default): run the dashboard backend with structured JSON
//!   logging and graceful shutdown on SIGTERM/SIGINT
//! - `print`: parse a todo folder once and print the trees
//!
//! # Configuration
//!
//! See [`todo_watcher_server::config`] for environment variable configuration.
//!
//! # Example
//!
//! ```bash
//! TODO_FOLDER=~/todo PORT=8080 cargo run --bin todo-watcher
//!
//! cargo run --bin todo-watcher -- print ~/todo --json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use todo_watcher_core::{parse_dir, ParseOptions};
use todo_watcher_server::broadcast::ChangeBroadcaster;
use todo_watcher_server::config::{load_dotenv, Config};
use todo_watcher_server::routes::{create_router, AppState};
use todo_watcher_server::watcher::TodoWatcher;

/// Serves a folder of plain-text todo lists to the live dashboard.
#[derive(Parser, Debug)]
#[command(name = "todo-watcher")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TODO_FOLDER      Directory holding the todo files (required for 'serve')
    HOST             Interface to bind (default: localhost)
    PORT             HTTP server port (default: 8080)
    EDITOR           Editor used by /api/open (default: code)
    TODO_TAB_WIDTH   Indentation units per tab (default: 4)
    RUST_LOG         Log level filter (default: info)

    A .env file in the working directory is loaded first.

EXAMPLES:
    # Start the server
    export TODO_FOLDER=~/todo
    todo-watcher

    # Dump the parsed folder as JSON
    todo-watcher print ~/todo --json
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP/WebSocket server.
    ///
    /// Requires the TODO_FOLDER environment variable.
    Serve,

    /// Parse a todo folder once and print the result.
    Print {
        /// Todo folder to parse (default: TODO_FOLDER).
        dir: Option<PathBuf>,

        /// Print JSON instead of the indented text form.
        #[arg(long)]
        json: bool,

        /// Indentation units per tab (default: TODO_TAB_WIDTH or 4).
        #[arg(long)]
        tab_width: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv = load_dotenv();

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            init_server_logging();
            if let Some(path) = dotenv {
                debug!(path = %path.display(), "Loaded environment file");
            }
            run_serve()
        }
        Command::Print {
            dir,
            json,
            tab_width,
        } => {
            init_console_logging();
            run_print(dir, json, tab_width)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "Todo watcher failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration and runs the server until a shutdown signal.
fn run_serve() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> Result<()> {
    info!(
        todo_folder = %config.todo_folder.display(),
        editor = %config.editor,
        tab_width = config.tab_width,
        "Todo watcher starting"
    );

    let broadcaster = ChangeBroadcaster::new();
    let watcher = TodoWatcher::new(config.todo_folder.clone(), broadcaster.clone())
        .context("Failed to watch todo folder")?;

    let bind_addr = config.bind_address();
    let state = AppState::with_broadcaster(config, broadcaster);
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    info!(address = %bind_addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    drop(watcher);
    info!("Server shutdown complete");
    Ok(())
}

/// Parses a folder once and writes the trees to stdout.
fn run_print(dir: Option<PathBuf>, json: bool, tab_width: Option<usize>) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => {
            Config::from_env()
                .context("No folder given and TODO_FOLDER is not usable")?
                .todo_folder
        }
    };
    let tab_width = match tab_width {
        Some(0) => bail!("--tab-width must be greater than zero"),
        Some(width) => width,
        None => Config::tab_width_from_env().context("Invalid TODO_TAB_WIDTH")?,
    };
    let options = ParseOptions {
        tab_width,
        ..ParseOptions::default()
    };

    let report = parse_dir(&dir, &options)
        .with_context(|| format!("Failed to parse {}", dir.display()))?;

    if json {
        let text =
            serde_json::to_string_pretty(&report.tasks).context("Failed to serialize tasks")?;
        println!("{text}");
    } else {
        for task in &report.tasks {
            println!("{task}");
        }
    }

    for failure in &report.failures {
        eprintln!("Skipped: {failure}");
    }
    Ok(())
}

/// Initialize structured JSON logging for the server.
///
/// `RUST_LOG` overrides the default filter.
fn init_server_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,axum::rejection=trace"));

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();
}

/// Initialize plain logging to stderr for one-shot commands.
fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

/// Resolves when SIGTERM or SIGINT is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
