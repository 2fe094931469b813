//! Todo Watcher Core - plain-text todo list parser.
//!
//! Turns a folder of hand-written todo files into trees of tasks. Each line
//! is classified on its own ([`classify`]), placed into a group by its
//! indentation and any labelled dividers above it ([`grouping`]), and built
//! into a task whose status and priority are reconciled with its group
//! ([`builder`]).
//!
//! # Modules
//!
//! - [`types`]: Task model and wire format
//! - [`classify`]: Line categories and marker extraction
//! - [`grouping`]: Indentation stack machine
//! - [`builder`]: Task arena and propagation rules
//! - [`parser`]: Per-file parser and options
//! - [`source`]: Directory listing and line reading
//! - [`driver`]: Directory-level parsing
//! - [`render`]: Console output
//! - [`error`]: Error types

pub mod builder;
pub mod classify;
pub mod driver;
pub mod error;
pub mod grouping;
pub mod parser;
pub mod render;
pub mod source;
pub mod types;

pub use driver::{parse_dir, parse_sources, ParseReport};
pub use error::{CoreError, Result};
pub use parser::{parse_file_date, parse_lines, FileParser, ParseOptions};
pub use types::{Priority, Status, Task};
