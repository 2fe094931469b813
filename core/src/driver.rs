//! Directory-level parsing.
//!
//! Runs the per-file parser over every file of a line source. A file that
//! cannot be read is reported and skipped; the remaining files are still
//! parsed. Each file starts from fresh parser state.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::parser::{FileParser, ParseOptions};
use crate::source::{DirSource, SourceFile};
use crate::types::Task;

/// Outcome of parsing a todo directory.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// One root task per successfully read file, in source order.
    pub tasks: Vec<Task>,
    /// Files that were skipped.
    pub failures: Vec<CoreError>,
}

impl ParseReport {
    /// Returns `true` if every file was parsed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parses every file yielded by `sources`.
pub fn parse_sources<I>(sources: I, options: &ParseOptions) -> ParseReport
where
    I: IntoIterator<Item = SourceFile>,
{
    let mut report = ParseReport::default();

    for SourceFile { path, lines } in sources {
        let lines = match lines {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable todo file");
                report.failures.push(e);
                continue;
            }
        };

        let mut parser = FileParser::new(&path, options);
        for line in &lines {
            parser.feed(line);
        }
        debug!(
            path = %path.display(),
            lines = lines.len(),
            tasks = parser.task_count(),
            "Parsed todo file"
        );
        report.tasks.push(parser.finish());
    }

    report
}

/// Parses every regular file directly inside `dir`.
///
/// # Errors
///
/// Returns [`CoreError::ListDir`] if the directory cannot be listed. Per-file
/// read errors end up in [`ParseReport::failures`] instead.
pub fn parse_dir(dir: &Path, options: &ParseOptions) -> Result<ParseReport> {
    let source = DirSource::open(dir)?;
    let report = parse_sources(source, options);
    info!(
        dir = %dir.display(),
        files = report.tasks.len(),
        failures = report.failures.len(),
        "Parsed todo directory"
    );
    Ok(report)
}
