//! Per-file todo parser.
//!
//! [`FileParser`] turns the lines of one file into a task tree. It seeds a
//! root task for the file, then feeds every line through classification,
//! the grouping stack and the task builder.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use todo_watcher_core::parser::{parse_lines, ParseOptions};
//! use todo_watcher_core::types::Status;
//!
//! let lines = ["Groceries:", "\tx Milk", "\tBread"];
//! let root = parse_lines(Path::new("240515-list.txt"), lines, &ParseOptions::default());
//!
//! let groceries = &root.children[0];
//! assert_eq!(groceries.content, "Groceries");
//! assert_eq!(groceries.status, Status::InProgress);
//! assert_eq!(groceries.children.len(), 2);
//! assert_eq!(root.date.map(|d| d.to_string()), Some("2024-05-15".to_string()));
//! ```

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::builder::{TaskArena, TaskDraft, TaskId};
use crate::classify::{classify, Line};
use crate::grouping::GroupStack;
use crate::types::Task;

/// Default width of a tab in indentation units.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Default keyword that marks a labelled divider as completed.
pub const DEFAULT_DONE_KEYWORD: &str = "done";

/// Tunables for line classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Indentation units per tab character.
    pub tab_width: usize,

    /// Labelled dividers containing this word (any case) start completed groups.
    pub done_keyword: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            done_keyword: DEFAULT_DONE_KEYWORD.to_string(),
        }
    }
}

/// Parser state for a single file.
#[derive(Debug)]
pub struct FileParser<'a> {
    options: &'a ParseOptions,
    arena: TaskArena,
    groups: GroupStack,
    latest: TaskId,
}

impl<'a> FileParser<'a> {
    /// Creates a parser for the file at `source`.
    ///
    /// The root task takes its date from the file name, see
    /// [`parse_file_date`].
    #[must_use]
    pub fn new(source: &Path, options: &'a ParseOptions) -> Self {
        let date = source
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_file_date);
        if let Some(date) = date {
            debug!(path = %source.display(), %date, "Parsed date from file name");
        }

        let arena = TaskArena::new(source.to_path_buf(), date);
        let root = arena.root();
        Self {
            options,
            arena,
            groups: GroupStack::new(root),
            latest: root,
        }
    }

    /// Feeds the next line of the file.
    pub fn feed(&mut self, line: &str) {
        match classify(line, self.options) {
            Line::Blank | Line::Divider => {}
            Line::Header(header) => {
                let indent = header.indent;
                let id = self.place(indent, header.into());
                self.groups.open(id, indent);
                trace!(depth = self.groups.depth(), "Opened header group");
            }
            Line::Item(item) => {
                self.place(item.indent, item.into());
            }
        }
    }

    /// Builds the task for a line at `indent` under the group it belongs to.
    fn place(&mut self, indent: usize, draft: TaskDraft) -> TaskId {
        self.groups.align(indent, self.latest);
        let id = self.arena.attach(self.groups.parent(), draft);
        self.latest = id;
        id
    }

    /// Number of tasks built so far, excluding the root.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.arena.len() - 1
    }

    /// Finishes the file and returns its root task.
    #[must_use]
    pub fn finish(self) -> Task {
        self.arena.into_tree()
    }
}

/// Parses all `lines` of the file at `source` into its root task.
pub fn parse_lines<I, S>(source: &Path, lines: I, options: &ParseOptions) -> Task
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = FileParser::new(source, options);
    for line in lines {
        parser.feed(line.as_ref());
    }
    parser.finish()
}

/// Extracts a `YYMMDD` date from the start of a file name.
///
/// The six digits must be followed by a non-digit character. Two-digit
/// years follow chrono's `%y` century rule: low values such as `24` map to
/// 20xx, high values such as `99` to 19xx.
///
/// ```
/// use chrono::NaiveDate;
/// use todo_watcher_core::parser::parse_file_date;
///
/// assert_eq!(parse_file_date("240515-notes.txt"), NaiveDate::from_ymd_opt(2024, 5, 15));
/// assert_eq!(parse_file_date("notes.txt"), None);
/// ```
#[must_use]
pub fn parse_file_date(file_name: &str) -> Option<NaiveDate> {
    let digits = file_name.get(..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let next = file_name[6..].chars().next()?;
    if next.is_ascii_digit() {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%y%m%d").ok()
}
