//! Line classification.
//!
//! Every raw line of a todo file falls into exactly one [`Line`] category.
//! Classification looks at the line alone; it never fails and has no access
//! to grouping state.
//!
//! # Line Grammar
//!
//! | Line | Category |
//! |------|----------|
//! | empty or whitespace only | [`Line::Blank`] |
//! | `---`, `===`, `-=-=` | [`Line::Divider`] |
//! | `--- Backlog`, `=== done today` | [`Line::Header`] |
//! | `x ! Ship release?` | [`Line::Item`] |
//!
//! Items start with an optional status marker (`x` completed, `~` in
//! progress, `#` dropped) and an optional priority marker (`!` high, `.`
//! low), each taken whether or not whitespace follows it. An `x` directly
//! followed by a letter starts a word instead. A trailing `?` marks the item
//! tentative and a trailing `:` is dropped from the content.

use crate::parser::ParseOptions;
use crate::types::{Priority, Status};

/// A classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Empty after trimming.
    Blank,
    /// Only `-`/`=` characters.
    Divider,
    /// A labelled divider that opens a new group.
    Header(Header),
    /// A task line.
    Item(Item),
}

/// A labelled divider, e.g. `--- Done Today`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub indent: usize,
    pub label: String,
    /// Set when the label contains the done keyword.
    pub done: bool,
}

/// A content line with its markers extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub indent: usize,
    pub status: Status,
    pub priority: Priority,
    pub tentative: bool,
    pub content: String,
}

/// Classifies one raw line.
///
/// The line is expected without its trailing newline; a stray `\r` is
/// treated as whitespace.
#[must_use]
pub fn classify(line: &str, options: &ParseOptions) -> Line {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    let label = trimmed.trim_start_matches(is_divider_char);
    if label.len() != trimmed.len() {
        let label = strip_colon(label.trim());
        if label.is_empty() {
            return Line::Divider;
        }
        return Line::Header(Header {
            indent: indentation(line, options.tab_width),
            done: contains_keyword(label, &options.done_keyword),
            label: label.to_string(),
        });
    }

    Line::Item(parse_item(trimmed, indentation(line, options.tab_width)))
}

/// Computes the indentation depth of a line.
///
/// Tabs count `tab_width` units and spaces one unit; scanning stops at the
/// first other character.
#[must_use]
pub fn indentation(line: &str, tab_width: usize) -> usize {
    line.chars()
        .map_while(|c| match c {
            '\t' => Some(tab_width),
            ' ' => Some(1),
            _ => None,
        })
        .sum()
}

fn parse_item(trimmed: &str, indent: usize) -> Item {
    let mut rest = trimmed;

    let mut status = Status::NotStarted;
    if let Some((marker, after)) = split_first(rest) {
        if let Some(found) = Status::from_marker(marker) {
            if !starts_word(marker, after) {
                status = found;
                rest = after.trim_start();
            }
        }
    }

    let mut priority = Priority::Medium;
    if let Some((marker, after)) = split_first(rest) {
        if let Some(found) = Priority::from_marker(marker) {
            priority = found;
            rest = after.trim_start();
        }
    }

    let mut content = rest.trim();
    let tentative = content.ends_with('?');
    if tentative {
        content = &content[..content.len() - 1];
    }

    Item {
        indent,
        status,
        priority,
        tentative,
        content: strip_colon(content).to_string(),
    }
}

fn split_first(text: &str) -> Option<(char, &str)> {
    let mut chars = text.chars();
    let first = chars.next()?;
    Some((first, chars.as_str()))
}

/// A letter marker glued to more letters is the start of a word (`xylophone`).
fn starts_word(marker: char, after: &str) -> bool {
    marker.is_ascii_alphabetic() && after.starts_with(|c: char| c.is_ascii_alphabetic())
}

/// Removes one trailing `:` together with surrounding whitespace.
fn strip_colon(text: &str) -> &str {
    let text = text.trim_end();
    match text.strip_suffix(':') {
        Some(stripped) => stripped.trim_end(),
        None => text,
    }
}

fn is_divider_char(c: char) -> bool {
    c == '-' || c == '='
}

fn contains_keyword(label: &str, keyword: &str) -> bool {
    !keyword.is_empty() && label.to_lowercase().contains(&keyword.to_lowercase())
}
