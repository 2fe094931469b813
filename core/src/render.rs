//! Console rendering of task trees.
//!
//! ```text
//! Todo (group=true): /todo/list.txt >>> . Status: In Progress Priority: Medium
//! Subtasks:
//! 	Todo (group=false):  >>> Buy milk. Status: Completed Priority: Medium
//! ```

use std::fmt;

use crate::types::Task;

impl Task {
    /// One-line summary of this task, without its children.
    #[must_use]
    pub fn headline(&self) -> String {
        let source = self
            .source
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        format!(
            "Todo (group={}): {} >>> {}. Status: {} Priority: {}",
            self.is_group(),
            source,
            self.content,
            self.status,
            self.priority
        )
    }
}

impl fmt::Display for Task {
    /// Writes the headline followed by every descendant, one tab of
    /// indentation per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![(self, 0usize)];
        let mut first = true;

        while let Some((task, depth)) = pending.pop() {
            if !first {
                writeln!(f)?;
            }
            first = false;

            let indent = "\t".repeat(depth);
            write!(f, "{indent}{}", task.headline())?;
            if task.is_group() {
                write!(f, "\n{indent}Subtasks:")?;
                pending.extend(task.children.iter().rev().map(|child| (child, depth + 1)));
            }
        }
        Ok(())
    }
}
