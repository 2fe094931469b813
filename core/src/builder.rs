//! Task construction and status/priority propagation.
//!
//! Tasks of one file live in a [`TaskArena`] while the file is parsed. Nodes
//! are addressed by [`TaskId`] and only ever appended, so a parent id stays
//! valid however large the arena grows. Once the file is finished the arena
//! is folded into an owned [`Task`] tree.
//!
//! # Propagation
//!
//! When a task is attached to a group, in order:
//!
//! 1. A started (in progress or completed) task promotes a not-started
//!    parent to in progress. Dropped tasks do not.
//! 2. A completed parent forces the new task to completed.
//! 3. A parent with explicit (non-medium) priority imposes it on the task.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::classify::{Header, Item};
use crate::types::{Priority, Status, Task};

/// Index of a task within its [`TaskArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) usize);

/// The fields of a task before it is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub status: Status,
    pub priority: Priority,
    pub tentative: bool,
    pub content: String,
}

impl From<Item> for TaskDraft {
    fn from(item: Item) -> Self {
        Self {
            status: item.status,
            priority: item.priority,
            tentative: item.tentative,
            content: item.content,
        }
    }
}

impl From<Header> for TaskDraft {
    fn from(header: Header) -> Self {
        Self {
            status: if header.done {
                Status::Completed
            } else {
                Status::NotStarted
            },
            content: header.label,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    draft: TaskDraft,
    parent: Option<TaskId>,
    children: Vec<TaskId>,
}

/// Append-only storage for the tasks of one file.
#[derive(Debug, Clone)]
pub struct TaskArena {
    nodes: Vec<Node>,
    source: PathBuf,
    date: Option<NaiveDate>,
}

impl TaskArena {
    /// Creates an arena holding only the file root.
    ///
    /// The root is always [`TaskArena::root`].
    #[must_use]
    pub fn new(source: PathBuf, date: Option<NaiveDate>) -> Self {
        Self {
            nodes: vec![Node {
                draft: TaskDraft::default(),
                parent: None,
                children: Vec::new(),
            }],
            source,
            date,
        }
    }

    /// Id of the per-file root task.
    #[must_use]
    pub fn root(&self) -> TaskId {
        TaskId(0)
    }

    /// Number of tasks, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is created with the arena.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the draft stored for `id`.
    #[must_use]
    pub fn get(&self, id: TaskId) -> &TaskDraft {
        &self.nodes[id.0].draft
    }

    /// Returns the parent of `id`, or `None` for the root.
    #[must_use]
    pub fn parent_of(&self, id: TaskId) -> Option<TaskId> {
        self.nodes[id.0].parent
    }

    /// Returns the children of `id` in line order.
    #[must_use]
    pub fn children_of(&self, id: TaskId) -> &[TaskId] {
        &self.nodes[id.0].children
    }

    /// Builds a task under `parent`, applying propagation, and returns its id.
    pub fn attach(&mut self, parent: TaskId, mut draft: TaskDraft) -> TaskId {
        let group = &mut self.nodes[parent.0].draft;

        if draft.status.promotes_parent() && group.status == Status::NotStarted {
            group.status = Status::InProgress;
        }
        if group.status == Status::Completed {
            draft.status = Status::Completed;
        }
        if !group.priority.is_medium() {
            draft.priority = group.priority;
        }

        let id = TaskId(self.nodes.len());
        self.nodes.push(Node {
            draft,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Folds the arena into an owned tree rooted at the file root.
    ///
    /// Children always have larger ids than their parent, so walking the
    /// arena backwards finishes every child before its parent is built.
    #[must_use]
    pub fn into_tree(self) -> Task {
        let mut built: Vec<Option<Task>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);

        for (index, node) in self.nodes.into_iter().enumerate().rev() {
            let children = node
                .children
                .iter()
                .filter_map(|child| built[child.0].take())
                .collect();
            built[index] = Some(Task {
                status: node.draft.status,
                priority: node.draft.priority,
                tentative: node.draft.tentative,
                content: node.draft.content,
                children,
                ..Task::default()
            });
        }

        let mut root = built.swap_remove(0).unwrap_or_default();
        root.source = Some(self.source);
        root.date = self.date;
        root
    }
}
