//! Grouping stack machine.
//!
//! Tracks which group a new line belongs to. Each open group is a frame
//! pairing the group's [`TaskId`] with its indentation threshold; frames are
//! pushed and popped as a unit so the two never drift apart.
//!
//! The bottom frame is the file root at threshold 0 and is never popped.

use crate::builder::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    group: TaskId,
    threshold: usize,
}

/// Stack of open groups for one file.
#[derive(Debug, Clone)]
pub struct GroupStack {
    frames: Vec<Frame>,
}

impl GroupStack {
    /// Creates a stack holding only the file root at threshold 0.
    #[must_use]
    pub fn new(root: TaskId) -> Self {
        Self {
            frames: vec![Frame {
                group: root,
                threshold: 0,
            }],
        }
    }

    /// Adjusts the open groups for a line at `indent`.
    ///
    /// A line deeper than the current threshold nests under `latest`, the
    /// task built from the previous line. Otherwise frames deeper than the
    /// line are closed until the top threshold is at most `indent`.
    pub fn align(&mut self, indent: usize, latest: TaskId) {
        if indent > self.threshold() {
            self.frames.push(Frame {
                group: latest,
                threshold: indent,
            });
            return;
        }

        while self.frames.len() > 1 && self.threshold() > indent {
            self.frames.pop();
        }
    }

    /// Opens a header group on top of the stack.
    ///
    /// Headers always start a new level, regardless of the threshold below
    /// them. The header keeps its own line's indentation as threshold, so a
    /// later dedent closes it together with whatever it was nested in.
    pub fn open(&mut self, header: TaskId, indent: usize) {
        self.frames.push(Frame {
            group: header,
            threshold: indent,
        });
    }

    /// The group new tasks are appended to.
    #[must_use]
    pub fn parent(&self) -> TaskId {
        self.top().group
    }

    /// Threshold of the innermost open group.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.top().threshold
    }

    /// Number of open groups, including the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn top(&self) -> &Frame {
        // The root frame is pushed in `new` and never popped.
        &self.frames[self.frames.len() - 1]
    }
}
