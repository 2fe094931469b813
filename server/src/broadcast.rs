//! Change notification broadcasting.
//!
//! Filesystem changes in the todo folder are published as [`ChangeNotice`]s
//! on a tokio broadcast channel. Every WebSocket subscriber gets its own
//! receiver, so each connected client sees every notice.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use todo_watcher_server::broadcast::{ChangeBroadcaster, ChangeNotice, ChangeOp};
//!
//! let broadcaster = ChangeBroadcaster::new();
//! let mut rx = broadcaster.subscribe();
//!
//! broadcaster.broadcast(ChangeNotice::new(ChangeOp::Write, PathBuf::from("/todo/list.txt")));
//!
//! let notice = rx.try_recv().unwrap();
//! assert_eq!(notice.to_string(), "WRITE; /todo/list.txt");
//! ```

use std::fmt;
use std::path::PathBuf;

use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{debug, trace};

/// Default channel capacity.
///
/// Subscribers that fall further behind than this receive
/// `RecvError::Lagged` and skip the missed notices.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOp {
    Write,
    Create,
    Delete,
    Move,
}

impl ChangeOp {
    /// Upper-case label used in the notice text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Write => "WRITE",
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::Move => "MOVE",
        }
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single change in the todo folder.
///
/// Its text form, `"<OP>; <path>"`, is what WebSocket clients receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub op: ChangeOp,
    pub path: PathBuf,
}

impl ChangeNotice {
    #[must_use]
    pub fn new(op: ChangeOp, path: PathBuf) -> Self {
        Self { op, path }
    }
}

impl fmt::Display for ChangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {}", self.op, self.path.display())
    }
}

/// Fan-out hub for change notices.
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct ChangeBroadcaster {
    sender: Sender<ChangeNotice>,
}

impl ChangeBroadcaster {
    /// Creates a broadcaster with [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a broadcaster with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        debug!(capacity, "Created change broadcaster");
        Self { sender }
    }

    /// Subscribes to notices broadcast from now on.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<ChangeNotice> {
        let rx = self.sender.subscribe();
        debug!(
            subscriber_count = self.subscriber_count(),
            "New subscriber added"
        );
        rx
    }

    /// Sends `notice` to every current subscriber.
    ///
    /// Returns the number of subscribers reached; 0 when nobody is listening.
    /// Never blocks.
    pub fn broadcast(&self, notice: ChangeNotice) -> usize {
        trace!(notice = %notice, "Broadcasting change");
        match self.sender.send(notice) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("No active subscribers for change notice");
                0
            }
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn notice(op: ChangeOp, path: &str) -> ChangeNotice {
        ChangeNotice::new(op, PathBuf::from(path))
    }

    #[test]
    fn notice_text_form() {
        assert_eq!(
            notice(ChangeOp::Write, "/todo/a.txt").to_string(),
            "WRITE; /todo/a.txt"
        );
        assert_eq!(
            notice(ChangeOp::Create, "/todo/b.txt").to_string(),
            "CREATE; /todo/b.txt"
        );
        assert_eq!(
            notice(ChangeOp::Delete, "/todo/c.txt").to_string(),
            "DELETE; /todo/c.txt"
        );
        assert_eq!(
            notice(ChangeOp::Move, "/todo/d.txt").to_string(),
            "MOVE; /todo/d.txt"
        );
    }

    #[test]
    fn broadcast_without_subscribers_returns_zero() {
        let broadcaster = ChangeBroadcaster::new();
        assert_eq!(broadcaster.broadcast(notice(ChangeOp::Write, "/t")), 0);
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let broadcaster = ChangeBroadcaster::default();
        assert_eq!(broadcaster.subscriber_count(), 0);

        let rx1 = broadcaster.subscribe();
        let _rx2 = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_notice() {
        let broadcaster = ChangeBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        let sent = notice(ChangeOp::Create, "/todo/new.txt");
        assert_eq!(broadcaster.broadcast(sent.clone()), 2);

        assert_eq!(rx1.recv().await.unwrap(), sent);
        assert_eq!(rx2.recv().await.unwrap(), sent);
    }

    #[tokio::test]
    async fn clones_share_the_channel() {
        let broadcaster = ChangeBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let clone = broadcaster.clone();
        clone.broadcast(notice(ChangeOp::Delete, "/todo/old.txt"));

        assert_eq!(rx.recv().await.unwrap().op, ChangeOp::Delete);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn slow_subscriber_lags() {
        let broadcaster = ChangeBroadcaster::with_capacity(2);
        let mut rx = broadcaster.subscribe();

        for i in 0..4 {
            broadcaster.broadcast(notice(ChangeOp::Write, &format!("/todo/{i}.txt")));
        }

        assert_eq!(rx.recv().await, Err(RecvError::Lagged(2)));
        assert_eq!(rx.recv().await.unwrap().path, PathBuf::from("/todo/2.txt"));
    }
}
