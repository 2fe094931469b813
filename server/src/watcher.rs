//! Filesystem watcher for the todo folder.
//!
//! Watches the todo folder (non-recursively) and publishes a
//! [`ChangeNotice`] for every write, create, remove or rename. The notify
//! callback runs on the watcher's own thread; it only maps the event and
//! hands it to the broadcaster, which never blocks.
//!
//! Clients react to a notice by fetching `/api/todos` again. There is no
//! incremental re-parse.

use std::path::{Path, PathBuf};

use notify::{
    event::ModifyKind, Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::broadcast::{ChangeBroadcaster, ChangeNotice, ChangeOp};

/// Errors that can occur while setting up the watcher.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to initialize the file system watcher.
    #[error("failed to create watcher: {0}")]
    WatcherInit(#[from] notify::Error),

    /// The watch directory does not exist or is not a directory.
    #[error("watch directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

/// Result type for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Keeps a notify subscription on the todo folder alive.
///
/// Dropping the watcher stops the notifications.
#[derive(Debug)]
pub struct TodoWatcher {
    /// Kept alive to maintain the watch subscription.
    #[allow(dead_code)]
    watcher: RecommendedWatcher,

    watch_dir: PathBuf,
}

impl TodoWatcher {
    /// Starts watching `watch_dir`, publishing changes on `broadcaster`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The watch directory does not exist
    /// - The file system watcher cannot be initialized
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::path::PathBuf;
    /// use todo_watcher_server::broadcast::ChangeBroadcaster;
    /// use todo_watcher_server::watcher::TodoWatcher;
    ///
    /// let broadcaster = ChangeBroadcaster::new();
    /// let watcher = TodoWatcher::new(PathBuf::from("/home/user/todo"), broadcaster)?;
    /// # Ok::<(), todo_watcher_server::watcher::WatcherError>(())
    /// ```
    pub fn new(watch_dir: PathBuf, broadcaster: ChangeBroadcaster) -> Result<Self> {
        if !watch_dir.is_dir() {
            return Err(WatcherError::DirectoryNotFound(watch_dir));
        }

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| handle_notify_event(res, &broadcaster),
            Config::default(),
        )?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        info!(watch_dir = %watch_dir.display(), "Watching todo folder");

        Ok(Self { watcher, watch_dir })
    }

    /// Returns the directory being watched.
    #[must_use]
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }
}

/// Maps a notify event kind to the change it represents.
///
/// Renames are reported by notify as a kind of modification, so they are
/// matched before other modifications. Access and metadata-only events are
/// not changes.
#[must_use]
pub fn change_op(kind: &EventKind) -> Option<ChangeOp> {
    match kind {
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeOp::Move),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeOp::Write),
        EventKind::Create(_) => Some(ChangeOp::Create),
        EventKind::Remove(_) => Some(ChangeOp::Delete),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

/// Handles one callback from notify.
fn handle_notify_event(res: notify::Result<Event>, broadcaster: &ChangeBroadcaster) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "File watcher error");
            return;
        }
    };

    trace!(kind = ?event.kind, paths = ?event.paths, "Received notify event");

    let Some(op) = change_op(&event.kind) else {
        trace!(kind = ?event.kind, "Ignoring event kind");
        return;
    };

    for path in event.paths {
        let notice = ChangeNotice::new(op, path);
        let receivers = broadcaster.broadcast(notice.clone());
        debug!(notice = %notice, receivers, "Broadcast change notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    #[test]
    fn change_op_maps_event_kinds() {
        assert_eq!(
            change_op(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(ChangeOp::Write)
        );
        assert_eq!(
            change_op(&EventKind::Modify(ModifyKind::Any)),
            Some(ChangeOp::Write)
        );
        assert_eq!(
            change_op(&EventKind::Create(CreateKind::File)),
            Some(ChangeOp::Create)
        );
        assert_eq!(
            change_op(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeOp::Delete)
        );
        assert_eq!(
            change_op(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            Some(ChangeOp::Move)
        );
    }

    #[test]
    fn change_op_ignores_non_changes() {
        assert_eq!(change_op(&EventKind::Access(AccessKind::Any)), None);
        assert_eq!(
            change_op(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))),
            None
        );
        assert_eq!(change_op(&EventKind::Any), None);
        assert_eq!(change_op(&EventKind::Other), None);
    }

    #[test]
    fn notify_event_is_broadcast_per_path() {
        let broadcaster = ChangeBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/todo/a.txt"))
            .add_path(PathBuf::from("/todo/b.txt"));
        handle_notify_event(Ok(event), &broadcaster);

        assert_eq!(rx.try_recv().unwrap().to_string(), "CREATE; /todo/a.txt");
        assert_eq!(rx.try_recv().unwrap().to_string(), "CREATE; /todo/b.txt");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn ignored_event_is_not_broadcast() {
        let broadcaster = ChangeBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let event = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/todo/a.txt"));
        handle_notify_event(Ok(event), &broadcaster);
        handle_notify_event(Err(notify::Error::generic("boom")), &broadcaster);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = TodoWatcher::new(missing.clone(), ChangeBroadcaster::new()).unwrap_err();
        assert!(matches!(err, WatcherError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn file_is_not_a_watch_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("list.txt");
        fs::write(&file, "x").unwrap();
        assert!(TodoWatcher::new(file, ChangeBroadcaster::new()).is_err());
    }

    #[tokio::test]
    async fn writing_a_file_produces_a_notice() {
        let dir = TempDir::new().unwrap();
        let broadcaster = ChangeBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let watcher = TodoWatcher::new(dir.path().to_path_buf(), broadcaster).unwrap();
        assert_eq!(watcher.watch_dir(), dir.path());

        // Give the backend a moment to register the watch.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let file = dir.path().join("list.txt");
        fs::write(&file, "Buy milk\n").unwrap();

        let notice = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for change notice")
            .unwrap();
        assert!(notice.path.ends_with("list.txt"));
        assert!(matches!(notice.op, ChangeOp::Create | ChangeOp::Write));
    }
}
