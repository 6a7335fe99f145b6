//! Hot reload of the route file.
//!
//! Editors and deploy tools often save by writing a temporary file and
//! renaming it over the original, which gives the path a new inode. The
//! watcher therefore follows the parent directory and picks out events that
//! name the route file, so it keeps working after any number of such saves.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServerConfig;

/// Reloads a route file whenever it changes on disk.
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<ServerConfig>,
}

impl ConfigWatcher {
    /// Watcher for `path` and the receiver its validated reloads arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServerConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                updates,
            },
            rx,
        )
    }

    /// Start watching. Reloads stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Some(file_name) = self.path.file_name().map(OsStr::to_os_string) else {
            return Err(notify::Error::generic("config path has no file name"));
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let path = self.path.clone();
        let updates = self.updates;
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if names_file(&event, &file_name) => reload(&path, &updates),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), dir = %dir.display(), "Watching route file");
        Ok(watcher)
    }
}

/// Whether `event` writes, creates or renames onto the watched file.
fn names_file(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn reload(path: &Path, updates: &mpsc::UnboundedSender<ServerConfig>) {
    match load_config(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), routes = config.routes.len(), "Route file reloaded");
            let _ = updates.send(config);
        }
        // Half-written saves land here too; the next event retries.
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Route file rejected, keeping current routes"),
    }
}
