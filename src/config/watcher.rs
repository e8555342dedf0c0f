//! Hot reload for the drag config file.
//!
//! Wraps a `notify` watcher on the file's directory and hands reloaded
//! configs back through [`ConfigWatcher::poll`], which the embedding loop
//! calls from the UI thread and forwards to `DragCore::update_options`.

use super::DragConfig;
use crate::error::ConfigResult;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use tracing::{debug, warn};

pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
}

impl ConfigWatcher {
    /// Start watching `path`. The file does not need to exist yet, but its
    /// directory does.
    pub fn new(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let (tx, events) = channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver is gone once the ConfigWatcher is dropped.
            let _ = tx.send(res);
        })?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!(path = %path.display(), "Watching drag config");

        Ok(Self {
            path,
            _watcher: watcher,
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending file events. Returns the freshly loaded config when
    /// the watched file was created or modified since the last poll, or the
    /// load error when the new content is invalid.
    pub fn poll(&mut self) -> Option<ConfigResult<DragConfig>> {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(Ok(event)) => {
                    if self.concerns(&event) {
                        changed = true;
                    }
                }
                Ok(Err(err)) => warn!("Config watch error: {}", err),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if !changed {
            return None;
        }
        debug!(path = %self.path.display(), "Drag config changed on disk");
        Some(DragConfig::load(&self.path))
    }

    fn concerns(&self, event: &Event) -> bool {
        matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == self.path.file_name())
    }
}
