//! Live reload of the source document.
//!
//! A [`DocumentWatcher`] watches the file's parent directory with `notify`,
//! debounces bursts of events, and rereads the file once they settle.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace, warn};

use crate::document::RawDocument;

/// Debounce used by the CLI watch loop.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches one Markdown file and yields its new contents when it changes.
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    path: PathBuf,
    file_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
    current: RawDocument,
}

impl DocumentWatcher {
    /// Start watching `path`. `current` is the content already on screen.
    ///
    /// # Errors
    /// Returns an error if the watch cannot be registered.
    pub fn new(path: impl AsRef<Path>, current: RawDocument, debounce: Duration) -> Result<Self> {
        // OS event paths are canonical; match them.
        let path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let file_name = path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .context("Failed to create file watcher")?;
        watcher
            .watch(&watch_root, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", watch_root.display()))?;
        debug!(path = %path.display(), root = %watch_root.display(), "watching document");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            path,
            file_name,
            debounce,
            pending_since: None,
            current,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The most recently observed contents.
    pub const fn current(&self) -> &RawDocument {
        &self.current
    }

    /// Drain pending events. Returns the new document once a debounced change
    /// has settled and the file content actually differs.
    ///
    /// # Errors
    /// Returns an error if the changed file cannot be read.
    pub fn poll(&mut self) -> Result<Option<RawDocument>> {
        if !self.take_change_ready() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if text == self.current.as_str() {
            trace!("change event without content change");
            return Ok(None);
        }
        self.current = RawDocument::from(text);
        Ok(Some(self.current.clone()))
    }

    fn take_change_ready(&mut self) -> bool {
        let mut saw_relevant = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => saw_relevant = true,
                Ok(ev) => trace!(kind = ?ev.kind, paths = ?ev.paths, "ignoring event"),
                Err(err) => warn!(%err, "watch error"),
            }
        }
        if saw_relevant {
            self.pending_since = Some(Instant::now());
        }
        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.path
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
