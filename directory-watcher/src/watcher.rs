//! Directory watcher implementation.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::error::{Result, WatcherError};
use crate::event::{FileCreatedEvent, is_creation};

/// Default capacity of the event channel handed out by [`DirectoryWatcher::start`].
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Receiving side of a watch subscription.
///
/// Yields `None` once the watcher has been stopped or dropped.
pub type EventStream = mpsc::Receiver<FileCreatedEvent>;

/// Watches one directory for new entries whose name matches a filter.
///
/// The OS registration is held only between a successful [`start`] and the
/// next [`stop`] (or drop).
///
/// [`start`]: DirectoryWatcher::start
/// [`stop`]: DirectoryWatcher::stop
pub struct DirectoryWatcher {
    /// Watch configuration.
    config: WatchConfig,

    /// Capacity of the event channel.
    capacity: usize,

    /// Internal notify watcher, present while running.
    watcher: Option<RecommendedWatcher>,

    /// Canonical path registered with the OS.
    watched_path: Option<PathBuf>,
}

impl DirectoryWatcher {
    /// Create a new, stopped directory watcher.
    pub fn new(config: WatchConfig) -> Self {
        Self {
            config,
            capacity: DEFAULT_EVENT_CAPACITY,
            watcher: None,
            watched_path: None,
        }
    }

    /// Set the event channel capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Validate the configuration and register the watch.
    ///
    /// Returns the subscription on which one [`FileCreatedEvent`] arrives per
    /// matching creation reported by the OS. Nothing is registered when this
    /// fails.
    pub fn start(&mut self) -> Result<EventStream> {
        if let Some(path) = &self.watched_path {
            return Err(WatcherError::AlreadyWatching(path.display().to_string()));
        }

        let filter = self.config.validate()?;
        let path = self.config.path.canonicalize()?;

        let (event_tx, event_rx) = mpsc::channel(self.capacity);
        let handler_filter = filter.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if !is_creation(&event.kind) {
                        return;
                    }

                    for path in event.paths {
                        if !handler_filter.matches(&path) {
                            continue;
                        }

                        debug!("Created: {}", path.display());
                        if let Err(e) = event_tx.blocking_send(FileCreatedEvent::new(path)) {
                            warn!(
                                "Dropping file event, subscriber is gone: {}",
                                e.0.full_path.display()
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!("Watch error: {e}");
                }
            },
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        info!(
            path = %path.display(),
            filter = filter.as_str(),
            "Watching directory for new files"
        );

        self.watcher = Some(watcher);
        self.watched_path = Some(path);

        Ok(event_rx)
    }

    /// Unregister the watch and release the OS handle.
    ///
    /// Safe to call repeatedly or before [`start`](Self::start). Never blocks,
    /// even while the event stream is full and unread.
    pub fn stop(&mut self) {
        let Some(watcher) = self.watcher.take() else {
            return;
        };

        // `unwatch` waits on the notify thread, which may be parked in
        // `blocking_send`. Dropping only signals it to shut down.
        drop(watcher);

        if let Some(path) = self.watched_path.take() {
            info!("Directory watcher stopped: {}", path.display());
        }
    }

    /// Check if the watcher is registered.
    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// The canonical directory being watched, while running.
    pub fn watched_path(&self) -> Option<&Path> {
        self.watched_path.as_deref()
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
