use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use anyhow::{Context, Result};
use crate::FileEvent;

/// Recursive subscription to creation events under one directory
pub struct FileWatcher {
    watcher: Option<RecommendedWatcher>,
    event_rx: Receiver<FileEvent>,
    translator: Option<JoinHandle<()>>,
}

impl FileWatcher {
    pub fn new<P: AsRef<Path>>(path: P, debounce: Duration) -> Result<Self> {
        let path = path.as_ref();

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let (event_tx, event_rx) = mpsc::channel::<FileEvent>();

        // Create the notify watcher
        let mut watcher = notify::recommended_watcher(tx)
            .context("Failed to create file system watcher")?;

        watcher
            .watch(path, RecursiveMode::Recursive)
            .context("Failed to start watching directory")?;

        // Translate raw notify events until the watcher is dropped
        let translator = thread::Builder::new()
            .name("watchcopy-events".to_string())
            .spawn(move || {
                let mut last_event_time = HashMap::<PathBuf, Instant>::new();

                while let Ok(result) = rx.recv() {
                    let event = match result {
                        Ok(event) => event,
                        Err(err) => {
                            tracing::error!("File watcher error: {}", err);
                            continue;
                        }
                    };

                    let now = Instant::now();
                    last_event_time.retain(|_, seen| now.duration_since(*seen) < debounce);

                    for file_event in FileEvent::from_notify(&event) {
                        // Debounce: ignore events that happen too quickly after the previous one
                        if last_event_time.contains_key(&file_event.path) {
                            continue;
                        }
                        last_event_time.insert(file_event.path.clone(), now);

                        if event_tx.send(file_event).is_err() {
                            return; // Receiver dropped, exit thread
                        }
                    }
                }
            })
            .context("Failed to spawn event translator thread")?;

        Ok(Self {
            watcher: Some(watcher),
            event_rx,
            translator: Some(translator),
        })
    }

    /// A watcher with no subscription, fed from `event_rx` directly.
    #[cfg(test)]
    pub(crate) fn detached(event_rx: Receiver<FileEvent>) -> Self {
        Self {
            watcher: None,
            event_rx,
            translator: None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<FileEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    /// Unsubscribe and join the translator thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the notify watcher closes its sender, which ends the translator loop.
        drop(self.watcher.take());
        if let Some(handle) = self.translator.take() {
            if handle.join().is_err() {
                tracing::error!("Event translator thread panicked");
            }
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
