//! Monitoring loop
//!
//! [`Monitor::start`] subscribes to the source directory and spins up the
//! worker pool; [`Monitor::run`] then blocks, forwarding creation events to
//! the workers until the `running` flag is cleared (Ctrl+C in the binary).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use anyhow::{Context, Result};
use crate::config::WatchConfig;
use crate::events::FileEvent;
use crate::handler::EventHandler;
use crate::watcher::FileWatcher;

pub struct Monitor {
    config: Arc<WatchConfig>,
    watcher: FileWatcher,
    pool: WorkerPool,
}

impl Monitor {
    /// Validate the configuration, subscribe to the source tree and start
    /// the workers. Events are captured from this point on.
    pub fn start(config: WatchConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let handler = Arc::new(EventHandler::new(config.clone())?);
        let watcher = FileWatcher::new(&config.source, config.event_debounce_duration())?;
        let pool = WorkerPool::new(config.workers, handler)?;

        Ok(Self {
            config,
            watcher,
            pool,
        })
    }

    /// Block until `running` is cleared, then unsubscribe and join every
    /// thread. Copies already in progress are allowed to finish.
    pub fn run(self, running: Arc<AtomicBool>) -> Result<()> {
        tracing::info!("Monitoring {} for new files...", self.config.source.display());

        let poll_interval = self.config.poll_interval();
        let mut disconnected = false;
        while running.load(Ordering::SeqCst) {
            match self.watcher.recv_timeout(poll_interval) {
                Ok(event) => self.pool.submit(event),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        tracing::info!("Stopping monitor for {}", self.config.source.display());
        self.watcher.stop();
        self.pool.shutdown();

        if disconnected {
            anyhow::bail!(
                "File watcher for {} disconnected unexpectedly",
                self.config.source.display()
            );
        }
        Ok(())
    }
}

/// Fixed set of threads pulling events off a shared queue
struct WorkerPool {
    job_tx: Option<Sender<FileEvent>>,
    workers: Vec<JoinHandle<()>>,
    stopping: Arc<AtomicBool>,
}

impl WorkerPool {
    fn new(size: usize, handler: Arc<EventHandler>) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<FileEvent>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let stopping = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let job_rx = job_rx.clone();
            let handler = handler.clone();
            let stopping = stopping.clone();

            let worker = thread::Builder::new()
                .name(format!("watchcopy-worker-{}", id))
                .spawn(move || loop {
                    let job = match job_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let event = match job {
                        Ok(event) => event,
                        Err(_) => break, // Queue closed
                    };

                    if stopping.load(Ordering::SeqCst) {
                        tracing::debug!("Discarding queued event for {}", event.path.display());
                        continue;
                    }
                    handler.handle(&event);
                })
                .context("Failed to spawn worker thread")?;
            workers.push(worker);
        }

        Ok(Self {
            job_tx: Some(job_tx),
            workers,
            stopping,
        })
    }

    fn submit(&self, event: FileEvent) {
        if let Some(tx) = &self.job_tx {
            if tx.send(event).is_err() {
                tracing::error!("All workers have exited, event dropped");
            }
        }
    }

    fn shutdown(mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        drop(self.job_tx.take());

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }
}
