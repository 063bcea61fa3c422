//! File readiness detection
//!
//! A newly created file is usually still being written when the creation
//! event arrives. The checker waits until two size readings taken
//! `settle_interval` apart agree and the file is not locked by another
//! process before the file is handed to the copier.

use std::path::Path;
use std::thread;
use std::time::Duration;
use crate::config::WatchConfig;

/// Result of waiting for a file to settle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready { attempts: u32 },
    NotReady { attempts: u32 },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            Readiness::Ready { attempts } | Readiness::NotReady { attempts } => attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadinessChecker {
    wait_time: Duration,
    settle_interval: Duration,
    max_retries: u32,
}

impl ReadinessChecker {
    pub fn new(wait_time: Duration, settle_interval: Duration, max_retries: u32) -> Self {
        Self {
            wait_time,
            settle_interval,
            max_retries,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.wait_time(), config.settle_interval(), config.max_retries)
    }

    /// Block until the file looks stable or the attempt budget runs out.
    ///
    /// Read errors (the file vanished, permissions changed) are logged and
    /// count as a failed attempt. Nothing is re-queued after the last one.
    pub fn wait_for_file_ready(&self, path: &Path) -> Readiness {
        for attempt in 1..=self.max_retries {
            match self.check_once(path) {
                Ok(true) => {
                    tracing::debug!("{} ready after {} attempt(s)", path.display(), attempt);
                    return Readiness::Ready { attempts: attempt };
                }
                Ok(false) => {
                    tracing::debug!("{} still changing (attempt {})", path.display(), attempt);
                }
                Err(err) => {
                    tracing::warn!("File check attempt {} failed: {}", attempt, err);
                }
            }
        }

        Readiness::NotReady {
            attempts: self.max_retries,
        }
    }

    fn check_once(&self, path: &Path) -> std::io::Result<bool> {
        thread::sleep(self.wait_time);
        let initial_size = std::fs::metadata(path)?.len();
        thread::sleep(self.settle_interval);
        let final_size = std::fs::metadata(path)?.len();

        Ok(initial_size == final_size && !is_file_locked(path))
    }
}

/// Check if the file is held open by another process.
///
/// Windows refuses an open with no sharing while any other handle exists.
#[cfg(windows)]
pub fn is_file_locked(path: &Path) -> bool {
    use std::os::windows::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .read(true)
        .share_mode(0)
        .open(path)
        .is_err()
}

/// Check if the file is held open by another process.
///
/// Renaming a file onto itself only fails where the platform blocks renames
/// of open files, so on Unix this under-detects writers.
#[cfg(not(windows))]
pub fn is_file_locked(path: &Path) -> bool {
    std::fs::rename(path, path).is_err()
}
