use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use crate::config::WatchConfig;
use crate::copier::{relative_path, CopyReport, FanoutCopier};
use crate::events::FileEvent;
use crate::filter::FileFilter;
use crate::readiness::{Readiness, ReadinessChecker};

/// What happened to a single creation event
#[derive(Debug)]
pub enum HandleOutcome {
    IgnoredDirectory,
    OutsideSource,
    Filtered(PathBuf),
    NotReady(Readiness),
    Copied(CopyReport),
}

/// Runs the readiness check and fan-out copy for each created file
pub struct EventHandler {
    config: Arc<WatchConfig>,
    checker: ReadinessChecker,
    copier: FanoutCopier,
    filter: FileFilter,
}

impl EventHandler {
    pub fn new(config: Arc<WatchConfig>) -> Result<Self> {
        let checker = ReadinessChecker::from_config(&config);
        let copier = FanoutCopier::from_config(&config);
        let filter = FileFilter::new(&config.source, &config.ignore)?;

        Ok(Self {
            config,
            checker,
            copier,
            filter,
        })
    }

    /// Handle one event. Blocks for the whole readiness wait and copy.
    ///
    /// Files that never settle are abandoned; they are not retried later.
    pub fn handle(&self, event: &FileEvent) -> HandleOutcome {
        if event.is_directory {
            tracing::debug!("Ignoring new directory {}", event.path.display());
            return HandleOutcome::IgnoredDirectory;
        }

        let relative = match relative_path(&self.config.source, &event.path) {
            Ok(rel) => rel,
            Err(err) => {
                tracing::warn!("Skipping {}: {}", event.path.display(), err);
                return HandleOutcome::OutsideSource;
            }
        };

        if !self.filter.should_watch(&relative) {
            tracing::debug!("Ignoring {} (matches ignore pattern)", relative.display());
            return HandleOutcome::Filtered(relative);
        }

        let readiness = self.checker.wait_for_file_ready(&event.path);
        if !readiness.is_ready() {
            tracing::warn!(
                "File {} not ready after multiple attempts",
                event.path.display()
            );
            return HandleOutcome::NotReady(readiness);
        }

        HandleOutcome::Copied(self.copier.copy(&event.path, &relative))
    }
}
