use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use filetime::{set_file_times, FileTime};
use crate::config::WatchConfig;
use crate::error::CopyError;

/// Result of copying one file into one destination root
#[derive(Debug)]
pub struct CopyOutcome {
    pub destination: PathBuf,
    pub target: PathBuf,
    pub result: Result<(), CopyError>,
}

impl CopyOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-destination outcomes for one source file, in destination order
#[derive(Debug)]
pub struct CopyReport {
    pub relative: PathBuf,
    pub outcomes: Vec<CopyOutcome>,
}

impl CopyReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[derive(Debug, Clone)]
pub struct FanoutCopier {
    destinations: Vec<PathBuf>,
}

impl FanoutCopier {
    pub fn new(destinations: Vec<PathBuf>) -> Self {
        Self { destinations }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.destinations.clone())
    }

    /// Copy `source_file` to `<destination>/<relative>` for every destination.
    ///
    /// A failure on one destination is logged and recorded; the remaining
    /// destinations are still attempted.
    pub fn copy(&self, source_file: &Path, relative: &Path) -> CopyReport {
        let outcomes = self
            .destinations
            .iter()
            .map(|destination| {
                let target = destination.join(relative);
                let result = copy_into(source_file, &target);

                match &result {
                    Ok(()) => tracing::info!(
                        "Successfully copied {} to {}",
                        relative.display(),
                        target.display()
                    ),
                    Err(err) => tracing::error!(
                        "Error copying {} to {}: {}",
                        relative.display(),
                        destination.display(),
                        err
                    ),
                }

                CopyOutcome {
                    destination: destination.clone(),
                    target,
                    result,
                }
            })
            .collect();

        CopyReport {
            relative: relative.to_path_buf(),
            outcomes,
        }
    }
}

fn copy_into(source_file: &Path, target: &Path) -> Result<(), CopyError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| CopyError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    copy_file_with_metadata(source_file, target)?;
    Ok(())
}

/// Copy file contents, then carry over timestamps and permissions.
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;

    let stat_src = fs::metadata(src)?;
    let atime = FileTime::from_last_access_time(&stat_src);
    let mtime = FileTime::from_last_modification_time(&stat_src);
    set_file_times(dst, atime, mtime)?;
    fs::set_permissions(dst, stat_src.permissions())?;
    Ok(())
}

/// Path of `file` relative to `root`.
///
/// Falls back to canonical forms of both paths, since notifier backends
/// may report a resolved path (e.g. `/private/var` for `/var`).
pub fn relative_path(root: &Path, file: &Path) -> Result<PathBuf, CopyError> {
    if let Ok(rel) = file.strip_prefix(root) {
        return Ok(rel.to_path_buf());
    }

    let outside = || CopyError::OutsideSource {
        path: file.to_path_buf(),
        root: root.to_path_buf(),
    };

    let canonical_root = root.canonicalize().map_err(|_| outside())?;
    let canonical_file = match file.canonicalize() {
        Ok(path) => path,
        Err(_) => {
            // The file may already be gone; resolve its parent instead.
            let parent = file.parent().ok_or_else(outside)?;
            let name = file.file_name().ok_or_else(outside)?;
            parent.canonicalize().map_err(|_| outside())?.join(name)
        }
    };

    canonical_file
        .strip_prefix(&canonical_root)
        .map(Path::to_path_buf)
        .map_err(|_| outside())
}
