//! Configuration management for watchcopy
//!
//! A [`WatchConfig`] is assembled from defaults, an optional TOML file,
//! environment variables and command-line flags, then validated once before
//! monitoring starts. It is never mutated afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use crate::error::ConfigError;

/// Maximum number of destination directories a single source fans out to.
pub const MAX_DESTINATIONS: usize = 5;

/// Everything the monitor needs to know, passed explicitly into it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory watched recursively for new files
    pub source: PathBuf,
    /// Ordered destination roots; each new file is mirrored under every one
    pub destinations: Vec<PathBuf>,
    /// Sleep before the first size reading of each attempt, in milliseconds
    pub wait_time_ms: u64,
    /// Gap between the two size readings of one attempt, in milliseconds
    pub settle_interval_ms: u64,
    /// Number of readiness attempts before a file is abandoned
    pub max_retries: u32,
    /// Worker threads running readiness checks and copies
    pub workers: usize,
    /// Repeated events for one path inside this window are dropped
    pub event_debounce_ms: u64,
    /// How often the monitoring loop checks for an interrupt
    pub poll_interval_ms: u64,
    /// Gitignore-style patterns for files that are never copied
    pub ignore: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destinations: Vec::new(),
            wait_time_ms: 5_000,
            settle_interval_ms: 1_000,
            max_retries: 3,
            workers: 1,
            event_debounce_ms: 100,
            poll_interval_ms: 1_000,
            ignore: Vec::new(),
        }
    }
}

impl WatchConfig {
    pub fn new<P: AsRef<Path>>(source: P, destinations: Vec<PathBuf>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destinations,
            ..Self::default()
        }
    }

    /// Get the per-attempt wait duration
    pub fn wait_time(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }

    /// Get the gap between size readings
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn event_debounce_duration(&self) -> Duration {
        Duration::from_millis(self.event_debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::ParseError(format!("{}: {}", path.display(), err))
            }
        })?;

        toml::from_str(&text).map_err(|err| ConfigError::ParseError(err.to_string()))
    }

    /// Override timing and pool settings from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("WATCHCOPY_WAIT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                self.wait_time_ms = secs.saturating_mul(1_000);
            }
        }

        if let Ok(val) = std::env::var("WATCHCOPY_SETTLE_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                self.settle_interval_ms = secs.saturating_mul(1_000);
            }
        }

        if let Ok(val) = std::env::var("WATCHCOPY_MAX_RETRIES") {
            if let Ok(retries) = val.parse::<u32>() {
                self.max_retries = retries;
            }
        }

        if let Ok(val) = std::env::var("WATCHCOPY_WORKERS") {
            if let Ok(workers) = val.parse::<usize>() {
                self.workers = workers;
            }
        }
    }

    /// Validate directories and numeric settings.
    ///
    /// Every path must already exist as a directory. A destination that
    /// lives inside the source tree is rejected because its copies would be
    /// picked up again as new files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.is_dir() {
            return Err(ConfigError::InvalidSource(self.source.clone()));
        }

        if self.destinations.is_empty() {
            return Err(ConfigError::NoDestinations);
        }

        if self.destinations.len() > MAX_DESTINATIONS {
            return Err(ConfigError::TooManyDestinations {
                max: MAX_DESTINATIONS,
                got: self.destinations.len(),
            });
        }

        let source = self.source.canonicalize().unwrap_or_else(|_| self.source.clone());
        for destination in &self.destinations {
            if !destination.is_dir() {
                return Err(ConfigError::InvalidDestination(destination.clone()));
            }

            let canonical = destination
                .canonicalize()
                .unwrap_or_else(|_| destination.clone());
            if canonical.starts_with(&source) {
                return Err(ConfigError::ValidationError(format!(
                    "destination {} is inside the source directory",
                    destination.display()
                )));
            }
        }

        if self.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(ConfigError::ValidationError(
                "workers must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs(root: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let dir = root.join(name);
                std::fs::create_dir_all(&dir).unwrap();
                dir
            })
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = WatchConfig::default();

        assert_eq!(config.wait_time(), Duration::from_secs(5));
        assert_eq!(config.settle_interval(), Duration::from_secs(1));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.workers, 1);
        assert!(config.ignore.is_empty());
    }

    #[test]
    fn test_valid_config() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir(&source).unwrap();
        let config = WatchConfig::new(&source, dirs(temp.path(), &["d1", "d2", "d3", "d4", "d5"]));

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_source_rejected() {
        let temp = TempDir::new().unwrap();
        let config = WatchConfig::new(temp.path().join("nope"), dirs(temp.path(), &["d1"]));

        assert!(matches!(config.validate(), Err(ConfigError::InvalidSource(_))));
    }

    #[test]
    fn test_destination_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir(&source).unwrap();
        let file = temp.path().join("not_a_dir.txt");
        std::fs::write(&file, "x").unwrap();

        let config = WatchConfig::new(&source, vec![file.clone()]);
        match config.validate() {
            Err(ConfigError::InvalidDestination(path)) => assert_eq!(path, file),
            other => panic!("expected InvalidDestination, got {:?}", other),
        }
    }

    #[test]
    fn test_destination_count_limits() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir(&source).unwrap();

        let config = WatchConfig::new(&source, Vec::new());
        assert!(matches!(config.validate(), Err(ConfigError::NoDestinations)));

        let config = WatchConfig::new(&source, dirs(temp.path(), &["a", "b", "c", "d", "e", "f"]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyDestinations { max: 5, got: 6 })
        ));
    }

    #[test]
    fn test_destination_inside_source_rejected() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        let nested = source.join("mirror");
        std::fs::create_dir_all(&nested).unwrap();

        let config = WatchConfig::new(&source, vec![nested]);
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_retries_and_workers_rejected() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir(&source).unwrap();
        let mut config = WatchConfig::new(&source, dirs(temp.path(), &["d1"]));

        config.max_retries = 0;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("watchcopy.toml");
        std::fs::write(
            &path,
            "source = \"/data/in\"\ndestinations = [\"/data/a\", \"/data/b\"]\nmax_retries = 7\n",
        )
        .unwrap();

        let config = WatchConfig::from_file(&path).unwrap();
        assert_eq!(config.source, PathBuf::from("/data/in"));
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.wait_time_ms, 5_000);
    }

    #[test]
    fn test_from_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            WatchConfig::from_file(temp.path().join("missing.toml")),
            Err(ConfigError::FileNotFound(_))
        ));

        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "max_retries = \"three\"").unwrap();
        assert!(matches!(
            WatchConfig::from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_env_config_loading() {
        std::env::set_var("WATCHCOPY_WAIT_SECS", "2");
        std::env::set_var("WATCHCOPY_WORKERS", "4");

        let mut config = WatchConfig::default();
        config.apply_env();

        assert_eq!(config.wait_time(), Duration::from_secs(2));
        assert_eq!(config.workers, 4);

        // Cleanup
        std::env::remove_var("WATCHCOPY_WAIT_SECS");
        std::env::remove_var("WATCHCOPY_WORKERS");
    }
}
