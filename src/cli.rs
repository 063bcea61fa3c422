use std::path::PathBuf;
use clap::Parser;
use crate::config::WatchConfig;
use crate::error::ConfigError;

#[derive(Parser)]
#[command(name = "watchcopy")]
#[command(version)]
#[command(about = "Copy every new file in a directory to up to five destinations")]
#[command(long_about = "watchcopy watches a source directory recursively. Each newly created file is copied, once its size has stopped changing, into every destination directory at the same relative path, keeping timestamps and permissions. Runs until interrupted with Ctrl+C.")]
pub struct Cli {
    /// Directory to watch for new files
    #[arg(value_name = "SOURCE", help = "Source directory (may also come from --config)")]
    pub source: Option<PathBuf>,

    /// Destination roots, repeat up to five times
    #[arg(short, long = "dest", value_name = "DIR", help = "Destination directory (repeatable)")]
    pub destinations: Vec<PathBuf>,

    #[arg(long, value_name = "SECS", help = "Seconds to wait before each size check")]
    pub wait: Option<u64>,

    #[arg(long, value_name = "SECS", help = "Seconds between the two size readings")]
    pub settle: Option<u64>,

    #[arg(long, value_name = "N", help = "Readiness attempts before a file is skipped")]
    pub max_retries: Option<u32>,

    #[arg(long, value_name = "N", help = "Worker threads processing new files")]
    pub workers: Option<usize>,

    /// Ignore patterns in gitignore syntax
    #[arg(long, value_delimiter = ',', help = "Patterns of files never to copy (e.g. *.part,*.tmp)")]
    pub ignore: Option<Vec<String>>,

    #[arg(short, long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    /// Layer the configuration: file (or defaults), environment, then flags.
    pub fn build_config(&self) -> Result<WatchConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => WatchConfig::from_file(path)?,
            None => WatchConfig::default(),
        };

        config.apply_env();
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut WatchConfig) {
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if !self.destinations.is_empty() {
            config.destinations = self.destinations.clone();
        }
        if let Some(secs) = self.wait {
            config.wait_time_ms = secs.saturating_mul(1_000);
        }
        if let Some(secs) = self.settle {
            config.settle_interval_ms = secs.saturating_mul(1_000);
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(ignore) = &self.ignore {
            config.ignore = ignore.clone();
        }
    }
}
