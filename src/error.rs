use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Please select a valid source directory: {0}")]
    InvalidSource(PathBuf),

    #[error("Please select a valid target directory: {0}")]
    InvalidDestination(PathBuf),

    #[error("at least one destination directory is required")]
    NoDestinations,

    #[error("at most {max} destination directories are supported, got {got}")]
    TooManyDestinations { max: usize, got: usize },

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("{path} is not under source root {root}")]
    OutsideSource { path: PathBuf, root: PathBuf },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
