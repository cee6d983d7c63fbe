use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to write preferences to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid page url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("tick must be between 1 and 1000 milliseconds (got {0})")]
    Tick(u64),
    #[error("cannot derive a page url for {0}")]
    PageUrl(PathBuf),
    #[error("no configuration directory available; pass --prefs")]
    NoConfigDir,
    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}
