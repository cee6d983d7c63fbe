//! Command line surface and its validated form.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::{ConfigError, PreferenceError};

const APP_DIR: &str = "reading-ruler";
const PREFS_FILE: &str = "preferences.json";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "reading-ruler",
    version = env!("CARGO_PKG_VERSION"),
    about = "Read Markdown in the terminal with the line under the mouse highlighted"
)]
pub struct Cli {
    /// Markdown file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Markdown file to embed as a frame at the end of the page. Repeatable.
    #[arg(long = "frame", value_name = "FILE")]
    pub frames: Vec<PathBuf>,

    /// Page identity used for per-site and per-page preferences.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Preference file to load and update.
    #[arg(long, value_name = "PATH")]
    pub prefs: Option<PathBuf>,

    /// Append log output to this file.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Render tick in milliseconds.
    #[arg(long = "tick-ms", value_name = "MS", default_value_t = 16)]
    pub tick_ms: u64,
}

/// A Markdown file read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSource {
    pub path: PathBuf,
    pub title: String,
    pub markdown: String,
}

impl DocumentSource {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let markdown = fs::read_to_string(path).map_err(|source| ConfigError::Document {
            path: path.to_path_buf(),
            source,
        })?;
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            path: path.to_path_buf(),
            title,
            markdown,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub document: DocumentSource,
    pub frames: Vec<DocumentSource>,
    pub url: String,
    pub prefs_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub tick: Duration,
}

impl TryFrom<&Cli> for ReaderConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !(1..=1000).contains(&cli.tick_ms) {
            return Err(ConfigError::Tick(cli.tick_ms));
        }
        let document = DocumentSource::read(&cli.file)?;
        let frames = cli
            .frames
            .iter()
            .map(|path| DocumentSource::read(path))
            .collect::<Result<Vec<_>, _>>()?;
        let url = match &cli.url {
            Some(url) => Url::parse(url)
                .map_err(|source| PreferenceError::InvalidUrl {
                    url: url.clone(),
                    source,
                })?
                .to_string(),
            None => file_url(&cli.file)?,
        };
        let prefs_path = match &cli.prefs {
            Some(path) => path.clone(),
            None => default_prefs_path()?,
        };
        Ok(Self {
            document,
            frames,
            url,
            prefs_path,
            log_file: cli.log_file.clone(),
            tick: Duration::from_millis(cli.tick_ms),
        })
    }
}

fn file_url(path: &Path) -> Result<String, ConfigError> {
    let absolute = fs::canonicalize(path).map_err(|source| ConfigError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|()| ConfigError::PageUrl(absolute))
}

pub fn default_prefs_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(PREFS_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_for(file: &Path) -> Cli {
        Cli {
            file: file.to_path_buf(),
            frames: Vec::new(),
            url: None,
            prefs: Some(PathBuf::from("prefs.json")),
            log_file: None,
            tick_ms: 16,
        }
    }

    #[test]
    fn parses_repeated_frames() {
        let cli = Cli::try_parse_from([
            "reading-ruler",
            "main.md",
            "--frame",
            "a.md",
            "--frame",
            "b.md",
            "--tick-ms",
            "20",
        ])
        .unwrap();
        assert_eq!(cli.frames, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
        assert_eq!(cli.tick_ms, 20);
        assert!(cli.url.is_none());
    }

    #[test]
    fn resolves_a_file_url_and_reads_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes\n").unwrap();
        let config = ReaderConfig::try_from(&cli_for(&path)).unwrap();
        assert!(config.url.starts_with("file:///"));
        assert!(config.url.ends_with("/notes.md"));
        assert_eq!(config.document.title, "notes.md");
        assert_eq!(config.document.markdown, "# Notes\n");
        assert_eq!(config.tick, Duration::from_millis(16));
    }

    #[test]
    fn rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "text\n").unwrap();

        let mut cli = cli_for(&path);
        cli.tick_ms = 0;
        assert!(matches!(ReaderConfig::try_from(&cli), Err(ConfigError::Tick(0))));

        let mut cli = cli_for(&path);
        cli.url = Some("not a url".into());
        assert!(matches!(
            ReaderConfig::try_from(&cli),
            Err(ConfigError::Preferences(PreferenceError::InvalidUrl { .. }))
        ));

        let cli = cli_for(&dir.path().join("missing.md"));
        assert!(matches!(
            ReaderConfig::try_from(&cli),
            Err(ConfigError::Document { .. })
        ));
    }
}
