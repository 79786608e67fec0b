//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Example questions shown by the chat UI before the first message.
pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "What are the latest DepEd policies?",
    "Tell me about enrollment procedures",
    "What are the graduation requirements?",
    "How do I apply for teacher positions?",
    "What are the school calendar guidelines?",
    "Show me information about student assessment",
    "What are the curriculum standards?",
    "Tell me about special education programs",
];

/// Paths to the assistant's data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite document store directory (`data/db/`).
    pub db_dir: PathBuf,
    /// Optional suggestion list override (`data/suggestions.json`).
    pub suggestions_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db_dir: root.join("db"),
            suggestions_file: root.join("suggestions.json"),
            root,
        };
        std::fs::create_dir_all(&paths.db_dir)?;
        Ok(paths)
    }
}

/// Tunables for query handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Maximum number of ranked results returned by the scorer.
    pub max_results: usize,
    /// Excerpt length limit in characters, before the ellipsis.
    pub excerpt_max_chars: usize,
    /// Raw queries shorter than this are rejected as invalid.
    pub min_query_chars: usize,
    /// Query tokens shorter than this are dropped as noise.
    pub min_token_chars: usize,
    /// Upper bound on body characters considered per document when scoring.
    pub max_body_chars: Option<usize>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            excerpt_max_chars: 200,
            min_query_chars: 3,
            min_token_chars: 3,
            max_body_chars: None,
        }
    }
}

impl SearchSettings {
    /// Defaults overridden by `DEPED_MAX_RESULTS`, `DEPED_EXCERPT_MAX_CHARS`
    /// and `DEPED_MAX_BODY_CHARS`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables read from `lookup`.
    /// A value that is set but not a number is a [`Error::Config`].
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(n) = parse_var::<usize>(&lookup, "DEPED_MAX_RESULTS")? {
            settings.max_results = n.max(1);
        }
        if let Some(n) = parse_var::<usize>(&lookup, "DEPED_EXCERPT_MAX_CHARS")? {
            settings.excerpt_max_chars = n.max(1);
        }
        if let Some(n) = parse_var::<usize>(&lookup, "DEPED_MAX_BODY_CHARS")? {
            settings.max_body_chars = Some(n);
        }
        Ok(settings)
    }
}

/// Top-level assistant configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Query handling tunables.
    pub search: SearchSettings,
    /// Static example questions exposed to the UI.
    pub suggestions: Vec<String>,
}

impl AssistantConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_vars(data_dir, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with variables read from `lookup`.
    pub fn from_vars(
        data_dir: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let port = parse_var::<u16>(&lookup, "PORT")?.unwrap_or(5000);
        let search = SearchSettings::from_vars(&lookup)?;

        let data_paths = DataPaths::new(data_dir)?;
        let suggestions = load_suggestions(&data_paths.suggestions_file);

        Ok(Self {
            port,
            data_paths,
            search,
            suggestions,
        })
    }
}

/// Load the suggestion list from a JSON array of strings, falling back to
/// [`DEFAULT_SUGGESTIONS`] when the file is missing or malformed.
pub fn load_suggestions(path: &Path) -> Vec<String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return default_suggestions(),
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(list) if !list.is_empty() => {
            info!("Loaded {} suggestions from {}", list.len(), path.display());
            list
        }
        Ok(_) => default_suggestions(),
        Err(e) => {
            warn!("Ignoring malformed suggestions file {}: {}", path.display(), e);
            default_suggestions()
        }
    }
}

pub fn default_suggestions() -> Vec<String> {
    DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

fn parse_var<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw))),
    }
}
