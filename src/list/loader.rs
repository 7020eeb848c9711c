use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::{FilterError, LoadErrorKind, Result};
use crate::parser::split_lines;

/// Default freshness window for downloaded lists: 1 day
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Trait for loading raw filter lines
pub trait ListLoader: Send + Sync {
    /// Load the lines of a filter list, in their original order
    fn load_lines(&self, source: &str) -> Result<Vec<String>>;
}

/// Whether a source names a remote `http`/`https` list
pub fn is_remote_source(source: &str) -> bool {
    Url::parse(source.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Read a local filter list and split it into lines
pub(crate) fn read_file_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| {
        FilterError::load(
            LoadErrorKind::FileError,
            format!("Failed to read filter list '{}': {}", path.display(), e),
        )
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        FilterError::load(
            LoadErrorKind::InvalidData,
            format!("Filter list '{}' is not valid UTF-8: {}", path.display(), e),
        )
    })?;
    Ok(split_lines(&text))
}

/// Nil loader - every source is empty
#[derive(Debug, Clone, Copy, Default)]
pub struct NilListLoader;

impl ListLoader for NilListLoader {
    fn load_lines(&self, _source: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Local file loader
#[derive(Debug, Clone, Copy, Default)]
pub struct FileListLoader;

impl FileListLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ListLoader for FileListLoader {
    fn load_lines(&self, source: &str) -> Result<Vec<String>> {
        read_file_lines(Path::new(source.trim()))
    }
}

/// In-memory loader keyed by source identifier
#[derive(Debug, Clone, Default)]
pub struct MemoryListLoader {
    lists: HashMap<String, String>,
}

impl MemoryListLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a list under a source identifier
    pub fn with_list(mut self, source: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(source, text);
        self
    }

    /// Add or replace a list
    pub fn insert(&mut self, source: impl Into<String>, text: impl Into<String>) {
        self.lists.insert(source.into(), text.into());
    }
}

impl ListLoader for MemoryListLoader {
    fn load_lines(&self, source: &str) -> Result<Vec<String>> {
        self.lists
            .get(source)
            .map(|text| split_lines(text))
            .ok_or_else(|| {
                FilterError::load(
                    LoadErrorKind::FileError,
                    format!("Unknown filter list source: {}", source),
                )
            })
    }
}
