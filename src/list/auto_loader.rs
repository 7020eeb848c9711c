use std::fs;
use std::hash::Hasher;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use twox_hash::XxHash64;

use crate::error::{FilterError, LoadErrorKind, Result};
use crate::parser::split_lines;

use super::loader::{is_remote_source, read_file_lines, ListLoader, DEFAULT_UPDATE_INTERVAL};

/// Default HTTP timeout for list downloads
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest URL basename kept in a cache file name
const MAX_BASENAME_LEN: usize = 64;

/// Loader for local paths and remote `http`/`https` lists.
///
/// Remote lists are downloaded with `ureq`. When a cache directory is set, each
/// list is stored there and reused until it is older than `update_interval`.
/// If a refresh fails and a stale copy exists, the stale copy is used.
pub struct AutoListLoader {
    pub cache_dir: Option<PathBuf>,
    pub update_interval: Duration,
    pub timeout: Duration,
    download_lock: Mutex<()>,
}

impl Default for AutoListLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoListLoader {
    /// Create a new AutoListLoader without an on-disk cache
    pub fn new() -> Self {
        Self {
            cache_dir: None,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            download_lock: Mutex::new(()),
        }
    }

    /// Set the directory downloaded lists are cached in
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set how long a cached download stays fresh.
    /// Default is 1 day (DEFAULT_UPDATE_INTERVAL)
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Set the HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cache file for a URL: `<dir>/<basename><xxhash64 of url>`
    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;

        let basename: String = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .chars()
            .take(MAX_BASENAME_LEN)
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let mut hasher = XxHash64::with_seed(0);
        hasher.write(url.as_bytes());

        Some(dir.join(format!("{}{:016x}", basename, hasher.finish())))
    }

    /// Temporary download target next to the cache file.
    /// Built from the full file name so the URL hash is kept.
    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Check if file needs download
    fn should_download(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) => {
                if meta.len() == 0 {
                    return true;
                }
                match meta.modified() {
                    Ok(mtime) => SystemTime::now()
                        .duration_since(mtime)
                        .map(|d| d > self.update_interval)
                        .unwrap_or(true),
                    Err(_) => true,
                }
            }
            Err(_) => true,
        }
    }

    fn agent(&self) -> ureq::Agent {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build();
        ureq::Agent::new_with_config(config)
    }

    fn open(&self, url: &str) -> Result<ureq::Body> {
        let response = self.agent().get(url).call().map_err(|e| {
            FilterError::load(
                LoadErrorKind::DownloadFailed,
                format!("Download of {} failed: {}", url, e),
            )
        })?;
        let (_, body) = response.into_parts();
        Ok(body)
    }

    /// Fetch a list straight into memory
    fn fetch(&self, url: &str) -> Result<String> {
        let body = self.open(url)?;
        let mut text = String::new();
        body.into_reader().read_to_string(&mut text).map_err(|e| {
            FilterError::load(
                LoadErrorKind::InvalidData,
                format!("Failed to read {}: {}", url, e),
            )
        })?;
        Ok(text)
    }

    /// Download a list into the cache file
    fn download(&self, path: &Path, url: &str) -> Result<()> {
        let _lock = self.download_lock.lock();

        // Double-check after acquiring lock
        if !self.should_download(path) {
            return Ok(());
        }

        tracing::info!(url = %url, path = %path.display(), "downloading filter list");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = Self::tmp_path(path);

        let body = self.open(url)?;
        let mut file = fs::File::create(&tmp_path)?;
        let mut reader = body.into_reader();
        std::io::copy(&mut reader, &mut file)?;
        file.flush()?;
        drop(file);

        if let Err(e) = verify_list_file(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, path)?;

        tracing::info!(url = %url, path = %path.display(), "filter list downloaded");
        Ok(())
    }

    fn load_remote(&self, url: &str) -> Result<Vec<String>> {
        let Some(path) = self.cache_path(url) else {
            return self.fetch(url).map(|text| split_lines(&text));
        };

        if self.should_download(&path) {
            if let Err(e) = self.download(&path, url) {
                if !path.exists() {
                    return Err(e);
                }
                tracing::warn!(url = %url, error = %e, "download failed, using cached copy");
            }
        } else {
            tracing::debug!(url = %url, path = %path.display(), "using cached filter list");
        }

        read_file_lines(&path)
    }
}

/// A downloaded list must be non-empty UTF-8 text
fn verify_list_file(path: &Path) -> Result<()> {
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(FilterError::load(
            LoadErrorKind::InvalidData,
            "downloaded filter list is empty",
        ));
    }
    std::str::from_utf8(&bytes).map_err(|e| {
        FilterError::load(
            LoadErrorKind::InvalidData,
            format!("downloaded filter list is not valid UTF-8: {}", e),
        )
    })?;
    Ok(())
}

impl ListLoader for AutoListLoader {
    fn load_lines(&self, source: &str) -> Result<Vec<String>> {
        let source = source.trim();
        if is_remote_source(source) {
            self.load_remote(source)
        } else {
            read_file_lines(Path::new(source))
        }
    }
}
