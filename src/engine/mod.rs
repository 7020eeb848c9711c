//! Engine module.
//!
//! Ties the list loader, the result cache and the rule set together and exposes
//! the block/allow queries. The rule set sits behind a read/write lock: one
//! writer adds rules while any number of readers classify URLs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};

use crate::cache::{
    batch_hash, MemoryResultCache, NilResultCache, ResultCache, DEFAULT_RESULT_CACHE_SIZE,
};
use crate::compile::{compile_rules, CompileReport, FilterRule, RuleSet, DEFAULT_CACHE_SIZE};
use crate::error::{FilterError, Result};
use crate::list::{FileListLoader, ListLoader, DEFAULT_UPDATE_INTERVAL};
use crate::types::MatchResult;

/// Engine options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// LRU cache size for URL decisions
    pub cache_size: usize,
    /// Number of compiled batches kept in the result cache; 0 disables it
    pub result_cache_size: usize,
    /// Directory for downloaded filter lists
    pub list_cache_dir: Option<PathBuf>,
    /// Seconds a downloaded list stays fresh
    pub update_interval_secs: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            result_cache_size: DEFAULT_RESULT_CACHE_SIZE,
            list_cache_dir: None,
            update_interval_secs: DEFAULT_UPDATE_INTERVAL.as_secs(),
        }
    }
}

impl EngineOptions {
    /// Create new engine options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FilterError::ConfigError(format!("Invalid engine options: {}", e)))
    }

    /// Set decision cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set result cache size; 0 disables the result cache.
    pub fn with_result_cache(mut self, size: usize) -> Self {
        self.result_cache_size = size;
        self
    }

    /// Set the download cache directory.
    pub fn with_list_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.list_cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set how long downloaded lists stay fresh.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval_secs = interval.as_secs();
        self
    }

    /// Update interval as a Duration
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    #[cfg(feature = "download")]
    fn default_loader(&self) -> Box<dyn ListLoader> {
        let mut loader =
            crate::list::AutoListLoader::new().with_update_interval(self.update_interval());
        if let Some(ref dir) = self.list_cache_dir {
            loader = loader.with_cache_dir(dir);
        }
        Box::new(loader)
    }

    #[cfg(not(feature = "download"))]
    fn default_loader(&self) -> Box<dyn ListLoader> {
        Box::new(FileListLoader::new())
    }
}

/// Adblock filter engine.
///
/// Classifies URLs against Adblock Plus filter lists. Exception (`@@`) rules
/// always take precedence over blocking rules.
pub struct AdblockEngine {
    rule_set: RwLock<RuleSet>,
    loader: Box<dyn ListLoader>,
    result_cache: Arc<dyn ResultCache>,
}

impl Default for AdblockEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl AdblockEngine {
    /// Create an empty engine.
    pub fn new(options: EngineOptions) -> Self {
        let result_cache: Arc<dyn ResultCache> = if options.result_cache_size > 0 {
            Arc::new(MemoryResultCache::new(options.result_cache_size))
        } else {
            Arc::new(NilResultCache)
        };

        Self {
            rule_set: RwLock::new(RuleSet::new(options.cache_size)),
            loader: options.default_loader(),
            result_cache,
        }
    }

    /// Create an engine from filter lines.
    pub fn from_rules<I, S>(lines: I, options: EngineOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let engine = Self::new(options);
        let lines: Vec<S> = lines.into_iter().collect();
        engine.add_rules(&lines);
        engine
    }

    /// Create an engine from a local filter list file.
    pub fn from_file(path: impl AsRef<Path>, options: EngineOptions) -> Result<Self> {
        let path = path.as_ref();
        let lines = FileListLoader::new().load_lines(&path.to_string_lossy())?;
        Ok(Self::from_rules(lines, options))
    }

    /// Replace the list loader.
    pub fn with_loader(mut self, loader: impl ListLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Replace the result cache (e.g. to share one between engines).
    pub fn with_result_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.result_cache = cache;
        self
    }

    /// Compile and add a batch of filter lines.
    ///
    /// Invalid lines are dropped and listed in the returned report.
    pub fn add_rules<S: AsRef<str>>(&self, lines: &[S]) -> CompileReport {
        let key = batch_hash(lines);
        let batch = match self.result_cache.get(key) {
            Some(batch) => {
                tracing::debug!(key = %format!("{:016x}", key), "result cache hit");
                batch
            }
            None => {
                let batch = Arc::new(compile_rules(lines));
                self.result_cache.put(key, batch.clone());
                batch
            }
        };

        // Compile outside the lock; only the append + re-sort is exclusive
        let mut rule_set = self.rule_set.write();
        rule_set.extend(batch.rules.iter().cloned());
        batch.report()
    }

    /// Load each source through the list loader and add its lines.
    ///
    /// A source that fails to load is logged and contributes no rules.
    /// Returns the number of rules added.
    pub fn load_rules<S: AsRef<str>>(&self, sources: &[S]) -> usize {
        let mut added = 0;
        for source in sources {
            let source = source.as_ref();
            match self.loader.load_lines(source) {
                Ok(lines) => {
                    let report = self.add_rules(&lines);
                    tracing::info!(
                        source = %source,
                        compiled = report.compiled,
                        skipped = report.skipped.len(),
                        "filter list loaded"
                    );
                    added += report.compiled;
                }
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "failed to load filter list");
                }
            }
        }
        added
    }

    /// Check if the URL should be blocked.
    pub fn should_block(&self, url: &str) -> Result<bool> {
        self.rule_set.read().should_block(url)
    }

    /// Check if the URL should not be blocked.
    pub fn should_not_block(&self, url: &str) -> Result<bool> {
        self.rule_set.read().should_not_block(url)
    }

    /// Find the rule that decides this URL, if any.
    pub fn match_url(&self, url: &str) -> Result<Option<MatchResult>> {
        self.rule_set.read().match_url(url)
    }

    /// Rules in evaluation order.
    ///
    /// Holds a read lock: drop the guard before calling `add_rules`.
    pub fn rules(&self) -> MappedRwLockReadGuard<'_, [FilterRule]> {
        RwLockReadGuard::map(self.rule_set.read(), |set| set.rules())
    }

    /// Get the number of rules
    pub fn rule_count(&self) -> usize {
        self.rule_set.read().len()
    }

    /// Clear the decision cache and the result cache
    pub fn clear_cache(&self) {
        self.rule_set.read().clear_cache();
        self.result_cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::MemoryListLoader;

    #[test]
    fn test_options_defaults() {
        let options = EngineOptions::new();
        assert_eq!(options.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(options.result_cache_size, DEFAULT_RESULT_CACHE_SIZE);
        assert_eq!(options.update_interval(), DEFAULT_UPDATE_INTERVAL);
        assert!(options.list_cache_dir.is_none());
    }

    #[test]
    fn test_options_from_json() {
        let options = EngineOptions::from_json(
            r#"{"cache_size": 64, "list_cache_dir": "/var/cache/adblock", "update_interval_secs": 3600}"#,
        )
        .unwrap();
        assert_eq!(options.cache_size, 64);
        assert_eq!(options.result_cache_size, DEFAULT_RESULT_CACHE_SIZE);
        assert_eq!(options.list_cache_dir, Some(PathBuf::from("/var/cache/adblock")));
        assert_eq!(options.update_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_options_from_json_rejects_unknown_fields() {
        let err = EngineOptions::from_json(r#"{"cache_sise": 64}"#).unwrap_err();
        assert!(matches!(err, FilterError::ConfigError(_)));
    }

    #[test]
    fn test_options_builder() {
        let options = EngineOptions::new()
            .with_cache_size(8)
            .with_result_cache(0)
            .with_list_cache_dir("/tmp/lists")
            .with_update_interval(Duration::from_secs(60));
        assert_eq!(options.cache_size, 8);
        assert_eq!(options.result_cache_size, 0);
        assert_eq!(options.list_cache_dir, Some(PathBuf::from("/tmp/lists")));
        assert_eq!(options.update_interval_secs, 60);
    }

    #[test]
    fn test_add_rules_and_query() {
        let engine = AdblockEngine::default();
        let report = engine.add_rules(&["||ads.example.com^", "@@||ads.example.com/safe.js|"]);
        assert_eq!(report.compiled, 2);
        assert!(report.skipped.is_empty());

        assert!(engine.should_block("http://ads.example.com/banner.js").unwrap());
        assert!(engine.should_not_block("http://ads.example.com/safe.js").unwrap());
        assert_eq!(engine.rule_count(), 2);
        assert!(engine.rules()[0].is_exception());
    }

    #[test]
    fn test_result_cache_hit_gives_same_rules() {
        let cache: Arc<dyn ResultCache> = Arc::new(MemoryResultCache::new(4));
        let lines = ["||ads.example.com^", "@@/safe.js", "/ads[/"];

        let cold = AdblockEngine::default().with_result_cache(cache.clone());
        let cold_report = cold.add_rules(&lines);

        let warm = AdblockEngine::default().with_result_cache(cache.clone());
        let warm_report = warm.add_rules(&lines);

        assert_eq!(cold_report, warm_report);
        let cold_rules: Vec<String> = cold.rules().iter().map(|r| r.source_text().to_string()).collect();
        let warm_rules: Vec<String> = warm.rules().iter().map(|r| r.source_text().to_string()).collect();
        assert_eq!(cold_rules, warm_rules);

        for url in ["http://ads.example.com/x", "http://ads.example.com/safe.js", "http://a.com/"] {
            assert_eq!(cold.should_block(url).unwrap(), warm.should_block(url).unwrap());
        }
    }

    #[test]
    fn test_disabled_result_cache() {
        let engine = AdblockEngine::new(EngineOptions::new().with_result_cache(0));
        let lines = ["||ads.example.com^", "@@||ads.example.com/safe.js|"];

        assert_eq!(engine.add_rules(&lines).compiled, 2);
        assert_eq!(engine.add_rules(&lines).compiled, 2);
        assert_eq!(engine.rule_count(), 4);
        assert!(engine.should_block("http://ads.example.com/x").unwrap());
        assert!(!engine.should_block("http://ads.example.com/safe.js").unwrap());
    }

    #[test]
    fn test_load_rules_skips_failed_sources() {
        let loader = MemoryListLoader::new()
            .with_list("ads", "||ads.example.com^\n! comment")
            .with_list("allow", "@@||ads.example.com/safe.js|");
        let engine = AdblockEngine::default().with_loader(loader);

        let added = engine.load_rules(&["ads", "missing", "allow"]);
        assert_eq!(added, 3);
        assert!(engine.should_block("http://ads.example.com/x").unwrap());
        assert!(!engine.should_block("http://ads.example.com/safe.js").unwrap());
    }

    #[test]
    fn test_clear_cache() {
        let engine = AdblockEngine::from_rules(["ads"], EngineOptions::new());
        assert!(engine.should_block("http://a.com/ads").unwrap());
        engine.clear_cache();
        assert!(engine.should_block("http://a.com/ads").unwrap());
    }
}
