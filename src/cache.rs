//! Result cache for compiled rule batches.
//!
//! Batches are keyed by an xxHash64 of their raw lines, so the cache never needs
//! to understand filter syntax. A hit hands back the exact rules a cold compile
//! of the same lines would produce.

use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use twox_hash::XxHash64;

use crate::compile::CompiledBatch;

/// Default number of compiled batches kept by [`MemoryResultCache`]
pub const DEFAULT_RESULT_CACHE_SIZE: usize = 16;

/// Content hash of a batch of raw lines
pub fn batch_hash<I, S>(lines: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = XxHash64::with_seed(0);
    let mut count = 0u64;
    for line in lines {
        let line = line.as_ref().as_bytes();
        // Length prefix keeps ["ab", "c"] and ["a", "bc"] apart
        hasher.write_u64(line.len() as u64);
        hasher.write(line);
        count += 1;
    }
    hasher.write_u64(count);
    hasher.finish()
}

/// Trait for caching compiled batches
pub trait ResultCache: Send + Sync {
    /// Look up a compiled batch by content hash
    fn get(&self, key: u64) -> Option<Arc<CompiledBatch>>;

    /// Store a compiled batch
    fn put(&self, key: u64, batch: Arc<CompiledBatch>);

    /// Drop every cached batch
    fn clear(&self);
}

/// Cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NilResultCache;

impl ResultCache for NilResultCache {
    fn get(&self, _key: u64) -> Option<Arc<CompiledBatch>> {
        None
    }

    fn put(&self, _key: u64, _batch: Arc<CompiledBatch>) {}

    fn clear(&self) {}
}

/// In-memory LRU cache of compiled batches
pub struct MemoryResultCache {
    entries: Mutex<LruCache<u64, Arc<CompiledBatch>>>,
}

impl MemoryResultCache {
    /// Create a cache holding up to `capacity` batches
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get the number of cached batches
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for MemoryResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_CACHE_SIZE)
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: u64) -> Option<Arc<CompiledBatch>> {
        self.entries.lock().get(&key).cloned()
    }

    fn put(&self, key: u64, batch: Arc<CompiledBatch>) {
        self.entries.lock().put(key, batch);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}
