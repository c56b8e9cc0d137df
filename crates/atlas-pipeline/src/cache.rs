//! Memoization of loaded sources, keyed by path and checked by fingerprint.

use crate::records::{CaseRecord, CountryPolygon};
use crate::source::{CaseSource, PolygonSource, SourceFingerprint};
use atlas_common::Result;
use moka::sync::Cache;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the source cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of sources held per kind
    pub max_capacity: u64,
    /// Entries unused for this long are dropped
    pub time_to_idle: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 16,
            time_to_idle: None,
        }
    }
}

/// Cache performance metrics
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Lookups served from memory
    pub hits: AtomicU64,
    /// Lookups that loaded the source
    pub misses: AtomicU64,
    /// Misses caused by a changed fingerprint
    pub stale_reloads: AtomicU64,
    /// Entries dropped on request
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stale(&self) {
        self.stale_reloads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_invalidations(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    /// Fraction of lookups served from memory.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }

    /// Snapshot of every counter.
    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert("hits".to_string(), self.hits.load(Ordering::Relaxed));
        stats.insert("misses".to_string(), self.misses.load(Ordering::Relaxed));
        stats.insert("stale_reloads".to_string(), self.stale_reloads.load(Ordering::Relaxed));
        stats.insert("invalidations".to_string(), self.invalidations.load(Ordering::Relaxed));
        stats
    }
}

#[derive(Debug)]
struct CacheEntry<T> {
    fingerprint: SourceFingerprint,
    records: Arc<Vec<T>>,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            fingerprint: self.fingerprint.clone(),
            records: Arc::clone(&self.records),
        }
    }
}

/// Loaded case tables and polygon sets, reused while their sources are
/// unchanged.
pub struct SourceCache {
    cases: Cache<PathBuf, CacheEntry<CaseRecord>>,
    polygons: Cache<PathBuf, CacheEntry<CountryPolygon>>,
    metrics: Arc<CacheMetrics>,
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl SourceCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cases: build_cache(&config),
            polygons: build_cache(&config),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Case records for `source`, loading them when absent or stale.
    #[instrument(skip(self, source), fields(path = %source.location().display()))]
    pub fn cases(&self, source: &dyn CaseSource) -> Result<Arc<Vec<CaseRecord>>> {
        self.get_or_load(&self.cases, source.location(), source.fingerprint()?, || source.load())
    }

    /// Polygons for `source`, loading them when absent or stale.
    #[instrument(skip(self, source), fields(path = %source.location().display()))]
    pub fn polygons(&self, source: &dyn PolygonSource) -> Result<Arc<Vec<CountryPolygon>>> {
        self.get_or_load(&self.polygons, source.location(), source.fingerprint()?, || source.load())
    }

    fn get_or_load<T, F>(
        &self,
        cache: &Cache<PathBuf, CacheEntry<T>>,
        path: &Path,
        fingerprint: SourceFingerprint,
        load: F,
    ) -> Result<Arc<Vec<T>>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<Vec<T>>,
    {
        let key = path.to_path_buf();
        if let Some(entry) = cache.get(&key) {
            if entry.fingerprint == fingerprint {
                debug!("Cache hit");
                self.metrics.record_hit();
                return Ok(entry.records);
            }
            debug!("Cached entry is stale, reloading");
            self.metrics.record_stale();
        }

        self.metrics.record_miss();
        let records = Arc::new(load()?);
        cache.insert(
            key,
            CacheEntry {
                fingerprint,
                records: Arc::clone(&records),
            },
        );
        Ok(records)
    }

    /// Drops every entry loaded from `path`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn invalidate(&self, path: &Path) {
        let key = path.to_path_buf();
        let count = u64::from(self.cases.remove(&key).is_some())
            + u64::from(self.polygons.remove(&key).is_some());
        self.metrics.record_invalidations(count);
        info!(count, "Invalidated cached source");
    }

    /// Drops every entry.
    #[instrument(skip(self))]
    pub fn invalidate_all(&self) {
        self.cases.run_pending_tasks();
        self.polygons.run_pending_tasks();
        let count = self.cases.entry_count() + self.polygons.entry_count();
        self.cases.invalidate_all();
        self.polygons.invalidate_all();
        self.metrics.record_invalidations(count);
        info!(count, "Invalidated all cached sources");
    }

    /// Get cache metrics
    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Get cache statistics
    pub fn stats(&self) -> HashMap<String, u64> {
        let mut stats = self.metrics.get_stats();
        stats.insert(
            "entry_count".to_string(),
            self.cases.entry_count() + self.polygons.entry_count(),
        );
        stats
    }
}

fn build_cache<T: Send + Sync + 'static>(config: &CacheConfig) -> Cache<PathBuf, CacheEntry<T>> {
    let builder = Cache::builder().max_capacity(config.max_capacity);
    match config.time_to_idle {
        Some(idle) => builder.time_to_idle(idle).build(),
        None => builder.build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_source::CsvCaseSource;
    use crate::source::{InMemoryCaseSource, InMemoryPolygonSource};
    use atlas_common::test_utils::{source_fixtures, write_temp_file};
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::io::Write;

    struct CountingSource {
        inner: InMemoryCaseSource,
        loads: Cell<u32>,
    }

    impl CaseSource for CountingSource {
        fn location(&self) -> &Path {
            self.inner.location()
        }

        fn fingerprint(&self) -> Result<SourceFingerprint> {
            self.inner.fingerprint()
        }

        fn load(&self) -> Result<Vec<CaseRecord>> {
            self.loads.set(self.loads.get() + 1);
            self.inner.load()
        }
    }

    fn counting_source() -> CountingSource {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        CountingSource {
            inner: InMemoryCaseSource::new(
                "memory:cases",
                vec![CaseRecord::new("USA", "United States", date, 100.0, 1.0)],
            ),
            loads: Cell::new(0),
        }
    }

    #[test]
    fn test_second_lookup_is_a_hit() {
        let cache = SourceCache::default();
        let source = counting_source();

        let first = cache.cases(&source).unwrap();
        let second = cache.cases(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads.get(), 1);
        let metrics = cache.metrics();
        assert_eq!(metrics.hits.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.misses.load(Ordering::Relaxed), 1);
        assert!((metrics.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let cache = SourceCache::default();
        let source = counting_source();

        cache.cases(&source).unwrap();
        cache.invalidate(source.location());
        cache.cases(&source).unwrap();

        assert_eq!(source.loads.get(), 2);
        assert_eq!(cache.metrics().invalidations.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_invalidate_all_covers_both_kinds() {
        let cache = SourceCache::default();
        let cases = counting_source();
        let polygons = InMemoryPolygonSource::new("memory:polygons", Vec::new());

        cache.cases(&cases).unwrap();
        cache.polygons(&polygons).unwrap();
        cache.invalidate_all();
        cache.cases(&cases).unwrap();

        assert_eq!(cases.loads.get(), 2);
        assert_eq!(cache.metrics().invalidations.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_changed_file_is_reloaded() {
        let mut file = write_temp_file(source_fixtures::cases_csv().as_bytes(), ".csv");
        let source = CsvCaseSource::new(file.path());
        let cache = SourceCache::default();

        assert_eq!(cache.cases(&source).unwrap().len(), 7);

        file.write_all(b"BRA,South America,Brazil,2024-01-01,10,,0\n").unwrap();
        file.flush().unwrap();

        assert_eq!(cache.cases(&source).unwrap().len(), 8);
        assert_eq!(cache.metrics().stale_reloads.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_load_errors_are_not_cached() {
        let cache = SourceCache::default();
        let source = CsvCaseSource::new("/nonexistent/cases.csv");
        assert!(cache.cases(&source).is_err());
        assert_eq!(cache.metrics().misses.load(Ordering::Relaxed), 0);
    }
}
