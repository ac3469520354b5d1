//! Session-scoped metrics cache.
//!
//! The cache is an optimization, never a correctness dependency: the backing
//! store is explicitly allowed to fail (quota, corruption, serialization),
//! and every failure degrades silently to "absent on read" / "no-op on
//! write". Records live for the session; there is no eviction.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::canonical::CanonicalKey;
use crate::metrics::ArticleMetrics;

/// Versioned prefix for cache entries, so stale records from an older
/// metrics shape read back as garbage and fall through to a re-fetch.
pub const CACHE_PREFIX: &str = "qsift_article_metrics_v1:";

/// Backend failure. Never escapes [`SessionCache`]; it only exists so
/// backends have something honest to return.
#[derive(Debug, Error)]
#[error("storage backend failure: {0}")]
pub struct StorageError(pub String);

/// A fallible string key/value store scoped to the session.
///
/// Mirrors the shape of web session storage: both operations may fail, and
/// callers must treat failures as best-effort.
pub trait MetricsStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Plain in-memory backend. Infallible in practice; the default for both
/// production (one map per session) and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl MetricsStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key → metrics cache over a fallible backend.
///
/// Writes are idempotent and last-write-wins: a metrics record is a
/// deterministic function of immutable input, so overlapping scans never
/// need conflict resolution.
#[derive(Debug)]
pub struct SessionCache<S: MetricsStore> {
    store: S,
}

impl<S: MetricsStore> SessionCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Looks up the metrics for a key. Backend failures and undecodable
    /// payloads both read as a miss.
    pub fn get(&self, key: &CanonicalKey) -> Option<ArticleMetrics> {
        let raw = match self.store.get(&storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!(%key, %err, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(metrics) => Some(metrics),
            Err(err) => {
                debug!(%key, %err, "cache entry undecodable, treating as miss");
                None
            }
        }
    }

    /// Stores the metrics for a key. Failures are swallowed; the next scan
    /// simply fetches again.
    pub fn set(&mut self, key: &CanonicalKey, metrics: &ArticleMetrics) {
        let payload = match serde_json::to_string(metrics) {
            Ok(payload) => payload,
            Err(err) => {
                debug!(%key, %err, "metrics did not serialize, skipping cache write");
                return;
            }
        };

        if let Err(err) = self.store.set(&storage_key(key), &payload) {
            debug!(%key, %err, "cache write failed, continuing without");
        }
    }
}

fn storage_key(key: &CanonicalKey) -> String {
    format!("{CACHE_PREFIX}{key}")
}
