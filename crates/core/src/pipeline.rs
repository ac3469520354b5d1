//! The scan pipeline: scheduling, deduplication, and decision delivery.
//!
//! One [`ScanPipeline`] is constructed per session and owns every piece of
//! mutable pipeline state: the session cache, the in-flight fetch map, the
//! processed-item table, and the concurrency gate. There are no module-level
//! singletons.
//!
//! The flow per candidate item: resolve its link to a canonical key (fail →
//! skip); on a cache hit decide immediately; on a matching in-flight fetch
//! attach as a waiter; otherwise spawn a fetch under the concurrency ceiling
//! and register it in-flight. When a fetch settles, the metrics are cached
//! and a decision goes out to every waiter sharing that key. Failures are
//! swallowed: the in-flight entry is cleared, nothing is cached, the items
//! stay visible, and a later scan may retry.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};
use tracing::debug;

use crate::QsiftError;
use crate::cache::{MetricsStore, SessionCache};
use crate::canonical::{CanonicalKey, canonicalize};
use crate::config::FilterConfig;
use crate::extract::extract_metrics;
use crate::fetch::Fetcher;
use crate::filter::should_hide;
use crate::metrics::ArticleMetrics;
use url::Url;

/// Maximum simultaneous fetches.
pub const MAX_CONCURRENT_FETCHES: usize = 3;

/// Host-assigned stable identity of a list entry.
///
/// The processed table keys on this, never on a host object, so marking an
/// item processed cannot extend its lifetime. A discarded-then-reintroduced
/// entry carries a fresh id and is simply processed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A list entry as seen during one scan pass: its stable id and the raw
/// link target it renders.
#[derive(Debug, Clone)]
pub struct CandidateItem {
    pub id: ItemId,
    pub href: String,
}

/// Hide/show verdict for one item, with the metrics it was based on for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct Decision {
    pub item: ItemId,
    pub hide: bool,
    pub metrics: ArticleMetrics,
}

/// External events that drive a scan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    /// Initial activation on the list page.
    Activated,
    /// The candidate set may have changed (new entries rendered).
    ItemsChanged,
}

/// Synchronous snapshot of the current candidate items.
///
/// The pipeline never observes the host page itself; on every trigger it
/// pulls a fresh listing through this seam.
pub trait CandidateSource: Send {
    fn snapshot(&self) -> Vec<CandidateItem>;
}

impl<F> CandidateSource for F
where
    F: Fn() -> Vec<CandidateItem> + Send,
{
    fn snapshot(&self) -> Vec<CandidateItem> {
        self()
    }
}

struct Settlement {
    key: CanonicalKey,
    outcome: Result<ArticleMetrics, QsiftError>,
}

/// Per-session pipeline state and driver.
///
/// Construct with [`ScanPipeline::new`], then hand it to [`ScanPipeline::run`]
/// together with a candidate source and a trigger channel. Decisions arrive
/// on the receiver returned from `new`; the pipeline exits once the trigger
/// channel closes and no fetch is outstanding.
pub struct ScanPipeline<F, S>
where
    F: Fetcher + 'static,
    S: MetricsStore,
{
    fetcher: Arc<F>,
    cache: SessionCache<S>,
    config_rx: watch::Receiver<FilterConfig>,
    config: FilterConfig,
    base_url: Url,
    fetch_timeout: Duration,
    gate: Arc<Semaphore>,
    inflight: HashMap<CanonicalKey, Vec<ItemId>>,
    processed: HashSet<ItemId>,
    settled_tx: mpsc::UnboundedSender<Settlement>,
    settled_rx: mpsc::UnboundedReceiver<Settlement>,
    decisions: mpsc::UnboundedSender<Decision>,
}

impl<F, S> ScanPipeline<F, S>
where
    F: Fetcher + 'static,
    S: MetricsStore,
{
    /// Builds a pipeline and the channel its decisions arrive on.
    pub fn new(
        fetcher: Arc<F>,
        store: S,
        config_rx: watch::Receiver<FilterConfig>,
        base_url: Url,
        fetch_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Decision>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (decisions_tx, decisions_rx) = mpsc::unbounded_channel();
        let config = *config_rx.borrow();

        let pipeline = Self {
            fetcher,
            cache: SessionCache::new(store),
            config_rx,
            config,
            base_url,
            fetch_timeout,
            gate: Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES)),
            inflight: HashMap::new(),
            processed: HashSet::new(),
            settled_tx,
            settled_rx,
            decisions: decisions_tx,
        };

        (pipeline, decisions_rx)
    }

    /// Drives the pipeline until the trigger channel closes and every
    /// outstanding fetch has settled.
    ///
    /// Triggers cause a non-forced scan of a fresh snapshot; configuration
    /// changes cause a forced rescan so threshold changes re-evaluate items
    /// that were already processed.
    pub async fn run<C: CandidateSource>(
        mut self,
        source: C,
        mut triggers: mpsc::UnboundedReceiver<ScanTrigger>,
    ) {
        let mut triggers_open = true;
        let mut config_open = true;

        loop {
            tokio::select! {
                maybe_trigger = triggers.recv(), if triggers_open => {
                    match maybe_trigger {
                        Some(trigger) => {
                            debug!(?trigger, "scan triggered");
                            self.scan(source.snapshot(), false);
                        }
                        None => triggers_open = false,
                    }
                }
                changed = self.config_rx.changed(), if config_open => {
                    match changed {
                        Ok(()) => {
                            self.config = *self.config_rx.borrow_and_update();
                            debug!("configuration changed, forcing rescan");
                            self.scan(source.snapshot(), true);
                        }
                        Err(_) => config_open = false,
                    }
                }
                Some(settlement) = self.settled_rx.recv(), if !self.inflight.is_empty() => {
                    self.settle(settlement);
                }
                else => break,
            }

            if !triggers_open && self.inflight.is_empty() {
                break;
            }
        }
    }

    /// One scan pass over a candidate snapshot.
    ///
    /// Items already processed this session are skipped unless `force` is
    /// set. Every item touched here is marked processed, whether or not it
    /// resolved.
    fn scan(&mut self, items: Vec<CandidateItem>, force: bool) {
        for item in items {
            if !force && self.processed.contains(&item.id) {
                continue;
            }
            self.processed.insert(item.id);

            // Unresolvable link: skip. Never hide, never fetch.
            let Some(key) = canonicalize(&item.href, &self.base_url) else {
                debug!(item = %item.id, href = %item.href, "link does not resolve to an item page");
                continue;
            };

            if let Some(metrics) = self.cache.get(&key) {
                debug!(item = %item.id, %key, "cache hit");
                self.emit(item.id, &metrics);
                continue;
            }

            if let Some(waiters) = self.inflight.get_mut(&key) {
                debug!(item = %item.id, %key, "attaching to in-flight fetch");
                waiters.push(item.id);
                continue;
            }

            self.inflight.insert(key.clone(), vec![item.id]);
            self.spawn_fetch(key);
        }
    }

    /// Starts one fetch task under the concurrency gate.
    ///
    /// Admission is FIFO (the semaphore hands out permits in ask order) and
    /// the deadline races the fetch; on expiry the fetch future is dropped,
    /// cancelling the request.
    fn spawn_fetch(&self, key: CanonicalKey) {
        let fetcher = Arc::clone(&self.fetcher);
        let gate = Arc::clone(&self.gate);
        let timeout = self.fetch_timeout;
        let settled_tx = self.settled_tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = gate.acquire_owned().await else {
                return;
            };
            debug!(%key, "fetch started");

            let outcome = match tokio::time::timeout(timeout, fetcher.fetch(key.as_str())).await {
                Ok(Ok(html)) => Ok(extract_metrics(&html)),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(QsiftError::Timeout { timeout_ms: timeout.as_millis() as u64 }),
            };

            // The pipeline owning the receiver may be gone; nothing to do then.
            let _ = settled_tx.send(Settlement { key, outcome });
        });
    }

    /// Applies one settled fetch to everything waiting on its key.
    ///
    /// Removing the in-flight entry is what makes a later scan eligible to
    /// retry after a failure.
    fn settle(&mut self, settlement: Settlement) {
        let waiters = self.inflight.remove(&settlement.key).unwrap_or_default();

        match settlement.outcome {
            Ok(metrics) => {
                self.cache.set(&settlement.key, &metrics);
                debug!(key = %settlement.key, waiters = waiters.len(), "fetch settled");
                for item in waiters {
                    self.emit(item, &metrics);
                }
            }
            Err(err) => {
                // Fail open: no cache write, no decision, items stay visible.
                debug!(key = %settlement.key, %err, "fetch failed, leaving items visible");
            }
        }
    }

    fn emit(&self, item: ItemId, metrics: &ArticleMetrics) {
        let hide = should_hide(metrics, &self.config);
        let _ = self.decisions.send(Decision { item, hide, metrics: metrics.clone() });
    }
}
