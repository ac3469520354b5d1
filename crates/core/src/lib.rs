//! Core engine for hiding low-value articles in an item list.
//!
//! Given a stream of candidate list entries, qsift resolves each link to a
//! canonical article key, fetches the article page once per distinct key
//! under bounded concurrency, extracts structural metrics from its markup,
//! scores it with a set of weighted heuristics, and answers hide/show per
//! configuration. Every failure degrades toward "leave it visible".

pub mod cache;
pub mod canonical;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod metrics;
pub mod pipeline;
pub mod score;

pub use cache::{InMemoryStore, MetricsStore, SessionCache};
pub use canonical::{CanonicalKey, canonicalize};
pub use config::{ConfigProvider, Conditions, FilterConfig, Thresholds};
pub use error::{QsiftError, Result};
pub use extract::extract_metrics;
pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
pub use filter::should_hide;
pub use metrics::ArticleMetrics;
pub use pipeline::{CandidateItem, CandidateSource, Decision, ItemId, ScanPipeline, ScanTrigger};
pub use score::{ai_score, template_score};
