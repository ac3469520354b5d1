//! Filter configuration: condition toggles, thresholds, and delivery.
//!
//! Configuration is owned by the host (an options surface outside this
//! crate); the core only consumes it. [`FilterConfig`] deserializes from the
//! host's versioned settings blob, filling missing fields from defaults and
//! ignoring unknown ones, and every threshold is clamped into its legal
//! range rather than rejected.
//!
//! Delivery to the pipeline uses a `tokio::sync::watch` channel wrapped by
//! [`ConfigProvider`]: the host pushes updates, the pipeline observes the
//! latest value and treats every change as a forced rescan.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Versioned key under which the host persists the settings blob.
pub const SETTINGS_STORAGE_KEY: &str = "qsift_article_filter_settings_v1";

/// Which hide conditions are active.
///
/// Each flag gates one independent condition in
/// [`should_hide`](crate::filter::should_hide); conditions are OR-ed, so
/// enabling more flags only ever hides more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Conditions {
    /// Hide articles whose aggregate AI-likelihood score crosses the fixed
    /// threshold. The only condition enabled by default.
    pub hide_ai_generated: bool,
    /// Hide articles without a single image in the content body.
    pub hide_no_image: bool,
    /// Hide articles with a short title (`title_max_len`).
    pub hide_short_title: bool,
    /// Hide articles with a short body (`body_max_len`).
    pub hide_short_body: bool,
    /// Hide articles that are code with no prose paragraphs at all.
    pub hide_code_only: bool,
    /// Hide articles with many code blocks (`code_block_min`).
    pub hide_many_code_blocks: bool,
    /// Hide articles with few sentences (`min_sentence_count`).
    pub hide_few_sentences: bool,
    /// Hide articles that are mostly bullet lists (`bullet_min`).
    pub hide_many_bullets: bool,
    /// Hide articles that are mostly headings (`heading_min`).
    pub hide_many_headings: bool,
    /// Hide articles stuffed with stock template phrases.
    pub hide_template_phrases: bool,
    /// Hide articles with too many emoji (`emoji_max`).
    pub hide_excessive_emojis: bool,
    /// Hide long articles whose information density is low.
    pub hide_low_info_density: bool,
}

impl Default for Conditions {
    fn default() -> Self {
        Self {
            hide_ai_generated: true,
            hide_no_image: false,
            hide_short_title: false,
            hide_short_body: false,
            hide_code_only: false,
            hide_many_code_blocks: false,
            hide_few_sentences: false,
            hide_many_bullets: false,
            hide_many_headings: false,
            hide_template_phrases: false,
            hide_excessive_emojis: false,
            hide_low_info_density: false,
        }
    }
}

/// Numeric thresholds for the size/count conditions.
///
/// Each field has a fixed legal range (see [`Thresholds::clamped`]);
/// out-of-range input is clamped, never rejected, so a hand-edited settings
/// blob can't disable filtering by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thresholds {
    /// Hide when `title_len <= title_max_len`. Range 1..=200.
    pub title_max_len: u32,
    /// Hide when `body_text_len <= body_max_len`. Range 1..=2000.
    pub body_max_len: u32,
    /// Hide when `sentence_count <= min_sentence_count`. Range 1..=50.
    pub min_sentence_count: u32,
    /// Hide when `code_block_count >= code_block_min`. Range 1..=50.
    pub code_block_min: u32,
    /// Hide when `bullet_count >= bullet_min`. Range 1..=200.
    pub bullet_min: u32,
    /// Hide when `heading_count >= heading_min`. Range 1..=200.
    pub heading_min: u32,
    /// Hide when `emoji_count > emoji_max`. Range 0..=200.
    pub emoji_max: u32,
    /// Low-density check only applies from this body length up.
    /// Range 100..=20000.
    pub low_info_density_min_len: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title_max_len: 30,
            body_max_len: 50,
            min_sentence_count: 3,
            code_block_min: 4,
            bullet_min: 12,
            heading_min: 10,
            emoji_max: 12,
            low_info_density_min_len: 800,
        }
    }
}

impl Thresholds {
    /// Returns a copy with every field clamped into its legal range.
    pub fn clamped(self) -> Self {
        Self {
            title_max_len: self.title_max_len.clamp(1, 200),
            body_max_len: self.body_max_len.clamp(1, 2000),
            min_sentence_count: self.min_sentence_count.clamp(1, 50),
            code_block_min: self.code_block_min.clamp(1, 50),
            bullet_min: self.bullet_min.clamp(1, 200),
            heading_min: self.heading_min.clamp(1, 200),
            emoji_max: self.emoji_max.clamp(0, 200),
            low_info_density_min_len: self.low_info_density_min_len.clamp(100, 20000),
        }
    }
}

/// Complete filter configuration as delivered by the host.
///
/// Serializes to the same flat camelCase shape the host persists, so the
/// stored blob round-trips without a translation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Master switch. When off, [`should_hide`](crate::filter::should_hide)
    /// always answers `false`.
    pub enabled: bool,
    /// Whether the host shows its options panel. Carried and round-tripped
    /// for the host's benefit; never read by the decision engine.
    pub show_panel: bool,
    #[serde(flatten)]
    pub conditions: Conditions,
    #[serde(flatten)]
    pub thresholds: Thresholds,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_panel: true,
            conditions: Conditions::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl FilterConfig {
    /// Parses a stored settings blob, merging over defaults.
    ///
    /// Missing fields take their default, unknown fields are ignored, and an
    /// unparseable blob yields the full default configuration. Thresholds
    /// are clamped on the way in.
    pub fn from_stored(json: &str) -> Self {
        serde_json::from_str::<FilterConfig>(json)
            .unwrap_or_default()
            .normalized()
    }

    /// Returns a copy with thresholds clamped into their legal ranges.
    pub fn normalized(mut self) -> Self {
        self.thresholds = self.thresholds.clamped();
        self
    }
}

/// Host-side handle publishing configuration to the pipeline.
///
/// The pipeline holds the matching `watch::Receiver` and treats every
/// published change as a "configuration changed" signal.
#[derive(Debug)]
pub struct ConfigProvider {
    tx: watch::Sender<FilterConfig>,
}

impl ConfigProvider {
    /// Creates a provider seeded with `initial` and the receiver the
    /// pipeline subscribes to.
    pub fn new(initial: FilterConfig) -> (Self, watch::Receiver<FilterConfig>) {
        let (tx, rx) = watch::channel(initial.normalized());
        (Self { tx }, rx)
    }

    /// Publishes a new configuration, clamping thresholds first.
    pub fn update(&self, config: FilterConfig) {
        // send() only fails when every receiver is gone, which just means
        // nobody is listening anymore.
        let _ = self.tx.send(config.normalized());
    }

    /// The currently published configuration.
    pub fn current(&self) -> FilterConfig {
        *self.tx.borrow()
    }
}
