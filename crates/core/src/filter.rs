//! The hide/show decision engine.
//!
//! [`should_hide`] is a pure function of a metrics record and a
//! configuration. Conditions are evaluated independently and OR-ed; there is
//! no priority ordering and no side effect. The master `enabled` switch
//! short-circuits everything to "show".

use crate::config::FilterConfig;
use crate::metrics::ArticleMetrics;
use crate::score::AI_SCORE_THRESHOLD;

/// Template-score level at or above which the template condition fires.
pub const TEMPLATE_SCORE_THRESHOLD: u32 = 6;

/// Density below which a long article counts as low-information.
pub const LOW_INFO_DENSITY: f64 = 0.35;

/// Decides whether one article should be hidden.
///
/// Returns `true` when any enabled condition fires. With `enabled` off the
/// answer is always `false`. Thresholds are read from the configuration
/// verbatim; the provider clamps them before they get here.
///
/// # Example
///
/// ```rust
/// use qsift_core::{config::FilterConfig, filter::should_hide, metrics::ArticleMetrics};
///
/// let config = FilterConfig::default();
/// // The fail-open sentinel never hides, whatever the configuration.
/// assert!(!should_hide(&ArticleMetrics::unassessable(), &config));
/// ```
pub fn should_hide(metrics: &ArticleMetrics, config: &FilterConfig) -> bool {
    if !config.enabled {
        return false;
    }

    let c = &config.conditions;
    let t = &config.thresholds;

    if c.hide_ai_generated && metrics.ai_score >= AI_SCORE_THRESHOLD {
        return true;
    }
    if c.hide_no_image && !metrics.has_image {
        return true;
    }
    if c.hide_short_title && metrics.title_len <= t.title_max_len {
        return true;
    }
    if c.hide_short_body && metrics.body_text_len <= t.body_max_len {
        return true;
    }
    if c.hide_code_only && metrics.is_code_only {
        return true;
    }
    if c.hide_many_code_blocks && metrics.code_block_count >= t.code_block_min {
        return true;
    }
    if c.hide_few_sentences && metrics.sentence_count <= t.min_sentence_count {
        return true;
    }
    if c.hide_many_bullets && metrics.bullet_count >= t.bullet_min {
        return true;
    }
    if c.hide_many_headings && metrics.heading_count >= t.heading_min {
        return true;
    }
    if c.hide_template_phrases && metrics.template_score >= TEMPLATE_SCORE_THRESHOLD {
        return true;
    }
    if c.hide_excessive_emojis && metrics.emoji_count > t.emoji_max {
        return true;
    }
    if c.hide_low_info_density
        && metrics.body_text_len >= t.low_info_density_min_len
        && metrics.info_density < LOW_INFO_DENSITY
    {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Conditions;
    use rstest::rstest;

    /// A neutral record that fires no condition under an
    /// everything-enabled configuration.
    fn quiet_metrics() -> ArticleMetrics {
        ArticleMetrics {
            ok: true,
            has_image: true,
            title_len: 100,
            body_text_len: 3000,
            sentence_count: 40,
            code_block_count: 0,
            bullet_count: 0,
            heading_count: 0,
            emoji_count: 0,
            is_code_only: false,
            ai_score: 0,
            template_score: 0,
            info_density: 0.9,
        }
    }

    fn all_conditions() -> FilterConfig {
        let mut config = FilterConfig::default();
        config.conditions = Conditions {
            hide_ai_generated: true,
            hide_no_image: true,
            hide_short_title: true,
            hide_short_body: true,
            hide_code_only: true,
            hide_many_code_blocks: true,
            hide_few_sentences: true,
            hide_many_bullets: true,
            hide_many_headings: true,
            hide_template_phrases: true,
            hide_excessive_emojis: true,
            hide_low_info_density: true,
        };
        config
    }

    #[test]
    fn test_disabled_never_hides() {
        let mut config = all_conditions();
        config.enabled = false;
        let mut metrics = quiet_metrics();
        metrics.ai_score = 1000;
        metrics.has_image = false;
        assert!(!should_hide(&metrics, &config));
    }

    #[test]
    fn test_quiet_metrics_pass_everything() {
        assert!(!should_hide(&quiet_metrics(), &all_conditions()));
    }

    #[test]
    fn test_sentinel_never_hides_under_any_toggles() {
        let sentinel = ArticleMetrics::unassessable();
        assert!(!should_hide(&sentinel, &all_conditions()));
        assert!(!should_hide(&sentinel, &FilterConfig::default()));
    }

    #[test]
    fn test_disabled_condition_does_not_fire() {
        let mut metrics = quiet_metrics();
        metrics.has_image = false;
        // Default configuration has hide_no_image off.
        assert!(!should_hide(&metrics, &FilterConfig::default()));
        assert!(should_hide(&metrics, &all_conditions()));
    }

    #[rstest]
    // ai_score >= 12
    #[case::ai_at(|m: &mut ArticleMetrics| m.ai_score = 12, true)]
    #[case::ai_below(|m: &mut ArticleMetrics| m.ai_score = 11, false)]
    // title_len <= 30
    #[case::title_at(|m: &mut ArticleMetrics| m.title_len = 30, true)]
    #[case::title_above(|m: &mut ArticleMetrics| m.title_len = 31, false)]
    // body_text_len <= 50
    #[case::body_at(|m: &mut ArticleMetrics| m.body_text_len = 50, true)]
    #[case::body_above(|m: &mut ArticleMetrics| m.body_text_len = 51, false)]
    // code_block_count >= 4
    #[case::code_at(|m: &mut ArticleMetrics| m.code_block_count = 4, true)]
    #[case::code_below(|m: &mut ArticleMetrics| m.code_block_count = 3, false)]
    // sentence_count <= 3
    #[case::sentences_at(|m: &mut ArticleMetrics| m.sentence_count = 3, true)]
    #[case::sentences_above(|m: &mut ArticleMetrics| m.sentence_count = 4, false)]
    // bullet_count >= 12
    #[case::bullets_at(|m: &mut ArticleMetrics| m.bullet_count = 12, true)]
    #[case::bullets_below(|m: &mut ArticleMetrics| m.bullet_count = 11, false)]
    // heading_count >= 10
    #[case::headings_at(|m: &mut ArticleMetrics| m.heading_count = 10, true)]
    #[case::headings_below(|m: &mut ArticleMetrics| m.heading_count = 9, false)]
    // template_score >= 6
    #[case::template_at(|m: &mut ArticleMetrics| m.template_score = 6, true)]
    #[case::template_below(|m: &mut ArticleMetrics| m.template_score = 5, false)]
    // emoji_count > 12 (strict)
    #[case::emoji_at_max(|m: &mut ArticleMetrics| m.emoji_count = 12, false)]
    #[case::emoji_above(|m: &mut ArticleMetrics| m.emoji_count = 13, true)]
    fn test_threshold_boundaries(
        #[case] tweak: fn(&mut ArticleMetrics),
        #[case] expected: bool,
    ) {
        let mut metrics = quiet_metrics();
        tweak(&mut metrics);
        assert_eq!(should_hide(&metrics, &all_conditions()), expected);
    }

    #[test]
    fn test_low_density_needs_both_length_and_density() {
        let config = all_conditions();

        let mut metrics = quiet_metrics();
        metrics.body_text_len = 800;
        metrics.info_density = 0.34;
        assert!(should_hide(&metrics, &config));

        // Long enough but dense enough.
        metrics.info_density = 0.35;
        assert!(!should_hide(&metrics, &config));

        // Sparse but too short for the check to apply.
        metrics.body_text_len = 799;
        metrics.info_density = 0.1;
        assert!(!should_hide(&metrics, &config));
    }

    #[test]
    fn test_code_only_fires() {
        let mut metrics = quiet_metrics();
        metrics.is_code_only = true;
        assert!(should_hide(&metrics, &all_conditions()));
    }

    #[test]
    fn test_negative_ai_score_never_fires() {
        let mut metrics = quiet_metrics();
        metrics.ai_score = -9;
        assert!(!should_hide(&metrics, &all_conditions()));
    }
}
