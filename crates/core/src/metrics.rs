//! The metrics record computed for one article.
//!
//! [`ArticleMetrics`] is a deterministic function of one article's markup:
//! the extractor fills the structural counts and the scorer fills the
//! aggregate scores. Once computed for a key the record is never mutated;
//! a re-fetch produces a fresh record.

use serde::{Deserialize, Serialize};

/// Structural and textual features of one article, plus the derived scores.
///
/// Serializable so it can live in the session cache and be surfaced as
/// diagnostics. All lengths and counts are Unicode-scalar based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetrics {
    /// Whether extraction found the content container. When `false`, every
    /// other field holds the fail-open sentinel values.
    pub ok: bool,
    /// At least one image inside the content container.
    pub has_image: bool,
    /// Character count of the article title.
    pub title_len: u32,
    /// Character count of the whitespace-collapsed body text.
    pub body_text_len: u32,
    /// Number of non-empty sentence segments in the body.
    pub sentence_count: u32,
    /// `pre` / `pre code` blocks in the container.
    pub code_block_count: u32,
    /// List items (`ul li`, `ol li`) in the container.
    pub bullet_count: u32,
    /// Headings (`h1`..`h6`) in the container.
    pub heading_count: u32,
    /// Pictographic characters in the body text.
    pub emoji_count: u32,
    /// No prose-paragraph text at all, but code present.
    pub is_code_only: bool,
    /// Aggregate AI-likelihood score. Signed: title heuristics subtract.
    pub ai_score: i32,
    /// Total occurrences of stock template phrases in the body.
    pub template_score: u32,
    /// Letters-and-digits share of the body text, in `[0, 1]`.
    pub info_density: f64,
}

impl ArticleMetrics {
    /// Sentinel record for an article whose content container was not found.
    ///
    /// Engineered so no condition can fire under any configuration:
    /// "must be short/few" fields are far above any legal threshold,
    /// `has_image` is true, and both scores are zero. When the extractor
    /// cannot assess an article, the article stays visible.
    pub fn unassessable() -> Self {
        Self {
            ok: false,
            has_image: true,
            title_len: 9999,
            body_text_len: 9999,
            sentence_count: 9999,
            code_block_count: 0,
            bullet_count: 0,
            heading_count: 0,
            emoji_count: 0,
            is_code_only: false,
            ai_score: 0,
            template_score: 0,
            info_density: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_shape() {
        let m = ArticleMetrics::unassessable();
        assert!(!m.ok);
        assert!(m.has_image);
        assert_eq!(m.title_len, 9999);
        assert_eq!(m.body_text_len, 9999);
        assert_eq!(m.sentence_count, 9999);
        assert_eq!(m.ai_score, 0);
        assert_eq!(m.info_density, 1.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = ArticleMetrics::unassessable();
        let json = serde_json::to_string(&m).unwrap();
        let back: ArticleMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_string(&ArticleMetrics::unassessable()).unwrap();
        assert!(json.contains("\"hasImage\""));
        assert!(json.contains("\"aiScore\""));
        assert!(json.contains("\"infoDensity\""));
    }
}
