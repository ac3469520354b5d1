//! Metrics extraction from article markup.
//!
//! [`extract_metrics`] is the only entry point: given the raw HTML of one
//! article page it locates the rendered-markdown container, derives the
//! structural counts and text fragments, and hands the text to the scorer.
//! It is a pure, total, synchronous function: identical markup always
//! yields an identical [`ArticleMetrics`], and nothing in here can fail.
//!
//! When the container is missing (login walls, deleted articles, layout
//! changes) extraction is failed-open: the sentinel record from
//! [`ArticleMetrics::unassessable`] is returned, under which no hide
//! condition can fire.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::metrics::ArticleMetrics;
use crate::score::{self, is_pictographic};

/// Container holding the rendered article body on an item page.
const CONTENT_SELECTOR: &str = ".it-MdContent";

static CONTENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(CONTENT_SELECTOR).unwrap());
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static CODE_BLOCKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre code, pre").unwrap());
static INLINE_CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").unwrap());
static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul li, ol li").unwrap());
static HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Collapses all whitespace runs to single spaces and trims.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    collapse(&element.text().collect::<String>())
}

/// Elements after which rendered text breaks to a new line.
fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "section"
            | "blockquote"
            | "pre"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "tr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "br"
    )
}

/// Rendered-text approximation that preserves line structure.
///
/// The line-oriented sub-heuristics (markdown heading lines, bullet lines,
/// leading-emoji lines, lone fenced block) need the text as it reads on
/// screen, with block elements on their own lines, not the single collapsed
/// string used for lengths.
fn raw_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_raw_text(root, &mut out);
    out
}

fn push_raw_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if el.name() == "br" {
                    out.push('\n');
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    push_raw_text(child_ref, out);
                }
                if is_block(el.name()) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Splits the body on sentence-terminating punctuation and counts the
/// non-empty trimmed segments.
fn count_sentences(body: &str) -> u32 {
    body.split(['。', '！', '？', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count() as u32
}

/// Information-density ratio: share of the body that is letters or digits,
/// clamped into `[0, 1]` by construction (numerator floor of 1 keeps a
/// fully-symbolic body at a small positive value, matching the original
/// arithmetic).
fn info_density(body: &str, body_len: u32) -> f64 {
    let non_word = body
        .chars()
        .filter(|c| !c.is_alphabetic() && !c.is_numeric())
        .count() as u32;
    let wordish = body_len.saturating_sub(non_word).max(1);
    f64::from(wordish) / f64::from(body_len.max(1))
}

/// Computes the full metrics record for one article page.
///
/// # Example
///
/// ```rust
/// use qsift_core::extract::extract_metrics;
///
/// let html = r#"<html><body><h1>Title</h1>
///   <div class="it-MdContent"><p>これはテストです。これは二文目です。</p></div>
/// </body></html>"#;
/// let metrics = extract_metrics(html);
/// assert!(metrics.ok);
/// assert_eq!(metrics.sentence_count, 2);
/// ```
pub fn extract_metrics(html: &str) -> ArticleMetrics {
    let doc = Html::parse_document(html);

    let Some(container) = doc.select(&CONTENT).next() else {
        return ArticleMetrics::unassessable();
    };

    let title = {
        let h1 = doc.select(&H1).next().map(collapsed_text).unwrap_or_default();
        if h1.is_empty() {
            doc.select(&TITLE).next().map(collapsed_text).unwrap_or_default()
        } else {
            h1
        }
    };
    let title_len = title.chars().count() as u32;

    let body_text = collapsed_text(container);
    let body_text_len = body_text.chars().count() as u32;

    let has_image = container.select(&IMG).next().is_some();

    let code_block_count = container.select(&CODE_BLOCKS).count() as u32;
    let inline_code_count = container.select(&INLINE_CODE).count() as u32;

    let bullet_count = container.select(&LIST_ITEMS).count() as u32;
    let heading_count = container.select(&HEADINGS).count() as u32;

    let sentence_count = count_sentences(&body_text);

    let emoji_count = body_text.chars().filter(|c| is_pictographic(*c)).count() as u32;

    let paragraph_text_len = container
        .select(&PARAGRAPHS)
        .map(collapsed_text)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .count() as u32;
    let is_code_only = paragraph_text_len == 0 && (code_block_count > 0 || inline_code_count > 10);

    let raw = raw_text(container);
    let ai_score = score::ai_score(&title, &body_text, &raw);
    let template_score = score::template_score(&body_text);

    ArticleMetrics {
        ok: true,
        has_image,
        title_len,
        body_text_len,
        sentence_count,
        code_block_count,
        bullet_count,
        heading_count,
        emoji_count,
        is_code_only,
        ai_score,
        template_score,
        info_density: info_density(&body_text, body_text_len),
    }
}
