//! Heuristic scoring of article text.
//!
//! Turns the title, the whitespace-collapsed body text, and the raw
//! (line-preserving) container text into two numbers: the aggregate
//! AI-likelihood score and the template-phrase count. Every sub-heuristic is
//! independent and weighted; the aggregate is their plain sum.
//!
//! The weights are load-bearing: articles are hidden when the aggregate
//! crosses a fixed threshold, so changing any weight changes filtering
//! outcomes. They are kept exactly as tuned against the live site,
//! including the blunt ones (see `bold_marker_bonus`).

use std::sync::LazyLock;

use regex::Regex;

/// Aggregate score at or above which the AI-likelihood condition fires.
pub const AI_SCORE_THRESHOLD: i32 = 12;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Explicit self-reference or generation-log phrasing. Strongest signal:
/// +3 per pattern matching the title or the body.
static STRONG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)chatgpt|openai|gpt[-\s]?\d",
        r"(?i)(ai|人工知能).{0,6}(生成|出力)",
        r"(?i)(以下|下記).{0,6}(の)?(コード|全文|結果|出力)",
        r"(?i)プロンプト",
        r"(?i)as an ai language model",
    ])
});

/// Stock transitions and section framing common in generated prose.
/// +1 per pattern matching the body.
static STYLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"結論(から|として)",
        r"要点(は|を)",
        r"(ポイント|まとめ)(は|ると)",
        r"(手順|ステップ)\s*\d+",
        r"(メリット|デメリット)",
        r"(注意点|補足|前提)",
        r"(まず|次に|最後に)",
        r"(?i)FAQ|よくある質問",
    ])
});

/// Tool names, stock openings, templated transitions, and structural
/// heading markers. +2 per pattern; applied once to the body and once to
/// the title.
static KEYWORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"——",
        r"(?i)chatgpt",
        r"(?i)\bgpt[-\s]?4\b",
        r"(?i)\bgpt[-\s]?3\.?5\b",
        r"(?i)\bopenai\b",
        r"(?i)生成(ai|文章|記事)",
        r"プロンプト",
        r"はじめに",
        r"まとめ",
        r"おわりに",
        r"下記(の)?(コード|内容)",
        r"結論から",
        r"要約すると",
        r"ステップ(は|として)",
        r"注意点として",
        r"ポイントは",
        r"##\s|\n##\s|###\s",
    ])
});

/// Casual/diary-style title phrasing. Human tell: −3 per pattern matching
/// the title.
static CASUAL_TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"してみた",
        r"してみる",
        r"試してみた",
        r"書いてみた",
        r"作ってみた",
        r"やってみた",
        r"触ってみた",
        r"調べてみた",
        r"感想",
        r"雑感",
        r"備忘録",
        r"メモ",
        r"日記",
        r"覚え書き",
        r"なんとなく",
        r"とりあえず",
        r"多分",
        r"ざっくり",
        r"自分用",
        r"個人用",
        r"自分向け",
        r"私用",
        r"俺用",
    ])
});

/// Template phrases counted (not deduplicated) for the template score.
static TEMPLATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"本記事では",
        r"この記事では",
        r"それでは見ていきましょう",
        r"まとめると",
        r"まずは",
        r"次に",
        r"最後に",
        r"以上です",
        r"結論",
    ])
});

/// Decorative brackets and marks rare in plain prose titles.
static RARE_TITLE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[【】「」『』《》〈〉〔〕［］｛｝〓◆◇]").unwrap());

static COMMA_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[、，,]").unwrap());
static PERIOD_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[。．.]").unwrap());

/// Markdown-style heading lines (`##`..`######`) in the raw text.
static MD_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}#{2,6}\s+").unwrap());
static MD_BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+]\s+").unwrap());
static MD_NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());

/// A fenced code block spanning whole lines with nothing else on them.
static LONE_FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^\s*```.*?```\s*$").unwrap());

/// Pictographic ranges used for emoji detection (common emoji plus the
/// miscellaneous/dingbat symbol blocks).
pub(crate) fn is_pictographic(c: char) -> bool {
    matches!(c, '\u{1F300}'..='\u{1FAFF}' | '\u{2600}'..='\u{27BF}')
}

/// Counts lines whose first non-space character is pictographic.
pub(crate) fn count_emoji_line_starts(text: &str) -> u32 {
    let mut count = 0;
    for line in text.lines() {
        match line.trim_start().chars().next() {
            Some(first) if is_pictographic(first) => count += 1,
            _ => {}
        }
    }
    count
}

fn matched_patterns(patterns: &[Regex], text: &str) -> i32 {
    patterns.iter().filter(|p| p.is_match(text)).count() as i32
}

/// Keyword list contribution for one piece of text: +2 per distinct
/// pattern present. Applied separately to the body and to the title.
fn keyword_score(text: &str) -> i32 {
    2 * matched_patterns(&KEYWORD_PATTERNS, text)
}

/// Title-only penalty for decorative punctuation: 2 per occurrence.
fn rare_char_penalty(title: &str) -> i32 {
    2 * RARE_TITLE_CHARS.find_iter(title).count() as i32
}

/// Title-only penalty for casual phrasing: 3 per distinct pattern.
fn casual_title_penalty(title: &str) -> i32 {
    3 * matched_patterns(&CASUAL_TITLE_PATTERNS, title)
}

/// Flat bonus when the raw text carries bold-markup markers at all.
///
/// Rendered article text should not contain literal `**`; its presence
/// means markdown leaked through unrendered, which on the live site almost
/// always meant machine-pasted output. Deliberately blunt: it alone
/// guarantees the AI condition fires.
fn bold_marker_bonus(raw: &str) -> i32 {
    if raw.contains("**") { 100 } else { 0 }
}

/// Structural and stylistic contribution computed across title, body, and
/// raw line-oriented text.
fn structure_score(title: &str, body: &str, raw: &str) -> i32 {
    let mut score = 0;

    for p in STRONG_PATTERNS.iter() {
        if p.is_match(title) || p.is_match(body) {
            score += 3;
        }
    }
    score += matched_patterns(&STYLE_PATTERNS, body);

    let heading_lines = MD_HEADING_LINE.find_iter(raw).count();
    if heading_lines >= 8 {
        score += 2;
    } else if heading_lines >= 4 {
        score += 1;
    }

    let list_lines =
        MD_BULLET_LINE.find_iter(raw).count() + MD_NUMBERED_LINE.find_iter(raw).count();
    if list_lines >= 18 {
        score += 2;
    } else if list_lines >= 10 {
        score += 1;
    }

    let len = body.chars().count().max(1);
    let punctuation = COMMA_LIKE.find_iter(body).count() + PERIOD_LIKE.find_iter(body).count();
    if punctuation as f64 / len as f64 >= 0.06 {
        score += 1;
    }

    if raw.contains("```") && LONE_FENCED_BLOCK.is_match(raw.trim()) {
        score += 2;
    }

    if count_emoji_line_starts(raw) >= 5 {
        score += 4;
    }

    score
}

/// Aggregate AI-likelihood score for one article.
///
/// Sum of the independent sub-heuristics; signed because the title-only
/// heuristics subtract. Compared against [`AI_SCORE_THRESHOLD`] by the
/// decision engine.
///
/// # Example
///
/// ```rust
/// use qsift_core::score::ai_score;
///
/// let s = ai_score("", "as an AI language model I cannot", "");
/// assert_eq!(s, 3);
/// ```
pub fn ai_score(title: &str, body: &str, raw: &str) -> i32 {
    keyword_score(body) + keyword_score(title) - rare_char_penalty(title)
        - casual_title_penalty(title)
        + structure_score(title, body, raw)
        + bold_marker_bonus(raw)
}

/// Total occurrences of stock template phrases in the body.
///
/// Counted per occurrence, not per distinct pattern: a body repeating
/// 「この記事では」 three times contributes 3.
pub fn template_score(body: &str) -> u32 {
    TEMPLATE_PATTERNS
        .iter()
        .map(|p| p.find_iter(body).count() as u32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_pattern_alone_scores_three() {
        // "as an ai language model" appears only in the strong list, so
        // nothing else fires.
        assert_eq!(ai_score("", "as an AI language model I cannot do that", ""), 3);
    }

    #[test]
    fn test_chatgpt_hits_strong_and_keyword() {
        // "chatgpt" is both a strong pattern (+3) and a keyword (+2).
        assert_eq!(ai_score("", "chatgpt", ""), 5);
    }

    #[test]
    fn test_keyword_applies_to_title_and_body_separately() {
        assert_eq!(ai_score("はじめに", "はじめに", ""), 4);
    }

    #[test]
    fn test_style_pattern_scores_one() {
        assert_eq!(ai_score("", "メリットがあります", ""), 1);
    }

    #[test]
    fn test_heading_density() {
        let four = "## a\n## b\n## c\n## d\n";
        assert_eq!(ai_score("", "", four), 1);
        let eight = four.repeat(2);
        assert_eq!(ai_score("", "", &eight), 2);
    }

    #[test]
    fn test_list_density() {
        let ten = "- item\n".repeat(10);
        assert_eq!(ai_score("", "", &ten), 1);
        let mixed = format!("{}{}", "- item\n".repeat(9), "1. step\n".repeat(9));
        assert_eq!(ai_score("", "", &mixed), 2);
    }

    #[test]
    fn test_punctuation_uniformity() {
        // 3 terminators over 6 chars is far above the 0.06 ratio.
        assert_eq!(ai_score("", "あ。い。う。", ""), 1);
        // Long body with a single period stays below it.
        let sparse = format!("{}。", "あ".repeat(99));
        assert_eq!(ai_score("", &sparse, ""), 0);
    }

    #[test]
    fn test_lone_fenced_block() {
        assert_eq!(ai_score("", "", "```\nfn main() {}\n```"), 2);
        assert_eq!(ai_score("", "", "inline ``` fence ``` in prose"), 0);
    }

    #[test]
    fn test_leading_emoji_lines() {
        let raw = "✅ one\n✅ two\n✅ three\n✅ four\n✅ five\n";
        assert_eq!(ai_score("", "", raw), 4);
        let raw = "✅ one\n✅ two\nplain\n";
        assert_eq!(ai_score("", "", raw), 0);
    }

    #[test]
    fn test_bold_marker_dominates() {
        assert_eq!(ai_score("", "", "some **bold** text"), 100);
    }

    #[test]
    fn test_rare_title_chars_subtract_per_occurrence() {
        assert_eq!(ai_score("【速報】新機能", "", ""), -4);
    }

    #[test]
    fn test_casual_title_subtracts_per_pattern() {
        // してみた also satisfies 試してみた? No: the title below matches
        // してみた and 試してみた both.
        assert_eq!(ai_score("Rustを試してみた", "", ""), -6);
        assert_eq!(ai_score("備忘録", "", ""), -3);
    }

    #[test]
    fn test_casual_title_can_go_negative_overall() {
        let s = ai_score("自分用メモ", "", "");
        assert!(s < 0);
    }

    #[test]
    fn test_template_score_counts_occurrences() {
        assert_eq!(template_score("この記事では A。この記事では B。"), 2);
        assert_eq!(template_score("本記事では、まずは結論から。"), 3);
        assert_eq!(template_score("plain prose"), 0);
    }

    #[test]
    fn test_emoji_line_start_counting() {
        assert_eq!(count_emoji_line_starts("  ✅ ok\ntext\n☀️ sun"), 2);
        assert_eq!(count_emoji_line_starts(""), 0);
        assert_eq!(count_emoji_line_starts("no emoji\n"), 0);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(ai_score("", "", ""), 0);
        assert_eq!(template_score(""), 0);
    }
}
