//! Item URL canonicalization.
//!
//! A list entry links to an article with whatever the host page happened to
//! render: relative paths, tracking queries, fragments. Before any caching or
//! fetch deduplication can work, those have to collapse to one stable
//! identifier per article. [`canonicalize`] resolves the link against a base,
//! strips the volatile parts, and accepts only URLs whose path has the item
//! detail shape `/<owner>/items/<id>`.
//!
//! A link that does not canonicalize is not an error: the caller skips the
//! item entirely (never hides it, never fetches it).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Path shape of an item detail page: single owner segment, literal
/// `items`, single id segment.
static ITEM_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[^/]+/items/[^/]+$").unwrap());

/// Normalized identifier for one article.
///
/// Produced only by [`canonicalize`]; two links that reach the same article
/// through different query strings or fragments yield equal keys. Used as
/// the key for the session cache and the in-flight fetch map.
///
/// # Example
///
/// ```rust
/// use qsift_core::canonical::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("https://qiita.com/").unwrap();
/// let a = canonicalize("/alice/items/abc123?utm_source=feed", &base).unwrap();
/// let b = canonicalize("https://qiita.com/alice/items/abc123#comments", &base).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// The full canonical URL, suitable for fetching.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves a raw link target to a canonical article key.
///
/// Resolution steps:
/// 1. parse `href` relative to `base`,
/// 2. clear the fragment and the query,
/// 3. require the path to match `/<owner>/items/<id>`.
///
/// Returns `None` when the link is unparseable or the path has any other
/// shape (profile pages, tag pages, item sub-resources). Callers must treat
/// `None` as "skip this item".
pub fn canonicalize(href: &str, base: &Url) -> Option<CanonicalKey> {
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    url.set_query(None);

    if !ITEM_PATH.is_match(url.path()) {
        return None;
    }

    Some(CanonicalKey(url.to_string()))
}
