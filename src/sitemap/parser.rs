//! Sitemap body classification
//!
//! `<loc>` values are pulled out with a lenient scan rather than a strict
//! XML parse, so sitemaps with a stray BOM, a broken declaration or
//! unescaped ampersands still yield their entries.

use regex::Regex;
use std::sync::LazyLock;

static LOC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<loc(?:\s[^>]*)?>(.*?)</loc>").expect("hardcoded regex pattern is valid")
});

/// What a fetched sitemap turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapBody {
    /// `<sitemapindex>`: each entry is another sitemap
    Index(Vec<String>),
    /// `<urlset>`: each entry is a page
    UrlSet(Vec<String>),
    /// Anything else is treated as an HTML sitemap page
    Html,
}

/// Classifies a sitemap body and lists its `<loc>` entries in file order
pub fn parse_sitemap(body: &str) -> SitemapBody {
    let lowered = body.to_lowercase();
    if lowered.contains("<sitemapindex") {
        SitemapBody::Index(loc_values(body))
    } else if lowered.contains("<urlset") {
        SitemapBody::UrlSet(loc_values(body))
    } else {
        SitemapBody::Html
    }
}

fn loc_values(body: &str) -> Vec<String> {
    LOC_REGEX
        .captures_iter(body)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str().trim();
            let raw = raw
                .strip_prefix("<![CDATA[")
                .and_then(|s| s.strip_suffix("]]>"))
                .unwrap_or(raw)
                .trim();
            (!raw.is_empty()).then(|| unescape(raw))
        })
        .collect()
}

// &amp; goes last so "&amp;lt;" stays a literal "&lt;"
fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
