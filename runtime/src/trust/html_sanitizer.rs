//! Allow-list HTML sanitizer for scraped page content.
//!
//! A thin policy over `ammonia`: allowed elements keep only the attributes in
//! [`ALLOWED_ATTRIBUTES`]; other elements are unwrapped (their children
//! survive) unless they are in [`DROP_WITH_CONTENT`], whose whole subtree is
//! removed. Comments are stripped.

use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// Elements kept as-is (minus attributes not listed in [`ALLOWED_ATTRIBUTES`]).
const ALLOWED_ELEMENTS: &[&str] = &[
    // structure
    "html", "head", "body", "main", "header", "footer", "section", "article", "nav", "div", "span",
    // text
    "p", "br", "hr", "blockquote", "pre", "code", "em", "strong", "b", "i", "u", "small", "sub",
    "sup", "mark",
    // lists
    "ul", "ol", "li", "dl", "dt", "dd",
    // tables
    "table", "thead", "tbody", "tfoot", "tr", "th", "td",
    // links and images
    "a", "img",
];

const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("img", &["src", "alt", "width", "height"]),
];

/// Elements removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template",
];

/// Schemes allowed in `href`/`src`. Relative URLs always pass.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

fn policy() -> Builder<'static> {
    let attributes: HashMap<&str, HashSet<&str>> = ALLOWED_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();

    let mut builder = Builder::empty();
    builder
        .tags(ALLOWED_ELEMENTS.iter().copied().collect())
        .clean_content_tags(DROP_WITH_CONTENT.iter().copied().collect())
        .tag_attributes(attributes)
        .url_schemes(SAFE_SCHEMES.iter().copied().collect())
        .link_rel(None)
        .strip_comments(true);
    builder
}

/// Sanitize an HTML fragment with the default policy.
pub fn sanitize(html: &str) -> String {
    policy().clean(html).to_string()
}
