//! Sitemap XML model and format classification.
//!
//! A sitemap payload is either a URL set (`<urlset><url>…`) listing pages
//! directly, or a sitemap index (`<sitemapindex><sitemap>…`) pointing at
//! further sitemap documents. Root element names are not checked: a payload
//! is whatever schema it deserializes into with at least one entry.
//!
//! Unrelated elements, comments and extension namespaces may appear between
//! entries. Entries without a `<loc>` are skipped rather than failing the
//! document.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One crawlable page listed in a URL set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SitemapUrl {
    #[serde(default)]
    pub loc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl SitemapUrl {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }
}

/// A pointer from a sitemap index to another sitemap document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapRef {
    #[serde(default)]
    pub loc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
}

#[derive(Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<SitemapUrl>,
}

#[derive(Deserialize)]
struct SitemapIndex {
    #[serde(rename = "sitemap", default)]
    sitemaps: Vec<SitemapRef>,
}

/// Shape of a sitemap payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Leaf document; never empty.
    UrlSet(Vec<SitemapUrl>),
    /// Index document; never empty.
    Index(Vec<SitemapRef>),
    /// Neither schema matched with at least one entry.
    Unknown,
}

impl SitemapDocument {
    pub fn kind(&self) -> &'static str {
        match self {
            SitemapDocument::UrlSet(_) => "urlset",
            SitemapDocument::Index(_) => "sitemapindex",
            SitemapDocument::Unknown => "unknown",
        }
    }
}

/// Parse `xml` as a URL set. `None` on structural error or zero usable entries.
pub fn parse_url_set(xml: &str) -> Option<Vec<SitemapUrl>> {
    let set = quick_xml::de::from_str::<UrlSet>(xml).ok()?;
    non_empty(retain_located(set.urls, |u| &u.loc))
}

/// Parse `xml` as a sitemap index. `None` on structural error or zero usable entries.
pub fn parse_index(xml: &str) -> Option<Vec<SitemapRef>> {
    let index = quick_xml::de::from_str::<SitemapIndex>(xml).ok()?;
    non_empty(retain_located(index.sitemaps, |r| &r.loc))
}

fn retain_located<T>(mut entries: Vec<T>, loc: impl Fn(&T) -> &String) -> Vec<T> {
    let before = entries.len();
    entries.retain(|entry| !loc(entry).trim().is_empty());
    if entries.len() < before {
        debug!(skipped = before - entries.len(), "ignoring sitemap entries without <loc>");
    }
    entries
}

fn non_empty<T>(entries: Vec<T>) -> Option<Vec<T>> {
    (!entries.is_empty()).then_some(entries)
}

/// Classify a payload, trying the URL set schema before the index schema.
pub fn classify(xml: &str) -> SitemapDocument {
    if let Some(urls) = parse_url_set(xml) {
        return SitemapDocument::UrlSet(urls);
    }
    if let Some(sitemaps) = parse_index(xml) {
        return SitemapDocument::Index(sitemaps);
    }
    SitemapDocument::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL_SET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>http://example.com/page1</loc>
    <lastmod>2023-10-01</lastmod>
    <changefreq>daily</changefreq>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>http://example.com/page2</loc>
  </url>
</urlset>"#;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>http://example.com/sitemap1.xml</loc>
    <lastmod>2023-10-01</lastmod>
  </sitemap>
  <sitemap>
    <loc>http://example.com/sitemap2.xml.gz</loc>
  </sitemap>
</sitemapindex>"#;

    #[test]
    fn test_parse_url_set_fields() {
        let urls = parse_url_set(URL_SET).unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].loc, "http://example.com/page1");
        assert_eq!(urls[0].lastmod.as_deref(), Some("2023-10-01"));
        assert_eq!(urls[0].changefreq.as_deref(), Some("daily"));
        assert_eq!(urls[0].priority.as_deref(), Some("0.8"));
        assert_eq!(urls[1], SitemapUrl::new("http://example.com/page2"));
    }

    #[test]
    fn test_parse_index_fields() {
        let refs = parse_index(INDEX).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].loc, "http://example.com/sitemap1.xml");
        assert_eq!(refs[0].lastmod.as_deref(), Some("2023-10-01"));
        assert!(refs[1].lastmod.is_none());
    }

    #[test]
    fn test_index_is_not_a_url_set() {
        assert!(parse_url_set(INDEX).is_none());
        assert!(parse_index(URL_SET).is_none());
    }

    #[test]
    fn test_classify() {
        assert!(matches!(classify(URL_SET), SitemapDocument::UrlSet(ref u) if u.len() == 2));
        assert!(matches!(classify(INDEX), SitemapDocument::Index(ref s) if s.len() == 2));
    }

    #[test]
    fn test_empty_documents_are_unknown() {
        assert_eq!(classify("<urlset></urlset>"), SitemapDocument::Unknown);
        assert_eq!(classify("<sitemapindex/>"), SitemapDocument::Unknown);
    }

    #[test]
    fn test_garbage_is_unknown() {
        assert_eq!(classify(""), SitemapDocument::Unknown);
        assert_eq!(classify("not xml at all"), SitemapDocument::Unknown);
        assert_eq!(classify("<html><body>404</body></html>"), SitemapDocument::Unknown);
    }

    #[test]
    fn test_entries_without_loc_are_skipped() {
        let xml = "<urlset>\
            <url><loc>http://e/a</loc></url>\
            <url><lastmod>2024-01-01</lastmod></url>\
            <url><loc>http://e/c</loc></url>\
            </urlset>";
        let urls = parse_url_set(xml).unwrap();
        assert_eq!(urls, vec![SitemapUrl::new("http://e/a"), SitemapUrl::new("http://e/c")]);

        let xml = "<sitemapindex>\
            <sitemap><lastmod>2024-01-01</lastmod></sitemap>\
            <sitemap><loc>http://e/s.xml</loc></sitemap>\
            </sitemapindex>";
        let refs = parse_index(xml).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].loc, "http://e/s.xml");
    }

    #[test]
    fn test_only_locless_entries_is_unknown() {
        let xml = "<urlset><url><lastmod>2024-01-01</lastmod></url><url><loc> </loc></url></urlset>";
        assert!(parse_url_set(xml).is_none());
        assert_eq!(classify(xml), SitemapDocument::Unknown);
    }

    #[test]
    fn test_unrelated_elements_between_urls() {
        let xml = "<urlset><url><loc>http://e/a</loc></url><foo/><url><loc>http://e/b</loc></url></urlset>";
        assert_eq!(
            classify(xml),
            SitemapDocument::UrlSet(vec![SitemapUrl::new("http://e/a"), SitemapUrl::new("http://e/b")])
        );
    }

    #[test]
    fn test_unrelated_elements_between_sitemaps() {
        let xml = "<sitemapindex>\
            <sitemap><loc>http://e/1.xml</loc></sitemap>\
            <note>generated nightly</note>\
            <sitemap><loc>http://e/2.xml</loc></sitemap>\
            </sitemapindex>";
        match classify(xml) {
            SitemapDocument::Index(refs) => {
                let locs: Vec<_> = refs.iter().map(|r| r.loc.as_str()).collect();
                assert_eq!(locs, vec!["http://e/1.xml", "http://e/2.xml"]);
            }
            other => panic!("expected index, got {}", other.kind()),
        }
    }

    #[test]
    fn test_real_world_layout() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet type="text/xsl" href="/sitemap.xsl"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:xhtml="http://www.w3.org/1999/xhtml"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <!-- products -->
  <url>
    <loc>https://shop.example/disc/buzzz</loc>
    <xhtml:link rel="alternate" hreflang="no" href="https://shop.example/no/disc/buzzz"/>
    <image:image><image:loc>https://shop.example/buzzz.png</image:loc></image:image>
    <lastmod>2024-03-01</lastmod>
  </url>
  <!-- categories -->
  <xhtml:meta name="generator" content="shopgen"/>
  <url>
    <loc>https://shop.example/category/putters</loc>
    <changefreq>weekly</changefreq>
  </url>
</urlset>"#;
        let urls = parse_url_set(xml).unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].loc, "https://shop.example/disc/buzzz");
        assert_eq!(urls[0].lastmod.as_deref(), Some("2024-03-01"));
        assert_eq!(urls[1].changefreq.as_deref(), Some("weekly"));
    }

    #[test]
    fn test_extension_elements_are_ignored() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
            xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://example.com/disc</loc>
    <image:image><image:loc>https://example.com/disc.png</image:loc></image:image>
  </url>
</urlset>"#;
        let urls = parse_url_set(xml).unwrap();
        assert_eq!(urls, vec![SitemapUrl::new("https://example.com/disc")]);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(classify(URL_SET).kind(), "urlset");
        assert_eq!(classify(INDEX).kind(), "sitemapindex");
        assert_eq!(SitemapDocument::Unknown.kind(), "unknown");
    }
}
