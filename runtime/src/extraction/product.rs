//! Selector-driven product extraction for configured sites.

use crate::acquisition::http_client::Fetcher;
use crate::config::site::SiteSelectors;
use futures::stream::{self, StreamExt};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {field} selector '{selector}': {reason}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        reason: String,
    },
}

/// Product fields pulled from one page. Fields whose selector is unset or
/// matches nothing are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Product {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw price text as shown on the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absolute image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// Compiled selectors for one site.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    name: Option<Selector>,
    price: Option<Selector>,
    description: Option<Selector>,
    image: Option<Selector>,
    availability: Option<Selector>,
}

impl ProductExtractor {
    /// Compile a site's selectors. Empty selectors disable their field.
    pub fn new(selectors: &SiteSelectors) -> Result<Self, ExtractError> {
        Ok(Self {
            name: compile("name", &selectors.name)?,
            price: compile("price", &selectors.price)?,
            description: compile("description", &selectors.description)?,
            image: compile("image", &selectors.image)?,
            availability: compile("availability", &selectors.availability)?,
        })
    }

    /// Extract product fields from the HTML of the page at `url`.
    pub fn extract(&self, url: &str, html: &str) -> Product {
        let document = Html::parse_document(html);
        let first = |selector: &Option<Selector>| select_first(&document, selector);

        let price_text = first(&self.price).and_then(element_value);
        let image_url = first(&self.image)
            .and_then(image_source)
            .map(|src| absolutize(url, &src));

        Product {
            url: url.to_string(),
            name: first(&self.name).and_then(element_value),
            price: price_text.as_deref().and_then(parse_price),
            price_text,
            description: first(&self.description).and_then(element_value),
            image_url,
            availability: first(&self.availability).and_then(element_value),
        }
    }
}

fn select_first<'a>(document: &'a Html, selector: &Option<Selector>) -> Option<ElementRef<'a>> {
    selector.as_ref().and_then(|sel| document.select(sel).next())
}

fn compile(field: &'static str, selector: &str) -> Result<Option<Selector>, ExtractError> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Ok(None);
    }
    Selector::parse(selector)
        .map(Some)
        .map_err(|e| ExtractError::InvalidSelector {
            field,
            selector: selector.to_string(),
            reason: e.to_string(),
        })
}

/// `content` for `<meta>`, otherwise the element's whitespace-collapsed text.
fn element_value(el: ElementRef<'_>) -> Option<String> {
    let value = if el.value().name() == "meta" {
        el.value().attr("content").unwrap_or_default().trim().to_string()
    } else {
        el.text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    };
    (!value.is_empty()).then_some(value)
}

fn image_source(el: ElementRef<'_>) -> Option<String> {
    let attr = match el.value().name() {
        "meta" => "content",
        "a" | "link" => "href",
        _ => "src",
    };
    el.value()
        .attr(attr)
        .or_else(|| el.value().attr("data-src"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn absolutize(page: &str, src: &str) -> String {
    Url::parse(page)
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

/// Parse a displayed price such as `1 299,-`, `249,50 kr` or `$1,299.50`.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text
        .trim()
        .trim_end_matches(",-")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let digits = digits.trim_matches(|c| c == ',' || c == '.');

    let normalized = match (digits.rfind(','), digits.rfind('.')) {
        // 1.299,50
        (Some(comma), Some(dot)) if comma > dot => digits.replace('.', "").replace(',', "."),
        // 1,299.50
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) => digits.replace(',', "."),
        _ => digits.to_string(),
    };
    normalized.parse().ok()
}

/// Fetches product pages and runs a [`ProductExtractor`] over them.
pub struct ProductScraper {
    fetcher: Arc<dyn Fetcher>,
    extractor: ProductExtractor,
    concurrency: usize,
}

impl ProductScraper {
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: ProductExtractor, concurrency: usize) -> Self {
        Self {
            fetcher,
            extractor,
            concurrency: concurrency.max(1),
        }
    }

    /// Scrape `urls`, keeping their order. Pages that fail to fetch are
    /// logged and skipped.
    pub async fn scrape(&self, urls: &[String]) -> Vec<Product> {
        let results: Vec<Option<Product>> = stream::iter(urls)
            .map(|url| async move {
                match self.fetcher.fetch(url).await {
                    Ok(html) => {
                        debug!(%url, "extracting product");
                        Some(self.extractor.extract(url, &html))
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "skipping product page");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}
