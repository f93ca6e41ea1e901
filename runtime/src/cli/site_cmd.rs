//! `sitewalk site <name>`: discover the pages of a configured site and
//! optionally extract products from them.

use crate::cartography::discovery::SiteDiscoverer;
use crate::cli::output::{self, Styled};
use crate::config::site::SiteConfig;
use crate::config::RuntimeConfig;
use crate::extraction::product::{Product, ProductExtractor, ProductScraper};
use anyhow::{Context, Result};

/// Options for the site command.
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
    pub agent: Option<String>,
    /// Fetch discovered pages and apply the site's selectors.
    pub extract: bool,
    /// Extract from at most this many pages.
    pub limit: Option<usize>,
}

/// Run the site command.
pub async fn run(name: &str, options: &SiteOptions, config: &RuntimeConfig) -> Result<()> {
    let s = Styled::new();
    let site = SiteConfig::load(&config.sites_dir, name)?;
    let agent = options.agent.as_deref();

    // Compile selectors before any network work so bad configs fail fast.
    let extractor = if options.extract {
        let extractor = ProductExtractor::new(&site.selectors)
            .with_context(|| format!("site '{}' has an invalid selector", site.name))?;
        Some(extractor)
    } else {
        None
    };

    if site.dynamic_content && !output::is_quiet() && !output::is_json() {
        eprintln!(
            "  {} {} renders content dynamically; static extraction may miss fields.",
            s.warn_sym(),
            site.name
        );
    }

    let (fetcher, resolver) = super::build_resolver(config)?;
    let discoverer = SiteDiscoverer::new(fetcher.clone(), resolver);
    let discovery = discoverer.discover(&site.base_url, agent).await?;

    let products = match extractor {
        Some(extractor) => {
            let urls: Vec<String> = discovery
                .urls
                .iter()
                .take(options.limit.unwrap_or(usize::MAX))
                .map(|u| u.loc.clone())
                .collect();
            let scraper =
                ProductScraper::new(fetcher, extractor, config.resolve.max_concurrent_fetches);
            Some(scraper.scrape(&urls).await)
        }
        None => None,
    };

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "site": site,
            "discovery": discovery,
            "products": products,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        output::print_header(&s);
        output::print_field("site", &s.bold(&site.name));
        output::print_field("base", &site.base_url);
    }

    match products {
        Some(products) => print_products(&s, &products),
        None => super::discover_cmd::print_discovery(&s, &discovery, agent),
    }
    Ok(())
}

fn print_products(s: &Styled, products: &[Product]) {
    for product in products {
        println!("{}", product_line(product));
    }
    if !output::is_quiet() {
        eprintln!();
        eprintln!("  {} {} products extracted", s.ok_sym(), products.len());
    }
}

fn product_line(product: &Product) -> String {
    let price = product
        .price
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\t{}",
        product.url,
        product.name.as_deref().unwrap_or("-"),
        price
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_line() {
        let product = Product {
            url: "https://shop.example/disc".into(),
            name: Some("Buzzz".into()),
            price: Some(199.0),
            ..Product::default()
        };
        assert_eq!(product_line(&product), "https://shop.example/disc\tBuzzz\t199.00");

        let bare = Product {
            url: "https://shop.example/x".into(),
            ..Product::default()
        };
        assert_eq!(product_line(&bare), "https://shop.example/x\t-\t-");
    }
}
