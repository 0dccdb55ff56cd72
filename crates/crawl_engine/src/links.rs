use crawl_core::ItemUrlSet;
use crawl_logging::crawl_debug;
use scraper::Selector;
use url::Url;

use crate::document::{parse_selector, SelectorError};
use crate::{Document, FetchError, Session};

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("listing request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("no item links found on {listing_url}")]
    NoItems { listing_url: String },
}

/// Which anchors on a listing page count as item links, and how to absolutize them.
#[derive(Debug, Clone)]
pub struct LinkRules {
    base_host: String,
    item_marker: String,
    anchors: Selector,
}

impl LinkRules {
    pub fn new(base_host: &str, item_marker: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            base_host: base_host.trim_end_matches('/').to_string(),
            item_marker: item_marker.to_string(),
            anchors: parse_selector("a[href]")?,
        })
    }

    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// Absolute form of a matching `href`, or `None` when it is not an item link.
    pub fn item_url(&self, href: &str, page_url: Option<&Url>) -> Option<String> {
        let href = href.trim();
        if !href.contains(&self.item_marker) {
            return None;
        }
        // Any leading '/' is appended to the base host verbatim, `//` included.
        if href.starts_with('/') {
            return Some(format!("{}{}", self.base_host, href));
        }
        if Url::parse(href).is_ok() {
            return Some(href.to_string());
        }
        // Remaining relative forms (`item1`, `../x`) follow the page they appear on.
        page_url.and_then(|base| base.join(href).ok()).map(String::from)
    }
}

/// Collects item links from one listing document, first-seen order, no duplicates.
pub fn harvest_item_urls(doc: &Document, rules: &LinkRules) -> ItemUrlSet {
    let page_url = Url::parse(doc.url()).ok();
    let mut urls = ItemUrlSet::new();
    for href in doc.attr_values(&rules.anchors, "href") {
        let Some(absolute) = rules.item_url(href, page_url.as_ref()) else {
            continue;
        };
        match urls.insert(&absolute) {
            Ok(true) => {}
            Ok(false) => crawl_debug!("duplicate item link {}", absolute),
            Err(rejected) => crawl_debug!("skipping item link: {}", rejected),
        }
    }
    urls
}

/// Fetches the listing page through the session and harvests it.
///
/// An empty result is an error: there is nothing to crawl.
pub async fn harvest_listing(
    session: &Session,
    listing_url: &str,
    rules: &LinkRules,
) -> Result<ItemUrlSet, HarvestError> {
    let urls = {
        let listing = session.transport().get_document(listing_url, None).await?;
        harvest_item_urls(&listing, rules)
    };
    if urls.is_empty() {
        return Err(HarvestError::NoItems {
            listing_url: listing_url.to_string(),
        });
    }
    crawl_debug!("listing {} yielded {} item links", listing_url, urls.len());
    Ok(urls)
}
