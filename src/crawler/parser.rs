//! HTML link and image extraction
//!
//! Parsing is best-effort: `scraper` recovers at the element level, so
//! malformed markup never aborts extraction. The extractor resolves
//! candidates to absolute URLs but applies no crawl filtering; that is the
//! caller's job.

use crate::url::resolve_candidate;
use scraper::{Html, Selector};
use url::Url;

/// Links and image references found on one page, as absolute URLs
#[derive(Debug, Default)]
pub struct ExtractedContent {
    pub links: Vec<String>,
    pub images: Vec<String>,
}

/// Extracts anchor targets (and image sources when enabled) from HTML
pub fn extract(html: &str, base_url: &Url, images_enabled: bool) -> ExtractedContent {
    let document = Html::parse_document(html);
    let mut content = ExtractedContent::default();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Ok(url) = resolve_candidate(href, Some(base_url)) {
                    content.links.push(url.into());
                }
            }
        }
    }

    if images_enabled {
        if let Ok(image_selector) = Selector::parse("img[src]") {
            for element in document.select(&image_selector) {
                if let Some(src) = element.value().attr("src") {
                    if let Ok(url) = resolve_candidate(src, Some(base_url)) {
                        content.images.push(url.into());
                    }
                }
            }
        }
    }

    content
}
