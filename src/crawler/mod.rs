//! Crawler module
//!
//! Contains the core crawling machinery: the shared frontier/visited set,
//! the HTTP fetcher, the HTML and sitemap parsers, the result collector and
//! the coordinator that ties them into a worker-pool crawl loop.

mod collector;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod sitemap;
mod stats;

pub use collector::{ResultCollector, UrlRecord, MAX_URLS_PER_SITEMAP};
pub use coordinator::{crawl, CancelHandle, CrawlOutcome, CrawlPhase, Crawler};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use frontier::{EntryKind, Frontier, FrontierEntry};
pub use parser::{extract, ExtractedContent};
pub use sitemap::{is_sitemap_payload, parse_sitemap, SitemapDoc, SitemapEntry};
pub use stats::{CrawlStats, SharedStats};
