//! Crawl orchestration
//!
//! The [`Crawler`] ties the frontier, fetcher, parsers and collector into a
//! worker-pool crawl loop. A run moves through the phases
//! `Init -> Seeding -> Running -> Draining -> Done`; seeding failures end the
//! run as `Failed` before any worker starts. Per-entry fetch and parse
//! failures are counted and skipped, never fatal.

use crate::config::CrawlConfig;
use crate::crawler::collector::{ResultCollector, UrlRecord};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchedPage};
use crate::crawler::frontier::{EntryKind, Frontier, FrontierEntry};
use crate::crawler::parser::extract;
use crate::crawler::sitemap::{is_sitemap_payload, parse_sitemap, SitemapDoc};
use crate::crawler::stats::{CrawlStats, SharedStats};
use crate::robots::{self, RobotsPolicy};
use crate::url::{resolve_candidate, UrlFilter};
use crate::{CrawlError, Rejected};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Resources that are listed in the sitemap without being fetched; their
/// content cannot yield further links.
const UNFETCHED_EXTENSIONS: &[&str] = &[
    "epub", "mobi", "xlsx", "docx", "doc", "opf", "7z", "ibooks", "cbr", "avi", "mkv", "mp4",
    "jpg", "jpeg", "png", "gif", "iso", "rar", "tar", "tgz", "zip", "dmg", "exe", "pdf",
];

/// Phases of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Init,
    Seeding,
    Running,
    Draining,
    Done,
    Failed,
}

/// Finalized result of a crawl run
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Collected records, unordered; sorting is the output writer's business
    pub records: Vec<UrlRecord>,
    pub stats: CrawlStats,
}

impl CrawlOutcome {
    /// Whether the record count exceeds the single-sitemap limit
    pub fn exceeds_single_sitemap(&self) -> bool {
        self.records.len() > crate::crawler::collector::MAX_URLS_PER_SITEMAP
    }
}

/// Cancels a running crawl from outside the worker pool
///
/// Workers finish their current entry and exit; the collector keeps whatever
/// was recorded up to that point.
#[derive(Clone)]
pub struct CancelHandle {
    frontier: Arc<Frontier>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.frontier.cancel();
    }
}

/// The crawl orchestrator
pub struct Crawler {
    config: Arc<CrawlConfig>,
    filter: Arc<UrlFilter>,
    frontier: Arc<Frontier>,
    collector: Arc<ResultCollector>,
    stats: Arc<SharedStats>,
    client: Client,
    phase: CrawlPhase,
}

/// Everything a worker task needs, shared by reference
#[derive(Clone)]
struct WorkerContext {
    id: usize,
    config: Arc<CrawlConfig>,
    filter: Arc<UrlFilter>,
    frontier: Arc<Frontier>,
    collector: Arc<ResultCollector>,
    stats: Arc<SharedStats>,
    robots: Option<Arc<RobotsPolicy>>,
    client: Client,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let client = build_http_client(&config)?;
        let filter = Arc::new(UrlFilter::from_config(&config));

        Ok(Self {
            config: Arc::new(config),
            filter,
            frontier: Arc::new(Frontier::new()),
            collector: Arc::new(ResultCollector::new()),
            stats: Arc::new(SharedStats::new()),
            client,
            phase: CrawlPhase::Init,
        })
    }

    /// Handle for interrupting the run (e.g. from a ctrl-c listener)
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            frontier: self.frontier.clone(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion (or cancellation) and returns the
    /// collected records with the run's counters.
    pub async fn run(mut self) -> Result<CrawlOutcome, CrawlError> {
        self.enter_phase(CrawlPhase::Seeding);
        if let Err(e) = self.seed() {
            self.enter_phase(CrawlPhase::Failed);
            return Err(e);
        }

        let robots = if self.config.parse_robots {
            let policy = robots::load(
                &self.client,
                &self.config.robots_url(),
                &self.config.user_agent,
            )
            .await;
            Some(Arc::new(policy))
        } else {
            None
        };

        self.enter_phase(CrawlPhase::Running);
        let mut workers = Vec::with_capacity(self.config.max_workers);
        for id in 0..self.config.max_workers {
            let ctx = WorkerContext {
                id,
                config: self.config.clone(),
                filter: self.filter.clone(),
                frontier: self.frontier.clone(),
                collector: self.collector.clone(),
                stats: self.stats.clone(),
                robots: robots.clone(),
                client: self.client.clone(),
            };
            workers.push(tokio::spawn(worker_loop(ctx)));
        }

        self.enter_phase(CrawlPhase::Draining);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("worker task failed: {}", e);
            }
        }

        self.enter_phase(CrawlPhase::Done);
        if self.frontier.is_cancelled() {
            tracing::info!("crawl cancelled, returning partial results");
        }

        let records = self.collector.take_records();
        let mut stats = self.stats.snapshot();
        stats.urls_collected = records.len() as u64;

        tracing::info!(
            "crawl finished: {} URLs collected, {} pages fetched",
            records.len(),
            stats.pages_fetched
        );

        Ok(CrawlOutcome { records, stats })
    }

    /// Pushes the initial frontier entries
    ///
    /// Sitemap URLs are enqueued as sitemap-kind entries; their concrete form
    /// (index vs urlset) is only known after the first fetch. In normal mode
    /// the domain itself seeds an HTML entry.
    fn seed(&self) -> Result<(), CrawlError> {
        let mut seeded = 0usize;

        for sitemap_url in &self.config.sitemap_urls {
            match resolve_candidate(sitemap_url.as_str(), None) {
                Ok(url) => {
                    if self.frontier.push(FrontierEntry {
                        url: url.into(),
                        depth: 0,
                        kind: EntryKind::Sitemap,
                    }) {
                        seeded += 1;
                    }
                }
                Err(e) => tracing::warn!("skipping seed sitemap {}: {}", sitemap_url, e),
            }
        }

        if !self.config.sitemap_only {
            match self.filter.normalize(self.config.domain.as_str(), None) {
                Ok(url) => {
                    if self.frontier.push(FrontierEntry {
                        url,
                        depth: 0,
                        kind: EntryKind::Html,
                    }) {
                        seeded += 1;
                    }
                }
                Err(e) => tracing::warn!("start URL {} filtered out: {}", self.config.domain, e),
            }
        }

        if seeded == 0 {
            return Err(CrawlError::EmptySeed);
        }

        tracing::info!("seeded {} start URLs", seeded);
        Ok(())
    }

    fn enter_phase(&mut self, phase: CrawlPhase) {
        tracing::debug!(?phase, "crawl phase");
        self.phase = phase;
    }
}

/// Convenience entry point: build a crawler and run it
pub async fn crawl(config: CrawlConfig) -> Result<CrawlOutcome, CrawlError> {
    Crawler::new(config)?.run().await
}

async fn worker_loop(ctx: WorkerContext) {
    tracing::debug!(worker = ctx.id, "worker started");

    while let Some(entry) = ctx.frontier.pop().await {
        tracing::debug!(worker = ctx.id, url = %entry.url, "processing");
        process_entry(&ctx, &entry).await;
        ctx.frontier.task_done();
    }

    tracing::debug!(worker = ctx.id, "worker exiting");
}

async fn process_entry(ctx: &WorkerContext, entry: &FrontierEntry) {
    match entry.kind {
        EntryKind::Html => process_html(ctx, entry).await,
        // Both sitemap kinds go through the same path: the document decides
        // whether it is an index, so listed children are re-examined here.
        EntryKind::Sitemap | EntryKind::SitemapIndex => process_sitemap(ctx, entry).await,
    }
}

async fn process_html(ctx: &WorkerContext, entry: &FrontierEntry) {
    if let Some(robots) = &ctx.robots {
        if !robots.is_allowed(&entry.url) {
            tracing::debug!("{} disallowed by robots.txt", entry.url);
            ctx.stats.record_blocked();
            return;
        }
    }

    // Binary resources are listed without being fetched
    if has_unfetched_extension(&entry.url) {
        tracing::debug!("{} recorded without fetching", entry.url);
        ctx.collector
            .record(UrlRecord::new(entry.url.clone(), entry.depth));
        return;
    }

    let page = match fetch_page(&ctx.client, &entry.url, ctx.config.auth.as_ref()).await {
        Ok(page) => page,
        Err(e) => {
            tracing::debug!("fetch failed: {}", e);
            ctx.stats.record_fetch_error(&e);
            return;
        }
    };
    ctx.stats.record_response(page.status);

    // A redirect that left the target host takes the URL out of the crawl
    if page.final_url.host_str() != Some(ctx.config.target_host())
        || page.final_url.port_or_known_default() != ctx.config.target_port()
    {
        tracing::info!("{} redirected off-host to {}", entry.url, page.final_url);
        return;
    }

    // Some "pages" turn out to be sitemaps (e.g. a link to sitemap.xml)
    if ctx.config.follow_sitemaps && is_sitemap_payload(&page.content_type, &entry.url) {
        handle_sitemap_document(ctx, entry, &page.body);
        return;
    }

    let extracted = extract(&page.body, &page.final_url, ctx.config.images_enabled);

    let mut images = Vec::new();
    if ctx.config.images_enabled {
        let mut seen = HashSet::new();
        for raw in &extracted.images {
            if let Ok(image) = ctx.filter.normalize_image(raw, Some(&page.final_url)) {
                if seen.insert(image.clone()) {
                    images.push(image);
                }
            }
        }
    }

    ctx.collector.record(UrlRecord {
        url: entry.url.clone(),
        depth: entry.depth,
        images,
        lastmod: page.last_modified,
    });

    enqueue_links(ctx, entry, &page, &extracted.links);
}

fn enqueue_links(
    ctx: &WorkerContext,
    entry: &FrontierEntry,
    page: &FetchedPage,
    links: &[String],
) {
    let child_depth = entry.depth + 1;
    if let Some(limit) = ctx.config.max_depth {
        if child_depth > limit {
            tracing::debug!("not expanding {} past depth {}", entry.url, limit);
            return;
        }
    }

    for raw in links {
        match ctx.filter.normalize(raw, Some(&page.final_url)) {
            Ok(url) => {
                ctx.frontier.push(FrontierEntry {
                    url,
                    depth: child_depth,
                    kind: EntryKind::Html,
                });
            }
            // Unparseable or non-http links are noise, not exclusions
            Err(Rejected::Malformed(_)) | Err(Rejected::UnsupportedScheme) => {}
            Err(reason) => {
                tracing::debug!("{} rejected: {}", raw, reason);
                ctx.stats.record_excluded();
            }
        }
    }
}

async fn process_sitemap(ctx: &WorkerContext, entry: &FrontierEntry) {
    let page = match fetch_page(&ctx.client, &entry.url, ctx.config.auth.as_ref()).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("sitemap fetch failed: {}", e);
            ctx.stats.record_fetch_error(&e);
            return;
        }
    };
    ctx.stats.record_response(page.status);

    handle_sitemap_document(ctx, entry, &page.body);
}

fn handle_sitemap_document(ctx: &WorkerContext, entry: &FrontierEntry, body: &str) {
    let doc = match parse_sitemap(body) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("skipping sitemap {}: {}", entry.url, e);
            ctx.stats.record_parse_error();
            return;
        }
    };

    match doc {
        SitemapDoc::Index { children } => {
            tracing::info!("sitemap index at {} lists {} sitemaps", entry.url, children.len());
            let child_depth = entry.depth + 1;
            if let Some(limit) = ctx.config.max_depth {
                if child_depth > limit {
                    tracing::debug!("not expanding index {} past depth {}", entry.url, limit);
                    return;
                }
            }
            for child in children {
                match resolve_candidate(&child, None) {
                    Ok(url) => {
                        ctx.frontier.push(FrontierEntry {
                            url: url.into(),
                            depth: child_depth,
                            kind: EntryKind::Sitemap,
                        });
                    }
                    Err(e) => tracing::debug!("bad child sitemap URL {}: {}", child, e),
                }
            }
        }

        SitemapDoc::UrlSet { entries } => {
            tracing::info!("sitemap at {} lists {} URLs", entry.url, entries.len());
            for sitemap_entry in entries {
                // Operator-authored URLs skip the domain-scope check
                match ctx.filter.normalize_sitemap_entry(&sitemap_entry.loc) {
                    Ok(url) => {
                        // Keep an HTML-mode crawl from re-fetching what the
                        // sitemap already vouched for
                        ctx.frontier.mark_visited(&url);
                        ctx.collector.record(UrlRecord {
                            url,
                            depth: entry.depth,
                            images: Vec::new(),
                            lastmod: sitemap_entry.lastmod,
                        });
                    }
                    Err(Rejected::ExcludedByPattern) => ctx.stats.record_excluded(),
                    Err(e) => tracing::debug!("bad sitemap entry {}: {}", sitemap_entry.loc, e),
                }
            }
        }
    }
}

fn has_unfetched_extension(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_lowercase();
    UNFETCHED_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(&format!(".{}", ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, RawConfig};

    fn config_for(domain: &str) -> CrawlConfig {
        resolve(RawConfig {
            domain: Some(domain.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn unfetched_extension_detection() {
        assert!(has_unfetched_extension("https://x.com/report.pdf"));
        assert!(has_unfetched_extension("https://x.com/archive.tar"));
        assert!(has_unfetched_extension("https://x.com/Image.JPG"));
        assert!(!has_unfetched_extension("https://x.com/page.html"));
        assert!(!has_unfetched_extension("https://x.com/page"));
    }

    #[test]
    fn new_crawler_starts_in_init() {
        let crawler = Crawler::new(config_for("https://example.com")).unwrap();
        assert_eq!(crawler.phase(), CrawlPhase::Init);
    }

    #[tokio::test]
    async fn cancelled_before_seed_consumption_yields_empty_outcome() {
        let crawler = Crawler::new(config_for("https://example.com")).unwrap();
        let handle = crawler.cancel_handle();
        handle.cancel();

        // Seeding onto a cancelled frontier pushes nothing
        let result = crawler.run().await;
        assert!(matches!(result, Err(CrawlError::EmptySeed)));
    }

    // End-to-end crawl behavior is exercised in tests/crawl_tests.rs against
    // wiremock servers.
}
