//! Crawl counters for the end-of-run report

use crate::FetchError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Counters gathered over one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Pages actually fetched (2xx responses)
    pub pages_fetched: u64,
    /// Records handed to the collector
    pub urls_collected: u64,
    /// URLs denied by robots.txt
    pub blocked_by_robots: u64,
    /// URLs rejected by the filter pipeline
    pub excluded: u64,
    pub fetch_errors: u64,
    pub parse_errors: u64,
    /// HTTP response code histogram, errors included
    pub response_codes: HashMap<u16, u64>,
}

/// Shared, worker-safe wrapper around [`CrawlStats`]
#[derive(Debug, Default)]
pub struct SharedStats {
    inner: Mutex<CrawlStats>,
}

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_response(&self, status: u16) {
        let mut stats = self.inner.lock().unwrap();
        stats.pages_fetched += 1;
        *stats.response_codes.entry(status).or_insert(0) += 1;
    }

    pub fn record_fetch_error(&self, error: &FetchError) {
        let mut stats = self.inner.lock().unwrap();
        stats.fetch_errors += 1;
        if let FetchError::HttpStatus { status, .. } = error {
            *stats.response_codes.entry(*status).or_insert(0) += 1;
        }
    }

    pub fn record_parse_error(&self) {
        self.inner.lock().unwrap().parse_errors += 1;
    }

    pub fn record_blocked(&self) {
        self.inner.lock().unwrap().blocked_by_robots += 1;
    }

    pub fn record_excluded(&self) {
        self.inner.lock().unwrap().excluded += 1;
    }

    pub fn snapshot(&self) -> CrawlStats {
        self.inner.lock().unwrap().clone()
    }
}
