//! Result collection
//!
//! Workers append accepted URLs concurrently; records are immutable once
//! collected and deduplicated by URL. Ordering is left to the output
//! collaborator.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

/// The sitemap specification's limit on URLs per sitemap file. Above this
/// the output collaborator must split into an index plus multiple files.
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// One collected URL, ready for sitemap output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// Absolute, normalized URL
    pub url: String,
    /// Discovery depth from the seed
    pub depth: u32,
    /// Absolute image URLs found on the page (empty unless enabled)
    pub images: Vec<String>,
    pub lastmod: Option<DateTime<Utc>>,
}

impl UrlRecord {
    pub fn new(url: String, depth: u32) -> Self {
        Self {
            url,
            depth,
            images: Vec::new(),
            lastmod: None,
        }
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    seen: HashSet<String>,
    records: Vec<UrlRecord>,
}

/// Thread-safe accumulator for the final record set
#[derive(Debug, Default)]
pub struct ResultCollector {
    state: Mutex<CollectorState>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record unless its URL was already recorded
    pub fn record(&self, record: UrlRecord) -> bool {
        let mut state = self.state.lock().unwrap();
        if !state.seen.insert(record.url.clone()) {
            return false;
        }
        state.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the collected count exceeds the single-sitemap limit
    pub fn exceeds_single_sitemap(&self) -> bool {
        self.len() > MAX_URLS_PER_SITEMAP
    }

    /// Drains the collected records, leaving the collector empty
    pub fn take_records(&self) -> Vec<UrlRecord> {
        std::mem::take(&mut *self.state.lock().unwrap()).records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn records_are_deduplicated_by_url() {
        let collector = ResultCollector::new();
        assert!(collector.record(UrlRecord::new("https://x.com/a".to_string(), 0)));
        assert!(!collector.record(UrlRecord::new("https://x.com/a".to_string(), 2)));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn take_records_drains() {
        let collector = ResultCollector::new();
        collector.record(UrlRecord::new("https://x.com/a".to_string(), 0));
        collector.record(UrlRecord::new("https://x.com/b".to_string(), 1));

        let records = collector.take_records();
        assert_eq!(records.len(), 2);
        assert!(collector.is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_safe() {
        let collector = Arc::new(ResultCollector::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let collector = collector.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    collector.record(UrlRecord::new(
                        format!("https://x.com/{}/{}", worker, i),
                        1,
                    ));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(collector.len(), 800);
    }
}
