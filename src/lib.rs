//! Sitemapper: a concurrent sitemap-generating crawler
//!
//! This crate crawls a website (or expands existing sitemap/sitemap-index
//! documents) and collects the discoverable URLs into a set of records that
//! an output writer turns into a sitemap document.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Top-level error type for a crawl run
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("seeding produced no crawlable URLs")]
    EmptySeed,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors; fatal at INIT, the run never starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("conflicting flags: {0}")]
    ConflictingFlags(String),

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Per-URL fetch failures; recorded and skipped, never fatal to the run
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

/// Per-document parse failures; the offending document is skipped
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed HTML: {0}")]
    MalformedHtml(String),

    #[error("malformed XML: {0}")]
    MalformedXml(String),
}

/// Expected filtering outcomes, not errors. A rejected URL is silently
/// excluded from the crawl (counted for reporting).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("URL scheme is not http or https")]
    UnsupportedScheme,

    #[error("host is outside the crawl domain")]
    OutOfScope,

    #[error("file extension is on the skip list")]
    SkippedExtension,

    #[error("URL matches an exclude pattern")]
    ExcludedByPattern,

    #[error("malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{AuthCredentials, CrawlConfig};
pub use crawler::{CrawlOutcome, Crawler, UrlRecord, MAX_URLS_PER_SITEMAP};
