//! HTTP fetcher
//!
//! One shared client per run, built with the configured user-agent and
//! timeouts. Failures are classified into the per-URL [`FetchError`]
//! taxonomy; nothing here is fatal to the crawl.

use crate::config::{AuthCredentials, CrawlConfig};
use crate::FetchError;
use chrono::{DateTime, Utc};
use reqwest::header;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successfully fetched response
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code (always 2xx here)
    pub status: u16,
    /// Content-Type header value, empty when absent
    pub content_type: String,
    pub body: String,
    /// Last-Modified header, falling back to Date
    pub last_modified: Option<DateTime<Utc>>,
}

/// Builds the shared HTTP client for a crawl run
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs one GET and classifies the outcome
///
/// Non-2xx statuses and transport errors come back uniformly as
/// [`FetchError`]; the caller records the failure and moves on.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    auth: Option<&AuthCredentials>,
) -> Result<FetchedPage, FetchError> {
    let mut request = client.get(url);
    if let Some(auth) = auth {
        request = request.basic_auth(&auth.username, Some(&auth.password));
    }

    let response = request.send().await.map_err(|e| classify(e, url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let final_url = response.url().clone();

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let last_modified = response
        .headers()
        .get(header::LAST_MODIFIED)
        .or_else(|| response.headers().get(header::DATE))
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date);

    let body = response.text().await.map_err(|e| classify(e, url))?;

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
        last_modified,
    })
}

fn classify(error: reqwest::Error, url: &str) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::ConnectionFailed {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Parses an HTTP date header value (RFC 2822 with GMT zone)
pub(crate) fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
