//! robots.txt handling
//!
//! The policy is fetched once per run from `<scheme>://<host>/robots.txt`.
//! Any failure to fetch or read it degrades to an allow-all policy with a
//! warning; robots problems are never fatal to the crawl.

mod parser;

pub use parser::RobotsPolicy;

use reqwest::Client;
use url::Url;

/// Fetches and parses robots.txt for the crawl domain
///
/// Non-200 responses, transport errors and unreadable bodies all produce an
/// allow-all policy.
pub async fn load(client: &Client, robots_url: &Url, user_agent: &str) -> RobotsPolicy {
    let response = match client.get(robots_url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("robots.txt fetch failed for {}: {}", robots_url, e);
            return RobotsPolicy::allow_all(user_agent);
        }
    };

    if !response.status().is_success() {
        tracing::warn!(
            "robots.txt at {} returned HTTP {}, allowing all",
            robots_url,
            response.status().as_u16()
        );
        return RobotsPolicy::allow_all(user_agent);
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::from_content(&body, user_agent),
        Err(e) => {
            tracing::warn!("robots.txt body unreadable for {}: {}", robots_url, e);
            RobotsPolicy::allow_all(user_agent)
        }
    }
}
