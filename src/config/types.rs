use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Basic-auth credentials sent with every fetch when configured
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCredentials {
    pub username: String,
    pub password: String,
}

/// Raw, unvalidated configuration
///
/// This is the shape of the JSON config file; the binary builds the same
/// structure from CLI flags and merges the two with [`RawConfig::merged_over`].
/// Field names match the CLI flag names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Target domain, e.g. "https://blog.example.com"
    pub domain: Option<String>,

    /// File extensions to skip (without the dot)
    pub skipext: Vec<String>,

    /// Regex patterns; a matching URL is rejected outright
    pub exclude: Vec<String>,

    /// Regex patterns; the matched substring is removed from the URL
    pub drop: Vec<String>,

    #[serde(rename = "num-workers", alias = "num_workers")]
    pub num_workers: Option<usize>,

    pub parserobots: Option<bool>,

    #[serde(rename = "user-agent", alias = "user_agent")]
    pub user_agent: Option<String>,

    pub images: Option<bool>,

    /// Sitemap or sitemap-index URLs to expand
    #[serde(rename = "sitemap-url", alias = "sitemap_url")]
    pub sitemap_url: Vec<String>,

    #[serde(rename = "sitemap-only", alias = "sitemap_only")]
    pub sitemap_only: Option<bool>,

    /// Whether XML responses discovered mid-crawl are expanded as sitemaps
    #[serde(rename = "follow-sitemaps", alias = "follow_sitemaps")]
    pub follow_sitemaps: Option<bool>,

    #[serde(rename = "timeout-secs", alias = "timeout_secs")]
    pub timeout_secs: Option<u64>,

    #[serde(rename = "max-depth", alias = "max_depth")]
    pub max_depth: Option<u32>,

    pub auth: Option<AuthCredentials>,
}

impl RawConfig {
    /// Merges `self` (CLI flags) over `base` (config file values).
    ///
    /// Scalar options from `self` win when set; list-valued options are
    /// additive across both sources.
    pub fn merged_over(self, base: RawConfig) -> RawConfig {
        let mut skipext = base.skipext;
        skipext.extend(self.skipext);
        let mut exclude = base.exclude;
        exclude.extend(self.exclude);
        let mut drop = base.drop;
        drop.extend(self.drop);
        let mut sitemap_url = base.sitemap_url;
        sitemap_url.extend(self.sitemap_url);

        RawConfig {
            domain: self.domain.or(base.domain),
            skipext,
            exclude,
            drop,
            num_workers: self.num_workers.or(base.num_workers),
            parserobots: self.parserobots.or(base.parserobots),
            user_agent: self.user_agent.or(base.user_agent),
            images: self.images.or(base.images),
            sitemap_url,
            sitemap_only: self.sitemap_only.or(base.sitemap_only),
            follow_sitemaps: self.follow_sitemaps.or(base.follow_sitemaps),
            timeout_secs: self.timeout_secs.or(base.timeout_secs),
            max_depth: self.max_depth.or(base.max_depth),
            auth: self.auth.or(base.auth),
        }
    }
}

/// Immutable resolved configuration for one crawl run
///
/// Owned by the orchestrator and shared read-only with every worker.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Start URL; its host (and port) anchor the crawl scope
    pub domain: Url,

    /// Sitemap or sitemap-index URLs to expand
    pub sitemap_urls: Vec<Url>,

    /// Only expand sitemaps, never crawl HTML pages
    pub sitemap_only: bool,

    /// Expand XML responses discovered during an HTML crawl as sitemaps
    pub follow_sitemaps: bool,

    /// Lowercased extensions whose URLs are rejected
    pub skip_extensions: HashSet<String>,

    /// Checked before drop rewriting; a match rejects the URL
    pub exclude_patterns: Vec<Regex>,

    /// Applied in order, each on the previous pattern's output
    pub drop_patterns: Vec<Regex>,

    /// Collect image references into the records
    pub images_enabled: bool,

    /// Fetch and honor robots.txt
    pub parse_robots: bool,

    /// Sent as the User-Agent header and used for robots.txt group matching
    pub user_agent: String,

    pub max_workers: usize,

    /// Optional safeguard; discovery deeper than this is not enqueued
    pub max_depth: Option<u32>,

    pub request_timeout: Duration,

    pub auth: Option<AuthCredentials>,
}

impl CrawlConfig {
    /// Host of the crawl target
    pub fn target_host(&self) -> &str {
        self.domain.host_str().unwrap_or_default()
    }

    /// Port of the crawl target, falling back to the scheme default
    pub fn target_port(&self) -> Option<u16> {
        self.domain.port_or_known_default()
    }

    /// robots.txt location for the crawl domain
    pub fn robots_url(&self) -> Url {
        let mut url = self.domain.clone();
        url.set_path("/robots.txt");
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_cli_overrides_file_scalars() {
        let file = RawConfig {
            domain: Some("https://file.example.com".to_string()),
            num_workers: Some(2),
            ..Default::default()
        };
        let cli = RawConfig {
            num_workers: Some(8),
            ..Default::default()
        };

        let merged = cli.merged_over(file);
        assert_eq!(merged.domain.as_deref(), Some("https://file.example.com"));
        assert_eq!(merged.num_workers, Some(8));
    }

    #[test]
    fn merge_lists_are_additive() {
        let file = RawConfig {
            skipext: vec!["pdf".to_string()],
            exclude: vec!["action=edit".to_string()],
            ..Default::default()
        };
        let cli = RawConfig {
            skipext: vec!["xml".to_string()],
            ..Default::default()
        };

        let merged = cli.merged_over(file);
        assert_eq!(merged.skipext, vec!["pdf", "xml"]);
        assert_eq!(merged.exclude, vec!["action=edit"]);
    }

    #[test]
    fn file_config_parses_from_json() {
        let json = r#"{
            "domain": "https://blog.example.com",
            "skipext": ["pdf", "doc"],
            "num-workers": 4,
            "parserobots": true,
            "auth": {"username": "u", "password": "p"}
        }"#;

        let raw: RawConfig = serde_json::from_str(json).unwrap();
        assert_eq!(raw.domain.as_deref(), Some("https://blog.example.com"));
        assert_eq!(raw.skipext.len(), 2);
        assert_eq!(raw.num_workers, Some(4));
        assert_eq!(raw.parserobots, Some(true));
        assert_eq!(raw.auth.unwrap().username, "u");
    }

    #[test]
    fn robots_url_is_rooted_at_host() {
        let config = super::super::parser::resolve(RawConfig {
            domain: Some("https://blog.example.com/section/".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            config.robots_url().as_str(),
            "https://blog.example.com/robots.txt"
        );
    }
}
