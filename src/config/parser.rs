use crate::config::types::{CrawlConfig, RawConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default per-request timeout; a fetch must never hang a worker indefinitely
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Loads a raw configuration from a JSON file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemapper::config::load_raw_config;
///
/// let raw = load_raw_config(Path::new("config.json")).unwrap();
/// ```
pub fn load_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let raw: RawConfig = serde_json::from_str(&content)?;
    Ok(raw)
}

/// Resolves a raw configuration into an immutable [`CrawlConfig`]
///
/// Validates everything that is fatal at INIT (missing/invalid domain,
/// conflicting flags, zero workers) and compiles the exclude/drop patterns.
pub fn resolve(raw: RawConfig) -> Result<CrawlConfig, ConfigError> {
    validate(&raw)?;

    let domain = parse_http_url(raw.domain.as_deref().unwrap_or_default())?;

    let sitemap_urls = raw
        .sitemap_url
        .iter()
        .map(|s| parse_http_url(s))
        .collect::<Result<Vec<_>, _>>()?;

    let exclude_patterns = compile_patterns(&raw.exclude)?;
    let drop_patterns = compile_patterns(&raw.drop)?;

    let skip_extensions = raw
        .skipext
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    Ok(CrawlConfig {
        domain,
        sitemap_urls,
        sitemap_only: raw.sitemap_only.unwrap_or(false),
        follow_sitemaps: raw.follow_sitemaps.unwrap_or(true),
        skip_extensions,
        exclude_patterns,
        drop_patterns,
        images_enabled: raw.images.unwrap_or(false),
        parse_robots: raw.parserobots.unwrap_or(false),
        user_agent: raw.user_agent.unwrap_or_else(|| "*".to_string()),
        max_workers: raw.num_workers.unwrap_or(1),
        max_depth: raw.max_depth,
        request_timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        auth: raw.auth,
    })
}

fn parse_http_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|e| ConfigError::InvalidDomain(format!("'{}': {}", s, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidDomain(format!(
            "'{}': scheme must be http or https",
            s
        )));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidDomain(format!("'{}': missing host", s)));
    }

    Ok(url)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn raw_with_domain(domain: &str) -> RawConfig {
        RawConfig {
            domain: Some(domain.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_minimal_config() {
        let config = resolve(raw_with_domain("https://blog.example.com")).unwrap();

        assert_eq!(config.target_host(), "blog.example.com");
        assert_eq!(config.target_port(), Some(443));
        assert_eq!(config.max_workers, 1);
        assert!(!config.sitemap_only);
        assert!(config.follow_sitemaps);
        assert_eq!(config.user_agent, "*");
    }

    #[test]
    fn resolve_rejects_missing_domain() {
        let result = resolve(RawConfig::default());
        assert!(matches!(result, Err(ConfigError::InvalidDomain(_))));
    }

    #[test]
    fn resolve_rejects_non_http_scheme() {
        let result = resolve(raw_with_domain("ftp://example.com"));
        assert!(matches!(result, Err(ConfigError::InvalidDomain(_))));
    }

    #[test]
    fn resolve_rejects_zero_workers() {
        let mut raw = raw_with_domain("https://example.com");
        raw.num_workers = Some(0);
        let result = resolve(raw);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn resolve_rejects_sitemap_only_without_sitemap_url() {
        let mut raw = raw_with_domain("https://example.com");
        raw.sitemap_only = Some(true);
        let result = resolve(raw);
        assert!(matches!(result, Err(ConfigError::ConflictingFlags(_))));
    }

    #[test]
    fn resolve_rejects_bad_pattern() {
        let mut raw = raw_with_domain("https://example.com");
        raw.exclude = vec!["[unclosed".to_string()];
        let result = resolve(raw);
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn skip_extensions_are_lowercased_and_dotless() {
        let mut raw = raw_with_domain("https://example.com");
        raw.skipext = vec![".PDF".to_string(), "Xml".to_string()];
        let config = resolve(raw).unwrap();

        assert!(config.skip_extensions.contains("pdf"));
        assert!(config.skip_extensions.contains("xml"));
    }

    #[test]
    fn load_raw_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"domain": "https://example.com", "exclude": ["\\?replytocom="]}"#)
            .unwrap();
        file.flush().unwrap();

        let raw = load_raw_config(file.path()).unwrap();
        assert_eq!(raw.domain.as_deref(), Some("https://example.com"));
        assert_eq!(raw.exclude.len(), 1);
    }

    #[test]
    fn load_raw_config_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json {{{").unwrap();
        file.flush().unwrap();

        let result = load_raw_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
