use crate::config::CrawlConfig;
use crate::url::normalize::resolve_candidate;
use crate::Rejected;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// The normalization and filtering pipeline for discovered URLs
///
/// Built once from the resolved config and shared read-only by all workers.
/// The pipeline order is: resolve/canonicalize, scope check, skip-extension
/// check, exclude patterns, then drop rewriting. Exclude is checked before
/// drop so that rejection short-circuits any rewriting.
#[derive(Debug)]
pub struct UrlFilter {
    target_host: String,
    target_port: Option<u16>,
    skip_extensions: HashSet<String>,
    exclude_patterns: Vec<Regex>,
    drop_patterns: Vec<Regex>,
}

impl UrlFilter {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            target_host: config.target_host().to_string(),
            target_port: config.target_port(),
            skip_extensions: config.skip_extensions.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
            drop_patterns: config.drop_patterns.clone(),
        }
    }

    /// Full pipeline for links discovered on HTML pages
    ///
    /// Returns the normalized URL string, or the reason the link is out of
    /// the crawl. Pure over its inputs and the static configuration.
    pub fn normalize(&self, raw: &str, base: Option<&Url>) -> Result<String, Rejected> {
        let url = resolve_candidate(raw, base)?;
        self.check_scope(&url)?;
        self.check_extension(&url)?;
        self.check_exclude(url.as_str())?;
        Ok(self.apply_drops(url.as_str()))
    }

    /// Scope and exclude checks only, for image references
    ///
    /// Images keep their extension (a skip list of `jpg` must not strip a
    /// page's images) and are never drop-rewritten.
    pub fn normalize_image(&self, raw: &str, base: Option<&Url>) -> Result<String, Rejected> {
        let url = resolve_candidate(raw, base)?;
        self.check_scope(&url)?;
        self.check_exclude(url.as_str())?;
        Ok(url.into())
    }

    /// Well-formedness and exclude checks only, for sitemap-authored entries
    ///
    /// The site operator authored these URLs, so they are not re-validated
    /// against the domain scope.
    pub fn normalize_sitemap_entry(&self, raw: &str) -> Result<String, Rejected> {
        let url = resolve_candidate(raw, None)?;
        self.check_exclude(url.as_str())?;
        Ok(url.into())
    }

    fn check_scope(&self, url: &Url) -> Result<(), Rejected> {
        let in_scope = url.host_str() == Some(self.target_host.as_str())
            && url.port_or_known_default() == self.target_port;

        if in_scope {
            Ok(())
        } else {
            Err(Rejected::OutOfScope)
        }
    }

    fn check_extension(&self, url: &Url) -> Result<(), Rejected> {
        if let Some(ext) = path_extension(url.path()) {
            if self.skip_extensions.contains(&ext.to_lowercase()) {
                return Err(Rejected::SkippedExtension);
            }
        }
        Ok(())
    }

    fn check_exclude(&self, url: &str) -> Result<(), Rejected> {
        if self.exclude_patterns.iter().any(|re| re.is_match(url)) {
            Err(Rejected::ExcludedByPattern)
        } else {
            Ok(())
        }
    }

    /// Applies the drop patterns in configured order, each operating on the
    /// previous pattern's output; every match is removed from the URL.
    fn apply_drops(&self, url: &str) -> String {
        self.drop_patterns.iter().fold(url.to_string(), |acc, re| {
            re.replace_all(&acc, "").into_owned()
        })
    }
}

/// Suffix after the last `.` in the final path segment, if any
fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
