use crate::config::types::RawConfig;
use crate::ConfigError;

/// Validates a raw configuration before resolution
///
/// Everything rejected here is fatal at INIT: the run does not start.
pub fn validate(raw: &RawConfig) -> Result<(), ConfigError> {
    validate_domain(raw)?;
    validate_workers(raw)?;
    validate_flags(raw)?;
    Ok(())
}

fn validate_domain(raw: &RawConfig) -> Result<(), ConfigError> {
    match raw.domain.as_deref() {
        None | Some("") => Err(ConfigError::InvalidDomain(
            "a target domain is required".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

fn validate_workers(raw: &RawConfig) -> Result<(), ConfigError> {
    if raw.num_workers == Some(0) {
        return Err(ConfigError::Validation(
            "num-workers must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_flags(raw: &RawConfig) -> Result<(), ConfigError> {
    if raw.sitemap_only.unwrap_or(false) && raw.sitemap_url.is_empty() {
        return Err(ConfigError::ConflictingFlags(
            "sitemap-only requires at least one sitemap-url".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_domain() {
        assert!(validate(&RawConfig::default()).is_err());

        let raw = RawConfig {
            domain: Some(String::new()),
            ..Default::default()
        };
        assert!(validate(&raw).is_err());
    }

    #[test]
    fn validate_accepts_minimal() {
        let raw = RawConfig {
            domain: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn validate_sitemap_only_needs_url() {
        let raw = RawConfig {
            domain: Some("https://example.com".to_string()),
            sitemap_only: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            validate(&raw),
            Err(ConfigError::ConflictingFlags(_))
        ));

        let raw = RawConfig {
            domain: Some("https://example.com".to_string()),
            sitemap_only: Some(true),
            sitemap_url: vec!["https://example.com/sitemap.xml".to_string()],
            ..Default::default()
        };
        assert!(validate(&raw).is_ok());
    }
}
