use crate::Rejected;
use url::Url;

/// Resolves raw link text to a canonical absolute URL
///
/// `raw` is resolved against `base` when given (relative links), otherwise it
/// must already be absolute. The fragment is stripped; the `url` crate
/// lowercases the scheme and host and omits default ports on serialization,
/// so the result is in canonical form. Running the result through this
/// function again yields the same URL.
///
/// # Examples
///
/// ```
/// use sitemapper::url::resolve_candidate;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/section/page").unwrap();
/// let url = resolve_candidate("../other#intro", Some(&base)).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/other");
/// ```
pub fn resolve_candidate(raw: &str, base: Option<&Url>) -> Result<Url, Rejected> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(Rejected::Malformed("empty link".to_string()));
    }

    // Non-navigational schemes are not worth a parse attempt
    for scheme in ["javascript:", "mailto:", "tel:", "data:"] {
        let prefix = raw.get(..scheme.len());
        if prefix.is_some_and(|p| p.eq_ignore_ascii_case(scheme)) {
            return Err(Rejected::UnsupportedScheme);
        }
    }

    let mut url = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    }
    .map_err(|e| Rejected::Malformed(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Rejected::UnsupportedScheme);
    }

    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/section/page").unwrap()
    }

    #[test]
    fn resolves_relative_against_base() {
        let url = resolve_candidate("/about", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/about");

        let url = resolve_candidate("sibling", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/section/sibling");
    }

    #[test]
    fn resolves_dot_segments() {
        let url = resolve_candidate("../up/./here", Some(&base())).unwrap();
        assert_eq!(url.as_str(), "https://example.com/up/here");
    }

    #[test]
    fn strips_fragment() {
        let url = resolve_candidate("https://example.com/page#section", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn fragment_only_resolves_to_base() {
        let url = resolve_candidate("#section", Some(&base())).unwrap();
        assert_eq!(url.as_str(), base().as_str());
    }

    #[test]
    fn lowercases_scheme_and_host() {
        let url = resolve_candidate("HTTPS://EXAMPLE.COM/Page", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn removes_default_port() {
        let url = resolve_candidate("https://example.com:443/page", None).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");

        let url = resolve_candidate("http://example.com:80/page", None).unwrap();
        assert_eq!(url.as_str(), "http://example.com/page");
    }

    #[test]
    fn keeps_explicit_port() {
        let url = resolve_candidate("http://example.com:8080/page", None).unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/page");
    }

    #[test]
    fn rejects_non_navigational_schemes() {
        for link in [
            "javascript:void(0)",
            "mailto:someone@example.com",
            "tel:+123456",
            "data:text/html,hi",
            "MAILTO:shouty@example.com",
        ] {
            assert_eq!(
                resolve_candidate(link, Some(&base())),
                Err(Rejected::UnsupportedScheme),
                "expected rejection for {}",
                link
            );
        }
    }

    #[test]
    fn rejects_other_absolute_schemes() {
        assert_eq!(
            resolve_candidate("ftp://example.com/file", None),
            Err(Rejected::UnsupportedScheme)
        );
    }

    #[test]
    fn rejects_relative_without_base() {
        assert!(matches!(
            resolve_candidate("/about", None),
            Err(Rejected::Malformed(_))
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            resolve_candidate("  ", Some(&base())),
            Err(Rejected::Malformed(_))
        ));
    }

    #[test]
    fn idempotent_on_own_output() {
        let first = resolve_candidate("HTTP://Example.COM:80/a/../b?q=1#frag", None).unwrap();
        let second = resolve_candidate(first.as_str(), None).unwrap();
        assert_eq!(first, second);
    }
}
