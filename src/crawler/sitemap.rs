//! Sitemap and sitemap-index XML parsing
//!
//! Documents are classified by their root element: `sitemapindex` yields
//! [`SitemapDoc::Index`], `urlset` yields [`SitemapDoc::UrlSet`]. Anything
//! else is a [`ParseError::MalformedXml`], which callers report and skip.
//!
//! Matching is namespace-agnostic on local names, but `<loc>` and
//! `<lastmod>` are only honored directly under a `<url>` or `<sitemap>`
//! element, so extension content such as `<image:loc>` is not mistaken for
//! a page location.

use crate::ParseError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDoc {
    /// A sitemap index: entries are other sitemap documents
    Index { children: Vec<String> },
    /// A regular sitemap: entries are page URLs
    UrlSet { entries: Vec<SitemapEntry> },
}

/// One `<url>` entry of a regular sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
}

/// Whether a fetched response should be treated as a sitemap document
pub fn is_sitemap_payload(content_type: &str, url: &str) -> bool {
    content_type.to_lowercase().contains("xml")
        || url.ends_with(".xml")
        || url.to_lowercase().contains("sitemap")
}

/// Parses sitemap XML into its tagged document form
pub fn parse_sitemap(xml: &str) -> Result<SitemapDoc, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    // Local-name stack of open elements; drives loc/lastmod scoping
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut is_index: Option<bool> = None;

    let mut current_loc: Option<String> = None;
    let mut current_lastmod: Option<DateTime<Utc>> = None;
    let mut children: Vec<String> = Vec::new();
    let mut entries: Vec<SitemapEntry> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();

                if is_index.is_none() {
                    is_index = match local.as_slice() {
                        b"sitemapindex" => Some(true),
                        b"urlset" => Some(false),
                        other => {
                            return Err(ParseError::MalformedXml(format!(
                                "unexpected root element '{}'",
                                String::from_utf8_lossy(other)
                            )))
                        }
                    };
                }

                if matches!(local.as_slice(), b"url" | b"sitemap") && stack.len() == 1 {
                    current_loc = None;
                    current_lastmod = None;
                }

                stack.push(local);
            }

            Ok(Event::Text(t)) => {
                let in_entry_field = stack.len() == 3
                    && matches!(stack[1].as_slice(), b"url" | b"sitemap")
                    && matches!(stack[2].as_slice(), b"loc" | b"lastmod");

                if in_entry_field {
                    let text = t
                        .unescape()
                        .map_err(|e| ParseError::MalformedXml(e.to_string()))?;
                    let text = text.trim();

                    if stack[2].as_slice() == b"loc" {
                        current_loc = Some(text.to_string());
                    } else {
                        current_lastmod = parse_lastmod(text);
                    }
                }
            }

            Ok(Event::End(e)) => {
                let local = e.local_name().as_ref().to_vec();
                stack.pop();

                if stack.len() == 1 {
                    match local.as_slice() {
                        b"url" => {
                            if let Some(loc) = current_loc.take() {
                                entries.push(SitemapEntry {
                                    loc,
                                    lastmod: current_lastmod.take(),
                                });
                            }
                        }
                        b"sitemap" => {
                            if let Some(loc) = current_loc.take() {
                                children.push(loc);
                            }
                        }
                        _ => {}
                    }
                }
            }

            Ok(Event::Eof) => {
                if !stack.is_empty() {
                    return Err(ParseError::MalformedXml(
                        "unexpected end of document".to_string(),
                    ));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::MalformedXml(e.to_string())),
        }
    }

    match is_index {
        Some(true) => Ok(SitemapDoc::Index { children }),
        Some(false) => Ok(SitemapDoc::UrlSet { entries }),
        None => Err(ParseError::MalformedXml(
            "no sitemap root element".to_string(),
        )),
    }
}

/// Parses a `<lastmod>` value: W3C datetime (RFC 3339) or a bare date
fn parse_lastmod(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc></url>
  <url>
    <loc>https://example.com/about</loc>
    <lastmod>2024-03-01</lastmod>
  </url>
</urlset>"#;

        let doc = parse_sitemap(xml).unwrap();
        let SitemapDoc::UrlSet { entries } = doc else {
            panic!("expected UrlSet");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, "https://example.com/");
        assert_eq!(entries[0].lastmod, None);
        assert_eq!(entries[1].loc, "https://example.com/about");
        let lastmod = entries[1].lastmod.unwrap();
        assert_eq!((lastmod.year(), lastmod.month(), lastmod.day()), (2024, 3, 1));
    }

    #[test]
    fn parses_sitemap_index() {
        let xml = r#"<?xml version="1.0"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap-0.xml</loc></sitemap>
  <sitemap>
    <loc> https://example.com/sitemap-1.xml </loc>
    <lastmod>2024-01-15T10:00:00+00:00</lastmod>
  </sitemap>
</sitemapindex>"#;

        let doc = parse_sitemap(xml).unwrap();
        let SitemapDoc::Index { children } = doc else {
            panic!("expected Index");
        };
        assert_eq!(
            children,
            vec![
                "https://example.com/sitemap-0.xml",
                "https://example.com/sitemap-1.xml"
            ]
        );
    }

    #[test]
    fn parses_rfc3339_lastmod() {
        let xml = r#"<urlset>
  <url><loc>https://example.com/p</loc><lastmod>2023-06-15T08:30:00+02:00</lastmod></url>
</urlset>"#;

        let SitemapDoc::UrlSet { entries } = parse_sitemap(xml).unwrap() else {
            panic!("expected UrlSet");
        };
        let lastmod = entries[0].lastmod.unwrap();
        // Normalized to UTC
        assert_eq!(lastmod.hour(), 6);
    }

    #[test]
    fn bad_lastmod_is_dropped_not_fatal() {
        let xml = r#"<urlset>
  <url><loc>https://example.com/p</loc><lastmod>yesterday</lastmod></url>
</urlset>"#;

        let SitemapDoc::UrlSet { entries } = parse_sitemap(xml).unwrap() else {
            panic!("expected UrlSet");
        };
        assert_eq!(entries[0].loc, "https://example.com/p");
        assert_eq!(entries[0].lastmod, None);
    }

    #[test]
    fn image_extension_loc_is_not_a_page_loc() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://example.com/page</loc>
    <image:image><image:loc>https://example.com/pic.png</image:loc></image:image>
  </url>
</urlset>"#;

        let SitemapDoc::UrlSet { entries } = parse_sitemap(xml).unwrap() else {
            panic!("expected UrlSet");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, "https://example.com/page");
    }

    #[test]
    fn entry_without_loc_is_skipped() {
        let xml = r#"<urlset>
  <url><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://example.com/kept</loc></url>
</urlset>"#;

        let SitemapDoc::UrlSet { entries } = parse_sitemap(xml).unwrap() else {
            panic!("expected UrlSet");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, "https://example.com/kept");
    }

    #[test]
    fn html_root_is_malformed() {
        let result = parse_sitemap("<html><body>not a sitemap</body></html>");
        assert!(matches!(result, Err(ParseError::MalformedXml(_))));
    }

    #[test]
    fn empty_input_is_malformed() {
        let result = parse_sitemap("");
        assert!(matches!(result, Err(ParseError::MalformedXml(_))));
    }

    #[test]
    fn truncated_xml_is_malformed() {
        let result = parse_sitemap("<urlset><url><loc>https://example.com/");
        assert!(matches!(result, Err(ParseError::MalformedXml(_))));
    }

    #[test]
    fn payload_detection() {
        assert!(is_sitemap_payload("application/xml", "https://x.com/any"));
        assert!(is_sitemap_payload("text/xml; charset=utf-8", "https://x.com/any"));
        assert!(is_sitemap_payload("text/html", "https://x.com/sitemap.xml"));
        assert!(is_sitemap_payload("", "https://x.com/Sitemap_news"));
        assert!(!is_sitemap_payload("text/html", "https://x.com/page"));
    }
}
