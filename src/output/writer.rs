use crate::crawler::{UrlRecord, MAX_URLS_PER_SITEMAP};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use url::Url;

const URLSET_OPEN: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#;
const URLSET_OPEN_WITH_IMAGES: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">"#;
const SITEMAPINDEX_OPEN: &str =
    r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#;
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escapes a URL for embedding in sitemap XML
pub fn xml_escape(text: &str) -> String {
    text.replace(' ', "%20")
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Writes one urlset document with the given records
pub fn write_urlset<W: Write>(out: &mut W, records: &[UrlRecord]) -> io::Result<()> {
    let with_images = records.iter().any(|r| !r.images.is_empty());

    writeln!(out, "{}", XML_DECL)?;
    writeln!(
        out,
        "{}",
        if with_images {
            URLSET_OPEN_WITH_IMAGES
        } else {
            URLSET_OPEN
        }
    )?;
    for record in records {
        write_record(out, record)?;
    }
    writeln!(out, "</urlset>")
}

fn write_record<W: Write>(out: &mut W, record: &UrlRecord) -> io::Result<()> {
    write!(out, "<url><loc>{}</loc>", xml_escape(&record.url))?;

    if let Some(lastmod) = record.lastmod {
        write!(out, "<lastmod>{}</lastmod>", lastmod.format("%Y-%m-%dT%H:%M:%S+00:00"))?;
    }
    for image in &record.images {
        write!(
            out,
            "<image:image><image:loc>{}</image:loc></image:image>",
            xml_escape(image)
        )?;
    }

    writeln!(out, "</url>")
}

/// Writes the record set to `output`, splitting into an index plus numbered
/// sitemap files when the count exceeds the 50,000-URL limit and `as_index`
/// is set. Returns the paths written.
///
/// The sitemap spec requires the split above 50,000 URLs; splitting is still
/// opt-in via `as_index` so a plain single-file setup keeps working.
pub fn write_sitemap_files(
    records: &[UrlRecord],
    output: &Path,
    as_index: bool,
    domain: &Url,
) -> io::Result<Vec<PathBuf>> {
    if as_index && records.len() > MAX_URLS_PER_SITEMAP {
        write_index_and_chunks(records, output, domain)
    } else {
        let mut file = io::BufWriter::new(std::fs::File::create(output)?);
        write_urlset(&mut file, records)?;
        file.flush()?;
        Ok(vec![output.to_path_buf()])
    }
}

fn write_index_and_chunks(
    records: &[UrlRecord],
    output: &Path,
    domain: &Url,
) -> io::Result<Vec<PathBuf>> {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sitemap");
    let extension = output
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("xml");

    let chunk_paths: Vec<PathBuf> = records
        .chunks(MAX_URLS_PER_SITEMAP)
        .enumerate()
        .map(|(i, _)| output.with_file_name(format!("{}-{}.{}", stem, i, extension)))
        .collect();

    // Index document pointing at the chunk files, hosted at the site root
    let mut index = io::BufWriter::new(std::fs::File::create(output)?);
    writeln!(index, "{}", XML_DECL)?;
    writeln!(index, "{}", SITEMAPINDEX_OPEN)?;
    for path in &chunk_paths {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let loc = format!(
            "{}://{}/{}",
            domain.scheme(),
            domain.authority(),
            file_name
        );
        writeln!(index, "<sitemap><loc>{}</loc></sitemap>", xml_escape(&loc))?;
    }
    writeln!(index, "</sitemapindex>")?;
    index.flush()?;

    for (chunk, path) in records.chunks(MAX_URLS_PER_SITEMAP).zip(&chunk_paths) {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        write_urlset(&mut file, chunk)?;
        file.flush()?;
    }

    let mut written = vec![output.to_path_buf()];
    written.extend(chunk_paths);
    Ok(written)
}
