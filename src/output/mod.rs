//! Output module
//!
//! Serializes collected records into sitemap XML (splitting into an index
//! plus numbered files past the 50,000-URL limit) and prints the optional
//! end-of-run report. The crawl core hands over an unordered record set;
//! sorting happens before the writer is called.

mod report;
mod writer;

pub use report::print_report;
pub use writer::{write_sitemap_files, write_urlset, xml_escape};
