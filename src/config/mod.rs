//! Configuration module
//!
//! A crawl run is driven by a single resolved [`CrawlConfig`]. The binary
//! assembles a [`RawConfig`] from CLI flags and an optional JSON config file
//! (flags override file values, list-valued options are additive), then
//! resolves it here. Resolution compiles the exclude/drop patterns and
//! validates everything that is fatal at INIT.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AuthCredentials, CrawlConfig, RawConfig};

// Re-export parser functions
pub use parser::{load_raw_config, resolve};
