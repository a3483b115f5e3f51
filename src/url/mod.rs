//! URL handling module
//!
//! Normalization resolves raw link text into canonical absolute URLs;
//! the filter applies the configured scope, skip-extension, exclude and
//! drop rules on top of that.

mod filter;
mod normalize;

pub use filter::UrlFilter;
pub use normalize::resolve_candidate;
