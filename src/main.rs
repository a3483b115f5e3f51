//! Sitemapper command-line entry point
//!
//! The binary is a thin wrapper around the crawl core: it resolves CLI flags
//! plus an optional JSON config file into a `CrawlConfig`, runs the crawl,
//! then sorts and writes the collected records as sitemap XML.

use anyhow::Context;
use clap::Parser;
use sitemapper::config::{load_raw_config, resolve, AuthCredentials, RawConfig};
use sitemapper::crawler::{CrawlOutcome, Crawler};
use sitemapper::output::{print_report, write_sitemap_files, write_urlset};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemapper: crawl a website and generate its sitemap
///
/// Crawls the given domain (or expands existing sitemap files) and writes a
/// sitemap.xml. Above 50,000 URLs the output can be split into a sitemap
/// index plus numbered sitemap files.
#[derive(Parser, Debug)]
#[command(name = "sitemapper")]
#[command(version = "1.0.0")]
#[command(about = "Crawl a website and generate its sitemap", long_about = None)]
struct Cli {
    /// Target domain (ex: https://blog.example.com)
    #[arg(long, conflicts_with = "config")]
    domain: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File extension to skip (repeatable)
    #[arg(long = "skipext", value_name = "EXT")]
    skipext: Vec<String>,

    /// Reject URLs matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Remove the matched substring from URLs (repeatable)
    #[arg(long, value_name = "REGEX")]
    drop: Vec<String>,

    /// Number of crawl workers
    #[arg(short = 'n', long = "num-workers")]
    num_workers: Option<usize>,

    /// Honor robots.txt
    #[arg(long)]
    parserobots: bool,

    /// User-agent for requests and robots.txt matching
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Collect page images into the sitemap
    #[arg(long)]
    images: bool,

    /// Sitemap or sitemap-index URL to expand (repeatable)
    #[arg(long = "sitemap-url", value_name = "URL")]
    sitemap_url: Vec<String>,

    /// Only expand sitemaps, never crawl HTML pages
    #[arg(long = "sitemap-only")]
    sitemap_only: bool,

    /// Maximum crawl depth from the start URL
    #[arg(long = "max-depth")]
    max_depth: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout")]
    timeout_secs: Option<u64>,

    /// Basic-auth username
    #[arg(long = "auth-user", requires = "auth_password")]
    auth_user: Option<String>,

    /// Basic-auth password
    #[arg(long = "auth-password", requires = "auth_user")]
    auth_password: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write a sitemap index plus numbered files past 50,000 URLs
    #[arg(long = "as-index", requires = "output")]
    as_index: bool,

    /// Disable alphabetical sorting of output URLs
    #[arg(long = "no-sort", action = clap::ArgAction::SetFalse, default_value_t = true)]
    sort_alphabetically: bool,

    /// Display a crawl report after the run
    #[arg(long)]
    report: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let raw = build_raw_config(&cli)?;
    let config = resolve(raw)?;
    let domain = config.domain.clone();

    let crawler = Crawler::new(config)?;

    // Ctrl-c cancels the run; workers finish their current entry and the
    // partial record set is still written.
    let cancel = crawler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping the crawl");
            cancel.cancel();
        }
    });

    let CrawlOutcome { mut records, stats } = crawler.run().await?;

    if cli.sort_alphabetically {
        records.sort_by(|a, b| a.url.cmp(&b.url));
    }

    match &cli.output {
        Some(path) => {
            let written = write_sitemap_files(&records, path, cli.as_index, &domain)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("wrote {} sitemap file(s)", written.len());
        }
        None => {
            let stdout = std::io::stdout();
            write_urlset(&mut stdout.lock(), &records)?;
        }
    }

    if cli.report {
        print_report(&stats);
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemapper=warn,error"),
            1 => EnvFilter::new("sitemapper=info,warn"),
            _ => EnvFilter::new("sitemapper=debug,info"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Assembles the raw config: flags override file values, lists are additive
fn build_raw_config(cli: &Cli) -> anyhow::Result<RawConfig> {
    let file_config = match &cli.config {
        Some(path) => load_raw_config(path)
            .with_context(|| format!("loading config file {}", path.display()))?,
        None => RawConfig::default(),
    };

    let auth = match (&cli.auth_user, &cli.auth_password) {
        (Some(username), Some(password)) => Some(AuthCredentials {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };

    let cli_config = RawConfig {
        domain: cli.domain.clone(),
        skipext: cli.skipext.clone(),
        exclude: cli.exclude.clone(),
        drop: cli.drop.clone(),
        num_workers: cli.num_workers,
        parserobots: cli.parserobots.then_some(true),
        user_agent: cli.user_agent.clone(),
        images: cli.images.then_some(true),
        sitemap_url: cli.sitemap_url.clone(),
        sitemap_only: cli.sitemap_only.then_some(true),
        follow_sitemaps: None,
        timeout_secs: cli.timeout_secs,
        max_depth: cli.max_depth,
        auth,
    };

    Ok(cli_config.merged_over(file_config))
}
