use crate::crawler::CrawlStats;

/// Prints the end-of-run report to stdout
pub fn print_report(stats: &CrawlStats) {
    println!("Number of URLs collected : {}", stats.urls_collected);
    println!("Number of pages fetched  : {}", stats.pages_fetched);

    if stats.blocked_by_robots > 0 {
        println!("Blocked by robots.txt    : {}", stats.blocked_by_robots);
    }
    if stats.excluded > 0 {
        println!("Excluded by filters      : {}", stats.excluded);
    }
    if stats.fetch_errors > 0 {
        println!("Fetch failures           : {}", stats.fetch_errors);
    }
    if stats.parse_errors > 0 {
        println!("Parse failures           : {}", stats.parse_errors);
    }

    let mut codes: Vec<_> = stats.response_codes.iter().collect();
    codes.sort_by_key(|(code, _)| **code);
    for (code, count) in codes {
        println!("HTTP {} responses      : {}", code, count);
    }
}
