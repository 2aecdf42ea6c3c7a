//! Utility functions for parsing user input

use url::Url;

/// What to do with a message full of links
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPlan {
    /// Nothing usable was sent
    NoLinks,
    /// More links than allowed; nothing is sent to the provider
    TooMany { count: usize, max: usize },
    /// One link: resolve it and ask for a type
    Single(String),
    /// Several links: submit each with default options
    Batch(Vec<String>),
}

/// Check if a string is an absolute http(s) URL with a host
pub fn is_valid_link(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Pull the links out of a message: one per line, trimmed, duplicates and
/// invalid lines dropped, input order kept
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_valid_link(line) && !links.iter().any(|seen| seen == line) {
            links.push(line.to_string());
        }
    }
    links
}

/// Decide how to handle a message, without touching the network
pub fn plan_links(text: &str, max: usize) -> LinkPlan {
    let mut links = extract_links(text);
    match links.len() {
        0 => LinkPlan::NoLinks,
        count if count > max => LinkPlan::TooMany { count, max },
        1 => LinkPlan::Single(links.remove(0)),
        _ => LinkPlan::Batch(links),
    }
}
