//! Input classification: decides whether a submission is a URL to save or
//! free text to search.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Bare-domain heuristic: "example.com", optionally with a scheme prefix.
static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://)?([A-Za-z0-9-]+\.)+[A-Za-z]{2,}").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A URL to store as a new reference.
    Reference(String),
    /// Free text to run as a semantic search.
    Query(String),
}

/// Classifies a raw submission. Returns `None` for empty or whitespace-only
/// input. Evaluated once per submission, before any network call.
pub fn classify(text: &str) -> Option<Submission> {
    let value = text.trim();
    if value.is_empty() {
        return None;
    }

    if is_reference(value) {
        Some(Submission::Reference(value.to_string()))
    } else {
        Some(Submission::Query(value.to_string()))
    }
}

fn is_reference(value: &str) -> bool {
    // An input that parses as an absolute URL is a reference exactly when
    // the scheme is http(s); "mailto:x" or "localhost:8080" are queries.
    if let Ok(parsed) = Url::parse(value) {
        return matches!(parsed.scheme(), "http" | "https");
    }

    DOMAIN_RE.is_match(value)
}
