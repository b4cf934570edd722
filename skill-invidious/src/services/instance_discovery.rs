//! Instance discovery
//!
//! Candidate instances are scraped from an HTML listing page. The page has no
//! stable format, so parsing is pattern based and best effort: anything that
//! looks like an Invidious host is kept, nothing else is trusted.

use crate::services::invidious_client::{InvidiousClient, InvidiousError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Upper bound on candidates taken from one discovery page
pub const MAX_DISCOVERED: usize = 10;

static URL_WITH_TLD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"']+\.(?:com|org|net|io|xyz)"#).expect("static regex")
});
static URL_WITH_SERVICE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"']*invidious[^\s<>"']*"#).expect("static regex"));
static URL_WITH_SHORT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://inv\.[^\s<>"']*"#).expect("static regex"));

/// Discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Discovery page fetch failed: {0}")]
    Fetch(#[from] InvidiousError),
}

/// Source of candidate instance addresses
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    async fn resolve_candidates(&self) -> Result<Vec<String>, DiscoveryError>;
}

/// Scrapes an instance listing page (redirect.invidious.io by default)
#[derive(Debug, Clone)]
pub struct RedirectPageSource {
    client: InvidiousClient,
    url: String,
}

impl RedirectPageSource {
    pub fn new(client: InvidiousClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CandidateSource for RedirectPageSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn resolve_candidates(&self) -> Result<Vec<String>, DiscoveryError> {
        let html = self.client.fetch_page(&self.url).await?;
        Ok(parse_instance_urls(&html))
    }
}

/// Source used when discovery is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiscovery;

#[async_trait]
impl CandidateSource for NoDiscovery {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn resolve_candidates(&self) -> Result<Vec<String>, DiscoveryError> {
        Ok(Vec::new())
    }
}

/// Extract likely instance URLs from a listing page
///
/// First pass: any URL on a common TLD whose host mentions the service name
/// or uses the `inv.` short prefix. If that finds nothing, fall back to raw
/// service-name URLs, then raw `inv.` URLs. Order is first-seen, duplicates
/// are dropped and the result is capped at `MAX_DISCOVERED`.
pub fn parse_instance_urls(html: &str) -> Vec<String> {
    let mut found: Vec<String> = URL_WITH_TLD
        .find_iter(html)
        .map(|m| m.as_str())
        .filter(|url| {
            let lower = url.to_lowercase();
            lower.contains("invidious") || lower.contains("inv.")
        })
        .map(str::to_string)
        .collect();

    if found.is_empty() {
        found.extend(URL_WITH_SERVICE_NAME.find_iter(html).map(|m| m.as_str().to_string()));
        found.extend(URL_WITH_SHORT_PREFIX.find_iter(html).map(|m| m.as_str().to_string()));
    }

    let mut unique: Vec<String> = Vec::new();
    for url in found {
        let clean = url.trim().to_string();
        if !clean.is_empty() && !unique.contains(&clean) {
            unique.push(clean);
        }
    }
    unique.truncate(MAX_DISCOVERED);
    unique
}
