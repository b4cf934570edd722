//! Invidious API client
//!
//! Endpoints used:
//! - `GET {instance}/api/v1/stats` liveness probe
//! - `GET {instance}/api/v1/search` search
//! - `GET {instance}/api/v1/channels/{id}/videos` channel listing
//! - `GET {instance}/api/v1/videos/{id}` video details
//!
//! The `try_*` methods report failures; the plain methods log them and
//! return an empty result so a dead instance never aborts a search.

use crate::models::{ApiChannelVideos, ApiItem, SearchResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use skill_common::config::{SearchSettings, WatchUrlStyle};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("skill-invidious/", env!("CARGO_PKG_VERSION"));

/// Liveness probe timeout
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Search, listing and discovery timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Invidious client errors
#[derive(Debug, Error)]
pub enum InvidiousError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for InvidiousError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InvidiousError::Timeout(err.to_string())
        } else {
            InvidiousError::NetworkError(err.to_string())
        }
    }
}

/// Search request facets
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub q: String,
    pub content_type: String,
    pub sort_by: String,
    pub date: String,
    pub duration: String,
    pub features: String,
    pub region: String,
    pub max_results: usize,
}

impl SearchQuery {
    /// Build a query from configured facets
    ///
    /// `default_type` is used when the settings leave the content type unset.
    pub fn from_settings(q: &str, settings: &SearchSettings, default_type: &str) -> Self {
        Self {
            q: q.to_string(),
            content_type: settings
                .default_type
                .clone()
                .unwrap_or_else(|| default_type.to_string()),
            sort_by: settings.default_sort.clone(),
            date: settings.default_date.clone(),
            duration: settings.default_duration.clone(),
            features: settings.default_features.clone(),
            region: settings.default_region.clone(),
            max_results: settings.max_results,
        }
    }

    /// Query-string pairs, omitting empty facets
    ///
    /// `all` is not a valid date or duration filter upstream and is dropped too.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone())];
        let facets = [
            ("type", &self.content_type, false),
            ("sort_by", &self.sort_by, false),
            ("date", &self.date, true),
            ("duration", &self.duration, true),
            ("features", &self.features, false),
            ("region", &self.region, false),
        ];
        for (key, value, drop_all) in facets {
            let value = value.trim();
            if value.is_empty() || (drop_all && value.eq_ignore_ascii_case("all")) {
                continue;
            }
            params.push((key, value.to_string()));
        }
        params
    }
}

/// Liveness check for an instance
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_alive(&self, endpoint: &str) -> bool;
}

/// Invidious API client
#[derive(Debug, Clone)]
pub struct InvidiousClient {
    http_client: reqwest::Client,
    watch_url_style: WatchUrlStyle,
}

impl InvidiousClient {
    pub fn new(watch_url_style: WatchUrlStyle) -> Result<Self, InvidiousError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InvidiousError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            watch_url_style,
        })
    }

    /// Search an instance, logging and swallowing failures
    pub async fn search(&self, endpoint: &str, query: &SearchQuery) -> Vec<SearchResult> {
        match self.try_search(endpoint, query).await {
            Ok(results) => results,
            Err(InvidiousError::ApiError(status, _)) => {
                tracing::warn!(instance = %endpoint, status, "Error in Invidious search");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(instance = %endpoint, "Error searching on Invidious: {}", e);
                Vec::new()
            }
        }
    }

    /// Search an instance
    ///
    /// Returns at most `query.max_results` records. Items of unsupported
    /// kinds or with unreadable fields are skipped; a payload that is not a
    /// JSON array is a parse error.
    pub async fn try_search(
        &self,
        endpoint: &str,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, InvidiousError> {
        let url = format!("{}/api/v1/search", endpoint.trim_end_matches('/'));

        tracing::debug!(instance = %endpoint, q = %query.q, kind = %query.content_type, "Querying Invidious search");

        let items: Vec<serde_json::Value> = self
            .get_json(&url, &query.params(), REQUEST_TIMEOUT)
            .await?;

        let results = self.normalize(endpoint, items, query.max_results);

        tracing::info!(
            instance = %endpoint,
            q = %query.q,
            results = results.len(),
            "Retrieved search results from Invidious"
        );

        Ok(results)
    }

    /// Latest videos of a channel, logging and swallowing failures
    pub async fn channel_videos(
        &self,
        endpoint: &str,
        channel_id: &str,
        limit: usize,
    ) -> Vec<SearchResult> {
        match self.try_channel_videos(endpoint, channel_id, limit).await {
            Ok(videos) => videos,
            Err(e) => {
                tracing::warn!(instance = %endpoint, channel = %channel_id, "Could not list channel videos: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_channel_videos(
        &self,
        endpoint: &str,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, InvidiousError> {
        let url = format!(
            "{}/api/v1/channels/{}/videos",
            endpoint.trim_end_matches('/'),
            channel_id
        );

        tracing::debug!(instance = %endpoint, channel = %channel_id, "Listing channel videos");

        let listing: ApiChannelVideos = self.get_json(&url, &[], REQUEST_TIMEOUT).await?;
        Ok(self.normalize(endpoint, listing.into_items(), limit))
    }

    /// Details of a single video, `None` on any failure
    pub async fn video_details(&self, endpoint: &str, video_id: &str) -> Option<SearchResult> {
        match self.try_video_details(endpoint, video_id).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(instance = %endpoint, video = %video_id, "Could not fetch video details: {}", e);
                None
            }
        }
    }

    pub async fn try_video_details(
        &self,
        endpoint: &str,
        video_id: &str,
    ) -> Result<Option<SearchResult>, InvidiousError> {
        let url = format!("{}/api/v1/videos/{}", endpoint.trim_end_matches('/'), video_id);

        let mut item: ApiItem = self.get_json(&url, &[], REQUEST_TIMEOUT).await?;
        // The details payload does not repeat the ID it was requested by
        if item.video_id.is_none() {
            item.video_id = Some(video_id.to_string());
        }
        Ok(item.into_result(endpoint, self.watch_url_style, 0))
    }

    /// Fetch a page as text (instance discovery)
    pub async fn fetch_page(&self, url: &str) -> Result<String, InvidiousError> {
        let response = self
            .http_client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InvidiousError::ApiError(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, InvidiousError> {
        let response = self
            .http_client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InvidiousError::ApiError(status.as_u16(), error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| InvidiousError::ParseError(e.to_string()))
    }

    fn normalize(
        &self,
        endpoint: &str,
        items: Vec<serde_json::Value>,
        limit: usize,
    ) -> Vec<SearchResult> {
        let mut results = Vec::with_capacity(limit.min(items.len()));

        for value in items.into_iter().take(limit) {
            let item: ApiItem = match serde_json::from_value(value) {
                Ok(item) => item,
                Err(e) => {
                    tracing::debug!(instance = %endpoint, "Skipping unreadable record: {}", e);
                    continue;
                }
            };
            let index = results.len();
            if let Some(result) = item.into_result(endpoint, self.watch_url_style, index) {
                results.push(result);
            }
        }

        results
    }
}

#[async_trait]
impl LivenessProbe for InvidiousClient {
    async fn is_alive(&self, endpoint: &str) -> bool {
        let url = format!("{}/api/v1/stats", endpoint.trim_end_matches('/'));

        match self
            .http_client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(instance = %endpoint, status = response.status().as_u16(), "Instance not available");
                false
            }
            Err(e) => {
                tracing::debug!(instance = %endpoint, "Instance not available: {}", e);
                false
            }
        }
    }
}
