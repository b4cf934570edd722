//! Search records returned by an Invidious instance
//!
//! Upstream payloads are loosely typed: any field may be absent or `null`.
//! The `Api*` structs mirror the wire format with every field optional, and
//! `SearchResult` is the normalised record the scorer and adapter consume.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use skill_common::config::WatchUrlStyle;

/// Kind of search record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Video,
    Channel,
}

/// Normalised video or channel record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub kind: ResultKind,
    /// Video ID, or channel ID for channel records
    pub id: String,
    /// Video title, or channel name for channel records
    pub title: String,
    /// Uploader / channel name
    pub author: String,
    pub author_id: String,
    pub length_seconds: u64,
    /// Absolute thumbnail URL (empty when the instance sent none)
    pub thumbnail_url: String,
    /// Playable URI (empty for channel records)
    pub watch_url: String,
    pub view_count: u64,
    /// Publish time, Unix seconds (0 when unknown)
    pub published: i64,
    /// Position in the upstream response
    pub index: usize,
}

impl SearchResult {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        if self.published <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.published, 0)
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// Thumbnail entry (`videoThumbnails` / `authorThumbnails`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiThumbnail {
    pub quality: Option<String>,
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Item of `/api/v1/search`, `/api/v1/channels/{id}/videos` or
/// `/api/v1/videos/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiItem {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub title: Option<String>,
    pub video_id: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<String>,
    pub length_seconds: Option<u64>,
    pub view_count: Option<u64>,
    pub published: Option<i64>,
    pub video_thumbnails: Option<Vec<ApiThumbnail>>,
    pub author_thumbnails: Option<Vec<ApiThumbnail>>,
}

/// `/api/v1/channels/{id}/videos` response
///
/// Older instances return a bare array, newer ones wrap it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiChannelVideos {
    List(Vec<serde_json::Value>),
    Envelope {
        #[serde(default)]
        videos: Vec<serde_json::Value>,
    },
}

impl ApiChannelVideos {
    pub fn into_items(self) -> Vec<serde_json::Value> {
        match self {
            ApiChannelVideos::List(videos) => videos,
            ApiChannelVideos::Envelope { videos } => videos,
        }
    }
}

impl ApiItem {
    /// Record kind; items without a `type` field (channel listings, video
    /// details) are videos when they carry a video ID
    pub fn kind(&self) -> Option<ResultKind> {
        match self.item_type.as_deref() {
            Some("video") => Some(ResultKind::Video),
            Some("channel") => Some(ResultKind::Channel),
            None if self.video_id.is_some() => Some(ResultKind::Video),
            _ => None,
        }
    }

    /// Normalise into a `SearchResult`
    ///
    /// Returns `None` for unsupported kinds and for records without an ID.
    pub fn into_result(
        self,
        endpoint: &str,
        style: WatchUrlStyle,
        index: usize,
    ) -> Option<SearchResult> {
        let kind = self.kind()?;
        let author = self.author.unwrap_or_default();
        let author_id = self.author_id.unwrap_or_default();

        match kind {
            ResultKind::Video => {
                let id = self.video_id.filter(|id| !id.is_empty())?;
                let thumbnail = self
                    .video_thumbnails
                    .unwrap_or_default()
                    .into_iter()
                    .next()
                    .and_then(|t| t.url)
                    .map(|url| absolute_url(endpoint, &url))
                    .unwrap_or_default();

                Some(SearchResult {
                    kind,
                    watch_url: watch_url(endpoint, &id, style),
                    id,
                    title: self.title.unwrap_or_default(),
                    author,
                    author_id,
                    length_seconds: self.length_seconds.unwrap_or(0),
                    thumbnail_url: thumbnail,
                    view_count: self.view_count.unwrap_or(0),
                    published: self.published.unwrap_or(0),
                    index,
                })
            }
            ResultKind::Channel => {
                if author_id.is_empty() {
                    return None;
                }
                // Widest avatar
                let thumbnail = self
                    .author_thumbnails
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|t| t.url.is_some())
                    .max_by_key(|t| t.width.unwrap_or(0))
                    .and_then(|t| t.url)
                    .map(|url| absolute_url(endpoint, &url))
                    .unwrap_or_default();

                Some(SearchResult {
                    kind,
                    id: author_id.clone(),
                    title: author.clone(),
                    author,
                    author_id,
                    length_seconds: 0,
                    thumbnail_url: thumbnail,
                    watch_url: String::new(),
                    view_count: 0,
                    published: 0,
                    index,
                })
            }
        }
    }
}

/// Playable URI for a video
pub fn watch_url(endpoint: &str, video_id: &str, style: WatchUrlStyle) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    match style {
        WatchUrlStyle::Youtube => format!("https://www.youtube.com/watch?v={}", video_id),
        WatchUrlStyle::Instance => format!("{}/watch?v={}", endpoint, video_id),
        WatchUrlStyle::Direct => format!("{}/latest_version?id={}&itag=18", endpoint, video_id),
    }
}

/// Resolve a thumbnail URL against the instance that sent it
///
/// Relative and protocol-relative URLs take the instance's scheme and host.
/// With an unparseable endpoint the URL is kept as sent.
fn absolute_url(endpoint: &str, url: &str) -> String {
    if url.trim().is_empty() {
        return String::new();
    }
    match Url::parse(endpoint).and_then(|base| base.join(url)) {
        Ok(joined) => joined.into(),
        Err(_) => url.to_string(),
    }
}
