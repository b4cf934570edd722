//! Host media model
//!
//! Value types handed to the playback host. Everything except the URI is
//! optional on the host side, so every field has a neutral default and the
//! types can be built from partial data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media type requested by the user (or inferred by the host)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Generic,
    Audio,
    Music,
    Video,
    Podcast,
    Movie,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Generic => "generic",
            MediaType::Audio => "audio",
            MediaType::Music => "music",
            MediaType::Video => "video",
            MediaType::Podcast => "podcast",
            MediaType::Movie => "movie",
        }
    }

    /// Playback kind the host should use for this request
    pub fn playback(&self) -> PlaybackType {
        match self {
            MediaType::Music | MediaType::Audio | MediaType::Podcast => PlaybackType::Audio,
            _ => PlaybackType::Video,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(MediaType::Generic),
            "audio" => Ok(MediaType::Audio),
            "music" => Ok(MediaType::Music),
            "video" => Ok(MediaType::Video),
            "podcast" => Ok(MediaType::Podcast),
            "movie" => Ok(MediaType::Movie),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown media type: {}",
                other
            ))),
        }
    }
}

/// How the host should play an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackType {
    Audio,
    #[default]
    Video,
}

/// Single playable entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaEntry {
    pub uri: String,
    pub title: String,
    pub artist: String,
    /// Match confidence (0-100)
    pub match_confidence: u8,
    pub playback: PlaybackType,
    pub media_type: MediaType,
    /// Length in milliseconds (0 when unknown)
    pub length_ms: u64,
    /// Artwork URL (empty when unknown)
    pub image: String,
    pub skill_id: String,
    pub skill_icon: String,
}

impl MediaEntry {
    /// Convert a length in seconds to the host's millisecond representation
    pub fn length_ms_from_seconds(seconds: u64) -> u64 {
        seconds.saturating_mul(1000)
    }
}

/// Ordered group of entries under a shared title (e.g. one channel)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
    pub title: String,
    pub artist: String,
    /// Aggregate match confidence (0-100)
    pub match_confidence: u8,
    pub playback: PlaybackType,
    pub media_type: MediaType,
    pub image: String,
    pub skill_id: String,
    pub skill_icon: String,
    pub entries: Vec<MediaEntry>,
}

impl Playlist {
    /// Total playlist length in milliseconds
    pub fn length_ms(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.length_ms))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One search result handed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaItem {
    Entry(MediaEntry),
    Playlist(Playlist),
}

impl MediaItem {
    pub fn match_confidence(&self) -> u8 {
        match self {
            MediaItem::Entry(e) => e.match_confidence,
            MediaItem::Playlist(p) => p.match_confidence,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaItem::Entry(e) => &e.title,
            MediaItem::Playlist(p) => &p.title,
        }
    }
}
