//! Maps scored records to host media entries and channel playlists

use crate::models::SearchResult;
use crate::services::invidious_client::InvidiousClient;
use crate::services::relevance_scorer::{PhraseAnalysis, RelevanceScorer};
use skill_common::{MediaEntry, MediaType, Playlist, Vocabulary};
use tracing::debug;

/// Per-request inputs shared by every record of one search
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub analysis: &'a PhraseAnalysis,
    pub base_score: i32,
    pub media_type: MediaType,
}

/// Builds host media entries for one skill
#[derive(Debug, Clone)]
pub struct ResultAdapter {
    skill_id: String,
    skill_icon: String,
    blacklist: Vocabulary,
    channel_max_videos: usize,
}

impl ResultAdapter {
    pub fn new(
        skill_id: impl Into<String>,
        skill_icon: impl Into<String>,
        blacklist: Vocabulary,
        channel_max_videos: usize,
    ) -> Self {
        Self {
            skill_id: skill_id.into(),
            skill_icon: skill_icon.into(),
            blacklist,
            channel_max_videos,
        }
    }

    /// Single playable entry for a video record
    pub fn to_entry(&self, record: &SearchResult, score: u8, media_type: MediaType) -> MediaEntry {
        MediaEntry {
            uri: record.watch_url.clone(),
            title: record.title.clone(),
            artist: record.author.clone(),
            match_confidence: score,
            playback: media_type.playback(),
            media_type,
            length_ms: MediaEntry::length_ms_from_seconds(record.length_seconds),
            image: record.thumbnail_url.clone(),
            skill_id: self.skill_id.clone(),
            skill_icon: self.skill_icon.clone(),
        }
    }

    /// Promotional content by title keyword
    pub fn is_blacklisted(&self, record: &SearchResult) -> bool {
        self.blacklist.matches(&record.title)
    }

    /// Expand a channel record into a playlist of its latest videos
    ///
    /// Issues one listing request. Blacklisted videos are dropped; the rest
    /// are scored at the channel's search position plus their position in
    /// the listing. Returns `None` when nothing playable remains.
    pub async fn expand_channel(
        &self,
        client: &InvidiousClient,
        endpoint: &str,
        channel: &SearchResult,
        scorer: &RelevanceScorer,
        ctx: &ScoringContext<'_>,
    ) -> Option<Playlist> {
        let videos = client
            .channel_videos(endpoint, &channel.id, self.channel_max_videos)
            .await;

        let playlist = self.build_playlist(channel, &videos, scorer, ctx);
        if playlist.is_none() {
            debug!(channel = %channel.title, "Channel has no playable videos, skipping");
        }
        playlist
    }

    /// Playlist from an already fetched channel listing
    pub fn build_playlist(
        &self,
        channel: &SearchResult,
        videos: &[SearchResult],
        scorer: &RelevanceScorer,
        ctx: &ScoringContext<'_>,
    ) -> Option<Playlist> {
        let entries: Vec<MediaEntry> = videos
            .iter()
            .filter(|video| !self.is_blacklisted(video))
            .enumerate()
            .map(|(position, video)| {
                // Entries decay from the channel's own rank in the search
                let score = scorer.score_analyzed(
                    ctx.analysis,
                    video,
                    channel.index + position,
                    ctx.base_score,
                    ctx.media_type,
                );
                self.to_entry(video, score, ctx.media_type)
            })
            .collect();

        if entries.is_empty() {
            return None;
        }

        let scores: Vec<u8> = entries.iter().map(|e| e.match_confidence).collect();

        Some(Playlist {
            title: channel.title.clone(),
            artist: channel.author.clone(),
            match_confidence: RelevanceScorer::aggregate(&scores),
            playback: ctx.media_type.playback(),
            media_type: ctx.media_type,
            image: channel.thumbnail_url.clone(),
            skill_id: self.skill_id.clone(),
            skill_icon: self.skill_icon.clone(),
            entries,
        })
    }
}
