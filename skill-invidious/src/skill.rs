//! Skill entry point
//!
//! One `InvidiousSkill` is one host session. It owns the settings, the
//! instance pool and its rotation cursor; nothing is shared between sessions.
//! The pool is resolved lazily on the first search (or explicitly through
//! `refresh_instances`).

use crate::error::{SkillError, SkillResult};
use crate::models::ResultKind;
use crate::services::{
    CandidateSource, InstancePool, InvidiousClient, NoDiscovery, RedirectPageSource,
    RelevanceScorer, ResultAdapter, ScoringContext, ScoringPolicy, SearchQuery,
};
use skill_common::config::SkillSettings;
use skill_common::{MediaItem, MediaType, RuntimeRequirements, Vocabulary};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Phrases naming the service in an utterance, one per line
const SERVICE_VOCABULARY: &str = include_str!("../locale/en-us/invidious.voc");

/// Skill variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkillProfile {
    /// General video search (`skill-invidious`)
    #[default]
    Video,
    /// Music search with channel playlists (`skill-invidious-music`)
    Music,
}

impl SkillProfile {
    pub fn name(&self) -> &'static str {
        match self {
            SkillProfile::Video => "skill-invidious",
            SkillProfile::Music => "skill-invidious-music",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SkillProfile::Video => "res/invidious.png",
            SkillProfile::Music => "res/invidious-music.png",
        }
    }

    pub fn supported_media(&self) -> &'static [MediaType] {
        match self {
            SkillProfile::Video => &[MediaType::Music, MediaType::Video, MediaType::Generic],
            SkillProfile::Music => &[MediaType::Music, MediaType::Audio, MediaType::Generic],
        }
    }

    /// Search content type when the settings leave it unset
    pub fn default_search_type(&self) -> &'static str {
        match self {
            SkillProfile::Video => "video",
            SkillProfile::Music => "all",
        }
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        match self {
            SkillProfile::Video => ScoringPolicy::video(),
            SkillProfile::Music => ScoringPolicy::music(),
        }
    }

    /// Channel results become playlists
    pub fn expands_channels(&self) -> bool {
        matches!(self, SkillProfile::Music)
    }
}

impl fmt::Display for SkillProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SkillProfile {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "skill-invidious" => Ok(SkillProfile::Video),
            "music" | "skill-invidious-music" => Ok(SkillProfile::Music),
            other => Err(SkillError::BadRequest(format!("Unknown skill profile: {}", other))),
        }
    }
}

/// Invidious search skill
#[derive(Debug)]
pub struct InvidiousSkill {
    skill_id: String,
    profile: SkillProfile,
    settings: SkillSettings,
    client: InvidiousClient,
    scorer: RelevanceScorer,
    adapter: ResultAdapter,
    pool: Option<InstancePool>,
}

impl InvidiousSkill {
    pub fn new(
        skill_id: impl Into<String>,
        profile: SkillProfile,
        settings: SkillSettings,
    ) -> SkillResult<Self> {
        let skill_id = skill_id.into();
        let settings = settings.normalized();
        let client = InvidiousClient::new(settings.watch_url_style)?;
        let scorer = RelevanceScorer::new(
            profile.scoring_policy(),
            Vocabulary::from_voc_str(SERVICE_VOCABULARY),
            settings.fallback_mode,
        );
        let adapter = ResultAdapter::new(
            skill_id.clone(),
            profile.icon(),
            Vocabulary::new(&settings.blacklist_keywords),
            settings.channel_max_videos,
        );

        Ok(Self {
            skill_id,
            profile,
            settings,
            client,
            scorer,
            adapter,
            pool: None,
        })
    }

    /// Build a skill from the host's settings mapping
    pub fn from_host_settings(
        skill_id: impl Into<String>,
        profile: SkillProfile,
        settings: serde_json::Value,
    ) -> SkillResult<Self> {
        let settings = SkillSettings::from_value(settings)?;
        Self::new(skill_id, profile, settings)
    }

    pub fn runtime_requirements() -> RuntimeRequirements {
        RuntimeRequirements::online_headless()
    }

    pub fn skill_id(&self) -> &str {
        &self.skill_id
    }

    pub fn profile(&self) -> SkillProfile {
        self.profile
    }

    pub fn settings(&self) -> &SkillSettings {
        &self.settings
    }

    pub fn client(&self) -> &InvidiousClient {
        &self.client
    }

    pub fn supported_media(&self) -> &'static [MediaType] {
        self.profile.supported_media()
    }

    /// Current pool, if resolved
    pub fn pool(&self) -> Option<&InstancePool> {
        self.pool.as_ref()
    }

    /// Re-run discovery and rebuild the pool, resetting the cursor
    pub async fn refresh_instances(&mut self) -> &InstancePool {
        let management = &self.settings.instance_management;
        let source: Box<dyn CandidateSource> = if management.discovery_enabled {
            Box::new(RedirectPageSource::new(
                self.client.clone(),
                management.discovery_url.clone(),
            ))
        } else {
            Box::new(NoDiscovery)
        };

        let pool =
            InstancePool::resolve(source.as_ref(), management, &self.settings.instances).await;
        self.pool.insert(pool)
    }

    /// Live instance for the next request
    pub async fn current_instance(&mut self) -> Option<String> {
        if self.pool.is_none() {
            self.refresh_instances().await;
        }
        let pool = self.pool.as_mut()?;
        pool.select_live(&self.client).await
    }

    /// Search for `phrase`
    ///
    /// Returns entries (and, for the music variant, channel playlists) in
    /// upstream order. Every failure along the way yields fewer or no
    /// results; the returned vector is finite and a new call re-runs the
    /// search.
    pub async fn search(&mut self, phrase: &str, media_type: MediaType) -> Vec<MediaItem> {
        if !self.supported_media().contains(&media_type) {
            debug!(media_type = %media_type, skill = %self.profile, "Unsupported media type");
            return Vec::new();
        }

        let analysis = self.scorer.analyze_phrase(phrase);
        if analysis.cleaned.is_empty() {
            debug!("Nothing left to search for after removing the service name");
            return Vec::new();
        }

        let Some(endpoint) = self.current_instance().await else {
            debug!("No Invidious instances configured");
            return Vec::new();
        };

        let query = SearchQuery::from_settings(
            &analysis.cleaned,
            &self.settings.search,
            self.profile.default_search_type(),
        );
        let records = self.client.search(&endpoint, &query).await;

        let ctx = ScoringContext {
            analysis: &analysis,
            base_score: self.scorer.media_type_score(media_type),
            media_type,
        };

        let mut items = Vec::with_capacity(records.len());
        for record in &records {
            match record.kind {
                ResultKind::Video => {
                    let score = self.scorer.score_analyzed(
                        ctx.analysis,
                        record,
                        record.index,
                        ctx.base_score,
                        media_type,
                    );
                    items.push(MediaItem::Entry(self.adapter.to_entry(record, score, media_type)));
                }
                ResultKind::Channel if self.profile.expands_channels() => {
                    if let Some(playlist) = self
                        .adapter
                        .expand_channel(&self.client, &endpoint, record, &self.scorer, &ctx)
                        .await
                    {
                        items.push(MediaItem::Playlist(playlist));
                    }
                }
                ResultKind::Channel => {
                    debug!(channel = %record.title, "Skipping channel result");
                }
            }
        }

        info!(
            instance = %endpoint,
            phrase = %analysis.cleaned,
            explicit = analysis.explicit_request,
            results = items.len(),
            "Invidious search complete"
        );

        items
    }
}
