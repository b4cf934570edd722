//! Relevance scoring
//!
//! Turns one search record into a 0-100 match confidence:
//!
//! ```text
//! score = base
//!       + explicit_request_bonus        (phrase names the service)
//!       - index * index_penalty         (upstream rank decay)
//!       + title_weight  * fuzzy(phrase, title)
//!       + artist_weight * fuzzy(phrase, artist)
//!       + official_bonus                (title says "official")
//!       - generic_penalty               (generic media request)
//!       - fallback_penalty              (fallback mode, not explicit)
//! ```
//!
//! The service mention is stripped from the phrase before fuzzy matching.
//! The result is rounded and clamped to `[0, 100]`. Scoring is a pure
//! function of its inputs.

use crate::models::SearchResult;
use once_cell::sync::Lazy;
use regex::Regex;
use skill_common::{fuzzy_match, MatchStrategy, MediaType, Vocabulary};

static OFFICIAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bofficial\b").expect("static regex"));

/// Weights and bonuses of one skill variant
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringPolicy {
    pub music_bonus: i32,
    pub audio_bonus: i32,
    pub video_bonus: i32,
    pub explicit_request_bonus: i32,
    /// Subtracted once per position in the upstream result order
    pub index_penalty: u32,
    pub title_weight: f64,
    pub title_strategy: MatchStrategy,
    pub artist_weight: f64,
    pub artist_strategy: MatchStrategy,
    pub generic_penalty: i32,
    pub official_bonus: i32,
    /// Applied in fallback mode unless the user named the service
    pub fallback_penalty: i32,
}

impl ScoringPolicy {
    /// General video search
    pub fn video() -> Self {
        Self {
            music_bonus: 10,
            audio_bonus: 0,
            video_bonus: 15,
            explicit_request_bonus: 50,
            index_penalty: 5,
            title_weight: 80.0,
            title_strategy: MatchStrategy::DamerauLevenshteinSimilarity,
            artist_weight: 80.0,
            artist_strategy: MatchStrategy::TokenSetRatio,
            generic_penalty: 10,
            official_bonus: 0,
            fallback_penalty: 0,
        }
    }

    /// Music search; favours titles and official uploads
    pub fn music() -> Self {
        Self {
            music_bonus: 15,
            audio_bonus: 5,
            video_bonus: 0,
            explicit_request_bonus: 50,
            index_penalty: 5,
            title_weight: 70.0,
            title_strategy: MatchStrategy::TokenSetRatio,
            artist_weight: 40.0,
            artist_strategy: MatchStrategy::TokenSetRatio,
            generic_penalty: 10,
            official_bonus: 10,
            fallback_penalty: 30,
        }
    }
}

/// Phrase with the service mention removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseAnalysis {
    /// Lower-cased phrase without the service mention
    pub cleaned: String,
    /// The user named the service
    pub explicit_request: bool,
}

/// Scores records against the user's phrase
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    policy: ScoringPolicy,
    service_vocabulary: Vocabulary,
    fallback_mode: bool,
}

impl RelevanceScorer {
    pub fn new(policy: ScoringPolicy, service_vocabulary: Vocabulary, fallback_mode: bool) -> Self {
        Self {
            policy,
            service_vocabulary,
            fallback_mode,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Starting score for a requested media type
    pub fn media_type_score(&self, media_type: MediaType) -> i32 {
        match media_type {
            MediaType::Music => self.policy.music_bonus,
            MediaType::Audio => self.policy.audio_bonus,
            MediaType::Video => self.policy.video_bonus,
            _ => 0,
        }
    }

    /// Detect and strip a service mention
    pub fn analyze_phrase(&self, phrase: &str) -> PhraseAnalysis {
        let explicit_request = self.service_vocabulary.matches(phrase);
        let cleaned = if explicit_request {
            self.service_vocabulary.remove(phrase)
        } else {
            phrase.trim().to_string()
        };

        PhraseAnalysis {
            cleaned: cleaned.to_lowercase(),
            explicit_request,
        }
    }

    /// Match confidence of `record` at upstream position `index`
    pub fn calc_score(
        &self,
        phrase: &str,
        record: &SearchResult,
        index: usize,
        base_score: i32,
        media_type: MediaType,
    ) -> u8 {
        let analysis = self.analyze_phrase(phrase);
        self.score_analyzed(&analysis, record, index, base_score, media_type)
    }

    /// `calc_score` for a phrase already run through `analyze_phrase`
    pub fn score_analyzed(
        &self,
        analysis: &PhraseAnalysis,
        record: &SearchResult,
        index: usize,
        base_score: i32,
        media_type: MediaType,
    ) -> u8 {
        let policy = &self.policy;
        let phrase = analysis.cleaned.as_str();

        let mut score = f64::from(base_score);

        if analysis.explicit_request {
            score += f64::from(policy.explicit_request_bonus);
        }

        score -= index as f64 * f64::from(policy.index_penalty);

        if !record.author.is_empty() {
            score += policy.artist_weight
                * fuzzy_match(phrase, &record.author.to_lowercase(), policy.artist_strategy);
        }
        if !record.title.is_empty() {
            score += policy.title_weight
                * fuzzy_match(phrase, &record.title.to_lowercase(), policy.title_strategy);
            if OFFICIAL_MARKER.is_match(&record.title) {
                score += f64::from(policy.official_bonus);
            }
        }

        if media_type == MediaType::Generic {
            score -= f64::from(policy.generic_penalty);
        }

        if self.fallback_mode && !analysis.explicit_request {
            score -= f64::from(policy.fallback_penalty);
        }

        score.round().clamp(0.0, 100.0) as u8
    }

    /// Aggregate confidence of a group of entries (rounded mean)
    pub fn aggregate(scores: &[u8]) -> u8 {
        if scores.is_empty() {
            return 0;
        }
        let total: u32 = scores.iter().map(|s| u32::from(*s)).sum();
        (f64::from(total) / scores.len() as f64).round() as u8
    }
}
