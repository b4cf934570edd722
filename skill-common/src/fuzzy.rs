//! Fuzzy string matching
//!
//! All strategies return a similarity in `[0.0, 1.0]` where 1.0 is identical.
//! Inputs are compared as given; callers normalise case first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Named string-distance strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Normalised Levenshtein similarity of the whole strings
    #[default]
    Ratio,
    /// Ratio after sorting whitespace tokens
    TokenSortRatio,
    /// Best ratio between the shared tokens and each side's remainder
    TokenSetRatio,
    /// Normalised Damerau-Levenshtein similarity
    DamerauLevenshteinSimilarity,
    JaroWinkler,
    SorensenDice,
}

/// Similarity between `a` and `b` under `strategy`
pub fn fuzzy_match(a: &str, b: &str, strategy: MatchStrategy) -> f64 {
    let score = match strategy {
        MatchStrategy::Ratio => ratio(a, b),
        MatchStrategy::TokenSortRatio => token_sort_ratio(a, b),
        MatchStrategy::TokenSetRatio => token_set_ratio(a, b),
        MatchStrategy::DamerauLevenshteinSimilarity => {
            strsim::normalized_damerau_levenshtein(a, b)
        }
        MatchStrategy::JaroWinkler => strsim::jaro_winkler(a, b),
        MatchStrategy::SorensenDice => strsim::sorensen_dice(a, b),
    };
    score.clamp(0.0, 1.0)
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let sorted = |s: &str| {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    };
    ratio(&sorted(a), &sorted(b))
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    // One side's tokens are a subset of the other's
    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    let sect = intersection.join(" ");
    let rest_a = diff_ab.join(" ");
    let rest_b = diff_ba.join(" ");

    let mut best = ratio(&rest_a, &rest_b);
    if !sect.is_empty() {
        let combined_a = format!("{} {}", sect, rest_a);
        let combined_b = format!("{} {}", sect, rest_b);
        best = best
            .max(ratio(&sect, &combined_a))
            .max(ratio(&sect, &combined_b))
            .max(ratio(&combined_a, &combined_b));
    }
    best
}
