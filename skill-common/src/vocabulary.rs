//! Vocabulary matching
//!
//! Detects whole-word mentions of a service name in an utterance and strips
//! them so the remaining phrase can be matched against titles.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Set of phrases naming one concept
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Phrases with their matchers, longest phrase first
    phrases: Vec<(String, Regex)>,
}

impl Vocabulary {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<(String, Regex)> = phrases
            .into_iter()
            .filter_map(|p| {
                let phrase = p.as_ref().trim().to_lowercase();
                if phrase.is_empty() {
                    return None;
                }
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&phrase));
                match Regex::new(&pattern) {
                    Ok(re) => Some((phrase, re)),
                    Err(e) => {
                        warn!(phrase = %phrase, "Skipping vocabulary phrase: {}", e);
                        None
                    }
                }
            })
            .collect();

        // Longer phrases first so "invidious music" wins over "invidious"
        phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        phrases.dedup_by(|a, b| a.0 == b.0);

        Self { phrases }
    }

    /// Parse `.voc` file content: one phrase per line, `#` starts a comment
    pub fn from_voc_str(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// True when any phrase occurs as whole words in `utterance`
    pub fn matches(&self, utterance: &str) -> bool {
        self.phrases.iter().any(|(_, re)| re.is_match(utterance))
    }

    /// Remove every vocabulary phrase from `utterance`, collapsing whitespace
    pub fn remove(&self, utterance: &str) -> String {
        let mut text = utterance.to_string();
        for (_, re) in &self.phrases {
            text = re.replace_all(&text, " ").into_owned();
        }
        WHITESPACE.replace_all(text.trim(), " ").into_owned()
    }
}
