// Looser, prefix-based character attribution for cost estimation.
//
// Used when dialogue text is not pre-split by speaker metadata but carries
// an inline "Name: text" or "Name - text" prefix inside a combined blob.
// The token figure is a cost proxy (alphanumeric-or-whitespace characters
// of the cleaned text), not a literal API billing unit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket label for blobs that match no candidate character
pub const UNKNOWN_CHARACTER: &str = "Unknown";

static COLON_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^:]+:\s*").unwrap());
static DASH_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^-]+-\s*").unwrap());
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Accumulated text statistics for one character bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStats {
    pub total_lines: u64,
    pub total_chars: u64,
    pub total_words: u64,
    pub avg_line_length: f64,
    /// Cost-proxy token count: alphanumeric-or-whitespace characters
    pub tokens: u64,
}

/// Attributes raw text blobs to characters and accumulates token counts
pub struct TextCounter {
    paid_engine: String,
    character_texts: BTreeMap<String, Vec<String>>,
    character_stats: BTreeMap<String, TextStats>,
}

impl TextCounter {
    /// `paid_engine` is the engine identifier whose synthesis is billed;
    /// every other engine estimates as free.
    pub fn new(paid_engine: impl Into<String>) -> Self {
        Self {
            paid_engine: paid_engine.into(),
            character_texts: BTreeMap::new(),
            character_stats: BTreeMap::new(),
        }
    }

    /// Attribute each blob to the first matching candidate name and
    /// recompute all bucket statistics. Clears state from prior runs.
    pub fn analyze<S: AsRef<str>>(&mut self, blobs: &[S], candidate_names: &[String]) {
        self.character_texts.clear();
        self.character_stats.clear();

        for blob in blobs {
            let text = blob.as_ref();
            let character = identify_character(text, candidate_names);
            let clean = clean_text(text);
            self.character_texts
                .entry(character)
                .or_default()
                .push(clean);
        }

        for (character, texts) in &self.character_texts {
            self.character_stats
                .insert(character.clone(), calculate_stats(texts));
        }
    }

    /// Token count for one character, zero when unseen
    pub fn character_tokens(&self, character_name: &str) -> u64 {
        self.character_stats
            .get(character_name)
            .map(|stats| stats.tokens)
            .unwrap_or(0)
    }

    pub fn all_character_stats(&self) -> &BTreeMap<String, TextStats> {
        &self.character_stats
    }

    /// Sum of token proxies across every bucket
    pub fn total_tokens(&self) -> u64 {
        self.character_stats.values().map(|stats| stats.tokens).sum()
    }

    /// Estimated synthesis cost for one character on a target engine.
    ///
    /// Only the configured paid engine bills by the token proxy; every
    /// other engine estimates as zero.
    pub fn estimate_cost_by_engine(&self, character_name: &str, tts_engine: &str) -> u64 {
        if tts_engine == self.paid_engine {
            self.character_tokens(character_name)
        } else {
            0
        }
    }
}

/// Find the first candidate name matching a `Name:` or `Name -` prefix
/// at the blob's start, case-insensitively.
fn identify_character(text: &str, candidate_names: &[String]) -> String {
    let text_lower = text.to_lowercase();

    for name in candidate_names {
        let name_lower = name.to_lowercase();
        if text_lower.starts_with(&format!("{}:", name_lower))
            || text_lower.starts_with(&format!("{} -", name_lower))
        {
            return name.clone();
        }
    }

    UNKNOWN_CHARACTER.to_string()
}

/// Strip the speaker prefix, markup tags and extra whitespace
fn clean_text(text: &str) -> String {
    let text = COLON_PREFIX.replace(text, "");
    let text = DASH_PREFIX.replace(&text, "");
    let text = MARKUP_TAG.replace_all(&text, "");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

fn calculate_stats(texts: &[String]) -> TextStats {
    if texts.is_empty() {
        return TextStats::default();
    }

    let total_lines = texts.len() as u64;
    let total_chars: u64 = texts.iter().map(|text| text.chars().count() as u64).sum();
    let total_words: u64 = texts
        .iter()
        .map(|text| text.split_whitespace().count() as u64)
        .sum();
    let tokens: u64 = texts
        .iter()
        .map(|text| {
            text.chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .count() as u64
        })
        .sum();

    TextStats {
        total_lines,
        total_chars,
        total_words,
        avg_line_length: total_chars as f64 / total_lines as f64,
        tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_colon_prefix_attribution() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(
            &["Kowalski: Dzień dobry!", "Zofia: Cześć."],
            &names(&["Kowalski", "Zofia"]),
        );

        let stats = counter.all_character_stats();
        assert_eq!(stats["Kowalski"].total_lines, 1);
        assert_eq!(stats["Zofia"].total_lines, 1);
        assert!(!stats.contains_key(UNKNOWN_CHARACTER));
    }

    #[test]
    fn test_dash_prefix_and_case_insensitive() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(
            &["KOWALSKI: Tak.", "kowalski - Nie."],
            &names(&["Kowalski"]),
        );
        assert_eq!(counter.all_character_stats()["Kowalski"].total_lines, 2);
    }

    #[test]
    fn test_unmatched_blob_lands_in_unknown() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(&["Nobody here.", "Zofia: Cześć."], &names(&["Zofia"]));

        let stats = counter.all_character_stats();
        assert_eq!(stats[UNKNOWN_CHARACTER].total_lines, 1);
        assert_eq!(stats["Zofia"].total_lines, 1);
    }

    #[test]
    fn test_prefix_and_markup_stripped() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(&["Zofia: <i>Cześć</i>   świecie"], &names(&["Zofia"]));

        let stats = &counter.all_character_stats()["Zofia"];
        // "Cześć świecie": 13 chars, 12 alphanumeric-or-space
        assert_eq!(stats.total_chars, 13);
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.tokens, 13);
    }

    #[test]
    fn test_token_count_excludes_punctuation() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(&["Zofia: Tak, tak!"], &names(&["Zofia"]));

        let stats = &counter.all_character_stats()["Zofia"];
        // "Tak, tak!" -> 9 chars, tokens drop ',' and '!'
        assert_eq!(stats.total_chars, 9);
        assert_eq!(stats.tokens, 7);
    }

    #[test]
    fn test_avg_line_length() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(&["Zofia: abcd", "Zofia: ab"], &names(&["Zofia"]));
        assert_eq!(counter.all_character_stats()["Zofia"].avg_line_length, 3.0);
    }

    #[test]
    fn test_paid_engine_cost_estimation() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(&["Zofia: Tak"], &names(&["Zofia"]));

        let tokens = counter.character_tokens("Zofia");
        assert!(tokens > 0);
        assert_eq!(counter.estimate_cost_by_engine("Zofia", "elevenlabs"), tokens);
        assert_eq!(counter.estimate_cost_by_engine("Zofia", "edge_tts"), 0);
        assert_eq!(counter.estimate_cost_by_engine("Zofia", "no_such_engine"), 0);
    }

    #[test]
    fn test_rerun_clears_previous_state() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(&["Zofia: Tak"], &names(&["Zofia"]));
        counter.analyze(&["Marek: Nie"], &names(&["Marek"]));

        assert_eq!(counter.character_tokens("Zofia"), 0);
        assert!(counter.character_tokens("Marek") > 0);
    }

    #[test]
    fn test_total_tokens() {
        let mut counter = TextCounter::new("elevenlabs");
        counter.analyze(
            &["Zofia: ab", "Marek: cd"],
            &names(&["Zofia", "Marek"]),
        );
        assert_eq!(counter.total_tokens(), 4);
    }
}
