use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::gender::{infer_gender, Gender};
use super::parser::DialogueEntry;

/// One attributed line within a character record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterLine {
    pub text: String,
    pub duration: f64,
    pub start_offset: f64,
}

/// Aggregated view of one speaker across a subtitle set.
///
/// Invariant: `total_lines == lines.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub total_lines: u64,
    pub total_duration: f64,
    pub gender: Gender,
    /// Attributed lines in subtitle encounter order
    pub lines: Vec<CharacterLine>,
}

impl CharacterRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_lines: 0,
            total_duration: 0.0,
            gender: Gender::Unknown,
            lines: Vec::new(),
        }
    }
}

/// Summary row for presentation layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStat {
    pub name: String,
    pub lines: u64,
    /// Total spoken duration in seconds, rounded to 2 decimal places
    pub duration: f64,
    pub gender: Gender,
}

/// Group dialogue entries by speaker and accumulate per-character totals.
///
/// A fresh map is built on every call; re-running over the same entries
/// yields an identical result and never merges into prior state.
pub fn analyze_characters(entries: &[DialogueEntry]) -> BTreeMap<String, CharacterRecord> {
    let mut characters: BTreeMap<String, CharacterRecord> = BTreeMap::new();

    for entry in entries {
        let record = characters
            .entry(entry.speaker.clone())
            .or_insert_with(|| CharacterRecord::new(&entry.speaker));

        record.total_lines += 1;
        record.total_duration += entry.duration;
        record.gender = infer_gender(&entry.speaker);
        record.lines.push(CharacterLine {
            text: entry.text.clone(),
            duration: entry.duration,
            start_offset: entry.start_offset,
        });
    }

    characters
}

/// Produce summary rows sorted by line count descending.
///
/// The map iterates in name order and the sort is stable, so characters
/// with equal line counts stay alphabetical.
pub fn character_stats(characters: &BTreeMap<String, CharacterRecord>) -> Vec<CharacterStat> {
    let mut stats: Vec<CharacterStat> = characters
        .values()
        .map(|record| CharacterStat {
            name: record.name.clone(),
            lines: record.total_lines,
            duration: (record.total_duration * 100.0).round() / 100.0,
            gender: record.gender,
        })
        .collect();

    stats.sort_by(|a, b| b.lines.cmp(&a.lines));
    stats
}
