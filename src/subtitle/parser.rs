use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::timecode::parse_timecode;

static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// One timed dialogue cue from a subtitle document.
///
/// Created once per parsed block and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    /// The cue's declared ordinal; not guaranteed unique or sorted
    pub sequence_id: i64,
    /// Speaker label taken verbatim from the cue; may be empty or "Unknown"
    pub speaker: String,
    pub start_offset: f64,
    pub end_offset: f64,
    /// `end_offset - start_offset`; malformed input can make this negative
    pub duration: f64,
    /// Dialogue text, lines joined with `\n`, each trimmed
    pub text: String,
}

/// Why a candidate block was dropped during parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Fewer than four non-empty lines
    TooFewLines,
    /// First line is not an integer sequence number
    InvalidSequenceId,
    /// Third line does not contain a `start --> end` range
    MissingTimeRange,
    /// A time-range component failed to parse
    MalformedTimecode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    /// Zero-based index of the candidate block in the document
    pub block_index: usize,
    pub reason: SkipReason,
}

/// Result of parsing a subtitle document.
///
/// Malformed blocks never fail the parse; they are recorded in `skipped`
/// so callers can distinguish "no dialogue" from "dialogue with errors".
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    /// Successfully parsed cues, in document order
    pub entries: Vec<DialogueEntry>,
    pub skipped: Vec<SkippedBlock>,
}

/// Parse a subtitle document with per-cue speaker labels.
///
/// The expected cue format is four or more consecutive non-blank lines
/// separated from neighboring cues by a blank line: sequence number,
/// speaker label, `start --> end` time range, then one or more lines of
/// dialogue text.
pub fn parse_document(content: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (block_index, block) in BLOCK_SEPARATOR.split(content.trim()).enumerate() {
        let lines: Vec<&str> = block
            .split('\n')
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < 4 {
            report.skipped.push(SkippedBlock {
                block_index,
                reason: SkipReason::TooFewLines,
            });
            continue;
        }

        let sequence_id: i64 = match lines[0].parse() {
            Ok(id) => id,
            Err(_) => {
                debug!("Skipping block {}: sequence id '{}' is not an integer", block_index, lines[0]);
                report.skipped.push(SkippedBlock {
                    block_index,
                    reason: SkipReason::InvalidSequenceId,
                });
                continue;
            }
        };

        let speaker = lines[1].to_string();

        let time_line = lines[2];
        let time_parts: Vec<&str> = time_line.split("-->").map(|part| part.trim()).collect();
        if !time_line.contains("-->") || time_parts.len() != 2 {
            report.skipped.push(SkippedBlock {
                block_index,
                reason: SkipReason::MissingTimeRange,
            });
            continue;
        }

        let (start_offset, end_offset) =
            match (parse_timecode(time_parts[0]), parse_timecode(time_parts[1])) {
                (Ok(start), Ok(end)) => (start, end),
                _ => {
                    debug!("Skipping block {}: malformed time range '{}'", block_index, time_line);
                    report.skipped.push(SkippedBlock {
                        block_index,
                        reason: SkipReason::MalformedTimecode,
                    });
                    continue;
                }
            };

        let text = lines[3..].join("\n");

        report.entries.push(DialogueEntry {
            sequence_id,
            speaker,
            start_offset,
            end_offset,
            duration: end_offset - start_offset,
            text,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\nKowalski\n00:00:01,000 --> 00:00:03,000\nDzień dobry!\n\n2\nZofia\n00:00:04,000 --> 00:00:05,500\nCześć.\n\n3\nKowalski\n00:00:06,000 --> 00:00:09,000\nCo słychać?\nWszystko w porządku?";

    #[test]
    fn test_parse_valid_document() {
        let report = parse_document(SAMPLE);
        assert_eq!(report.entries.len(), 3);
        assert!(report.skipped.is_empty());

        let first = &report.entries[0];
        assert_eq!(first.sequence_id, 1);
        assert_eq!(first.speaker, "Kowalski");
        assert_eq!(first.start_offset, 1.0);
        assert_eq!(first.end_offset, 3.0);
        assert_eq!(first.duration, 2.0);
        assert_eq!(first.text, "Dzień dobry!");
    }

    #[test]
    fn test_multiline_text_joined() {
        let report = parse_document(SAMPLE);
        assert_eq!(report.entries[2].text, "Co słychać?\nWszystko w porządku?");
    }

    #[test]
    fn test_duration_matches_offsets() {
        let report = parse_document(SAMPLE);
        for entry in &report.entries {
            assert_eq!(entry.duration, entry.end_offset - entry.start_offset);
        }
    }

    #[test]
    fn test_malformed_time_range_dropped() {
        let report = parse_document("1\nAlice\nnot-a-timerange\nHello");
        assert!(report.entries.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingTimeRange);
    }

    #[test]
    fn test_malformed_timecode_dropped() {
        let report = parse_document("1\nAlice\nxx:yy:zz --> 00:00:02,000\nHello");
        assert!(report.entries.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::MalformedTimecode);
    }

    #[test]
    fn test_non_integer_sequence_id_dropped() {
        let content = "one\nAlice\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\nBob\n00:00:03,000 --> 00:00:04,000\nHi";
        let report = parse_document(content);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].speaker, "Bob");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].block_index, 0);
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidSequenceId);
    }

    #[test]
    fn test_short_block_dropped() {
        let report = parse_document("1\nAlice\n00:00:01,000 --> 00:00:02,000");
        assert!(report.entries.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::TooFewLines);
    }

    #[test]
    fn test_blank_line_variants_between_blocks() {
        let content = "1\nAlice\n00:00:01,000 --> 00:00:02,000\nHello\n   \n2\nBob\n00:00:03,000 --> 00:00:04,000\nHi";
        let report = parse_document(content);
        assert_eq!(report.entries.len(), 2);
    }

    #[test]
    fn test_negative_duration_preserved() {
        let report = parse_document("1\nAlice\n00:00:05,000 --> 00:00:03,000\nHello");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].duration, -2.0);
    }

    #[test]
    fn test_empty_document() {
        let report = parse_document("");
        assert!(report.entries.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }
}
