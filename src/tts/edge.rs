use async_trait::async_trait;
use std::process::Command;
use tracing::{debug, info, warn};

use super::{sanitize_for_synthesis, CreditsInfo, EngineKind, TtsEngine, VoiceDescriptor};
use crate::config::TtsConfig;
use crate::error::{Result, SeiyuError};
use crate::profile::VoiceAssignment;

/// Neural voices known to exist even when the binary cannot be queried
const FALLBACK_VOICES: [(&str, &str, &str); 4] = [
    ("pl-PL-MarekNeural", "Male", "pl-PL"),
    ("pl-PL-ZofiaNeural", "Female", "pl-PL"),
    ("en-US-AriaNeural", "Female", "en-US"),
    ("en-US-GuyNeural", "Male", "en-US"),
];

/// Microsoft Edge TTS adapter; free engine driven through the
/// `edge-tts` executable
pub struct EdgeTtsEngine {
    binary_path: String,
}

impl EdgeTtsEngine {
    pub fn new(config: &TtsConfig) -> Self {
        Self {
            binary_path: config.edge_binary_path.clone(),
        }
    }

    fn fallback_voices() -> Vec<VoiceDescriptor> {
        FALLBACK_VOICES
            .iter()
            .map(|(name, gender, locale)| VoiceDescriptor {
                id: name.to_string(),
                name: name.to_string(),
                category: None,
                gender: Some(gender.to_lowercase()),
                locale: Some(locale.to_string()),
                preview_url: None,
            })
            .collect()
    }

    /// Parse `edge-tts --list-voices` output: a header, a separator and
    /// then one `ShortName Gender ...` row per voice. Only Polish and
    /// English locales are of interest for dubbing work.
    fn parse_voice_listing(stdout: &str) -> Vec<VoiceDescriptor> {
        let mut voices = Vec::new();
        for line in stdout.lines().skip(2) {
            let mut columns = line.split_whitespace();
            let (Some(short_name), gender) = (columns.next(), columns.next()) else {
                continue;
            };
            if !short_name.starts_with("pl-") && !short_name.starts_with("en-") {
                continue;
            }

            let locale = short_name.splitn(3, '-').take(2).collect::<Vec<_>>().join("-");
            voices.push(VoiceDescriptor {
                id: short_name.to_string(),
                name: short_name.to_string(),
                category: None,
                gender: gender.map(|g| g.to_lowercase()),
                locale: Some(locale),
                preview_url: None,
            });
        }
        voices
    }

    async fn synthesize_to_bytes(&self, text: &str, voice_name: &str) -> Result<Vec<u8>> {
        let clean = sanitize_for_synthesis(text);
        if clean.is_empty() {
            return Err(SeiyuError::Tts("Nothing to synthesize after cleanup".to_string()));
        }

        let output_file = tempfile::Builder::new()
            .suffix(".mp3")
            .tempfile()
            .map_err(|e| SeiyuError::Tts(format!("Failed to create temp audio file: {}", e)))?;

        debug!("Running {} for voice '{}'", self.binary_path, voice_name);
        let output = Command::new(&self.binary_path)
            .arg("--voice")
            .arg(voice_name)
            .arg("--text")
            .arg(&clean)
            .arg("--write-media")
            .arg(output_file.path())
            .output()
            .map_err(|e| SeiyuError::Tts(format!("Failed to execute edge-tts: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SeiyuError::Tts(format!("edge-tts synthesis failed: {}", stderr)));
        }

        let audio = tokio::fs::read(output_file.path()).await?;
        info!("Synthesized {} bytes with voice '{}'", audio.len(), voice_name);
        Ok(audio)
    }
}

#[async_trait]
impl TtsEngine for EdgeTtsEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::EdgeTts
    }

    async fn list_voices<'a>(&self, _api_key: Option<&'a str>) -> Result<Vec<VoiceDescriptor>> {
        let result = Command::new(&self.binary_path).arg("--list-voices").output();

        match result {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let voices = Self::parse_voice_listing(&stdout);
                if voices.is_empty() {
                    warn!("edge-tts returned no parseable voices, using fallback list");
                    Ok(Self::fallback_voices())
                } else {
                    Ok(voices)
                }
            }
            _ => {
                warn!("edge-tts binary unavailable, using fallback voice list");
                Ok(Self::fallback_voices())
            }
        }
    }

    async fn synthesize(&self, text: &str, voice: &VoiceAssignment) -> Result<Vec<u8>> {
        self.synthesize_to_bytes(text, &voice.voice).await
    }

    async fn test_voice(&self, voice: &VoiceAssignment, test_text: &str) -> Result<Vec<u8>> {
        self.synthesize_to_bytes(test_text, &voice.voice).await
    }

    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("--list-voices")
            .output()
            .map_err(|e| SeiyuError::Tts(format!("edge-tts not found: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SeiyuError::Tts("edge-tts voice listing failed".to_string()))
        }
    }

    async fn estimate_credits(&self, _api_key: &str) -> Result<CreditsInfo> {
        Err(SeiyuError::Tts(
            "Engine 'edge_tts' does not report credits".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_voice_listing_filters_locales() {
        let listing = "Name                              Gender\n\
                       --------------------------------  ------\n\
                       pl-PL-MarekNeural                 Male\n\
                       de-DE-KatjaNeural                 Female\n\
                       en-US-AriaNeural                  Female";
        let voices = EdgeTtsEngine::parse_voice_listing(listing);

        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].id, "pl-PL-MarekNeural");
        assert_eq!(voices[0].gender.as_deref(), Some("male"));
        assert_eq!(voices[0].locale.as_deref(), Some("pl-PL"));
        assert_eq!(voices[1].id, "en-US-AriaNeural");
    }

    #[test]
    fn test_fallback_voices_cover_both_locales() {
        let voices = EdgeTtsEngine::fallback_voices();
        assert!(voices.iter().any(|v| v.locale.as_deref() == Some("pl-PL")));
        assert!(voices.iter().any(|v| v.locale.as_deref() == Some("en-US")));
    }

    #[tokio::test]
    async fn test_credits_unsupported() {
        let config = crate::config::Config::default();
        let engine = EdgeTtsEngine::new(&config.tts);
        assert!(matches!(
            engine.estimate_credits("key").await,
            Err(SeiyuError::Tts(_))
        ));
    }
}
