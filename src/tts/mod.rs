// Voice-synthesis engine abstraction
//
// Engines form a closed set selected via tagged dispatch: every engine
// implements the same capability trait and is constructed through the
// factory. The manager adds lookup by kind plus daily usage accounting.

pub mod edge;
pub mod elevenlabs;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::config::TtsConfig;
use crate::error::{Result, SeiyuError};
use crate::profile::VoiceAssignment;

/// Identifiers of the supported voice-synthesis engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    ElevenLabs,
    EdgeTts,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::ElevenLabs, EngineKind::EdgeTts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElevenLabs => "elevenlabs",
            Self::EdgeTts => "edge_tts",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "elevenlabs" => Ok(Self::ElevenLabs),
            "edge_tts" | "edge-tts" => Ok(Self::EdgeTts),
            _ => Err(SeiyuError::Config(format!(
                "Unknown TTS engine '{}'. Valid engines: elevenlabs, edge_tts",
                value
            ))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One voice offered by an engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Service-specific voice ID; equals `name` for engines without IDs
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub preview_url: Option<String>,
}

/// Credit balance reported by a paid voice service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsInfo {
    pub available: i64,
    pub used: i64,
    pub total: i64,
}

/// Capability interface every voice-synthesis engine implements
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TtsEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Voices offered by this engine; paid services need the credential
    async fn list_voices<'a>(&self, api_key: Option<&'a str>) -> Result<Vec<VoiceDescriptor>>;

    /// Synthesize dialogue with the character's voice settings,
    /// returning the encoded audio bytes
    async fn synthesize(&self, text: &str, voice: &VoiceAssignment) -> Result<Vec<u8>>;

    /// Short synthesis round-trip used to audition a voice
    async fn test_voice(&self, voice: &VoiceAssignment, test_text: &str) -> Result<Vec<u8>>;

    /// Whether the engine can be used right now
    async fn check_availability(&self) -> Result<()>;

    /// Remaining credit balance; engines without credit reporting
    /// return an explicit `Tts` error
    async fn estimate_credits(&self, api_key: &str) -> Result<CreditsInfo>;
}

/// Factory for constructing engine adapters from configuration
pub struct TtsEngineFactory;

impl TtsEngineFactory {
    pub fn create_engine(kind: EngineKind, config: &TtsConfig) -> Box<dyn TtsEngine> {
        match kind {
            EngineKind::ElevenLabs => Box::new(elevenlabs::ElevenLabsEngine::new(config)),
            EngineKind::EdgeTts => Box::new(edge::EdgeTtsEngine::new(config)),
        }
    }
}

/// Owns one adapter per engine kind and tracks daily usage limits
pub struct TtsManager {
    engines: BTreeMap<EngineKind, Box<dyn TtsEngine>>,
    limits: BTreeMap<String, (i64, u64)>,
}

impl TtsManager {
    pub fn new(config: &TtsConfig) -> Self {
        let mut engines: BTreeMap<EngineKind, Box<dyn TtsEngine>> = BTreeMap::new();
        for kind in EngineKind::ALL {
            engines.insert(kind, TtsEngineFactory::create_engine(kind, config));
        }

        let limits = config
            .limits
            .iter()
            .map(|(engine, limit)| (engine.clone(), (limit.daily_limit, limit.used_today)))
            .collect();

        Self { engines, limits }
    }

    #[cfg(test)]
    fn with_engines(engines: BTreeMap<EngineKind, Box<dyn TtsEngine>>) -> Self {
        Self {
            engines,
            limits: BTreeMap::new(),
        }
    }

    pub fn engine(&self, kind: EngineKind) -> Result<&dyn TtsEngine> {
        self.engines
            .get(&kind)
            .map(|engine| engine.as_ref())
            .ok_or_else(|| SeiyuError::Tts(format!("Engine '{}' is not configured", kind)))
    }

    /// Kinds whose availability check currently passes
    pub async fn available_engines(&self) -> Vec<EngineKind> {
        let mut available = Vec::new();
        for (kind, engine) in &self.engines {
            match engine.check_availability().await {
                Ok(()) => available.push(*kind),
                Err(e) => warn!("Engine '{}' unavailable: {}", kind, e),
            }
        }
        available
    }

    pub async fn list_voices(
        &self,
        kind: EngineKind,
        api_key: Option<&str>,
    ) -> Result<Vec<VoiceDescriptor>> {
        self.engine(kind)?.list_voices(api_key).await
    }

    /// Synthesize after verifying the engine's daily limit allows it
    pub async fn synthesize(
        &mut self,
        kind: EngineKind,
        text: &str,
        voice: &VoiceAssignment,
    ) -> Result<Vec<u8>> {
        let length = text.chars().count() as u64;
        if !self.can_synthesize(kind, length) {
            return Err(SeiyuError::Tts(format!(
                "Daily limit reached for engine '{}'",
                kind
            )));
        }

        let audio = self.engine(kind)?.synthesize(text, voice).await?;
        self.record_usage(kind, length);
        Ok(audio)
    }

    pub async fn test_voice(
        &self,
        kind: EngineKind,
        voice: &VoiceAssignment,
        test_text: &str,
    ) -> Result<Vec<u8>> {
        self.engine(kind)?.test_voice(voice, test_text).await
    }

    pub async fn credits(&self, kind: EngineKind, api_key: &str) -> Result<CreditsInfo> {
        self.engine(kind)?.estimate_credits(api_key).await
    }

    /// Whether synthesizing `text_length` characters stays within the
    /// engine's daily limit; unconfigured and -1 limits are unlimited
    pub fn can_synthesize(&self, kind: EngineKind, text_length: u64) -> bool {
        match self.limits.get(kind.as_str()) {
            Some((daily_limit, used_today)) => {
                *daily_limit < 0 || used_today + text_length <= *daily_limit as u64
            }
            None => true,
        }
    }

    pub fn record_usage(&mut self, kind: EngineKind, text_length: u64) {
        if let Some((_, used_today)) = self.limits.get_mut(kind.as_str()) {
            *used_today += text_length;
        }
    }

    pub fn usage(&self, kind: EngineKind) -> u64 {
        self.limits
            .get(kind.as_str())
            .map(|(_, used)| *used)
            .unwrap_or(0)
    }
}

/// Strip SSML-ish control fragments that trip the synthesis services
pub fn sanitize_for_synthesis(text: &str) -> String {
    text.replace("<break", "")
        .replace("SSML", "")
        .replace("time=", "")
        .replace("strength=", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::subtitle::Gender;

    fn voice(engine: &str) -> VoiceAssignment {
        VoiceAssignment {
            name: "Agata".to_string(),
            tts_engine: engine.to_string(),
            voice: "agata".to_string(),
            gender: Gender::Female,
            api_key: String::new(),
            voice_id: "voice-1".to_string(),
            estimated_tokens: 0,
        }
    }

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!(EngineKind::parse("elevenlabs").unwrap(), EngineKind::ElevenLabs);
        assert_eq!(EngineKind::parse("Edge_TTS").unwrap(), EngineKind::EdgeTts);
        assert_eq!(EngineKind::parse("edge-tts").unwrap(), EngineKind::EdgeTts);
        assert!(EngineKind::parse("festival").is_err());
    }

    #[test]
    fn test_sanitize_for_synthesis() {
        let raw = "<break time=\"1s\" strength=\"x\"/> Hello SSML world";
        let cleaned = sanitize_for_synthesis(raw);
        assert!(!cleaned.contains("<break"));
        assert!(!cleaned.contains("SSML"));
        assert!(!cleaned.contains("time="));
    }

    #[test]
    fn test_daily_limit_accounting() {
        let config = Config::default();
        let mut manager = TtsManager::new(&config.tts);

        // elevenlabs default limit is 10_000 characters
        assert!(manager.can_synthesize(EngineKind::ElevenLabs, 10_000));
        assert!(!manager.can_synthesize(EngineKind::ElevenLabs, 10_001));

        manager.record_usage(EngineKind::ElevenLabs, 9_500);
        assert_eq!(manager.usage(EngineKind::ElevenLabs), 9_500);
        assert!(manager.can_synthesize(EngineKind::ElevenLabs, 500));
        assert!(!manager.can_synthesize(EngineKind::ElevenLabs, 501));

        // edge_tts is unlimited (-1)
        assert!(manager.can_synthesize(EngineKind::EdgeTts, u64::MAX / 2));
    }

    #[test]
    fn test_manager_routes_synthesis_to_engine() {
        let mut mock = MockTtsEngine::new();
        mock.expect_kind().return_const(EngineKind::EdgeTts);
        mock.expect_synthesize()
            .withf(|text, _voice| text == "Cześć")
            .times(1)
            .returning(|_, _| Ok(vec![1, 2, 3]));

        let mut engines: BTreeMap<EngineKind, Box<dyn TtsEngine>> = BTreeMap::new();
        engines.insert(EngineKind::EdgeTts, Box::new(mock));
        let mut manager = TtsManager::with_engines(engines);

        let audio = tokio_test::block_on(manager.synthesize(
            EngineKind::EdgeTts,
            "Cześć",
            &voice("edge_tts"),
        ))
        .unwrap();
        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[test]
    fn test_manager_unknown_engine_errors() {
        let manager = TtsManager::with_engines(BTreeMap::new());
        let result = tokio_test::block_on(manager.test_voice(
            EngineKind::ElevenLabs,
            &voice("elevenlabs"),
            "test",
        ));
        assert!(matches!(result, Err(SeiyuError::Tts(_))));
    }
}
