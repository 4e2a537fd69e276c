use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{sanitize_for_synthesis, CreditsInfo, EngineKind, TtsEngine, VoiceDescriptor};
use crate::config::TtsConfig;
use crate::error::{Result, SeiyuError};
use crate::profile::VoiceAssignment;

const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";

#[derive(Debug, Serialize)]
struct SynthesisRequest {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<ApiVoice>,
}

#[derive(Debug, Deserialize)]
struct ApiVoice {
    voice_id: String,
    name: String,
    category: Option<String>,
    #[serde(default)]
    labels: serde_json::Map<String, serde_json::Value>,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    #[serde(default)]
    character_count: i64,
    #[serde(default)]
    character_limit: i64,
}

/// ElevenLabs adapter; the paid engine of the set
pub struct ElevenLabsEngine {
    client: Client,
    base_url: String,
}

impl ElevenLabsEngine {
    pub fn new(config: &TtsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            base_url: config.elevenlabs_endpoint.clone(),
        }
    }

    async fn request_synthesis(&self, text: &str, voice: &VoiceAssignment) -> Result<Vec<u8>> {
        if voice.voice_id.is_empty() {
            return Err(SeiyuError::Tts(
                "ElevenLabs synthesis requires a voice_id".to_string(),
            ));
        }
        if voice.api_key.is_empty() {
            return Err(SeiyuError::Tts(
                "ElevenLabs synthesis requires an API key".to_string(),
            ));
        }

        let clean = sanitize_for_synthesis(text);
        if clean.is_empty() {
            return Err(SeiyuError::Tts("Nothing to synthesize after cleanup".to_string()));
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, voice.voice_id);
        let request = SynthesisRequest {
            text: clean,
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        debug!("Sending synthesis request to {}", url);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &voice.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SeiyuError::Tts(format!(
                "ElevenLabs synthesis failed: HTTP {}",
                status
            )));
        }

        let audio = response.bytes().await?;
        info!("Synthesized {} bytes for voice '{}'", audio.len(), voice.voice_id);
        Ok(audio.to_vec())
    }

    /// Pull a gender hint out of the voice's label map when present
    fn gender_from_labels(labels: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
        for (key, value) in labels {
            if key.to_lowercase().contains("gender") {
                if let Some(text) = value.as_str() {
                    return Some(text.to_lowercase());
                }
            }
        }
        None
    }
}

#[async_trait]
impl TtsEngine for ElevenLabsEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::ElevenLabs
    }

    async fn list_voices<'a>(&self, api_key: Option<&'a str>) -> Result<Vec<VoiceDescriptor>> {
        let api_key = api_key.ok_or_else(|| {
            SeiyuError::Tts("Listing ElevenLabs voices requires an API key".to_string())
        })?;

        let url = format!("{}/voices", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("xi-api-key", api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SeiyuError::Tts(format!(
                "ElevenLabs voice listing failed: HTTP {}",
                response.status()
            )));
        }

        let body: VoicesResponse = response.json().await?;
        let voices = body
            .voices
            .into_iter()
            .map(|voice| VoiceDescriptor {
                gender: Self::gender_from_labels(&voice.labels),
                id: voice.voice_id,
                name: voice.name,
                category: voice.category.or_else(|| Some("generated".to_string())),
                locale: Some("en".to_string()),
                preview_url: voice.preview_url,
            })
            .collect();

        Ok(voices)
    }

    async fn synthesize(&self, text: &str, voice: &VoiceAssignment) -> Result<Vec<u8>> {
        self.request_synthesis(text, voice).await
    }

    async fn test_voice(&self, voice: &VoiceAssignment, test_text: &str) -> Result<Vec<u8>> {
        self.request_synthesis(test_text, voice).await
    }

    async fn check_availability(&self) -> Result<()> {
        // No credential-free health endpoint; reaching the API host is
        // the best available signal.
        let url = format!("{}/voices", self.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| SeiyuError::Tts(format!("ElevenLabs unreachable: {}", e)))?;
        Ok(())
    }

    async fn estimate_credits(&self, api_key: &str) -> Result<CreditsInfo> {
        let url = format!("{}/user/subscription", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("xi-api-key", api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                let body: SubscriptionResponse = response.json().await?;
                Ok(CreditsInfo {
                    available: body.character_limit - body.character_count,
                    used: body.character_count,
                    total: body.character_limit,
                })
            }
            401 => Err(SeiyuError::Tts("Invalid ElevenLabs API key".to_string())),
            status => Err(SeiyuError::Tts(format!(
                "ElevenLabs subscription check failed: HTTP {}",
                status
            ))),
        }
    }
}
