// Character voice profiles
//
// A profile is the persisted set of per-character voice configurations for
// one dubbing project, stored as a single JSON document per project.

pub mod store;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SeiyuError};
use crate::subtitle::Gender;

pub use store::ProfileStore;

const PROFILE_VERSION: &str = "1.0";

/// Voice configuration for one character within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAssignment {
    pub name: String,
    pub tts_engine: String,
    pub voice: String,
    pub gender: Gender,
    /// Opaque service credential, stored in plaintext with the profile
    pub api_key: String,
    /// Service-specific voice ID (used by ElevenLabs)
    pub voice_id: String,
    /// Estimated paid-synthesis units this character will consume
    pub estimated_tokens: u64,
}

/// Partial update for an existing voice assignment
#[derive(Debug, Clone, Default)]
pub struct VoiceUpdate {
    pub tts_engine: Option<String>,
    pub voice: Option<String>,
    pub gender: Option<Gender>,
    pub api_key: Option<String>,
    pub voice_id: Option<String>,
    pub estimated_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub anime_name: String,
    /// ISO-8601 creation timestamp
    pub created_date: String,
    /// ISO-8601 timestamp, touched on every mutating character operation
    pub last_modified: String,
    pub version: String,
}

/// Per-project mapping from character name to voice configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub metadata: ProfileMetadata,
    pub characters: BTreeMap<String, VoiceAssignment>,
}

/// Aggregate view over a profile's character set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_characters: usize,
    /// Character count per TTS engine identifier
    pub engines_used: BTreeMap<String, usize>,
    pub created: String,
    pub modified: String,
}

impl CharacterProfile {
    pub fn new(anime_name: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            metadata: ProfileMetadata {
                anime_name: anime_name.into(),
                created_date: now.clone(),
                last_modified: now,
                version: PROFILE_VERSION.to_string(),
            },
            characters: BTreeMap::new(),
        }
    }

    fn touch(&mut self) {
        self.metadata.last_modified = Utc::now().to_rfc3339();
    }

    /// Insert or overwrite the full voice assignment for `name`
    pub fn add_character(&mut self, assignment: VoiceAssignment) {
        self.characters.insert(assignment.name.clone(), assignment);
        self.touch();
    }

    /// Apply a partial update to an existing character.
    ///
    /// Fails when `name` is absent; callers must `add_character` first.
    pub fn update_character(&mut self, name: &str, update: VoiceUpdate) -> Result<()> {
        let assignment = self.characters.get_mut(name).ok_or_else(|| {
            SeiyuError::Profile(format!(
                "Cannot update '{}': character is not in profile '{}'",
                name, self.metadata.anime_name
            ))
        })?;

        if let Some(tts_engine) = update.tts_engine {
            assignment.tts_engine = tts_engine;
        }
        if let Some(voice) = update.voice {
            assignment.voice = voice;
        }
        if let Some(gender) = update.gender {
            assignment.gender = gender;
        }
        if let Some(api_key) = update.api_key {
            assignment.api_key = api_key;
        }
        if let Some(voice_id) = update.voice_id {
            assignment.voice_id = voice_id;
        }
        if let Some(estimated_tokens) = update.estimated_tokens {
            assignment.estimated_tokens = estimated_tokens;
        }

        self.touch();
        Ok(())
    }

    /// Remove a character; returns whether it existed
    pub fn remove_character(&mut self, name: &str) -> bool {
        let removed = self.characters.remove(name).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    pub fn get_character(&self, name: &str) -> Option<&VoiceAssignment> {
        self.characters.get(name)
    }

    /// Characters assigned to a specific TTS engine
    pub fn characters_by_engine(&self, engine: &str) -> BTreeMap<String, &VoiceAssignment> {
        self.characters
            .iter()
            .filter(|(_, assignment)| assignment.tts_engine == engine)
            .map(|(name, assignment)| (name.clone(), assignment))
            .collect()
    }

    pub fn stats(&self) -> ProfileStats {
        let mut engines_used: BTreeMap<String, usize> = BTreeMap::new();
        for assignment in self.characters.values() {
            *engines_used.entry(assignment.tts_engine.clone()).or_insert(0) += 1;
        }

        ProfileStats {
            total_characters: self.characters.len(),
            engines_used,
            created: self.metadata.created_date.clone(),
            modified: self.metadata.last_modified.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(name: &str, engine: &str) -> VoiceAssignment {
        VoiceAssignment {
            name: name.to_string(),
            tts_engine: engine.to_string(),
            voice: "test-voice".to_string(),
            gender: Gender::Unknown,
            api_key: String::new(),
            voice_id: String::new(),
            estimated_tokens: 0,
        }
    }

    #[test]
    fn test_add_and_get_character() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "elevenlabs"));

        let agata = profile.get_character("Agata").unwrap();
        assert_eq!(agata.tts_engine, "elevenlabs");
        assert_eq!(profile.characters.len(), 1);
    }

    #[test]
    fn test_add_overwrites_existing() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "edge_tts"));
        profile.add_character(assignment("Agata", "elevenlabs"));

        assert_eq!(profile.characters.len(), 1);
        assert_eq!(profile.get_character("Agata").unwrap().tts_engine, "elevenlabs");
    }

    #[test]
    fn test_update_existing_character() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "edge_tts"));

        profile
            .update_character(
                "Agata",
                VoiceUpdate {
                    voice_id: Some("RWZoDXNWfWzwHbPcWFpP".to_string()),
                    estimated_tokens: Some(420),
                    ..VoiceUpdate::default()
                },
            )
            .unwrap();

        let agata = profile.get_character("Agata").unwrap();
        assert_eq!(agata.voice_id, "RWZoDXNWfWzwHbPcWFpP");
        assert_eq!(agata.estimated_tokens, 420);
        // Untouched fields survive
        assert_eq!(agata.tts_engine, "edge_tts");
    }

    #[test]
    fn test_update_missing_character_is_an_error() {
        let mut profile = CharacterProfile::new("Test Anime");
        let result = profile.update_character("Nobody", VoiceUpdate::default());
        assert!(result.is_err());
        assert!(profile.characters.is_empty());
    }

    #[test]
    fn test_remove_character() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "elevenlabs"));

        assert!(profile.remove_character("Agata"));
        assert!(!profile.remove_character("Agata"));
        assert!(profile.characters.is_empty());
    }

    #[test]
    fn test_characters_by_engine() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "elevenlabs"));
        profile.add_character(assignment("Marek", "edge_tts"));
        profile.add_character(assignment("Zofia", "elevenlabs"));

        let eleven = profile.characters_by_engine("elevenlabs");
        assert_eq!(eleven.len(), 2);
        assert!(eleven.contains_key("Agata"));
        assert!(eleven.contains_key("Zofia"));
    }

    #[test]
    fn test_profile_stats() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "elevenlabs"));
        profile.add_character(assignment("Marek", "edge_tts"));

        let stats = profile.stats();
        assert_eq!(stats.total_characters, 2);
        assert_eq!(stats.engines_used["elevenlabs"], 1);
        assert_eq!(stats.engines_used["edge_tts"], 1);
    }

    #[test]
    fn test_json_document_shape() {
        let mut profile = CharacterProfile::new("Test Anime");
        profile.add_character(assignment("Agata", "elevenlabs"));

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["metadata"]["anime_name"], "Test Anime");
        assert_eq!(json["metadata"]["version"], "1.0");
        assert_eq!(json["characters"]["Agata"]["tts_engine"], "elevenlabs");
        assert_eq!(json["characters"]["Agata"]["gender"], "unknown");
    }
}
