use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::CharacterProfile;
use crate::error::{Result, SeiyuError};

/// Durable storage for character profiles, one JSON document per project.
///
/// The storage root is injected at construction; nothing is inferred from
/// the process working directory.
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a fresh empty profile; nothing is persisted until `save`
    pub fn create(&self, anime_name: &str) -> Result<CharacterProfile> {
        validate_project_name(anime_name)?;
        Ok(CharacterProfile::new(anime_name))
    }

    /// Load a persisted profile, restoring metadata and all characters.
    ///
    /// A missing document is a `ProfileNotFound` outcome; IO and JSON
    /// failures propagate as-is.
    pub async fn load(&self, anime_name: &str) -> Result<CharacterProfile> {
        validate_project_name(anime_name)?;
        let path = self.document_path(anime_name);

        if !path.exists() {
            return Err(SeiyuError::ProfileNotFound(anime_name.to_string()));
        }

        debug!("Loading profile document: {}", path.display());
        let content = tokio::fs::read_to_string(&path).await?;
        let profile: CharacterProfile = serde_json::from_str(&content)?;

        info!(
            "Loaded profile '{}' with {} characters",
            anime_name,
            profile.characters.len()
        );
        Ok(profile)
    }

    /// Persist the complete profile as a single atomic document write.
    ///
    /// The document is written to a temp file in the storage root and
    /// renamed over the previous version, so readers never observe a
    /// partially written profile.
    pub async fn save(&self, profile: &CharacterProfile) -> Result<()> {
        validate_project_name(&profile.metadata.anime_name)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.document_path(&profile.metadata.anime_name);
        let content = serde_json::to_string_pretty(profile)?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&path)
            .map_err(|e| SeiyuError::Profile(format!("Failed to persist profile document: {}", e)))?;

        info!(
            "Saved profile '{}' ({} characters) to {}",
            profile.metadata.anime_name,
            profile.characters.len(),
            path.display()
        );
        Ok(())
    }

    /// Project names of every persisted document; no ordering guarantee
    pub async fn list_available(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        debug!("Found {} profiles in {}", names.len(), self.root.display());
        Ok(names)
    }

    fn document_path(&self, anime_name: &str) -> PathBuf {
        self.root.join(format!("{}.json", anime_name))
    }
}

/// Project names become file stems; reject anything that would escape
/// the storage root.
fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SeiyuError::Config("Project name must not be empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(SeiyuError::Config(format!(
            "Project name '{}' must not contain path separators",
            name
        )));
    }
    Ok(())
}
