use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, SeiyuError};

fn default_data_dir() -> PathBuf {
    PathBuf::from(".seiyu")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for profiles, logs and other persisted data.
    /// Always passed explicitly to the profile store, never derived
    /// from the process working directory at lookup time.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Engine identifier whose usage is billed; all others estimate as free
    pub paid_engine: String,
    /// ElevenLabs API base URL
    pub elevenlabs_endpoint: String,
    /// Path to the edge-tts binary
    pub edge_binary_path: String,
    /// HTTP request timeout in seconds for voice-service calls
    pub request_timeout_secs: u64,
    /// Per-engine daily usage limits, keyed by engine identifier
    pub limits: BTreeMap<String, EngineLimit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineLimit {
    /// Characters per day; -1 means unlimited
    pub daily_limit: i64,
    /// Characters consumed today
    pub used_today: u64,
}

impl StorageConfig {
    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join("profiles")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("log")
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut limits = BTreeMap::new();
        limits.insert(
            "elevenlabs".to_string(),
            EngineLimit {
                daily_limit: 10_000,
                used_today: 0,
            },
        );
        limits.insert(
            "edge_tts".to_string(),
            EngineLimit {
                daily_limit: -1,
                used_today: 0,
            },
        );

        Self {
            storage: StorageConfig {
                data_dir: default_data_dir(),
            },
            tts: TtsConfig {
                paid_engine: "elevenlabs".to_string(),
                elevenlabs_endpoint: "https://api.elevenlabs.io/v1".to_string(),
                edge_binary_path: "edge-tts".to_string(),
                request_timeout_secs: 30,
                limits,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SeiyuError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SeiyuError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SeiyuError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SeiyuError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
