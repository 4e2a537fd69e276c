use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeiyuError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Subtitle parsing error: {0}")]
    Subtitle(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("TTS engine error: {0}")]
    Tts(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, SeiyuError>;
