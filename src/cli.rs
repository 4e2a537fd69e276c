use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a subtitle file and print per-character statistics
    Analyze {
        /// Input subtitle file (.srt with per-cue speaker lines)
        #[arg(short, long)]
        input: PathBuf,

        /// Also print token counts for cost estimation
        #[arg(long)]
        tokens: bool,
    },

    /// Analyze every subtitle file in a directory
    Batch {
        /// Input directory containing subtitle files
        #[arg(short, long)]
        input_dir: PathBuf,
    },

    /// Count synthesis-cost tokens per character from inline "Name: text" dialogue
    Tokens {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Candidate character names (comma-separated); defaults to the
        /// speakers found in the file
        #[arg(short, long)]
        names: Option<String>,

        /// Target engine for the cost estimate
        #[arg(short, long, default_value = "elevenlabs")]
        engine: String,
    },

    /// Manage character voice profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// List voices offered by a TTS engine
    Voices {
        /// Engine identifier (elevenlabs, edge_tts)
        #[arg(short, long)]
        engine: String,

        /// API key for paid engines
        #[arg(short, long)]
        api_key: Option<String>,
    },

    /// Check remaining credits on a paid TTS engine
    Credits {
        /// Engine identifier (elevenlabs, edge_tts)
        #[arg(short, long, default_value = "elevenlabs")]
        engine: String,

        /// API key for the service
        #[arg(short, long)]
        api_key: String,
    },

    /// Synthesize a short sample to audition a voice
    TestVoice {
        /// Engine identifier (elevenlabs, edge_tts)
        #[arg(short, long)]
        engine: String,

        /// Voice name (edge_tts) or voice ID (elevenlabs)
        #[arg(short, long)]
        voice: String,

        /// API key for paid engines
        #[arg(short, long)]
        api_key: Option<String>,

        /// Sample text to speak
        #[arg(short, long, default_value = "Hello, this is a test voice.")]
        text: String,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a new empty profile
    Create {
        /// Project name
        name: String,
    },

    /// List available profiles
    List,

    /// Show a profile's characters and metadata
    Show {
        /// Project name
        name: String,
    },

    /// Add or overwrite a character's voice assignment
    Add {
        /// Project name
        profile: String,

        /// Character name
        name: String,

        /// TTS engine identifier
        #[arg(short, long)]
        engine: String,

        /// Voice name
        #[arg(short, long)]
        voice: String,

        /// Character gender (male, female, unknown)
        #[arg(short, long, default_value = "unknown")]
        gender: String,

        /// API key for paid engines
        #[arg(short, long)]
        api_key: Option<String>,

        /// Service-specific voice ID
        #[arg(long)]
        voice_id: Option<String>,

        /// Estimated synthesis tokens
        #[arg(short, long, default_value = "0")]
        tokens: u64,
    },

    /// Update fields of an existing character
    Update {
        /// Project name
        profile: String,

        /// Character name
        name: String,

        /// TTS engine identifier
        #[arg(short, long)]
        engine: Option<String>,

        /// Voice name
        #[arg(short, long)]
        voice: Option<String>,

        /// Character gender (male, female, unknown)
        #[arg(short, long)]
        gender: Option<String>,

        /// API key for paid engines
        #[arg(short, long)]
        api_key: Option<String>,

        /// Service-specific voice ID
        #[arg(long)]
        voice_id: Option<String>,

        /// Estimated synthesis tokens
        #[arg(short, long)]
        tokens: Option<u64>,
    },

    /// Remove a character from a profile
    Remove {
        /// Project name
        profile: String,

        /// Character name
        name: String,
    },
}
