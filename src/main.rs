//! Seiyu - Anime Dubbing Preparation Toolkit
//!
//! This is the main entry point for the Seiyu application, which analyzes
//! subtitle files for dubbing projects: per-character line statistics,
//! gender guesses, synthesis-cost token counts and persisted voice
//! profiles for TTS engines.

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walkdir::WalkDir;

use seiyu::cli::{Args, Commands, ProfileAction};
use seiyu::config::Config;
use seiyu::error::SeiyuError;
use seiyu::profile::{ProfileStore, VoiceAssignment, VoiceUpdate};
use seiyu::subtitle::{analyze_characters, character_stats, parse_document, Gender};
use seiyu::tokens::TextCounter;
use seiyu::tts::{EngineKind, TtsManager};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("seiyu.toml").exists() {
                Config::from_file("seiyu.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Setup logging to both console and file
    setup_logging(args.verbose, &config)?;
    info!("Starting Seiyu - Anime Dubbing Preparation Toolkit");

    let store = ProfileStore::new(config.storage.profiles_dir());

    match args.command {
        Commands::Analyze { input, tokens } => {
            info!("Analyzing subtitle file: {}", input.display());
            analyze_file(&input, tokens, &config)?;
        }
        Commands::Batch { input_dir } => {
            info!("Analyzing subtitle directory: {}", input_dir.display());
            analyze_directory(&input_dir)?;
        }
        Commands::Tokens { input, names, engine } => {
            info!("Counting synthesis tokens in: {}", input.display());
            count_tokens(&input, names.as_deref(), &engine, &config)?;
        }
        Commands::Profile { action } => {
            run_profile_action(action, &store).await?;
        }
        Commands::Voices { engine, api_key } => {
            let kind = EngineKind::parse(&engine)?;
            let manager = TtsManager::new(&config.tts);
            let voices = manager.list_voices(kind, api_key.as_deref()).await?;

            if voices.is_empty() {
                println!("No voices available for engine '{}'", kind);
            } else {
                println!("\nVoices for {}:", kind);
                println!("{:<28} {:<28} {:<10} {:<8}", "ID", "Name", "Gender", "Locale");
                println!("{}", "-".repeat(76));
                for voice in voices {
                    println!(
                        "{:<28} {:<28} {:<10} {:<8}",
                        voice.id,
                        voice.name,
                        voice.gender.unwrap_or_else(|| "-".to_string()),
                        voice.locale.unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }
        Commands::Credits { engine, api_key } => {
            let kind = EngineKind::parse(&engine)?;
            let manager = TtsManager::new(&config.tts);
            let credits = manager.credits(kind, &api_key).await?;

            println!("\nCredits for {}:", kind);
            println!("Available: {}", credits.available);
            println!("Used:      {}", credits.used);
            println!("Total:     {}", credits.total);
        }
        Commands::TestVoice { engine, voice, api_key, text, output } => {
            let kind = EngineKind::parse(&engine)?;
            let manager = TtsManager::new(&config.tts);

            let assignment = VoiceAssignment {
                name: "voice-test".to_string(),
                tts_engine: kind.as_str().to_string(),
                voice: voice.clone(),
                gender: Gender::Unknown,
                api_key: api_key.unwrap_or_default(),
                voice_id: voice,
                estimated_tokens: 0,
            };

            info!("Auditioning voice '{}' on {}", assignment.voice, kind);
            let audio = manager.test_voice(kind, &assignment, &text).await?;
            tokio::fs::write(&output, &audio).await?;
            println!("Wrote {} bytes of test audio to {}", audio.len(), output.display());
        }
    }

    info!("Seiyu finished successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool, config: &Config) -> Result<()> {
    let log_dir = config.storage.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation; keep the guard alive for the program's lifetime
    let file_appender = rolling::daily(&log_dir, "seiyu.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Analyze one subtitle file and print the character table
fn analyze_file(input: &std::path::Path, with_tokens: bool, config: &Config) -> Result<()> {
    if !input.exists() {
        return Err(SeiyuError::FileNotFound(input.display().to_string()).into());
    }

    let content = std::fs::read_to_string(input)?;
    let report = parse_document(&content);

    if !report.skipped.is_empty() {
        warn!("Skipped {} malformed cue blocks", report.skipped.len());
    }

    let characters = analyze_characters(&report.entries);
    let stats = character_stats(&characters);

    println!("\nCharacters in {}:", input.display());
    println!("{:<24} {:>6} {:>12} {:<8}", "Name", "Lines", "Duration (s)", "Gender");
    println!("{}", "-".repeat(54));
    for stat in &stats {
        println!(
            "{:<24} {:>6} {:>12.2} {:<8}",
            stat.name, stat.lines, stat.duration, stat.gender
        );
    }
    println!(
        "\n{} cues parsed, {} blocks skipped",
        report.entries.len(),
        report.skipped.len()
    );

    if with_tokens {
        let candidates: Vec<String> = characters.keys().cloned().collect();
        let blobs: Vec<String> = report
            .entries
            .iter()
            .map(|entry| format!("{}: {}", entry.speaker, entry.text))
            .collect();

        let mut counter = TextCounter::new(config.tts.paid_engine.clone());
        counter.analyze(&blobs, &candidates);

        println!("\n{:<24} {:>8} {:>8}", "Name", "Tokens", "Cost");
        println!("{}", "-".repeat(42));
        for (name, stats) in counter.all_character_stats() {
            println!(
                "{:<24} {:>8} {:>8}",
                name,
                stats.tokens,
                counter.estimate_cost_by_engine(name, &config.tts.paid_engine)
            );
        }
        println!("{:<24} {:>8} TOTAL", "", counter.total_tokens());
    }

    Ok(())
}

/// Analyze every .srt file under a directory, one summary line each
fn analyze_directory(input_dir: &std::path::Path) -> Result<()> {
    if !input_dir.is_dir() {
        return Err(SeiyuError::Config("Input path is not a directory".to_string()).into());
    }

    let mut subtitle_files = Vec::new();
    for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
        if let Some(extension) = entry.path().extension() {
            if extension.to_str().map(|ext| ext.eq_ignore_ascii_case("srt")) == Some(true) {
                subtitle_files.push(entry.path().to_path_buf());
            }
        }
    }

    info!("Found {} subtitle files to analyze", subtitle_files.len());
    println!("{:<40} {:>6} {:>11} {:>8}", "File", "Cues", "Characters", "Skipped");
    println!("{}", "-".repeat(68));

    let progress = ProgressBar::new(subtitle_files.len() as u64);
    for path in &subtitle_files {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let report = parse_document(&content);
                let characters = analyze_characters(&report.entries);
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                progress.println(format!(
                    "{:<40} {:>6} {:>11} {:>8}",
                    file_name,
                    report.entries.len(),
                    characters.len(),
                    report.skipped.len()
                ));
            }
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(())
}

/// Count cost tokens via inline "Name: text" attribution
fn count_tokens(
    input: &std::path::Path,
    names: Option<&str>,
    engine: &str,
    config: &Config,
) -> Result<()> {
    if !input.exists() {
        return Err(SeiyuError::FileNotFound(input.display().to_string()).into());
    }

    let content = std::fs::read_to_string(input)?;
    let report = parse_document(&content);

    let candidates: Vec<String> = match names {
        Some(list) => list.split(',').map(|name| name.trim().to_string()).collect(),
        None => analyze_characters(&report.entries).keys().cloned().collect(),
    };

    let blobs: Vec<&str> = report.entries.iter().map(|entry| entry.text.as_str()).collect();

    let mut counter = TextCounter::new(config.tts.paid_engine.clone());
    counter.analyze(&blobs, &candidates);

    println!("\nToken counts for {} (engine: {}):", input.display(), engine);
    println!(
        "{:<24} {:>6} {:>7} {:>7} {:>8} {:>10}",
        "Name", "Lines", "Words", "Chars", "Tokens", "Est. cost"
    );
    println!("{}", "-".repeat(68));
    for (name, stats) in counter.all_character_stats() {
        println!(
            "{:<24} {:>6} {:>7} {:>7} {:>8} {:>10}",
            name,
            stats.total_lines,
            stats.total_words,
            stats.total_chars,
            stats.tokens,
            counter.estimate_cost_by_engine(name, engine)
        );
    }
    println!("{:<24} {:>40} TOTAL", "", counter.total_tokens());

    Ok(())
}

async fn run_profile_action(action: ProfileAction, store: &ProfileStore) -> Result<()> {
    match action {
        ProfileAction::Create { name } => {
            let profile = store.create(&name)?;
            store.save(&profile).await?;
            println!("Created profile '{}'", name);
        }
        ProfileAction::List => {
            let mut names = store.list_available().await?;
            names.sort();

            if names.is_empty() {
                println!("No profiles found in {}", store.root().display());
            } else {
                println!("\nAvailable profiles:");
                for name in names {
                    println!("  {}", name);
                }
            }
        }
        ProfileAction::Show { name } => {
            let profile = store.load(&name).await?;
            let stats = profile.stats();

            println!("\nProfile: {}", profile.metadata.anime_name);
            println!("Created:  {}", stats.created);
            println!("Modified: {}", stats.modified);
            println!("Characters: {}", stats.total_characters);
            for (engine, count) in &stats.engines_used {
                println!("  {}: {}", engine, count);
            }

            if !profile.characters.is_empty() {
                println!(
                    "\n{:<20} {:<12} {:<24} {:<8} {:>8}",
                    "Name", "Engine", "Voice", "Gender", "Tokens"
                );
                println!("{}", "-".repeat(76));
                for character in profile.characters.values() {
                    println!(
                        "{:<20} {:<12} {:<24} {:<8} {:>8}",
                        character.name,
                        character.tts_engine,
                        character.voice,
                        character.gender,
                        character.estimated_tokens
                    );
                }
            }
        }
        ProfileAction::Add {
            profile,
            name,
            engine,
            voice,
            gender,
            api_key,
            voice_id,
            tokens,
        } => {
            let kind = EngineKind::parse(&engine)?;
            let mut doc = store.load(&profile).await?;

            doc.add_character(VoiceAssignment {
                name: name.clone(),
                tts_engine: kind.as_str().to_string(),
                voice,
                gender: parse_gender(&gender)?,
                api_key: api_key.unwrap_or_default(),
                voice_id: voice_id.unwrap_or_default(),
                estimated_tokens: tokens,
            });
            store.save(&doc).await?;
            println!("Added '{}' to profile '{}'", name, profile);
        }
        ProfileAction::Update {
            profile,
            name,
            engine,
            voice,
            gender,
            api_key,
            voice_id,
            tokens,
        } => {
            let mut doc = store.load(&profile).await?;

            let tts_engine = match engine {
                Some(value) => Some(EngineKind::parse(&value)?.as_str().to_string()),
                None => None,
            };
            let gender = match gender {
                Some(value) => Some(parse_gender(&value)?),
                None => None,
            };

            doc.update_character(
                &name,
                VoiceUpdate {
                    tts_engine,
                    voice,
                    gender,
                    api_key,
                    voice_id,
                    estimated_tokens: tokens,
                },
            )?;
            store.save(&doc).await?;
            println!("Updated '{}' in profile '{}'", name, profile);
        }
        ProfileAction::Remove { profile, name } => {
            let mut doc = store.load(&profile).await?;

            if doc.remove_character(&name) {
                store.save(&doc).await?;
                println!("Removed '{}' from profile '{}'", name, profile);
            } else {
                println!("Character '{}' is not in profile '{}'", name, profile);
            }
        }
    }

    Ok(())
}

/// Parse a gender argument from the command line
fn parse_gender(value: &str) -> Result<Gender> {
    match value.to_lowercase().as_str() {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        "unknown" => Ok(Gender::Unknown),
        _ => Err(SeiyuError::Config(format!(
            "Invalid gender '{}'. Valid values: male, female, unknown",
            value
        ))
        .into()),
    }
}
