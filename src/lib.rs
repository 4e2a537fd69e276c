//! Seiyu - Anime Dubbing Preparation Toolkit
//!
//! A Rust implementation of the analysis core behind a dubbing workflow:
//! subtitle parsing with per-cue speaker labels, character statistics,
//! gender inference from naming conventions, synthesis-cost token
//! counting and persisted per-character voice profiles.

pub mod cli;
pub mod config;
pub mod error;
pub mod profile;
pub mod subtitle;
pub mod tokens;
pub mod tts;
