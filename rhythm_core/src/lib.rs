#![forbid(unsafe_code)]

//! Core domain model and business logic for Rhythm, a timed workout player.
//!
//! This crate provides:
//! - Domain types (steps, playlists, history records)
//! - Playlist limits, validation and editing
//! - Built-in sample playlists
//! - The playback state machine
//! - Character mood and daily message selection
//! - Persistence (key-value store, custom playlists, history)

pub mod types;
pub mod error;
pub mod constraints;
pub mod validate;
pub mod edit;
pub mod samples;
pub mod player;
pub mod mood;
pub mod storage;
pub mod playlists;
pub mod history;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use validate::{validate_playlist, Violation, ViolationCode};
pub use player::{PlayerState, PlayerStatus};
pub use mood::{character_message, character_mood, CharacterMood, MessageContext};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use samples::sample_playlists;
