//! # Skill Common Library
//!
//! Shared code for the Invidious skill variants including:
//! - Settings loading (TOML, JSON, host key-value mapping)
//! - Host media model (media entries, playlists, media/playback types)
//! - Runtime requirement metadata
//! - Fuzzy string matching strategies
//! - Vocabulary matching for explicit service requests

pub mod config;
pub mod error;
pub mod fuzzy;
pub mod media;
pub mod runtime;
pub mod vocabulary;

pub use error::{Error, Result};
pub use fuzzy::{fuzzy_match, MatchStrategy};
pub use media::{MediaEntry, MediaItem, MediaType, PlaybackType, Playlist};
pub use runtime::RuntimeRequirements;
pub use vocabulary::Vocabulary;
