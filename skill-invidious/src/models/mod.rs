//! Data models for Invidious records

pub mod search_result;

pub use search_result::{ApiChannelVideos, ApiItem, ApiThumbnail, ResultKind, SearchResult};
